use axum::{
    extract::{Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{Html, Json},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use crate::annotation::{search_alleles, search_snps, SnpediaClient, WikiSource};
use crate::backend::registry::{ClientSettings, Registry};
use crate::backend::transport::{HttpTransport, Transport};
use crate::cli::ServeArgs;
use crate::core::types::SetType;
use crate::error::{ProxyError, Result};
use crate::translate::params::{SearchParams, SearchRequest};
use crate::translate::reads::search_reads;
use crate::translate::sets::{fetch_set, search_sets};
use crate::translate::variants::search_variants;
use crate::translate::Backend;
use crate::web::landing::render_index;

/// Maximum number of requests handled at once
pub const MAX_CONCURRENT_REQUESTS: usize = 100;

/// Shared application state. Read-only after startup.
pub struct AppState {
    pub registry: Registry,
    pub transport: Arc<dyn Transport>,
    pub wiki: Arc<dyn WikiSource>,
}

impl AppState {
    /// Pair the provider named by `backend` with the shared transport
    fn backend(&self, backend: Option<&str>) -> Result<Backend<'_>> {
        let provider = self.registry.lookup(backend)?;
        Ok(Backend::new(provider, self.transport.as_ref()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetsQuery {
    backend: Option<String>,
    set_type: Option<String>,
    set_id: Option<String>,
    dataset_id: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    backend: Option<String>,
    #[serde(flatten)]
    search: SearchParams,
}

#[derive(Debug, Deserialize)]
struct SnpQuery {
    snp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlleleQuery {
    snp: Option<String>,
    a1: Option<String>,
    a2: Option<String>,
}

fn required<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ProxyError::ClientInput(format!("{name} parameter must be set")))
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the registry cannot be loaded, the tokio runtime cannot
/// be created, or the server fails to start.
pub fn run(args: ServeArgs) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args).await })
}

/// Create the application router with all routes and middleware configured.
pub fn create_router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/backends", get(backends_handler))
        .route("/api/sets", get(sets_handler))
        .route("/api/reads", get(reads_handler))
        .route("/api/variants", get(variants_handler))
        .route("/api/snps", get(snps_handler))
        .route("/api/alleles", get(alleles_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                ))
                // Upstream calls are chained, so this bounds the whole chain
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    request_timeout,
                ))
                .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS)),
        )
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let settings = ClientSettings {
        timeout: Duration::from_secs(args.upstream_timeout),
        ..ClientSettings::default()
    };

    let registry = Registry::load(args.registry.as_deref(), &settings)?;
    if registry.is_empty() {
        tracing::warn!("No backends available; only annotations will be served");
    }
    for provider in registry.providers() {
        tracing::info!(
            backend = %provider.key,
            version = %provider.schema_version,
            datasets = provider.datasets.len(),
            "Backend ready"
        );
    }

    let wiki = SnpediaClient::new(args.snpedia_url.clone(), &settings)?;
    let state = Arc::new(AppState {
        registry,
        transport: Arc::new(HttpTransport),
        wiki: Arc::new(wiki),
    });
    let app = create_router(state, Duration::from_secs(args.request_timeout));

    let addr = format!("{}:{}", args.address, args.port);
    println!("Starting ga4gh-proxy web server at http://{addr}");

    if args.open {
        let _ = open::that(format!("http://{addr}"));
    }

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

/// Main page handler
async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_index(&state.registry))
}

/// Return the configured backends and their capabilities
async fn backends_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let backends: Vec<Value> = state
        .registry
        .providers()
        .iter()
        .map(|p| {
            serde_json::json!({
                "key": p.key,
                "name": p.name,
                "schema_version": p.schema_version,
                "supports_name_filter": p.supports_name_filter(),
                "supports_partial_response": p.supports_partial_response(),
                "set_types": p.set_types,
                "datasets": p.datasets,
            })
        })
        .collect();

    Json(serde_json::json!({
        "count": backends.len(),
        "backends": backends,
    }))
}

/// Fetch one set by `setId`, or search a dataset's sets by name
async fn sets_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SetsQuery>,
) -> Result<Json<Value>> {
    let backend = state.backend(query.backend.as_deref())?;
    let set_type: SetType = required("setType", query.set_type.as_deref())?.parse()?;

    let content = match query.set_id.as_deref().filter(|id| !id.is_empty()) {
        Some(set_id) => fetch_set(&backend, set_type, set_id).await?,
        None => {
            let dataset_id = required("datasetId", query.dataset_id.as_deref())?;
            let name = query.name.as_deref().unwrap_or_default();
            search_sets(&backend, set_type, dataset_id, name).await?
        }
    };

    Ok(Json(content))
}

async fn reads_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>> {
    let backend = state.backend(query.backend.as_deref())?;
    let search = SearchRequest::try_from(query.search)?;
    Ok(Json(search_reads(&backend, &search).await?))
}

async fn variants_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>> {
    let backend = state.backend(query.backend.as_deref())?;
    let search = SearchRequest::try_from(query.search)?;
    Ok(Json(search_variants(&backend, &search).await?))
}

async fn snps_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SnpQuery>,
) -> Result<Json<Value>> {
    let snp = query.snp.as_deref().unwrap_or_default();
    Ok(Json(search_snps(state.wiki.as_ref(), snp).await?))
}

async fn alleles_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AlleleQuery>,
) -> Result<Json<Value>> {
    let snp = required("snp", query.snp.as_deref())?;
    let a1 = required("a1", query.a1.as_deref())?;
    let a2 = required("a2", query.a2.as_deref())?;
    Ok(Json(search_alleles(state.wiki.as_ref(), snp, a1, a2).await?))
}
