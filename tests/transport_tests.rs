//! The reqwest transport and SNPedia client against a local upstream server.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderName, Method, StatusCode, Uri};
use axum::Router;
use ga4gh_proxy::annotation::{SnpediaClient, WikiSource};
use ga4gh_proxy::backend::registry::{AuthConfig, ClientSettings, ProviderConfig, Registry};
use ga4gh_proxy::backend::transport::{
    HttpTransport, Transport, UpstreamRequest, JSON_CONTENT_TYPE,
};
use ga4gh_proxy::core::types::{Capabilities, Dataset, SchemaVersion, SetType};
use ga4gh_proxy::error::ProxyError;
use ga4gh_proxy::translate::sets::fetch_set;
use ga4gh_proxy::translate::Backend;
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// One request as seen by the upstream server
#[derive(Debug, Clone)]
struct Received {
    method: Method,
    uri: String,
    content_type: Option<String>,
    authorization: Option<String>,
    body: String,
}

/// Upstream answering every request with the same canned response
#[derive(Clone)]
struct Upstream {
    status: StatusCode,
    body: String,
    delay: Duration,
    received: Arc<Mutex<Vec<Received>>>,
}

impl Upstream {
    fn new(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
            received: Arc::default(),
        }
    }

    fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }

    async fn start(&self) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().fallback(answer).with_state(self.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }
}

fn header_value(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn answer(
    State(upstream): State<Upstream>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    upstream.received.lock().unwrap().push(Received {
        method,
        uri: uri.to_string(),
        content_type: header_value(&headers, header::CONTENT_TYPE),
        authorization: header_value(&headers, header::AUTHORIZATION),
        body,
    });
    tokio::time::sleep(upstream.delay).await;
    (upstream.status, upstream.body.clone())
}

fn registry(addr: SocketAddr, timeout: Duration) -> Registry {
    let config = ProviderConfig {
        key: "local".to_string(),
        name: "Local".to_string(),
        schema_version: SchemaVersion::V0_5_1,
        url_template: format!("http://{addr}/ga4gh/{{path}}"),
        capabilities: Capabilities {
            supports_name_filter: true,
            supports_partial_response: true,
        },
        set_types: vec![SetType::ReadSet, SetType::CallSet],
        datasets: vec![Dataset::new("Test dataset", "ds1")],
        auth: Some(AuthConfig {
            bearer_token_env: "LOCAL_GA4GH_TOKEN".to_string(),
        }),
    };
    let settings = ClientSettings {
        timeout,
        ..ClientSettings::default()
    };
    Registry::build(vec![config], &settings, |_| Some("secret".to_string())).unwrap()
}

#[tokio::test]
async fn test_post_sends_json_body_headers_and_fields() {
    let upstream = Upstream::new(StatusCode::OK, json!({"alignments": []}));
    let addr = upstream.start().await;
    let registry = registry(addr, Duration::from_secs(5));
    let provider = registry.lookup(Some("local")).unwrap();

    let request = UpstreamRequest::post(
        "reads/search",
        json!({"readGroupSetIds": ["rgs1"], "referenceName": "22", "start": 0}),
    )
    .with_query("fields", "x(id,name)");
    let response = HttpTransport.call(provider, request).await.unwrap();

    assert_eq!(response.body, json!({"alignments": []}));
    assert_eq!(response.size, r#"{"alignments":[]}"#.len());

    let received = upstream.received();
    assert_eq!(received.len(), 1);
    let call = &received[0];
    assert_eq!(call.method, Method::POST);
    assert_eq!(call.uri, "/ga4gh/reads/search?fields=x%28id%2Cname%29");
    assert_eq!(call.content_type.as_deref(), Some(JSON_CONTENT_TYPE));
    assert_eq!(call.authorization.as_deref(), Some("Bearer secret"));

    let body: Value = serde_json::from_str(&call.body).unwrap();
    assert_eq!(
        body,
        json!({"readGroupSetIds": ["rgs1"], "referenceName": "22", "start": 0})
    );
}

#[tokio::test]
async fn test_browser_ids_are_encoded_on_the_wire() {
    let upstream = Upstream::new(StatusCode::OK, json!({"id": "rgs1"}));
    let addr = upstream.start().await;
    let registry = registry(addr, Duration::from_secs(5));
    let provider = registry.lookup(Some("local")).unwrap();
    let backend = Backend::new(provider, &HttpTransport);

    fetch_set(&backend, SetType::ReadSet, "rgs1/sub/../other")
        .await
        .unwrap();

    let uris: Vec<String> = upstream.received().into_iter().map(|r| r.uri).collect();
    assert_eq!(
        uris,
        vec![
            "/ga4gh/readgroupsets/rgs1%2Fsub%2F..%2Fother",
            "/ga4gh/readgroupsets/rgs1%2Fsub%2F..%2Fother/coveragebuckets",
        ]
    );
}

#[tokio::test]
async fn test_upstream_error_message_is_reported() {
    let upstream = Upstream::new(
        StatusCode::NOT_FOUND,
        json!({"error": {"message": "bad token"}}),
    );
    let addr = upstream.start().await;
    let registry = registry(addr, Duration::from_secs(5));
    let provider = registry.lookup(Some("local")).unwrap();

    let err = HttpTransport
        .call(provider, UpstreamRequest::get("callsets").with_segment("c1"))
        .await
        .unwrap_err();

    match &err {
        ProxyError::Upstream { status, message } => {
            assert_eq!(*status, 404);
            assert_eq!(message, "bad token");
        }
        other => panic!("expected Upstream error, got {other:?}"),
    }
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refused_connection_is_transport_failure() {
    // Reserve a port, then close it so nothing is listening
    let addr = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap()
        .local_addr()
        .unwrap();
    let registry = registry(addr, Duration::from_secs(5));
    let provider = registry.lookup(Some("local")).unwrap();

    let err = HttpTransport
        .call(provider, UpstreamRequest::get("callsets").with_segment("c1"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProxyError::Transport(_)));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let upstream = Upstream::new(StatusCode::OK, json!({})).delayed(Duration::from_secs(5));
    let addr = upstream.start().await;
    let registry = registry(addr, Duration::from_millis(200));
    let provider = registry.lookup(Some("local")).unwrap();

    let err = HttpTransport
        .call(provider, UpstreamRequest::get("callsets").with_segment("c1"))
        .await
        .unwrap_err();

    match &err {
        ProxyError::Transport(e) => assert!(e.is_timeout()),
        other => panic!("expected Transport error, got {other:?}"),
    }
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_snpedia_client_reads_page_revision() {
    let upstream = Upstream::new(
        StatusCode::OK,
        json!({"query": {"pages": {"1234": {
            "title": "Rs53576",
            "revisions": [{"*": "{{Rsnum\n|position=8762685\n}}"}]
        }}}}),
    );
    let addr = upstream.start().await;
    let api = reqwest::Url::parse(&format!("http://{addr}/api.php")).unwrap();
    let client = SnpediaClient::new(api, &ClientSettings::default()).unwrap();

    let content = client.page_content("Rs53576").await.unwrap();
    assert_eq!(content.as_deref(), Some("{{Rsnum\n|position=8762685\n}}"));

    let received = upstream.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].method, Method::GET);
    assert_eq!(
        received[0].uri,
        "/api.php?action=query&prop=revisions&format=json&rvprop=content&titles=Rs53576"
    );
}

#[tokio::test]
async fn test_snpedia_missing_page_is_none() {
    let upstream = Upstream::new(
        StatusCode::OK,
        json!({"query": {"pages": {"-1": {"title": "Rs0", "missing": ""}}}}),
    );
    let addr = upstream.start().await;
    let api = reqwest::Url::parse(&format!("http://{addr}/api.php")).unwrap();
    let client = SnpediaClient::new(api, &ClientSettings::default()).unwrap();

    assert_eq!(client.page_content("Rs0").await.unwrap(), None);
}
