use std::path::Path;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{Capabilities, Dataset, SchemaVersion, SetType};
use crate::error::{ProxyError, Result};

/// Placeholder in a provider URL template replaced by the request path
pub const PATH_PLACEHOLDER: &str = "{path}";

/// Default timeout for upstream calls
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Failed to read registry: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse registry: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Failed to build HTTP client: {0}")]
    ClientError(#[from] reqwest::Error),

    #[error("Backend '{key}': URL template '{template}' must be an absolute URL ending in {{path}}")]
    InvalidTemplate { key: String, template: String },

    #[error("Backend '{0}': credential is not a valid header value")]
    InvalidCredential(String),

    #[error("Backend '{0}' is configured more than once")]
    DuplicateKey(String),
}

/// Credentials a provider needs before it can be offered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable holding an OAuth bearer token
    pub bearer_token_env: String,
}

/// Static description of a backend, as read from a registry file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Selector used in the `backend` query parameter
    pub key: String,
    /// Display name for the landing page
    pub name: String,
    pub schema_version: SchemaVersion,
    /// Absolute URL ending in `{path}`, e.g. `https://rest.ensembl.org/ga4gh/{path}`
    pub url_template: String,
    #[serde(flatten)]
    pub capabilities: Capabilities,
    pub set_types: Vec<SetType>,
    #[serde(default)]
    pub datasets: Vec<Dataset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,
}

/// Settings shared by every provider's HTTP client
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_UPSTREAM_TIMEOUT,
            user_agent: format!("ga4gh-proxy/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// The backends compiled into the binary
#[must_use]
pub fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            key: "Ensembl".to_string(),
            name: "Ensembl".to_string(),
            schema_version: SchemaVersion::V0_6_0,
            url_template: "https://rest.ensembl.org/ga4gh/{path}".to_string(),
            capabilities: Capabilities::default(),
            set_types: vec![SetType::CallSet],
            datasets: vec![Dataset::new(
                "1000 Genomes phase3",
                "6e340c4d1e333c7a676b1710d2e3953c",
            )],
            auth: None,
        },
        ProviderConfig {
            key: "GOOGLE".to_string(),
            name: "Google".to_string(),
            schema_version: SchemaVersion::V0_5_1,
            url_template: "https://genomics.googleapis.com/v1/{path}".to_string(),
            capabilities: Capabilities {
                supports_name_filter: true,
                supports_partial_response: true,
            },
            set_types: vec![SetType::ReadSet, SetType::CallSet],
            datasets: vec![
                Dataset::new("1000 Genomes", "10473108253681171589"),
                Dataset::new("Platinum Genomes", "3049512673186936334"),
                Dataset::new("DREAM SMC Challenge", "337315832689"),
                Dataset::new("PGP", "383928317087"),
                Dataset::new("Simons Foundation", "461916304629"),
            ],
            auth: Some(AuthConfig {
                bearer_token_env: "GOOGLE_GENOMICS_TOKEN".to_string(),
            }),
        },
    ]
}

/// A configured backend. Immutable once built.
#[derive(Debug, Clone)]
pub struct Provider {
    pub key: String,
    pub name: String,
    pub schema_version: SchemaVersion,
    pub capabilities: Capabilities,
    pub set_types: Vec<SetType>,
    pub datasets: Vec<Dataset>,
    url_template: String,
    base: Url,
    http: Client,
}

impl Provider {
    /// Create a provider from its config and a ready HTTP client
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidTemplate` if the URL template is not an
    /// absolute URL ending in `{path}`.
    pub fn new(config: ProviderConfig, http: Client) -> std::result::Result<Self, RegistryError> {
        let base = parse_template(&config.url_template).ok_or_else(|| {
            RegistryError::InvalidTemplate {
                key: config.key.clone(),
                template: config.url_template.clone(),
            }
        })?;

        Ok(Self {
            key: config.key,
            name: config.name,
            schema_version: config.schema_version,
            capabilities: config.capabilities,
            set_types: config.set_types,
            datasets: config.datasets,
            url_template: config.url_template,
            base,
            http,
        })
    }

    #[must_use]
    pub fn supports_name_filter(&self) -> bool {
        self.capabilities.supports_name_filter
    }

    #[must_use]
    pub fn supports_partial_response(&self) -> bool {
        self.capabilities.supports_partial_response
    }

    #[must_use]
    pub fn supports_set_type(&self, set_type: SetType) -> bool {
        self.set_types.contains(&set_type)
    }

    #[must_use]
    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    /// HTTP client carrying this provider's credentials
    #[must_use]
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Resolve path `segments` and `query` against the URL template.
    ///
    /// Each segment is percent-encoded on its own, `/` included, so ids taken
    /// from the browser stay a single segment and cannot reach the query.
    #[must_use]
    pub fn endpoint<S: AsRef<str>>(&self, segments: &[S], query: &[(String, String)]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }
}

fn parse_template(template: &str) -> Option<Url> {
    let prefix = template.strip_suffix(PATH_PLACEHOLDER)?;
    let url = Url::parse(prefix).ok()?;
    if url.cannot_be_a_base() || url.query().is_some() {
        return None;
    }
    Some(url)
}

/// Build the HTTP client for one provider
fn build_client(
    settings: &ClientSettings,
    token: Option<&str>,
    key: &str,
) -> std::result::Result<Client, RegistryError> {
    let mut headers = HeaderMap::new();
    if let Some(token) = token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| RegistryError::InvalidCredential(key.to_string()))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(Client::builder()
        .timeout(settings.timeout)
        .user_agent(&settings.user_agent)
        .default_headers(headers)
        .build()?)
}

/// The fixed set of backends this process serves, keyed by selector
#[derive(Debug, Default)]
pub struct Registry {
    providers: Vec<Provider>,
}

impl Registry {
    /// Build providers from their configs.
    ///
    /// Credentials are resolved through `env`. A provider whose credential is
    /// unavailable is left out of the registry rather than failing startup.
    ///
    /// # Errors
    ///
    /// Returns an error if a template is invalid, a key is duplicated, or an
    /// HTTP client cannot be built.
    pub fn build<F>(
        configs: Vec<ProviderConfig>,
        settings: &ClientSettings,
        env: F,
    ) -> std::result::Result<Self, RegistryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut providers: Vec<Provider> = Vec::with_capacity(configs.len());

        for config in configs {
            if providers.iter().any(|p| p.key == config.key) {
                return Err(RegistryError::DuplicateKey(config.key));
            }

            let token = match &config.auth {
                Some(auth) => match env(&auth.bearer_token_env).filter(|t| !t.trim().is_empty()) {
                    Some(token) => Some(token),
                    None => {
                        tracing::warn!(
                            backend = %config.key,
                            env = %auth.bearer_token_env,
                            "Credentials unavailable, backend disabled"
                        );
                        continue;
                    }
                },
                None => None,
            };

            let http = build_client(settings, token.as_deref(), &config.key)?;
            let provider = Provider::new(config, http)?;
            tracing::debug!(
                backend = %provider.key,
                version = %provider.schema_version,
                "Registered backend"
            );
            providers.push(provider);
        }

        Ok(Self { providers })
    }

    /// Build from a JSON registry file, or the built-in providers when `path`
    /// is None. Credentials come from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a provider
    /// cannot be built.
    pub fn load(
        path: Option<&Path>,
        settings: &ClientSettings,
    ) -> std::result::Result<Self, RegistryError> {
        let configs = match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)?;
                serde_json::from_str(&contents)?
            }
            None => default_providers(),
        };
        Self::build(configs, settings, |name| std::env::var(name).ok())
    }

    /// Wrap already-built providers
    #[must_use]
    pub fn from_providers(providers: Vec<Provider>) -> Self {
        Self { providers }
    }

    /// Find the provider named by the `backend` selector
    ///
    /// # Errors
    ///
    /// `ClientInput` when the selector is missing or empty, `UnknownBackend`
    /// when no provider has that key.
    pub fn lookup(&self, key: Option<&str>) -> Result<&Provider> {
        let key = key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ProxyError::ClientInput("Backend parameter must be set".to_string()))?;

        self.providers
            .iter()
            .find(|p| p.key == key)
            .ok_or_else(|| ProxyError::UnknownBackend(key.to_string()))
    }

    #[must_use]
    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_provider_without_credentials_is_omitted() {
        let registry =
            Registry::build(default_providers(), &ClientSettings::default(), no_env).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.lookup(Some("Ensembl")).is_ok());
        assert!(matches!(
            registry.lookup(Some("GOOGLE")),
            Err(ProxyError::UnknownBackend(_))
        ));
    }

    #[test]
    fn test_provider_with_credentials_is_registered() {
        let registry = Registry::build(default_providers(), &ClientSettings::default(), |name| {
            (name == "GOOGLE_GENOMICS_TOKEN").then(|| "token".to_string())
        })
        .unwrap();
        assert_eq!(registry.len(), 2);

        let google = registry.lookup(Some("GOOGLE")).unwrap();
        assert_eq!(google.schema_version, SchemaVersion::V0_5_1);
        assert!(google.supports_partial_response());
        assert!(google.supports_set_type(SetType::ReadSet));
    }

    #[test]
    fn test_blank_token_counts_as_missing() {
        let registry = Registry::build(default_providers(), &ClientSettings::default(), |_| {
            Some("  ".to_string())
        })
        .unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_requires_backend() {
        let registry =
            Registry::build(default_providers(), &ClientSettings::default(), no_env).unwrap();
        assert!(matches!(registry.lookup(None), Err(ProxyError::ClientInput(_))));
        assert!(matches!(
            registry.lookup(Some("")),
            Err(ProxyError::ClientInput(_))
        ));
    }

    #[test]
    fn test_capabilities_of_defaults() {
        let registry =
            Registry::build(default_providers(), &ClientSettings::default(), no_env).unwrap();
        let ensembl = registry.lookup(Some("Ensembl")).unwrap();
        assert!(!ensembl.supports_name_filter());
        assert!(!ensembl.supports_partial_response());
        assert!(ensembl.supports_set_type(SetType::CallSet));
        assert!(!ensembl.supports_set_type(SetType::ReadSet));
    }

    #[test]
    fn test_endpoint_substitutes_path_and_query() {
        let registry =
            Registry::build(default_providers(), &ClientSettings::default(), no_env).unwrap();
        let ensembl = registry.lookup(Some("Ensembl")).unwrap();

        let url = ensembl.endpoint(&["callsets", "search"], &[]);
        assert_eq!(url.as_str(), "https://rest.ensembl.org/ga4gh/callsets/search");

        let url = ensembl.endpoint(
            &["callsets", "search"],
            &[("fields".to_string(), "callSets(id,name)".to_string())],
        );
        assert_eq!(url.path(), "/ga4gh/callsets/search");
        assert_eq!(url.query(), Some("fields=callSets%28id%2Cname%29"));
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let registry =
            Registry::build(default_providers(), &ClientSettings::default(), no_env).unwrap();
        let ensembl = registry.lookup(Some("Ensembl")).unwrap();
        let url = ensembl.endpoint(&["callsets", "a?b#c"], &[]);
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
        assert!(url.path().ends_with("/callsets/a%3Fb%23c"));

        let url = ensembl.endpoint(&["callsets", "rgs1/sub/../other"], &[]);
        assert_eq!(url.path(), "/ga4gh/callsets/rgs1%2Fsub%2F..%2Fother");
    }

    #[test]
    fn test_invalid_template_is_rejected() {
        let mut config = default_providers().remove(0);
        config.url_template = "https://rest.ensembl.org/ga4gh/".to_string();
        let err = Registry::build(vec![config], &ClientSettings::default(), no_env).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidTemplate { .. }));
    }

    #[test]
    fn test_duplicate_keys_are_rejected() {
        let config = default_providers().remove(0);
        let err = Registry::build(
            vec![config.clone(), config],
            &ClientSettings::default(),
            no_env,
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateKey(k) if k == "Ensembl"));
    }

    #[test]
    fn test_registry_file_format() {
        let json = r#"[{
            "key": "local",
            "name": "Local server",
            "schema_version": "0.6.0",
            "url_template": "http://localhost:8000/ga4gh/{path}",
            "supports_partial_response": true,
            "set_types": ["CALLSET", "READSET"],
            "datasets": [{"display_name": "Test", "id": "ds1"}]
        }]"#;
        let configs: Vec<ProviderConfig> = serde_json::from_str(json).unwrap();
        let registry = Registry::build(configs, &ClientSettings::default(), no_env).unwrap();
        let local = registry.lookup(Some("local")).unwrap();
        assert!(local.supports_partial_response());
        assert!(!local.supports_name_filter());
        assert_eq!(local.datasets[0].id, "ds1");
    }

    #[test]
    fn test_registry_file_with_unknown_version_fails() {
        let json = r#"[{
            "key": "old",
            "name": "Old",
            "schema_version": "0.4.0",
            "url_template": "http://localhost/{path}",
            "set_types": []
        }]"#;
        let err = serde_json::from_str::<Vec<ProviderConfig>>(json).unwrap_err();
        assert!(err.to_string().contains("Unsupported GA4GH version: 0.4.0"));
    }
}
