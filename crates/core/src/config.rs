use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `WHATSFLOAT__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub google_ads: GoogleAdsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

/// In-process report cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
    /// Size above which a write triggers eviction of expired entries.
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
    #[serde(default = "default_maintenance_interval_secs")]
    pub maintenance_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleAdsConfig {
    #[serde(default = "default_google_ads_base_url")]
    pub base_url: String,
    #[serde(default = "default_google_ads_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub developer_token: String,
    /// OAuth access token. Refreshing it is left to the deployment.
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub login_customer_id: Option<String>,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Serve reports from a JSON file instead of the live API.
    #[serde(default)]
    pub fixture_path: Option<String>,
}

// Default functions
fn default_node_id() -> String {
    "whatsfloat-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_page_size() -> usize {
    20
}
fn default_metrics_enabled() -> bool {
    true
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_cache_ttl_secs() -> u64 {
    300
}
fn default_cache_max_entries() -> usize {
    100
}
fn default_maintenance_interval_secs() -> u64 {
    60
}
fn default_google_ads_base_url() -> String {
    "https://googleads.googleapis.com".to_string()
}
fn default_google_ads_api_version() -> String {
    "v17".to_string()
}
fn default_request_timeout_ms() -> u64 {
    30_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            default_page_size: default_page_size(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            port: default_metrics_port(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
            max_entries: default_cache_max_entries(),
            maintenance_interval_secs: default_maintenance_interval_secs(),
        }
    }
}

impl Default for GoogleAdsConfig {
    fn default() -> Self {
        Self {
            base_url: default_google_ads_base_url(),
            api_version: default_google_ads_api_version(),
            developer_token: String::new(),
            access_token: String::new(),
            login_customer_id: None,
            request_timeout_ms: default_request_timeout_ms(),
            fixture_path: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            cache: CacheConfig::default(),
            google_ads: GoogleAdsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("WHATSFLOAT")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.cache.max_entries, 100);
        assert_eq!(config.api.http_port, 8080);
        assert!(config.google_ads.fixture_path.is_none());
    }

    #[test]
    fn test_partial_deserialize_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"cache": {"ttl_secs": 60}, "api": {"http_port": 3000}}"#)
                .unwrap();
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.cache.max_entries, 100);
        assert_eq!(config.api.http_port, 3000);
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.google_ads.api_version, "v17");
    }
}
