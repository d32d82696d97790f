use std::time::Duration;

use serde::Deserialize;

/// Quiet period bounds observed for search-as-you-type
pub const MIN_DEBOUNCE_MS: u64 = 300;
pub const MAX_DEBOUNCE_MS: u64 = 500;

/// Client configuration loaded from `LIKEWISE_*` environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Auth service base URL (login, register, event push/pull)
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Catalog service base URL (title search, detail lookup, home feed)
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,

    /// Recommendation service base URL
    #[serde(default = "default_recommender_url")]
    pub recommender_url: String,

    /// Search debounce quiet period in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Optional per-request timeout; unset means requests may wait indefinitely
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Number of suggestions requested from the recommender
    #[serde(default = "default_recommendation_limit")]
    pub recommendation_limit: usize,

    /// Access token to start the session with
    #[serde(default)]
    pub access_token: Option<String>,
}

fn default_auth_url() -> String {
    "http://localhost:9999".to_string()
}

fn default_catalog_url() -> String {
    "http://localhost:9997".to_string()
}

fn default_recommender_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_debounce_ms() -> u64 {
    400
}

fn default_recommendation_limit() -> usize {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_url: default_auth_url(),
            catalog_url: default_catalog_url(),
            recommender_url: default_recommender_url(),
            debounce_ms: default_debounce_ms(),
            request_timeout_secs: None,
            recommendation_limit: default_recommendation_limit(),
            access_token: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::prefixed("LIKEWISE_")
            .from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Debounce period clamped into the supported window
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms.clamp(MIN_DEBOUNCE_MS, MAX_DEBOUNCE_MS))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Builds the shared HTTP client every provider clones
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.request_timeout() {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debounce_is_clamped() {
        let mut config = Config::default();
        assert_eq!(config.debounce(), Duration::from_millis(400));

        config.debounce_ms = 50;
        assert_eq!(config.debounce(), Duration::from_millis(MIN_DEBOUNCE_MS));

        config.debounce_ms = 5_000;
        assert_eq!(config.debounce(), Duration::from_millis(MAX_DEBOUNCE_MS));
    }

    #[test]
    fn test_defaults_from_empty_environment() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.auth_url, "http://localhost:9999");
        assert_eq!(config.catalog_url, "http://localhost:9997");
        assert_eq!(config.recommendation_limit, 10);
        assert!(config.access_token.is_none());
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn test_values_from_environment() {
        let vars = vec![
            ("CATALOG_URL".to_string(), "http://catalog.test".to_string()),
            ("REQUEST_TIMEOUT_SECS".to_string(), "5".to_string()),
            ("ACCESS_TOKEN".to_string(), "abc".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.catalog_url, "http://catalog.test");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.access_token.as_deref(), Some("abc"));
    }
}
