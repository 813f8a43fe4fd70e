//! Client configuration.

use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the buzzify API, with a trailing slash.
    pub api_base: Url,
    /// How long a fetched view counts as fresh.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Timeout for a single server action.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Session token issued by the identity provider.
    #[serde(default)]
    pub token: Option<String>,
}

const fn default_cache_ttl_secs() -> u64 {
    60
}

const fn default_request_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    /// Configuration with default timings for the given API.
    #[must_use]
    pub const fn new(api_base: Url) -> Self {
        Self {
            api_base,
            cache_ttl_secs: default_cache_ttl_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            token: None,
        }
    }

    /// Attach a session token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Load configuration from `BUZZIFY_CLIENT__*` environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("BUZZIFY_CLIENT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Freshness window for cached views.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new(Url::parse("http://localhost:3000/api/").unwrap());
        assert_eq!(config.cache_ttl(), Duration::from_secs(60));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.api_base.as_str(), "http://localhost:3000/api/");
        assert!(config.token.is_none());

        let config = config.with_token("jwt");
        assert_eq!(config.token.as_deref(), Some("jwt"));
    }

    #[test]
    fn test_deserialize_partial() {
        let raw = r#"
            api_base = "https://buzzify.example/api/"
            cache_ttl_secs = 5
        "#;

        let config: ClientConfig = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.api_base.host_str(), Some("buzzify.example"));
        assert_eq!(config.cache_ttl_secs, 5);
        assert_eq!(config.request_timeout_secs, 30);
    }
}
