//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Identity provider configuration.
    pub auth: AuthConfig,
    /// Feed and pagination configuration.
    #[serde(default)]
    pub feed: FeedConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// External identity provider configuration.
///
/// Session tokens are HS256 JWTs signed by the identity provider with a shared secret.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared signing secret.
    pub jwt_secret: String,
    /// Expected `iss` claim, if any.
    #[serde(default)]
    pub issuer: Option<String>,
    /// Clock skew tolerated when checking `exp`.
    #[serde(default = "default_leeway_secs")]
    pub leeway_secs: u64,
}

/// Page sizes for the different listings.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// "Who to follow" suggestions.
    #[serde(default = "default_suggestions_page_size")]
    pub suggestions_page_size: u64,
    /// Home feed.
    #[serde(default = "default_home_page_size")]
    pub home_page_size: u64,
    /// Profile posts, saved posts and follower dialogs.
    #[serde(default = "default_profile_page_size")]
    pub profile_page_size: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            suggestions_page_size: default_suggestions_page_size(),
            home_page_size: default_home_page_size(),
            profile_page_size: default_profile_page_size(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_leeway_secs() -> u64 {
    60
}

const fn default_suggestions_page_size() -> u64 {
    3
}

const fn default_home_page_size() -> u64 {
    4
}

const fn default_profile_page_size() -> u64 {
    6
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, into the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `BUZZIFY_ENV`)
    /// 4. Environment variables with `BUZZIFY_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("BUZZIFY_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("BUZZIFY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("BUZZIFY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
