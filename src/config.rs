/// Configuration management for Timeline Service
///
/// Loads configuration from environment variables.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Upstream post origins
    pub origins: OriginsConfig,
    /// Redis configuration (delta push channel)
    pub redis: RedisConfig,
    /// Reaction commit endpoint
    pub reactions: ReactionsConfig,
    /// Search collaborator endpoint
    pub search: SearchConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// HTTP port
    pub http_port: u16,
}

/// The two independent post origins the feed is merged from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginsConfig {
    /// Origin A URL (its records precede origin B's before sorting)
    pub origin_a_url: String,
    /// Origin B URL
    pub origin_b_url: String,
}

/// Redis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis URL (redis://host:port)
    pub url: String,
    /// Pub/sub channel carrying feed delta events
    #[serde(default = "default_delta_channel")]
    pub delta_channel: String,
}

/// Reaction commit endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionsConfig {
    /// Base URL of the platform API accepting reaction writes
    pub endpoint: String,
}

/// Search collaborator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search endpoint URL
    pub endpoint: String,
}

fn default_delta_channel() -> String {
    "feed:deltas".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8007), // timeline-service default HTTP port
        };

        let origins = OriginsConfig {
            origin_a_url: std::env::var("ORIGIN_A_URL")
                .context("ORIGIN_A_URL environment variable not set")?,
            origin_b_url: std::env::var("ORIGIN_B_URL")
                .context("ORIGIN_B_URL environment variable not set")?,
        };

        let redis = RedisConfig {
            url: std::env::var("REDIS_URL").context("REDIS_URL environment variable not set")?,
            delta_channel: std::env::var("FEED_DELTA_CHANNEL")
                .unwrap_or_else(|_| default_delta_channel()),
        };

        let reactions = ReactionsConfig {
            endpoint: std::env::var("REACTIONS_ENDPOINT")
                .context("REACTIONS_ENDPOINT environment variable not set")?,
        };

        let search = SearchConfig {
            endpoint: std::env::var("SEARCH_ENDPOINT")
                .context("SEARCH_ENDPOINT environment variable not set")?,
        };

        Ok(Config {
            app,
            origins,
            redis,
            reactions,
            search,
        })
    }
}
