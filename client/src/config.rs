//! Configuration management for the ticketdesk client.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use ticketdesk_runtime::StoreConfig;
use tracing_subscriber::EnvFilter;

/// Default base path of the ticket service
pub const DEFAULT_API_URL: &str = "http://localhost:3333/api";

/// Log filter used when `RUST_LOG` is unset or does not parse
pub const DEFAULT_LOG_FILTER: &str = "ticketdesk=info,ticketdesk_client=info";

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote ticket service
    pub api: ApiConfig,
    /// Store runtime tuning
    pub store: StoreSettings,
    /// Log filter directives, `RUST_LOG` syntax
    pub log_level: String,
}

/// Remote ticket service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL including the `/api` path, without a trailing slash
    pub base_url: String,
    /// `User-Agent` header sent with every request
    pub user_agent: String,
}

/// Store runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Capacity of the resolved-action broadcast channel
    pub broadcast_capacity: usize,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_secs: u64,
}

impl StoreSettings {
    /// Runtime configuration for a store built from these settings
    #[must_use]
    pub const fn store_config(&self) -> StoreConfig {
        StoreConfig::new(
            self.broadcast_capacity,
            Duration::from_secs(self.shutdown_timeout_secs),
        )
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            broadcast_capacity: 64,
            shutdown_timeout_secs: 5,
        }
    }
}

impl ApiConfig {
    /// Configuration pointing at `base_url` with the default user agent
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig {
                base_url: normalize_base_url(
                    &env::var("TICKETDESK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
                ),
                user_agent: env::var("TICKETDESK_USER_AGENT")
                    .unwrap_or_else(|_| default_user_agent()),
            },
            store: StoreSettings {
                broadcast_capacity: env::var("TICKETDESK_BROADCAST_CAPACITY")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(64),
                shutdown_timeout_secs: env::var("TICKETDESK_SHUTDOWN_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            },
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
        }
    }

    /// Tracing filter built from `log_level`
    #[must_use]
    pub fn log_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.log_level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            store: StoreSettings::default(),
            log_level: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

fn default_user_agent() -> String {
    format!("ticketdesk/{}", env!("CARGO_PKG_VERSION"))
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
