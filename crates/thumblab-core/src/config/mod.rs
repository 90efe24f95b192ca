//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Environment variable overriding the API base URL.
pub const SERVER_URL_ENV: &str = "THUMBLAB_SERVER_URL";

/// Default base URL for local development.
const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Default per-request timeout.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the Thumblab API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL all endpoint paths are joined onto.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Build a config from the environment, falling back to the local dev
    /// server when no override is set.
    pub fn from_env() -> Self {
        let base_url = std::env::var(SERVER_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            ..Self::default()
        }
    }

    /// Base URL without a trailing slash, ready for path joining.
    pub fn trimmed_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
