//! Client configuration.
//!
//! Use the builder methods to customize, or [`ClientConfig::from_env`] to pick
//! up overrides from the environment.
//!
//! # Example
//!
//! ```
//! use ragchat::config::ClientConfig;
//! use std::time::Duration;
//!
//! let config = ClientConfig::default()
//!     .with_base_url("https://chat.example.com/api/v1/")
//!     .with_connect_timeout(Duration::from_secs(5));
//! assert_eq!(config.base_url, "https://chat.example.com/api/v1");
//! ```

use std::time::Duration;

/// Default API root of a locally running backend
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Environment variable overriding the API root
pub const BASE_URL_ENV: &str = "RAGCHAT_API_BASE_URL";

/// Environment variable overriding the connect timeout, in seconds
pub const CONNECT_TIMEOUT_ENV: &str = "RAGCHAT_CONNECT_TIMEOUT_SECS";

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Configuration for [`crate::client::ChatClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, without trailing slash
    pub base_url: String,
    /// Time allowed to establish the connection. Streams themselves have no
    /// overall deadline since answers can take a while.
    pub connect_timeout: Duration,
    /// Value of the User-Agent header
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            user_agent: format!("ragchat/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Create a new ClientConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API root. A trailing slash is dropped.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(&url.into());
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the User-Agent header value.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Create config from `RAGCHAT_API_BASE_URL` and
    /// `RAGCHAT_CONNECT_TIMEOUT_SECS`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(BASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
            config = config.with_base_url(url.trim());
        }

        if let Some(raw) = lookup(CONNECT_TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config = config.with_connect_timeout(Duration::from_secs(secs)),
                Err(_) => tracing::warn!(
                    "Ignoring {}={:?}: not a number of seconds",
                    CONNECT_TIMEOUT_ENV,
                    raw
                ),
            }
        }

        config
    }
}

fn normalize_base_url(value: &str) -> String {
    value.trim_end_matches('/').to_string()
}
