use std::env;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://retroachievements.org/API";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Credentials and connection settings for `RaClient`.
#[derive(Clone)]
pub struct ClientConfig {
    pub username: String,
    pub api_key: String,
    pub timeout: Duration,
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;

        self
    }

    /// Points the client at another host, e.g. a local mock of the service.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();

        self
    }

    /// Reads `RA_USERNAME` and `RA_API_KEY`, and optionally `RA_TIMEOUT_SECS`
    /// and `RA_BASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::MissingVar(name));

        let mut config = Self::new(required("RA_USERNAME")?, required("RA_API_KEY")?);

        if let Some(value) = lookup("RA_TIMEOUT_SECS") {
            let secs = value.trim().parse().map_err(|_| ConfigError::InvalidVar {
                name: "RA_TIMEOUT_SECS",
                value: value.clone(),
                expected: "a whole number of seconds",
            })?;

            config = config.with_timeout(Duration::from_secs(secs));
        }

        if let Some(base_url) = lookup("RA_BASE_URL") {
            config = config.with_base_url(&base_url);
        }

        Ok(config)
    }
}

impl Debug for ClientConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ClientConfig")
            .field("username", &self.username)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("base_url", &self.base_url)
            .finish()
    }
}
