//! Error types for the RetroAchievements client.
//!
//! # Design
//! "Not found" is not an error: the service answers unknown games and
//! consoles with sentinel payloads, and the client maps those to `None` or an
//! empty list. The variants here cover bad credentials, transport failures
//! passed through from `ureq`, and bodies that are not the JSON we expect.

use thiserror::Error;

/// Errors returned by `RaClient`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered `Invalid API Key`. It does so for an unknown
    /// username as well as for a wrong key.
    #[error("the API key or username is invalid")]
    InvalidAuth,

    /// The request could not be sent or the response could not be read.
    #[error("transport failed: {0}")]
    Transport(#[from] ureq::Error),

    /// The body is not valid JSON, does not have the expected shape, or holds
    /// a value that cannot be coerced (e.g. a non-numeric count).
    #[error("deserialization failed: {0}")]
    DeserializationError(#[from] serde_json::Error),
}

/// Errors returned by `ClientConfig::from_env`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing env variable `{0}`")]
    MissingVar(&'static str),

    #[error("failed to parse env variable `{name}={value}`; expected {expected}")]
    InvalidVar {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}
