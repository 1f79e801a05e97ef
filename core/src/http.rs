//! HTTP transport types and the blocking transport behind `RaClient`.
//!
//! # Design
//! Requests and responses are plain data. `RaClient` builds an `HttpRequest`,
//! hands it to a [`Transport`], and parses the `HttpResponse` it gets back, so
//! the request building and response parsing stay deterministic and can be
//! tested without a network. [`UreqTransport`] is the transport used in
//! production; tests substitute canned responses.

use std::fmt;
use std::time::Duration;

use tracing::trace;

use crate::error::ApiError;

/// A GET request described as plain data.
///
/// `query` keeps insertion order; endpoint parameters come first, followed by
/// the credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Executes a request and returns whatever the server answered.
///
/// Non-2xx statuses must be returned as `Ok`; the service signals bad
/// credentials through the body, not the status.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking transport backed by a `ureq::Agent`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .new_agent();

        Self { agent }
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let query = request.query.iter().map(|(k, v)| (k.as_str(), v.as_str()));

        let mut response = self.agent.get(&request.url).query_pairs(query).call()?;

        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        trace!(status, len = body.len(), "received response from {}", request.url);

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_value_finds_first_match() {
        let request = HttpRequest {
            url: "http://localhost/API/API_GetGame.php".to_string(),
            query: vec![
                ("i".to_string(), "1".to_string()),
                ("z".to_string(), "user".to_string()),
            ],
        };

        assert_eq!(request.query_value("i"), Some("1"));
        assert_eq!(request.query_value("z"), Some("user"));
        assert_eq!(request.query_value("y"), None);
    }
}
