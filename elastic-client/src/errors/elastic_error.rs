//! Elasticsearch client error types.
//!
//! This module defines the unified error type for every client operation, from
//! input validation through transport faults to response decoding.

use thiserror::Error;

/// Unified errors from Elasticsearch client operations.
///
/// Upstream failures keep the HTTP status and the response body verbatim so that
/// operators can diagnose server-side causes (mapping conflicts, script compile
/// limits, missing indices) without the client reinterpreting them.
///
/// Partial bulk failures are not errors: they are reported through
/// [`BulkOutcome`](crate::types::BulkOutcome).
#[derive(Debug, Clone, Error)]
pub enum ElasticError {
    /// Validation error (e.g., empty index name, page window above the search limit).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Invalid client configuration (e.g., unparsable base URL).
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The request never produced an HTTP status (DNS, refused connection, body read).
    #[error("Transport error: {0}")]
    TransportError(String),

    /// The server answered with a status other than 200, 201 or 429.
    #[error(
        "HTTP status {status}{}",
        .body.as_deref().map(|b| format!(" ({})", b)).unwrap_or_default()
    )]
    HttpStatus { status: u16, body: Option<String> },

    /// The server kept answering 429 after the retry budget was spent.
    #[error(
        "Rate limited by server (gave up after {retries} retries){}",
        .body.as_deref().map(|b| format!(" ({})", b)).unwrap_or_default()
    )]
    RateLimited { retries: u32, body: Option<String> },

    /// The response did not match the expected envelope.
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Failed to serialize a request body.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The scroll producer task failed outside of a request (panic or cancellation).
    #[error("Scroll error: {0}")]
    ScrollError(String),
}

impl ElasticError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::TransportError(msg.into())
    }

    /// Create an HTTP status error. An empty body is stored as `None`.
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        Self::HttpStatus {
            status,
            body: if body.is_empty() { None } else { Some(body) },
        }
    }

    /// Create a rate limited error. An empty body is stored as `None`.
    pub fn rate_limited(retries: u32, body: impl Into<String>) -> Self {
        let body = body.into();
        Self::RateLimited {
            retries,
            body: if body.is_empty() { None } else { Some(body) },
        }
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create a scroll error.
    pub fn scroll(msg: impl Into<String>) -> Self {
        Self::ScrollError(msg.into())
    }

    /// The upstream HTTP status, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// Whether the server answered 404 (missing document, index or template).
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Whether this is a 429 that survived the retry policy.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

impl From<serde_json::Error> for ElasticError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
