//! Error types for the dump tool.

use elastic_client::ElasticError;
use thiserror::Error;

/// Errors that can occur while configuring or running a dump.
#[derive(Error, Debug)]
pub enum DumpError {
    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The cluster rejected a request or could not be reached.
    #[error("Elasticsearch error: {0}")]
    ElasticError(#[from] ElasticError),

    /// Writing the output failed.
    #[error("Output error: {0}")]
    OutputError(#[from] std::io::Error),

    /// A hit could not be encoded as JSON.
    #[error("Encoding error: {0}")]
    EncodingError(#[from] serde_json::Error),
}

impl DumpError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
