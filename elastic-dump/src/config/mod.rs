//! Configuration for the dump tool.

mod dependencies;

pub use dependencies::{wait_until_reachable, Dependencies};

use std::env;
use std::time::Duration;

use serde_json::Value;
use tracing::warn;

use crate::DumpError;

/// Default document type in the request path.
const DEFAULT_DOCTYPE: &str = "doc";

/// Default connection retry interval in seconds.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

/// What to do when the cluster cannot be reached at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Fail immediately if the cluster does not answer.
    FailFast,
    /// Retry at a fixed interval until the cluster answers.
    Retry,
}

impl ConnectionMode {
    /// Parse a connection mode.
    ///
    /// Valid values: "fail-fast" or "retry" (case-insensitive).
    /// Defaults to "retry" if not set or invalid.
    pub fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("retry").to_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail_fast" => Self::FailFast,
            "retry" => Self::Retry,
            _ => {
                warn!("Invalid ELASTICSEARCH_CONNECTION_MODE, defaulting to 'retry'");
                Self::Retry
            }
        }
    }
}

/// What to dump and how to wait for the cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct DumpConfig {
    pub index: String,
    pub doctype: String,
    /// Query DSL filter; every document when `None`.
    pub query: Option<Value>,
    pub connection_mode: ConnectionMode,
    pub retry_interval: Duration,
}

impl DumpConfig {
    /// Read the dump configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DUMP_INDEX`: index to dump (required)
    /// - `DUMP_DOCTYPE`: document type (default: doc)
    /// - `DUMP_QUERY`: query DSL object as JSON (default: every document)
    /// - `ELASTICSEARCH_CONNECTION_MODE`: "fail-fast" or "retry" (default: retry)
    /// - `ELASTICSEARCH_RETRY_INTERVAL_SECS`: retry interval in seconds (default: 15)
    pub fn from_env() -> Result<Self, DumpError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DumpError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let index = lookup("DUMP_INDEX")
            .filter(|index| !index.trim().is_empty())
            .ok_or_else(|| DumpError::config("DUMP_INDEX must be set"))?;
        let doctype = lookup("DUMP_DOCTYPE").unwrap_or_else(|| DEFAULT_DOCTYPE.to_string());

        let query = match lookup("DUMP_QUERY") {
            Some(raw) if !raw.trim().is_empty() => {
                let query: Value = serde_json::from_str(&raw)
                    .map_err(|e| DumpError::config(format!("DUMP_QUERY is not valid JSON: {}", e)))?;
                if !query.is_object() {
                    return Err(DumpError::config("DUMP_QUERY must be a JSON object"));
                }
                Some(query)
            }
            _ => None,
        };

        let connection_mode =
            ConnectionMode::parse(lookup("ELASTICSEARCH_CONNECTION_MODE").as_deref());
        let retry_interval = lookup("ELASTICSEARCH_RETRY_INTERVAL_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_INTERVAL_SECS);

        Ok(Self {
            index,
            doctype,
            query,
            connection_mode,
            retry_interval: Duration::from_secs(retry_interval),
        })
    }
}
