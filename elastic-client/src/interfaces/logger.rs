//! Wire-level logging capability.
//!
//! A [`Logger`] is handed to the client at construction time and receives full
//! request/response dumps when it reports debug mode. The default is silent.

use tracing::{debug, info};

/// Receives request and response dumps from the client.
///
/// The client only formats dumps when [`debug_mode`](Logger::debug_mode) returns
/// `true`, so a disabled logger costs one call per request.
pub trait Logger: Send + Sync {
    /// Informational message.
    fn info(&self, message: &str);

    /// Debug message, e.g. a request or response dump.
    fn debug(&self, message: &str);

    /// Whether the client should produce request/response dumps.
    fn debug_mode(&self) -> bool;
}

/// Discards every message. Used when no logger is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn info(&self, _message: &str) {}

    fn debug(&self, _message: &str) {}

    fn debug_mode(&self) -> bool {
        false
    }
}

/// Forwards messages to `tracing` under the `elastic_client::wire` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger {
    debug: bool,
}

impl TracingLogger {
    /// A logger that forwards info messages only.
    pub fn new() -> Self {
        Self { debug: false }
    }

    /// A logger that also receives request/response dumps.
    pub fn verbose() -> Self {
        Self { debug: true }
    }
}

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        info!(target: "elastic_client::wire", "{}", message);
    }

    fn debug(&self, message: &str) {
        if self.debug {
            debug!(target: "elastic_client::wire", "{}", message);
        }
    }

    fn debug_mode(&self) -> bool {
        self.debug
    }
}
