//! Interface definitions for the client's injectable seams.
//!
//! [`Transport`] abstracts the HTTP exchange so tests can run without a cluster;
//! [`Logger`] replaces process-wide log state with a capability passed in at
//! construction time.

mod logger;
mod transport;

pub use logger::{Logger, NoopLogger, TracingLogger};
pub use transport::Transport;
