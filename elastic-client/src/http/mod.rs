//! HTTP implementation of the transport.
//!
//! This module provides a concrete implementation of `Transport` using
//! reqwest as the HTTP client.

mod transport;

pub use transport::HttpTransport;
