//! Error types for the Elasticsearch client.
//!
//! This module provides a unified error type for all client operations.

mod elastic_error;

pub use elastic_error::ElasticError;
