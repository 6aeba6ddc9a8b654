//! # Elasticsearch Dump
//!
//! Operator tool that streams every document of an Elasticsearch index to
//! stdout as newline-delimited JSON, using the scroll engine of
//! `elastic-client`.
//!
//! ## Modules
//!
//! - [`config`]: Environment configuration and connection wiring
//! - [`dump`]: Scroll-to-NDJSON writer
//! - [`errors`]: Error types for the tool

pub mod config;
pub mod dump;
pub mod errors;

pub use config::{ConnectionMode, Dependencies, DumpConfig};
pub use dump::dump_index;
pub use errors::DumpError;
