//! # Elasticsearch Client
//!
//! This crate provides a typed client for the Elasticsearch REST API: document
//! CRUD, bulk indexing, aggregations, index/template/snapshot administration,
//! cluster health and a streaming scroll engine for reading whole indices.
//!
//! The HTTP layer sits behind the [`Transport`] trait so that tests can run
//! against [`mock::MockTransport`] instead of a live cluster.

pub mod client;
pub mod config;
pub mod errors;
pub mod http;
pub mod interfaces;
pub mod mock;
pub mod request;
pub mod responses;
pub mod scroll;
pub mod types;
pub mod utils;

pub use client::ElasticClient;
pub use config::{ClientConfig, RetryPolicy, ScrollConfig};
pub use errors::ElasticError;
pub use http::HttpTransport;
pub use interfaces::{Logger, NoopLogger, TracingLogger, Transport};
pub use request::{ApiRequest, ContentType, Method};
pub use scroll::{DocumentScroll, ScrollSummary};
pub use types::{
    Bucket, BulkItemError, BulkOutcome, Document, FetchedDocument, HealthStatus, Hit, Order,
    Refresh, SearchPage, SortDirection, TermAggregation, TermAggregationResult,
    TermAggregationResults, TermAggregations, ValueRange,
};
