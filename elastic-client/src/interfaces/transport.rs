//! Transport trait definition.
//!
//! This module defines the abstract interface for executing a single request
//! against the cluster, allowing the HTTP implementation to be swapped for a
//! mock in tests.

use async_trait::async_trait;

use crate::errors::ElasticError;
use crate::request::ApiRequest;

/// Executes one HTTP verb + path + optional body against the connection's base address.
///
/// Implementations are injected into [`ElasticClient`](crate::ElasticClient) and must be
/// safe to share between concurrent operations, including a running scroll producer.
///
/// # Outcome classification
///
/// * status 200 or 201 - `Ok(body)`
/// * status 429 - `Err(ElasticError::RateLimited)`; the client decides whether to resend
/// * any other status - `Err(ElasticError::HttpStatus { status, body })`
/// * no status at all - `Err(ElasticError::TransportError)`
///
/// Implementations must not retry on their own.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return the raw response body.
    async fn send(&self, request: &ApiRequest) -> Result<Vec<u8>, ElasticError>;
}
