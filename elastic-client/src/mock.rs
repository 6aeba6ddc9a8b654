//! Mock transport for testing and local development.
//!
//! The `MockTransport` answers requests from a handler closure or from a
//! scripted queue of responses and records every request it receives,
//! allowing tests to run without a cluster.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use elastic_client::mock::MockTransport;
//! use elastic_client::{ClientConfig, ElasticClient, HealthStatus};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), elastic_client::ElasticError> {
//! let transport = Arc::new(MockTransport::scripted(vec![Ok(json!({"status": "green"}))]));
//! let client = ElasticClient::with_transport(ClientConfig::default(), transport.clone());
//!
//! assert_eq!(client.health().await?, HealthStatus::Green);
//! assert_eq!(transport.requests()[0].path(), "_cluster/health");
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ElasticError;
use crate::interfaces::Transport;
use crate::request::ApiRequest;

type Handler = Box<dyn Fn(&ApiRequest) -> Result<Value, ElasticError> + Send + Sync>;

/// Transport that never touches the network.
pub struct MockTransport {
    handler: Handler,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    /// Create a mock that answers every request with `handler`.
    ///
    /// The handler returns the response body as JSON, or the error the real
    /// transport would have produced (e.g. `ElasticError::http_status(404, ..)`).
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&ApiRequest) -> Result<Value, ElasticError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that answers requests in order from `responses`.
    ///
    /// Requests beyond the end of the script fail with a transport error.
    pub fn scripted(responses: Vec<Result<Value, ElasticError>>) -> Self {
        let queue = Mutex::new(VecDeque::from(responses));
        Self::new(move |request| {
            queue.lock().unwrap().pop_front().unwrap_or_else(|| {
                Err(ElasticError::transport(format!(
                    "no scripted response left for {}",
                    request
                )))
            })
        })
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &ApiRequest) -> Result<Vec<u8>, ElasticError> {
        self.requests.lock().unwrap().push(request.clone());
        let body = (self.handler)(request)?;
        Ok(serde_json::to_vec(&body)?)
    }
}
