//! Elasticsearch client facade.
//!
//! This module provides the main handle for talking to a cluster. Each endpoint
//! family lives in its own submodule as an `impl ElasticClient` block; all of them
//! funnel through [`ElasticClient::execute`], which owns the 429 retry policy and
//! the wire logging.

mod admin;
mod aggregations;
mod bulk;
mod documents;
mod health;

pub use documents::MAX_RESULT_WINDOW;

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::errors::ElasticError;
use crate::http::HttpTransport;
use crate::interfaces::{Logger, NoopLogger, Transport};
use crate::request::ApiRequest;

/// Handle to one Elasticsearch cluster.
///
/// The handle is immutable after creation and holds no per-call state, so it can
/// be cloned freely and shared between concurrent operations. A running scroll
/// owns its own clone.
///
/// # Example
///
/// ```no_run
/// use elastic_client::{ClientConfig, ElasticClient, Refresh};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ElasticClient::connect(ClientConfig::new("http://localhost:9200"))?;
/// client.ping().await?;
///
/// let document = json!({"field1": "value1"}).as_object().cloned().unwrap_or_default();
/// client
///     .insert_document("logs", "doc", "1", &document, Refresh::True)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ElasticClient {
    transport: Arc<dyn Transport>,
    logger: Arc<dyn Logger>,
    config: Arc<ClientConfig>,
}

impl ElasticClient {
    /// Create a client that talks HTTP to `config.url`.
    ///
    /// This does not contact the server. Use [`ping`](Self::ping) for a connection test.
    ///
    /// # Returns
    ///
    /// * `Ok(ElasticClient)` - A new client with a silent logger
    /// * `Err(ElasticError::ConfigurationError)` - If the URL cannot be parsed
    pub fn connect(config: ClientConfig) -> Result<Self, ElasticError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client on top of an arbitrary transport (e.g. `MockTransport`).
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            logger: Arc::new(NoopLogger),
            config: Arc::new(config),
        }
    }

    /// Replace the logger that receives request/response dumps.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send one request, resending it on 429 according to the retry policy.
    ///
    /// The exact same request is resent. Once the policy's budget is spent the last
    /// 429 is surfaced as [`ElasticError::RateLimited`], keeping the server's body.
    pub async fn execute(&self, request: &ApiRequest) -> Result<Vec<u8>, ElasticError> {
        let policy = &self.config.retry;
        let mut retries = 0;

        loop {
            self.log_request(request);
            let result = self.transport.send(request).await;
            self.log_response(request, &result);

            match result {
                Err(ElasticError::RateLimited { .. }) if retries < policy.max_retries => {
                    retries += 1;
                    warn!(
                        request = %request,
                        retry = retries,
                        delay_ms = policy.delay.as_millis() as u64,
                        "Rate limited, resending after delay"
                    );
                    sleep(policy.delay).await;
                }
                Err(ElasticError::RateLimited { body, .. }) => {
                    return Err(ElasticError::RateLimited { retries, body });
                }
                other => return other,
            }
        }
    }

    fn log_request(&self, request: &ApiRequest) {
        if !self.logger.debug_mode() {
            return;
        }
        let body = request
            .body
            .as_deref()
            .map(String::from_utf8_lossy)
            .unwrap_or_default();
        self.logger
            .debug(&format!("Elasticsearch Request: {}\n{}", request, body));
    }

    fn log_response(&self, request: &ApiRequest, result: &Result<Vec<u8>, ElasticError>) {
        if !self.logger.debug_mode() {
            return;
        }
        let message = match result {
            Ok(body) => format!(
                "Elasticsearch Response: {}\n{}",
                request,
                String::from_utf8_lossy(body)
            ),
            Err(e) => format!("Elasticsearch Response: {}\n{}", request, e),
        };
        self.logger.debug(&message);
    }

    /// Send a request whose response body is not needed.
    async fn execute_unit(&self, request: &ApiRequest) -> Result<(), ElasticError> {
        self.execute(request).await?;
        debug!(request = %request, "Request succeeded");
        Ok(())
    }
}
