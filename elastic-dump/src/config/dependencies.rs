//! Dependency initialization and wiring for the dump tool.

use std::sync::Arc;
use std::time::Duration;

use elastic_client::{ClientConfig, ElasticClient, HealthStatus, TracingLogger};
use tokio::time::sleep;
use tracing::{info, warn};

use super::{ConnectionMode, DumpConfig};
use crate::DumpError;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Client connected to a cluster that answered a health check.
    pub client: ElasticClient,
    /// What to dump.
    pub config: DumpConfig,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// Client settings are read by `ClientConfig::from_env`; dump settings by
    /// `DumpConfig::from_env`. Set `ELASTICSEARCH_WIRE_LOG=true` to log every
    /// request and response body at debug level.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(DumpError)` - If configuration is invalid, or the cluster is
    ///   unreachable in fail-fast mode
    pub async fn new() -> Result<Self, DumpError> {
        let config = DumpConfig::from_env()?;
        let client_config = ClientConfig::from_env()?;

        info!(
            elasticsearch_url = %client_config.url,
            index = %config.index,
            doctype = %config.doctype,
            connection_mode = ?config.connection_mode,
            retry_interval_secs = config.retry_interval.as_secs(),
            "Initializing dependencies"
        );

        let wire_log = std::env::var("ELASTICSEARCH_WIRE_LOG")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let logger = if wire_log {
            TracingLogger::verbose()
        } else {
            TracingLogger::new()
        };

        let client = ElasticClient::connect(client_config)
            .map_err(|e| DumpError::config(format!("Failed to create Elasticsearch client: {}", e)))?
            .with_logger(Arc::new(logger));

        let status =
            wait_until_reachable(&client, config.connection_mode, config.retry_interval).await?;
        info!(status = %status, "Elasticsearch connection established");

        Ok(Self { client, config })
    }
}

/// Poll cluster health until it answers, according to `mode`.
///
/// A red cluster still counts as reachable; the scroll itself reports any
/// failure the red status causes.
pub async fn wait_until_reachable(
    client: &ElasticClient,
    mode: ConnectionMode,
    retry_interval: Duration,
) -> Result<HealthStatus, DumpError> {
    loop {
        match client.health().await {
            Ok(status) => {
                if status == HealthStatus::Red {
                    warn!("Cluster health is red");
                }
                return Ok(status);
            }
            Err(e) => match mode {
                ConnectionMode::FailFast => {
                    return Err(DumpError::config(format!(
                        "Failed to connect to Elasticsearch: {}",
                        e
                    )));
                }
                ConnectionMode::Retry => {
                    warn!(
                        url = %client.config().url,
                        error = %e,
                        retry_interval_secs = retry_interval.as_secs(),
                        "Failed to connect to Elasticsearch, retrying..."
                    );
                    sleep(retry_interval).await;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elastic_client::mock::MockTransport;
    use elastic_client::{ElasticError, RetryPolicy};
    use serde_json::json;

    fn client(transport: &Arc<MockTransport>) -> ElasticClient {
        ElasticClient::with_transport(
            ClientConfig::default().with_retry(RetryPolicy::none()),
            transport.clone(),
        )
    }

    #[tokio::test]
    async fn test_fail_fast_returns_first_error() {
        let transport = Arc::new(MockTransport::scripted(vec![Err(ElasticError::transport(
            "connection refused",
        ))]));

        let result =
            wait_until_reachable(&client(&transport), ConnectionMode::FailFast, Duration::from_secs(15))
                .await;
        assert!(matches!(result.unwrap_err(), DumpError::ConfigError(_)));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_waits_for_cluster() {
        let transport = Arc::new(MockTransport::scripted(vec![
            Err(ElasticError::transport("connection refused")),
            Err(ElasticError::transport("connection refused")),
            Ok(json!({"status": "yellow"})),
        ]));

        let started = tokio::time::Instant::now();
        let status =
            wait_until_reachable(&client(&transport), ConnectionMode::Retry, Duration::from_secs(15))
                .await
                .unwrap();
        assert_eq!(status, HealthStatus::Yellow);
        assert_eq!(transport.request_count(), 3);
        assert!(started.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_red_cluster_is_reachable() {
        let transport = Arc::new(MockTransport::scripted(vec![Ok(json!({"status": "red"}))]));

        let status =
            wait_until_reachable(&client(&transport), ConnectionMode::FailFast, Duration::ZERO)
                .await
                .unwrap();
        assert_eq!(status, HealthStatus::Red);
    }
}
