//! Connectivity and cluster health.

use tracing::debug;

use super::ElasticClient;
use crate::errors::ElasticError;
use crate::request::ApiRequest;
use crate::responses;
use crate::types::HealthStatus;

impl ElasticClient {
    /// Check that the cluster answers at all.
    pub async fn ping(&self) -> Result<(), ElasticError> {
        self.execute_unit(&ApiRequest::get(Vec::new())).await
    }

    /// Overall cluster health. An unrecognised status is reported as red.
    pub async fn health(&self) -> Result<HealthStatus, ElasticError> {
        let request = ApiRequest::get(vec!["_cluster".to_string(), "health".to_string()]);
        let body = self.execute(&request).await?;
        let status = responses::health(&body)?;

        debug!(status = %status, "Cluster health fetched");
        Ok(status)
    }
}
