//! Index, template and snapshot administration.

use serde_json::{json, Value};
use tracing::info;

use super::ElasticClient;
use crate::errors::ElasticError;
use crate::request::ApiRequest;
use crate::utils::segments;

impl ElasticClient {
    /// Delete an index and every document in it.
    pub async fn delete_index(&self, index: &str) -> Result<(), ElasticError> {
        let path = segments(&[("index", index)])?;
        self.execute(&ApiRequest::delete(path)).await?;

        info!(index = %index, "Index deleted");
        self.logger.info(&format!("Deleted index {}", index));
        Ok(())
    }

    /// Make every write accepted so far on `index` visible to search.
    pub async fn refresh_index(&self, index: &str) -> Result<(), ElasticError> {
        let mut path = segments(&[("index", index)])?;
        path.push("_refresh".to_string());
        self.execute_unit(&ApiRequest::post(path)).await
    }

    /// Install or replace an index template.
    ///
    /// `template` is sent verbatim, so its shape is whatever the server version
    /// expects (`index_patterns`, `settings`, `mappings`, ...).
    pub async fn add_template(&self, id: &str, template: &Value) -> Result<(), ElasticError> {
        let mut path = vec!["_template".to_string()];
        path.extend(segments(&[("template id", id)])?);
        self.execute(&ApiRequest::put(path).json(template)?).await?;

        info!(template = %id, "Index template installed");
        Ok(())
    }

    /// Remove an index template.
    pub async fn delete_template(&self, id: &str) -> Result<(), ElasticError> {
        let mut path = vec!["_template".to_string()];
        path.extend(segments(&[("template id", id)])?);
        self.execute(&ApiRequest::delete(path)).await?;

        info!(template = %id, "Index template deleted");
        Ok(())
    }

    /// Register a shared-filesystem snapshot repository.
    ///
    /// `location` must be listed under `path.repo` in the server's configuration.
    pub async fn add_repository(&self, name: &str, location: &str) -> Result<(), ElasticError> {
        let mut path = vec!["_snapshot".to_string()];
        path.extend(segments(&[("repository", name)])?);

        let request = ApiRequest::put(path).json(&json!({
            "type": "fs",
            "settings": {"location": location},
        }))?;
        self.execute(&request).await?;

        info!(repository = %name, location = %location, "Snapshot repository registered");
        Ok(())
    }

    /// Take a snapshot of the whole cluster into `repository`.
    ///
    /// Returns once the snapshot has completed.
    pub async fn add_snapshot(&self, repository: &str, name: &str) -> Result<(), ElasticError> {
        let mut path = vec!["_snapshot".to_string()];
        path.extend(segments(&[("repository", repository), ("snapshot", name)])?);

        let request = ApiRequest::put(path).param("wait_for_completion", "true");
        self.execute(&request).await?;

        info!(repository = %repository, snapshot = %name, "Snapshot completed");
        self.logger
            .info(&format!("Snapshot {} completed in repository {}", name, repository));
        Ok(())
    }
}
