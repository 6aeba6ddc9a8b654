//! Bulk document import.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use tracing::{debug, warn};

use super::ElasticClient;
use crate::errors::ElasticError;
use crate::request::ApiRequest;
use crate::responses;
use crate::types::BulkOutcome;
use crate::utils::segments;

/// Encode `(id, document)` pairs as `_bulk` index actions in NDJSON.
fn encode_bulk_body(docs: &BTreeMap<String, Value>) -> Result<Vec<u8>, ElasticError> {
    let mut body = Vec::new();
    for (id, doc) in docs {
        if id.is_empty() {
            return Err(ElasticError::validation("bulk document id is required"));
        }
        serde_json::to_writer(&mut body, &json!({"index": {"_id": id}}))?;
        body.push(b'\n');
        serde_json::to_writer(&mut body, doc)?;
        body.push(b'\n');
    }
    Ok(body)
}

impl ElasticClient {
    /// Index many documents in one request, keyed by document id.
    ///
    /// Documents are arbitrary JSON values so that callers can pass through
    /// whatever they received; the server rejects anything that is not an object.
    ///
    /// # Returns
    ///
    /// * `Ok(BulkOutcome)` - The request went through. Ids the server rejected are in
    ///   `outcome.errors`; every other id was indexed. Check it even on `Ok`.
    /// * `Err(ElasticError)` - The batch as a whole failed; nothing can be assumed indexed
    pub async fn insert_documents(
        &self,
        index: &str,
        doctype: &str,
        docs: &BTreeMap<String, Value>,
    ) -> Result<BulkOutcome, ElasticError> {
        if docs.is_empty() {
            return Ok(BulkOutcome::default());
        }

        let mut path = segments(&[("index", index), ("doctype", doctype)])?;
        path.push("_bulk".to_string());

        let request = ApiRequest::put(path).ndjson(encode_bulk_body(docs)?);
        let body = self.execute(&request).await?;
        let outcome = responses::bulk_outcome(&body)?;

        if outcome.is_success() {
            debug!(index = %index, total = outcome.total, "Bulk import completed");
        } else {
            warn!(
                index = %index,
                total = outcome.total,
                failed = outcome.failed,
                "Bulk import completed with rejected documents"
            );
        }
        Ok(outcome)
    }
}
