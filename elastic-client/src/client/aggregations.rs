//! Terms, range and cardinality aggregations.

use serde_json::{json, Map, Value};
use tracing::debug;

use super::ElasticClient;
use crate::errors::ElasticError;
use crate::request::ApiRequest;
use crate::responses;
use crate::types::{TermAggregationResults, TermAggregations, ValueRange};
use crate::utils::segments;

impl ElasticClient {
    /// Build and send a `size: 0` search carrying only aggregations.
    async fn aggregate(
        &self,
        index: &str,
        doctype: &str,
        query: Option<&Value>,
        aggs: Value,
    ) -> Result<Vec<u8>, ElasticError> {
        let mut path = segments(&[("index", index), ("doctype", doctype)])?;
        path.push("_search".to_string());

        let mut body = Map::new();
        body.insert("size".to_string(), json!(0));
        body.insert("aggs".to_string(), aggs);
        if let Some(query) = query {
            body.insert("query".to_string(), query.clone());
        }

        self.execute(&ApiRequest::get(path).json(&body)?).await
    }

    /// Count documents per distinct value, for one or more fields at once.
    ///
    /// Results are keyed by field name.
    pub async fn term_aggregate(
        &self,
        index: &str,
        doctype: &str,
        query: Option<&Value>,
        aggregations: &TermAggregations,
    ) -> Result<TermAggregationResults, ElasticError> {
        if aggregations.is_empty() {
            return Err(ElasticError::validation(
                "At least one term aggregation must be provided",
            ));
        }

        let aggs = serde_json::to_value(aggregations)?;
        let body = self.aggregate(index, doctype, query, aggs).await?;
        let results = responses::term_aggregations(&body)?;

        debug!(index = %index, aggregations = results.len(), "Term aggregation completed");
        Ok(results)
    }

    /// Minimum and maximum value of a numeric field.
    pub async fn range_aggregate(
        &self,
        index: &str,
        doctype: &str,
        query: Option<&Value>,
        field: &str,
    ) -> Result<ValueRange, ElasticError> {
        let min_name = format!("min_{}", field);
        let max_name = format!("max_{}", field);
        let aggs = json!({
            &min_name: {"min": {"field": field}},
            &max_name: {"max": {"field": field}},
        });

        let body = self.aggregate(index, doctype, query, aggs).await?;
        let range = responses::value_range(&body, &min_name, &max_name)?;

        debug!(index = %index, field = %field, min = ?range.min, max = ?range.max, "Range aggregation completed");
        Ok(range)
    }

    /// Approximate number of distinct values of a field.
    pub async fn cardinality_aggregate(
        &self,
        index: &str,
        doctype: &str,
        query: Option<&Value>,
        field: &str,
    ) -> Result<u64, ElasticError> {
        let name = format!("count_{}", field);
        let aggs = json!({ &name: {"cardinality": {"field": field}} });

        let body = self.aggregate(index, doctype, query, aggs).await?;
        let count = responses::cardinality(&body, &name)?;

        debug!(index = %index, field = %field, count, "Cardinality aggregation completed");
        Ok(count)
    }
}
