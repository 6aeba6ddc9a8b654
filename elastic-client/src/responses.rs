//! Typed decoders for the response envelopes the client itself controls.
//!
//! Every decoder requires the fields it reads. A response without `hits`,
//! `aggregations`, `_scroll_id` or `items` is a [`ElasticError::DecodeError`],
//! never an empty default, because an empty default cannot be told apart from a
//! real empty result.

use std::collections::{BTreeMap, HashMap};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::ElasticError;
use crate::types::{
    BulkItemError, BulkOutcome, HealthStatus, Hit, SearchPage, TermAggregationResults, ValueRange,
};

/// Decode a JSON body into `T`, naming the envelope in the error.
pub fn decode<T: DeserializeOwned>(envelope: &str, body: &[u8]) -> Result<T, ElasticError> {
    serde_json::from_slice(body)
        .map_err(|e| ElasticError::decode(format!("could not decode {}: {}", envelope, e)))
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TotalHits {
    Count(u64),
    Object { value: u64 },
}

impl TotalHits {
    fn value(&self) -> u64 {
        match self {
            Self::Count(count) => *count,
            Self::Object { value } => *value,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    total: TotalHits,
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    hits: SearchHits,
}

/// Decode a `_search` response into one page of hits.
pub fn search_page(body: &[u8]) -> Result<SearchPage, ElasticError> {
    let envelope: SearchEnvelope = decode("search response", body)?;
    Ok(SearchPage {
        total: envelope.hits.total.value(),
        hits: envelope.hits.hits,
    })
}

#[derive(Debug, Deserialize)]
struct PageHits {
    hits: Vec<Hit>,
}

/// One page of a scroll: the cursor token to use next and the hits it produced.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScrollPage {
    #[serde(rename = "_scroll_id")]
    pub scroll_id: String,
    #[serde(rename = "hits", deserialize_with = "page_hits")]
    pub hits: Vec<Hit>,
}

fn page_hits<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Vec<Hit>, D::Error> {
    PageHits::deserialize(deserializer).map(|page| page.hits)
}

/// Decode a scroll open/continue response.
pub fn scroll_page(body: &[u8]) -> Result<ScrollPage, ElasticError> {
    decode("scroll page", body)
}

#[derive(Debug, Deserialize)]
struct CreatedEnvelope {
    #[serde(rename = "_id")]
    id: String,
}

/// Decode the id the server assigned to a newly indexed document.
pub fn created_id(body: &[u8]) -> Result<String, ElasticError> {
    decode::<CreatedEnvelope>("index response", body).map(|created| created.id)
}

#[derive(Debug, Deserialize)]
struct BulkItem {
    #[serde(rename = "_id")]
    id: String,
    status: u16,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct BulkEnvelope {
    items: Vec<HashMap<String, BulkItem>>,
}

/// Decode a `_bulk` response into per-id failures.
///
/// Each item is keyed by its action (`index`, `create`, ...); the action name is
/// irrelevant here, only the id and error matter.
pub fn bulk_outcome(body: &[u8]) -> Result<BulkOutcome, ElasticError> {
    let envelope: BulkEnvelope = decode("bulk response", body)?;

    let mut outcome = BulkOutcome {
        total: envelope.items.len(),
        ..BulkOutcome::default()
    };
    for item in envelope.items.into_iter().flat_map(HashMap::into_values) {
        match item.error {
            Some(raw) => {
                outcome.failed += 1;
                outcome.errors.insert(
                    item.id,
                    BulkItemError {
                        status: item.status,
                        error_type: raw.get("type").and_then(Value::as_str).map(str::to_string),
                        reason: raw.get("reason").and_then(Value::as_str).map(str::to_string),
                        raw,
                    },
                );
            }
            None => outcome.succeeded += 1,
        }
    }
    Ok(outcome)
}

#[derive(Debug, Deserialize)]
struct TermsEnvelope {
    aggregations: TermAggregationResults,
}

/// Decode the buckets of one or more terms aggregations.
pub fn term_aggregations(body: &[u8]) -> Result<TermAggregationResults, ElasticError> {
    decode::<TermsEnvelope>("terms aggregation", body).map(|envelope| envelope.aggregations)
}

#[derive(Debug, Deserialize)]
struct MetricValue<T> {
    value: Option<T>,
}

#[derive(Debug, Deserialize)]
struct MetricEnvelope<T> {
    aggregations: BTreeMap<String, MetricValue<T>>,
}

fn metric<T: DeserializeOwned>(
    envelope: &str,
    body: &[u8],
    names: &[&str],
) -> Result<Vec<Option<T>>, ElasticError> {
    let mut decoded: MetricEnvelope<T> = decode(envelope, body)?;
    names
        .iter()
        .map(|name| {
            decoded
                .aggregations
                .remove(*name)
                .map(|metric| metric.value)
                .ok_or_else(|| {
                    ElasticError::decode(format!("{} is missing aggregation {}", envelope, name))
                })
        })
        .collect()
}

/// Decode the `min_<field>` / `max_<field>` pair of a range aggregation.
pub fn value_range(body: &[u8], min_name: &str, max_name: &str) -> Result<ValueRange, ElasticError> {
    let mut values = metric::<f64>("range aggregation", body, &[min_name, max_name])?.into_iter();
    let min = values.next().flatten();
    let max = values.next().flatten();
    Ok(ValueRange { min, max })
}

/// Decode the distinct count of a cardinality aggregation.
pub fn cardinality(body: &[u8], name: &str) -> Result<u64, ElasticError> {
    metric::<u64>("cardinality aggregation", body, &[name])?
        .into_iter()
        .next()
        .flatten()
        .ok_or_else(|| ElasticError::decode(format!("aggregation {} has no value", name)))
}

#[derive(Debug, Deserialize)]
struct HealthEnvelope {
    status: String,
}

/// Decode `_cluster/health`.
pub fn health(body: &[u8]) -> Result<HealthStatus, ElasticError> {
    decode::<HealthEnvelope>("cluster health", body)
        .map(|envelope| HealthStatus::from_status(&envelope.status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bytes(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_search_page_legacy_total() {
        let body = bytes(json!({
            "took": 3,
            "hits": {
                "total": 2,
                "hits": [
                    {"_id": "1", "_index": "idx", "_score": 1.0, "_source": {"n": 1}},
                    {"_id": "2", "_index": "idx", "_score": 1.0, "_source": {"n": 2}}
                ]
            }
        }));
        let page = search_page(&body).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.hits.len(), 2);
        assert_eq!(page.hits[1].source.as_ref().unwrap()["n"].as_i64(), Some(2));
    }

    #[test]
    fn test_search_page_object_total() {
        let body = bytes(json!({
            "hits": {"total": {"value": 12000, "relation": "gte"}, "hits": []}
        }));
        let page = search_page(&body).unwrap();
        assert_eq!(page.total, 12000);
        assert!(page.hits.is_empty());
    }

    #[test]
    fn test_search_page_missing_hits_is_decode_error() {
        let body = bytes(json!({"took": 1}));
        assert!(matches!(
            search_page(&body).unwrap_err(),
            ElasticError::DecodeError(_)
        ));
    }

    #[test]
    fn test_scroll_page() {
        let body = bytes(json!({
            "_scroll_id": "cursor-1",
            "hits": {"total": 1, "hits": [{"_id": "a", "_source": {}}]}
        }));
        let page = scroll_page(&body).unwrap();
        assert_eq!(page.scroll_id, "cursor-1");
        assert_eq!(page.hits.len(), 1);
    }

    #[test]
    fn test_scroll_page_requires_scroll_id() {
        let body = bytes(json!({"hits": {"hits": []}}));
        assert!(matches!(
            scroll_page(&body).unwrap_err(),
            ElasticError::DecodeError(_)
        ));
    }

    #[test]
    fn test_bulk_outcome_reports_only_failures() {
        let body = bytes(json!({
            "took": 10,
            "errors": true,
            "items": [
                {"index": {"_id": "1", "status": 201}},
                {"index": {"_id": "2", "status": 400, "error": {
                    "type": "mapper_parsing_exception",
                    "reason": "failed to parse"
                }}},
                {"create": {"_id": "3", "status": 201}}
            ]
        }));
        let outcome = bulk_outcome(&body).unwrap();
        assert_eq!(outcome.total, 3);
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failed, 1);
        assert!(!outcome.is_success());
        let error = &outcome.errors["2"];
        assert_eq!(error.status, 400);
        assert_eq!(error.error_type.as_deref(), Some("mapper_parsing_exception"));
        assert_eq!(error.reason.as_deref(), Some("failed to parse"));
    }

    #[test]
    fn test_bulk_outcome_missing_items() {
        let body = bytes(json!({"errors": false}));
        assert!(matches!(
            bulk_outcome(&body).unwrap_err(),
            ElasticError::DecodeError(_)
        ));
    }

    #[test]
    fn test_term_aggregations() {
        let body = bytes(json!({
            "hits": {"total": 3, "hits": []},
            "aggregations": {
                "field1": {"buckets": [{"key": "value1", "doc_count": 3}]}
            }
        }));
        let results = term_aggregations(&body).unwrap();
        let buckets = &results["field1"].buckets;
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].key, json!("value1"));
        assert_eq!(buckets[0].count, 3);
    }

    #[test]
    fn test_term_aggregations_missing_aggregations() {
        let body = bytes(json!({"hits": {"total": 0, "hits": []}}));
        assert!(matches!(
            term_aggregations(&body).unwrap_err(),
            ElasticError::DecodeError(_)
        ));
    }

    #[test]
    fn test_value_range() {
        let body = bytes(json!({
            "aggregations": {
                "min_field1": {"value": 1.0},
                "max_field1": {"value": 1000.0}
            }
        }));
        let range = value_range(&body, "min_field1", "max_field1").unwrap();
        assert_eq!(range.min, Some(1.0));
        assert_eq!(range.max, Some(1000.0));
    }

    #[test]
    fn test_value_range_empty_index() {
        let body = bytes(json!({
            "aggregations": {
                "min_field1": {"value": null},
                "max_field1": {"value": null}
            }
        }));
        let range = value_range(&body, "min_field1", "max_field1").unwrap();
        assert_eq!(range, ValueRange { min: None, max: None });
    }

    #[test]
    fn test_value_range_missing_aggregation() {
        let body = bytes(json!({"aggregations": {"min_field1": {"value": 1.0}}}));
        assert!(matches!(
            value_range(&body, "min_field1", "max_field1").unwrap_err(),
            ElasticError::DecodeError(_)
        ));
    }

    #[test]
    fn test_cardinality() {
        let body = bytes(json!({"aggregations": {"count_field1": {"value": 3}}}));
        assert_eq!(cardinality(&body, "count_field1").unwrap(), 3);

        let body = bytes(json!({"aggregations": {}}));
        assert!(cardinality(&body, "count_field1").is_err());
    }

    #[test]
    fn test_health() {
        let body = bytes(json!({"cluster_name": "es", "status": "yellow"}));
        assert_eq!(health(&body).unwrap(), HealthStatus::Yellow);

        let body = bytes(json!({"cluster_name": "es", "status": "unknown"}));
        assert_eq!(health(&body).unwrap(), HealthStatus::Red);

        let body = bytes(json!({"cluster_name": "es"}));
        assert!(health(&body).is_err());
    }

    #[test]
    fn test_created_id() {
        let body = bytes(json!({"_index": "idx", "_id": "generated", "result": "created"}));
        assert_eq!(created_id(&body).unwrap(), "generated");
    }
}
