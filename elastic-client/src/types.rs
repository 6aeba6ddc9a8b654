//! Request and response types for Elasticsearch operations.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// A schema-less document: field name → JSON value.
///
/// Integer fields stay integers (`serde_json::Number` keeps the i64/u64/f64
/// distinction), so a round trip through the cluster never turns `42` into `42.0`.
/// Integers outside the i64/u64 range and decimals with more digits than an
/// `f64` holds are rounded to the nearest `f64`; store such values as strings.
pub type Document = Map<String, Value>;

/// Refresh semantics for write operations.
///
/// See <https://www.elastic.co/guide/en/elasticsearch/reference/current/docs-refresh.html>.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Refresh {
    /// Refresh the relevant primary and replica shards immediately.
    True,
    /// Do not force a refresh; wait until the next scheduled one makes the change visible.
    WaitFor,
    /// Do nothing refresh-related. The fastest option.
    #[default]
    False,
}

impl Refresh {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::True => "true",
            Self::WaitFor => "wait_for",
            Self::False => "false",
        }
    }
}

impl From<bool> for Refresh {
    fn from(refresh: bool) -> Self {
        if refresh {
            Self::True
        } else {
            Self::False
        }
    }
}

impl fmt::Display for Refresh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction of an [`Order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Single-field ordering for paged search. Serializes as `{"<field>": "asc"|"desc"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub field: String,
    pub direction: SortDirection,
}

impl Order {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

impl Serialize for Order {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &self.direction)?;
        map.end()
    }
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_index", default)]
    pub index: Option<String>,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    /// Absent when the query disabled `_source`.
    #[serde(rename = "_source", default)]
    pub source: Option<Document>,
}

/// One page of a paged search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    /// Total number of matching documents, not just the ones on this page.
    pub total: u64,
    pub hits: Vec<Hit>,
}

/// A document fetched by id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FetchedDocument {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_version", default)]
    pub version: Option<i64>,
    pub found: bool,
    #[serde(rename = "_source", default)]
    pub source: Option<Document>,
}

/// Terms aggregation over one field. The higher `size`, the more accurate the buckets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermAggregation {
    pub field: String,
    pub size: usize,
}

impl TermAggregation {
    pub fn new(field: impl Into<String>, size: usize) -> Self {
        Self {
            field: field.into(),
            size,
        }
    }
}

impl Serialize for TermAggregation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Terms<'a> {
            field: &'a str,
            size: usize,
        }

        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(
            "terms",
            &Terms {
                field: &self.field,
                size: self.size,
            },
        )?;
        map.end()
    }
}

/// Several terms aggregations sent in one request, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TermAggregations(BTreeMap<String, TermAggregation>);

impl TermAggregations {
    pub fn new(aggregations: impl IntoIterator<Item = TermAggregation>) -> Self {
        Self(
            aggregations
                .into_iter()
                .map(|agg| (agg.field.clone(), agg))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// How often one key occurred in a terms aggregation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Bucket {
    pub key: Value,
    #[serde(rename = "doc_count")]
    pub count: u64,
}

/// Buckets produced by one terms aggregation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TermAggregationResult {
    pub buckets: Vec<Bucket>,
}

/// Terms aggregation results keyed by field name.
pub type TermAggregationResults = BTreeMap<String, TermAggregationResult>;

/// Minimum and maximum of a numeric field.
///
/// Both are `None` when no document has the field, which is different from a
/// real range starting at zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Why one document of a bulk request was rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItemError {
    /// Per-item HTTP status reported by the server.
    pub status: u16,
    /// `error.type`, e.g. `mapper_parsing_exception`.
    pub error_type: Option<String>,
    /// `error.reason`.
    pub reason: Option<String>,
    /// The complete `error` object as returned by the server.
    pub raw: Value,
}

impl fmt::Display for BulkItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not bulk import document (status {}): {}", self.status, self.raw)
    }
}

impl std::error::Error for BulkItemError {}

/// Summary of a bulk insert.
///
/// The request as a whole succeeded; `errors` holds only the ids the server
/// rejected. An id that is absent from `errors` was indexed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BulkOutcome {
    /// Number of items the server reported on.
    pub total: usize,
    /// Number of items indexed.
    pub succeeded: usize,
    /// Number of items rejected.
    pub failed: usize,
    /// Rejected document id → reason.
    pub errors: BTreeMap<String, BulkItemError>,
}

impl BulkOutcome {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Cluster health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Green,
    Yellow,
    Red,
}

impl HealthStatus {
    /// Map the server's status string; anything other than green or yellow is red.
    pub fn from_status(status: &str) -> Self {
        match status {
            "green" => Self::Green,
            "yellow" => Self::Yellow,
            _ => Self::Red,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
