//! Tests against a real cluster.
//!
//! These are ignored by default. Run them with a disposable cluster listening on
//! `ELASTICSEARCH_URL` (default http://localhost:9200):
//!
//! ```text
//! cargo test -p elastic-client --test live_elasticsearch -- --ignored --test-threads=1
//! ```

use std::collections::BTreeMap;

use elastic_client::{
    ClientConfig, Document, ElasticClient, HealthStatus, Refresh, TermAggregation,
    TermAggregations,
};
use serde_json::{json, Value};

async fn live_client() -> ElasticClient {
    let client = ElasticClient::connect(ClientConfig::from_env().unwrap()).unwrap();
    client.ping().await.expect("cluster is not reachable");
    client
}

/// Start from an empty index; a missing index is fine.
async fn reset(client: &ElasticClient, index: &str) {
    if let Err(e) = client.delete_index(index).await {
        assert!(e.is_not_found(), "could not delete {}: {}", index, e);
    }
}

fn doc(value: Value) -> Document {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
#[ignore]
async fn test_insert_get_delete_document() {
    let client = live_client().await;
    let index = "testclient_insertgetdeletedocument";
    reset(&client, index).await;

    let document = doc(json!({"field1": "value1", "field2": "value2", "field3": "value3"}));
    client
        .insert_document(index, "doc", "1", &document, Refresh::True)
        .await
        .unwrap();

    let fetched = client.get_document(index, "doc", "1").await.unwrap();
    assert_eq!(fetched.source.unwrap()["field1"], "value1");

    client
        .delete_document(index, "doc", "1", Refresh::True)
        .await
        .unwrap();
    let error = client.get_document(index, "doc", "1").await.unwrap_err();
    assert!(error.is_not_found());
}

#[tokio::test]
#[ignore]
async fn test_update_document() {
    let client = live_client().await;
    let index = "testclient_updatedocument";
    reset(&client, index).await;

    let document = doc(json!({"field1": "value1", "field2": "value2"}));
    client
        .insert_document(index, "doc", "1", &document, Refresh::True)
        .await
        .unwrap();
    client
        .update_document(
            index,
            "doc",
            "1",
            "ctx._source.field1 = params.value",
            Some(&doc(json!({"value": "valueX"}))),
            Refresh::True,
        )
        .await
        .unwrap();

    let fetched = client.get_document(index, "doc", "1").await.unwrap();
    assert_eq!(fetched.source.unwrap()["field1"], "valueX");
}

#[tokio::test]
#[ignore]
async fn test_scroll_documents() {
    let client = live_client().await;
    let index = "testclient_scrolldocuments";
    reset(&client, index).await;

    let docs: BTreeMap<String, Value> = (0..3456)
        .map(|n| (n.to_string(), json!({"field": "value"})))
        .collect();
    assert!(client
        .insert_documents(index, "doc", &docs)
        .await
        .unwrap()
        .is_success());
    client.refresh_index(index).await.unwrap();

    let hits = client
        .scroll_documents(index, "doc", None)
        .await
        .unwrap()
        .collect_all()
        .await
        .unwrap();
    assert_eq!(hits.len(), 3456);
}

#[tokio::test]
#[ignore]
async fn test_scroll_single_document() {
    let client = live_client().await;
    let index = "testclient_scrolldocuments2";
    reset(&client, index).await;

    client
        .insert_document(index, "doc", "1", &doc(json!({"field": "value"})), Refresh::True)
        .await
        .unwrap();

    let mut scroll = client.scroll_documents(index, "doc", None).await.unwrap();
    let mut count = 0;
    while let Some(hit) = scroll.next().await {
        hit.unwrap();
        count += 1;
    }
    let summary = scroll.finish().await.unwrap();
    assert_eq!(count, 1);
    assert!(summary.released);
}

#[tokio::test]
#[ignore]
async fn test_bulk_insert_with_invalid_document() {
    let client = live_client().await;
    let index = "testclient_insertdocuments2";
    reset(&client, index).await;

    let mut docs = BTreeMap::new();
    docs.insert("1".to_string(), json!({"field1": "value1"}));
    docs.insert("2".to_string(), Value::Null);
    docs.insert("3".to_string(), json!({"field1": "value3"}));

    let outcome = client.insert_documents(index, "doc", &docs).await.unwrap();
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors.contains_key("2"));

    client.refresh_index(index).await.unwrap();
    let count = client
        .cardinality_aggregate(index, "doc", None, "field1.keyword")
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
#[ignore]
async fn test_term_and_range_aggregate() {
    let client = live_client().await;
    let index = "testclient_termaggregate";
    reset(&client, index).await;

    for (id, field2, number) in [("1", "value2", 1), ("2", "value3", 500), ("3", "value4", 1000)] {
        let document = doc(json!({"field1": "value1", "field2": field2, "number": number}));
        client
            .insert_document(index, "doc", id, &document, Refresh::True)
            .await
            .unwrap();
    }

    let aggs = TermAggregations::new(vec![
        TermAggregation::new("field1.keyword", 10),
        TermAggregation::new("field2.keyword", 10),
    ]);
    let terms = client.term_aggregate(index, "doc", None, &aggs).await.unwrap();
    let field1 = &terms["field1.keyword"].buckets;
    assert_eq!(field1.len(), 1);
    assert_eq!(field1[0].key, json!("value1"));
    assert_eq!(field1[0].count, 3);
    assert_eq!(terms["field2.keyword"].buckets.len(), 3);

    let range = client.range_aggregate(index, "doc", None, "number").await.unwrap();
    assert_eq!(range.min, Some(1.0));
    assert_eq!(range.max, Some(1000.0));
}

#[tokio::test]
#[ignore]
async fn test_health() {
    let client = live_client().await;
    let status = client.health().await.unwrap();
    assert!(matches!(status, HealthStatus::Green | HealthStatus::Yellow));
}
