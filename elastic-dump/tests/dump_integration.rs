//! Integration tests for the dump pipeline.
//!
//! These drive `dump_index` through the public API against a mock transport
//! that pages a fixed set of documents.

use std::sync::{Arc, Mutex};

use elastic_client::mock::MockTransport;
use elastic_client::{ClientConfig, ElasticClient, Method, RetryPolicy, ScrollConfig};
use elastic_dump::{dump_index, DumpConfig};
use serde_json::{json, Value};

fn paging_transport(total: usize) -> Arc<MockTransport> {
    let offset = Mutex::new(0usize);
    Arc::new(MockTransport::new(move |request| {
        if request.method == Method::Delete {
            return Ok(json!({"succeeded": true, "num_freed": 1}));
        }
        let mut offset = offset.lock().unwrap();
        let end = (*offset + 100).min(total);
        let hits: Vec<Value> = (*offset..end)
            .map(|n| json!({"_index": "events", "_id": format!("e{}", n), "_source": {"seq": n}}))
            .collect();
        *offset = end;
        Ok(json!({"_scroll_id": "cursor", "hits": {"total": total, "hits": hits}}))
    }))
}

#[tokio::test]
async fn test_dump_configured_index() {
    let config = DumpConfig::from_lookup(|name| match name {
        "DUMP_INDEX" => Some("events".to_string()),
        "DUMP_QUERY" => Some(r#"{"range": {"seq": {"gte": 0}}}"#.to_string()),
        _ => None,
    })
    .unwrap();

    let transport = paging_transport(250);
    let scroll = ScrollConfig {
        page_size: 100,
        ..ScrollConfig::default()
    };
    let client = ElasticClient::with_transport(
        ClientConfig::default()
            .with_retry(RetryPolicy::none())
            .with_scroll(scroll),
        transport.clone(),
    );

    let mut output = Vec::new();
    let summary = dump_index(
        &client,
        &config.index,
        &config.doctype,
        config.query.clone(),
        &mut output,
    )
    .await
    .unwrap();

    let text = String::from_utf8(output).unwrap();
    let sequence: Vec<u64> = text
        .lines()
        .map(|line| serde_json::from_str::<Value>(line).unwrap()["_source"]["seq"].as_u64().unwrap())
        .collect();
    assert_eq!(sequence, (0..250).collect::<Vec<u64>>());
    assert_eq!(summary.pages, 4);
    assert!(summary.released);

    let open = &transport.requests()[0];
    assert_eq!(open.path(), "events/doc/_search");
    assert_eq!(open.json_body().unwrap()["query"], config.query.unwrap());
}
