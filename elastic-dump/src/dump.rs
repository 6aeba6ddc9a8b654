//! Streams one index to a writer as newline-delimited JSON.

use elastic_client::{DocumentScroll, ElasticClient, Hit, ScrollSummary};
use serde_json::{json, Value};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{error, info};

use crate::DumpError;

/// Encode one hit as a single NDJSON line.
fn encode_hit(hit: &Hit) -> Result<Vec<u8>, DumpError> {
    let mut line = serde_json::to_vec(&json!({
        "_index": hit.index,
        "_id": hit.id,
        "_source": hit.source,
    }))?;
    line.push(b'\n');
    Ok(line)
}

async fn write_hits<W>(scroll: &mut DocumentScroll, writer: &mut W) -> Result<u64, DumpError>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;
    while let Some(item) = scroll.next().await {
        let hit = item?;
        writer.write_all(&encode_hit(&hit)?).await?;
        written += 1;
    }
    writer.flush().await?;
    Ok(written)
}

/// Write every document of `index` matching `query` to `writer`, one JSON object
/// per line.
///
/// Lines written before a failure stay written. The scroll cursor is released
/// however this returns.
///
/// # Returns
///
/// * `Ok(ScrollSummary)` - Every matching document was written
/// * `Err(DumpError)` - The scroll or the writer failed part way
pub async fn dump_index<W>(
    client: &ElasticClient,
    index: &str,
    doctype: &str,
    query: Option<Value>,
    writer: &mut W,
) -> Result<ScrollSummary, DumpError>
where
    W: AsyncWrite + Unpin,
{
    info!(index = %index, doctype = %doctype, "Starting dump");
    let mut scroll = client.scroll_documents(index, doctype, query).await?;

    match write_hits(&mut scroll, writer).await {
        Ok(written) => {
            let summary = scroll.finish().await?;
            info!(
                index = %index,
                documents = written,
                pages = summary.pages,
                "Dump completed"
            );
            Ok(summary)
        }
        Err(e) => {
            error!(index = %index, error = %e, "Dump failed");
            let _ = scroll.finish().await;
            Err(e)
        }
    }
}
