//! Scroll engine.
//!
//! A scroll reads every document matching a query through a server-side cursor,
//! without the 10,000-hit window of plain paged search. One background task per
//! scroll owns the cursor and pages strictly sequentially (one request in flight);
//! decoded hits flow to the consumer through a small bounded channel so the
//! producer never runs more than a page ahead of a slow reader.
//!
//! The final cursor is always released: exactly once on exhaustion, and
//! best-effort when the scroll fails or the consumer walks away early.

use serde_json::{json, Map, Value};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, warn};

use crate::client::ElasticClient;
use crate::config::ScrollConfig;
use crate::errors::ElasticError;
use crate::request::ApiRequest;
use crate::responses::{self, ScrollPage};
use crate::types::Hit;
use crate::utils::segments;

type ScrollItem = Result<Hit, ElasticError>;

/// What the producer task reports once it stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollSummary {
    /// Page responses received, including the terminal empty page.
    pub pages: u64,
    /// Hits handed to the consumer.
    pub documents: u64,
    /// Whether the server-side cursor was released.
    pub released: bool,
    /// Whether the consumer stopped reading before the scroll was exhausted.
    pub abandoned: bool,
}

/// Consumer side of a running scroll.
///
/// Dropping it (or calling [`finish`](Self::finish) early) stops the producer at
/// its next page boundary and releases the cursor in the background.
pub struct DocumentScroll {
    receiver: mpsc::Receiver<ScrollItem>,
    handle: JoinHandle<Result<ScrollSummary, ElasticError>>,
}

impl DocumentScroll {
    /// Wait for the next hit.
    ///
    /// Returns `None` once the scroll is exhausted or has failed. A failure is
    /// delivered once as `Some(Err(..))` before the end of the sequence.
    pub async fn next(&mut self) -> Option<ScrollItem> {
        self.receiver.recv().await
    }

    /// Stop reading and wait for the producer to clean up.
    ///
    /// # Returns
    ///
    /// * `Ok(ScrollSummary)` - The producer stopped normally; `abandoned` is set if
    ///   hits were still pending when this was called
    /// * `Err(ElasticError)` - The error that aborted the scroll, or
    ///   `ElasticError::ScrollError` if the producer task panicked or was cancelled
    pub async fn finish(self) -> Result<ScrollSummary, ElasticError> {
        let Self { receiver, handle } = self;
        drop(receiver);
        handle
            .await
            .map_err(|e| ElasticError::scroll(format!("scroll producer did not complete: {}", e)))?
    }

    /// Read every remaining hit, then wait for the producer.
    pub async fn collect_all(mut self) -> Result<Vec<Hit>, ElasticError> {
        let mut hits = Vec::new();
        while let Some(item) = self.next().await {
            match item {
                Ok(hit) => hits.push(hit),
                Err(e) => {
                    let _ = self.finish().await;
                    return Err(e);
                }
            }
        }
        self.finish().await?;
        Ok(hits)
    }

    /// Split into a `Stream` of hits and the producer's handle.
    ///
    /// Drain the stream, or drop it, before awaiting the handle: the producer
    /// waits on the bounded channel and never finishes while the stream is
    /// held unread.
    pub fn into_stream(
        self,
    ) -> (
        ReceiverStream<ScrollItem>,
        JoinHandle<Result<ScrollSummary, ElasticError>>,
    ) {
        (ReceiverStream::new(self.receiver), self.handle)
    }
}

/// How the paging loop ended when no error occurred.
enum Drained {
    Exhausted,
    Abandoned,
}

/// Producer half: owns the cursor for the lifetime of one scroll.
struct ScrollProducer {
    client: ElasticClient,
    index: String,
    doctype: String,
    query: Option<Value>,
    config: ScrollConfig,
    sender: mpsc::Sender<ScrollItem>,
}

impl ScrollProducer {
    async fn run(self) -> Result<ScrollSummary, ElasticError> {
        let mut summary = ScrollSummary::default();
        let mut cursor: Option<String> = None;

        match self.drain(&mut summary, &mut cursor).await {
            Ok(Drained::Exhausted) => {
                if let Some(scroll_id) = cursor.as_deref() {
                    if let Err(e) = self.release(scroll_id).await {
                        error!(index = %self.index, error = %e, "Failed to release exhausted scroll");
                        let _ = self.sender.send(Err(e.clone())).await;
                        return Err(e);
                    }
                    summary.released = true;
                }
                info!(
                    index = %self.index,
                    pages = summary.pages,
                    documents = summary.documents,
                    "Scroll exhausted"
                );
                Ok(summary)
            }
            Ok(Drained::Abandoned) => {
                summary.abandoned = true;
                if let Some(scroll_id) = cursor.as_deref() {
                    summary.released = self.release_best_effort(scroll_id).await;
                }
                info!(
                    index = %self.index,
                    documents = summary.documents,
                    released = summary.released,
                    "Scroll abandoned by consumer"
                );
                Ok(summary)
            }
            Err(e) => {
                error!(index = %self.index, error = %e, "Scroll aborted");
                let _ = self.sender.send(Err(e.clone())).await;
                if let Some(scroll_id) = cursor.as_deref() {
                    self.release_best_effort(scroll_id).await;
                }
                Err(e)
            }
        }
    }

    /// Page until exhaustion or until nobody is listening.
    ///
    /// `cursor` always holds the latest token, so the caller can release it
    /// whichever way this returns.
    async fn drain(
        &self,
        summary: &mut ScrollSummary,
        cursor: &mut Option<String>,
    ) -> Result<Drained, ElasticError> {
        let mut page = self.open().await?;
        let mut empty_pages = 0u32;

        loop {
            summary.pages += 1;
            let previous = cursor.replace(page.scroll_id.clone());

            if page.hits.is_empty() {
                empty_pages += 1;
                let unchanged = previous.as_deref() == Some(page.scroll_id.as_str());
                if unchanged || empty_pages >= 2 {
                    return Ok(Drained::Exhausted);
                }
            } else {
                empty_pages = 0;
                debug!(index = %self.index, page = summary.pages, hits = page.hits.len(), "Scroll page received");
                for hit in page.hits {
                    if self.sender.send(Ok(hit)).await.is_err() {
                        return Ok(Drained::Abandoned);
                    }
                    summary.documents += 1;
                }
            }

            if self.sender.is_closed() {
                return Ok(Drained::Abandoned);
            }
            page = self.continue_scroll(&page.scroll_id).await?;
        }
    }

    async fn open(&self) -> Result<ScrollPage, ElasticError> {
        let mut path = segments(&[("index", self.index.as_str()), ("doctype", self.doctype.as_str())])?;
        path.push("_search".to_string());

        let mut body = Map::new();
        body.insert("size".to_string(), json!(self.config.page_size));
        body.insert("sort".to_string(), json!(["_doc"]));
        if let Some(query) = &self.query {
            body.insert("query".to_string(), query.clone());
        }

        let request = ApiRequest::get(path)
            .param("scroll", self.config.keep_alive.as_str())
            .json(&body)?;
        let response = self.client.execute(&request).await?;
        responses::scroll_page(&response)
    }

    async fn continue_scroll(&self, scroll_id: &str) -> Result<ScrollPage, ElasticError> {
        let request = ApiRequest::post(scroll_path()).json(&json!({
            "scroll": self.config.keep_alive,
            "scroll_id": scroll_id,
        }))?;
        let response = self.client.execute(&request).await?;
        responses::scroll_page(&response)
    }

    async fn release(&self, scroll_id: &str) -> Result<(), ElasticError> {
        let request = ApiRequest::delete(scroll_path()).json(&json!({ "scroll_id": scroll_id }))?;
        self.client.execute(&request).await?;
        debug!(index = %self.index, "Scroll cursor released");
        Ok(())
    }

    async fn release_best_effort(&self, scroll_id: &str) -> bool {
        match self.release(scroll_id).await {
            Ok(()) => true,
            Err(e) => {
                warn!(index = %self.index, error = %e, "Could not release scroll cursor; it expires with its keep-alive");
                false
            }
        }
    }
}

fn scroll_path() -> Vec<String> {
    vec!["_search".to_string(), "scroll".to_string()]
}

impl ElasticClient {
    /// Stream every document matching `query` (all documents when `None`).
    ///
    /// Hits arrive in the server's natural order, page by page. The producer runs
    /// on the current tokio runtime and owns a clone of this client.
    ///
    /// # Returns
    ///
    /// * `Ok(DocumentScroll)` - The consumer handle; the first page is requested
    ///   in the background
    /// * `Err(ElasticError::ValidationError)` - If a name is empty or the page size is zero
    /// * `Err(ElasticError::ScrollError)` - If called outside a tokio runtime
    pub async fn scroll_documents(
        &self,
        index: &str,
        doctype: &str,
        query: Option<Value>,
    ) -> Result<DocumentScroll, ElasticError> {
        segments(&[("index", index), ("doctype", doctype)])?;
        let config = self.config().scroll.clone();
        if config.page_size == 0 {
            return Err(ElasticError::validation("scroll page size must be positive"));
        }

        let runtime = Handle::try_current()
            .map_err(|e| ElasticError::scroll(format!("no tokio runtime: {}", e)))?;
        let (sender, receiver) = mpsc::channel(config.channel_capacity.max(1));

        let producer = ScrollProducer {
            client: self.clone(),
            index: index.to_string(),
            doctype: doctype.to_string(),
            query,
            config,
            sender,
        };
        debug!(index = %index, doctype = %doctype, "Starting scroll");
        let handle = runtime.spawn(producer.run());

        Ok(DocumentScroll { receiver, handle })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClientConfig, RetryPolicy};
    use crate::mock::MockTransport;
    use crate::request::Method;
    use std::sync::{Arc, Mutex};

    /// Simulated cluster holding `total` documents behind one cursor token.
    fn cluster(total: usize) -> Arc<MockTransport> {
        // (next offset, page size from the open request)
        let state = Mutex::new((0usize, 0usize));
        Arc::new(MockTransport::new(move |request| {
            if request.method == Method::Delete {
                return Ok(json!({"succeeded": true, "num_freed": 1}));
            }
            let mut state = state.lock().unwrap();
            if request.method == Method::Get {
                state.1 = request.json_body().unwrap()["size"].as_u64().unwrap() as usize;
            }
            let (offset, size) = &mut *state;
            let end = (*offset + *size).min(total);
            let hits: Vec<Value> = (*offset..end)
                .map(|n| json!({"_id": n.to_string(), "_source": {"n": n}}))
                .collect();
            *offset = end;
            Ok(json!({"_scroll_id": "cursor", "hits": {"total": total, "hits": hits}}))
        }))
    }

    fn client(transport: &Arc<MockTransport>, page_size: usize) -> ElasticClient {
        let scroll = ScrollConfig {
            page_size,
            ..ScrollConfig::default()
        };
        ElasticClient::with_transport(
            ClientConfig::default()
                .with_retry(RetryPolicy::none())
                .with_scroll(scroll),
            transport.clone(),
        )
    }

    #[tokio::test]
    async fn test_scroll_request_sequence() {
        let transport = cluster(3);
        let client = client(&transport, 2);

        let query = json!({"term": {"kind": "a"}});
        let scroll = client.scroll_documents("idx", "doc", Some(query.clone())).await.unwrap();
        let hits = scroll.collect_all().await.unwrap();
        assert_eq!(hits.len(), 3);

        let requests = transport.requests();
        assert_eq!(requests.len(), 4);

        assert_eq!(requests[0].method, Method::Get);
        assert_eq!(requests[0].path(), "idx/doc/_search");
        assert_eq!(requests[0].query_param("scroll"), Some("5m"));
        assert_eq!(
            requests[0].json_body().unwrap(),
            json!({"size": 2, "sort": ["_doc"], "query": query})
        );

        assert_eq!(requests[1].method, Method::Post);
        assert_eq!(requests[1].path(), "_search/scroll");
        assert_eq!(
            requests[1].json_body().unwrap(),
            json!({"scroll": "5m", "scroll_id": "cursor"})
        );

        assert_eq!(requests[3].method, Method::Delete);
        assert_eq!(requests[3].path(), "_search/scroll");
        assert_eq!(requests[3].json_body().unwrap(), json!({"scroll_id": "cursor"}));
    }

    #[tokio::test]
    async fn test_scroll_summary_after_exhaustion() {
        let transport = cluster(5);
        let client = client(&transport, 2);

        let mut scroll = client.scroll_documents("idx", "doc", None).await.unwrap();
        let mut ids = Vec::new();
        while let Some(hit) = scroll.next().await {
            ids.push(hit.unwrap().id);
        }
        let summary = scroll.finish().await.unwrap();

        assert_eq!(ids, vec!["0", "1", "2", "3", "4"]);
        assert_eq!(
            summary,
            ScrollSummary {
                pages: 4,
                documents: 5,
                released: true,
                abandoned: false,
            }
        );
    }

    #[tokio::test]
    async fn test_scroll_empty_index() {
        let transport = cluster(0);
        let client = client(&transport, 2);

        let scroll = client.scroll_documents("idx", "doc", None).await.unwrap();
        assert!(scroll.collect_all().await.unwrap().is_empty());

        let deletes = transport
            .requests()
            .iter()
            .filter(|r| r.method == Method::Delete)
            .count();
        assert_eq!(deletes, 1);
    }

    #[tokio::test]
    async fn test_scroll_stops_on_consecutive_empty_pages_with_new_tokens() {
        let counter = Mutex::new(0u32);
        let transport = Arc::new(MockTransport::new(move |request| {
            if request.method == Method::Delete {
                return Ok(json!({}));
            }
            let mut n = counter.lock().unwrap();
            *n += 1;
            Ok(json!({"_scroll_id": format!("cursor-{}", n), "hits": {"hits": []}}))
        }));
        let client = client(&transport, 2);

        let mut scroll = client.scroll_documents("idx", "doc", None).await.unwrap();
        assert!(scroll.next().await.is_none());
        let summary = scroll.finish().await.unwrap();
        assert_eq!(summary.pages, 2);
        assert!(summary.released);

        let last = transport.requests().pop().unwrap();
        assert_eq!(last.json_body().unwrap(), json!({"scroll_id": "cursor-2"}));
    }

    #[tokio::test]
    async fn test_scroll_error_reaches_consumer_and_finish() {
        let calls = Mutex::new(0u32);
        let transport = Arc::new(MockTransport::new(move |request| {
            if request.method == Method::Delete {
                return Ok(json!({}));
            }
            let mut n = calls.lock().unwrap();
            *n += 1;
            if *n == 1 {
                Ok(json!({"_scroll_id": "cursor", "hits": {"hits": [{"_id": "a"}]}}))
            } else {
                Err(ElasticError::http_status(500, "search_phase_execution_exception"))
            }
        }));
        let client = client(&transport, 2);

        let mut scroll = client.scroll_documents("idx", "doc", None).await.unwrap();
        assert_eq!(scroll.next().await.unwrap().unwrap().id, "a");
        let failure = scroll.next().await.unwrap().unwrap_err();
        assert_eq!(failure.status(), Some(500));
        assert!(scroll.next().await.is_none());

        let finished = scroll.finish().await.unwrap_err();
        assert_eq!(finished.status(), Some(500));
        assert_eq!(transport.requests().last().unwrap().method, Method::Delete);
    }

    #[tokio::test]
    async fn test_scroll_open_failure_releases_nothing() {
        let transport = Arc::new(MockTransport::scripted(vec![Err(ElasticError::http_status(
            404,
            "index_not_found_exception",
        ))]));
        let client = client(&transport, 2);

        let scroll = client.scroll_documents("missing", "doc", None).await.unwrap();
        let error = scroll.collect_all().await.unwrap_err();
        assert!(error.is_not_found());
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_scroll_decode_error_on_missing_scroll_id() {
        let transport = Arc::new(MockTransport::scripted(vec![Ok(json!({"hits": {"hits": []}}))]));
        let client = client(&transport, 2);

        let scroll = client.scroll_documents("idx", "doc", None).await.unwrap();
        assert!(matches!(
            scroll.collect_all().await.unwrap_err(),
            ElasticError::DecodeError(_)
        ));
    }

    #[tokio::test]
    async fn test_release_failure_on_exhaustion_is_an_error() {
        let transport = Arc::new(MockTransport::new(|request| {
            if request.method == Method::Delete {
                return Err(ElasticError::http_status(500, "boom"));
            }
            Ok(json!({"_scroll_id": "cursor", "hits": {"hits": []}}))
        }));
        let client = client(&transport, 2);

        let scroll = client.scroll_documents("idx", "doc", None).await.unwrap();
        assert_eq!(scroll.collect_all().await.unwrap_err().status(), Some(500));
    }

    #[tokio::test]
    async fn test_abandoned_scroll_releases_cursor() {
        let transport = cluster(100);
        let client = client(&transport, 10);

        let mut scroll = client.scroll_documents("idx", "doc", None).await.unwrap();
        assert!(scroll.next().await.unwrap().is_ok());
        let summary = scroll.finish().await.unwrap();

        assert!(summary.abandoned);
        assert!(summary.released);
        assert!(summary.documents < 100);
        assert_eq!(transport.requests().last().unwrap().method, Method::Delete);
    }

    #[tokio::test]
    async fn test_zero_page_size_is_rejected() {
        let transport = cluster(1);
        let client = client(&transport, 0);

        let result = client.scroll_documents("idx", "doc", None).await;
        assert!(matches!(result.err().unwrap(), ElasticError::ValidationError(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_into_stream() {
        use tokio_stream::StreamExt;

        let transport = cluster(3);
        let client = client(&transport, 2);

        let scroll = client.scroll_documents("idx", "doc", None).await.unwrap();
        let (stream, handle) = scroll.into_stream();
        let hits: Vec<ScrollItem> = stream.collect().await;
        assert_eq!(hits.len(), 3);
        assert_eq!(handle.await.unwrap().unwrap().documents, 3);
    }

    #[tokio::test]
    async fn test_dropped_stream_lets_handle_finish() {
        let transport = cluster(10);
        let client = client(&transport, 2);

        let scroll = client.scroll_documents("idx", "doc", None).await.unwrap();
        let (stream, handle) = scroll.into_stream();
        drop(stream);

        let summary = handle.await.unwrap().unwrap();
        assert!(summary.abandoned);
        assert!(summary.documents < 10);
        assert_eq!(
            transport.requests().last().unwrap().method,
            Method::Delete
        );
    }
}
