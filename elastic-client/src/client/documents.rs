//! Single-document and by-query document operations.

use serde_json::{json, Map, Value};
use tracing::debug;

use super::ElasticClient;
use crate::errors::ElasticError;
use crate::request::ApiRequest;
use crate::responses;
use crate::types::{Document, FetchedDocument, Order, Refresh, SearchPage};
use crate::utils::segments;

/// Plain paged search cannot reach past this many hits; use scrolling instead.
pub const MAX_RESULT_WINDOW: u64 = 10_000;

/// Build a painless script object, attaching `params` when given.
fn painless_script(source: &str, params: Option<&Document>) -> Value {
    let mut script = Map::new();
    script.insert("source".to_string(), json!(source));
    script.insert("lang".to_string(), json!("painless"));
    if let Some(params) = params {
        script.insert("params".to_string(), Value::Object(params.clone()));
    }
    Value::Object(script)
}

/// The query to send to a by-query endpoint; `match_all` when none is given.
fn query_or_match_all(query: Option<&Value>) -> Value {
    query.cloned().unwrap_or_else(|| json!({"match_all": {}}))
}

impl ElasticClient {
    /// Insert a document under a caller-chosen id.
    ///
    /// An existing document with the same id is replaced. With `Refresh::False` the
    /// call returns as soon as the write is accepted; when several inserts must be
    /// visible together, insert with `Refresh::False` and call
    /// [`refresh_index`](Self::refresh_index) afterwards.
    pub async fn insert_document(
        &self,
        index: &str,
        doctype: &str,
        id: &str,
        document: &Document,
        refresh: Refresh,
    ) -> Result<(), ElasticError> {
        let path = segments(&[("index", index), ("doctype", doctype), ("id", id)])?;
        let request = ApiRequest::put(path)
            .param("refresh", refresh.as_str())
            .json(document)?;
        self.execute(&request).await?;

        debug!(index = %index, id = %id, "Document inserted");
        Ok(())
    }

    /// Insert a document and let the server assign its id.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The id assigned by the server
    /// * `Err(ElasticError)` - If the request or the response decoding fails
    pub async fn create_document(
        &self,
        index: &str,
        doctype: &str,
        document: &Document,
        refresh: Refresh,
    ) -> Result<String, ElasticError> {
        let path = segments(&[("index", index), ("doctype", doctype)])?;
        let request = ApiRequest::post(path)
            .param("refresh", refresh.as_str())
            .json(document)?;
        let body = self.execute(&request).await?;
        let id = responses::created_id(&body)?;

        debug!(index = %index, id = %id, "Document created");
        Ok(id)
    }

    /// Fetch one document by id.
    ///
    /// A missing document fails with `ElasticError::HttpStatus { status: 404, .. }`
    /// (check with [`ElasticError::is_not_found`]).
    pub async fn get_document(
        &self,
        index: &str,
        doctype: &str,
        id: &str,
    ) -> Result<FetchedDocument, ElasticError> {
        let path = segments(&[("index", index), ("doctype", doctype), ("id", id)])?;
        let body = self.execute(&ApiRequest::get(path)).await?;
        responses::decode("document", &body)
    }

    /// Fetch one page of documents, optionally filtered and ordered.
    ///
    /// `from + size` must not exceed 10,000; use
    /// [`scroll_documents`](Self::scroll_documents) to read more.
    ///
    /// # Returns
    ///
    /// * `Ok(SearchPage)` - The page of hits and the total number of matches
    /// * `Err(ElasticError::ValidationError)` - If the window exceeds the limit
    /// * `Err(ElasticError)` - If the request fails
    pub async fn get_documents(
        &self,
        index: &str,
        doctype: &str,
        query: Option<&Value>,
        from: u64,
        size: u64,
        order: Option<&Order>,
    ) -> Result<SearchPage, ElasticError> {
        if from.saturating_add(size) > MAX_RESULT_WINDOW {
            return Err(ElasticError::validation(format!(
                "from + size must not exceed {}, got {}",
                MAX_RESULT_WINDOW,
                from.saturating_add(size)
            )));
        }

        let mut path = segments(&[("index", index), ("doctype", doctype)])?;
        path.push("_search".to_string());

        let mut body = Map::new();
        if let Some(query) = query {
            body.insert("query".to_string(), query.clone());
        }
        if let Some(order) = order {
            body.insert("sort".to_string(), json!([order]));
        }

        let request = ApiRequest::get(path)
            .param("from", from.to_string())
            .param("size", size.to_string())
            .json(&body)?;
        let response = self.execute(&request).await?;
        let page = responses::search_page(&response)?;

        debug!(index = %index, total = page.total, returned = page.hits.len(), "Documents fetched");
        Ok(page)
    }

    /// Run a painless update script against one document.
    ///
    /// Prefer parameterized scripts: the server compiles each distinct `source`
    /// once and rejects callers that compile too many different scripts in a
    /// short interval.
    pub async fn update_document(
        &self,
        index: &str,
        doctype: &str,
        id: &str,
        script: &str,
        params: Option<&Document>,
        refresh: Refresh,
    ) -> Result<(), ElasticError> {
        let mut path = segments(&[("index", index), ("doctype", doctype), ("id", id)])?;
        path.push("_update".to_string());

        let request = ApiRequest::post(path)
            .param("refresh", refresh.as_str())
            .json(&json!({ "script": painless_script(script, params) }))?;
        self.execute(&request).await?;

        debug!(index = %index, id = %id, "Document updated");
        Ok(())
    }

    /// Run a painless update script against every document matching `query`
    /// (all documents when `query` is `None`). Version conflicts are skipped.
    pub async fn update_documents(
        &self,
        index: &str,
        doctype: &str,
        query: Option<&Value>,
        script: &str,
        params: Option<&Document>,
    ) -> Result<(), ElasticError> {
        let mut path = segments(&[("index", index), ("doctype", doctype)])?;
        path.push("_update_by_query".to_string());

        let request = ApiRequest::post(path)
            .param("conflicts", "proceed")
            .json(&json!({
                "query": query_or_match_all(query),
                "script": painless_script(script, params),
            }))?;
        self.execute_unit(&request).await
    }

    /// Delete one document by id.
    pub async fn delete_document(
        &self,
        index: &str,
        doctype: &str,
        id: &str,
        refresh: Refresh,
    ) -> Result<(), ElasticError> {
        let path = segments(&[("index", index), ("doctype", doctype), ("id", id)])?;
        let request = ApiRequest::delete(path).param("refresh", refresh.as_str());
        self.execute(&request).await?;

        debug!(index = %index, id = %id, "Document deleted");
        Ok(())
    }

    /// Delete every document matching `query` (all documents when `query` is `None`).
    pub async fn delete_documents(
        &self,
        index: &str,
        doctype: &str,
        query: Option<&Value>,
    ) -> Result<(), ElasticError> {
        let mut path = segments(&[("index", index), ("doctype", doctype)])?;
        path.push("_delete_by_query".to_string());

        let request = ApiRequest::post(path).json(&json!({ "query": query_or_match_all(query) }))?;
        self.execute_unit(&request).await
    }
}
