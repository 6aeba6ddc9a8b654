//! Transport-neutral description of one Elasticsearch API call.

use std::fmt;

use serde::Serialize;

use crate::errors::ElasticError;

/// HTTP verb of an API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body encoding sent in the `Content-Type` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Json,
    /// Newline-delimited JSON, required by `_bulk`.
    NdJson,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::NdJson => "application/x-ndjson",
        }
    }
}

/// One request against the cluster, relative to the connection's base address.
///
/// Path segments are kept raw; the transport is responsible for percent-encoding
/// them, so document ids may contain any character.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub content_type: ContentType,
}

impl ApiRequest {
    pub fn new(method: Method, segments: Vec<String>) -> Self {
        Self {
            method,
            segments,
            query: Vec::new(),
            body: None,
            content_type: ContentType::Json,
        }
    }

    pub fn get(segments: Vec<String>) -> Self {
        Self::new(Method::Get, segments)
    }

    pub fn post(segments: Vec<String>) -> Self {
        Self::new(Method::Post, segments)
    }

    pub fn put(segments: Vec<String>) -> Self {
        Self::new(Method::Put, segments)
    }

    pub fn delete(segments: Vec<String>) -> Self {
        Self::new(Method::Delete, segments)
    }

    /// Append a query string parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Serialize `body` as the JSON request body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ElasticError> {
        self.body = Some(serde_json::to_vec(body)?);
        self.content_type = ContentType::Json;
        Ok(self)
    }

    /// Use pre-encoded newline-delimited JSON as the request body.
    pub fn ndjson(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self.content_type = ContentType::NdJson;
        self
    }

    /// The unencoded path, segments joined by `/`.
    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    /// Value of the first query parameter named `key`.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The request body parsed as JSON, if there is one and it parses.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|b| serde_json::from_slice(b).ok())
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} /{}", self.method, self.path())?;
        for (i, (key, value)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, key, value)?;
        }
        Ok(())
    }
}
