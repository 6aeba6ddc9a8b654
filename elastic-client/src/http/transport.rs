//! HTTP transport implementation.
//!
//! This module provides the concrete implementation of `Transport` using reqwest.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client as ReqwestClient, StatusCode};
use tracing::{error, info, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::errors::ElasticError;
use crate::interfaces::Transport;
use crate::request::{ApiRequest, Method};
use crate::utils;

/// reqwest-backed transport bound to one base address.
///
/// The base address is parsed once and never changes; the underlying reqwest
/// client pools connections internally and is safe to share.
///
/// # Example
///
/// ```ignore
/// use elastic_client::http::HttpTransport;
/// use elastic_client::ClientConfig;
///
/// let transport = HttpTransport::new(&ClientConfig::new("http://localhost:9200"))?;
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: ReqwestClient,
    base_url: Url,
}

impl HttpTransport {
    /// Create a transport for the configured base URL.
    ///
    /// This does not contact the server; use `ElasticClient::ping` for a connection test.
    ///
    /// # Returns
    ///
    /// * `Ok(HttpTransport)` - A new transport instance
    /// * `Err(ElasticError::ConfigurationError)` - If the URL is invalid or the client cannot be built
    pub fn new(config: &ClientConfig) -> Result<Self, ElasticError> {
        let base_url = Url::parse(&config.url)
            .map_err(|e| ElasticError::configuration(format!("could not parse url: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ElasticError::configuration(format!(
                "{} cannot be used as a base URL",
                config.url
            )));
        }

        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ElasticError::configuration(e.to_string()))?;

        info!(url = %base_url, "Created Elasticsearch HTTP transport");

        Ok(Self { client, base_url })
    }

    /// The parsed base address.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<Vec<u8>, ElasticError> {
        let url = utils::resolve_url(&self.base_url, &request.segments, &request.query)?;

        let mut builder = self
            .client
            .request(Self::method(request.method), url)
            .header(CONTENT_TYPE, request.content_type.as_str());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ElasticError::transport(format!("could not do request: {}", e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let error_body = response.text().await.unwrap_or_default();
            warn!(
                request = %request,
                body = %error_body,
                "Elasticsearch answered 429 Too Many Requests"
            );
            return Err(ElasticError::rate_limited(0, error_body));
        }

        if status != StatusCode::OK && status != StatusCode::CREATED {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, request = %request, "Request failed");
            return Err(ElasticError::http_status(status.as_u16(), error_body));
        }

        let body = response.bytes().await.map_err(|e| {
            ElasticError::transport(format!("could not read response body: {}", e))
        })?;
        Ok(body.to_vec())
    }
}
