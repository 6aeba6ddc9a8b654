//! Configuration types for the ElasticClient.

use std::env;
use std::time::Duration;

use crate::errors::ElasticError;

/// Default Elasticsearch URL.
pub const DEFAULT_ELASTICSEARCH_URL: &str = "http://localhost:9200";

/// Default delay before resending a request that was answered with 429.
pub const DEFAULT_RATE_LIMIT_DELAY_SECS: u64 = 10;

/// Server-side time-to-live of a scroll cursor between page requests.
pub const DEFAULT_SCROLL_KEEP_ALIVE: &str = "5m";

/// Number of hits requested per scroll page.
pub const DEFAULT_SCROLL_PAGE_SIZE: usize = 1000;

/// Single-shot, fixed-delay retry policy applied to HTTP 429 responses.
///
/// This is deliberately not a backoff framework: the same request is resent after
/// `delay`, at most `max_retries` times, and the last 429 is surfaced as
/// [`ElasticError::RateLimited`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// How long to wait before resending.
    pub delay: Duration,
    /// How many times the request may be resent. Defaults to 1.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(DEFAULT_RATE_LIMIT_DELAY_SECS),
            max_retries: 1,
        }
    }
}

impl RetryPolicy {
    /// Surface the first 429 without resending.
    pub fn none() -> Self {
        Self {
            delay: Duration::ZERO,
            max_retries: 0,
        }
    }

    /// Resend once after the given delay.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            max_retries: 1,
        }
    }
}

/// Tuning for the scroll engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollConfig {
    /// Cursor TTL sent with every page request, in Elasticsearch time units.
    pub keep_alive: String,
    /// Hits per page.
    pub page_size: usize,
    /// Capacity of the producer → consumer queue. Kept small so the producer
    /// cannot run far ahead of a slow consumer.
    pub channel_capacity: usize,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            keep_alive: DEFAULT_SCROLL_KEEP_ALIVE.to_string(),
            page_size: DEFAULT_SCROLL_PAGE_SIZE,
            channel_capacity: 1,
        }
    }
}

/// Configuration for the ElasticClient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base address of the cluster (e.g., "http://localhost:9200").
    pub url: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    /// What to do when the server answers 429.
    pub retry: RetryPolicy,
    /// Scroll engine settings.
    pub scroll: ScrollConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ELASTICSEARCH_URL)
    }
}

impl ClientConfig {
    /// Create a config for the given base URL with default policies.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            request_timeout: None,
            retry: RetryPolicy::default(),
            scroll: ScrollConfig::default(),
        }
    }

    /// Replace the 429 retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the scroll settings.
    pub fn with_scroll(mut self, scroll: ScrollConfig) -> Self {
        self.scroll = scroll;
        self
    }

    /// Set a per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Build a config from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ELASTICSEARCH_URL`: base URL (default: http://localhost:9200)
    /// - `ELASTICSEARCH_REQUEST_TIMEOUT_SECS`: per-request timeout (default: none)
    /// - `ELASTICSEARCH_RATE_LIMIT_DELAY_SECS`: delay before resending on 429 (default: 10)
    /// - `ELASTICSEARCH_RATE_LIMIT_RETRIES`: resends allowed on 429 (default: 1)
    /// - `ELASTICSEARCH_SCROLL_PAGE_SIZE`: hits per scroll page (default: 1000)
    /// - `ELASTICSEARCH_SCROLL_KEEP_ALIVE`: scroll cursor TTL (default: 5m)
    ///
    /// # Returns
    ///
    /// * `Ok(ClientConfig)` - Config with every unset variable at its default
    /// * `Err(ElasticError::ConfigurationError)` - If a variable is set but unparsable
    pub fn from_env() -> Result<Self, ElasticError> {
        let mut config = Self::new(
            env::var("ELASTICSEARCH_URL").unwrap_or_else(|_| DEFAULT_ELASTICSEARCH_URL.to_string()),
        );

        if let Some(secs) = parse_env::<u64>("ELASTICSEARCH_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(secs) = parse_env::<u64>("ELASTICSEARCH_RATE_LIMIT_DELAY_SECS")? {
            config.retry.delay = Duration::from_secs(secs);
        }
        if let Some(retries) = parse_env::<u32>("ELASTICSEARCH_RATE_LIMIT_RETRIES")? {
            config.retry.max_retries = retries;
        }
        if let Some(page_size) = parse_env::<usize>("ELASTICSEARCH_SCROLL_PAGE_SIZE")? {
            config.scroll.page_size = page_size;
        }
        if let Ok(keep_alive) = env::var("ELASTICSEARCH_SCROLL_KEEP_ALIVE") {
            config.scroll.keep_alive = keep_alive;
        }

        Ok(config)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ElasticError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            ElasticError::configuration(format!("{} has an invalid value: {:?}", name, raw))
        }),
        Err(_) => Ok(None),
    }
}
