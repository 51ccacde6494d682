//! HTTP fetch engine
//!
//! Every request carries a timeout. 5xx responses and transport errors are
//! retried with exponential backoff, 429 responses wait for `Retry-After`.

use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::politeness::{backoff_delay, retry_after_delay};
use crate::config::{HttpConfig, DEFAULT_USER_AGENT};

/// Errors that can occur during fetching
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned status {status}")]
    Status { status: u16, url: String },
    #[error("Rate limited, retry after {0:?}")]
    RateLimited(Duration),
    #[error("Timeout after {0:?}")]
    Timeout(Duration),
    #[error("Content too large: {0} bytes")]
    ContentTooLarge(usize),
    #[error("Failed to parse URL: {0}")]
    InvalidUrl(String),
    #[error("Unexpected page structure at {url}: {detail}")]
    StructuralMismatch { url: String, detail: String },
}

impl FetchError {
    /// Whether another attempt at the same request could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout(_) | Self::RateLimited(_) => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Configuration for the fetch engine
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string
    pub user_agent: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Maximum response size (bytes)
    pub max_content_size: usize,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Base delay for exponential backoff
    pub retry_backoff: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_content_size: 10 * 1024 * 1024, // 10 MB
            max_redirects: 10,
            max_retries: 2,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

impl From<&HttpConfig> for FetchConfig {
    fn from(http: &HttpConfig) -> Self {
        Self {
            user_agent: http.user_agent.clone(),
            timeout: http.timeout(),
            connect_timeout: http.connect_timeout(),
            max_content_size: http.max_content_size,
            max_retries: http.max_retries,
            retry_backoff: http.retry_backoff(),
            ..Self::default()
        }
    }
}

/// Outcome of one attempt, before the retry decision
enum Attempt {
    Done(String),
    Retry(FetchError, Duration),
    Fail(FetchError),
}

/// HTTP fetch engine shared by the site and random-article clients.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct FetchEngine {
    http_client: reqwest::Client,
    config: FetchConfig,
}

impl FetchEngine {
    /// Create a new fetch engine
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(&config.user_agent)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Fetch the body of a URL, retrying transient failures
    pub async fn fetch_text(&self, url: &Url) -> Result<String, FetchError> {
        let mut retries = 0u32;

        loop {
            match self.attempt(url, retries + 1).await {
                Attempt::Done(body) => return Ok(body),
                Attempt::Fail(error) => return Err(error),
                Attempt::Retry(error, delay) => {
                    if retries >= self.config.max_retries {
                        return Err(error);
                    }
                    retries += 1;
                    debug!("Retrying {} in {:?} ({}): {}", url, delay, retries, error);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn attempt(&self, url: &Url, attempt: u32) -> Attempt {
        let backoff = backoff_delay(self.config.retry_backoff, attempt);

        let response = match self.http_client.get(url.as_str()).send().await {
            Ok(response) => response,
            Err(e) => return Attempt::Retry(self.map_transport(e), backoff),
        };

        let status = response.status();
        if status.as_u16() == 429 {
            let delay = retry_after_delay(
                response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok()),
            );
            return Attempt::Retry(FetchError::RateLimited(delay), delay);
        }
        if status.is_server_error() {
            let error = FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            };
            return Attempt::Retry(error, backoff);
        }
        if !status.is_success() {
            return Attempt::Fail(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if let Some(len) = response.content_length() {
            if len as usize > self.config.max_content_size {
                return Attempt::Fail(FetchError::ContentTooLarge(len as usize));
            }
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return Attempt::Retry(self.map_transport(e), backoff),
        };
        if body.len() > self.config.max_content_size {
            return Attempt::Fail(FetchError::ContentTooLarge(body.len()));
        }

        Attempt::Done(body)
    }

    fn map_transport(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.config.timeout)
        } else {
            FetchError::Http(error)
        }
    }
}
