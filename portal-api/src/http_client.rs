//! HttpClient middleware used by PortalClient
//!
//! Responsible for
//!  - handling all HTTP requests to the backend
//!  - url construction with percent-encoded path segments
//!  - logging/tracing
//!  - optional retries and backoff (for timeouts and connection errors)

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use bytes::Bytes;
use reqwest::{ClientBuilder, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use snafu::prelude::*;
use tracing::{debug, error, trace, warn};

use crate::{Result, prelude::*};

/// HTTP metrics tracked using atomic counters for thread-safe access.
/// These counters are cumulative and never reset during the client's lifetime.
#[derive(Debug, Default)]
pub struct HttpMetrics {
    /// Total number of HTTP requests sent to the server
    total_requests: AtomicU64,
    /// Total number of successful responses (2xx status codes)
    successful_responses: AtomicU64,
    /// Total number of error responses and transport failures
    errors: AtomicU64,
    /// Total number of retry attempts
    retries: AtomicU64,
    /// Total bytes received in response bodies
    bytes_received: AtomicU64,
}

impl HttpMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of current metrics as plain u64 values
    pub fn snapshot(&self) -> HttpMetricsSnapshot {
        HttpMetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_responses: self.successful_responses.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
        }
    }

    fn increment_requests(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    fn increment_success(&self) {
        self.successful_responses.fetch_add(1, Ordering::Relaxed);
    }

    fn increment_errors(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    fn increment_retries(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    fn add_bytes_received(&self, bytes: u64) {
        self.bytes_received.fetch_add(bytes, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of HTTP metrics with plain u64 values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HttpMetricsSnapshot {
    /// Total number of HTTP requests sent to the server
    pub total_requests: u64,
    /// Total number of successful responses (2xx status codes)
    pub successful_responses: u64,
    /// Total number of error responses and transport failures
    pub errors: u64,
    /// Total number of retry attempts
    pub retries: u64,
    /// Total bytes received in response bodies
    pub bytes_received: u64,
}

impl std::fmt::Display for HttpMetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "requests={} success={} errors={} retries={} recv={}",
            self.total_requests,
            self.successful_responses,
            self.errors,
            self.retries,
            format_bytes(self.bytes_received),
        )
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes}B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1}KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1}MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// status codes where it's ok to retry and backoff
fn retry_for_status(code: StatusCode) -> bool {
    match code {
      StatusCode::TOO_MANY_REQUESTS /* 429 */ |
      StatusCode::GATEWAY_TIMEOUT /* 504 */ |
      StatusCode::REQUEST_TIMEOUT /* 408 */ => true,
      _ => false,
    }
}

#[derive(Clone)]
pub(crate) struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub query: Vec<(String, String)>,
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("query", &self.query)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct HttpClient {
    pub client: reqwest::Client,

    /// Base URL for backend requests (e.g., "http://localhost:8000")
    pub base_url: Url,

    // Retries for connection failures and retryable statuses; 0 disables retries.
    max_retries: u32,

    /// HTTP request/response metrics
    pub metrics: Arc<HttpMetrics>,
}

impl HttpClient {
    pub fn new(builder: ClientBuilder, base_url: &str, max_retries: u32) -> Result<Self> {
        let client = builder.build().context(HttpSnafu {
            method: "client-init",
            url: "",
        })?;
        let base_url = Url::parse(base_url).map_err(|e| PortalError::Validation {
            message: format!("invalid base url '{base_url}': {e}"),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(PortalError::Validation {
                message: format!("base url '{base_url}' cannot have path segments"),
            });
        }
        Ok(HttpClient {
            client,
            base_url,
            max_retries,
            metrics: Arc::new(HttpMetrics::new()),
        })
    }

    /// Returns a snapshot of current HTTP metrics
    pub fn metrics_snapshot(&self) -> HttpMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Builds an endpoint url by appending path segments to the base url.
    /// Each segment is percent-encoded, so keys containing '/' or '?' stay in one segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| PortalError::Validation {
                message: format!("base url '{}' cannot have path segments", self.base_url),
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// GET a json document and deserialize it into `T`
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: Vec<(String, String)>,
    ) -> Result<T> {
        let req = HttpRequest {
            method: Method::GET,
            url,
            query,
        };
        let body = self.send(req).await?;
        // deserialization failure should not be retried
        deserialize_json(&body)
    }

    /// GET a raw response body
    pub(crate) async fn get_bytes(&self, url: Url) -> Result<Bytes> {
        let req = HttpRequest {
            method: Method::GET,
            url,
            query: Vec::new(),
        };
        self.send(req).await
    }

    /// This function handles all backend requests
    /// - retries up to `max_retries` times for connection failures or server timeout
    /// - maps http error codes into PortalErrors
    /// - returns the raw response body
    pub(crate) async fn send(&self, req: HttpRequest) -> Result<Bytes> {
        let mut attempt = 0u32;

        let req_builder = self
            .client
            .request(req.method.clone(), req.url.clone())
            .query(&req.query);

        debug!(method = %req.method, url = %req.url, "request");
        log_request(&req_builder);

        loop {
            let request = req_builder.try_clone().ok_or_else(|| {
                // try_clone with no body should never return None
                PortalError::Other {
                    message: "reqwest::RequestBuilder internal error".into(),
                }
            })?;

            self.metrics.increment_requests();

            match request.send().await {
                Ok(response) => {
                    let code = response.status();
                    match code {
                        ok if ok.is_success() => {
                            let body = response.bytes().await.context(HttpSnafu {
                                method: req.method.to_string(),
                                url: req.url.to_string(),
                            })?;
                            self.metrics.increment_success();
                            self.metrics.add_bytes_received(body.len() as u64);

                            log_response(&req.url, &body);
                            return Ok(body);
                        }
                        StatusCode::NOT_FOUND /* 404 */ |
                        StatusCode::GONE /* 410 */ => {
                            self.metrics.increment_errors();
                            let message = response.text().await.unwrap_or_default();
                            error!(?code, ?message, ?req, "http");
                            return Err(PortalError::NotFound {
                                url: req.url.to_string(),
                            });
                        }
                        _ => {
                            let message = response.text().await.unwrap_or_default();
                            error!(?code, ?req, message, attempt, "http");
                            self.metrics.increment_errors();
                            if retry_for_status(code) && is_idempotent_method(&req.method) {
                                if attempt < self.max_retries {
                                    log_and_backoff(attempt, code.to_string()).await;
                                    self.metrics.increment_retries();
                                    attempt += 1;
                                    continue;
                                }
                                if self.max_retries > 0 {
                                    return Err(PortalError::TooManyRetries { n: attempt + 1 });
                                }
                            }
                            return Err(PortalError::ApiError {
                                code: code.as_u16(),
                                method: req.method.to_string(),
                                url: req.url.to_string(),
                                message,
                            });
                        }
                    }
                }
                Err(e) => {
                    error!(source=?e, ?req, "http");
                    if (e.is_connect() || e.is_timeout())
                        && is_idempotent_method(&req.method)
                        && attempt < self.max_retries
                    {
                        log_and_backoff(attempt, e.to_string()).await;
                        self.metrics.increment_retries();
                        attempt += 1;
                        continue;
                    }
                    self.metrics.increment_errors();
                    return Err(PortalError::Http {
                        method: req.method.to_string(),
                        url: req.url.to_string(),
                        source: e,
                    });
                }
            }
        }
    }
}

// dump request
// requires RUST_LOG=portal_api::http_json=trace
fn log_request(builder: &reqwest::RequestBuilder) {
    if tracing::enabled!(target: "portal_api::http_json", tracing::Level::TRACE)
        && let Some(req) = builder.try_clone().and_then(|b| b.build().ok())
    {
        trace!(target: "portal_api::http_json", "{} url={}", req.method(), req.url());
    }
}

// dump response body, for debugging
fn log_response(url: &Url, body: &Bytes) {
    if tracing::enabled!(target: "portal_api::http_json", tracing::Level::TRACE) {
        trace!(target: "portal_api::http_json", "Response url={url} body={}",
            String::from_utf8_lossy(body)
        );
    }
}

// deserialize, reporting errors with 'serde_path_to_error', which provides
// detailed json path to the error
pub(crate) fn deserialize_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);
    match serde_path_to_error::deserialize(&mut deserializer) {
        Ok(value) => Ok(value),
        Err(err) => {
            error!("Deserialization failed at {}: {}", err.path(), err);
            Err(PortalError::Deserialization {
                source: err.into_inner(),
            })
        }
    }
}

// log attempt and sleep for exponential backoff
async fn log_and_backoff(attempt: u32, err: String) {
    // exponential backoff: 1s, 2s, 4s, with jitter
    let base_delay = 2u64.pow(attempt);
    let jitter = f64::from(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .subsec_nanos(),
    ) / 1_000_000_000.0;
    let jittered_delay = ((base_delay as f64) * (0.5 + jitter)).round() as u64;
    let delay = jittered_delay.max(1);
    warn!("Recoverable error {err}. Attempt {attempt}. Waiting {delay}s before retry");
    tokio::time::sleep(Duration::from_secs(delay)).await;
}

fn is_idempotent_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::PUT | Method::DELETE | Method::OPTIONS
    )
}
