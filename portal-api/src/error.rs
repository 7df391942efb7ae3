//! Errors returned by `PortalClient`
//!
use snafu::prelude::*;

/// Errors returned by the portal-api crate
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PortalError {
    // Http connection or timeout error
    #[snafu(display("HTTP error {method} url:{url}: {source}"))]
    Http {
        method: String,
        url: String,
        source: reqwest::Error,
    },

    /// Backend responded with an error status.
    #[snafu(display("Api Server reported error ({code}) {method} {url}: {message}"))]
    ApiError {
        code: u16,
        method: String,
        url: String,
        message: String,
    },

    /// Encountered a retryable failure, but all retry attempts failed.
    #[snafu(display("server api request: failed {n} times"))]
    TooManyRetries { n: u32 },

    /// Deserialization error. The backend returned a body we could not decode.
    #[snafu(display("Deserialization: {source}"))]
    Deserialization { source: serde_json::Error },

    /// The backend has no resource at the requested url (404/410).
    #[snafu(display("{url} not found"))]
    NotFound { url: String },

    /// Validation error: a parameter check failed before the request was sent.
    #[snafu(display("Validation error: {message}"))]
    Validation { message: String },

    /// Some other error occurred
    #[snafu(display("{message}"))]
    Other { message: String },
}

impl PortalError {
    /// Returns true if the error came from the transport (backend unreachable, dns, tls, timeout)
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::TooManyRetries { .. })
    }
}
