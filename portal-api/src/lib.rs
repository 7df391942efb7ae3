/*
 * Data Portal rust api client
 *
 * SPDX-License-Identifier: Apache-2.0
 */
//! # Data Portal API Client
//!
//! Client library for the Data Portal backend, plus the page model shared by
//! every front end built on it.
//!
//! ## Features
//!
//! - dataset catalog with static fallback when the backend is unreachable
//! - row previews capped at [`PREVIEW_ROW_LIMIT`] rows
//! - CSV export download
//! - OpenAPI document loading for the API explorer
//! - case-insensitive list and row filters
//! - a master-detail page state container that discards stale responses
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use portal_api::prelude::*;
//! # async fn example() -> Result<(), PortalError> {
//!
//! let client = PortalClient::new()?;
//!
//! // Load the dataset catalog (never fails: falls back to a static list)
//! let catalog = client.sources().load().await;
//! for item in filter_items(&catalog.items, "hr") {
//!     println!("{} ({})", item.label, item.key);
//! }
//!
//! // Preview the first 100 rows of a dataset
//! let preview = client.preview("HR_Employees").get().await?;
//! for row in filter_rows(&preview.rows, "alice") {
//!     println!("{row:?}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Page model
//!
//! [`PageState`](page::PageState) tracks the catalog, the current selection, the
//! query text and the detail load state of one page. Transitions that start a
//! fetch return a [`LoadTicket`](page::LoadTicket); hand the fetch result back
//! with [`PageState::complete`](page::PageState::complete) and it is applied only
//! if the ticket still matches the current selection.
//!
//#![warn(clippy::pedantic)] // experimental
#![allow(clippy::missing_errors_doc)] // pedantic
#![allow(clippy::must_use_candidate)] // pedantic
#![warn(clippy::default_trait_access)]
#![warn(clippy::doc_markdown)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::implicit_clone)]
#![warn(clippy::match_same_arms)]
#![warn(clippy::redundant_clone)]
#![warn(clippy::redundant_closure)]
#![warn(clippy::uninlined_format_args)]
#![warn(clippy::unused_async)]

pub mod apis;
pub mod catalog;
pub mod cell;
pub mod client;
pub mod error;
pub mod filters;
mod http_client;
pub mod page;
pub mod preview;

/// Result type alias using `PortalError` as the default error.
pub type Result<T, E = crate::error::PortalError> = std::result::Result<T, E>;

/// Prelude module - import the common types with `use portal_api::prelude::*;`
pub mod prelude {
    pub use super::{PORTAL_DEPLOYED_URL, PORTAL_DEV_URL, PREVIEW_ROW_LIMIT};
    // Error types
    pub use crate::error::*;
    pub use crate::{
        // API explorer
        apis::{ApiDocument, ApiSpec, Operation, api_catalog},
        // Dataset catalog
        catalog::{Catalog, CatalogItem, CatalogOrigin, FALLBACK_SOURCES, derive_label},
        // Cell formatting
        cell::CellFormatter,
        // Client
        client::{ClientConfig, Environment, PortalClient},
        // Filters
        filters::{Labeled, filter_items, filter_rows, filter_rows_with, normalize_query},
        // HTTP metrics
        http_client::HttpMetricsSnapshot,
        // Page model
        page::{CatalogTicket, DetailState, Generation, LoadTicket, PageState, Selection},
        // Row previews
        preview::{Preview, Row, download_file_name},
    };
}

// ============================================================================
// CONSTANTS
// ============================================================================

/// Backend endpoint used during local development
pub const PORTAL_DEV_URL: &str = "http://localhost:8000";

/// Deployed backend endpoint
pub const PORTAL_DEPLOYED_URL: &str = "https://data-api-sharice.azurewebsites.net";

/// Maximum number of rows requested for a dataset preview
pub const PREVIEW_ROW_LIMIT: u32 = 100;

pub(crate) mod config {
    /// Environment variable overriding the backend url
    pub const PORTAL_URL_ENV: &str = "PORTAL_URL";

    /// Environment variable selecting the backend environment ("development" or "deployed")
    pub const PORTAL_ENV_ENV: &str = "PORTAL_ENV";

    /// Environment variable overriding the transport retry count
    pub const MAX_RETRIES_ENV: &str = "PORTAL_MAX_RETRIES";

    /// Transport retries for connection errors and timeouts. Off unless configured.
    pub const MAX_RETRIES_DEFAULT: u32 = 0;

    /// Upper bound accepted for the preview row limit
    pub const MAX_PREVIEW_LIMIT: u32 = 10_000;
}
