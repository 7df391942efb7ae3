//! # Dataset catalog
//!
//! The list of datasets the backend can preview and export.
//!
//! ## Catalog methods on PortalClient
//!
//! - [sources](PortalClient::sources) - request builder for the dataset catalog
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use portal_api::prelude::*;
//!
//! # async fn example(client: &PortalClient) -> Result<(), PortalError> {
//! // Strict: fails if the backend is unreachable
//! let items = client.sources().list().await?;
//!
//! // Best-effort: falls back to a static list
//! let catalog = client.sources().load().await;
//! if catalog.origin == CatalogOrigin::Fallback {
//!     eprintln!("backend unavailable, showing static catalog");
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Result, client::PortalClient, filters::Labeled, http_client::HttpClient};

/// Dataset identifiers shown when the backend cannot be reached.
pub const FALLBACK_SOURCES: &[&str] = &[
    "Bloomberg_User_ReportTable",
    "HR_Employees",
    "RightFax_Users",
];

/// Character in dataset identifiers that separates words
const LABEL_SEPARATOR: char = '_';

/// Derives a display label from a dataset identifier by replacing each
/// separator with a space: `"HR_Employees"` becomes `"HR Employees"`.
pub fn derive_label(key: &str) -> String {
    key.replace(LABEL_SEPARATOR, " ")
}

/// A selectable dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Dataset identifier, used in backend urls
    pub key: String,

    /// Display name derived from the key
    pub label: String,
}

impl CatalogItem {
    pub fn from_key(key: impl Into<String>) -> Self {
        let key = key.into();
        let label = derive_label(&key);
        Self { key, label }
    }
}

impl Labeled for CatalogItem {
    fn key(&self) -> &str {
        &self.key
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Where a catalog came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CatalogOrigin {
    /// Listed by the backend `/sources` endpoint
    Backend,
    /// Synthesized from [`FALLBACK_SOURCES`]
    Fallback,
}

/// An ordered list of datasets and its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub items: Vec<CatalogItem>,
    pub origin: CatalogOrigin,
}

impl Catalog {
    /// Builds a catalog from identifiers, keeping the first occurrence of duplicate keys.
    pub fn from_keys<I, S>(keys: I, origin: CatalogOrigin) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut items: Vec<CatalogItem> = Vec::new();
        for key in keys {
            let item = CatalogItem::from_key(key);
            if item.key.is_empty() || items.iter().any(|existing| existing.key == item.key) {
                debug!(key = %item.key, "skipping empty or duplicate source");
                continue;
            }
            items.push(item);
        }
        Self { items, origin }
    }

    /// The static catalog used when the backend is unreachable
    pub fn fallback() -> Self {
        Self::from_keys(FALLBACK_SOURCES.iter().copied(), CatalogOrigin::Fallback)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ============================================================================
// RESPONSE TYPES (internal)
// ============================================================================

/// Response body of `GET /sources`
#[derive(Debug, Deserialize)]
struct SourcesResponse {
    #[serde(default)]
    sources: Option<Vec<String>>,
}

// ============================================================================
// BUILDER STRUCTS (public)
// ============================================================================

/// Request builder for the dataset catalog.
///
/// Obtained via [`PortalClient::sources`].
#[derive(Debug)]
pub struct SourcesRequest {
    client: Arc<HttpClient>,
}

impl SourcesRequest {
    pub(crate) fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    /// Fetches the dataset identifiers from the backend.
    ///
    /// # Errors
    /// - [`PortalError::Http`](crate::error::PortalError::Http) if the backend is unreachable
    /// - [`PortalError::Deserialization`](crate::error::PortalError::Deserialization) if the body is not `{ "sources": [...] }`
    pub async fn list(self) -> Result<Vec<CatalogItem>> {
        let url = self.client.endpoint(&["sources"])?;
        let response: SourcesResponse = self.client.get_json(url, Vec::new()).await?;
        let keys = response.sources.unwrap_or_default();
        Ok(Catalog::from_keys(keys, CatalogOrigin::Backend).items)
    }

    /// Loads the catalog, falling back to [`Catalog::fallback`] on any error.
    /// Never fails: the fallback keeps the catalog populated when the backend is down.
    pub async fn load(self) -> Catalog {
        match self.list().await {
            Ok(items) => Catalog {
                items,
                origin: CatalogOrigin::Backend,
            },
            Err(e) => {
                warn!(error = %e, "source listing failed, using fallback catalog");
                Catalog::fallback()
            }
        }
    }
}

impl PortalClient {
    /// Returns a request builder for the dataset catalog
    pub fn sources(&self) -> SourcesRequest {
        SourcesRequest::new(self.client.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_replaces_every_separator() {
        assert_eq!(derive_label("HR_Employees"), "HR Employees");
        assert_eq!(
            derive_label("Bloomberg_User_ReportTable"),
            "Bloomberg User ReportTable"
        );
        assert_eq!(derive_label("a__b"), "a  b");
        assert_eq!(derive_label("plain"), "plain");
    }

    #[test]
    fn fallback_catalog_uses_static_sources() {
        let catalog = Catalog::fallback();
        assert_eq!(catalog.origin, CatalogOrigin::Fallback);
        let labels: Vec<&str> = catalog.items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Bloomberg User ReportTable", "HR Employees", "RightFax Users"]
        );
    }

    #[test]
    fn from_keys_keeps_order_and_drops_duplicates() {
        let catalog = Catalog::from_keys(["b", "a", "b", "", "c"], CatalogOrigin::Backend);
        let keys: Vec<&str> = catalog.items.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(catalog.len(), 3);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn sources_response_tolerates_missing_field() {
        let resp: SourcesResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.sources.is_none());
        let resp: SourcesResponse =
            serde_json::from_str(r#"{"sources":["HR_Employees"]}"#).unwrap();
        assert_eq!(resp.sources.unwrap(), vec!["HR_Employees".to_string()]);
    }
}
