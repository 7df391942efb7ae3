//! # Dataset previews and CSV export
//!
//! ## Preview methods on PortalClient
//!
//! - [preview](PortalClient::preview) - fetch the first rows of a dataset
//! - [load_preview](PortalClient::load_preview) - preview a catalog item with the default row cap
//! - [download](PortalClient::download) - CSV export url and bytes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use portal_api::prelude::*;
//!
//! # async fn example(client: &PortalClient) -> Result<(), PortalError> {
//! let preview = client.preview("HR_Employees").limit(25).get().await?;
//! println!("{} columns, {} rows", preview.columns.len(), preview.rows.len());
//!
//! let csv = client.download("HR_Employees").bytes().await?;
//! std::fs::write(download_file_name("HR Employees"), &csv).ok();
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use bytes::Bytes;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{
    PREVIEW_ROW_LIMIT, Result,
    catalog::CatalogItem,
    cell::CellFormatter,
    client::PortalClient,
    config::MAX_PREVIEW_LIMIT,
    error::PortalError,
    filters::filter_rows_with,
    http_client::HttpClient,
};

/// One record of a dataset preview. Field order is the order the backend sent.
pub type Row = serde_json::Map<String, Value>;

/// The first rows of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preview {
    /// Dataset identifier the rows were fetched for
    pub source_key: String,

    /// Keys of the first row, in first-seen order. Empty when there are no rows.
    pub columns: Vec<String>,

    pub rows: Vec<Row>,
}

impl Preview {
    /// Builds a preview from a backend response.
    ///
    /// A json array of objects yields one row per object; columns come from the
    /// first row. Anything else (object, null, scalar) yields an empty preview.
    /// Array elements that are not objects are skipped.
    pub fn from_value(source_key: impl Into<String>, value: Value) -> Self {
        let source_key = source_key.into();
        let rows: Vec<Row> = match value {
            Value::Array(items) => {
                let total = items.len();
                let rows: Vec<Row> = items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::Object(map) => Some(map),
                        _ => None,
                    })
                    .collect();
                if rows.len() != total {
                    debug!(
                        source = %source_key,
                        skipped = total - rows.len(),
                        "preview contained non-object rows"
                    );
                }
                rows
            }
            other => {
                debug!(source = %source_key, kind = value_kind(&other), "preview is not an array");
                Vec::new()
            }
        };
        let columns = rows
            .first()
            .map(|first| first.keys().cloned().collect())
            .unwrap_or_default();
        Self {
            source_key,
            columns,
            rows,
        }
    }

    /// An empty preview for `source_key`
    pub fn empty(source_key: impl Into<String>) -> Self {
        Self {
            source_key: source_key.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows where any cell contains `query`, ignoring case
    pub fn filtered_rows(&self, query: &str, formatter: &CellFormatter) -> Vec<&Row> {
        filter_rows_with(&self.rows, query, formatter)
    }

    /// Display strings for `row`, one per column. Missing fields are empty.
    pub fn cells(&self, row: &Row, formatter: &CellFormatter) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| row.get(column).map(|v| formatter.format(v)).unwrap_or_default())
            .collect()
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// File name for a CSV export: every run of characters other than ASCII
/// letters, digits and `_` becomes a single `_`, then `.csv` is appended.
///
/// ```rust
/// assert_eq!(portal_api::preview::download_file_name("HR Employees"), "HR_Employees.csv");
/// ```
pub fn download_file_name(label: &str) -> String {
    let mut out = String::with_capacity(label.len() + 4);
    let mut in_run = false;
    for ch in label.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out.push_str(".csv");
    out
}

fn validate_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(PortalError::Validation {
            message: "dataset key must not be empty".to_string(),
        });
    }
    Ok(())
}

// ============================================================================
// BUILDER STRUCTS (public)
// ============================================================================

/// Request builder for a dataset preview.
///
/// Obtained via [`PortalClient::preview`].
#[derive(Debug)]
pub struct PreviewRequest {
    client: Arc<HttpClient>,
    key: String,
    limit: u32,
}

impl PreviewRequest {
    pub(crate) fn new(client: Arc<HttpClient>, key: impl Into<String>) -> Self {
        Self {
            client,
            key: key.into(),
            limit: PREVIEW_ROW_LIMIT,
        }
    }

    /// Sets the maximum number of rows to fetch (default [`PREVIEW_ROW_LIMIT`]).
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Fetches `GET /data/{key}?limit={limit}`.
    ///
    /// # Errors
    /// - [`PortalError::Validation`] for an empty key or a limit outside 1..=10000
    /// - [`PortalError::NotFound`] if the backend does not know the dataset
    /// - [`PortalError::Http`] / [`PortalError::ApiError`] for transport and server failures
    pub async fn get(self) -> Result<Preview> {
        validate_key(&self.key)?;
        if self.limit == 0 || self.limit > MAX_PREVIEW_LIMIT {
            return Err(PortalError::Validation {
                message: format!("preview limit {} outside 1..={MAX_PREVIEW_LIMIT}", self.limit),
            });
        }
        let url = self.client.endpoint(&["data", &self.key])?;
        let query = vec![("limit".to_string(), self.limit.to_string())];
        let value: Value = self.client.get_json(url, query).await?;
        Ok(Preview::from_value(self.key, value))
    }
}

/// Request builder for a CSV export.
///
/// Obtained via [`PortalClient::download`].
#[derive(Debug)]
pub struct DownloadRequest {
    client: Arc<HttpClient>,
    key: String,
}

impl DownloadRequest {
    pub(crate) fn new(client: Arc<HttpClient>, key: impl Into<String>) -> Self {
        Self {
            client,
            key: key.into(),
        }
    }

    /// Url of `GET /data/{key}/download`
    pub fn url(&self) -> Result<Url> {
        validate_key(&self.key)?;
        self.client.endpoint(&["data", &self.key, "download"])
    }

    /// Fetches the raw CSV bytes. The body is not parsed.
    pub async fn bytes(self) -> Result<Bytes> {
        let url = self.url()?;
        self.client.get_bytes(url).await
    }
}

impl PortalClient {
    /// Returns a request builder for the first rows of dataset `key`
    pub fn preview(&self, key: impl Into<String>) -> PreviewRequest {
        PreviewRequest::new(self.client.clone(), key)
    }

    /// Fetches the preview for a catalog item with the default row cap
    pub async fn load_preview(&self, item: &CatalogItem) -> Result<Preview> {
        self.preview(item.key.clone()).get().await
    }

    /// Returns a request builder for the CSV export of dataset `key`
    pub fn download(&self, key: impl Into<String>) -> DownloadRequest {
        DownloadRequest::new(self.client.clone(), key)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn columns_follow_first_row_key_order() {
        let preview = Preview::from_value(
            "HR_Employees",
            json!([{"Name": "Alice", "Dept": "HR"}]),
        );
        assert_eq!(preview.source_key, "HR_Employees");
        assert_eq!(preview.columns, vec!["Name", "Dept"]);
        assert_eq!(preview.rows.len(), 1);
    }

    #[test]
    fn columns_come_from_first_row_only() {
        let preview = Preview::from_value(
            "x",
            json!([{"b": 1, "a": 2}, {"a": 3, "c": 4}]),
        );
        assert_eq!(preview.columns, vec!["b", "a"]);
        let fmt = CellFormatter::default();
        assert_eq!(preview.cells(&preview.rows[1], &fmt), vec!["", "3"]);
    }

    #[test]
    fn empty_array_is_an_empty_preview() {
        let preview = Preview::from_value("x", json!([]));
        assert!(preview.columns.is_empty());
        assert!(preview.rows.is_empty());
        assert!(preview.is_empty());
        assert_eq!(preview, Preview::empty("x"));
    }

    #[test]
    fn non_array_responses_are_empty_previews() {
        for value in [json!({"detail": "oops"}), json!(null), json!("text"), json!(3)] {
            let preview = Preview::from_value("x", value);
            assert!(preview.columns.is_empty());
            assert!(preview.rows.is_empty());
        }
    }

    #[test]
    fn non_object_elements_are_skipped() {
        let preview = Preview::from_value("x", json!([1, {"a": "b"}, null]));
        assert_eq!(preview.rows.len(), 1);
        assert_eq!(preview.columns, vec!["a"]);
    }

    #[test]
    fn filtered_rows_uses_formatter() {
        let preview = Preview::from_value(
            "HR_Employees",
            json!([{"Name": "Alice", "Dept": "HR"}, {"Name": "Bob", "Dept": "Finance"}]),
        );
        let fmt = CellFormatter::default();
        assert_eq!(preview.filtered_rows("alice", &fmt).len(), 1);
        assert_eq!(preview.filtered_rows("finance", &fmt).len(), 1);
        assert_eq!(preview.filtered_rows("", &fmt).len(), 2);
        assert!(preview.filtered_rows("payroll", &fmt).is_empty());
    }

    #[test]
    fn download_file_name_collapses_non_word_runs() {
        assert_eq!(download_file_name("HR Employees"), "HR_Employees.csv");
        assert_eq!(
            download_file_name("Bloomberg User ReportTable"),
            "Bloomberg_User_ReportTable.csv"
        );
        assert_eq!(download_file_name("a - b / c"), "a_b_c.csv");
        assert_eq!(download_file_name("keep_under"), "keep_under.csv");
        assert_eq!(download_file_name("Ünïcode"), "_n_code.csv");
    }
}
