//! # API documentation explorer
//!
//! A fixed catalog of named API specifications and a loader that turns an
//! OpenAPI document into a flat list of operations.
//!
//! ## API methods on PortalClient
//!
//! - [api_catalog](PortalClient::api_catalog) - the named API specifications
//! - [openapi](PortalClient::openapi) - fetch and parse one specification
//! - [load_api_document](PortalClient::load_api_document) - shorthand for `openapi(spec).get()`
//!
//! ```rust,no_run
//! use portal_api::prelude::*;
//!
//! # async fn example(client: &PortalClient) -> Result<(), PortalError> {
//! let apis = client.api_catalog();
//! let hr = filter_items(&apis, "hr")[0];
//! let doc = client.openapi(hr).get().await?;
//! for op in &doc.operations {
//!     println!("{:<7} {} {}", op.method, op.path, op.summary.as_deref().unwrap_or(""));
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    Result, client::PortalClient, error::PortalError, filters::Labeled, http_client::HttpClient,
};

/// Names of the API specifications offered by the explorer.
const API_NAMES: &[&str] = &["Bloomberg", "HR", "M365"];

/// Path of the OpenAPI document served by the backend
const OPENAPI_DOCUMENT: &str = "openapi.json";

/// HTTP methods that can appear as operations under an OpenAPI path item
const OPERATION_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// A named API specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSpec {
    pub key: String,
    pub label: String,
    /// Absolute url of the OpenAPI document
    pub url: String,
}

impl Labeled for ApiSpec {
    fn key(&self) -> &str {
        &self.key
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Returns the fixed API catalog. Every entry points at the backend's
/// `openapi.json`.
pub fn api_catalog(base_url: &Url) -> Vec<ApiSpec> {
    let mut doc_url = base_url.clone();
    if let Ok(mut path) = doc_url.path_segments_mut() {
        path.pop_if_empty().push(OPENAPI_DOCUMENT);
    }
    API_NAMES
        .iter()
        .map(|name| ApiSpec {
            key: (*name).to_string(),
            label: (*name).to_string(),
            url: doc_url.to_string(),
        })
        .collect()
}

/// One operation (path + method) of an OpenAPI document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OperationFields")]
pub struct Operation {
    /// Upper-case http method
    pub method: String,
    pub path: String,
    pub summary: Option<String>,
    pub operation_id: Option<String>,
    pub tags: Vec<String>,
    /// "METHOD path summary", used for filtering and list display
    #[serde(skip)]
    display: String,
}

impl Operation {
    pub fn new(
        method: &str,
        path: impl Into<String>,
        summary: Option<String>,
        operation_id: Option<String>,
        tags: Vec<String>,
    ) -> Self {
        let method = method.to_uppercase();
        let path = path.into();
        let display = match summary.as_deref() {
            Some(summary) if !summary.is_empty() => format!("{method} {path} {summary}"),
            _ => format!("{method} {path}"),
        };
        Self {
            method,
            path,
            summary,
            operation_id,
            tags,
            display,
        }
    }
}

/// Serialized form of [`Operation`]; the display label is rebuilt on load.
#[derive(Deserialize)]
struct OperationFields {
    method: String,
    path: String,
    summary: Option<String>,
    operation_id: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

impl From<OperationFields> for Operation {
    fn from(fields: OperationFields) -> Self {
        Operation::new(
            &fields.method,
            fields.path,
            fields.summary,
            fields.operation_id,
            fields.tags,
        )
    }
}

impl Labeled for Operation {
    fn key(&self) -> &str {
        self.operation_id.as_deref().unwrap_or(&self.path)
    }

    fn label(&self) -> &str {
        &self.display
    }
}

/// The parts of an OpenAPI document shown by the explorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDocument {
    pub title: String,
    pub version: Option<String>,
    pub description: Option<String>,
    /// Operations in document order
    pub operations: Vec<Operation>,
}

impl ApiDocument {
    /// Extracts title, version, description and operations from an OpenAPI document.
    ///
    /// # Errors
    /// - [`PortalError::Validation`] if the document is not a json object
    pub fn from_value(value: &Value) -> Result<Self> {
        let Some(doc) = value.as_object() else {
            return Err(PortalError::Validation {
                message: "OpenAPI document is not a json object".to_string(),
            });
        };
        let info = doc.get("info");
        let info_str = |field: &str| {
            info.and_then(|i| i.get(field))
                .and_then(Value::as_str)
                .map(ToString::to_string)
        };
        let title = info_str("title").unwrap_or_else(|| "(untitled)".to_string());

        let mut operations = Vec::new();
        if let Some(paths) = doc.get("paths").and_then(Value::as_object) {
            for (path, item) in paths {
                let Some(item) = item.as_object() else {
                    continue;
                };
                for (method, op) in item {
                    if !OPERATION_METHODS.contains(&method.as_str()) {
                        continue;
                    }
                    let text = |field: &str| {
                        op.get(field)
                            .and_then(Value::as_str)
                            .map(ToString::to_string)
                    };
                    let tags = op
                        .get("tags")
                        .and_then(Value::as_array)
                        .map(|tags| {
                            tags.iter()
                                .filter_map(Value::as_str)
                                .map(ToString::to_string)
                                .collect()
                        })
                        .unwrap_or_default();
                    operations.push(Operation::new(
                        method,
                        path.clone(),
                        text("summary"),
                        text("operationId"),
                        tags,
                    ));
                }
            }
        }

        Ok(Self {
            title,
            version: info_str("version"),
            description: info_str("description"),
            operations,
        })
    }
}

/// Request builder for an OpenAPI document.
///
/// Obtained via [`PortalClient::openapi`].
#[derive(Debug)]
pub struct OpenApiRequest {
    client: Arc<HttpClient>,
    url: String,
}

impl OpenApiRequest {
    pub(crate) fn new(client: Arc<HttpClient>, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Fetches the raw OpenAPI document
    pub async fn get_raw(self) -> Result<Value> {
        let url = Url::parse(&self.url).map_err(|e| PortalError::Validation {
            message: format!("invalid OpenAPI url '{}': {e}", self.url),
        })?;
        self.client.get_json(url, Vec::new()).await
    }

    /// Fetches and parses the OpenAPI document
    pub async fn get(self) -> Result<ApiDocument> {
        let value = self.get_raw().await?;
        ApiDocument::from_value(&value)
    }
}

impl PortalClient {
    /// Returns the fixed API catalog for this client's backend
    pub fn api_catalog(&self) -> Vec<ApiSpec> {
        api_catalog(&self.client.base_url)
    }

    /// Returns a request builder for the OpenAPI document of `spec`
    pub fn openapi(&self, spec: &ApiSpec) -> OpenApiRequest {
        OpenApiRequest::new(self.client.clone(), spec.url.clone())
    }

    /// Fetches and parses the OpenAPI document of `spec`
    pub async fn load_api_document(&self, spec: &ApiSpec) -> Result<ApiDocument> {
        self.openapi(spec).get().await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::filters::filter_items;

    fn petstore() -> Value {
        json!({
            "openapi": "3.1.0",
            "info": {"title": "Data API", "version": "0.1.0", "description": "Datasets"},
            "paths": {
                "/sources": {
                    "get": {"summary": "List Sources", "operationId": "list_sources", "tags": ["data"]}
                },
                "/data/{view}": {
                    "parameters": [],
                    "get": {"summary": "Get Data", "operationId": "get_data"},
                    "delete": {"operationId": "drop_data"}
                }
            }
        })
    }

    #[test]
    fn catalog_points_every_api_at_openapi_json() {
        let base = Url::parse("http://localhost:8000").unwrap();
        let apis = api_catalog(&base);
        let keys: Vec<&str> = apis.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, vec!["Bloomberg", "HR", "M365"]);
        assert!(apis.iter().all(|a| a.url == "http://localhost:8000/openapi.json"));

        let base = Url::parse("https://example.com/api/").unwrap();
        assert_eq!(api_catalog(&base)[0].url, "https://example.com/api/openapi.json");
    }

    #[test]
    fn api_catalog_is_filterable() {
        let base = Url::parse("http://localhost:8000").unwrap();
        let apis = api_catalog(&base);
        let hits = filter_items(&apis, "m3");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].key, "M365");
    }

    #[test]
    fn document_operations_keep_document_order() {
        let doc = ApiDocument::from_value(&petstore()).unwrap();
        assert_eq!(doc.title, "Data API");
        assert_eq!(doc.version.as_deref(), Some("0.1.0"));
        assert_eq!(doc.description.as_deref(), Some("Datasets"));
        let ops: Vec<(String, String)> = doc
            .operations
            .iter()
            .map(|op| (op.method.clone(), op.path.clone()))
            .collect();
        assert_eq!(
            ops,
            vec![
                ("GET".to_string(), "/sources".to_string()),
                ("GET".to_string(), "/data/{view}".to_string()),
                ("DELETE".to_string(), "/data/{view}".to_string()),
            ]
        );
        assert_eq!(doc.operations[0].tags, vec!["data"]);
        assert_eq!(doc.operations[2].key(), "drop_data");
    }

    #[test]
    fn operations_filter_on_method_path_and_summary() {
        let doc = ApiDocument::from_value(&petstore()).unwrap();
        assert_eq!(filter_items(&doc.operations, "delete").len(), 1);
        assert_eq!(filter_items(&doc.operations, "get data").len(), 1);
        assert_eq!(filter_items(&doc.operations, "/data").len(), 2);
    }

    #[test]
    fn operation_label_survives_json() {
        let op = Operation::new(
            "get",
            "/sources",
            Some("List Sources".to_string()),
            None,
            Vec::new(),
        );
        let back: Operation = serde_json::from_str(&serde_json::to_string(&op).unwrap()).unwrap();
        assert_eq!(back.label(), "GET /sources List Sources");
        assert_eq!(back, op);

        let doc = ApiDocument::from_value(&petstore()).unwrap();
        let back: ApiDocument = serde_json::from_value(serde_json::to_value(&doc).unwrap()).unwrap();
        assert_eq!(filter_items(&back.operations, "get data").len(), 1);
        assert_eq!(back, doc);
    }

    #[test]
    fn document_without_info_or_paths() {
        let doc = ApiDocument::from_value(&json!({})).unwrap();
        assert_eq!(doc.title, "(untitled)");
        assert!(doc.operations.is_empty());
        assert!(ApiDocument::from_value(&json!([1, 2])).is_err());
    }
}
