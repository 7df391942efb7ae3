//! Integration tests for the API documentation explorer
//!
//! ```bash
//! cargo test -p portal-api --test test_apis
//! ```

mod common;

use crate::common::{MockBackend, TestResult};
use portal_api::prelude::*;
use serde_json::json;

#[tokio::test]
#[test_log::test]
async fn test_api_catalog_points_at_backend_document() -> TestResult {
    let backend = MockBackend::start().await?;
    let client = backend.client()?;
    let apis = client.api_catalog();
    assert_eq!(apis.len(), 3);
    let expected = format!("{}/openapi.json", backend.base_url());
    assert!(apis.iter().all(|api| api.url == expected));
    Ok(())
}

#[tokio::test]
#[test_log::test]
async fn test_load_api_document() -> TestResult {
    let backend = MockBackend::start().await?;
    let client = backend.client()?;
    let apis = client.api_catalog();
    let hr = filter_items(&apis, "hr")[0];

    let doc = client.load_api_document(hr).await?;
    assert_eq!(doc.title, "Data Portal API");
    assert_eq!(doc.version.as_deref(), Some("1.0.0"));
    let paths: Vec<&str> = doc.operations.iter().map(|op| op.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["/sources", "/data/{view_name}", "/data/{view_name}/download"]
    );
    assert_eq!(filter_items(&doc.operations, "download").len(), 1);
    assert_eq!(backend.requests(), vec!["/openapi.json"]);
    Ok(())
}

#[tokio::test]
#[test_log::test]
async fn test_missing_document_is_not_found() -> TestResult {
    let backend = MockBackend::start_empty().await?;
    let client = backend.client()?;
    let spec = client.api_catalog().remove(0);
    let err = client.openapi(&spec).get().await.unwrap_err();
    assert!(matches!(err, PortalError::NotFound { .. }), "{err:?}");
    Ok(())
}

#[tokio::test]
#[test_log::test]
async fn test_raw_document_is_available() -> TestResult {
    let backend = MockBackend::start().await?;
    backend.set_openapi(json!({"openapi": "3.0.0", "info": {"title": "Tiny"}, "paths": {}}));
    let client = backend.client()?;
    let spec = client.api_catalog().remove(2);
    assert_eq!(spec.key, "M365");
    let raw = client.openapi(&spec).get_raw().await?;
    assert_eq!(raw["info"]["title"], "Tiny");
    Ok(())
}
