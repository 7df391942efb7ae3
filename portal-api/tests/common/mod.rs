//! Shared test utilities for portal integration tests
//!
//! Starts an in-process mock of the data backend on `127.0.0.1:0`:
//! - `GET /sources`
//! - `GET /data/:key?limit=N`
//! - `GET /data/:key/download`
//! - `GET /openapi.json`
//!
//! Datasets, failures and per-key response delays are configured on the
//! [`MockBackend`] handle and can be changed while the server runs.
#![allow(dead_code)]

use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use parking_lot::Mutex;
use portal_api::prelude::*;
use serde_json::{Value, json};
use tokio::sync::oneshot;

pub type TestResult<T = ()> = anyhow::Result<T>;

#[derive(Default)]
struct MockState {
    /// `None` makes `/sources` fail with 500
    sources: Option<Value>,
    datasets: HashMap<String, Value>,
    csv: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    openapi: Option<Value>,
    /// Path and query of every request, in arrival order
    requests: Vec<String>,
}

#[derive(Debug, serde::Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

/// Handle to a running mock backend. The server stops when the handle is dropped.
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
    base_url: String,
    shutdown_tx: Option<oneshot::Sender<()>>,
    _task: tokio::task::JoinHandle<()>,
}

impl MockBackend {
    /// Starts a backend serving the usual three datasets and an OpenAPI document.
    pub async fn start() -> TestResult<Self> {
        let backend = Self::start_empty().await?;
        backend.set_sources(&["Bloomberg_User_ReportTable", "HR_Employees", "RightFax_Users"]);
        backend.set_dataset(
            "HR_Employees",
            json!([
                {"Name": "Alice", "Dept": "HR", "Hired": "2021-04-01T09:00:00Z"},
                {"Name": "Bob", "Dept": "Finance", "Hired": "2019-11-15T09:00:00Z"},
                {"Name": "Carol", "Dept": "HR", "Hired": null},
            ]),
        );
        backend.set_dataset(
            "RightFax_Users",
            json!([{"UserID": "rf01", "Fax": "555-0100", "Enabled": true}]),
        );
        backend.set_dataset("Bloomberg_User_ReportTable", json!([]));
        backend.set_csv("HR_Employees", "Name,Dept\nAlice,HR\nBob,Finance\n");
        backend.set_openapi(sample_openapi());
        Ok(backend)
    }

    /// Starts a backend with no sources configured (`/sources` answers 500).
    pub async fn start_empty() -> TestResult<Self> {
        let state = Arc::new(Mutex::new(MockState::default()));

        let app = Router::new()
            .route("/sources", get(list_sources))
            .route("/data/:key", get(get_data))
            .route("/data/:key/download", get(download))
            .route("/openapi.json", get(openapi))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let base_url = format!("http://{addr}");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });

        Ok(Self {
            state,
            base_url,
            shutdown_tx: Some(shutdown_tx),
            _task: task,
        })
    }

    /// Server base url, e.g. `http://127.0.0.1:12345`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Client pointed at this backend
    pub fn client(&self) -> TestResult<PortalClient> {
        let config = ClientConfig::default()
            .base_url(self.base_url.clone())
            .max_retries(0);
        Ok(PortalClient::with_client(
            reqwest::Client::builder().no_proxy(),
            config,
        )?)
    }

    pub fn set_sources(&self, keys: &[&str]) {
        self.state.lock().sources = Some(json!({ "sources": keys }));
    }

    /// Replaces the whole `/sources` body
    pub fn set_sources_body(&self, body: Value) {
        self.state.lock().sources = Some(body);
    }

    pub fn fail_sources(&self) {
        self.state.lock().sources = None;
    }

    pub fn set_dataset(&self, key: &str, rows: Value) {
        self.state.lock().datasets.insert(key.to_string(), rows);
    }

    pub fn set_csv(&self, key: &str, csv: &str) {
        self.state.lock().csv.insert(key.to_string(), csv.to_string());
    }

    pub fn set_openapi(&self, doc: Value) {
        self.state.lock().openapi = Some(doc);
    }

    /// Delays responses for dataset `key`
    pub fn delay(&self, key: &str, delay: Duration) {
        self.state.lock().delays.insert(key.to_string(), delay);
    }

    /// Paths (with query) of the requests received so far
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().requests.clone()
    }

    fn record(state: &Mutex<MockState>, request: String) {
        state.lock().requests.push(request);
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn list_sources(State(state): State<Arc<Mutex<MockState>>>) -> Response {
    MockBackend::record(&state, "/sources".to_string());
    let sources = state.lock().sources.clone();
    match sources {
        Some(body) => Json(body).into_response(),
        None => (StatusCode::INTERNAL_SERVER_ERROR, "sources unavailable").into_response(),
    }
}

async fn get_data(
    State(state): State<Arc<Mutex<MockState>>>,
    Path(key): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Response {
    let limit = query.limit;
    MockBackend::record(
        &state,
        match limit {
            Some(limit) => format!("/data/{key}?limit={limit}"),
            None => format!("/data/{key}"),
        },
    );
    let delay = state.lock().delays.get(&key).copied();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    let rows = state.lock().datasets.get(&key).cloned();
    match rows {
        Some(Value::Array(rows)) => {
            let rows: Vec<Value> = rows.into_iter().take(limit.unwrap_or(usize::MAX)).collect();
            Json(Value::Array(rows)).into_response()
        }
        Some(other) => Json(other).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": format!("unknown source {key}")})),
        )
            .into_response(),
    }
}

async fn download(State(state): State<Arc<Mutex<MockState>>>, Path(key): Path<String>) -> Response {
    MockBackend::record(&state, format!("/data/{key}/download"));
    let csv = state.lock().csv.get(&key).cloned();
    match csv {
        Some(csv) => ([("content-type", "text/csv")], csv).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn openapi(State(state): State<Arc<Mutex<MockState>>>) -> Response {
    MockBackend::record(&state, "/openapi.json".to_string());
    let doc = state.lock().openapi.clone();
    match doc {
        Some(doc) => Json(doc).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub fn sample_openapi() -> Value {
    json!({
        "openapi": "3.1.0",
        "info": {"title": "Data Portal API", "version": "1.0.0"},
        "paths": {
            "/sources": {
                "get": {"summary": "List Sources", "operationId": "list_sources_sources_get"}
            },
            "/data/{view_name}": {
                "get": {"summary": "Get Data", "operationId": "get_data_data__view_name__get"}
            },
            "/data/{view_name}/download": {
                "get": {"summary": "Download Csv", "operationId": "download_csv"}
            }
        }
    })
}

/// A base url nothing listens on
pub async fn unreachable_url() -> TestResult<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}
