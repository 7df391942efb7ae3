//! Runs fetches on the tokio runtime and reports results back to the UI thread.
//!
//! The UI never awaits. It queues [`FetchRequest`]s, the loader spawns one task
//! per request, and each task sends a [`LoadEvent`] carrying the ticket it was
//! started with. The app applies events through the page state, which discards
//! results for superseded selections.

use std::path::PathBuf;

use portal_api::prelude::*;
use tokio::{runtime::Handle, sync::mpsc};
use tracing::debug;

/// Work the UI wants done
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Sources(CatalogTicket),
    Preview(LoadTicket<CatalogItem>),
    ApiDocument(LoadTicket<ApiSpec>),
    Download { key: String, label: String },
}

/// Result of one [`FetchRequest`]
#[derive(Debug)]
pub enum LoadEvent {
    Sources(CatalogTicket, Catalog),
    Preview(LoadTicket<CatalogItem>, Result<Preview, String>),
    ApiDocument(LoadTicket<ApiSpec>, Result<ApiDocument, String>),
    Downloaded {
        label: String,
        result: Result<(PathBuf, usize), String>,
    },
}

pub struct Loader {
    client: PortalClient,
    handle: Handle,
    tx: mpsc::UnboundedSender<LoadEvent>,
    rx: mpsc::UnboundedReceiver<LoadEvent>,
}

impl Loader {
    pub fn new(client: PortalClient, handle: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client,
            handle,
            tx,
            rx,
        }
    }

    /// Spawns the fetch for `request`. Exactly one task per request.
    pub fn dispatch(&self, request: FetchRequest) {
        debug!(?request, "dispatch");
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let event = fetch(&client, request).await;
            // receiver is gone only after the UI has exited
            let _ = tx.send(event);
        });
    }

    /// Results that arrived since the last call, in arrival order
    pub fn drain(&mut self) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

async fn fetch(client: &PortalClient, request: FetchRequest) -> LoadEvent {
    match request {
        FetchRequest::Sources(ticket) => LoadEvent::Sources(ticket, client.sources().load().await),
        FetchRequest::Preview(ticket) => {
            let result = client
                .load_preview(ticket.item())
                .await
                .map_err(|e| e.to_string());
            LoadEvent::Preview(ticket, result)
        }
        FetchRequest::ApiDocument(ticket) => {
            let result = client
                .load_api_document(ticket.item())
                .await
                .map_err(|e| e.to_string());
            LoadEvent::ApiDocument(ticket, result)
        }
        FetchRequest::Download { key, label } => {
            let path = PathBuf::from(download_file_name(&label));
            let result = match client.download(key).bytes().await {
                Ok(bytes) => match tokio::fs::write(&path, &bytes).await {
                    Ok(()) => Ok((path, bytes.len())),
                    Err(e) => Err(format!("writing {}: {e}", path.display())),
                },
                Err(e) => Err(e.to_string()),
            };
            LoadEvent::Downloaded { label, result }
        }
    }
}
