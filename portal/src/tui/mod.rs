//! Interactive terminal browser: a navigation bar over the Data and API pages.

mod app;
mod keys;
mod loader;
mod ui;

use anyhow::Result;
use portal_api::prelude::*;
use tokio::runtime::Handle;

pub use app::Route;

/// Runs the browser until the user quits. Blocks the calling thread; fetches
/// are spawned on `handle`.
pub fn run(client: PortalClient, formatter: CellFormatter, route: Route, handle: Handle) -> Result<()> {
    app::App::run(client, formatter, route, handle)
}
