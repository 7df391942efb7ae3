use anyhow::Result;
use tokio::runtime::Handle;

use super::{AppContext, BrowseArgs, PageArg};
use crate::tui::{self, Route};

pub async fn handle(ctx: &AppContext, args: BrowseArgs) -> Result<()> {
    let client = ctx.client.clone();
    let formatter = ctx.formatter.clone();
    let route = match args.page {
        PageArg::Data => Route::Data,
        PageArg::Api => Route::Api,
    };
    let handle = Handle::current();
    tokio::task::spawn_blocking(move || tui::run(client, formatter, route, handle)).await?
}
