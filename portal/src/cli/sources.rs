use anyhow::Result;
use portal_api::prelude::*;
use tracing::warn;

use crate::{cli::AppContext, output::OutputFormat};

pub async fn handle(ctx: &AppContext, args: super::SearchArgs) -> Result<()> {
    let catalog = ctx.client.sources().load().await;
    if catalog.origin == CatalogOrigin::Fallback {
        warn!(url = %ctx.client.base_url(), "backend unavailable, listing built-in sources");
    }
    let query = args.search.unwrap_or_default();
    let items: Vec<CatalogItem> = filter_items(&catalog.items, &query)
        .into_iter()
        .cloned()
        .collect();

    if ctx.output.format() == OutputFormat::Table {
        return ctx.output.emit_table(&items);
    }
    ctx.output.emit_json(&Catalog {
        items,
        origin: catalog.origin,
    })
}
