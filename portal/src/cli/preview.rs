use anyhow::{Context, Result};

use crate::cli::AppContext;

pub async fn handle(ctx: &AppContext, args: super::PreviewArgs) -> Result<()> {
    let preview = ctx
        .client
        .preview(args.key.clone())
        .limit(args.limit)
        .get()
        .await
        .with_context(|| format!("preview of {}", args.key))?;

    let query = args.search.unwrap_or_default();
    let rows = preview.filtered_rows(&query, &ctx.formatter);
    ctx.output.emit_rows(&preview, &rows, &ctx.formatter)
}
