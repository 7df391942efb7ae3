use anyhow::{Result, anyhow};
use portal_api::prelude::*;

use crate::{cli::AppContext, output::OutputFormat};

pub fn handle_list(ctx: &AppContext, args: &super::SearchArgs) -> Result<()> {
    let apis = ctx.client.api_catalog();
    let query = args.search.clone().unwrap_or_default();
    let items: Vec<ApiSpec> = filter_items(&apis, &query).into_iter().cloned().collect();
    ctx.output.emit_table(&items)
}

pub async fn handle_openapi(ctx: &AppContext, args: super::OpenApiArgs) -> Result<()> {
    let apis = ctx.client.api_catalog();
    let spec = find_api(&apis, &args.api)?;
    let doc = ctx.client.load_api_document(spec).await?;

    let query = args.search.unwrap_or_default();
    let operations: Vec<Operation> = filter_items(&doc.operations, &query)
        .into_iter()
        .cloned()
        .collect();

    if ctx.output.format() == OutputFormat::Table {
        let version = doc.version.as_deref().unwrap_or("-");
        ctx.output.emit_text(&format!(
            "Data Portal API – {} ({} {version})",
            spec.label, doc.title
        ))?;
        return ctx.output.emit_table(&operations);
    }
    ctx.output.emit_json(&ApiDocument {
        operations,
        ..doc
    })
}

/// Looks up an API by key or label, ignoring case
fn find_api<'a>(apis: &'a [ApiSpec], name: &str) -> Result<&'a ApiSpec> {
    apis.iter()
        .find(|api| api.key.eq_ignore_ascii_case(name) || api.label.eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            let known: Vec<&str> = apis.iter().map(|api| api.key.as_str()).collect();
            anyhow!("unknown API '{name}', expected one of: {}", known.join(", "))
        })
}
