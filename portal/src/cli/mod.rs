/*
 * portal - browse, filter and preview Data Portal datasets
 *
 * SPDX-License-Identifier: Apache-2.0
 */
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use portal_api::prelude::*;
use tracing::{debug, warn};

use crate::output::{Output, OutputFormat};

pub mod apis;
pub mod browse;
pub mod download;
pub mod preview;
pub mod sources;

#[derive(Parser, Debug)]
#[command(name = "portal")]
#[command(author, version, about = "portal: browse, filter and preview Data Portal datasets", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Backend URL. Default: environment `PORTAL_URL`, or the url of `--env`
    #[arg(short = 'u', long, env = "PORTAL_URL", global = true)]
    pub url: Option<String>,

    /// Backend environment: development (<http://localhost:8000>) or deployed
    #[arg(long = "env", env = "PORTAL_ENV", value_name = "ENV", global = true)]
    pub environment: Option<Environment>,

    /// Write output to file (default: stdout)
    #[arg(short = 'o', long, value_name = "FILE", global = true)]
    pub output: Option<PathBuf>,

    /// JSON output (default)
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Table output format
    #[arg(short, long, global = true)]
    pub table: bool,

    /// Reformat RFC 3339 timestamps in previews, using a [chrono-strftime format](https://docs.rs/chrono/latest/chrono/format/strftime/index.html).
    /// Row search matches the reformatted text.
    #[arg(long, env = "PORTAL_DATE_FORMAT", global = true)]
    pub date_format: Option<String>,

    /// Quiet mode - suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (repeat for more: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List datasets (falls back to a built-in list if the backend is down)
    #[command(alias = "ls")]
    Sources(SearchArgs),

    /// Show the first rows of a dataset
    Preview(PreviewArgs),

    /// Save the CSV export of a dataset
    Download(DownloadArgs),

    /// List API specifications
    Apis(SearchArgs),

    /// List the operations of an API specification
    Openapi(OpenApiArgs),

    /// Interactive terminal browser
    Browse(BrowseArgs),
}

impl Commands {
    /// True for commands that take over the terminal
    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Browse(_))
    }
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Keep entries whose label contains this text (case-insensitive)
    #[arg(short, long)]
    pub search: Option<String>,
}

#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Dataset key, e.g. `HR_Employees`
    pub key: String,

    /// Number of rows to fetch
    #[arg(short, long, default_value_t = PREVIEW_ROW_LIMIT)]
    pub limit: u32,

    /// Keep rows where any cell contains this text (case-insensitive)
    #[arg(short, long)]
    pub search: Option<String>,
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Dataset key, e.g. `HR_Employees`
    pub key: String,

    /// Destination file or directory. Default: `<label>.csv` in the current directory
    #[arg(short, long, value_name = "PATH")]
    pub dest: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct OpenApiArgs {
    /// API name (key or label, e.g. HR)
    pub api: String,

    /// Keep operations whose method, path or summary contains this text
    #[arg(short, long)]
    pub search: Option<String>,
}

#[derive(Args, Debug)]
pub struct BrowseArgs {
    /// Page to open first
    #[arg(long, value_enum, default_value_t = PageArg::Data)]
    pub page: PageArg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PageArg {
    Data,
    Api,
}

pub struct AppContext {
    pub client: PortalClient,
    pub output: Output,
    pub formatter: CellFormatter,
}

pub async fn run(cli: Cli) -> Result<()> {
    let output = Output::new(resolve_output_format(&cli), cli.output.clone());
    let formatter = resolve_formatter(&cli)?;
    let client = build_client(&cli)?;

    let ctx = AppContext {
        client,
        output,
        formatter,
    };

    let result = match cli.command {
        Commands::Sources(args) => sources::handle(&ctx, args).await,
        Commands::Preview(args) => preview::handle(&ctx, args).await,
        Commands::Download(args) => download::handle(&ctx, args).await,
        Commands::Apis(args) => apis::handle_list(&ctx, &args),
        Commands::Openapi(args) => apis::handle_openapi(&ctx, args).await,
        Commands::Browse(args) => browse::handle(&ctx, args).await,
    };
    debug!(metrics = %ctx.client.http_metrics(), "http");
    result
}

fn resolve_output_format(cli: &Cli) -> OutputFormat {
    if cli.quiet {
        OutputFormat::Quiet
    } else if cli.pretty {
        if cli.table {
            warn!("--pretty conflicts with --table. Using json pretty format");
        }
        OutputFormat::Pretty
    } else if cli.json {
        if cli.table {
            warn!("--json conflicts with --table. Using json format");
        }
        OutputFormat::Json
    } else if cli.table {
        OutputFormat::Table
    } else {
        OutputFormat::Json
    }
}

fn resolve_formatter(cli: &Cli) -> Result<CellFormatter> {
    match &cli.date_format {
        Some(format) => Ok(CellFormatter::try_with_date_format(format.clone())?),
        None => Ok(CellFormatter::default()),
    }
}

fn build_client(cli: &Cli) -> Result<PortalClient> {
    let mut config = ClientConfig::default();
    if let Some(environment) = cli.environment {
        config = config.environment(environment);
    }
    if let Some(url) = &cli.url {
        config = config.base_url(url.clone());
    }
    Ok(PortalClient::with_config(config)?)
}
