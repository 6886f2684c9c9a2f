use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use osf_resources::{
    ApiContext, DEFAULT_API_URL, ListOptions, ResourceClient, ResourceConfig, resources,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "osf-cli",
    version,
    about = "Small async CLI for browsing OSF API resources"
)]
struct Cli {
    /// Base URL for the API.
    #[arg(long, env = "OSF_API_URL", default_value = DEFAULT_API_URL)]
    base_url: String,

    /// Access token sent as a bearer token.
    #[arg(long, env = "OSF_ACCESS_TOKEN")]
    access_token: Option<String>,

    /// Emit compact JSON instead of pretty-printed output.
    #[arg(long)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List declared resources.
    Resources,
    /// Fetch one page of a resource collection.
    List(ListArgs),
    /// Fetch one record by id.
    Detail(DetailArgs),
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Resource path segment (for example: nodes).
    resource: String,

    /// Number of records per page.
    #[arg(long)]
    page_size: Option<u32>,

    /// Page number, starting at 1.
    #[arg(long)]
    page: Option<u32>,
}

#[derive(Debug, Args)]
struct DetailArgs {
    /// Resource path segment (for example: users).
    resource: String,

    /// Record id.
    id: String,

    /// After fetching, list the collection linked from this attribute.
    #[arg(long, value_name = "ATTRIBUTE")]
    follow: Option<String>,
}

/// Entry point for the async CLI.
///
/// Parses command-line arguments, builds the API context, dispatches
/// subcommands, and prints JSON output.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // `resources` is metadata-only; it does not require an HTTP client.
    if let Command::Resources = &cli.command {
        print_resources();
        return Ok(());
    }

    let mut context = ApiContext::new(&cli.base_url)
        .with_context(|| format!("failed to create client with base URL '{}'", cli.base_url))?;
    if let Some(token) = &cli.access_token {
        context = context.with_authorization_token(token.clone());
    }
    let context = Arc::new(context);

    match &cli.command {
        Command::Resources => unreachable!("handled above"),
        Command::List(args) => {
            let client = resource_client(&context, &args.resource)?;
            let mut options = ListOptions::new();
            if let Some(size) = args.page_size {
                options = options.page_size(size);
            }
            if let Some(page) = args.page {
                options = options.page(page);
            }
            let page = client
                .list(&options)
                .await
                .with_context(|| format!("listing '{}' failed", args.resource))?;
            print_json(&page, cli.compact)
        }
        Command::Detail(args) => {
            let client = resource_client(&context, &args.resource)?;
            let model = client
                .detail(&args.id)
                .await
                .with_context(|| format!("fetching '{}/{}' failed", args.resource, args.id))?;
            tracing::info!(model = %model, "fetched");

            let Some(attribute) = &args.follow else {
                return print_json(&model, cli.compact);
            };
            let linked = model.link(attribute).with_context(|| {
                format!("attribute '{attribute}' of {model} is not a link to an API collection")
            })?;
            let page = linked
                .list(&ListOptions::new())
                .await
                .with_context(|| format!("listing linked '{attribute}' failed"))?;
            print_json(&page, cli.compact)
        }
    }
}

/// Resolves a declared resource, or a generic client for any other segment.
fn resource_client(context: &Arc<ApiContext>, segment: &str) -> Result<ResourceClient> {
    let config = resources::by_path_segment(segment)
        .unwrap_or_else(|| ResourceConfig::generic(segment.trim_matches('/')));
    context
        .client(config)
        .with_context(|| format!("invalid resource '{segment}'"))
}

/// Prints the declared resources as an aligned table.
fn print_resources() {
    let declared = resources::all();
    let width = declared
        .iter()
        .filter_map(|config| config.path_segment.as_deref())
        .map(str::len)
        .max()
        .unwrap_or(0);

    for config in declared {
        println!(
            "{:<width$}  {}",
            config.path_segment.unwrap_or_default(),
            config.model.map(|kind| kind.label().to_owned()).unwrap_or_default()
        );
    }
}

/// Prints a value as JSON, either compact or pretty-formatted.
fn print_json(value: &impl Serialize, compact: bool) -> Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
    .context("Failed to render JSON")?;
    println!("{rendered}");
    Ok(())
}
