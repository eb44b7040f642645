use anyhow::Result;
use clap::Args;
use snyk_api::types::Resource;
use snyk_api::{CancellationToken, Client, ListOptions};

use crate::commands::parse_api;
use crate::output::{print_resources, OutputFormat};

#[derive(Args)]
pub struct ListArgs {
    /// Collection endpoint relative to the API base URL (e.g. orgs, orgs/<org-id>/projects)
    pub endpoint: String,

    /// API version date (e.g. 2024-10-15)
    #[arg(long)]
    pub version: String,

    /// Results per page
    #[arg(long)]
    pub limit: Option<u32>,

    /// Stop after this many items
    #[arg(long)]
    pub max_items: Option<usize>,

    /// Give up after fetching this many pages
    #[arg(long, default_value = "1000")]
    pub max_pages: usize,

    /// Target API: rest or v1
    #[arg(long, default_value = "rest")]
    pub api: String,
}

pub async fn run(args: &ListArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let resources = collect(args, client, cancel).await?;
    print_resources(&resources, format)
}

/// Walks the collection until it ends or `--max-items` is reached.
async fn collect(args: &ListArgs, client: &Client, cancel: CancellationToken) -> Result<Vec<Resource>> {
    let api = parse_api(&args.api)?;
    let mut opts = ListOptions::new(&args.version);
    if let Some(limit) = args.limit {
        opts = opts.with_limit(limit);
    }

    let mut pages = client
        .paginate::<Resource>(api, &args.endpoint, opts)
        .with_cancellation(cancel)
        .with_max_pages(args.max_pages);

    let mut resources = Vec::new();
    while let Some((resource, _)) = pages.next().await {
        resources.push(resource);
        if args.max_items.is_some_and(|max| resources.len() >= max) {
            break;
        }
    }
    if let Some(err) = pages.take_error() {
        return Err(err.into());
    }

    eprintln!(
        "{} results from {} page(s)",
        resources.len(),
        pages.pages_fetched()
    );
    Ok(resources)
}
