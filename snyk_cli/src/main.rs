mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use snyk_api::{Client, ClientBuilder, Error};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "snyk")]
#[command(about = "Query the Snyk REST and V1 APIs")]
struct Cli {
    /// Output format: table, json, csv or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// Region alias (e.g. SNYK-EU-01). Overrides SNYK_REGION.
    #[arg(long, global = true)]
    region: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk a paginated collection
    List(commands::list::ListArgs),
    /// Fetch a single document
    Get(commands::get::GetArgs),
    /// List known Snyk regions
    Regions,
}

/// Builds a client from the environment, letting `--region` win over `SNYK_REGION`.
fn build_client(region: Option<&str>) -> Result<Client, Error> {
    let mut builder = ClientBuilder::from_env()?;
    if let Some(alias) = region {
        builder = builder.region_alias(alias);
    }
    builder.build()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("snyk_api=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::parse(&cli.output)?;

    match &cli.command {
        Commands::Regions => commands::regions::run(&format)?,
        Commands::List(args) => {
            let client = build_client(cli.region.as_deref())?;
            commands::list::run(args, &client, &format).await?
        }
        Commands::Get(args) => {
            let client = build_client(cli.region.as_deref())?;
            commands::get::run(args, &client, &format).await?
        }
    }

    Ok(())
}
