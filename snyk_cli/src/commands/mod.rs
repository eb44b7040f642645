//! CLI subcommand implementations.

pub mod get;
pub mod list;
pub mod regions;

use anyhow::{bail, Result};
use snyk_api::Api;

/// Parses the `--api` flag.
pub fn parse_api(s: &str) -> Result<Api> {
    Ok(match s {
        "rest" => Api::Rest,
        "v1" => Api::V1,
        other => bail!("unknown API {:?} (expected rest or v1)", other),
    })
}
