use anyhow::Result;
use clap::Args;
use serde_json::Value;
use snyk_api::types::{Document, Resource};
use snyk_api::{BaseOptions, Client};

use crate::commands::parse_api;
use crate::output::{print_json, print_resources, OutputFormat};

#[derive(Args)]
pub struct GetArgs {
    /// Endpoint relative to the API base URL (e.g. orgs/<org-id>)
    pub endpoint: String,

    /// API version date (e.g. 2024-10-15). Required by the REST API.
    #[arg(long, default_value = "")]
    pub version: String,

    /// Target API: rest or v1
    #[arg(long, default_value = "rest")]
    pub api: String,
}

pub async fn run(args: &GetArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let api = parse_api(&args.api)?;
    let (body, _) = client
        .get::<Value, _>(api, &args.endpoint, &BaseOptions::new(&args.version))
        .await?;

    match (format, as_resource(&body)) {
        (OutputFormat::Json, _) | (_, None) => print_json(&body),
        (_, Some(resource)) => print_resources(&[resource], format)?,
    }
    Ok(())
}

/// The resource of a single-resource document, if `body` is one.
fn as_resource(body: &Value) -> Option<Resource> {
    serde_json::from_value::<Document<Resource>>(body.clone())
        .ok()
        .map(|doc| doc.data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_resource_from_document() {
        let body: Value =
            serde_json::from_str(include_str!("../../../snyk_api/tests/fixtures/org.json")).unwrap();
        let resource = as_resource(&body).unwrap();
        assert_eq!(resource.id, "9a46d918-8764-458c-1234-0987abcd6543");
        assert_eq!(resource.kind, "org");
    }

    #[test]
    fn test_as_resource_rejects_other_shapes() {
        assert!(as_resource(&serde_json::json!({"id": "x", "name": "v1 org"})).is_none());
        assert!(as_resource(&serde_json::json!({"data": [{"id": "x", "type": "org"}]})).is_none());
    }
}
