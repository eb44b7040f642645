use anyhow::{bail, Result};
use serde::Serialize;
use serde_json::Value;
use snyk_api::types::Resource;
use snyk_api::Region;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        Ok(match s {
            "table" => OutputFormat::Table,
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            "markdown" | "md" => OutputFormat::Markdown,
            other => bail!("unknown output format {:?} (expected table, json, csv or markdown)", other),
        })
    }
}

#[derive(Tabled, Serialize)]
struct ResourceRow {
    #[tabled(rename = "ID")]
    #[serde(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    #[serde(rename = "Type")]
    kind: String,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
}

#[derive(Tabled, Serialize)]
struct RegionRow {
    #[tabled(rename = "Alias")]
    #[serde(rename = "Alias")]
    alias: String,
    #[tabled(rename = "REST API")]
    #[serde(rename = "REST API")]
    rest: String,
    #[tabled(rename = "V1 API")]
    #[serde(rename = "V1 API")]
    v1: String,
    #[tabled(rename = "App")]
    #[serde(rename = "App")]
    app: String,
}

// -- Row builders --

/// Display name of a resource: `name`, else `slug`, else empty.
fn resource_name(resource: &Resource) -> String {
    let Some(attributes) = resource.attributes.as_ref() else {
        return String::new();
    };
    ["name", "slug"]
        .iter()
        .find_map(|key| attributes.get(*key).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}

fn build_resource_rows(resources: &[Resource]) -> Vec<ResourceRow> {
    resources
        .iter()
        .map(|r| ResourceRow {
            id: r.id.clone(),
            kind: r.kind.clone(),
            name: resource_name(r),
        })
        .collect()
}

fn build_region_rows(regions: &[Region]) -> Vec<RegionRow> {
    regions
        .iter()
        .map(|r| RegionRow {
            alias: r.alias.to_string(),
            rest: r.rest_base_url.to_string(),
            v1: r.v1_base_url.to_string(),
            app: r.app_base_url.to_string(),
        })
        .collect()
}

// -- Rendering --

fn render_rows<R: Tabled + Serialize>(rows: Vec<R>, format: &OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Table => Table::new(rows).to_string(),
        OutputFormat::Markdown => {
            let mut table = Table::new(rows);
            table.with(Style::markdown());
            table.to_string()
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(Vec::new());
            for row in rows {
                wtr.serialize(row)?;
            }
            String::from_utf8(wtr.into_inner()?)?
        }
        OutputFormat::Json => serde_json::to_string_pretty(&rows)?,
    })
}

pub fn print_resources(resources: &[Resource], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&resources),
        _ => println!("{}", render_rows(build_resource_rows(resources), format)?),
    }
    Ok(())
}

pub fn print_regions(regions: &[Region], format: &OutputFormat) -> Result<()> {
    println!("{}", render_rows(build_region_rows(regions), format)?);
    Ok(())
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_orgs_fixture() -> Vec<Resource> {
        let json_str = include_str!("../../snyk_api/tests/fixtures/orgs_page1.json");
        let resp: serde_json::Value = serde_json::from_str(json_str).unwrap();
        serde_json::from_value(resp["data"].clone()).unwrap()
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!(OutputFormat::parse("json").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("md").unwrap(), OutputFormat::Markdown);
        assert!(OutputFormat::parse("xml").is_err());
    }

    #[test]
    fn test_build_resource_rows_mapping() {
        let rows = build_resource_rows(&load_orgs_fixture());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "9a46d918-8764-458c-1234-0987abcd6543");
        assert_eq!(rows[0].kind, "org");
        assert_eq!(rows[0].name, "Platform Team");
    }

    #[test]
    fn test_resource_name_falls_back_to_slug() {
        let resource: Resource = serde_json::from_value(serde_json::json!({
            "id": "p-1",
            "type": "project",
            "attributes": { "slug": "only-slug" }
        }))
        .unwrap();
        assert_eq!(resource_name(&resource), "only-slug");
    }

    #[test]
    fn test_resource_name_without_attributes() {
        let resource: Resource =
            serde_json::from_value(serde_json::json!({"id": "x", "type": "user"})).unwrap();
        assert_eq!(resource_name(&resource), "");
    }

    #[test]
    fn test_render_csv_has_header_and_rows() {
        let csv = render_rows(build_resource_rows(&load_orgs_fixture()), &OutputFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("ID,Type,Name"));
        assert_eq!(
            lines.next(),
            Some("9a46d918-8764-458c-1234-0987abcd6543,org,Platform Team")
        );
    }

    #[test]
    fn test_render_markdown_table() {
        let md = render_rows(build_region_rows(snyk_api::region::regions()), &OutputFormat::Markdown)
            .unwrap();
        assert!(md.starts_with("| Alias"));
        assert!(md.contains("SNYK-EU-01"));
    }
}
