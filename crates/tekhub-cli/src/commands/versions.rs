//! versions command - list a resource's versions, latest first

use console::style;
use serde::Serialize;
use tekhub_catalog::{CatalogService, ResourceVersion};
use tekhub_core::{CoreError, ResourceKind, VersionComparator};

use crate::context::Context;
use crate::error::{CliError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VersionRow<'a> {
    version: &'a str,
    latest: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_pipelines_version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    web_url: Option<&'a str>,
}

pub async fn run(
    ctx: &Context,
    kind: ResourceKind,
    name: &str,
    from: Option<&str>,
    output: OutputFormat,
) -> Result<()> {
    let catalog_name = ctx.catalog_name(from);
    let versions = fetch(&ctx.catalog()?, &ctx.comparator(), catalog_name, kind, name).await?;

    match output {
        OutputFormat::Json => {
            let rows: Vec<VersionRow> = versions
                .iter()
                .enumerate()
                .map(|(i, v)| VersionRow {
                    version: v.version.as_str(),
                    latest: i == 0,
                    min_pipelines_version: v.min_pipelines_version.as_ref().map(|m| m.as_str()),
                    web_url: v.web_url.as_deref(),
                })
                .collect();
            let json = serde_json::to_string_pretty(&rows)
                .map_err(|e| CliError::internal(e.to_string()))?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            println!(
                "{} {} ({} catalog)",
                style(kind.title()).bold(),
                style(name).cyan(),
                catalog_name
            );
            for (i, v) in versions.iter().enumerate() {
                if i == 0 {
                    println!("  {} {}", v.version, style("(latest)").green());
                } else {
                    println!("  {}", v.version);
                }
            }
        }
    }
    Ok(())
}

/// All versions of a resource, sorted latest first
pub async fn fetch<C: CatalogService + ?Sized>(
    catalog: &C,
    comparator: &VersionComparator,
    catalog_name: &str,
    kind: ResourceKind,
    name: &str,
) -> Result<Vec<ResourceVersion>> {
    let not_found = || CoreError::NotFoundInCatalog {
        message: format!("{} {} not found in {} catalog", kind.title(), name, catalog_name),
    };

    let resource = catalog
        .get_resource(catalog_name, kind, name)
        .await?
        .found(&format!("{} {}", kind, name))?
        .ok_or_else(not_found)?;
    let list = catalog
        .get_versions(resource.id)
        .await?
        .found(&format!("versions of {} {}", kind, name))?
        .ok_or_else(not_found)?;

    let mut versions = list.versions;
    versions.sort_by(|a, b| comparator.compare(&b.version, &a.version));
    Ok(versions)
}
