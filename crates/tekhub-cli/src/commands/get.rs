//! get command - print a resource manifest

use tekhub_catalog::CatalogService;
use tekhub_core::{CoreError, ResourceKind, VersionComparator, VersionString};

use crate::commands::versions;
use crate::context::Context;
use crate::error::Result;

pub async fn run(
    ctx: &Context,
    kind: ResourceKind,
    name: &str,
    from: Option<&str>,
    version: Option<&str>,
) -> Result<()> {
    let catalog_name = ctx.catalog_name(from);
    let text = fetch_manifest(
        &ctx.catalog()?,
        &ctx.comparator(),
        catalog_name,
        kind,
        name,
        version.map(VersionString::from).as_ref(),
    )
    .await?;

    print!("{}", text);
    if !text.ends_with('\n') {
        println!();
    }
    Ok(())
}

/// Manifest text of `version`, or of the latest version
pub async fn fetch_manifest<C: CatalogService + ?Sized>(
    catalog: &C,
    comparator: &VersionComparator,
    catalog_name: &str,
    kind: ResourceKind,
    name: &str,
    version: Option<&VersionString>,
) -> Result<String> {
    let available = versions::fetch(catalog, comparator, catalog_name, kind, name).await?;
    let set: Vec<VersionString> = available.into_iter().map(|v| v.version).collect();

    let resolved = match version {
        Some(wanted) => comparator
            .find(&set, wanted)
            .cloned()
            .ok_or_else(|| CoreError::NotFoundInCatalog {
                message: format!(
                    "{} {}({}) not found in {} catalog",
                    kind.title(),
                    name,
                    wanted,
                    catalog_name
                ),
            })?,
        None => comparator.latest(name, &set)?,
    };

    let text = catalog
        .get_manifest(catalog_name, kind, name, &resolved)
        .await?
        .found(&format!("manifest of {} {}({})", kind, name, resolved))?
        .ok_or_else(|| CoreError::NotFoundInCatalog {
            message: format!(
                "{} {}({}) manifest not found in {} catalog",
                kind.title(),
                name,
                resolved,
                catalog_name
            ),
        })?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tekhub_catalog::MockCatalog;

    fn catalog() -> MockCatalog {
        let catalog = MockCatalog::new();
        catalog.add_resource("tekton", ResourceKind::Task, "foo", &["0.1", "0.3"]);
        catalog.set_manifest("tekton", ResourceKind::Task, "foo", "0.1", "kind: Task # 0.1\n");
        catalog.set_manifest("tekton", ResourceKind::Task, "foo", "0.3", "kind: Task # 0.3\n");
        catalog
    }

    #[tokio::test]
    async fn test_latest_manifest() {
        let text = fetch_manifest(&catalog(), &VersionComparator::default(), "tekton", ResourceKind::Task, "foo", None)
            .await
            .unwrap();
        assert_eq!(text, "kind: Task # 0.3\n");
    }

    #[tokio::test]
    async fn test_explicit_version() {
        let text = fetch_manifest(
            &catalog(),
            &VersionComparator::default(),
            "tekton",
            ResourceKind::Task,
            "foo",
            Some(&VersionString::from("v0.1.0")),
        )
        .await
        .unwrap();
        assert_eq!(text, "kind: Task # 0.1\n");
    }

    #[tokio::test]
    async fn test_unknown_version() {
        let err = fetch_manifest(
            &catalog(),
            &VersionComparator::default(),
            "tekton",
            ResourceKind::Task,
            "foo",
            Some(&VersionString::from("0.9")),
        )
        .await
        .unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"Task foo(0.9) not found in tekton catalog");
    }
}
