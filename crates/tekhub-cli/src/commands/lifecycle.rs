//! install / upgrade / downgrade / reinstall

use console::style;
use tekhub_core::{Operation, OperationRequest, ResourceKind};
use tekhub_kube::Installer;

use crate::context::Context;
use crate::error::Result;

/// Run one lifecycle operation against the current cluster
pub async fn run(
    ctx: &Context,
    operation: Operation,
    kind: ResourceKind,
    name: &str,
    from: Option<&str>,
    version: Option<&str>,
) -> Result<()> {
    let catalog = ctx.catalog()?;
    let (cluster, namespace) = ctx.cluster().await?;

    let mut request = OperationRequest::new(operation, kind, name, namespace);
    if let Some(from) = from {
        request = request.with_catalog(from);
    }
    if let Some(version) = version {
        request = request.with_version(version);
    }

    let outcome = Installer::new(catalog, cluster)
        .with_lifecycle(ctx.lifecycle())
        .run(&request)
        .await?;

    if let Some(warning) = &outcome.warning {
        eprintln!("{} {}", style("WARN:").yellow().bold(), warning);
    }
    println!("{}", outcome);
    Ok(())
}
