//! Install engine
//!
//! Drives one lifecycle operation from request to applied object:
//!
//! 1. read the installed object's labels
//! 2. deny early on state alone (not installed, missing labels)
//! 3. look up the resource and its version set in the target catalog
//! 4. decide through [`LifecycleDecision`]
//! 5. fetch and validate the manifest
//! 6. gate on the controller version
//! 7. write the object with fresh provenance labels
//!
//! Every step fails fast. Nothing is written unless all earlier steps passed.

use std::fmt;
use tekhub_catalog::{CatalogService, ResourceVersion};
use tekhub_core::{
    CompatibilityChecker, CoreError, InstalledRecord, LifecycleDecision, Operation,
    OperationRequest, ResourceKind, VersionString,
};

use crate::applier::{ApplyTarget, ManifestApplier};
use crate::cluster::ClusterClient;
use crate::error::Result;

/// What a successful operation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub kind: ResourceKind,
    pub name: String,
    pub version: VersionString,
    pub catalog: String,
    pub namespace: String,
    pub operation: Operation,
    /// Non-fatal compatibility warning
    pub warning: Option<String>,
    /// Whether the object was created rather than replaced
    pub created: bool,
}

impl InstallOutcome {
    /// One-line success message
    pub fn message(&self) -> String {
        format!(
            "{} {}({}) {} in {} namespace",
            self.kind.title(),
            self.name,
            self.version,
            self.operation.past_tense(),
            self.namespace
        )
    }
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Runs lifecycle operations against a catalog and a cluster
pub struct Installer<C, K> {
    catalog: C,
    cluster: K,
    lifecycle: LifecycleDecision,
    compat: CompatibilityChecker,
}

impl<C: CatalogService, K: ClusterClient> Installer<C, K> {
    pub fn new(catalog: C, cluster: K) -> Self {
        Self {
            catalog,
            cluster,
            lifecycle: LifecycleDecision::default(),
            compat: CompatibilityChecker::default(),
        }
    }

    /// Use a configured state machine (ordering, default catalog)
    pub fn with_lifecycle(mut self, lifecycle: LifecycleDecision) -> Self {
        self.compat = CompatibilityChecker::new(*lifecycle.comparator());
        self.lifecycle = lifecycle;
        self
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn cluster(&self) -> &K {
        &self.cluster
    }

    /// Installed state of one resource
    pub async fn installed(
        &self,
        namespace: &str,
        kind: ResourceKind,
        name: &str,
    ) -> Result<InstalledRecord> {
        let labels = self.cluster.get_labels(namespace, kind, name).await?;
        Ok(InstalledRecord::from_labels(labels.as_ref()))
    }

    /// Run one operation to completion
    pub async fn run(&self, request: &OperationRequest) -> Result<InstallOutcome> {
        let kind = request.kind;
        let name = request.name.as_str();
        let record = self.installed(&request.namespace, kind, name).await?;

        if let Some(denial) = self.lifecycle.precheck(&record, request) {
            tracing::debug!("denied before catalog lookup: {}", denial.message());
            return Err(denial.into_error().into());
        }

        let catalog = self.lifecycle.target_catalog(&record, request);
        let resource = self
            .catalog
            .get_resource(&catalog, kind, name)
            .await?
            .found(&format!("{} {}", kind, name))?
            .ok_or_else(|| not_found(kind, name, None, &catalog))?;

        let versions = self
            .catalog
            .get_versions(resource.id)
            .await?
            .found(&format!("versions of {} {}", kind, name))?
            .ok_or_else(|| not_found(kind, name, None, &catalog))?;
        let available = versions.version_set();

        let resolution = self
            .lifecycle
            .decide(&record, request, &available)?
            .into_result()?;
        tracing::debug!(
            "{} {} resolved to v{} from {} catalog",
            request.operation,
            name,
            resolution.version,
            resolution.catalog
        );

        let metadata = if resource.latest_version.version == resolution.version {
            resource.latest_version
        } else {
            self.version_metadata(kind, name, &resolution.catalog, &resolution.version)
                .await?
        };

        let target = ApplyTarget {
            kind,
            name: name.to_string(),
            catalog: resolution.catalog.clone(),
            version: resolution.version.clone(),
            namespace: request.namespace.clone(),
        };
        let applier = ManifestApplier::new(&self.catalog, &self.cluster);
        let prepared = applier.prepare(&target).await?;

        let min_version = metadata
            .min_pipelines_version
            .or_else(|| prepared.min_pipelines_version());
        let cluster_version = self.cluster.detect_controller_version().await?;
        let compatibility = self.compat.check(
            kind,
            name,
            &resolution.version,
            min_version.as_ref(),
            cluster_version.as_ref(),
        )?;
        let warning = compatibility.warning().map(str::to_string);

        let result = applier.commit(prepared).await?;
        tracing::info!(
            "{} {}({}) {} in {}",
            kind.title(),
            name,
            resolution.version,
            request.operation.past_tense(),
            request.namespace
        );

        Ok(InstallOutcome {
            kind,
            name: name.to_string(),
            version: resolution.version,
            catalog: resolution.catalog,
            namespace: request.namespace.clone(),
            operation: request.operation,
            warning,
            created: result.created,
        })
    }

    async fn version_metadata(
        &self,
        kind: ResourceKind,
        name: &str,
        catalog: &str,
        version: &VersionString,
    ) -> Result<ResourceVersion> {
        let metadata = self
            .catalog
            .get_resource_version(catalog, kind, name, version)
            .await?
            .found(&format!("{} {}({})", kind, name, version))?
            .ok_or_else(|| not_found(kind, name, Some(version), catalog))?;
        Ok(metadata)
    }
}

fn not_found(
    kind: ResourceKind,
    name: &str,
    version: Option<&VersionString>,
    catalog: &str,
) -> CoreError {
    let resource = match version {
        Some(v) => format!("{} {}({})", kind.title(), name, v),
        None => format!("{} {}", kind.title(), name),
    };
    CoreError::NotFoundInCatalog {
        message: format!("{} not found in {} catalog", resource, catalog),
    }
}
