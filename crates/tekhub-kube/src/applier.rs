//! Fetch a resource manifest from the hub and write it to the cluster
//!
//! The manifest is parsed into a [`DynamicObject`], checked against the
//! requested kind, pinned to the target name and namespace, and stamped with
//! the provenance labels that later runs read back as the installed state.

use kube::api::DynamicObject;
use tekhub_catalog::CatalogService;
use tekhub_core::{CoreError, ResourceKind, VersionString, provenance_labels};

use crate::cluster::{ApplyResult, ClusterClient, TEKTON_GROUP, gvk_from_type_meta};
use crate::error::{KubeError, Result};

/// Annotation declaring the minimum Tekton Pipelines version
pub const MIN_VERSION_ANNOTATION: &str = "tekton.dev/pipelines.minVersion";

/// What to fetch and where to put it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyTarget {
    pub kind: ResourceKind,
    pub name: String,
    pub catalog: String,
    pub version: VersionString,
    pub namespace: String,
}

impl ApplyTarget {
    fn display(&self) -> String {
        format!("{} {}({})", self.kind, self.name, self.version)
    }
}

/// A validated manifest, not yet written
#[derive(Debug, Clone)]
pub struct PreparedManifest {
    target: ApplyTarget,
    object: DynamicObject,
}

impl PreparedManifest {
    pub fn target(&self) -> &ApplyTarget {
        &self.target
    }

    pub fn object(&self) -> &DynamicObject {
        &self.object
    }

    /// Minimum controller version declared in the manifest annotations
    pub fn min_pipelines_version(&self) -> Option<VersionString> {
        self.object
            .metadata
            .annotations
            .as_ref()?
            .get(MIN_VERSION_ANNOTATION)
            .filter(|v| !v.trim().is_empty())
            .map(|v| VersionString::new(v.trim()))
    }
}

/// Applies hub manifests to a cluster
pub struct ManifestApplier<'a, C: ?Sized, K: ?Sized> {
    catalog: &'a C,
    cluster: &'a K,
}

impl<'a, C, K> ManifestApplier<'a, C, K>
where
    C: CatalogService + ?Sized,
    K: ClusterClient + ?Sized,
{
    pub fn new(catalog: &'a C, cluster: &'a K) -> Self {
        Self { catalog, cluster }
    }

    /// Fetch and validate the manifest without touching the cluster
    pub async fn prepare(&self, target: &ApplyTarget) -> Result<PreparedManifest> {
        let text = self
            .catalog
            .get_manifest(&target.catalog, target.kind, &target.name, &target.version)
            .await?
            .found(&format!("manifest of {}", target.display()))?
            .ok_or_else(|| CoreError::NotFoundInCatalog {
                message: format!(
                    "{} {}({}) manifest not found in {} catalog",
                    target.kind.title(),
                    target.name,
                    target.version,
                    target.catalog
                ),
            })?;

        let object = parse_manifest(&text, target)?;
        Ok(PreparedManifest {
            target: target.clone(),
            object,
        })
    }

    /// Stamp provenance labels and create or replace the object
    pub async fn commit(&self, prepared: PreparedManifest) -> Result<ApplyResult> {
        let PreparedManifest { target, mut object } = prepared;
        object
            .metadata
            .labels
            .get_or_insert_with(Default::default)
            .extend(provenance_labels(&target.catalog, &target.version));

        tracing::debug!(
            "applying {} to {} from {} catalog",
            target.display(),
            target.namespace,
            target.catalog
        );
        self.cluster
            .create_or_replace(&target.namespace, target.kind, object)
            .await
    }

    /// [`prepare`](Self::prepare) then [`commit`](Self::commit)
    pub async fn apply(&self, target: &ApplyTarget) -> Result<ApplyResult> {
        let prepared = self.prepare(target).await?;
        self.commit(prepared).await
    }
}

/// Parse a single-resource manifest and pin it to `target`
pub fn parse_manifest(manifest: &str, target: &ApplyTarget) -> Result<DynamicObject> {
    let invalid = |reason: String| KubeError::InvalidManifest {
        resource: target.display(),
        reason,
    };

    let documents: Vec<&str> = manifest
        .split("\n---")
        .map(|doc| doc.trim().trim_start_matches("---").trim())
        .filter(|doc| {
            !doc.lines()
                .all(|l| l.trim().is_empty() || l.trim().starts_with('#'))
        })
        .collect();
    let doc = match documents.as_slice() {
        [doc] => *doc,
        [] => return Err(invalid("manifest is empty".to_string())),
        docs => {
            return Err(invalid(format!(
                "expected a single resource, found {} documents",
                docs.len()
            )));
        }
    };

    let mut obj: DynamicObject =
        serde_yaml::from_str(doc).map_err(|e| invalid(format!("YAML parse error: {}", e)))?;

    let type_meta = obj
        .types
        .as_ref()
        .ok_or_else(|| invalid("resource missing apiVersion or kind".to_string()))?;
    let gvk = gvk_from_type_meta(type_meta);
    if gvk.group != TEKTON_GROUP {
        return Err(invalid(format!(
            "unexpected apiVersion {}",
            type_meta.api_version
        )));
    }
    if gvk.kind != target.kind.title() {
        return Err(invalid(format!(
            "expected kind {}, found {}",
            target.kind.title(),
            gvk.kind
        )));
    }

    match obj.metadata.name.as_deref() {
        None | Some("") => return Err(invalid("missing metadata.name".to_string())),
        Some(name) if name != target.name => {
            tracing::debug!("manifest names {}, installing as {}", name, target.name);
        }
        Some(_) => {}
    }

    obj.metadata.name = Some(target.name.clone());
    obj.metadata.namespace = Some(target.namespace.clone());
    obj.metadata.resource_version = None;
    obj.metadata.uid = None;
    Ok(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::MockCluster;
    use tekhub_catalog::MockCatalog;
    use tekhub_core::{CATALOG_LABEL, MANAGED_BY_LABEL, VERSION_LABEL};

    fn target(kind: ResourceKind, name: &str, version: &str) -> ApplyTarget {
        ApplyTarget {
            kind,
            name: name.to_string(),
            catalog: "tekton".to_string(),
            version: VersionString::from(version),
            namespace: "hub".to_string(),
        }
    }

    #[test]
    fn test_parse_manifest_pins_name_and_namespace() {
        let manifest = "---\n# hub manifest\napiVersion: tekton.dev/v1\nkind: Task\nmetadata:\n  name: foo-task\n  namespace: elsewhere\nspec:\n  steps: []\n";
        let obj = parse_manifest(manifest, &target(ResourceKind::Task, "foo", "0.3")).unwrap();
        assert_eq!(obj.metadata.name.as_deref(), Some("foo"));
        assert_eq!(obj.metadata.namespace.as_deref(), Some("hub"));
        assert_eq!(obj.types.unwrap().api_version, "tekton.dev/v1");
        assert!(obj.data.get("spec").is_some());
    }

    #[test]
    fn test_parse_manifest_accepts_json() {
        let manifest = r#"{"apiVersion":"tekton.dev/v1beta1","kind":"Pipeline","metadata":{"name":"bar"},"spec":{"tasks":[]}}"#;
        let obj = parse_manifest(manifest, &target(ResourceKind::Pipeline, "bar", "0.1")).unwrap();
        assert_eq!(obj.types.unwrap().kind, "Pipeline");
    }

    #[test]
    fn test_parse_manifest_rejections() {
        let t = target(ResourceKind::Task, "foo", "0.3");
        let reason = |manifest: &str| match parse_manifest(manifest, &t) {
            Err(KubeError::InvalidManifest { reason, .. }) => reason,
            other => panic!("expected InvalidManifest, got {:?}", other),
        };

        insta::assert_snapshot!(
            reason("apiVersion: tekton.dev/v1beta1\nkind: Pipeline\nmetadata:\n  name: foo\n"),
            @"expected kind Task, found Pipeline"
        );
        insta::assert_snapshot!(
            reason("apiVersion: v1\nkind: Task\nmetadata:\n  name: foo\n"),
            @"unexpected apiVersion v1"
        );
        insta::assert_snapshot!(
            reason("apiVersion: tekton.dev/v1beta1\nkind: Task\nmetadata: {}\n"),
            @"missing metadata.name"
        );
        insta::assert_snapshot!(reason("# nothing here\n"), @"manifest is empty");
        insta::assert_snapshot!(
            reason("apiVersion: tekton.dev/v1\nkind: Task\nmetadata:\n  name: a\n---\napiVersion: tekton.dev/v1\nkind: Task\nmetadata:\n  name: b\n"),
            @"expected a single resource, found 2 documents"
        );
        assert!(reason("kind: [unclosed").starts_with("YAML parse error"));
    }

    #[tokio::test]
    async fn test_apply_stamps_provenance() {
        let catalog = MockCatalog::new();
        catalog.add_resource("tekton", ResourceKind::Task, "foo", &["0.1", "0.3"]);
        let cluster = MockCluster::new();
        let applier = ManifestApplier::new(&catalog, &cluster);

        let result = applier
            .apply(&target(ResourceKind::Task, "foo", "0.3"))
            .await
            .unwrap();
        assert!(result.created);

        let labels = cluster.labels("hub", ResourceKind::Task, "foo");
        assert_eq!(labels.get(CATALOG_LABEL).map(String::as_str), Some("tekton"));
        assert_eq!(labels.get(VERSION_LABEL).map(String::as_str), Some("0.3"));
        assert_eq!(labels.get(MANAGED_BY_LABEL).map(String::as_str), Some("tekhub"));

        let result = applier
            .apply(&target(ResourceKind::Task, "foo", "0.1"))
            .await
            .unwrap();
        assert!(!result.created);
        let labels = cluster.labels("hub", ResourceKind::Task, "foo");
        assert_eq!(labels.get(VERSION_LABEL).map(String::as_str), Some("0.1"));
    }

    #[tokio::test]
    async fn test_prepare_reads_min_version() {
        let catalog = MockCatalog::new();
        catalog.add_resource("tekton", ResourceKind::Task, "foo", &["0.3"]);
        let cluster = MockCluster::new();

        let prepared = ManifestApplier::new(&catalog, &cluster)
            .prepare(&target(ResourceKind::Task, "foo", "0.3"))
            .await
            .unwrap();
        assert_eq!(
            prepared.min_pipelines_version(),
            Some(VersionString::from("0.12.1"))
        );
        assert_eq!(cluster.operation_counts().writes(), 0);
    }

    #[tokio::test]
    async fn test_missing_manifest() {
        let catalog = MockCatalog::new();
        catalog.add_resource("tekton", ResourceKind::Task, "foo", &["0.3"]);
        catalog.remove_manifest("tekton", ResourceKind::Task, "foo", "0.3");
        let cluster = MockCluster::new();

        let err = ManifestApplier::new(&catalog, &cluster)
            .apply(&target(ResourceKind::Task, "foo", "0.3"))
            .await
            .unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"Task foo(0.3) manifest not found in tekton catalog");
        assert!(matches!(
            err.as_core(),
            Some(CoreError::NotFoundInCatalog { .. })
        ));
        assert_eq!(cluster.operation_counts().writes(), 0);
    }

    #[tokio::test]
    async fn test_hub_failure_is_upstream() {
        let catalog = MockCatalog::new();
        catalog.add_resource("tekton", ResourceKind::Task, "foo", &["0.3"]);
        catalog.fail_with("database down");
        let cluster = MockCluster::new();

        let err = ManifestApplier::new(&catalog, &cluster)
            .apply(&target(ResourceKind::Task, "foo", "0.3"))
            .await
            .unwrap_err();
        assert!(matches!(err, KubeError::Catalog(_)));
        assert!(err.to_string().contains("database down"));
    }
}
