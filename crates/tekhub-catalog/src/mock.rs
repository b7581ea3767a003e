//! In-memory catalog for testing
//!
//! Serves resources, versions and manifests without a hub, and counts the
//! calls made so tests can assert what the engine fetched.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tekhub_core::{ResourceKind, VersionComparator, VersionString};

use crate::error::Result;
use crate::service::CatalogService;
use crate::types::{CatalogInfo, Lookup, Resource, ResourceSummary, ResourceVersion, VersionsList};

type ResourceKey = (String, ResourceKind, String);

#[derive(Debug, Clone)]
struct MockResource {
    id: u32,
    catalog: String,
    kind: ResourceKind,
    name: String,
    /// Versions in catalog order
    versions: Vec<VersionString>,
    manifests: HashMap<VersionString, String>,
    min_pipelines_versions: HashMap<VersionString, VersionString>,
}

impl MockResource {
    fn version(&self, version: &VersionString) -> ResourceVersion {
        let index = self
            .versions
            .iter()
            .position(|v| v == version)
            .unwrap_or_default();
        ResourceVersion {
            id: self.id * 100 + index as u32,
            version: version.clone(),
            display_name: Some(self.name.clone()),
            description: None,
            min_pipelines_version: self.min_pipelines_versions.get(version).cloned(),
            raw_url: None,
            web_url: None,
            resource: Some(ResourceSummary {
                id: self.id,
                name: self.name.clone(),
                kind: Some(self.kind.title().to_string()),
                catalog: Some(self.catalog_info()),
            }),
        }
    }

    fn catalog_info(&self) -> CatalogInfo {
        CatalogInfo {
            id: 1,
            name: self.catalog.clone(),
            catalog_type: Some("community".to_string()),
        }
    }

    fn latest(&self) -> Option<VersionString> {
        VersionComparator::default()
            .latest(&self.name, &self.versions)
            .ok()
    }
}

/// Counts of calls for testing assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CallCounts {
    pub resources: usize,
    pub resource_versions: usize,
    pub versions: usize,
    pub manifests: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.resources + self.resource_versions + self.versions + self.manifests
    }
}

/// In-memory catalog service
#[derive(Clone, Default)]
pub struct MockCatalog {
    resources: Arc<RwLock<HashMap<ResourceKey, MockResource>>>,
    calls: Arc<RwLock<CallCounts>>,
    /// When set, every lookup answers `InternalError`
    failing: Arc<RwLock<Option<String>>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource with versions in catalog order
    ///
    /// Each version gets a generated manifest. Returns the resource id.
    pub fn add_resource(
        &self,
        catalog: &str,
        kind: ResourceKind,
        name: &str,
        versions: &[&str],
    ) -> u32 {
        let mut resources = self.resources.write().unwrap();
        let id = resources.len() as u32 + 1;
        let versions: Vec<VersionString> = versions.iter().map(|v| VersionString::from(*v)).collect();
        let manifests = versions
            .iter()
            .map(|v| (v.clone(), sample_manifest(kind, name, v)))
            .collect();
        resources.insert(
            (catalog.to_string(), kind, name.to_string()),
            MockResource {
                id,
                catalog: catalog.to_string(),
                kind,
                name: name.to_string(),
                versions,
                manifests,
                min_pipelines_versions: HashMap::new(),
            },
        );
        id
    }

    /// Replace the manifest text served for one version
    pub fn set_manifest(
        &self,
        catalog: &str,
        kind: ResourceKind,
        name: &str,
        version: &str,
        manifest: impl Into<String>,
    ) {
        let mut resources = self.resources.write().unwrap();
        if let Some(resource) = resources.get_mut(&(catalog.to_string(), kind, name.to_string())) {
            resource
                .manifests
                .insert(VersionString::from(version), manifest.into());
        }
    }

    /// Remove the manifest for one version, so fetching it answers `NotFound`
    pub fn remove_manifest(&self, catalog: &str, kind: ResourceKind, name: &str, version: &str) {
        let mut resources = self.resources.write().unwrap();
        if let Some(resource) = resources.get_mut(&(catalog.to_string(), kind, name.to_string())) {
            resource.manifests.remove(&VersionString::from(version));
        }
    }

    /// Declare the minimum Tekton Pipelines version of one version
    pub fn set_min_pipelines_version(
        &self,
        catalog: &str,
        kind: ResourceKind,
        name: &str,
        version: &str,
        min: &str,
    ) {
        let mut resources = self.resources.write().unwrap();
        if let Some(resource) = resources.get_mut(&(catalog.to_string(), kind, name.to_string())) {
            resource
                .min_pipelines_versions
                .insert(VersionString::from(version), VersionString::from(min));
        }
    }

    /// Make every lookup answer `InternalError(message)`
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failing.write().unwrap() = Some(message.into());
    }

    /// Get call counts for assertions
    pub fn call_counts(&self) -> CallCounts {
        self.calls.read().unwrap().clone()
    }

    fn failure<T>(&self) -> Option<Lookup<T>> {
        self.failing
            .read()
            .unwrap()
            .clone()
            .map(Lookup::InternalError)
    }

    fn lookup(&self, catalog: &str, kind: ResourceKind, name: &str) -> Option<MockResource> {
        self.resources
            .read()
            .unwrap()
            .get(&(catalog.to_string(), kind, name.to_string()))
            .cloned()
    }
}

#[async_trait]
impl CatalogService for MockCatalog {
    async fn get_resource(
        &self,
        catalog: &str,
        kind: ResourceKind,
        name: &str,
    ) -> Result<Lookup<Resource>> {
        self.calls.write().unwrap().resources += 1;
        if let Some(failure) = self.failure() {
            return Ok(failure);
        }

        let Some(resource) = self.lookup(catalog, kind, name) else {
            return Ok(Lookup::NotFound);
        };
        let Some(latest) = resource.latest() else {
            return Ok(Lookup::NotFound);
        };

        Ok(Lookup::Found(Resource {
            id: resource.id,
            name: resource.name.clone(),
            kind: Some(kind.title().to_string()),
            catalog: resource.catalog_info(),
            latest_version: resource.version(&latest),
            rating: 0.0,
            tags: Vec::new(),
        }))
    }

    async fn get_resource_version(
        &self,
        catalog: &str,
        kind: ResourceKind,
        name: &str,
        version: &VersionString,
    ) -> Result<Lookup<ResourceVersion>> {
        self.calls.write().unwrap().resource_versions += 1;
        if let Some(failure) = self.failure() {
            return Ok(failure);
        }

        Ok(match self.lookup(catalog, kind, name) {
            Some(resource) if resource.versions.contains(version) => {
                Lookup::Found(resource.version(version))
            }
            _ => Lookup::NotFound,
        })
    }

    async fn get_versions(&self, resource_id: u32) -> Result<Lookup<VersionsList>> {
        self.calls.write().unwrap().versions += 1;
        if let Some(failure) = self.failure() {
            return Ok(failure);
        }

        let resources = self.resources.read().unwrap();
        let Some(resource) = resources.values().find(|r| r.id == resource_id) else {
            return Ok(Lookup::NotFound);
        };

        Ok(Lookup::Found(VersionsList {
            latest: resource.latest().map(|v| resource.version(&v)),
            versions: resource.versions.iter().map(|v| resource.version(v)).collect(),
        }))
    }

    async fn get_manifest(
        &self,
        catalog: &str,
        kind: ResourceKind,
        name: &str,
        version: &VersionString,
    ) -> Result<Lookup<String>> {
        self.calls.write().unwrap().manifests += 1;
        if let Some(failure) = self.failure() {
            return Ok(failure);
        }

        Ok(self
            .lookup(catalog, kind, name)
            .and_then(|r| r.manifests.get(version).cloned())
            .map(Lookup::Found)
            .unwrap_or(Lookup::NotFound))
    }
}

/// A minimal manifest of the given kind, as the hub would serve it
pub fn sample_manifest(kind: ResourceKind, name: &str, version: &VersionString) -> String {
    let spec = match kind {
        ResourceKind::Task => "  steps:\n    - name: run\n      image: alpine\n      script: echo hello\n",
        ResourceKind::Pipeline => "  tasks:\n    - name: run\n      taskRef:\n        name: echo\n",
    };
    format!(
        "apiVersion: tekton.dev/v1beta1\nkind: {}\nmetadata:\n  name: {}\n  labels:\n    app.kubernetes.io/version: \"{}\"\n  annotations:\n    tekton.dev/pipelines.minVersion: \"0.12.1\"\nspec:\n{}",
        kind.title(),
        name,
        version,
        spec
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resource_and_versions() {
        let mock = MockCatalog::new();
        let id = mock.add_resource("tekton", ResourceKind::Task, "foo", &["0.1", "0.3", "0.2"]);

        let resource = mock
            .get_resource("tekton", ResourceKind::Task, "foo")
            .await
            .unwrap()
            .found("foo")
            .unwrap()
            .unwrap();
        assert_eq!(resource.id, id);
        assert_eq!(resource.latest_version.version, VersionString::from("0.3"));

        let list = mock.get_versions(id).await.unwrap().found("v").unwrap().unwrap();
        assert_eq!(list.version_set().len(), 3);
        assert_eq!(mock.call_counts().total(), 2);
    }

    #[tokio::test]
    async fn test_not_found_and_failure() {
        let mock = MockCatalog::new();
        assert_eq!(
            mock.get_resource("tekton", ResourceKind::Pipeline, "nope")
                .await
                .unwrap(),
            Lookup::NotFound
        );

        mock.fail_with("database down");
        assert_eq!(
            mock.get_versions(1).await.unwrap(),
            Lookup::InternalError("database down".to_string())
        );
    }

    #[tokio::test]
    async fn test_manifest_overrides() {
        let mock = MockCatalog::new();
        mock.add_resource("tekton", ResourceKind::Task, "foo", &["0.1"]);
        let v = VersionString::from("0.1");

        let manifest = mock
            .get_manifest("tekton", ResourceKind::Task, "foo", &v)
            .await
            .unwrap();
        assert!(matches!(manifest, Lookup::Found(ref m) if m.contains("kind: Task")));

        mock.set_manifest("tekton", ResourceKind::Task, "foo", "0.1", "custom");
        assert_eq!(
            mock.get_manifest("tekton", ResourceKind::Task, "foo", &v)
                .await
                .unwrap(),
            Lookup::Found("custom".to_string())
        );

        mock.remove_manifest("tekton", ResourceKind::Task, "foo", "0.1");
        assert_eq!(
            mock.get_manifest("tekton", ResourceKind::Task, "foo", &v)
                .await
                .unwrap(),
            Lookup::NotFound
        );
    }
}
