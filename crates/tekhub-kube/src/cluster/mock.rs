//! Mock cluster for testing
//!
//! Keeps Tekton objects in memory, useful for unit tests without requiring
//! a Kubernetes cluster.

use async_trait::async_trait;
use kube::api::DynamicObject;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use tekhub_core::{ResourceKind, VersionString};

use super::{ApplyResult, ClusterClient};
use crate::error::{KubeError, Result};

type ObjectKey = (String, ResourceKind, String);

/// In-memory cluster for testing
#[derive(Clone, Default)]
pub struct MockCluster {
    /// Storage: (namespace, kind, name) -> object
    objects: Arc<RwLock<HashMap<ObjectKey, DynamicObject>>>,
    controller_version: Arc<RwLock<Option<VersionString>>>,
    /// When set, writes fail with this message
    write_failure: Arc<RwLock<Option<String>>>,
    /// Track operation counts for assertions
    operations: Arc<RwLock<OperationCounts>>,
}

/// Counts of operations performed for testing assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationCounts {
    pub gets: usize,
    pub creates: usize,
    pub replaces: usize,
    pub version_checks: usize,
}

impl OperationCounts {
    pub fn writes(&self) -> usize {
        self.creates + self.replaces
    }
}

impl MockCluster {
    /// Create an empty cluster with an unknown controller version
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a Tekton Pipelines controller of the given version
    pub fn with_controller_version(version: &str) -> Self {
        let cluster = Self::new();
        cluster.set_controller_version(Some(version));
        cluster
    }

    pub fn set_controller_version(&self, version: Option<&str>) {
        *self.controller_version.write().unwrap() = version.map(VersionString::from);
    }

    /// Seed an installed object carrying `labels`
    pub fn insert(
        &self,
        namespace: &str,
        kind: ResourceKind,
        name: &str,
        labels: &[(&str, &str)],
    ) {
        let mut object = DynamicObject {
            types: Some(kube::core::TypeMeta {
                api_version: super::READ_API_VERSION.to_string(),
                kind: kind.title().to_string(),
            }),
            metadata: Default::default(),
            data: serde_json::json!({ "spec": {} }),
        };
        object.metadata.name = Some(name.to_string());
        object.metadata.namespace = Some(namespace.to_string());
        if !labels.is_empty() {
            object.metadata.labels = Some(
                labels
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            );
        }
        self.objects
            .write()
            .unwrap()
            .insert((namespace.to_string(), kind, name.to_string()), object);
    }

    /// Make every write fail
    pub fn fail_writes(&self, message: impl Into<String>) {
        *self.write_failure.write().unwrap() = Some(message.into());
    }

    /// Stored object, for assertions
    pub fn object(&self, namespace: &str, kind: ResourceKind, name: &str) -> Option<DynamicObject> {
        self.objects
            .read()
            .unwrap()
            .get(&(namespace.to_string(), kind, name.to_string()))
            .cloned()
    }

    /// Labels of a stored object, empty if it has none or does not exist
    pub fn labels(&self, namespace: &str, kind: ResourceKind, name: &str) -> BTreeMap<String, String> {
        self.object(namespace, kind, name)
            .and_then(|o| o.metadata.labels)
            .unwrap_or_default()
    }

    /// Get operation counts for assertions
    pub fn operation_counts(&self) -> OperationCounts {
        self.operations.read().unwrap().clone()
    }
}

#[async_trait]
impl ClusterClient for MockCluster {
    async fn get_labels(
        &self,
        namespace: &str,
        kind: ResourceKind,
        name: &str,
    ) -> Result<Option<BTreeMap<String, String>>> {
        self.operations.write().unwrap().gets += 1;
        Ok(self
            .object(namespace, kind, name)
            .map(|o| o.metadata.labels.unwrap_or_default()))
    }

    async fn create_or_replace(
        &self,
        namespace: &str,
        kind: ResourceKind,
        object: DynamicObject,
    ) -> Result<ApplyResult> {
        let name = object.metadata.name.clone().unwrap_or_default();
        if let Some(message) = self.write_failure.read().unwrap().clone() {
            let response = kube::core::ErrorResponse {
                status: "Failure".to_string(),
                message,
                reason: "Forbidden".to_string(),
                code: 403,
            };
            return Err(KubeError::api(
                format!("create {} {} in {}", kind, name, namespace),
                kube::Error::Api(response),
            ));
        }

        let key = (namespace.to_string(), kind, name);
        let created = self
            .objects
            .write()
            .unwrap()
            .insert(key, object)
            .is_none();

        let mut ops = self.operations.write().unwrap();
        if created {
            ops.creates += 1;
        } else {
            ops.replaces += 1;
        }
        Ok(ApplyResult { created })
    }

    async fn detect_controller_version(&self) -> Result<Option<VersionString>> {
        self.operations.write().unwrap().version_checks += 1;
        Ok(self.controller_version.read().unwrap().clone())
    }
}
