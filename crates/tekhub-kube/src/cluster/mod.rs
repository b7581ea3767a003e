//! Cluster access for Tekton resources
//!
//! - [`KubeCluster`]: the real API server, via `kube`
//! - [`MockCluster`]: in memory, for tests
//!
//! The engine only ever needs three things from a cluster: the labels of one
//! Task or Pipeline, a create-or-replace write, and the version of the Tekton
//! Pipelines controller.

mod kube;
mod mock;

pub use self::kube::KubeCluster;
pub use mock::{MockCluster, OperationCounts};

use ::kube::api::DynamicObject;
use ::kube::core::{GroupVersionKind, TypeMeta};
use ::kube::discovery::ApiResource;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tekhub_core::{ResourceKind, VersionString};

use crate::error::Result;

/// API group of Tekton resources
pub const TEKTON_GROUP: &str = "tekton.dev";

/// Version used to read installed objects
pub const READ_API_VERSION: &str = "tekton.dev/v1beta1";

/// Field manager recorded on writes
pub const FIELD_MANAGER: &str = "tekhub";

/// Outcome of a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyResult {
    /// Whether it was created (true) or replaced (false)
    pub created: bool,
}

/// Cluster operations the install engine depends on
///
/// Implementations must be Send + Sync for use across async tasks.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Labels of an installed Task or Pipeline
    ///
    /// `Ok(None)` when the object does not exist. An object without labels
    /// answers `Ok(Some(empty))`.
    async fn get_labels(
        &self,
        namespace: &str,
        kind: ResourceKind,
        name: &str,
    ) -> Result<Option<BTreeMap<String, String>>>;

    /// Create the object, or replace it if one with the same name exists
    async fn create_or_replace(
        &self,
        namespace: &str,
        kind: ResourceKind,
        object: DynamicObject,
    ) -> Result<ApplyResult>;

    /// Version of the Tekton Pipelines controller, `None` if it cannot be told
    async fn detect_controller_version(&self) -> Result<Option<VersionString>>;
}

/// Split `group/version` into a GVK
pub(crate) fn gvk_from_type_meta(tm: &TypeMeta) -> GroupVersionKind {
    let (group, version) = match tm.api_version.rsplit_once('/') {
        Some((g, v)) => (g.to_string(), v.to_string()),
        None => (String::new(), tm.api_version.clone()),
    };

    GroupVersionKind {
        group,
        version,
        kind: tm.kind.clone(),
    }
}

/// API resource for a Tekton kind at a given `apiVersion`
pub fn tekton_api_resource(kind: ResourceKind, api_version: &str) -> ApiResource {
    let gvk = gvk_from_type_meta(&TypeMeta {
        api_version: api_version.to_string(),
        kind: kind.title().to_string(),
    });
    ApiResource::from_gvk_with_plural(&gvk, kind.plural())
}
