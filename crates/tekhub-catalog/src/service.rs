//! Catalog service trait
//!
//! The single seam between the install engine and the hub, implemented over
//! HTTP by [`HttpCatalog`](crate::HttpCatalog) and in memory by
//! [`MockCatalog`](crate::MockCatalog).

use async_trait::async_trait;
use tekhub_core::{ResourceKind, VersionString};

use crate::error::Result;
use crate::types::{Lookup, Resource, ResourceVersion, VersionsList};

/// Read-only access to a resource catalog
///
/// `Err` is reserved for transport failures; a missing resource is
/// [`Lookup::NotFound`] and a hub-side failure is [`Lookup::InternalError`].
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Resource with its latest version
    async fn get_resource(
        &self,
        catalog: &str,
        kind: ResourceKind,
        name: &str,
    ) -> Result<Lookup<Resource>>;

    /// Metadata of one version of a resource
    async fn get_resource_version(
        &self,
        catalog: &str,
        kind: ResourceKind,
        name: &str,
        version: &VersionString,
    ) -> Result<Lookup<ResourceVersion>>;

    /// All versions of a resource, by resource id
    async fn get_versions(&self, resource_id: u32) -> Result<Lookup<VersionsList>>;

    /// Raw manifest text (YAML or JSON) of one version
    async fn get_manifest(
        &self,
        catalog: &str,
        kind: ResourceKind,
        name: &str,
        version: &VersionString,
    ) -> Result<Lookup<String>>;
}
