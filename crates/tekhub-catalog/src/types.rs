//! Hub API response types
//!
//! Every hub endpoint wraps its payload in `{ "data": ... }`. Lookups return
//! a [`Lookup`] instead of an error for the two outcomes the engine handles
//! itself: the resource is absent, or the hub failed internally.

use serde::{Deserialize, Serialize};
use tekhub_core::VersionString;

use crate::error::{CatalogError, Result};

/// Outcome of a single hub lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    /// HTTP 404
    NotFound,
    /// HTTP 5xx, with the hub's message
    InternalError(String),
}

impl<T> Lookup<T> {
    /// `Some` if found, `None` if not found, an error on hub failure
    pub fn found(self, what: &str) -> Result<Option<T>> {
        match self {
            Self::Found(value) => Ok(Some(value)),
            Self::NotFound => Ok(None),
            Self::InternalError(message) => Err(CatalogError::InternalError {
                what: what.to_string(),
                message,
            }),
        }
    }
}

/// `{ "data": ... }` wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Catalog a resource belongs to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogInfo {
    #[serde(default)]
    pub id: u32,

    pub name: String,

    /// `official` or `community`
    #[serde(rename = "type", default)]
    pub catalog_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub id: u32,
    pub name: String,
}

/// One published version of a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceVersion {
    #[serde(default)]
    pub id: u32,

    pub version: VersionString,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Minimum Tekton Pipelines version this version works with
    #[serde(default)]
    pub min_pipelines_version: Option<VersionString>,

    #[serde(rename = "rawURL", default)]
    pub raw_url: Option<String>,

    #[serde(rename = "webURL", default)]
    pub web_url: Option<String>,

    /// Owning resource (only on single-version lookups)
    #[serde(default)]
    pub resource: Option<ResourceSummary>,
}

/// Resource fields embedded in a version lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSummary {
    #[serde(default)]
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub catalog: Option<CatalogInfo>,
}

/// A resource with its latest version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: u32,

    pub name: String,

    #[serde(default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub catalog: CatalogInfo,

    pub latest_version: ResourceVersion,

    #[serde(default)]
    pub rating: f64,

    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// All versions of a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionsList {
    #[serde(default)]
    pub latest: Option<ResourceVersion>,

    #[serde(default)]
    pub versions: Vec<ResourceVersion>,
}

impl VersionsList {
    /// Version strings in catalog order
    pub fn version_set(&self) -> Vec<VersionString> {
        self.versions.iter().map(|v| v.version.clone()).collect()
    }
}
