//! Installed state recovered from provenance labels on a live object

use std::collections::BTreeMap;

use crate::version::VersionString;

/// Label holding the catalog a resource was installed from
pub const CATALOG_LABEL: &str = "hub.tekton.dev/catalog";

/// Label holding the installed resource version
pub const VERSION_LABEL: &str = "app.kubernetes.io/version";

/// Label identifying the installer
pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";

/// Value of [`MANAGED_BY_LABEL`] on objects we write
pub const MANAGED_BY_VALUE: &str = "tekhub";

/// What a prior install left behind on the cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstalledRecord {
    /// No object with this name
    NotInstalled,

    /// Object present without catalog or version label
    MissingBoth,

    /// Object present with a catalog label but no version label
    MissingVersion { catalog: String },

    /// Object carries a version label; a missing catalog label leaves the
    /// catalog to the configured default
    Present {
        catalog: Option<String>,
        version: VersionString,
    },
}

impl InstalledRecord {
    /// Read the record from an object's labels
    ///
    /// `None` means the object does not exist. Empty label values count as
    /// absent. Version values are passed through unvalidated.
    pub fn from_labels(labels: Option<&BTreeMap<String, String>>) -> Self {
        let Some(labels) = labels else {
            return Self::NotInstalled;
        };

        let get = |key: &str| {
            labels
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        match (get(CATALOG_LABEL), get(VERSION_LABEL)) {
            (None, None) => Self::MissingBoth,
            (Some(catalog), None) => Self::MissingVersion { catalog },
            (catalog, Some(version)) => {
                if catalog.is_none() {
                    tracing::warn!("object has a version label but no catalog label, using the default catalog");
                }
                Self::Present {
                    catalog,
                    version: VersionString::new(version),
                }
            }
        }
    }

    pub fn exists(&self) -> bool {
        !matches!(self, Self::NotInstalled)
    }

    /// Catalog recorded on the object, if any
    pub fn catalog(&self) -> Option<&str> {
        match self {
            Self::MissingVersion { catalog } => Some(catalog),
            Self::Present { catalog, .. } => catalog.as_deref(),
            _ => None,
        }
    }

    /// Version recorded on the object, if any
    pub fn version(&self) -> Option<&VersionString> {
        match self {
            Self::Present { version, .. } => Some(version),
            _ => None,
        }
    }
}

/// Provenance labels to stamp on an applied object
pub fn provenance_labels(catalog: &str, version: &VersionString) -> BTreeMap<String, String> {
    BTreeMap::from([
        (CATALOG_LABEL.to_string(), catalog.to_string()),
        (VERSION_LABEL.to_string(), version.to_string()),
        (MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string()),
    ])
}
