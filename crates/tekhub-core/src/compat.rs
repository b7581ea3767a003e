//! Controller version compatibility gate

use std::cmp::Ordering;

use crate::error::{CoreError, Result};
use crate::resource::ResourceKind;
use crate::version::{VersionComparator, VersionString};

/// Result of a passing compatibility check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compatibility {
    /// Cluster meets the minimum, or the resource declares none
    Compatible,

    /// Cluster version unknown; proceed but tell the user
    Unverified { warning: String },
}

impl Compatibility {
    pub fn warning(&self) -> Option<&str> {
        match self {
            Self::Compatible => None,
            Self::Unverified { warning } => Some(warning),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompatibilityChecker {
    comparator: VersionComparator,
}

impl CompatibilityChecker {
    pub fn new(comparator: VersionComparator) -> Self {
        Self { comparator }
    }

    /// Check a resource's minimum controller version against the cluster's
    ///
    /// Fails with [`CoreError::IncompatiblePipelinesVersion`] only when both
    /// versions are known and the cluster is older.
    pub fn check(
        &self,
        kind: ResourceKind,
        name: &str,
        version: &VersionString,
        min_version: Option<&VersionString>,
        cluster_version: Option<&VersionString>,
    ) -> Result<Compatibility> {
        let Some(min_version) = min_version else {
            return Ok(Compatibility::Compatible);
        };

        let Some(cluster_version) = cluster_version else {
            let warning = format!(
                "Tekton Pipelines version could not be detected; {} {}({}) requires min version {}",
                kind,
                name,
                version,
                with_v(min_version)
            );
            tracing::warn!("{}", warning);
            return Ok(Compatibility::Unverified { warning });
        };

        if self.comparator.compare(cluster_version, min_version) == Ordering::Less {
            return Err(CoreError::IncompatiblePipelinesVersion {
                message: format!(
                    "{} {}({}) requires Tekton Pipelines min version {} but found {}",
                    kind.title(),
                    name,
                    version,
                    with_v(min_version),
                    with_v(cluster_version)
                ),
            });
        }

        Ok(Compatibility::Compatible)
    }
}

fn with_v(version: &VersionString) -> String {
    let raw = version.as_str();
    if raw.starts_with('v') || raw.starts_with('V') {
        raw.to_string()
    } else {
        format!("v{}", raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> VersionString {
        VersionString::from(s)
    }

    fn check(min: Option<&str>, cluster: Option<&str>) -> Result<Compatibility> {
        let min = min.map(v);
        let cluster = cluster.map(v);
        CompatibilityChecker::default().check(
            ResourceKind::Task,
            "foo",
            &v("0.3"),
            min.as_ref(),
            cluster.as_ref(),
        )
    }

    #[test]
    fn test_no_minimum() {
        assert_eq!(check(None, None).unwrap(), Compatibility::Compatible);
        assert_eq!(check(None, Some("0.1")).unwrap(), Compatibility::Compatible);
    }

    #[test]
    fn test_cluster_newer_or_equal() {
        assert_eq!(check(Some("0.17.0"), Some("v0.50.1")).unwrap(), Compatibility::Compatible);
        assert_eq!(check(Some("0.17"), Some("v0.17.0")).unwrap(), Compatibility::Compatible);
    }

    #[test]
    fn test_cluster_older() {
        let err = check(Some("0.17.0"), Some("v0.12.1")).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"Task foo(0.3) requires Tekton Pipelines min version v0.17.0 but found v0.12.1");
    }

    #[test]
    fn test_cluster_unknown_warns() {
        let result = check(Some("0.17.0"), None).unwrap();
        assert!(result.warning().is_some_and(|w| w.contains("v0.17.0")));
    }
}
