//! Resource kinds, lifecycle operations and operation requests

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};
use crate::version::VersionString;

/// Catalog used when a request does not name one
pub const DEFAULT_CATALOG: &str = "tekton";

/// Kind of a cataloged resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Task,
    Pipeline,
}

impl ResourceKind {
    /// Lower-case name, as used by the hub API and in messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Pipeline => "pipeline",
        }
    }

    /// Kubernetes `kind` of the installed object
    pub fn title(&self) -> &'static str {
        match self {
            Self::Task => "Task",
            Self::Pipeline => "Pipeline",
        }
    }

    /// Plural resource name in the `tekton.dev` API group
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Task => "tasks",
            Self::Pipeline => "pipelines",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "task" | "tasks" => Ok(Self::Task),
            "pipeline" | "pipelines" => Ok(Self::Pipeline),
            _ => Err(CoreError::UnknownKind {
                kind: s.to_string(),
            }),
        }
    }
}

/// Lifecycle operation requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Install,
    Upgrade,
    Downgrade,
    Reinstall,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Upgrade => "upgrade",
            Self::Downgrade => "downgrade",
            Self::Reinstall => "reinstall",
        }
    }

    /// Past tense used in success messages
    pub fn past_tense(&self) -> &'static str {
        match self {
            Self::Install => "installed",
            Self::Upgrade => "upgraded",
            Self::Downgrade => "downgraded",
            Self::Reinstall => "reinstalled",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single install/upgrade/downgrade/reinstall request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRequest {
    pub kind: ResourceKind,
    pub name: String,
    /// Namespace the object lives in (only used for messages here)
    pub namespace: String,
    /// Explicit catalog; `None` falls back to installed state or the default catalog
    pub catalog: Option<String>,
    /// Explicit version; `None` means latest available
    pub version: Option<VersionString>,
    pub operation: Operation,
}

impl OperationRequest {
    pub fn new(
        operation: Operation,
        kind: ResourceKind,
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            namespace: namespace.into(),
            catalog: None,
            version: None,
            operation,
        }
    }

    pub fn with_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<VersionString>) -> Self {
        self.version = Some(version.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str() {
        assert_eq!("task".parse::<ResourceKind>().unwrap(), ResourceKind::Task);
        assert_eq!("Pipelines".parse::<ResourceKind>().unwrap(), ResourceKind::Pipeline);
        assert!(matches!(
            "stepaction".parse::<ResourceKind>(),
            Err(CoreError::UnknownKind { .. })
        ));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ResourceKind::Task.title(), "Task");
        assert_eq!(ResourceKind::Pipeline.plural(), "pipelines");
        assert_eq!(ResourceKind::Pipeline.to_string(), "pipeline");
    }

    #[test]
    fn test_request_builder() {
        let req = OperationRequest::new(Operation::Install, ResourceKind::Task, "foo", "hub");
        assert!(req.catalog.is_none());
        assert!(req.version.is_none());

        let req = req.with_catalog("openshift").with_version("0.3");
        assert_eq!(req.catalog.as_deref(), Some("openshift"));
        assert_eq!(req.version, Some(VersionString::from("0.3")));
    }

    #[test]
    fn test_operation_past_tense() {
        assert_eq!(Operation::Downgrade.past_tense(), "downgraded");
        assert_eq!(Operation::Reinstall.to_string(), "reinstall");
    }
}
