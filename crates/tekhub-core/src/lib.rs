//! Tekhub Core - version resolution and install lifecycle decisions
//!
//! This crate holds the decision logic behind `tekhub install`, `upgrade`,
//! `downgrade` and `reinstall`. It performs no I/O:
//! - `VersionComparator`: orders catalog version strings and picks the latest
//! - `InstalledRecord`: state recovered from provenance labels on a live object
//! - `LifecycleDecision`: allows or denies an operation with an exact message
//! - `CompatibilityChecker`: gates on the cluster's Tekton Pipelines version

pub mod compat;
pub mod error;
pub mod installed;
pub mod lifecycle;
pub mod resource;
pub mod version;

pub use compat::{Compatibility, CompatibilityChecker};
pub use error::{CoreError, Result};
pub use installed::{
    CATALOG_LABEL, InstalledRecord, MANAGED_BY_LABEL, MANAGED_BY_VALUE, VERSION_LABEL,
    provenance_labels,
};
pub use lifecycle::{Decision, Denial, DenyReason, LifecycleDecision, Resolution};
pub use resource::{DEFAULT_CATALOG, Operation, OperationRequest, ResourceKind};
pub use version::{FallbackOrdering, VersionComparator, VersionString};
