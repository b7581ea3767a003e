//! Standard exit codes for CLI operations
//!
//! Scripts branch on these, so each failure category keeps its own code.

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - hub, network or Kubernetes API failure
pub const ERROR: i32 = 1;

/// Usage error - invalid arguments or options (clap's own exit code)
pub const USAGE_ERROR: i32 = 2;

/// Version conflict - the operation does not fit the installed version
pub const VERSION_CONFLICT: i32 = 3;

/// State error - installed object is missing its catalog/version labels
pub const STATE_ERROR: i32 = 4;

/// Resource or version not found in the catalog
pub const NOT_FOUND: i32 = 5;

/// Cluster's Tekton Pipelines is older than the resource requires
pub const INCOMPATIBLE: i32 = 6;
