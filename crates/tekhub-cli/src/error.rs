//! CLI error types with exit code handling
//!
//! Every failure prints as a single line; the variant picks the exit code.

use miette::Diagnostic;
use tekhub_catalog::CatalogError;
use tekhub_core::CoreError;
use tekhub_kube::KubeError;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum CliError {
    /// Requested operation does not fit the installed version
    #[error("{message}")]
    #[diagnostic(code(tekhub::cli::version_conflict))]
    VersionConflict { message: String },

    /// Installed object lacks the labels needed to act on it
    #[error("{message}")]
    #[diagnostic(code(tekhub::cli::state))]
    State { message: String },

    /// Resource or version absent from the catalog
    #[error("{message}")]
    #[diagnostic(code(tekhub::cli::not_found))]
    NotFound { message: String },

    /// Cluster controller too old for the resource
    #[error("{message}")]
    #[diagnostic(code(tekhub::cli::incompatible))]
    Incompatible { message: String },

    /// Bad configuration file or flag value
    #[error("{message}")]
    #[diagnostic(code(tekhub::cli::config))]
    Config { message: String },

    /// Hub, network or Kubernetes API failure
    #[error("{message}")]
    #[diagnostic(code(tekhub::cli::upstream))]
    Upstream { message: String },

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(tekhub::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::VersionConflict { .. } => exit_codes::VERSION_CONFLICT,
            CliError::State { .. } => exit_codes::STATE_ERROR,
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::Incompatible { .. } => exit_codes::INCOMPATIBLE,
            CliError::Config { .. } => exit_codes::USAGE_ERROR,
            CliError::Upstream { .. } => exit_codes::ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::VersionConflict { .. } => Self::VersionConflict { message },
            CoreError::StateError { .. } => Self::State { message },
            CoreError::NotFoundInCatalog { .. } | CoreError::EmptySet { .. } => {
                Self::NotFound { message }
            }
            CoreError::IncompatiblePipelinesVersion { .. } => Self::Incompatible { message },
            CoreError::UnknownKind { .. } | CoreError::UnknownOrdering { .. } => {
                Self::Config { message }
            }
        }
    }
}

impl From<CatalogError> for CliError {
    fn from(err: CatalogError) -> Self {
        let message = err.to_string();
        match err {
            CatalogError::InvalidApiUrl { .. }
            | CatalogError::InvalidConfig { .. }
            | CatalogError::Io(_)
            | CatalogError::Serialization(_) => Self::Config { message },
            _ => Self::Upstream { message },
        }
    }
}

impl From<KubeError> for CliError {
    fn from(err: KubeError) -> Self {
        match err {
            KubeError::Core(core) => core.into(),
            KubeError::Catalog(catalog) => catalog.into(),
            other => Self::Upstream {
                message: other.to_string(),
            },
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
