//! Core error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Resource or version absent upstream
    #[error("{message}")]
    NotFoundInCatalog { message: String },

    /// Installed object exists but is missing the labels needed to act on it
    #[error("{message}")]
    StateError { message: String },

    /// The requested operation does not fit the installed version
    #[error("{message}")]
    VersionConflict { message: String },

    #[error("{message}")]
    IncompatiblePipelinesVersion { message: String },

    #[error("No versions available for {name}")]
    EmptySet { name: String },

    #[error("Unknown resource kind: {kind}")]
    UnknownKind { kind: String },

    #[error("Unknown version ordering: {value}")]
    UnknownOrdering { value: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
