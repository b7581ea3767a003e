//! Error types for tekhub-kube

use tekhub_catalog::CatalogError;
use tekhub_core::CoreError;
use thiserror::Error;

/// Result type for tekhub-kube operations
pub type Result<T> = std::result::Result<T, KubeError>;

/// Errors that can occur while reading or changing cluster state
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KubeError {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    /// Kubernetes API error while doing something specific
    #[error("failed to {action}: {source}")]
    ApiContext {
        action: String,
        #[source]
        source: kube::Error,
    },

    /// Could not build a client from kubeconfig or in-cluster config
    #[error("failed to load Kubernetes config: {0}")]
    Config(String),

    /// Lifecycle, catalog-lookup and compatibility failures
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Hub transport or hub-side failure
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Manifest served by the hub is not a usable resource
    #[error("invalid manifest for {resource}: {reason}")]
    InvalidManifest { resource: String, reason: String },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl KubeError {
    /// Attach what was being attempted to a raw API error
    pub fn api(action: impl Into<String>, source: kube::Error) -> Self {
        Self::ApiContext {
            action: action.into(),
            source,
        }
    }

    /// Domain error, if this is one
    pub fn as_core(&self) -> Option<&CoreError> {
        match self {
            Self::Core(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_yaml::Error> for KubeError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for KubeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<kube::config::InferConfigError> for KubeError {
    fn from(e: kube::config::InferConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
