//! Tekhub Kube - cluster side of the install engine
//!
//! This crate provides:
//! - **Cluster clients**: read installed Tekton resources, create or replace
//!   them, and detect the Tekton Pipelines controller version
//! - **Manifest applier**: fetch, validate and label hub manifests
//! - **Installer**: the install / upgrade / downgrade / reinstall engine
//!
//! ```no_run
//! use tekhub_catalog::{HttpCatalog, HubConfig};
//! use tekhub_core::{Operation, OperationRequest, ResourceKind};
//! use tekhub_kube::{Installer, KubeCluster};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = HttpCatalog::new(&HubConfig::default())?;
//! let (cluster, namespace) = KubeCluster::connect().await?;
//! let request = OperationRequest::new(Operation::Install, ResourceKind::Task, "git-clone", namespace)
//!     .with_version("0.9");
//! let outcome = Installer::new(catalog, cluster).run(&request).await?;
//! println!("{}", outcome);
//! # Ok(())
//! # }
//! ```

pub mod applier;
pub mod cluster;
pub mod error;
pub mod installer;

pub use applier::{ApplyTarget, MIN_VERSION_ANNOTATION, ManifestApplier, PreparedManifest};
pub use cluster::{
    ApplyResult, ClusterClient, KubeCluster, MockCluster, OperationCounts, tekton_api_resource,
};
pub use error::{KubeError, Result};
pub use installer::{InstallOutcome, Installer};
