//! Tekhub Catalog - client for the Tekton Hub resource catalog
//!
//! This crate provides everything tekhub needs from the hub:
//!
//! - **Resources**: latest metadata of a task or pipeline in a catalog
//! - **Versions**: the full version set of a resource
//! - **Manifests**: raw YAML of a specific version
//!
//! Lookups return [`Lookup`], separating "not in the catalog" and "hub
//! failed" from transport errors.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tekhub_catalog::{CatalogService, HttpCatalog, HubConfig};
//! use tekhub_core::ResourceKind;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HubConfig::load()?;
//! let catalog = HttpCatalog::new(&config)?;
//!
//! if let Some(resource) = catalog
//!     .get_resource("tekton", ResourceKind::Task, "git-clone")
//!     .await?
//!     .found("task git-clone")?
//! {
//!     println!("latest: {}", resource.latest_version.version);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod mock;
pub mod service;
pub mod types;

// Re-exports for convenience
pub use config::{DEFAULT_API_SERVER, HubConfig};
pub use error::{CatalogError, Result};
pub use http::HttpCatalog;
pub use mock::{CallCounts, MockCatalog, sample_manifest};
pub use service::CatalogService;
pub use types::{CatalogInfo, Lookup, Resource, ResourceVersion, VersionsList};
