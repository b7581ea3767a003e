//! Configuration shared by every command
//!
//! Precedence: command-line flags, then environment (through clap), then the
//! config file, then built-in defaults.

use std::path::Path;
use tekhub_catalog::{HttpCatalog, HubConfig};
use tekhub_core::{FallbackOrdering, LifecycleDecision, VersionComparator};
use tekhub_kube::KubeCluster;

use crate::error::Result;

pub struct Context {
    config: HubConfig,
    namespace: Option<String>,
}

impl Context {
    pub fn load(
        config_path: Option<&Path>,
        api_server: Option<&str>,
        namespace: Option<String>,
    ) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => HubConfig::load_from(path)?,
            None => HubConfig::load()?,
        };
        if let Some(api_server) = api_server {
            config = config.with_api_server(api_server)?;
        }
        tracing::debug!(api_server = %config.api_server, "loaded configuration");

        Ok(Self {
            config,
            namespace: namespace.filter(|ns| !ns.is_empty()),
        })
    }

    /// Override the configured ordering of non-numeric versions
    pub fn with_version_ordering(mut self, ordering: Option<FallbackOrdering>) -> Self {
        if let Some(ordering) = ordering {
            self.config.version_ordering = ordering;
        }
        self
    }

    #[cfg(test)]
    fn from_config(config: HubConfig) -> Self {
        Self {
            config,
            namespace: None,
        }
    }

    pub fn comparator(&self) -> VersionComparator {
        VersionComparator::new(self.config.version_ordering)
    }

    pub fn lifecycle(&self) -> LifecycleDecision {
        LifecycleDecision::new(self.comparator()).with_default_catalog(&self.config.default_catalog)
    }

    /// `--from`, or the configured default catalog
    pub fn catalog_name<'a>(&'a self, from: Option<&'a str>) -> &'a str {
        from.unwrap_or(&self.config.default_catalog)
    }

    pub fn catalog(&self) -> Result<HttpCatalog> {
        Ok(HttpCatalog::new(&self.config)?)
    }

    /// Connect to the cluster and settle the target namespace
    pub async fn cluster(&self) -> Result<(KubeCluster, String)> {
        let (cluster, kubeconfig_namespace) = KubeCluster::connect().await?;
        let namespace = self.namespace.clone().unwrap_or(kubeconfig_namespace);
        tracing::debug!(%namespace, "connected to cluster");
        Ok((cluster, namespace))
    }
}
