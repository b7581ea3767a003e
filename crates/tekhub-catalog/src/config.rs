//! Hub configuration management
//!
//! Stores client configuration in `~/.config/tekhub/config.yaml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tekhub_core::{DEFAULT_CATALOG, FallbackOrdering};

use crate::error::{CatalogError, Result};

/// Public Tekton Hub API
pub const DEFAULT_API_SERVER: &str = "https://api.hub.tekton.dev";

/// Hub client configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubConfig {
    /// Hub API base URL
    #[serde(default = "default_api_server")]
    pub api_server: String,

    /// Catalog used when `--from` is not given
    #[serde(default = "default_catalog")]
    pub default_catalog: String,

    /// Ordering between two non-numeric versions
    #[serde(default)]
    pub version_ordering: FallbackOrdering,

    /// HTTP request timeout
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_api_server() -> String {
    DEFAULT_API_SERVER.to_string()
}

fn default_catalog() -> String {
    DEFAULT_CATALOG.to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            api_server: default_api_server(),
            default_catalog: default_catalog(),
            version_ordering: FallbackOrdering::default(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl HubConfig {
    /// Load configuration from default location
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default configuration path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| CatalogError::InvalidConfig {
            message: "Could not determine config directory".to_string(),
        })?;
        Ok(config_dir.join("tekhub").join("config.yaml"))
    }

    /// Override the API server, validating the URL
    pub fn with_api_server(mut self, api_server: impl Into<String>) -> Result<Self> {
        self.api_server = api_server.into();
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api_server).map_err(|e| CatalogError::InvalidApiUrl {
            url: self.api_server.clone(),
            reason: e.to_string(),
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(CatalogError::InvalidApiUrl {
                url: self.api_server.clone(),
                reason: "URL must start with http:// or https://".to_string(),
            });
        }
        if self.default_catalog.trim().is_empty() {
            return Err(CatalogError::InvalidConfig {
                message: "defaultCatalog must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
