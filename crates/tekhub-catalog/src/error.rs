//! Error types for catalog operations

use thiserror::Error;

/// Catalog operation errors
#[derive(Debug, Error)]
pub enum CatalogError {
    // ============ Configuration Errors ============
    #[error("Invalid hub API URL: {url} - {reason}")]
    InvalidApiUrl { url: String, reason: String },

    #[error("Invalid hub configuration: {message}")]
    InvalidConfig { message: String },

    // ============ Network Errors ============
    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },

    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Request timeout after {seconds}s")]
    Timeout { seconds: u64 },

    /// Hub answered with a 5xx
    #[error("Hub internal error while fetching {what}: {message}")]
    InternalError { what: String, message: String },

    // ============ Response Errors ============
    #[error("Invalid response from hub for {what}: {message}")]
    InvalidResponse { what: String, message: String },

    // ============ IO Errors ============
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CatalogError::Timeout { seconds: 30 }
        } else if e.is_connect() {
            CatalogError::NetworkError {
                message: format!("Connection failed: {}", e),
            }
        } else if let Some(status) = e.status() {
            CatalogError::HttpError {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            CatalogError::NetworkError {
                message: e.to_string(),
            }
        }
    }
}

impl From<serde_yaml::Error> for CatalogError {
    fn from(e: serde_yaml::Error) -> Self {
        CatalogError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Serialization(e.to_string())
    }
}

impl From<url::ParseError> for CatalogError {
    fn from(e: url::ParseError) -> Self {
        CatalogError::InvalidApiUrl {
            url: String::new(),
            reason: e.to_string(),
        }
    }
}
