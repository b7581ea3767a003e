//! HTTP catalog implementation
//!
//! Talks to the Tekton Hub REST API (`/v1/...`)

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tekhub_core::{ResourceKind, VersionString};
use url::Url;

use crate::config::HubConfig;
use crate::error::{CatalogError, Result};
use crate::service::CatalogService;
use crate::types::{Envelope, Lookup, Resource, ResourceVersion, VersionsList};

/// Hub API client
pub struct HttpCatalog {
    /// API base URL
    base: Url,
    client: reqwest::Client,
    timeout_seconds: u64,
}

impl HttpCatalog {
    /// Create a new client from configuration
    pub fn new(config: &HubConfig) -> Result<Self> {
        let base = Url::parse(&config.api_server).map_err(|e| CatalogError::InvalidApiUrl {
            url: config.api_server.clone(),
            reason: e.to_string(),
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("tekhub/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::NetworkError {
                message: e.to_string(),
            })?;

        Ok(Self {
            base,
            client,
            timeout_seconds: config.timeout_seconds,
        })
    }

    /// Get the API base URL
    pub fn url(&self) -> &str {
        self.base.as_str()
    }

    /// Build an endpoint URL from escaped path segments
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::InvalidApiUrl {
                url: self.base.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .push("v1")
            .extend(segments);
        Ok(url)
    }

    fn request_error(&self, e: reqwest::Error) -> CatalogError {
        if e.is_timeout() {
            CatalogError::Timeout {
                seconds: self.timeout_seconds,
            }
        } else {
            CatalogError::from(e)
        }
    }

    /// GET a URL, sorting the status into a [`Lookup`]
    async fn send(&self, url: Url) -> Result<Lookup<reqwest::Response>> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(Lookup::Found(response));
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(Lookup::NotFound);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| status.to_string());
        if status.is_server_error() {
            tracing::warn!("hub returned {} for {}: {}", status, url, message);
            Ok(Lookup::InternalError(message))
        } else {
            Err(CatalogError::HttpError {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<Lookup<T>> {
        match self.send(url).await? {
            Lookup::Found(response) => {
                let envelope: Envelope<T> =
                    response
                        .json()
                        .await
                        .map_err(|e| CatalogError::InvalidResponse {
                            what: what.to_string(),
                            message: e.to_string(),
                        })?;
                Ok(Lookup::Found(envelope.data))
            }
            Lookup::NotFound => Ok(Lookup::NotFound),
            Lookup::InternalError(message) => Ok(Lookup::InternalError(message)),
        }
    }
}

/// Pull `message` out of a hub error body
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

#[async_trait]
impl CatalogService for HttpCatalog {
    async fn get_resource(
        &self,
        catalog: &str,
        kind: ResourceKind,
        name: &str,
    ) -> Result<Lookup<Resource>> {
        let url = self.endpoint(&["resource", catalog, kind.as_str(), name])?;
        self.get_json(url, &format!("{} {}", kind, name)).await
    }

    async fn get_resource_version(
        &self,
        catalog: &str,
        kind: ResourceKind,
        name: &str,
        version: &VersionString,
    ) -> Result<Lookup<ResourceVersion>> {
        let url = self.endpoint(&["resource", catalog, kind.as_str(), name, version.as_str()])?;
        self.get_json(url, &format!("{} {}({})", kind, name, version))
            .await
    }

    async fn get_versions(&self, resource_id: u32) -> Result<Lookup<VersionsList>> {
        let id = resource_id.to_string();
        let url = self.endpoint(&["resource", &id, "versions"])?;
        self.get_json(url, &format!("versions of resource {}", resource_id))
            .await
    }

    async fn get_manifest(
        &self,
        catalog: &str,
        kind: ResourceKind,
        name: &str,
        version: &VersionString,
    ) -> Result<Lookup<String>> {
        let url = self.endpoint(&[
            "resource",
            catalog,
            kind.as_str(),
            name,
            version.as_str(),
            "yaml",
        ])?;
        match self.send(url).await? {
            Lookup::Found(response) => {
                let text = response.text().await.map_err(|e| self.request_error(e))?;
                Ok(Lookup::Found(text))
            }
            Lookup::NotFound => Ok(Lookup::NotFound),
            Lookup::InternalError(message) => Ok(Lookup::InternalError(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn catalog_for(server: &MockServer) -> HttpCatalog {
        let config = HubConfig::default().with_api_server(server.uri()).unwrap();
        HttpCatalog::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_escapes_segments() {
        let config = HubConfig::default()
            .with_api_server("https://hub.example/api/")
            .unwrap();
        let catalog = HttpCatalog::new(&config).unwrap();
        let url = catalog.endpoint(&["resource", "tek ton", "task", "foo"]).unwrap();
        assert_eq!(url.as_str(), "https://hub.example/api/v1/resource/tek%20ton/task/foo");
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(r#"{"name":"not-found","message":"resource not found"}"#),
            Some("resource not found".to_string())
        );
        assert_eq!(error_message("plain text"), None);
    }

    #[tokio::test]
    async fn test_get_resource_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/resource/tekton/task/foo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "id": 11,
                    "name": "foo",
                    "kind": "Task",
                    "catalog": {"id": 1, "name": "tekton", "type": "official"},
                    "latestVersion": {"id": 3, "version": "0.3", "minPipelinesVersion": "0.17.0"}
                }
            })))
            .mount(&server)
            .await;

        let catalog = catalog_for(&server);
        let lookup = catalog
            .get_resource("tekton", ResourceKind::Task, "foo")
            .await
            .unwrap();
        let resource = lookup.found("task foo").unwrap().unwrap();
        assert_eq!(resource.id, 11);
        assert_eq!(resource.latest_version.version, VersionString::from("0.3"));
    }

    #[tokio::test]
    async fn test_get_resource_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/resource/tekton/task/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "name": "not-found",
                "message": "resource not found"
            })))
            .mount(&server)
            .await;

        let lookup = catalog_for(&server)
            .get_resource("tekton", ResourceKind::Task, "missing")
            .await
            .unwrap();
        assert_eq!(lookup, Lookup::NotFound);
    }

    #[tokio::test]
    async fn test_internal_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/resource/11/versions"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "name": "internal-error",
                "message": "failed to fetch versions"
            })))
            .mount(&server)
            .await;

        let lookup = catalog_for(&server).get_versions(11).await.unwrap();
        assert_eq!(
            lookup,
            Lookup::InternalError("failed to fetch versions".to_string())
        );
        let err = lookup.found("versions of task foo").unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"Hub internal error while fetching versions of task foo: failed to fetch versions");
    }

    #[tokio::test]
    async fn test_get_versions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/resource/11/versions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "latest": {"id": 3, "version": "0.3"},
                    "versions": [
                        {"id": 1, "version": "0.1"},
                        {"id": 2, "version": "0.2"},
                        {"id": 3, "version": "0.3"}
                    ]
                }
            })))
            .mount(&server)
            .await;

        let list = catalog_for(&server)
            .get_versions(11)
            .await
            .unwrap()
            .found("versions")
            .unwrap()
            .unwrap();
        assert_eq!(list.version_set().len(), 3);
    }

    #[tokio::test]
    async fn test_get_manifest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/resource/tekton/task/foo/0.3/yaml"))
            .respond_with(ResponseTemplate::new(200).set_body_string("kind: Task\n"))
            .mount(&server)
            .await;

        let text = catalog_for(&server)
            .get_manifest("tekton", ResourceKind::Task, "foo", &VersionString::from("0.3"))
            .await
            .unwrap();
        assert_eq!(text, Lookup::Found("kind: Task\n".to_string()));
    }

    #[tokio::test]
    async fn test_client_error_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/resource/tekton/task/foo/0.3"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .mount(&server)
            .await;

        let err = catalog_for(&server)
            .get_resource_version("tekton", ResourceKind::Task, "foo", &VersionString::from("0.3"))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::HttpError { status: 400, .. }));
        insta::assert_snapshot!(err.to_string(), @"HTTP error: 400 - 400 Bad Request");
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/resource/tekton/task/foo"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = catalog_for(&server)
            .get_resource("tekton", ResourceKind::Task, "foo")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidResponse { .. }));
    }
}
