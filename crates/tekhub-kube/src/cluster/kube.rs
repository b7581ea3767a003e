//! Cluster client backed by the Kubernetes API server

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::Client;
use kube::api::{Api, DynamicObject, PostParams};
use std::collections::BTreeMap;
use tekhub_core::{ResourceKind, VersionString};

use super::{ApplyResult, ClusterClient, FIELD_MANAGER, READ_API_VERSION, tekton_api_resource};
use crate::error::{KubeError, Result};

/// Namespaces the Tekton Pipelines controller is commonly installed in
const CONTROLLER_NAMESPACES: &[&str] = &["tekton-pipelines", "openshift-pipelines"];

/// ConfigMap written by Tekton Pipelines with its release version
const PIPELINES_INFO: &str = "pipelines-info";

const CONTROLLER_DEPLOYMENT: &str = "tekton-pipelines-controller";

/// Deployment labels carrying the controller version, in lookup order
const CONTROLLER_VERSION_LABELS: &[&str] =
    &["app.kubernetes.io/version", "pipeline.tekton.dev/release"];

/// Tekton resources on a live cluster
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
    /// `apiVersion` used for reads
    read_api_version: String,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            read_api_version: READ_API_VERSION.to_string(),
        }
    }

    /// Connect using kubeconfig or in-cluster config
    ///
    /// Returns the cluster and the namespace the config selects.
    pub async fn connect() -> Result<(Self, String)> {
        let config = kube::Config::infer().await?;
        let namespace = config.default_namespace.clone();
        let client = Client::try_from(config)?;
        Ok((Self::new(client), namespace))
    }

    /// Read installed objects at another `apiVersion`
    pub fn with_read_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.read_api_version = api_version.into();
        self
    }

    fn api(&self, namespace: &str, kind: ResourceKind, api_version: &str) -> Api<DynamicObject> {
        let ar = tekton_api_resource(kind, api_version);
        Api::namespaced_with(self.client.clone(), namespace, &ar)
    }

    async fn version_from_configmap(&self, namespace: &str) -> Result<Option<VersionString>> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        let cm = match api.get_opt(PIPELINES_INFO).await {
            Ok(cm) => cm,
            Err(kube::Error::Api(resp)) if resp.code == 403 => {
                tracing::debug!("not allowed to read {}/{}", namespace, PIPELINES_INFO);
                return Ok(None);
            }
            Err(e) => return Err(KubeError::api(format!("read {}/{}", namespace, PIPELINES_INFO), e)),
        };

        Ok(cm
            .and_then(|cm| cm.data)
            .and_then(|data| data.get("version").cloned())
            .filter(|v| !v.is_empty())
            .map(VersionString::new))
    }

    async fn version_from_deployment(&self, namespace: &str) -> Result<Option<VersionString>> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        let deployment = match api.get_opt(CONTROLLER_DEPLOYMENT).await {
            Ok(d) => d,
            Err(kube::Error::Api(resp)) if resp.code == 403 => {
                tracing::debug!("not allowed to read {}/{}", namespace, CONTROLLER_DEPLOYMENT);
                return Ok(None);
            }
            Err(e) => {
                return Err(KubeError::api(
                    format!("read {}/{}", namespace, CONTROLLER_DEPLOYMENT),
                    e,
                ));
            }
        };

        let Some(labels) = deployment.and_then(|d| d.metadata.labels) else {
            return Ok(None);
        };
        Ok(CONTROLLER_VERSION_LABELS
            .iter()
            .find_map(|key| labels.get(*key))
            .filter(|v| !v.is_empty())
            .map(|v| VersionString::new(v.clone())))
    }
}

#[async_trait]
impl ClusterClient for KubeCluster {
    async fn get_labels(
        &self,
        namespace: &str,
        kind: ResourceKind,
        name: &str,
    ) -> Result<Option<BTreeMap<String, String>>> {
        let api = self.api(namespace, kind, &self.read_api_version);
        let object = api
            .get_opt(name)
            .await
            .map_err(|e| KubeError::api(format!("get {} {} in {}", kind, name, namespace), e))?;

        Ok(object.map(|o| o.metadata.labels.unwrap_or_default()))
    }

    async fn create_or_replace(
        &self,
        namespace: &str,
        kind: ResourceKind,
        mut object: DynamicObject,
    ) -> Result<ApplyResult> {
        let api_version = object
            .types
            .as_ref()
            .map(|t| t.api_version.clone())
            .unwrap_or_else(|| self.read_api_version.clone());
        let name = object.metadata.name.clone().unwrap_or_default();
        let api = self.api(namespace, kind, &api_version);
        let params = PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        };

        let existing = api
            .get_opt(&name)
            .await
            .map_err(|e| KubeError::api(format!("get {} {} in {}", kind, name, namespace), e))?;

        match existing {
            Some(existing) => {
                object.metadata.resource_version = existing.metadata.resource_version;
                api.replace(&name, &params, &object).await.map_err(|e| {
                    KubeError::api(format!("replace {} {} in {}", kind, name, namespace), e)
                })?;
                tracing::debug!("replaced {} {} in {}", kind, name, namespace);
                Ok(ApplyResult { created: false })
            }
            None => {
                api.create(&params, &object).await.map_err(|e| {
                    KubeError::api(format!("create {} {} in {}", kind, name, namespace), e)
                })?;
                tracing::debug!("created {} {} in {}", kind, name, namespace);
                Ok(ApplyResult { created: true })
            }
        }
    }

    async fn detect_controller_version(&self) -> Result<Option<VersionString>> {
        for namespace in CONTROLLER_NAMESPACES {
            if let Some(version) = self.version_from_configmap(namespace).await? {
                return Ok(Some(version));
            }
            if let Some(version) = self.version_from_deployment(namespace).await? {
                return Ok(Some(version));
            }
        }
        tracing::debug!("Tekton Pipelines controller version not found");
        Ok(None)
    }
}
