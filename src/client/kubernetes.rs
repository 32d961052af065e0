//! `kube` backed object access

use super::{ApplyParams, ClientError, ObjectApi, ObjectKey};
use anyhow::Result;
use async_trait::async_trait;
use kube::api::{Api, ApiResource, DeleteParams, DynamicObject, GroupVersionKind, Patch, PatchParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// Dynamic client over `Api<DynamicObject>`
#[derive(Clone)]
pub struct KubeObjectApi {
    client: Client,
}

impl KubeObjectApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from an explicit kubeconfig and/or context, falling back
    /// to the in-cluster or default kubeconfig discovery.
    pub async fn from_settings(kubeconfig: Option<&Path>, context: Option<&str>) -> Result<Self> {
        let options = KubeConfigOptions {
            context: context.map(str::to_string),
            ..Default::default()
        };

        let client = match kubeconfig {
            Some(path) => {
                info!("Loading kubeconfig from {}", path.display());
                let kubeconfig = Kubeconfig::read_from(path)?;
                let config = Config::from_custom_kubeconfig(kubeconfig, &options).await?;
                Client::try_from(config)?
            }
            None if context.is_some() => {
                let config = Config::from_kubeconfig(&options).await?;
                Client::try_from(config)?
            }
            None => Client::try_default().await?,
        };

        Ok(Self::new(client))
    }

    fn api(&self, key: &ObjectKey) -> Api<DynamicObject> {
        let gvk = GroupVersionKind::gvk(&key.group, &key.version, &key.kind);
        let resource = ApiResource::from_gvk_with_plural(&gvk, &key.plural);

        match &key.namespace {
            Some(namespace) => Api::namespaced_with(self.client.clone(), namespace, &resource),
            None => Api::all_with(self.client.clone(), &resource),
        }
    }
}

impl From<kube::Error> for ClientError {
    fn from(error: kube::Error) -> Self {
        match error {
            kube::Error::Api(response) if response.code == 404 => {
                ClientError::NotFound(response.message)
            }
            kube::Error::Api(response) => ClientError::Api {
                code: response.code,
                message: response.message,
            },
            kube::Error::SerdeError(e) => ClientError::Serialization(e),
            other => ClientError::Transport(other.to_string()),
        }
    }
}

#[async_trait]
impl ObjectApi for KubeObjectApi {
    async fn get(&self, key: &ObjectKey) -> Result<Value, ClientError> {
        debug!("GET {}", key);
        let object = self.api(key).get(&key.name).await?;
        Ok(serde_json::to_value(object)?)
    }

    async fn apply(
        &self,
        key: &ObjectKey,
        object: &Value,
        params: &ApplyParams,
    ) -> Result<Value, ClientError> {
        debug!(
            "PATCH {} (field manager {}, force {})",
            key, params.field_manager, params.force
        );

        let mut patch_params = PatchParams::apply(&params.field_manager);
        patch_params.force = params.force;

        let applied = self
            .api(key)
            .patch(&key.name, &patch_params, &Patch::Apply(object))
            .await?;
        Ok(serde_json::to_value(applied)?)
    }

    async fn delete(&self, key: &ObjectKey) -> Result<(), ClientError> {
        debug!("DELETE {}", key);
        self.api(key)
            .delete(&key.name, &DeleteParams::default())
            .await?;
        Ok(())
    }
}
