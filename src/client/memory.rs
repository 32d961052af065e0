//! Map backed object access for dry runs and tests

use super::{ApplyParams, ClientError, ObjectApi, ObjectKey};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// An [`ObjectApi`] that keeps objects in memory.
///
/// Apply replaces the stored object with the submitted one, keeping any
/// `status` already present, and bumps `metadata.resourceVersion`. Every
/// apply call is recorded.
#[derive(Clone, Default)]
pub struct InMemoryObjectApi {
    objects: Arc<RwLock<BTreeMap<ObjectKey, Value>>>,
    applied: Arc<RwLock<Vec<(ObjectKey, ApplyParams)>>>,
    revision: Arc<RwLock<u64>>,
}

impl InMemoryObjectApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object as if it already existed in the cluster
    pub async fn insert(&self, key: ObjectKey, object: Value) {
        self.objects.write().await.insert(key, object);
    }

    /// Set the `status` of a stored object
    pub async fn set_status(&self, key: &ObjectKey, status: Value) -> bool {
        match self.objects.write().await.get_mut(key) {
            Some(Value::Object(object)) => {
                object.insert("status".to_string(), status);
                true
            }
            _ => false,
        }
    }

    pub async fn contains(&self, key: &ObjectKey) -> bool {
        self.objects.read().await.contains_key(key)
    }

    /// Apply calls received so far, in order
    pub async fn applied(&self) -> Vec<(ObjectKey, ApplyParams)> {
        self.applied.read().await.clone()
    }

    fn not_found(key: &ObjectKey) -> ClientError {
        ClientError::NotFound(format!("{} not found", key))
    }
}

#[async_trait]
impl ObjectApi for InMemoryObjectApi {
    async fn get(&self, key: &ObjectKey) -> Result<Value, ClientError> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| Self::not_found(key))
    }

    async fn apply(
        &self,
        key: &ObjectKey,
        object: &Value,
        params: &ApplyParams,
    ) -> Result<Value, ClientError> {
        debug!("Applying {} in memory", key);
        self.applied
            .write()
            .await
            .push((key.clone(), params.clone()));

        let revision = {
            let mut revision = self.revision.write().await;
            *revision += 1;
            *revision
        };

        let mut stored = object.clone();
        let mut objects = self.objects.write().await;

        if let Value::Object(map) = &mut stored {
            if let Some(status) = objects.get(key).and_then(|existing| existing.get("status")) {
                map.insert("status".to_string(), status.clone());
            }
            if let Some(Value::Object(metadata)) = map.get_mut("metadata") {
                metadata.insert(
                    "resourceVersion".to_string(),
                    Value::String(revision.to_string()),
                );
            }
        }

        objects.insert(key.clone(), stored.clone());
        Ok(stored)
    }

    async fn delete(&self, key: &ObjectKey) -> Result<(), ClientError> {
        debug!("Deleting {} in memory", key);
        self.objects
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(key))
    }
}
