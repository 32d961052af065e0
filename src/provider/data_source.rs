//! Read-only view of a live object

use super::common::{
    id_attribute, metadata_attribute, object_identity, spec_attribute, state_from_object,
    strip_type_fields, type_attributes, validate, SurfaceMode,
};
use crate::client::ObjectApi;
use crate::crds::CrdKind;
use crate::error::{ProviderError, ProviderResult};
use provider_schema::Schema;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

pub struct DataSource {
    kind: Arc<dyn CrdKind>,
    schema: Schema,
}

impl DataSource {
    pub fn new(kind: Arc<dyn CrdKind>) -> Self {
        let schema = Schema::new(kind.description())
            .with_attribute(id_attribute())
            .with_attributes(type_attributes())
            .with_attribute(metadata_attribute(kind.namespaced(), SurfaceMode::DataSource))
            .with_attribute(spec_attribute(kind.as_ref(), SurfaceMode::DataSource));

        Self { kind, schema }
    }

    pub fn type_name(&self) -> String {
        self.kind.type_name()
    }

    pub fn kind(&self) -> &dyn CrdKind {
        self.kind.as_ref()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Fetch the object named in `config` and return the full state
    pub async fn read(&self, api: &dyn ObjectApi, config: &Value) -> ProviderResult<Value> {
        let config = strip_type_fields(config);
        validate(&self.schema, &config)?;

        let (namespace, name) = object_identity(self.kind(), &config)?;
        let key = self.kind.object_key(namespace.as_deref(), &name);
        info!("Reading {}", key);

        let object = api.get(&key).await.map_err(|e| {
            if e.is_not_found() {
                ProviderError::NotFound {
                    kind: self.kind.kind().to_string(),
                    namespace: namespace.clone(),
                    name: name.clone(),
                }
            } else {
                ProviderError::Get(e.to_string())
            }
        })?;

        debug!("Read {} with {} top-level fields", key, object.as_object().map_or(0, |o| o.len()));
        Ok(state_from_object(self.kind(), &self.schema, &object))
    }
}
