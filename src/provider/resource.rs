//! Managed objects: server-side apply, wait, delete and import

use super::common::{
    id_attribute, manifest_from_config, metadata_attribute, object_identity, spec_attribute,
    state_from_object, type_attributes, SurfaceMode,
};
use super::import::parse_import_id;
use crate::client::{ApplyParams, ClientError, ObjectApi, ObjectKey};
use crate::crds::{CrdKind, Manifest};
use crate::error::{ProviderError, ProviderResult};
use crate::wait::{poll_until, Condition, PollError, WaitBudget, DEFAULT_POLL_INTERVAL};
use provider_schema::{Attribute, Diagnostic, Diagnostics, Schema};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Field manager used when neither the resource nor the provider sets one
pub const DEFAULT_FIELD_MANAGER: &str = "crd-provider";

/// Attributes that only exist in provider state, never in the object
const SETTING_ATTRIBUTES: [&str; 4] = [
    "field_manager",
    "force_conflicts",
    "wait_for",
    "wait_for_deletion",
];

/// Provider-level fallbacks for per-resource apply settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyDefaults {
    pub field_manager: Option<String>,
    pub force_conflicts: Option<bool>,
}

/// Everything an operation needs besides its configuration
#[derive(Clone)]
pub struct OperationContext {
    pub api: Arc<dyn ObjectApi>,
    pub defaults: ApplyDefaults,
    pub poll_interval: Duration,
}

impl OperationContext {
    pub fn new(api: Arc<dyn ObjectApi>, defaults: ApplyDefaults) -> Self {
        Self {
            api,
            defaults,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Per-resource settings read from configuration or state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceSettings {
    pub field_manager: Option<String>,
    pub force_conflicts: Option<bool>,
    pub wait_for: Option<Condition>,
    pub timeout: WaitBudget,
    pub wait_for_deletion: bool,
}

impl ResourceSettings {
    /// Read the settings, reporting malformed timeouts and expressions
    pub fn from_document(document: &Value) -> ProviderResult<Self> {
        let string = |name: &str| document.get(name).and_then(Value::as_str).map(str::to_string);
        let mut diagnostics = Diagnostics::new();

        let wait_for = document.get("wait_for").filter(|w| !w.is_null());
        let condition = wait_for
            .and_then(|w| w.get("jsonpath"))
            .and_then(Value::as_str)
            .map(|jsonpath| {
                Condition::new(
                    jsonpath,
                    wait_for
                        .and_then(|w| w.get("value"))
                        .and_then(Value::as_str)
                        .map(str::to_string),
                )
            });
        if let Some(Err(e)) = condition.as_ref().map(Condition::validate) {
            diagnostics.push(
                Diagnostic::error("Invalid Attribute Value", e.to_string())
                    .with_path("wait_for.jsonpath"),
            );
        }

        let timeout = wait_for
            .and_then(|w| w.get("timeout"))
            .and_then(Value::as_str);
        let timeout = match WaitBudget::parse(timeout) {
            Ok(budget) => budget,
            Err(e) => {
                diagnostics.push(
                    Diagnostic::error("Invalid Attribute Value", e.to_string())
                        .with_path("wait_for.timeout"),
                );
                WaitBudget::default()
            }
        };

        if diagnostics.has_error() {
            return Err(ProviderError::InvalidConfiguration(diagnostics));
        }

        Ok(Self {
            field_manager: string("field_manager").filter(|s| !s.is_empty()),
            force_conflicts: document.get("force_conflicts").and_then(Value::as_bool),
            wait_for: condition,
            timeout,
            wait_for_deletion: document
                .get("wait_for_deletion")
                .and_then(Value::as_bool)
                .unwrap_or(true),
        })
    }

    /// Resource value, then provider default, then [`DEFAULT_FIELD_MANAGER`]
    pub fn apply_params(&self, defaults: &ApplyDefaults) -> ApplyParams {
        ApplyParams {
            field_manager: self
                .field_manager
                .clone()
                .or_else(|| defaults.field_manager.clone())
                .unwrap_or_else(|| DEFAULT_FIELD_MANAGER.to_string()),
            force: self
                .force_conflicts
                .or(defaults.force_conflicts)
                .unwrap_or(false),
        }
    }
}

fn settings_attributes() -> Vec<Attribute> {
    vec![
        Attribute::string("fieldManager")
            .description("The name of the manager used to track field ownership. Defaults to the provider setting, then 'crd-provider'."),
        Attribute::bool("forceConflicts")
            .description("If true, server-side apply will force the changes against conflicts."),
        Attribute::object(
            "waitFor",
            vec![
                Attribute::string("jsonpath")
                    .required()
                    .description("JSONPath expression selecting the field to wait for, e.g. '{.status.provisioning.state}'."),
                Attribute::string("value")
                    .description("Value the selected field must have. Without it, any non-null value satisfies the condition."),
                Attribute::string("timeout")
                    .description("How long to wait, e.g. '30s' or '5m'. '0' checks once; a negative value waits up to a week. Defaults to '30s'."),
            ],
        )
        .description("Wait for a condition on the object after it was created or updated."),
        Attribute::bool("waitForDeletion")
            .description("Wait until the object is gone after deleting it. Defaults to true."),
    ]
}

pub struct Resource {
    kind: Arc<dyn CrdKind>,
    schema: Schema,
}

impl Resource {
    pub fn new(kind: Arc<dyn CrdKind>) -> Self {
        let schema = Schema::new(kind.description())
            .with_attribute(id_attribute())
            .with_attributes(type_attributes())
            .with_attribute(metadata_attribute(kind.namespaced(), SurfaceMode::Resource))
            .with_attribute(spec_attribute(kind.as_ref(), SurfaceMode::Resource))
            .with_attributes(settings_attributes());

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

    /// The object `config` describes, as it would be applied
    pub fn manifest(&self, config: &Value) -> ProviderResult<Manifest<Value>> {
        manifest_from_config(self.kind(), &self.schema, config)
    }

    pub async fn create(&self, ctx: &OperationContext, config: &Value) -> ProviderResult<Value> {
        self.apply(ctx, config).await
    }

    pub async fn update(&self, ctx: &OperationContext, config: &Value) -> ProviderResult<Value> {
        self.apply(ctx, config).await
    }

    async fn apply(&self, ctx: &OperationContext, config: &Value) -> ProviderResult<Value> {
        let manifest = self.manifest(config)?;
        let settings = ResourceSettings::from_document(config)?;
        let key = self
            .kind
            .object_key(manifest.metadata.namespace.as_deref(), &manifest.metadata.name);

        let object =
            serde_json::to_value(&manifest).map_err(|e| ProviderError::Marshal(e.to_string()))?;
        let params = settings.apply_params(&ctx.defaults);

        info!(
            "Applying {} (field manager {:?}, force {})",
            key, params.field_manager, params.force
        );
        let applied = ctx
            .api
            .apply(&key, &object, &params)
            .await
            .map_err(|e| match e {
                ClientError::Serialization(e) => ProviderError::Unmarshal(e.to_string()),
                other => ProviderError::Patch(other.to_string()),
            })?;

        if !applied.is_object() {
            return Err(ProviderError::Unmarshal(format!(
                "expected an object in the response, got {applied}"
            )));
        }

        let current = match &settings.wait_for {
            Some(condition) => {
                self.wait_for_condition(ctx, &key, condition, settings.timeout)
                    .await?
            }
            None => applied,
        };

        Ok(self.state(&current, config))
    }

    /// Refresh `state` from the cluster; `None` when the object is gone
    pub async fn read(&self, ctx: &OperationContext, state: &Value) -> ProviderResult<Option<Value>> {
        let (namespace, name) = object_identity(self.kind(), state)?;
        let key = self.kind.object_key(namespace.as_deref(), &name);

        match ctx.api.get(&key).await {
            Ok(object) => Ok(Some(self.state(&object, state))),
            Err(e) if e.is_not_found() => {
                info!("{} no longer exists, removing it from state", key);
                Ok(None)
            }
            Err(e) => Err(ProviderError::Get(e.to_string())),
        }
    }

    pub async fn delete(&self, ctx: &OperationContext, state: &Value) -> ProviderResult<()> {
        let (namespace, name) = object_identity(self.kind(), state)?;
        let key = self.kind.object_key(namespace.as_deref(), &name);
        let settings = ResourceSettings::from_document(state)?;

        info!("Deleting {}", key);
        match ctx.api.delete(&key).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!("{} was already gone", key);
                return Ok(());
            }
            Err(e) => return Err(ProviderError::Delete(e.to_string())),
        }

        if settings.wait_for_deletion {
            self.wait_for_deletion(ctx, &key, settings.timeout).await?;
        }
        Ok(())
    }

    /// Import an existing object by `"namespace/name"`
    pub async fn import(&self, ctx: &OperationContext, id: &str) -> ProviderResult<Value> {
        let (namespace, name) = parse_import_id(id, self.kind.namespaced())?;

        let mut metadata = Map::new();
        metadata.insert("name".to_string(), Value::String(name.clone()));
        if let Some(namespace) = &namespace {
            metadata.insert("namespace".to_string(), Value::String(namespace.clone()));
        }
        let mut seed = Map::new();
        seed.insert("metadata".to_string(), Value::Object(metadata));

        self.read(ctx, &Value::Object(seed))
            .await?
            .ok_or_else(|| ProviderError::NotFound {
                kind: self.kind.kind().to_string(),
                namespace,
                name,
            })
    }

    /// State for `object`, keeping the provider-only settings of `previous`
    fn state(&self, object: &Value, previous: &Value) -> Value {
        let mut state = state_from_object(self.kind(), &self.schema, object);
        if let Value::Object(map) = &mut state {
            for name in SETTING_ATTRIBUTES {
                map.insert(
                    name.to_string(),
                    previous.get(name).cloned().unwrap_or(Value::Null),
                );
            }
        }
        state
    }

    async fn wait_for_condition(
        &self,
        ctx: &OperationContext,
        key: &ObjectKey,
        condition: &Condition,
        budget: WaitBudget,
    ) -> ProviderResult<Value> {
        info!("Waiting up to {:?} for {} on {}", budget.limit(), condition, key);

        let api = ctx.api.as_ref();
        let latest = std::sync::Mutex::new(None);
        let latest_ref = &latest;

        let result = poll_until(budget, ctx.poll_interval, move || async move {
            match api.get(key).await {
                Ok(object) => match condition.matches(&object) {
                    Ok(matched) => {
                        if let Ok(mut slot) = latest_ref.lock() {
                            *slot = Some(object);
                        }
                        Ok(matched)
                    }
                    Err(e) => Err(ProviderError::Wait(e.to_string())),
                },
                Err(e) if e.is_not_found() => Ok(false),
                Err(e) => Err(ProviderError::Get(e.to_string())),
            }
        })
        .await;

        match result {
            Ok(attempts) => {
                debug!("{} met {} after {} checks", key, condition, attempts);
                latest
                    .into_inner()
                    .ok()
                    .flatten()
                    .ok_or_else(|| ProviderError::Wait(format!("{key} disappeared while waiting")))
            }
            Err(PollError::Check(e)) => Err(e),
            Err(timeout) => Err(ProviderError::Wait(format!(
                "{key}: condition {condition} was not met, {timeout}"
            ))),
        }
    }

    async fn wait_for_deletion(
        &self,
        ctx: &OperationContext,
        key: &ObjectKey,
        budget: WaitBudget,
    ) -> ProviderResult<()> {
        let api = ctx.api.as_ref();

        let result = poll_until(budget, ctx.poll_interval, move || async move {
            match api.get(key).await {
                Ok(_) => Ok(false),
                Err(e) if e.is_not_found() => Ok(true),
                Err(e) => Err(ProviderError::Get(e.to_string())),
            }
        })
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(PollError::Check(e)) => Err(e),
            Err(timeout) => Err(ProviderError::Wait(format!(
                "{key} still exists after deletion, {timeout}"
            ))),
        }
    }
}
