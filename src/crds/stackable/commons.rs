//! Shapes shared by every Stackable product cluster

use k8s_openapi::api::core::v1::{NodeAffinity, PodAffinity, PodAntiAffinity};
use provider_schema::{Attribute, AttributeType, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const LOG_LEVELS: [&str; 7] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR", "FATAL", "NONE"];

pub const PULL_POLICIES: [&str; 3] = ["IfNotPresent", "Always", "Never"];

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    None,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum PullPolicy {
    IfNotPresent,
    Always,
    Never,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Container image of the product
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_policy: Option<PullPolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_secrets: Option<Vec<NamedReference>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stackable_version: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterOperation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconciliation_paused: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopped: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackableAffinity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_affinity: Option<NodeAffinity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_affinity: Option<PodAffinity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_anti_affinity: Option<PodAntiAffinity>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<LogLevel>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomLogConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_map: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerLogConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console: Option<LevelConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomLogConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<LevelConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loggers: Option<BTreeMap<String, LevelConfig>>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Logging {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containers: Option<BTreeMap<String, ContainerLogConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_vector_agent: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_limits: Option<Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<CpuLimits>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryLimits>,

    /// Product specific storage layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<Value>,
}

/// Settings every role group of a Stackable product accepts
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonRoleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity: Option<StackableAffinity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graceful_shutdown_timeout: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<Logging>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_secret_lifetime: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Resources>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodDisruptionBudgetConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_unavailable: Option<u16>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericRoleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_disruption_budget: Option<PodDisruptionBudgetConfig>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleGroup<C> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cli_overrides: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<C>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_overrides: Option<BTreeMap<String, BTreeMap<String, String>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_overrides: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_overrides: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<u16>,
}

/// A product role: role level settings plus named role groups
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Role<C> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cli_overrides: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<C>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_overrides: Option<BTreeMap<String, BTreeMap<String, String>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_overrides: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_overrides: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_config: Option<GenericRoleConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_groups: Option<BTreeMap<String, RoleGroup<C>>>,
}

pub fn image_attribute() -> Attribute {
    Attribute::object(
        "image",
        vec![
            Attribute::string("custom")
                .description("Overwrite the docker image. Specify the full docker image name, e.g. `docker.stackable.tech/stackable/superset:1.4.1-stackable2.1.0`."),
            Attribute::string("productVersion")
                .description("Version of the product, e.g. `1.4.1`."),
            Attribute::string("pullPolicy")
                .description("Pull policy used when pulling the image.")
                .validator(Validator::one_of(PULL_POLICIES)),
            Attribute::list_of_objects(
                "pullSecrets",
                vec![Attribute::string("name").description("Name of the referent.")],
            )
            .description("Image pull secrets to pull images from a private registry."),
            Attribute::string("repo")
                .description("Name of the docker repo, e.g. `docker.stackable.tech/stackable`."),
            Attribute::string("stackableVersion")
                .description("Stackable version of the product, e.g. `23.4`, `23.4.1` or `0.0.0-dev`."),
        ],
    )
    .required()
    .description("Specify which image to use, the easiest way is to only configure the `productVersion`.")
}

pub fn cluster_operation_attribute() -> Attribute {
    Attribute::object(
        "clusterOperation",
        vec![
            Attribute::bool("reconciliationPaused")
                .description("Flag to stop cluster reconciliation by the operator."),
            Attribute::bool("stopped")
                .description("Flag to stop the cluster, all replicas of all role groups are scaled to 0."),
        ],
    )
    .description("Cluster operations like pause reconciliation or cluster stop.")
}

pub fn affinity_attribute() -> Attribute {
    Attribute::object(
        "affinity",
        vec![
            Attribute::dynamic("nodeAffinity")
                .description("Same as the `spec.affinity.nodeAffinity` field on the Pod."),
            Attribute::string_map("nodeSelector")
                .description("Simple key-value pairs forming a nodeSelector."),
            Attribute::dynamic("podAffinity")
                .description("Same as the `spec.affinity.podAffinity` field on the Pod."),
            Attribute::dynamic("podAntiAffinity")
                .description("Same as the `spec.affinity.podAntiAffinity` field on the Pod."),
        ],
    )
    .description("Pod placement constraints of the role group.")
}

fn level_attribute(json_name: &str, description: &str) -> Attribute {
    Attribute::object(
        json_name,
        vec![Attribute::string("level")
            .description("The log level threshold.")
            .validator(Validator::one_of(LOG_LEVELS))],
    )
    .description(description)
}

pub fn logging_attribute() -> Attribute {
    let container = vec![
        level_attribute("console", "Configuration for the console appender."),
        Attribute::object(
            "custom",
            vec![Attribute::string("configMap")
                .description("ConfigMap containing the log configuration files.")],
        )
        .description("Custom log configuration provided in a ConfigMap."),
        level_attribute("file", "Configuration for the file appender."),
        Attribute::map_of_objects(
            "loggers",
            vec![Attribute::string("level")
                .description("The log level threshold.")
                .validator(Validator::one_of(LOG_LEVELS))],
        )
        .description("Configuration per logger."),
    ];

    Attribute::object(
        "logging",
        vec![
            Attribute::map_of_objects("containers", container)
                .description("Log configuration per container."),
            Attribute::bool("enableVectorAgent")
                .description("Whether or not to deploy a container with the Vector log agent."),
        ],
    )
    .description("Logging configuration.")
}

pub fn resources_attribute() -> Attribute {
    Attribute::object(
        "resources",
        vec![
            Attribute::object(
                "cpu",
                vec![
                    Attribute::string("max").description("The maximum amount of CPU cores that can be requested by Pods."),
                    Attribute::string("min").description("The minimal amount of CPU cores that Pods need to run."),
                ],
            ),
            Attribute::object(
                "memory",
                vec![
                    Attribute::string("limit").description("The maximum amount of memory that should be available to the Pod."),
                    Attribute::dynamic("runtimeLimits")
                        .description("Additional options that can be specified."),
                ],
            ),
            Attribute::dynamic("storage").description("Storage configuration of the role group."),
        ],
    )
    .description("Resource usage is configured here, this includes CPU usage, memory usage and disk storage usage.")
}

/// `config` attributes every Stackable role group accepts
pub fn common_config_attributes() -> Vec<Attribute> {
    vec![
        affinity_attribute(),
        Attribute::string("gracefulShutdownTimeout")
            .description("Time period Pods have to gracefully shut down, e.g. `30m`, `1h` or `2d`."),
        logging_attribute(),
        Attribute::string("requestedSecretLifetime")
            .description("Request secret (currently only autoTls certificates) lifetime from the secret operator, e.g. `7d`, or `30d`."),
        resources_attribute(),
    ]
}

pub fn pod_disruption_budget_attribute() -> Attribute {
    Attribute::object(
        "podDisruptionBudget",
        vec![
            Attribute::bool("enabled")
                .description("Whether a PodDisruptionBudget should be written out for this role."),
            Attribute::int64("maxUnavailable")
                .description("The number of Pods that are allowed to be down because of voluntary disruptions.")
                .validator(Validator::Int64AtLeast(0)),
        ],
    )
    .description("This struct is used to configure PodDisruptionBudgets for the role.")
}

fn override_attributes() -> Vec<Attribute> {
    vec![
        Attribute::string_map("cliOverrides"),
        Attribute::new(
            "configOverrides",
            AttributeType::Map(Box::new(AttributeType::Map(Box::new(AttributeType::String)))),
        )
        .description("Overrides for configuration files, keyed by file name."),
        Attribute::string_map("envOverrides")
            .description("Environment variables to set in the containers."),
        Attribute::dynamic("podOverrides")
            .description("A PodTemplateSpec merged over the Pods created by the operator."),
    ]
}

/// Attributes of a role group with the given `config` attributes
pub fn role_group_attributes(config: Vec<Attribute>) -> Vec<Attribute> {
    let mut attributes = override_attributes();
    attributes.insert(1, Attribute::object("config", config));
    attributes.push(
        Attribute::int64("replicas")
            .validator(Validator::Int64AtLeast(0)),
    );
    attributes
}

/// A role attribute (`brokers`, `routers`, ...) with the given `config` attributes
pub fn role_attribute(json_name: &str, description: &str, config: Vec<Attribute>) -> Attribute {
    let mut attributes = override_attributes();
    attributes.insert(1, Attribute::object("config", config.clone()));
    attributes.push(
        Attribute::object("roleConfig", vec![pod_disruption_budget_attribute()])
            .description("Configuration that applies to all roles groups of this role."),
    );
    attributes.push(
        Attribute::map_of_objects("roleGroups", role_group_attributes(config))
            .description("Role groups of the role, keyed by name."),
    );

    Attribute::object(json_name, attributes).description(description)
}
