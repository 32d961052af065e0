//! `druid.stackable.tech/v1alpha1` DruidCluster

use super::commons::{
    cluster_operation_attribute, common_config_attributes, image_attribute, role_attribute,
    ClusterOperation, CommonRoleConfig, ProductImage, Role,
};
use crate::crds::{typed_round_trip, CrdKind};
use provider_schema::{Attribute, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const LISTENER_CLASSES: [&str; 3] = ["cluster-internal", "external-unstable", "external-stable"];

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    Derby,
    Mysql,
    Postgresql,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DruidAuthentication {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_class: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpaConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_map_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DruidAuthorization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opa: Option<OpaConfig>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HdfsDeepStorage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_map_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct S3DeepStorage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_key: Option<String>,

    /// Inline bucket definition or a reference to an S3Bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepStorage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hdfs: Option<HdfsDeepStorage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3DeepStorage>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataStorageDatabase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conn_string: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_secret: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_type: Option<DbType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DruidTls {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_and_internal_secret_class: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DruidClusterConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_extensions_to_load: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Vec<DruidAuthentication>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<DruidAuthorization>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deep_storage: Option<DeepStorage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listener_class: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_storage_database: Option<MetadataStorageDatabase>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<DruidTls>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_aggregator_config_map_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zookeeper_config_map_name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DruidClusterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brokers: Option<Role<CommonRoleConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_config: Option<DruidClusterConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_operation: Option<ClusterOperation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinators: Option<Role<CommonRoleConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historicals: Option<Role<CommonRoleConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ProductImage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_managers: Option<Role<CommonRoleConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routers: Option<Role<CommonRoleConfig>>,
}

fn cluster_config_attribute() -> Attribute {
    Attribute::object(
        "clusterConfig",
        vec![
            Attribute::string_list("additionalExtensionsToLoad")
                .description("Additional extensions to load in Druid. The operator will automatically load all extensions needed based on the cluster configuration, but for extra functionality which the operator cannot anticipate, it can sometimes be necessary to load additional extensions."),
            Attribute::list_of_objects(
                "authentication",
                vec![Attribute::string("authenticationClass")
                    .required()
                    .description("Name of the AuthenticationClass used to authenticate users.")],
            )
            .description("List of AuthenticationClasses used to authenticate users."),
            Attribute::object(
                "authorization",
                vec![Attribute::object(
                    "opa",
                    vec![
                        Attribute::string("configMapName")
                            .required()
                            .description("The name of the discovery ConfigMap of the OPA cluster."),
                        Attribute::string("package")
                            .description("The name of the Rego package containing the Rego rules for the product."),
                    ],
                )
                .required()],
            )
            .description("Authorization settings for Druid like OPA."),
            Attribute::object(
                "deepStorage",
                vec![
                    Attribute::object(
                        "hdfs",
                        vec![
                            Attribute::string("configMapName")
                                .required()
                                .description("The discovery ConfigMap of the HDFS cluster."),
                            Attribute::string("directory")
                                .required()
                                .description("The directory inside of HDFS where Druid should store its data."),
                        ],
                    )
                    .description("Store segments in HDFS."),
                    Attribute::object(
                        "s3",
                        vec![
                            Attribute::string("baseKey")
                                .description("The prefix of the object keys segments are stored under."),
                            Attribute::dynamic("bucket")
                                .required()
                                .description("An inline S3 bucket definition or a reference to an S3Bucket."),
                        ],
                    )
                    .description("Store segments in S3."),
                ],
            )
            .required()
            .description("Druid requires a deep storage backend to store segments."),
            Attribute::string("listenerClass")
                .description("This field controls which type of Service the operator creates for this DruidCluster.")
                .validator(Validator::one_of(LISTENER_CLASSES)),
            Attribute::object(
                "metadataStorageDatabase",
                vec![
                    Attribute::string("connString")
                        .required()
                        .description("The connect string for the database, for Postgres this could look like `jdbc:postgresql://postgresql-druid/druid`."),
                    Attribute::string("credentialsSecret")
                        .description("A reference to a Secret containing the database credentials."),
                    Attribute::string("dbType")
                        .required()
                        .description("The database type.")
                        .validator(Validator::one_of(["derby", "mysql", "postgresql"])),
                    Attribute::string("host")
                        .required()
                        .description("The host, i.e. `postgresql-druid`."),
                    Attribute::int64("port")
                        .required()
                        .description("The port, i.e. 5432.")
                        .validator(Validator::Int64AtLeast(0))
                        .validator(Validator::Int64AtMost(65535)),
                ],
            )
            .required()
            .description("Druid requires an SQL database to store metadata into."),
            Attribute::object(
                "tls",
                vec![Attribute::string("serverAndInternalSecretClass")
                    .description("Only affects client connections and internal communication between Druid processes.")],
            )
            .description("TLS encryption settings for Druid."),
            Attribute::string("vectorAggregatorConfigMapName")
                .description("Name of the Vector aggregator discovery ConfigMap. It must contain the key `ADDRESS` with the address of the Vector aggregator."),
            Attribute::string("zookeeperConfigMapName")
                .required()
                .description("ZooKeeper discovery ConfigMap name, used to locate the ZooKeeper ensemble."),
        ],
    )
    .required()
    .description("Common cluster wide configuration that can not differ or be overridden on a role or role group level.")
}

fn druid_role(json_name: &str, description: &str) -> Attribute {
    role_attribute(json_name, description, common_config_attributes()).required()
}

/// The DruidCluster kind
pub struct DruidClusterKind;

impl CrdKind for DruidClusterKind {
    fn group(&self) -> &str {
        "druid.stackable.tech"
    }

    fn version(&self) -> &str {
        "v1alpha1"
    }

    fn kind(&self) -> &str {
        "DruidCluster"
    }

    fn plural(&self) -> &str {
        "druidclusters"
    }

    fn description(&self) -> &str {
        "A Druid cluster stacklet. This resource is managed by the Stackable operator for Apache Druid."
    }

    fn spec_required(&self) -> bool {
        true
    }

    fn spec_attributes(&self) -> Vec<Attribute> {
        vec![
            druid_role("brokers", "This struct represents a role - e.g. HDFS datanodes or Trino workers."),
            cluster_config_attribute(),
            cluster_operation_attribute(),
            druid_role("coordinators", "Coordinator role of the cluster."),
            druid_role("historicals", "Historical role of the cluster."),
            image_attribute(),
            druid_role("middleManagers", "MiddleManager role of the cluster."),
            druid_role("routers", "Router role of the cluster."),
        ]
    }

    fn canonical_spec(&self, spec: Value) -> Result<Value, serde_json::Error> {
        typed_round_trip::<DruidClusterSpec>(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provider_schema::Schema;
    use serde_json::json;

    fn role_config() -> Value {
        json!({
            "affinity": {
                "nodeAffinity": {
                    "requiredDuringSchedulingIgnoredDuringExecution": {
                        "nodeSelectorTerms": [{
                            "matchExpressions": [{"key": "zone", "operator": "In", "values": ["a", "b"]}]
                        }]
                    }
                },
                "nodeSelector": {"disktype": "ssd"},
                "podAffinity": {
                    "requiredDuringSchedulingIgnoredDuringExecution": [{
                        "labelSelector": {"matchLabels": {"app.kubernetes.io/name": "zookeeper"}},
                        "topologyKey": "kubernetes.io/hostname"
                    }]
                },
                "podAntiAffinity": {
                    "preferredDuringSchedulingIgnoredDuringExecution": [{
                        "weight": 70,
                        "podAffinityTerm": {
                            "labelSelector": {"matchLabels": {"app.kubernetes.io/name": "druid"}},
                            "topologyKey": "kubernetes.io/hostname"
                        }
                    }]
                }
            },
            "gracefulShutdownTimeout": "5m",
            "logging": {
                "containers": {
                    "druid": {
                        "console": {"level": "INFO"},
                        "file": {"level": "WARN"},
                        "loggers": {"ROOT": {"level": "ERROR"}}
                    },
                    "vector": {"custom": {"configMap": "vector-log-config"}}
                },
                "enableVectorAgent": true
            },
            "requestedSecretLifetime": "7d",
            "resources": {
                "cpu": {"max": "4", "min": "500m"},
                "memory": {"limit": "2Gi", "runtimeLimits": {}},
                "storage": {"segmentCache": {"freePercentage": 5}}
            }
        })
    }

    fn role() -> Value {
        json!({
            "cliOverrides": {"--verbose": "true"},
            "config": role_config(),
            "configOverrides": {"runtime.properties": {"druid.server.http.numThreads": "40"}},
            "envOverrides": {"JAVA_OPTS": "-Xmx1g"},
            "podOverrides": {"spec": {"priorityClassName": "high"}},
            "roleConfig": {"podDisruptionBudget": {"enabled": true, "maxUnavailable": 1}},
            "roleGroups": {
                "default": {
                    "config": role_config(),
                    "envOverrides": {"TZ": "UTC"},
                    "replicas": 2
                }
            }
        })
    }

    fn full_spec() -> Value {
        json!({
            "brokers": role(),
            "clusterConfig": {
                "additionalExtensionsToLoad": ["druid-avro-extensions"],
                "authentication": [{"authenticationClass": "druid-tls-auth"}],
                "authorization": {"opa": {"configMapName": "opa", "package": "druid"}},
                "deepStorage": {
                    "hdfs": {"configMapName": "hdfs", "directory": "/druid"},
                    "s3": {"baseKey": "segments", "bucket": {"reference": "druid-bucket"}}
                },
                "listenerClass": "external-unstable",
                "metadataStorageDatabase": {
                    "connString": "jdbc:postgresql://postgresql-druid/druid",
                    "credentialsSecret": "druid-db-credentials",
                    "dbType": "postgresql",
                    "host": "postgresql-druid",
                    "port": 5432
                },
                "tls": {"serverAndInternalSecretClass": "tls"},
                "vectorAggregatorConfigMapName": "vector-aggregator-discovery",
                "zookeeperConfigMapName": "druid-znode"
            },
            "clusterOperation": {"reconciliationPaused": false, "stopped": true},
            "coordinators": role(),
            "historicals": role(),
            "image": {
                "custom": "docker.stackable.tech/stackable/druid:30.0.0-stackable24.7.0",
                "productVersion": "30.0.0",
                "pullPolicy": "IfNotPresent",
                "pullSecrets": [{"name": "registry"}],
                "repo": "docker.stackable.tech/stackable",
                "stackableVersion": "24.7.0"
            },
            "middleManagers": role(),
            "routers": role()
        })
    }

    #[test]
    fn test_typed_round_trip_keeps_every_field() {
        let spec = full_spec();
        assert_eq!(DruidClusterKind.canonical_spec(spec.clone()).unwrap(), spec);
    }

    #[test]
    fn test_yaml_round_trip() {
        let typed: DruidClusterSpec = serde_json::from_value(full_spec()).unwrap();
        let yaml = serde_yaml::to_string(&typed).unwrap();
        assert!(yaml.contains("middleManagers:"));
        assert!(yaml.contains("podAntiAffinity:"));

        let parsed: DruidClusterSpec = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, typed);
    }

    #[test]
    fn test_full_spec_matches_attributes() {
        let schema = Schema::new("druid").with_attributes(DruidClusterKind.spec_attributes());
        let config = schema.from_kubernetes(&full_spec());
        assert_eq!(config["middle_managers"]["role_groups"]["default"]["replicas"], 2);

        let diagnostics = schema.validate_config(&config);
        assert!(!diagnostics.has_error(), "{diagnostics}");
        assert_eq!(schema.to_kubernetes(&config), full_spec());
    }

    #[test]
    fn test_misspelled_affinity_field_is_a_marshal_error() {
        let mut spec = full_spec();
        spec["routers"]["roleGroups"]["default"]["config"]["affinity"]["podAntiAffinity"] = json!({
            "preferredDuringSchedulingIgnoredDuringExecutoin": []
        });

        let error = DruidClusterKind.canonical_spec(spec).unwrap_err();
        assert!(
            error
                .to_string()
                .contains(".routers.roleGroups.default.config.affinity.podAntiAffinity.preferredDuringSchedulingIgnoredDuringExecutoin"),
            "{error}"
        );
    }

    #[test]
    fn test_db_type_wire_names() {
        assert_eq!(serde_json::to_value(DbType::Postgresql).unwrap(), json!("postgresql"));
        assert_eq!(
            serde_json::from_value::<DbType>(json!("derby")).unwrap(),
            DbType::Derby
        );
    }

    #[test]
    fn test_attribute_names() {
        let attributes = DruidClusterKind.spec_attributes();
        let names: Vec<&str> = attributes.iter().map(|a| a.name.as_str()).collect();
        assert!(names.contains(&"middle_managers"));
        assert!(names.contains(&"cluster_config"));
    }

    #[test]
    fn test_unknown_db_type_is_a_marshal_error() {
        let spec = json!({
            "clusterConfig": {"metadataStorageDatabase": {"dbType": "oracle"}}
        });
        assert!(DruidClusterKind.canonical_spec(spec).is_err());
    }
}
