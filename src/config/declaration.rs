//! Objects declared in the configuration file

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A manifest or resource: a type name and its configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    #[serde(rename = "type")]
    pub type_name: String,

    /// Document keyed by attribute names, as accepted by the surface
    pub config: Value,
}

impl Declaration {
    pub fn new(type_name: impl Into<String>, config: Value) -> Self {
        Self {
            type_name: type_name.into(),
            config,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.type_name.is_empty() {
            return Err(anyhow!("Declared object has an empty type"));
        }
        if !self.config.is_object() {
            return Err(anyhow!(
                "Declared {} must have an object as config",
                self.type_name
            ));
        }
        Ok(())
    }

    /// `"<type> <name>"` for log and error messages
    pub fn label(&self) -> String {
        let metadata = self.config.get("metadata");
        let field = |name: &str| metadata.and_then(|m| m.get(name)).and_then(Value::as_str);
        match (field("namespace"), field("name")) {
            (Some(namespace), Some(name)) => format!("{} {}/{}", self.type_name, namespace, name),
            (None, Some(name)) => format!("{} {}", self.type_name, name),
            _ => self.type_name.clone(),
        }
    }

    pub(crate) fn example_druid_cluster() -> Self {
        Self::new(
            "k8s_druid_stackable_tech_druid_cluster_v1alpha1_manifest",
            json!({
                "metadata": {"name": "analytics", "namespace": "druid"},
                "spec": {
                    "image": {"product_version": "30.0.0"},
                    "cluster_config": {
                        "deep_storage": {"hdfs": {"config_map_name": "hdfs", "directory": "/druid"}},
                        "metadata_storage_database": {
                            "db_type": "postgresql",
                            "conn_string": "jdbc:postgresql://postgresql-druid/druid",
                            "host": "postgresql-druid",
                            "port": 5432,
                            "credentials_secret": "druid-db-credentials"
                        },
                        "zookeeper_config_map_name": "druid-znode"
                    },
                    "brokers": {"role_groups": {"default": {"replicas": 1}}},
                    "coordinators": {"role_groups": {"default": {"replicas": 1}}},
                    "historicals": {"role_groups": {"default": {"replicas": 1}}},
                    "middle_managers": {"role_groups": {"default": {"replicas": 1}}},
                    "routers": {"role_groups": {"default": {"replicas": 1}}}
                }
            }),
        )
    }

    pub(crate) fn example_bare_metal_host() -> Self {
        Self::new(
            "k8s_metal3_io_bare_metal_host_v1alpha1",
            json!({
                "metadata": {"name": "node-0", "namespace": "metal3"},
                "spec": {
                    "online": true,
                    "boot_mac_address": "00:5c:52:31:3a:9c",
                    "bmc": {
                        "address": "redfish-virtualmedia://192.168.111.1:8000/redfish/v1/Systems/node-0",
                        "credentials_name": "node-0-bmc-secret"
                    }
                },
                "wait_for": {"jsonpath": "{.status.provisioning.state}", "value": "available", "timeout": "5m"}
            }),
        )
    }
}
