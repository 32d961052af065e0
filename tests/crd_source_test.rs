use crd_provider::{
    Config, CrdKind, CrdProvider, CrdSource, InMemoryObjectApi, ObjectApi, ObjectKey,
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const GADGET_CRD: &str = r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: gadgets.example.com
spec:
  group: example.com
  names:
    kind: Gadget
    plural: gadgets
  scope: Namespaced
  versions:
    - name: v1
      served: true
      storage: true
      schema:
        openAPIV3Schema:
          type: object
          properties:
            spec:
              type: object
              required: [color]
              properties:
                color:
                  type: string
                  enum: [red, blue]
                replicas:
                  type: integer
"#;

const OTHER_CRD: &str = r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: things.other.io
spec:
  group: other.io
  names:
    kind: Thing
    plural: things
  scope: Namespaced
  versions:
    - name: v1
      served: true
      storage: true
      schema:
        openAPIV3Schema:
          type: object
"#;

fn config_with_source(dir: &Path, resources: bool) -> Config {
    std::fs::write(dir.join("gadgets.yaml"), GADGET_CRD).unwrap();
    std::fs::write(dir.join("things.yml"), OTHER_CRD).unwrap();
    std::fs::write(dir.join("notes.txt"), "not a CRD").unwrap();

    let mut config = Config::default();
    config.crd_sources.push(CrdSource {
        name: "gadgets".to_string(),
        path: dir.to_path_buf(),
        filters: vec!["example.com/*".to_string()],
        resources,
    });
    config
}

/// A configuration each registered kind accepts
fn valid_config(kind: &str) -> Value {
    match kind {
        "DruidCluster" => Config::example().manifests[0].config.clone(),
        "BareMetalHost" => json!({
            "metadata": {"name": "node-0", "namespace": "metal3"},
            "spec": {
                "online": true,
                "bmc": {"address": "ipmi://192.168.111.1:6230", "credentials_name": "node-0-bmc-secret"}
            }
        }),
        "Gadget" => json!({"metadata": {"name": "g", "namespace": "default"}, "spec": {"color": "red"}}),
        other => panic!("no configuration for {other}"),
    }
}

fn with_foreign_type_fields(mut config: Value) -> Value {
    config["api_version"] = json!("example.com/v9");
    config["kind"] = json!("Other");
    config
}

#[tokio::test]
async fn test_type_fields_are_forced_for_every_kind() {
    let temp_dir = TempDir::new().unwrap();
    let provider = CrdProvider::new(config_with_source(temp_dir.path(), true))
        .unwrap()
        .with_client(Arc::new(InMemoryObjectApi::new()));
    let registry = provider.registry();

    let manifest_types = registry.manifest_types();
    assert_eq!(manifest_types.len(), 3);
    for type_name in manifest_types {
        let kind = registry.manifest(type_name).unwrap().kind();
        let config = with_foreign_type_fields(valid_config(kind.kind()));

        let state = provider.render_manifest(type_name, &config).unwrap();
        assert_eq!(state["api_version"], kind.api_version(), "{type_name}");
        assert_eq!(state["kind"], kind.kind(), "{type_name}");

        let yaml: Value = serde_yaml::from_str(state["yaml"].as_str().unwrap()).unwrap();
        assert_eq!(yaml["apiVersion"], kind.api_version(), "{type_name}");
        assert_eq!(yaml["kind"], kind.kind(), "{type_name}");
    }

    let resource_types = registry.resource_types();
    assert_eq!(resource_types.len(), 2);
    for type_name in resource_types {
        let kind = registry.resource(type_name).unwrap().kind();
        let config = with_foreign_type_fields(valid_config(kind.kind()));

        let state = provider.create_resource(type_name, &config).await.unwrap();
        assert_eq!(state["api_version"], kind.api_version(), "{type_name}");
        assert_eq!(state["kind"], kind.kind(), "{type_name}");
    }
}

#[test]
fn test_source_kinds_are_registered() {
    let temp_dir = TempDir::new().unwrap();
    let provider = CrdProvider::new(config_with_source(temp_dir.path(), true)).unwrap();
    let registry = provider.registry();

    assert!(registry.data_source("k8s_example_com_gadget_v1").is_ok());
    assert!(registry.manifest("k8s_example_com_gadget_v1_manifest").is_ok());
    assert!(registry.resource("k8s_example_com_gadget_v1").is_ok());
    assert!(registry.data_source("k8s_other_io_thing_v1").is_err());

    let diagnostics = registry.validate_schemas();
    assert!(diagnostics.is_empty(), "{diagnostics}");
}

#[test]
fn test_source_without_resources() {
    let temp_dir = TempDir::new().unwrap();
    let provider = CrdProvider::new(config_with_source(temp_dir.path(), false)).unwrap();

    assert!(provider.registry().data_source("k8s_example_com_gadget_v1").is_ok());
    assert!(provider.registry().resource("k8s_example_com_gadget_v1").is_err());
}

#[test]
fn test_missing_source_directory_fails() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.crd_sources.push(CrdSource {
        name: "missing".to_string(),
        path: temp_dir.path().join("missing"),
        filters: Vec::new(),
        resources: false,
    });

    assert!(CrdProvider::new(config).is_err());
}

#[test]
fn test_source_manifest_validates_enum() {
    let temp_dir = TempDir::new().unwrap();
    let provider = CrdProvider::new(config_with_source(temp_dir.path(), false)).unwrap();

    let state = provider
        .render_manifest(
            "k8s_example_com_gadget_v1_manifest",
            &json!({"metadata": {"name": "g", "namespace": "default"}, "spec": {"color": "red", "replicas": 2}}),
        )
        .unwrap();
    assert_eq!(state["kind"], "Gadget");
    assert!(state["yaml"].as_str().unwrap().contains("replicas: 2"));

    assert!(provider
        .render_manifest(
            "k8s_example_com_gadget_v1_manifest",
            &json!({"metadata": {"name": "g", "namespace": "default"}, "spec": {"color": "green"}}),
        )
        .is_err());
}

#[tokio::test]
async fn test_source_resource_applies() {
    let temp_dir = TempDir::new().unwrap();
    let api = Arc::new(InMemoryObjectApi::new());
    let provider = CrdProvider::new(config_with_source(temp_dir.path(), true))
        .unwrap()
        .with_client(api.clone());

    let state = provider
        .create_resource(
            "k8s_example_com_gadget_v1",
            &json!({"metadata": {"name": "g", "namespace": "default"}, "spec": {"color": "blue"}}),
        )
        .await
        .unwrap();
    assert_eq!(state["id"], "g/default");

    let key = ObjectKey {
        group: "example.com".to_string(),
        version: "v1".to_string(),
        kind: "Gadget".to_string(),
        plural: "gadgets".to_string(),
        namespace: Some("default".to_string()),
        name: "g".to_string(),
    };
    let stored = api.get(&key).await.unwrap();
    assert_eq!(stored["apiVersion"], "example.com/v1");
    assert_eq!(stored["spec"]["color"], "blue");
}

#[tokio::test]
async fn test_generate_writes_schema_files() {
    let temp_dir = TempDir::new().unwrap();
    let crds = temp_dir.path().join("crds");
    std::fs::create_dir_all(&crds).unwrap();

    let mut config = config_with_source(&crds, false);
    config.output.base_path = temp_dir.path().join("generated");
    let provider = CrdProvider::new(config).unwrap();

    let result = provider.generate().await.unwrap();
    assert_eq!(result.sources_processed, 1);
    assert_eq!(result.statistics.error_count, 0);
    assert_eq!(result.results[0].source_name, "gadgets");
    assert_eq!(result.results[0].kinds_generated, vec!["k8s_example_com_gadget_v1"]);

    let output = temp_dir.path().join("generated").join("gadgets");
    assert!(output.join("index.json").exists());
    assert!(output
        .join("example.com_v1")
        .join("k8s_example_com_gadget_v1.json")
        .exists());
}
