//! Configuration tests

use super::*;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[test]
fn test_config_serialization() {
    let config = Config::example();
    let yaml = serde_yaml::to_string(&config).unwrap();
    let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(config.version, parsed.version);
    assert_eq!(config.resources, parsed.resources);
    assert_eq!(config.provider, parsed.provider);
}

#[test]
fn test_config_from_file() {
    let config = Config::example();

    let temp_file = NamedTempFile::new().unwrap();
    config
        .save_to_file(&temp_file.path().to_path_buf())
        .unwrap();

    let loaded = Config::from_file(&temp_file.path().to_path_buf()).unwrap();
    assert_eq!(config.version, loaded.version);
    assert_eq!(loaded.crd_sources.len(), 1);
    assert_eq!(loaded.manifests[0].config["spec"]["cluster_config"]["metadata_storage_database"]["port"], 5432);
}

#[test]
fn test_minimal_config() {
    let config: Config = serde_yaml::from_str("version: \"1.0\"\n").unwrap();
    assert!(config.validate().is_ok());
    assert!(!config.provider.offline);
    assert!(config.resources.is_empty());
}

#[test]
fn test_config_validation() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.version = "2.0".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::example();
    config.crd_sources.push(config.crd_sources[0].clone());
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.resources.push(Declaration::new("k8s_example_com_widget_v1", serde_json::json!([])));
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.provider.field_manager = Some(" ".to_string());
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_filter_is_rejected() {
    let source = CrdSource {
        name: "broken".to_string(),
        path: PathBuf::from("./crds"),
        filters: vec!["metal3.io/[".to_string()],
        resources: false,
    };
    assert!(source.validate().is_err());
}

#[test]
fn test_kubeconfig_expansion() {
    std::env::set_var("CRD_PROVIDER_TEST_KUBE_DIR", "/tmp/kube");
    let settings = ProviderSettings {
        kubeconfig: Some("$CRD_PROVIDER_TEST_KUBE_DIR/config".to_string()),
        ..Default::default()
    };
    assert_eq!(
        settings.kubeconfig_path().unwrap(),
        Some(PathBuf::from("/tmp/kube/config"))
    );
    assert_eq!(ProviderSettings::default().kubeconfig_path().unwrap(), None);
}

#[test]
fn test_relative_source_paths_follow_config_file() {
    let mut config = Config::example();
    config.resolve_paths(Path::new("/etc/crd-provider/config.yaml"));
    assert_eq!(
        config.crd_sources[0].path,
        PathBuf::from("/etc/crd-provider/./crds/metal3")
    );
}

#[test]
fn test_declaration_label() {
    let declaration = Declaration::example_bare_metal_host();
    assert_eq!(
        declaration.label(),
        "k8s_metal3_io_bare_metal_host_v1alpha1 metal3/node-0"
    );
}
