//! Utility functions for crd-provider

use anyhow::{anyhow, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Ensure a directory exists, creating it if necessary
pub fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    } else if !path.is_dir() {
        return Err(anyhow!("Path exists but is not a directory: {:?}", path));
    }
    Ok(())
}

/// Get the XDG config directory for crd-provider
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow!("Could not determine config directory"))?
        .join("crd-provider");

    Ok(config_dir)
}

/// Find all YAML files in a directory recursively
pub fn find_yaml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(anyhow!("Not a directory: {:?}", dir));
    }

    let mut yaml_files = Vec::new();

    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        if let Some(ext) = path.extension() {
            if ext == "yaml" || ext == "yml" {
                yaml_files.push(path.to_path_buf());
            }
        }
    }

    Ok(yaml_files)
}

/// Convert a type name to a valid filename
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Format duration as human readable string
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs > 0 {
        format!("{secs}.{millis:03}s")
    } else {
        format!("{millis}ms")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("host.yaml"), "host.yaml");
        assert_eq!(sanitize_filename("metal3/node-0.yaml"), "metal3_node-0.yaml");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.500s");
    }

    #[test]
    fn test_find_yaml_files() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("metal3");
        ensure_directory(&nested).unwrap();

        fs::write(temp_dir.path().join("druid.yaml"), "kind: A").unwrap();
        fs::write(nested.join("bmh.yml"), "kind: B").unwrap();
        fs::write(nested.join("README.md"), "docs").unwrap();

        let files = find_yaml_files(temp_dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().is_some_and(|e| e != "md")));
    }

    #[test]
    fn test_ensure_directory_rejects_files() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("config.yaml");
        fs::write(&file, "version: \"1.0\"").unwrap();
        assert!(ensure_directory(&file).is_err());
    }
}
