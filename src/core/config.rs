use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Site-wide configuration, typically loaded from `config.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub install_location: String,
    #[serde(default = "default_branch")]
    pub default_branch: String,
    #[serde(default = "default_workspace_base")]
    pub workspace_base: String,
    #[serde(default)]
    pub gpg_key: Option<String>,
}

fn default_branch() -> String {
    "develop".to_string()
}

fn default_workspace_base() -> String {
    "/workspace".to_string()
}

impl SiteConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        serde_yml::from_str(&content).map_err(|e| {
            Error::Config(format!("Malformed site config {}: {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn loads_full_config() {
        let (_dir, path) = write_config(
            "install_location: /srv/app\ndefault_branch: main\nworkspace_base: /tmp/ws\ngpg_key: ABC123\n",
        );
        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.install_location, "/srv/app");
        assert_eq!(config.default_branch, "main");
        assert_eq!(config.workspace_base, "/tmp/ws");
        assert_eq!(config.gpg_key.as_deref(), Some("ABC123"));
    }

    #[test]
    fn applies_defaults_for_optional_keys() {
        let (_dir, path) = write_config("install_location: /srv/app\n");
        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.default_branch, "develop");
        assert_eq!(config.workspace_base, "/workspace");
        assert!(config.gpg_key.is_none());
    }

    #[test]
    fn missing_install_location_is_a_config_error() {
        let (_dir, path) = write_config("default_branch: main\n");
        let err = SiteConfig::load(&path).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SiteConfig::load(&dir.path().join("absent.yaml")).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }
}
