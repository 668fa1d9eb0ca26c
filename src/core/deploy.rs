use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// A group of project files destined for one standard system config
/// directory, carrying the install-time dependency that directory implies.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfigFiles {
    /// Paths relative to the build directory.
    pub files: Vec<String>,
    /// Target directory within the package.
    pub target_dir: String,
    pub dependencies: Vec<String>,
}

impl ConfigFiles {
    pub fn nginx(files: Vec<String>) -> Self {
        Self {
            files,
            target_dir: "etc/nginx/sites-enabled".to_string(),
            dependencies: vec!["nginx-light".to_string()],
        }
    }

    pub fn supervisor(files: Vec<String>) -> Self {
        Self {
            files,
            target_dir: "etc/supervisor/conf.d".to_string(),
            dependencies: vec!["supervisor".to_string()],
        }
    }
}

/// Resolved build/package preferences for one project, typically loaded
/// from the project's `.deploy.yaml` file. Immutable after construction;
/// `override_with` returns a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deploy {
    pub name: Option<String>,
    pub buildscript: Option<String>,
    pub postinstall: Option<String>,
    pub config_files: Vec<ConfigFiles>,
    pub pip: Vec<String>,
    pub dependencies: Vec<String>,
    pub virtualenv_prefix: Option<String>,
    pub allow_broken_build: bool,
    pub user: Option<String>,
    pub version: Option<String>,
}

/// On-disk shape of the deploy file. The `nginx` and `supervisor` keys are
/// shorthand that expand into [`ConfigFiles`] groups.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeployFile {
    name: Option<String>,
    buildscript: Option<String>,
    postinstall: Option<String>,
    pip: Vec<String>,
    dependencies: Vec<String>,
    virtualenv_prefix: Option<String>,
    allow_broken_build: bool,
    user: Option<String>,
    version: Option<String>,
    nginx: Vec<String>,
    supervisor: Vec<String>,
}

/// Partial update applied over a base [`Deploy`]. An unrecognized key is a
/// configuration error before any value applies.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployOverrides {
    pub name: Option<String>,
    pub buildscript: Option<String>,
    pub postinstall: Option<String>,
    pub config_files: Option<Vec<ConfigFiles>>,
    pub pip: Option<Vec<String>>,
    pub dependencies: Option<Vec<String>>,
    pub virtualenv_prefix: Option<String>,
    pub allow_broken_build: Option<bool>,
    pub user: Option<String>,
    pub version: Option<String>,
}

impl DeployOverrides {
    /// Parse a keyed override map. Unknown keys fail with a configuration
    /// error naming the offending key.
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yml::from_str(text).map_err(|e| Error::Config(format!("Invalid override: {}", e)))
    }
}

impl Deploy {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read deploy file {}: {}", path.display(), e))
        })?;
        let parsed: DeployFile = serde_yml::from_str(&content).map_err(|e| {
            Error::Config(format!("Malformed deploy file {}: {}", path.display(), e))
        })?;

        let mut config_files = Vec::new();
        if !parsed.nginx.is_empty() {
            config_files.push(ConfigFiles::nginx(parsed.nginx));
        }
        if !parsed.supervisor.is_empty() {
            config_files.push(ConfigFiles::supervisor(parsed.supervisor));
        }

        Ok(Deploy {
            name: parsed.name,
            buildscript: parsed.buildscript,
            postinstall: parsed.postinstall,
            config_files,
            pip: parsed.pip,
            dependencies: parsed.dependencies,
            virtualenv_prefix: parsed.virtualenv_prefix,
            allow_broken_build: parsed.allow_broken_build,
            user: parsed.user,
            version: parsed.version,
        })
    }

    /// Return a new Deploy with the supplied override values applied.
    /// Values the overrides leave as None are kept from the base.
    pub fn override_with(&self, overrides: &DeployOverrides) -> Deploy {
        Deploy {
            name: overrides.name.clone().or_else(|| self.name.clone()),
            buildscript: overrides
                .buildscript
                .clone()
                .or_else(|| self.buildscript.clone()),
            postinstall: overrides
                .postinstall
                .clone()
                .or_else(|| self.postinstall.clone()),
            config_files: overrides
                .config_files
                .clone()
                .unwrap_or_else(|| self.config_files.clone()),
            pip: overrides.pip.clone().unwrap_or_else(|| self.pip.clone()),
            dependencies: overrides
                .dependencies
                .clone()
                .unwrap_or_else(|| self.dependencies.clone()),
            virtualenv_prefix: overrides
                .virtualenv_prefix
                .clone()
                .or_else(|| self.virtualenv_prefix.clone()),
            allow_broken_build: overrides
                .allow_broken_build
                .unwrap_or(self.allow_broken_build),
            user: overrides.user.clone().or_else(|| self.user.clone()),
            version: overrides.version.clone().or_else(|| self.version.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_deploy_file(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".deploy.yaml");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn default_deploy_is_empty() {
        let deploy = Deploy::default();
        assert!(deploy.name.is_none());
        assert!(deploy.config_files.is_empty());
        assert!(deploy.pip.is_empty());
        assert!(deploy.dependencies.is_empty());
        assert!(!deploy.allow_broken_build);
        assert!(deploy.version.is_none());
    }

    #[test]
    fn parses_all_recognized_keys() {
        let (_dir, path) = write_deploy_file(
            "name: myapp\n\
             buildscript: scripts/build.sh\n\
             postinstall: scripts/post.sh\n\
             pip:\n  - requests\n  - flask\n\
             dependencies:\n  - g++\n\
             virtualenv_prefix: myapp\n\
             allow_broken_build: true\n\
             user: www-data\n\
             version: '1.2'\n",
        );
        let deploy = Deploy::from_file(&path).unwrap();
        assert_eq!(deploy.name.as_deref(), Some("myapp"));
        assert_eq!(deploy.buildscript.as_deref(), Some("scripts/build.sh"));
        assert_eq!(deploy.postinstall.as_deref(), Some("scripts/post.sh"));
        assert_eq!(deploy.pip, vec!["requests", "flask"]);
        assert_eq!(deploy.dependencies, vec!["g++"]);
        assert_eq!(deploy.virtualenv_prefix.as_deref(), Some("myapp"));
        assert!(deploy.allow_broken_build);
        assert_eq!(deploy.user.as_deref(), Some("www-data"));
        assert_eq!(deploy.version.as_deref(), Some("1.2"));
    }

    #[test]
    fn nginx_and_supervisor_keys_expand_into_config_file_groups() {
        let (_dir, path) = write_deploy_file(
            "nginx:\n  - config/site.conf\nsupervisor:\n  - config/worker.conf\n",
        );
        let deploy = Deploy::from_file(&path).unwrap();
        assert_eq!(
            deploy.config_files,
            vec![
                ConfigFiles::nginx(vec!["config/site.conf".to_string()]),
                ConfigFiles::supervisor(vec!["config/worker.conf".to_string()]),
            ]
        );
        assert_eq!(deploy.config_files[0].target_dir, "etc/nginx/sites-enabled");
        assert_eq!(deploy.config_files[0].dependencies, vec!["nginx-light"]);
        assert_eq!(deploy.config_files[1].target_dir, "etc/supervisor/conf.d");
        assert_eq!(deploy.config_files[1].dependencies, vec!["supervisor"]);
    }

    #[test]
    fn absent_keys_fall_back_to_defaults() {
        let (_dir, path) = write_deploy_file("name: minimal\n");
        let deploy = Deploy::from_file(&path).unwrap();
        assert_eq!(deploy.name.as_deref(), Some("minimal"));
        assert!(deploy.pip.is_empty());
        assert!(!deploy.allow_broken_build);
    }

    #[test]
    fn malformed_yaml_is_a_config_error() {
        let (_dir, path) = write_deploy_file("name: [unclosed\n");
        let err = Deploy::from_file(&path).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[test]
    fn override_replaces_only_supplied_values() {
        let base = Deploy {
            name: Some("base".to_string()),
            version: Some("1.0".to_string()),
            pip: vec!["requests".to_string()],
            ..Deploy::default()
        };
        let overrides = DeployOverrides {
            name: Some("override".to_string()),
            ..DeployOverrides::default()
        };

        let result = base.override_with(&overrides);
        assert_eq!(result.name.as_deref(), Some("override"));
        assert_eq!(result.version.as_deref(), Some("1.0"));
        assert_eq!(result.pip, vec!["requests"]);
        // the base is untouched
        assert_eq!(base.name.as_deref(), Some("base"));
    }

    #[test]
    fn override_is_pure() {
        let base = Deploy {
            name: Some("app".to_string()),
            allow_broken_build: false,
            ..Deploy::default()
        };
        let before = base.clone();
        let overrides = DeployOverrides {
            allow_broken_build: Some(true),
            version: Some("0.7".to_string()),
            ..DeployOverrides::default()
        };

        let result = base.override_with(&overrides);
        assert!(result.allow_broken_build);
        assert_eq!(result.version.as_deref(), Some("0.7"));
        assert_eq!(base, before);
    }

    #[test]
    fn unknown_override_key_is_rejected_by_name() {
        let err = DeployOverrides::from_yaml("bogus_key: 1\n").unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
        assert!(err.to_string().contains("bogus_key"));
    }

    #[test]
    fn recognized_override_keys_parse() {
        let overrides = DeployOverrides::from_yaml("name: cli-name\nversion: '0.3'\n").unwrap();
        assert_eq!(overrides.name.as_deref(), Some("cli-name"));
        assert_eq!(overrides.version.as_deref(), Some("0.3"));
    }
}
