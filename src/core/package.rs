use std::path::PathBuf;

use crate::deploy::Deploy;
use crate::deploy_type::DeployType;
use crate::error::{Error, Result};
use crate::logger::Logger;
use crate::utils::command;
use crate::workspace::Workspace;

/// Native package format to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageTarget {
    Deb,
    Rpm,
}

impl PackageTarget {
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag {
            "deb" => Ok(PackageTarget::Deb),
            "rpm" => Ok(PackageTarget::Rpm),
            other => Err(Error::Config(format!("Unknown package format '{}'", other))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PackageTarget::Deb => "deb",
            PackageTarget::Rpm => "rpm",
        }
    }

    /// Artifact file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

/// Packages the staged workspace and signs the resulting artifacts.
pub struct Package<'a> {
    workspace: &'a Workspace<'a>,
    deploy: &'a Deploy,
    deploy_type: DeployType,
    target: PackageTarget,
    gpg_key: Option<String>,
    pub sign: bool,
    pub debug: bool,
    log: &'a dyn Logger,
}

impl<'a> Package<'a> {
    pub fn new(
        workspace: &'a Workspace<'a>,
        deploy: &'a Deploy,
        deploy_type: DeployType,
        target: PackageTarget,
        gpg_key: Option<String>,
        log: &'a dyn Logger,
    ) -> Self {
        Self {
            workspace,
            deploy,
            deploy_type,
            target,
            gpg_key,
            sign: true,
            debug: false,
            log,
        }
    }

    pub fn package(&self) -> Result<()> {
        self.run_fpm()?;
        self.sign_artifacts()
    }

    /// The full fpm invocation for this run.
    pub fn fpm_args(&self) -> Result<Vec<String>> {
        let package_dir = self.workspace.package_dir().display().to_string();

        let mut args = vec![
            "-C".to_string(),
            package_dir.clone(),
            "-p".to_string(),
            package_dir,
            "-s".to_string(),
            self.deploy_type.source_type().to_string(),
            "-t".to_string(),
            self.target.as_str().to_string(),
            "-a".to_string(),
            "amd64".to_string(),
            "-n".to_string(),
            self.deploy.name.clone().unwrap_or_default(),
            "--after-install".to_string(),
            self.workspace.path("postinstall.sh").display().to_string(),
        ];

        if !self.deploy_type.provides_version() {
            args.push("-v".to_string());
            args.push(self.deploy.version.clone().unwrap_or_default());
        }

        for dep in self.all_dependencies() {
            args.push("-d".to_string());
            args.push(dep);
        }

        if let Some(user) = &self.deploy.user {
            args.push(format!("--{}-user", self.target.as_str()));
            args.push(user.clone());
        }

        if self.debug {
            args.push("--debug".to_string());
        }

        args.extend(self.deploy_type.package_paths(self.workspace)?);
        Ok(args)
    }

    fn run_fpm(&self) -> Result<()> {
        self.log
            .log(&format!("Building .{} package", self.target.as_str()));

        let args = self.fpm_args()?;
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.log.debug(&format!("fpm {}", args.join(" ")));
        command::run("fpm", &arg_refs).map_err(|e| Error::Packaging(e.to_string()))?;

        self.log.log("Build completed successfully");
        Ok(())
    }

    /// Every package dependency, in aggregation order: the deploy file's
    /// own dependencies, then the deploy type's, then each config-file
    /// group's. Duplicates are kept; the packaging tool tolerates repeats.
    pub fn all_dependencies(&self) -> Vec<String> {
        let mut deps = self.deploy.dependencies.clone();
        deps.extend(self.deploy_type.dependencies().iter().map(|d| d.to_string()));
        for group in &self.deploy.config_files {
            deps.extend(group.dependencies.iter().cloned());
        }
        deps
    }

    /// The artifacts eligible for signing: every file directly under the
    /// package dir with the target format's extension.
    pub fn artifacts_to_sign(&self) -> Result<Vec<PathBuf>> {
        let mut artifacts: Vec<PathBuf> = std::fs::read_dir(self.workspace.package_dir())?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .map(|ext| ext == self.target.extension())
                        .unwrap_or(false)
            })
            .collect();
        artifacts.sort();
        Ok(artifacts)
    }

    /// Sign the built artifacts with the configured GPG key. Skipped when
    /// signing is disabled for the run; a missing key is a logged no-op.
    /// A signing failure is always fatal.
    pub fn sign_artifacts(&self) -> Result<()> {
        if !self.sign {
            self.log.log("Signing disabled for this run, skipping");
            return Ok(());
        }

        let Some(key) = &self.gpg_key else {
            self.log.log("No GPG key configured, skipping signing");
            return Ok(());
        };

        self.log.log("Signing package");
        for artifact in self.artifacts_to_sign()? {
            let path = artifact.display().to_string();
            command::run("dpkg-sig", &["-k", key, "--sign", "builder", &path])
                .map_err(|e| Error::Signing(e.to_string()))?;
        }
        Ok(())
    }
}
