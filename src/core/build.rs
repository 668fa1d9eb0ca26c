use std::env;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::deploy::Deploy;
use crate::deploy_type::DeployType;
use crate::error::{Error, Result};
use crate::logger::Logger;
use crate::utils::command;
use crate::utils::fs::{copy_tree, list_dir_names};
use crate::venv::VenvPaths;
use crate::workspace::Workspace;

/// Builds the workspace: gets everything into a state that is ready for
/// packaging.
pub struct Build<'a> {
    workspace: &'a Workspace<'a>,
    deploy: &'a Deploy,
    deploy_type: DeployType,
    venv: VenvPaths,
    log: &'a dyn Logger,
}

impl<'a> Build<'a> {
    pub fn new(
        workspace: &'a Workspace<'a>,
        deploy: &'a Deploy,
        deploy_type: DeployType,
        log: &'a dyn Logger,
    ) -> Self {
        Self {
            venv: VenvPaths::for_workspace(workspace.root()),
            workspace,
            deploy,
            deploy_type,
            log,
        }
    }

    pub fn build(&self) -> Result<()> {
        self.prepare_environment()?;
        self.run_buildscript()?;
        self.copy_files()?;
        self.freeze_virtualenv()?;
        self.create_postinstall_script()
    }

    /// Create the build virtualenv and the build directory.
    pub fn prepare_environment(&self) -> Result<()> {
        self.create_build_virtualenv()?;
        self.workspace.make_build_dir()
    }

    fn create_build_virtualenv(&self) -> Result<()> {
        self.log.log("Creating virtualenv");

        // Reuse the venv from a previous run if its python is still there
        if !self.venv.python.exists() {
            command::run("virtualenv", &[&self.venv.root.to_string_lossy()])
                .map_err(|e| Error::Dependency(e.to_string()))?;
        }

        let pip = self.venv.pip.to_string_lossy();

        self.log.log("Upgrading pip");
        command::run(&pip, &["install", "--upgrade", "pip"])
            .map_err(|e| Error::Dependency(e.to_string()))?;

        self.log.log("Installing pip dependencies");
        for dep in &self.deploy.pip {
            self.log.log(&format!("Installing {}", dep));
            command::run(&pip, &["install", "--upgrade", dep])
                .map_err(|e| Error::Dependency(e.to_string()))?;
        }
        Ok(())
    }

    /// The environment handed to the build script. Passed explicitly to the
    /// child process; the parent environment is never mutated, so multiple
    /// pipeline runs in one process cannot interfere with each other.
    pub fn build_env(&self) -> Vec<(String, String)> {
        let path = format!(
            "{}:{}",
            self.venv.bin.display(),
            env::var("PATH").unwrap_or_default()
        );
        vec![
            ("VENV".to_string(), self.venv.root.display().to_string()),
            ("PIP".to_string(), self.venv.pip.display().to_string()),
            ("REPO".to_string(), self.workspace.repo.name.clone()),
            ("BRANCH".to_string(), self.workspace.repo.branch.clone()),
            (
                "WORKSPACE".to_string(),
                self.workspace.root().display().to_string(),
            ),
            (
                "BUILDDIR".to_string(),
                self.workspace.build_dir().display().to_string(),
            ),
            (
                "INSTALLDIR".to_string(),
                self.workspace.install_dir().display().to_string(),
            ),
            (
                "NAME".to_string(),
                self.deploy.name.clone().unwrap_or_default(),
            ),
            ("PATH".to_string(), path),
        ]
    }

    /// Run the project's build script if one is configured.
    pub fn run_buildscript(&self) -> Result<()> {
        let Some(buildscript) = &self.deploy.buildscript else {
            return Ok(());
        };

        let script_path = self.workspace.repo_path(buildscript);
        fs::set_permissions(&script_path, fs::Permissions::from_mode(0o755))?;

        self.log.log(&format!("Running build script {}", buildscript));
        let output = command::capture_in(
            self.workspace.root(),
            &self.build_env(),
            &script_path.to_string_lossy(),
            &[],
        )?;

        if !output.success {
            if self.deploy.allow_broken_build {
                self.log.log(&format!(
                    "WARNING: Build script failed (exit {}), continuing: {}",
                    output.exit_code,
                    output.error_text()
                ));
                return Ok(());
            }
            return Err(Error::BuildScript(format!(
                "exit {}: {}",
                output.exit_code,
                output.error_text()
            )));
        }
        Ok(())
    }

    /// Copy the build output and the nginx/supervisor config files into the
    /// package staging layout.
    pub fn copy_files(&self) -> Result<()> {
        self.log.log("Preparing package");
        self.workspace.make_package_dir()?;
        self.copy_build()?;
        self.copy_config_files()
    }

    fn copy_build(&self) -> Result<()> {
        self.workspace.make_install_dir()?;

        for entry in list_dir_names(self.workspace.build_dir())? {
            copy_tree(
                &self.workspace.build_path(&entry),
                &self.workspace.install_path(&entry),
            )?;
        }
        Ok(())
    }

    fn copy_config_files(&self) -> Result<()> {
        for group in &self.deploy.config_files {
            let target_dir = self.workspace.package_path(&group.target_dir);
            fs::create_dir_all(&target_dir)?;

            for file in &group.files {
                let file_name = Path::new(file).file_name().ok_or_else(|| {
                    Error::Config(format!("Invalid config file path '{}'", file))
                })?;
                fs::copy(self.workspace.build_path(file), target_dir.join(file_name))?;
            }
        }
        Ok(())
    }

    /// Freeze the post-build pip requirements into the install dir. The
    /// output is written verbatim, not parsed.
    pub fn freeze_virtualenv(&self) -> Result<()> {
        let frozen = command::run(&self.venv.pip.to_string_lossy(), &["freeze"])
            .map_err(|e| Error::Dependency(e.to_string()))?;

        let requirements_path = self.workspace.install_path(&format!(
            "{}-requirements.pip",
            self.deploy.name.as_deref().unwrap_or_default()
        ));
        fs::write(requirements_path, frozen)?;
        Ok(())
    }

    /// Generate the postinstall script and write it to the workspace root.
    pub fn create_postinstall_script(&self) -> Result<()> {
        let content = self.generate_postinstall_script()?;
        self.log.debug(&content);

        let postinstall_path = self.workspace.path("postinstall.sh");
        fs::write(&postinstall_path, &content)?;
        fs::set_permissions(&postinstall_path, fs::Permissions::from_mode(0o755))?;
        Ok(())
    }

    /// Compose the postinstall script: deploy-type set-up scripting, the
    /// resolved environment assignments, the user's postinstall script, and
    /// the deploy-type tear-down scripting. Byte-reproducible for fixed
    /// inputs.
    pub fn generate_postinstall_script(&self) -> Result<String> {
        self.log.log("Constructing postinstall script");

        let set_up = self
            .deploy_type
            .preinstall_script(self.workspace, self.deploy);
        let tear_down = self.deploy_type.postinstall_script();

        let user_postinstall = match &self.deploy.postinstall {
            Some(postinstall) => fs::read_to_string(self.workspace.repo_path(postinstall))?,
            None => String::new(),
        };

        Ok(format!(
            "#!/bin/bash\n\n{set_up}\n\nINSTALLDIR={installdir}\nREPO={repo}\nBRANCH={branch}\nNAME={name}\n\n{user_postinstall}\n\n{tear_down}\n",
            set_up = set_up,
            installdir = self.workspace.install_dir().display(),
            repo = self.workspace.repo.name,
            branch = self.workspace.repo.branch,
            name = self.deploy.name.as_deref().unwrap_or_default(),
            user_postinstall = user_postinstall,
            tear_down = tear_down,
        ))
    }
}
