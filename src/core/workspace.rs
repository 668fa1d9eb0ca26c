use std::fs;
use std::path::{Path, PathBuf};

use crate::deploy::Deploy;
use crate::error::{Error, Result};
use crate::logger::Logger;
use crate::repo::GitRepo;
use crate::utils::command;
use crate::utils::fs::rmtree_if_exists;

/// The directory tree for one build run.
///
/// Owns the workspace root and the four dependent directories, and fetches
/// the repository into it. The install dir is always nested under the
/// package dir so that staged files land at the configured install location
/// once the package is unpacked on a target machine.
pub struct Workspace<'a> {
    root: PathBuf,
    repo_dir: PathBuf,
    build_dir: PathBuf,
    package_dir: PathBuf,
    install_dir: PathBuf,
    pub repo: GitRepo,
    pub install_location: String,
    log: &'a dyn Logger,
}

impl<'a> Workspace<'a> {
    pub fn new(
        workspace_id: &str,
        workspace_base: &Path,
        install_location: &str,
        repo: GitRepo,
        log: &'a dyn Logger,
    ) -> Self {
        let root = workspace_base.join(workspace_id);
        let package_dir = root.join("package");
        let install_dir = package_dir.join(install_location.trim_start_matches('/'));
        Self {
            repo_dir: root.join(&repo.name),
            build_dir: root.join("build"),
            package_dir,
            install_dir,
            root,
            repo,
            install_location: install_location.to_string(),
            log,
        }
    }

    /// Create the workspace (or clean out a previous run's state) and fetch
    /// the repo.
    pub fn set_up(&self) -> Result<()> {
        self.create_clean_workspace()?;
        self.fetch_repo()
    }

    /// Create the workspace root if it doesn't exist, or clean it out.
    pub fn create_clean_workspace(&self) -> Result<()> {
        if self.root.exists() {
            self.clean_workspace()
        } else {
            fs::create_dir_all(&self.root)?;
            Ok(())
        }
    }

    /// Remove the repo, build, and package directories from a previous run.
    /// The root itself, the venv, and unrelated siblings are preserved.
    pub fn clean_workspace(&self) -> Result<()> {
        for dir in [&self.repo_dir, &self.build_dir, &self.package_dir] {
            rmtree_if_exists(dir)?;
        }
        Ok(())
    }

    /// Clone the repo and check out the desired branch.
    pub fn fetch_repo(&self) -> Result<()> {
        self.log.log("Fetching git repository");
        let repo_dir = self.repo_dir.to_string_lossy();
        self.log
            .debug(&format!("git clone {} {}", self.repo.url, repo_dir));
        command::run("git", &["clone", &self.repo.url, &repo_dir])
            .map_err(|e| Error::Fetch(e.to_string()))?;
        command::run("git", &["-C", &repo_dir, "checkout", &self.repo.branch])
            .map_err(|e| Error::Fetch(e.to_string()))?;
        Ok(())
    }

    /// Load the deploy file from the repo, falling back to defaults when the
    /// project doesn't carry one.
    pub fn load_deploy(&self, deploy_file: &str) -> Result<Deploy> {
        if !self.repo_dir.exists() {
            self.log
                .log("WARNING: Repo directory not found. Has it been fetched yet?");
        }

        let deploy_path = self.repo_path(deploy_file);
        if deploy_path.exists() {
            Deploy::from_file(&deploy_path)
        } else {
            self.log.log("No deploy file found, continuing with defaults");
            Ok(Deploy::default())
        }
    }

    /// Create the build directory. The workspace root must already exist.
    pub fn make_build_dir(&self) -> Result<()> {
        fs::create_dir(&self.build_dir)?;
        Ok(())
    }

    /// Create the package directory. The workspace root must already exist.
    pub fn make_package_dir(&self) -> Result<()> {
        fs::create_dir(&self.package_dir)?;
        Ok(())
    }

    /// Create the install directory, including every intermediate segment
    /// between it and the package directory. The package directory must
    /// already exist.
    pub fn make_install_dir(&self) -> Result<()> {
        let mut current = self.package_dir.clone();
        for part in Path::new(self.install_location.trim_start_matches('/')).components() {
            current.push(part);
            if !current.exists() {
                fs::create_dir(&current)?;
            }
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn package_dir(&self) -> &Path {
        &self.package_dir
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// A path within the workspace root. Pure join, no existence check.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// A path within the repo directory.
    pub fn repo_path(&self, rel: &str) -> PathBuf {
        self.repo_dir.join(rel)
    }

    /// A path within the build directory.
    pub fn build_path(&self, rel: &str) -> PathBuf {
        self.build_dir.join(rel)
    }

    /// A path within the package directory.
    pub fn package_path(&self, rel: &str) -> PathBuf {
        self.package_dir.join(rel)
    }

    /// A path within the install directory.
    pub fn install_path(&self, rel: &str) -> PathBuf {
        self.install_dir.join(rel)
    }
}
