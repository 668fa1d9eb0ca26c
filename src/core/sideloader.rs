use std::path::Path;

use crate::build::Build;
use crate::config::SiteConfig;
use crate::deploy::DeployOverrides;
use crate::deploy_type::DeployType;
use crate::error::Result;
use crate::logger::Logger;
use crate::package::{Package, PackageTarget};
use crate::repo::GitRepo;
use crate::workspace::Workspace;

/// Per-run settings that come from the command line rather than from the
/// site config or the repository's deploy file.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub deploy_file: String,
    pub deploy_type: String,
    pub target: String,
    pub build_number: Option<u32>,
    pub sign: bool,
    pub debug: bool,
    pub overrides: DeployOverrides,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            deploy_file: ".deploy.yaml".to_string(),
            deploy_type: "virtualenv".to_string(),
            target: "deb".to_string(),
            build_number: None,
            sign: true,
            debug: false,
            overrides: DeployOverrides::default(),
        }
    }
}

/// Drives a full run: fetch, build, package, sign.
pub struct Sideloader<'a> {
    config: SiteConfig,
    repo: GitRepo,
    workspace_id: String,
    log: &'a dyn Logger,
}

impl std::fmt::Debug for Sideloader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sideloader")
            .field("config", &self.config)
            .field("repo", &self.repo)
            .field("workspace_id", &self.workspace_id)
            .finish_non_exhaustive()
    }
}

impl<'a> Sideloader<'a> {
    pub fn new(
        config: SiteConfig,
        repo_url: &str,
        branch: Option<String>,
        workspace_id: Option<String>,
        log: &'a dyn Logger,
    ) -> Result<Self> {
        let branch = branch.unwrap_or_else(|| config.default_branch.clone());
        let repo = GitRepo::from_url(repo_url, &branch)?;
        let workspace_id = workspace_id.unwrap_or_else(|| repo.name.clone());

        Ok(Self {
            config,
            repo,
            workspace_id,
            log,
        })
    }

    pub fn repo(&self) -> &GitRepo {
        &self.repo
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }

    pub fn run(&self, options: &RunOptions) -> Result<()> {
        let workspace = Workspace::new(
            &self.workspace_id,
            Path::new(&self.config.workspace_base),
            &self.config.install_location,
            self.repo.clone(),
            self.log,
        );

        workspace.set_up()?;

        let mut deploy = workspace
            .load_deploy(&options.deploy_file)?
            .override_with(&options.overrides);
        if deploy.name.is_none() {
            deploy.name = Some(self.repo.name.clone());
        }
        if deploy.version.is_none() {
            deploy.version = Some(format!("0.{}", options.build_number.unwrap_or(1)));
        }

        let deploy_type = DeployType::from_tag(&options.deploy_type);
        Build::new(&workspace, &deploy, deploy_type, self.log).build()?;

        let target = PackageTarget::from_tag(&options.target)?;
        let mut package = Package::new(
            &workspace,
            &deploy,
            deploy_type,
            target,
            self.config.gpg_key.clone(),
            self.log,
        );
        package.sign = options.sign;
        package.debug = options.debug;
        package.package()
    }
}
