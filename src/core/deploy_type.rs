use crate::deploy::Deploy;
use crate::error::Result;
use crate::utils::fs::list_dir_names;
use crate::venv::VenvPaths;
use crate::workspace::Workspace;

/// Packaging strategy for one deployment style.
///
/// A closed set: each variant fixes the packaging source semantics, the
/// install-time dependencies the style implies, and the scripting injected
/// around the user's postinstall script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployType {
    /// Package the staged directory tree as-is.
    Dir,
    /// Let the packaging tool build from the project's own setup.py.
    Python,
    /// Directory packaging plus a managed virtualenv on the target machine.
    Virtualenv,
}

impl DeployType {
    /// Select a variant by CLI tag. Unrecognized tags fall back to plain
    /// directory packaging.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "python" => DeployType::Python,
            "virtualenv" => DeployType::Virtualenv,
            _ => DeployType::Dir,
        }
    }

    /// The source-type tag handed to the packaging tool.
    pub fn source_type(&self) -> &'static str {
        match self {
            DeployType::Python => "python",
            DeployType::Dir | DeployType::Virtualenv => "dir",
        }
    }

    /// Install-time system dependencies implied by this deployment style.
    pub fn dependencies(&self) -> &'static [&'static str] {
        match self {
            DeployType::Virtualenv => &["python-virtualenv"],
            DeployType::Dir | DeployType::Python => &[],
        }
    }

    /// Whether the packaging tool derives the version from the source
    /// itself, in which case no explicit version is passed.
    pub fn provides_version(&self) -> bool {
        matches!(self, DeployType::Python)
    }

    /// Scripting injected before the user's postinstall script.
    pub fn preinstall_script(&self, workspace: &Workspace, deploy: &Deploy) -> String {
        match self {
            DeployType::Virtualenv => {
                let venv_name = match &deploy.virtualenv_prefix {
                    Some(prefix) => format!("{}-python", prefix),
                    None => "python".to_string(),
                };
                let install_location = std::path::Path::new(&workspace.install_location);
                let venv = VenvPaths::new(install_location, &venv_name);
                let frozen_requirements = install_location.join(format!(
                    "{}-requirements.pip",
                    deploy.name.as_deref().unwrap_or_default()
                ));

                format!(
                    "# Create and activate the virtualenv\n\
                     if [ ! -f {python} ]; then\n\
                     \x20   /usr/bin/virtualenv {venv}\n\
                     fi\n\
                     VENV={venv}\n\
                     source {activate}\n\
                     \n\
                     # Upgrade pip and re-install pip requirements\n\
                     {pip} install --upgrade pip\n\
                     {pip} install --upgrade -r {frozen}",
                    python = venv.python.display(),
                    venv = venv.root.display(),
                    activate = venv.activate.display(),
                    pip = venv.pip.display(),
                    frozen = frozen_requirements.display(),
                )
            }
            DeployType::Dir | DeployType::Python => String::new(),
        }
    }

    /// Scripting injected after the user's postinstall script.
    pub fn postinstall_script(&self) -> &'static str {
        match self {
            DeployType::Virtualenv => "deactivate",
            DeployType::Dir | DeployType::Python => "",
        }
    }

    /// The path arguments handed to the packaging tool. By default every
    /// entry currently staged in the package directory; the Python variant
    /// points the tool at the project's own manifest instead.
    pub fn package_paths(&self, workspace: &Workspace) -> Result<Vec<String>> {
        match self {
            DeployType::Python => Ok(vec![workspace
                .repo_path("setup.py")
                .to_string_lossy()
                .to_string()]),
            DeployType::Dir | DeployType::Virtualenv => {
                Ok(list_dir_names(workspace.package_dir())?)
            }
        }
    }
}
