use std::path::{Path, PathBuf};

/// Common paths inside a virtualenv.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenvPaths {
    pub root: PathBuf,
    pub bin: PathBuf,
    pub activate: PathBuf,
    pub pip: PathBuf,
    pub python: PathBuf,
}

impl VenvPaths {
    pub fn new(base: &Path, name: &str) -> Self {
        let root = base.join(name);
        let bin = root.join("bin");
        Self {
            activate: bin.join("activate"),
            pip: bin.join("pip"),
            python: bin.join("python"),
            root,
            bin,
        }
    }

    /// The build venv lives directly in the workspace root under `ve`.
    pub fn for_workspace(workspace_root: &Path) -> Self {
        Self::new(workspace_root, "ve")
    }
}
