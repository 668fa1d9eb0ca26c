use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to fetch repository: {0}")]
    Fetch(String),

    #[error("Failed to install dependencies: {0}")]
    Dependency(String),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("Build script failed: {0}")]
    BuildScript(String),

    #[error("Packaging failed: {0}")]
    Packaging(String),

    #[error("Signing failed: {0}")]
    Signing(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "CONFIG_ERROR",
            Error::Fetch(_) => "FETCH_ERROR",
            Error::Dependency(_) => "DEPENDENCY_ERROR",
            Error::Filesystem(_) => "FILESYSTEM_ERROR",
            Error::BuildScript(_) => "BUILD_SCRIPT_ERROR",
            Error::Packaging(_) => "PACKAGING_ERROR",
            Error::Signing(_) => "SIGNING_ERROR",
        }
    }
}
