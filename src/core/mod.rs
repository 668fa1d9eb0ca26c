// Public modules
pub mod build;
pub mod config;
pub mod deploy;
pub mod deploy_type;
pub mod error;
pub mod logger;
pub mod package;
pub mod repo;
pub mod sideloader;
pub mod venv;
pub mod workspace;

// Re-export common types for convenience
pub use error::{Error, Result};
pub use logger::{Logger, StderrLogger};
