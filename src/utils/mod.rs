//! Generic utility primitives with zero domain knowledge.
//!
//! - `command` - Command execution with error handling
//! - `fs` - Filesystem helpers (recursive copy/remove)

pub mod command;
pub mod fs;
