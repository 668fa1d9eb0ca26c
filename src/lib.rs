pub mod core;
pub mod utils;

// Re-export everything from core for ergonomic library use
// Callers can write `sideloader::workspace` instead of `sideloader::core::workspace`
pub use crate::core::*;
pub use crate::utils::*;
