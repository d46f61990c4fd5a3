//! GreenLight CLI library components.
//!
//! The command runners and report formatters behind the `greenlight` binary.
//! The binary itself is in `main.rs`.

pub mod cli;
pub mod formatters;

// Re-export core types for convenience
pub use greenlight_core::{CompatibilityReport, CompatibilityResult};
