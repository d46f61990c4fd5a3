//! Command runners.

pub mod analyze;
pub mod check;
pub mod outputs;
