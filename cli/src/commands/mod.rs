//! Command implementations.

pub mod eval;
pub mod sanitize;
pub mod style;
