//! Safe expression evaluation and configuration sanitization for grid components.
//!
//! Configuration objects may carry expressions in string form (`"params.value > 10"`)
//! where a host grid expects a callback. This crate parses those expressions,
//! evaluates them against a controlled set of bindings, and rewrites grid
//! configuration so that only sanctioned callables reach the host.

pub mod api;
pub mod descriptor;
pub mod evaluator;
pub mod parser;
pub mod policy;
pub mod sanitizer;
pub mod stdlib;
pub mod style;
pub mod syntax;
pub mod values;

/// Test utilities for enabling logging in tests
#[cfg(test)]
pub mod test_utils {
    /// Initialize tracing subscriber for tests with DEBUG level
    /// Call this at the start of tests where you want to see logging output
    ///
    /// # Example
    /// ```ignore
    /// #[test]
    /// fn test_condition_logging() {
    ///     test_utils::init_test_logging();
    ///     // ... your test code
    /// }
    /// ```
    pub fn init_test_logging() {
        use tracing_subscriber::{EnvFilter, fmt};

        // Try to initialize, ignore error if already initialized
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }
}
