//! Shared engine setup.

use gridexpr::{Engine, EngineOptions};

/// Build the engine used by every command: the `d3` package, no host
/// globals and no host extensions.
pub fn build_engine() -> Engine {
    let engine = Engine::new(EngineOptions::default());
    tracing::debug!(?engine, "Engine ready");
    engine
}
