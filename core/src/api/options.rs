//! Engine, run and sanitization options.
//!
//! All option structs deserialize from partial input: missing fields keep
//! their defaults, so a host can ship `{ "cache_capacity": 64 }` alone.

use crate::evaluator::{DEFAULT_MAX_EVAL_DEPTH, EvaluatorOptions};
use crate::parser::DEFAULT_MAX_PARSE_DEPTH;
use serde::Deserialize;

/// Default number of distinct sources kept in the parse cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Engine-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Maximum nesting depth accepted by the parser.
    pub max_parse_depth: usize,
    /// Maximum number of parsed sources kept for reuse. `0` disables caching.
    pub cache_capacity: usize,
    /// Options applied to every run unless overridden.
    pub default_run_options: RunOptions,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_parse_depth: DEFAULT_MAX_PARSE_DEPTH,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            default_run_options: RunOptions::default(),
        }
    }
}

/// Per-run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    /// Maximum depth of nested nodes the evaluator descends into.
    pub max_depth: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_EVAL_DEPTH,
        }
    }
}

impl RunOptions {
    /// Replace every field set in `overrides`.
    pub fn override_with(&mut self, overrides: &RunOptionsOverride) {
        if let Some(max_depth) = overrides.max_depth {
            self.max_depth = max_depth;
        }
    }
}

impl From<&RunOptions> for EvaluatorOptions {
    fn from(options: &RunOptions) -> Self {
        EvaluatorOptions {
            max_depth: options.max_depth,
        }
    }
}

/// Partial [`RunOptions`]; `None` keeps the engine default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptionsOverride {
    pub max_depth: Option<usize>,
}

/// Options for one sanitization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SanitizeOptions {
    /// Lets restricted fields keep raw markup or code.
    pub allow_raw_code: bool,
}
