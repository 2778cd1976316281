//! The gridexpr compilation engine.

use super::environment::{Bindings, EnvironmentBuilder};
use super::{CompiledExpression, EngineOptions, Error};
use crate::parser::{self, ParseError, ParsedExpr};
use crate::stdlib::register_stdlib;
use crate::values::{Binder, Value};
use hashbrown::HashMap;
use std::sync::{Arc, Mutex};

/// The compilation and execution engine.
///
/// The engine manages:
/// - Runtime configuration (EngineOptions)
/// - The library layer (`d3` formatting, date and array helpers)
/// - Host globals and host extensions, passed in explicitly
/// - A cache of parsed expressions keyed by source text
///
/// An engine is `Send + Sync`; compiled expressions hold shared handles to
/// its layers and stay valid after the engine is dropped.
///
/// # Example
///
/// ```
/// use gridexpr_core::api::{Engine, EngineOptions};
/// use gridexpr_core::values::Value;
///
/// let engine = Engine::new(EngineOptions::default());
/// let expr = engine.compile("params.value > 10").unwrap();
///
/// let params = Value::from(serde_json::json!({ "value": 15 }));
/// let result = expr.run(Default::default(), &params).unwrap();
/// assert_eq!(result, Value::Bool(true));
/// ```
pub struct Engine {
    options: EngineOptions,
    library: Bindings,
    host_globals: Bindings,
    host_extensions: Bindings,
    cache: Mutex<HashMap<String, Arc<ParsedExpr>>>,
}

impl Engine {
    /// Create an engine with the standard library and no host tables.
    pub fn new(options: EngineOptions) -> Self {
        Self::with_host(options, Bindings::empty(), Bindings::empty())
    }

    /// Create an engine with host-provided globals and extension functions.
    ///
    /// # Example
    ///
    /// ```
    /// use gridexpr_core::api::{Engine, EngineOptions, EnvironmentBuilder};
    /// use gridexpr_core::values::{Binder, Value};
    ///
    /// let globals = EnvironmentBuilder::new()
    ///     .bind("threshold", Value::Int(10))
    ///     .build()
    ///     .unwrap();
    /// let extensions = EnvironmentBuilder::new()
    ///     .bind("shout", Value::native("shout", |args| {
    ///         Ok(Value::str(args[0].to_string().to_uppercase()))
    ///     }))
    ///     .build()
    ///     .unwrap();
    ///
    /// let engine = Engine::with_host(EngineOptions::default(), globals, extensions);
    /// let params = Value::from(serde_json::json!({ "value": 12, "name": "hi" }));
    /// assert_eq!(
    ///     engine.evaluate("params.value > threshold ? shout(params.name) : ''", &params).unwrap(),
    ///     Value::str("HI"),
    /// );
    /// ```
    pub fn with_host(
        options: EngineOptions,
        host_globals: Bindings,
        host_extensions: Bindings,
    ) -> Self {
        let library = register_stdlib(EnvironmentBuilder::new())
            .build()
            .expect("standard library names should be unique");

        Self {
            options,
            library,
            host_globals,
            host_extensions,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Access the engine options.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn library(&self) -> &Bindings {
        &self.library
    }

    pub fn host_globals(&self) -> &Bindings {
        &self.host_globals
    }

    pub fn host_extensions(&self) -> &Bindings {
        &self.host_extensions
    }

    /// Parse `source`, reusing a cached tree for text seen before.
    ///
    /// Syntax errors are not cached.
    pub fn parse_cached(&self, source: &str) -> Result<Arc<ParsedExpr>, ParseError> {
        if self.options.cache_capacity == 0 {
            return parser::parse_with_max_depth(source, self.options.max_parse_depth).map(Arc::new);
        }

        if let Some(parsed) = self.lock_cache().get(source) {
            tracing::trace!(source, "Parse cache hit");
            return Ok(Arc::clone(parsed));
        }

        // Parse outside the lock; a concurrent parse of the same text is harmless.
        let parsed = Arc::new(parser::parse_with_max_depth(
            source,
            self.options.max_parse_depth,
        )?);

        let mut cache = self.lock_cache();
        if cache.len() >= self.options.cache_capacity {
            tracing::debug!(entries = cache.len(), "Parse cache full, clearing");
            cache.clear();
        }
        cache.insert(source.to_string(), Arc::clone(&parsed));
        Ok(parsed)
    }

    /// Number of parsed sources currently cached.
    pub fn cached_sources(&self) -> usize {
        self.lock_cache().len()
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<ParsedExpr>>> {
        // The cache only ever holds complete entries, so a poisoned lock is still usable.
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Compile an expression.
    ///
    /// # Returns
    ///
    /// A compiled expression ready for execution, or a compilation error.
    pub fn compile(&self, source: &str) -> Result<CompiledExpression, Error> {
        let parsed = self.parse_cached(source)?;
        Ok(CompiledExpression::new(
            parsed,
            self.library.clone(),
            self.host_globals.clone(),
            self.host_extensions.clone(),
            self.options.default_run_options.clone(),
        ))
    }

    /// Compile and run `source` once with the given `params`.
    pub fn evaluate(&self, source: &str, params: &Value) -> Result<Value, Error> {
        self.compile(source)?.run(Default::default(), params)
    }
}

impl core::fmt::Debug for Engine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Engine")
            .field("options", &self.options)
            .field("library", &self.library.names().collect::<Vec<_>>())
            .field("host_globals", &self.host_globals.names().collect::<Vec<_>>())
            .field(
                "host_extensions",
                &self.host_extensions.names().collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::RuntimeError;
    use serde_json::json;

    fn params(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
        assert_send_sync::<CompiledExpression>();
    }

    #[test]
    fn test_compile_and_run() {
        let engine = Engine::new(EngineOptions::default());
        let expr = engine.compile("params.value * 2").unwrap();
        assert_eq!(
            expr.run(Default::default(), &params(json!({ "value": 21 })))
                .unwrap(),
            Value::Int(42)
        );
        assert_eq!(
            expr.run(Default::default(), &params(json!({ "value": 1.5 })))
                .unwrap(),
            Value::Float(3.0)
        );
    }

    #[test]
    fn test_syntax_error_is_compilation_error() {
        let engine = Engine::new(EngineOptions::default());
        let err = engine.compile("params.value >").unwrap_err();
        assert!(matches!(err, Error::Compilation { .. }), "{err:?}");
        assert_eq!(engine.cached_sources(), 0);
    }

    #[test]
    fn test_runtime_error() {
        let engine = Engine::new(EngineOptions::default());
        let err = engine
            .evaluate("unknownVar + 1", &Value::Null)
            .unwrap_err();
        let Error::Runtime { diagnostic, source, .. } = err else {
            panic!("Expected runtime error");
        };
        assert_eq!(source, "unknownVar + 1");
        assert_eq!(
            diagnostic.message,
            RuntimeError::UnboundIdentifier {
                name: "unknownVar".to_string()
            }
            .to_string()
        );
    }

    #[test]
    fn test_parse_cache_reuses_trees() {
        let engine = Engine::new(EngineOptions::default());
        let a = engine.parse_cached("params.a + 1").unwrap();
        let b = engine.parse_cached("params.a + 1").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(engine.cached_sources(), 1);
    }

    #[test]
    fn test_parse_cache_clears_when_full() {
        let engine = Engine::new(EngineOptions {
            cache_capacity: 2,
            ..Default::default()
        });
        engine.parse_cached("1").unwrap();
        engine.parse_cached("2").unwrap();
        assert_eq!(engine.cached_sources(), 2);
        engine.parse_cached("3").unwrap();
        assert_eq!(engine.cached_sources(), 1);
    }

    #[test]
    fn test_cache_disabled() {
        let engine = Engine::new(EngineOptions {
            cache_capacity: 0,
            ..Default::default()
        });
        let a = engine.parse_cached("1 + 1").unwrap();
        let b = engine.parse_cached("1 + 1").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a, b);
        assert_eq!(engine.cached_sources(), 0);
    }

    #[test]
    fn test_max_parse_depth_option() {
        let engine = Engine::new(EngineOptions {
            max_parse_depth: 4,
            ..Default::default()
        });
        assert!(engine.compile("((((((1))))))").is_err());
        assert!(engine.compile("1").is_ok());
    }

    #[test]
    fn test_host_layers_and_params_precedence() {
        let globals = EnvironmentBuilder::new()
            .bind("label", Value::str("global"))
            .build()
            .unwrap();
        let extensions = EnvironmentBuilder::new()
            .bind("label", Value::str("extension"))
            .bind("params", Value::str("shadowed"))
            .build()
            .unwrap();
        let engine = Engine::with_host(EngineOptions::default(), globals, extensions);

        assert_eq!(
            engine.evaluate("label", &Value::Null).unwrap(),
            Value::str("extension")
        );
        assert_eq!(
            engine
                .evaluate("params.x", &params(json!({ "x": 1 })))
                .unwrap(),
            Value::Int(1)
        );
    }

    #[test]
    fn test_library_available() {
        let engine = Engine::new(EngineOptions::default());
        assert!(engine.library().get("d3").is_some());
    }
}
