//! Compiled expressions.

use super::environment::{BindingEnvironment, Bindings};
use super::{Error, RunOptions, RunOptionsOverride};
use crate::evaluator::{Evaluator, EvaluatorOptions};
use crate::parser::ParsedExpr;
use crate::values::Value;
use std::sync::Arc;

/// A compiled expression ready for execution.
///
/// Compiled expressions share the parsed tree and the binding layers of the
/// engine that produced them, and can be executed any number of times with
/// different `params`.
///
/// # Example
///
/// ```
/// use gridexpr_core::api::{Engine, EngineOptions, RunOptionsOverride};
/// use gridexpr_core::values::Value;
///
/// let engine = Engine::new(EngineOptions::default());
/// let expr = engine.compile("params.a + params.b").unwrap();
///
/// let params = Value::from(serde_json::json!({ "a": 10, "b": 32 }));
/// assert_eq!(expr.run(Default::default(), &params).unwrap(), Value::Int(42));
///
/// // Override execution options (only specify max_depth)
/// let custom_opts = RunOptionsOverride { max_depth: Some(500) };
/// assert_eq!(expr.run(custom_opts, &params).unwrap(), Value::Int(42));
/// ```
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    /// The parsed tree, shared with the engine's cache
    parsed: Arc<ParsedExpr>,

    library: Bindings,
    host_globals: Bindings,
    host_extensions: Bindings,

    /// Default run-time options
    default_run_options: RunOptions,
}

impl CompiledExpression {
    /// Create a new compiled expression.
    ///
    /// This is called internally by Engine::compile().
    pub(crate) fn new(
        parsed: Arc<ParsedExpr>,
        library: Bindings,
        host_globals: Bindings,
        host_extensions: Bindings,
        default_run_options: RunOptions,
    ) -> Self {
        Self {
            parsed,
            library,
            host_globals,
            host_extensions,
            default_run_options,
        }
    }

    /// Execute the expression with `params` bound under the name `params`.
    ///
    /// # Returns
    ///
    /// The result value, or a runtime error.
    pub fn run(
        &self,
        options_override: RunOptionsOverride,
        params: &Value,
    ) -> Result<Value, Error> {
        // Merge execution options (defaults + provided)
        let mut run_options = self.default_run_options.clone();
        run_options.override_with(&options_override);

        let env = BindingEnvironment::build(
            params.clone(),
            &self.library,
            &self.host_globals,
            &self.host_extensions,
        );

        // Evaluate and convert errors to public Error type
        Evaluator::new(EvaluatorOptions::from(&run_options), &env)
            .eval(&self.parsed)
            .map_err(Error::from)
    }

    /// The source text this expression was compiled from.
    pub fn source(&self) -> &str {
        &self.parsed.source
    }

    pub fn parsed(&self) -> &ParsedExpr {
        &self.parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Engine, EngineOptions};

    #[test]
    fn test_run_options_override_applies() {
        let engine = Engine::new(EngineOptions::default());
        let expr = engine.compile("1 + 1 + 1 + 1").unwrap();

        let err = expr
            .run(RunOptionsOverride { max_depth: Some(1) }, &Value::Null)
            .unwrap_err();
        assert!(matches!(err, Error::Runtime { .. }));
        assert_eq!(
            expr.run(Default::default(), &Value::Null).unwrap(),
            Value::Int(4)
        );
    }

    #[test]
    fn test_source_is_kept() {
        let engine = Engine::new(EngineOptions::default());
        let expr = engine.compile("params.value > 10").unwrap();
        assert_eq!(expr.source(), "params.value > 10");
    }
}
