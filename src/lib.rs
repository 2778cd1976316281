//! gridexpr - safe expressions for grid configuration
//!
//! # Overview
//!
//! Grid configuration shipped from a server (column definitions, row
//! rules, formatters) often needs small pieces of behaviour. Instead of raw
//! code, gridexpr lets those pieces travel as expression text:
//!
//! - value formatters: `d3.format(',.2f')(params.value)`
//! - class rules: `params.data.age > 30`
//! - conditional styles: `{ "styleConditions": [...], "defaultStyle": {...} }`
//!
//! Expressions see `params`, the `d3` helper package and whatever globals
//! the host registers. Nothing else is reachable.
//!
//! # Quick Start
//!
//! ```
//! use gridexpr::{Engine, EngineOptions, Value};
//!
//! let engine = Engine::new(EngineOptions::default());
//! let expr = engine.compile("d3.format(',.2f')(params.value)").unwrap();
//!
//! let params = Value::from(serde_json::json!({ "value": 1234.5 }));
//! assert_eq!(expr.run(Default::default(), &params).unwrap(), Value::str("1,234.50"));
//! ```
//!
//! # Sanitizing configuration
//!
//! ```
//! use gridexpr::{ConfigValue, Engine, EngineOptions, Sanitizer};
//!
//! let engine = Engine::new(EngineOptions::default());
//! let config: ConfigValue = serde_json::from_str(
//!     r#"{ "columnDefs": [{ "field": "a", "cellRenderer": "<b onclick=x()>" }] }"#,
//! )
//! .unwrap();
//!
//! let sanitized = Sanitizer::new(&engine).sanitize(&config, false);
//! assert_eq!(sanitized.diagnostics.len(), 1);
//! assert_eq!(sanitized.diagnostics[0].field, "columnDefs[0].cellRenderer");
//! ```
//!
//! # Host functions
//!
//! ```
//! use gridexpr::{Engine, EngineOptions, EnvironmentBuilder, Value};
//! use gridexpr::values::Binder;
//!
//! let extensions = EnvironmentBuilder::new()
//!     .bind("double", Value::native("double", |args| {
//!         Ok(Value::Float(args.first().and_then(Value::as_number).unwrap_or(0.0) * 2.0))
//!     }))
//!     .build()
//!     .unwrap();
//! let engine = Engine::with_host(EngineOptions::default(), Default::default(), extensions);
//!
//! let result = engine.evaluate("double(params)", &Value::Int(21)).unwrap();
//! assert_eq!(result, Value::Float(42.0));
//! ```

// Error rendering utilities
pub mod error_renderer;
pub use error_renderer::{CharSet, RenderConfig, render_error, render_error_to};

// Re-export public API from gridexpr_core
pub use gridexpr_core::api::{
    Bindings, CompiledExpression, Diagnostic, Engine, EngineOptions, EnvironmentBuilder, Error,
    RelatedInfo, RunOptions, RunOptionsOverride, SanitizeOptions, Severity,
};

pub use gridexpr_core::descriptor::{self, Callable, ConfigValue, FunctionDescriptor};
pub use gridexpr_core::policy::{self, Scope, SecurityClassification};
pub use gridexpr_core::sanitizer::{
    self, Diagnostic as FieldDiagnostic, DiagnosticReason, Sanitized, Sanitizer,
};
pub use gridexpr_core::style::{self, StyleRule, StyleRuleSet};
pub use gridexpr_core::values::{self, Function, NativeFunction, Value};

// Native functions fail with this error kind.
pub use gridexpr_core::evaluator::{ExecutionError, RuntimeError};
