//! Public API for compiling and running configuration expressions.
//!
//! # Example
//!
//! ```
//! use gridexpr_core::api::{Engine, EngineOptions, EnvironmentBuilder};
//! use gridexpr_core::values::{Binder, Value};
//!
//! let globals = EnvironmentBuilder::new()
//!     .bind("PI", Value::Float(std::f64::consts::PI))
//!     .build()
//!     .unwrap();
//! let engine = Engine::with_host(EngineOptions::default(), globals, Default::default());
//!
//! // Compile expression
//! let expr = engine.compile("PI * 2").unwrap();
//!
//! // Execute
//! let result = expr.run(Default::default(), &Value::Null).unwrap();
//! assert!((result.as_number().unwrap() - 6.28318).abs() < 0.0001);
//! ```

pub mod engine;
pub mod environment;
pub mod error;
pub mod expression;
pub mod options;

pub use engine::Engine;
pub use environment::{BindingEnvironment, Bindings, EnvironmentBuilder, PARAMS_NAME};
pub use error::{Diagnostic, Error, RelatedInfo, Severity};
pub use expression::CompiledExpression;
pub use options::{EngineOptions, RunOptions, RunOptionsOverride, SanitizeOptions};
