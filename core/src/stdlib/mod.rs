//! gridexpr Standard Library
//!
//! Expressions see one library namespace, `d3`, a record holding:
//! - Number formatting: `format`
//! - Date formatting and parsing: `timeFormat`, `timeParse`, `utcFormat`,
//!   `utcParse`, `isoFormat`, `isoParse`
//! - Array helpers: `sum`, `count`, `mean`, `median`, `min`, `max`, `extent`,
//!   `range`, `ascending`, `descending`
//!
//! The namespace is built from native Rust functions and bound in the library
//! layer before any expression runs.

use crate::values::{Binder, RecordBuilder};

pub mod array;
pub mod date;
pub mod number;

// Re-export for convenience
pub use array::register_array_functions;
pub use date::register_date_functions;
pub use number::{FormatSpecifier, register_number_functions};

/// Name of the library namespace.
pub const D3_NAME: &str = "d3";

/// Creates the `d3` record and binds it to the Binder.
pub fn register_d3_package<B: Binder>(builder: B) -> B {
    let record = RecordBuilder::new();
    let record = register_number_functions(record);
    let record = register_date_functions(record);
    let record = register_array_functions(record);
    let record = record
        .build()
        .expect("duplicate binding in package - check function names");
    builder.bind(D3_NAME, record)
}

/// Register all standard library packages in the environment.
///
/// # Panics
///
/// Panics if there are duplicate bindings within a package. This indicates a bug
/// in the stdlib implementation (e.g., two functions with the same name).
pub fn register_stdlib<B: Binder>(env: B) -> B {
    register_d3_package(env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Engine, EngineOptions, EnvironmentBuilder};
    use crate::values::Value;

    #[test]
    fn test_register_stdlib() {
        let library = register_stdlib(EnvironmentBuilder::new()).build().unwrap();
        assert_eq!(library.names().collect::<Vec<_>>(), vec!["d3"]);

        let d3 = library.get("d3").unwrap().as_record().unwrap();
        for name in [
            "format",
            "timeFormat",
            "utcParse",
            "isoFormat",
            "sum",
            "extent",
            "ascending",
        ] {
            assert!(d3.contains_key(name), "d3.{name} should be registered");
        }
        assert!(d3.values().all(|value| value.as_function().is_some()));
    }

    #[test]
    fn test_packages_work_together() {
        let engine = Engine::new(EngineOptions::default());
        let params = Value::from(serde_json::json!({ "values": [0.25, 0.5] }));
        let result = engine
            .evaluate("d3.format('.0%')(d3.sum(params.values))", &params)
            .unwrap();
        assert_eq!(result, Value::str("75%"));
    }
}
