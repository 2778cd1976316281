use crate::values::dynamic::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Duplicate binding for {}", quoted_list(.0))]
    DuplicateBinding(Vec<String>),
}

fn quoted_list(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("'{name}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A trait for types that can be built by binding names to values.
///
/// This provides a unified, fluent interface for constructing complex,
/// field-based values like records and binding layers.
pub trait Binder: Sized {
    /// The final, successfully built output type.
    type Output;

    /// Binds a name to a value in the builder.
    ///
    /// This method uses a fluent API, returning the builder to allow for chained calls.
    fn bind(self, name: &str, value: Value) -> Self;

    /// Finalizes the build process.
    ///
    /// This method consumes the builder and returns the final constructed
    /// output or an error if the build fails.
    fn build(self) -> Result<Self::Output, Error>;
}

/// Builds a record value, rejecting duplicate field names.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    fields: BTreeMap<String, Value>,
    duplicates: Vec<String>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Binder for RecordBuilder {
    type Output = Value;

    fn bind(mut self, name: &str, value: Value) -> Self {
        if self.fields.contains_key(name) {
            self.duplicates.push(name.to_string());
            return self;
        }
        self.fields.insert(name.to_string(), value);
        self
    }

    fn build(self) -> Result<Value, Error> {
        if !self.duplicates.is_empty() {
            return Err(Error::DuplicateBinding(self.duplicates));
        }
        Ok(Value::Record(std::sync::Arc::new(self.fields)))
    }
}
