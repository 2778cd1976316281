//! Binding layers and the per-call environment built from them.

use crate::values::{
    binder::{Binder, Error},
    dynamic::Value,
};

use std::collections::BTreeMap;
use std::sync::Arc;

/// Name under which per-call data is visible to expressions.
pub const PARAMS_NAME: &str = "params";

/// One immutable layer of named values (library, host globals or host
/// extensions). Cloning shares the underlying table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings(Arc<BTreeMap<String, Value>>);

impl Bindings {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Builder for one binding layer.
///
/// # Example
///
/// ```
/// use gridexpr_core::api::EnvironmentBuilder;
/// use gridexpr_core::values::{Binder, Value};
///
/// let globals = EnvironmentBuilder::new()
///     .bind("currency", Value::str("EUR"))
///     .bind("threshold", Value::Int(10))
///     .build()
///     .unwrap();
/// assert_eq!(globals.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct EnvironmentBuilder {
    entries: BTreeMap<String, Value>,
    duplicates: Vec<String>,
}

impl EnvironmentBuilder {
    /// Create a new environment builder.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Binder for EnvironmentBuilder {
    type Output = Bindings;

    /// Register a value (constant, function, or namespace record).
    ///
    /// Returns the builder for chaining. If a duplicate name is encountered,
    /// an error is stored and returned when `build()` is called.
    fn bind(mut self, name: &str, value: Value) -> Self {
        // Check if name already exists
        if self.entries.contains_key(name) {
            self.duplicates.push(name.to_string());
            return self;
        }

        self.entries.insert(name.to_string(), value);
        self
    }

    /// Returns an error if any registration failed (e.g. duplicates).
    fn build(mut self) -> Result<Bindings, Error> {
        if !self.duplicates.is_empty() {
            return Err(Error::DuplicateBinding(core::mem::take(
                &mut self.duplicates,
            )));
        }

        Ok(Bindings(Arc::new(self.entries)))
    }
}

/// The name-to-value mapping one evaluation runs against.
///
/// Layers are consulted from the most specific to the least: `params`, host
/// extensions, host globals, library. Static layers are borrowed, never copied.
#[derive(Debug, Clone)]
pub struct BindingEnvironment<'a> {
    params: Value,
    library: &'a Bindings,
    host_globals: &'a Bindings,
    host_extensions: &'a Bindings,
}

impl<'a> BindingEnvironment<'a> {
    pub fn build(
        params: Value,
        library: &'a Bindings,
        host_globals: &'a Bindings,
        host_extensions: &'a Bindings,
    ) -> Self {
        Self {
            params,
            library,
            host_globals,
            host_extensions,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        if name == PARAMS_NAME {
            return Some(&self.params);
        }
        self.host_extensions
            .get(name)
            .or_else(|| self.host_globals.get(name))
            .or_else(|| self.library.get(name))
    }

    pub fn params(&self) -> &Value {
        &self.params
    }
}
