//! Configuration trees and the function descriptors found inside them.
//!
//! A configuration field meant to hold behaviour can arrive in three shapes:
//! a trusted callable supplied by the host, a record `{"function": "<source>"}`
//! carrying expression text, or plain data. [`resolve`] tells them apart once,
//! and [`FunctionDescriptor::to_callable`] turns expression text into a
//! [`Callable`] backed by a compiled expression.

use crate::api::{Engine, Error};
use crate::values::Value;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Reserved key marking a record as serialized expression source.
pub const FUNCTION_KEY: &str = "function";

/// How callables are rendered when a tree is serialized.
pub const CALLABLE_PLACEHOLDER: &str = "<callable>";

/// Signature of host-facing callables: `params` in, value out.
pub type CallableFn = dyn Fn(&Value) -> Value + Send + Sync;

/// A shared, infallible function of the per-call `params` record.
///
/// Callables compare equal only to clones of themselves.
#[derive(Clone)]
pub struct Callable {
    label: Arc<str>,
    func: Arc<CallableFn>,
}

impl Callable {
    pub fn new(
        label: impl AsRef<str>,
        func: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: Arc::from(label.as_ref()),
            func: Arc::new(func),
        }
    }

    /// A callable that ignores its input and returns `""`.
    pub fn empty() -> Self {
        Self::new("<empty>", |_| Value::str(""))
    }

    pub fn call(&self, params: &Value) -> Value {
        (self.func)(params)
    }

    /// Expression source or host-chosen name, for logs and debugging.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl core::fmt::Debug for Callable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Callable").field(&self.label).finish()
    }
}

/// A node of a configuration tree: JSON-shaped data plus host callables.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConfigValue {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<ConfigValue>),
    Object(BTreeMap<String, ConfigValue>),
    Callable(Callable),
}

impl ConfigValue {
    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, ConfigValue)>) -> Self {
        ConfigValue::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn string(text: impl Into<String>) -> Self {
        ConfigValue::String(text.into())
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.as_object()?.get(key)
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, ConfigValue>> {
        match self {
            ConfigValue::Object(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            ConfigValue::Callable(callable) => Some(callable),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, ConfigValue::Callable(_))
    }

    /// Converts back to JSON, rendering callables as [`CALLABLE_PLACEHOLDER`].
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ConfigValue::Null => serde_json::Value::Null,
            ConfigValue::Bool(b) => serde_json::Value::Bool(*b),
            ConfigValue::Number(n) => serde_json::Value::Number(n.clone()),
            ConfigValue::String(s) => serde_json::Value::String(s.clone()),
            ConfigValue::Array(items) => items.iter().map(ConfigValue::to_json).collect(),
            ConfigValue::Object(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            ConfigValue::Callable(_) => serde_json::Value::String(CALLABLE_PLACEHOLDER.to_string()),
        }
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => ConfigValue::Null,
            serde_json::Value::Bool(b) => ConfigValue::Bool(b),
            serde_json::Value::Number(n) => ConfigValue::Number(n),
            serde_json::Value::String(s) => ConfigValue::String(s),
            serde_json::Value::Array(items) => {
                ConfigValue::Array(items.into_iter().map(ConfigValue::from).collect())
            }
            serde_json::Value::Object(fields) => ConfigValue::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, ConfigValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Callable> for ConfigValue {
    fn from(callable: Callable) -> Self {
        ConfigValue::Callable(callable)
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigValue::Null => serializer.serialize_unit(),
            ConfigValue::Bool(b) => serializer.serialize_bool(*b),
            ConfigValue::Number(n) => n.serialize(serializer),
            ConfigValue::String(s) => serializer.serialize_str(s),
            ConfigValue::Array(items) => items.serialize(serializer),
            ConfigValue::Object(fields) => fields.serialize(serializer),
            ConfigValue::Callable(_) => serializer.serialize_str(CALLABLE_PLACEHOLDER),
        }
    }
}

impl<'de> Deserialize<'de> for ConfigValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(ConfigValue::from)
    }
}

/// What a configuration value means when a field expects behaviour.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionDescriptor {
    /// Trusted host logic, used as is.
    Native(Callable),
    /// Expression text to compile before use.
    Serialized { source: String },
    /// Plain data.
    Literal(ConfigValue),
}

/// Classifies `raw`: callables first, then `{"function": <text>}` records,
/// then everything else as a literal.
pub fn resolve(raw: &ConfigValue) -> FunctionDescriptor {
    match raw {
        ConfigValue::Callable(callable) => FunctionDescriptor::Native(callable.clone()),
        ConfigValue::Object(fields) => match fields.get(FUNCTION_KEY) {
            Some(ConfigValue::String(source)) => FunctionDescriptor::Serialized {
                source: source.clone(),
            },
            _ => FunctionDescriptor::Literal(raw.clone()),
        },
        other => FunctionDescriptor::Literal(other.clone()),
    }
}

impl FunctionDescriptor {
    /// Materializes the descriptor as a configuration value.
    ///
    /// `Native` and `Literal` pass through. `Serialized` compiles through the
    /// engine's parse cache; a syntax error is returned so the caller can
    /// substitute [`Callable::empty`] and report it.
    pub fn to_callable(&self, engine: &Engine) -> Result<ConfigValue, Error> {
        match self {
            FunctionDescriptor::Native(callable) => Ok(ConfigValue::Callable(callable.clone())),
            FunctionDescriptor::Serialized { source } => {
                expression_callable(engine, source).map(ConfigValue::Callable)
            }
            FunctionDescriptor::Literal(value) => Ok(value.clone()),
        }
    }
}

/// Compiles `source` into a callable that evaluates it against `params`.
///
/// Evaluation failures are logged and yield the empty string.
pub fn expression_callable(engine: &Engine, source: &str) -> Result<Callable, Error> {
    let expr = engine.compile(source)?;
    Ok(Callable::new(source, move |params| {
        match expr.run(Default::default(), params) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(
                    expression = expr.source(),
                    error = %err,
                    "Expression evaluation failed, returning empty string"
                );
                Value::str("")
            }
        }
    }))
}
