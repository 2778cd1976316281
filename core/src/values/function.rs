//! Callable values.
//!
//! Every function an expression can call (library helpers, host extensions,
//! functions returned by other functions such as `d3.format(".2f")`) implements
//! the [`Function`] trait.

use super::dynamic::Value;
use crate::evaluator::RuntimeError;

/// Trait for callable functions.
///
/// Implementations must be shareable across threads: compiled expressions and
/// the values they produce may be handed to any thread by the host.
pub trait Function: Send + Sync {
    /// Name used in error messages and when the function is displayed.
    fn name(&self) -> &str;

    /// Call the function with already evaluated arguments.
    ///
    /// Arity and argument types are checked by the implementation; a mismatch
    /// is reported as [`RuntimeError::InvalidArgument`].
    fn call(&self, args: &[Value]) -> Result<Value, RuntimeError>;
}

/// Boxed closure signature used by [`NativeFunction`].
pub type NativeFn = dyn Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync;

/// Wrapper turning a Rust closure into a [`Function`].
///
/// # Example
///
/// ```
/// use gridexpr_core::values::{NativeFunction, Value};
///
/// let double = NativeFunction::new("double", |args| match args {
///     [Value::Int(n)] => Ok(Value::Int(n * 2)),
///     _ => Ok(Value::Null),
/// });
/// let value = Value::function(double);
/// assert_eq!(value.type_name(), "function");
/// ```
pub struct NativeFunction {
    name: String,
    func: Box<NativeFn>,
}

impl NativeFunction {
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }
}

impl Function for NativeFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        (self.func)(args)
    }
}

impl core::fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Checks the argument count of a native call.
pub fn expect_arity(function: &str, args: &[Value], arity: usize) -> Result<(), RuntimeError> {
    if args.len() != arity {
        return Err(RuntimeError::invalid_argument(
            function,
            format!("expected {arity} argument(s), got {}", args.len()),
        ));
    }
    Ok(())
}
