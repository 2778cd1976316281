pub mod binder;
pub mod dynamic;
pub mod function;

pub use binder::{Binder, RecordBuilder};
pub use dynamic::Value;
pub use function::{Function, NativeFn, NativeFunction, expect_arity};

#[cfg(test)]
mod dynamic_test;
