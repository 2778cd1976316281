//! Array helpers of the `d3` namespace, after d3-array.
//!
//! Aggregations take an array and an optional accessor function applied to
//! each element. Only numeric values take part: integers, floats (NaN
//! excluded) and numeric strings. `null` and every other shape is skipped.
use crate::evaluator::RuntimeError;
use crate::values::{Binder, Value};
use std::cmp::Ordering;

/// Largest array `d3.range` will build.
const MAX_RANGE_LEN: usize = 1_000_000;

// ============================================================================
// Argument handling
// ============================================================================

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Int(n) => Some(*n as f64),
        Value::Float(x) if !x.is_nan() => Some(*x),
        Value::Str(s) => s.trim().parse::<f64>().ok().filter(|x| !x.is_nan()),
        _ => None,
    }
}

/// Elements of the array argument, mapped through the optional accessor.
fn accessed(function: &str, args: &[Value]) -> Result<Vec<Value>, RuntimeError> {
    let (items, accessor) = match args {
        [items] => (items, None),
        [items, accessor] => (items, Some(accessor)),
        _ => {
            return Err(RuntimeError::invalid_argument(
                function,
                format!("expected 1 or 2 argument(s), got {}", args.len()),
            ));
        }
    };
    let Some(items) = items.as_array() else {
        return Err(RuntimeError::invalid_argument(
            function,
            format!("expected an array, got {}", items.type_name()),
        ));
    };
    match accessor {
        None => Ok(items.to_vec()),
        Some(accessor) => {
            let Some(accessor) = accessor.as_function() else {
                return Err(RuntimeError::invalid_argument(
                    function,
                    format!("expected an accessor function, got {}", accessor.type_name()),
                ));
            };
            items
                .iter()
                .map(|item| accessor.call(std::slice::from_ref(item)))
                .collect()
        }
    }
}

/// Numeric elements, keeping the original value next to its number.
fn numbers(function: &str, args: &[Value]) -> Result<Vec<(f64, Value)>, RuntimeError> {
    Ok(accessed(function, args)?
        .into_iter()
        .filter_map(|value| numeric(&value).map(|x| (x, value)))
        .collect())
}

fn number_value(value: Value) -> Value {
    match value {
        Value::Str(_) => numeric(&value).map_or(Value::Null, Value::Float),
        other => other,
    }
}

// ============================================================================
// Aggregations
// ============================================================================

/// `d3.sum(array[, accessor])`, 0 for an empty array.
///
/// Stays an integer while every summand is one and no overflow occurs.
fn array_sum(args: &[Value]) -> Result<Value, RuntimeError> {
    let values = numbers("sum", args)?;
    let int_sum = values.iter().try_fold(0i64, |acc, (_, value)| match value {
        Value::Int(n) => acc.checked_add(*n),
        _ => None,
    });
    Ok(match int_sum {
        Some(total) => Value::Int(total),
        None => Value::Float(values.iter().map(|(x, _)| x).sum()),
    })
}

fn array_count(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Int(numbers("count", args)?.len() as i64))
}

fn array_mean(args: &[Value]) -> Result<Value, RuntimeError> {
    let values = numbers("mean", args)?;
    if values.is_empty() {
        return Ok(Value::Null);
    }
    let total: f64 = values.iter().map(|(x, _)| x).sum();
    Ok(Value::Float(total / values.len() as f64))
}

fn array_median(args: &[Value]) -> Result<Value, RuntimeError> {
    let mut sorted: Vec<f64> = numbers("median", args)?.into_iter().map(|(x, _)| x).collect();
    if sorted.is_empty() {
        return Ok(Value::Null);
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    };
    Ok(Value::Float(median))
}

fn extreme(function: &str, args: &[Value], keep: Ordering) -> Result<Option<Value>, RuntimeError> {
    let best = numbers(function, args)?
        .into_iter()
        .reduce(|best, candidate| {
            if candidate.0.total_cmp(&best.0) == keep {
                candidate
            } else {
                best
            }
        });
    Ok(best.map(|(_, value)| number_value(value)))
}

fn array_min(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(extreme("min", args, Ordering::Less)?.unwrap_or(Value::Null))
}

fn array_max(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(extreme("max", args, Ordering::Greater)?.unwrap_or(Value::Null))
}

/// `d3.extent(array[, accessor])` is `[min, max]`, or `[null, null]`.
fn array_extent(args: &[Value]) -> Result<Value, RuntimeError> {
    let min = extreme("extent", args, Ordering::Less)?.unwrap_or(Value::Null);
    let max = extreme("extent", args, Ordering::Greater)?.unwrap_or(Value::Null);
    Ok(Value::array([min, max]))
}

// ============================================================================
// Generators and comparators
// ============================================================================

/// `d3.range([start, ]stop[, step])`
fn array_range(args: &[Value]) -> Result<Value, RuntimeError> {
    let bound = |value: &Value| {
        value.as_number().ok_or_else(|| {
            RuntimeError::invalid_argument(
                "range",
                format!("expected a number, got {}", value.type_name()),
            )
        })
    };
    let (start, stop, step) = match args {
        [stop] => (0.0, bound(stop)?, 1.0),
        [start, stop] => (bound(start)?, bound(stop)?, 1.0),
        [start, stop, step] => (bound(start)?, bound(stop)?, bound(step)?),
        _ => {
            return Err(RuntimeError::invalid_argument(
                "range",
                format!("expected 1 to 3 argument(s), got {}", args.len()),
            ));
        }
    };

    let len = ((stop - start) / step).ceil();
    if !len.is_finite() || len <= 0.0 {
        return Ok(Value::array([]));
    }
    if len > MAX_RANGE_LEN as f64 {
        return Err(RuntimeError::invalid_argument(
            "range",
            format!("range would produce more than {MAX_RANGE_LEN} elements"),
        ));
    }

    let integral = args.iter().all(|arg| matches!(arg, Value::Int(_)));
    Ok(Value::array((0..len as usize).map(|i| {
        let x = start + i as f64 * step;
        if integral { Value::Int(x as i64) } else { Value::Float(x) }
    })))
}

fn compare(function: &str, args: &[Value]) -> Result<Option<Ordering>, RuntimeError> {
    let [a, b] = args else {
        return Err(RuntimeError::invalid_argument(
            function,
            format!("expected 2 argument(s), got {}", args.len()),
        ));
    };
    Ok(match (a, b) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => match (a.as_number(), b.as_number()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
    })
}

fn ordering_value(ordering: Option<Ordering>) -> Value {
    match ordering {
        Some(Ordering::Less) => Value::Int(-1),
        Some(Ordering::Equal) => Value::Int(0),
        Some(Ordering::Greater) => Value::Int(1),
        None => Value::Float(f64::NAN),
    }
}

/// `d3.ascending(a, b)`, usable directly as a column comparator.
fn array_ascending(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(ordering_value(compare("ascending", args)?))
}

fn array_descending(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(ordering_value(compare("descending", args)?.map(Ordering::reverse)))
}

/// Registers the array functions of the `d3` namespace.
pub fn register_array_functions<B: Binder>(builder: B) -> B {
    builder
        .bind("sum", Value::native("sum", array_sum))
        .bind("count", Value::native("count", array_count))
        .bind("mean", Value::native("mean", array_mean))
        .bind("median", Value::native("median", array_median))
        .bind("min", Value::native("min", array_min))
        .bind("max", Value::native("max", array_max))
        .bind("extent", Value::native("extent", array_extent))
        .bind("range", Value::native("range", array_range))
        .bind("ascending", Value::native("ascending", array_ascending))
        .bind("descending", Value::native("descending", array_descending))
}

#[cfg(test)]
#[path = "array_test.rs"]
mod array_test;
