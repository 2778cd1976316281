//! Tree-walking evaluator for parsed expressions.
//!
//! Evaluation is pure: it reads the [`BindingEnvironment`] and never mutates
//! it, so the same tree and bindings always produce the same result.

mod error;

pub use error::{ExecutionError, RuntimeError};

use crate::api::RelatedInfo;
use crate::api::environment::BindingEnvironment;
use crate::parser::{
    BinaryOp, ComparisonOp, Expr, ExprKind, Literal, LogicalOp, ParsedExpr, Span, UnaryOp,
};
use crate::values::Value;
use std::cmp::Ordering;

/// Default maximum depth of nested nodes the evaluator will descend into.
///
/// Matches the default parse depth; a parsed tree is never deeper than the
/// parse depth it was accepted at, and evaluating it fits a 2 MiB stack.
pub const DEFAULT_MAX_EVAL_DEPTH: usize = crate::parser::DEFAULT_MAX_PARSE_DEPTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatorOptions {
    pub max_depth: usize,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_EVAL_DEPTH,
        }
    }
}

type EvalResult = Result<Value, ExecutionError>;

fn fail(kind: RuntimeError, span: &Span) -> ExecutionError {
    ExecutionError {
        kind,
        // Filled in by `Evaluator::eval` once the failure reaches the top.
        source: String::new(),
        span: span.clone(),
        related: Vec::new(),
    }
}

pub struct Evaluator<'e, 'a> {
    options: EvaluatorOptions,
    env: &'e BindingEnvironment<'a>,
}

impl<'e, 'a> Evaluator<'e, 'a> {
    pub fn new(options: EvaluatorOptions, env: &'e BindingEnvironment<'a>) -> Self {
        Self { options, env }
    }

    /// Evaluates a parsed expression.
    pub fn eval(&self, parsed: &ParsedExpr) -> EvalResult {
        self.eval_expr(&parsed.expr, 0).map_err(|mut err| {
            err.source = parsed.source.to_string();
            err
        })
    }

    fn eval_expr(&self, expr: &Expr, depth: usize) -> EvalResult {
        if depth > self.options.max_depth {
            return Err(fail(
                RuntimeError::DepthLimitExceeded {
                    limit: self.options.max_depth,
                },
                &expr.span,
            ));
        }
        let depth = depth + 1;

        match &expr.kind {
            ExprKind::Literal(literal) => Ok(match literal {
                Literal::Null => Value::Null,
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Int(n) => Value::Int(*n),
                Literal::Float(x) => Value::Float(*x),
                Literal::Str(s) => Value::str(s),
            }),
            ExprKind::Ident(name) => self.env.lookup(name).cloned().ok_or_else(|| {
                fail(
                    RuntimeError::UnboundIdentifier { name: name.clone() },
                    &expr.span,
                )
            }),
            ExprKind::Array(items) => {
                let values = items
                    .iter()
                    .map(|item| self.eval_expr(item, depth))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::array(values))
            }
            ExprKind::Unary { op, expr: operand } => {
                let value = self.eval_expr(operand, depth)?;
                unary(*op, &value).map_err(|kind| fail(kind, &expr.span))
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.eval_expr(left, depth)?;
                let right = self.eval_expr(right, depth)?;
                arithmetic(*op, &left, &right).map_err(|kind| fail(kind, &expr.span))
            }
            ExprKind::Comparison { op, left, right } => {
                let left = self.eval_expr(left, depth)?;
                let right = self.eval_expr(right, depth)?;
                compare(*op, &left, &right)
                    .map(Value::Bool)
                    .map_err(|kind| fail(kind, &expr.span))
            }
            ExprKind::Logical { op, left, right } => {
                let left = self.eval_expr(left, depth)?;
                // The deciding operand is returned as is, not coerced to bool.
                match (op, left.is_truthy()) {
                    (LogicalOp::And, false) | (LogicalOp::Or, true) => Ok(left),
                    _ => self.eval_expr(right, depth),
                }
            }
            ExprKind::Conditional {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval_expr(cond, depth)?.is_truthy() {
                    self.eval_expr(then_branch, depth)
                } else {
                    self.eval_expr(else_branch, depth)
                }
            }
            ExprKind::Field { value, field } => {
                let base = self.eval_expr(value, depth)?;
                member(&base, field).map_err(|kind| fail(kind, &expr.span))
            }
            ExprKind::Index { value, index } => {
                let base = self.eval_expr(value, depth)?;
                let index = self.eval_expr(index, depth)?;
                subscript(&base, &index).map_err(|kind| fail(kind, &expr.span))
            }
            ExprKind::Call { callee, args } => {
                let func = match self.eval_expr(callee, depth)? {
                    Value::Function(func) => func,
                    other => {
                        let type_name = other.type_name();
                        let mut err = fail(RuntimeError::NotCallable { type_name }, &expr.span);
                        err.related.push(RelatedInfo {
                            span: callee.span.clone(),
                            message: format!("this evaluates to a value of type {type_name}"),
                        });
                        return Err(err);
                    }
                };
                let args = args
                    .iter()
                    .map(|arg| self.eval_expr(arg, depth))
                    .collect::<Result<Vec<_>, _>>()?;
                tracing::trace!(function = func.name(), argc = args.len(), "Calling function");
                func.call(&args).map_err(|kind| fail(kind, &expr.span))
            }
        }
    }
}

fn operands(left: &Value, right: &Value) -> String {
    format!("{} and {}", left.type_name(), right.type_name())
}

fn unary(op: UnaryOp, value: &Value) -> Result<Value, RuntimeError> {
    match (op, value) {
        (UnaryOp::Not, v) => Ok(Value::Bool(!v.is_truthy())),
        (UnaryOp::Neg, Value::Int(n)) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or(RuntimeError::IntegerOverflow {}),
        (UnaryOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
        (UnaryOp::Neg, v) => Err(RuntimeError::TypeMismatch {
            op: "-",
            operands: v.type_name().to_string(),
        }),
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => {
            let (a, b) = (*a, *b);
            let result = match op {
                BinaryOp::Add => a.checked_add(b),
                BinaryOp::Sub => a.checked_sub(b),
                BinaryOp::Mul => a.checked_mul(b),
                // Division always produces a float, `7 / 2` is `3.5`.
                BinaryOp::Div => return Ok(Value::Float(a as f64 / b as f64)),
                BinaryOp::Rem => {
                    if b == 0 {
                        return Err(RuntimeError::DivisionByZero {});
                    }
                    a.checked_rem(b)
                }
            };
            result.map(Value::Int).ok_or(RuntimeError::IntegerOverflow {})
        }
        (Value::Str(a), Value::Str(b)) if op == BinaryOp::Add => {
            let mut joined = String::with_capacity(a.len() + b.len());
            joined.push_str(a);
            joined.push_str(b);
            Ok(Value::from(joined))
        }
        _ => match (left.as_number(), right.as_number()) {
            (Some(a), Some(b)) => Ok(Value::Float(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                BinaryOp::Rem => a % b,
            })),
            _ => Err(RuntimeError::TypeMismatch {
                op: op.symbol(),
                operands: operands(left, right),
            }),
        },
    }
}

fn compare(op: ComparisonOp, left: &Value, right: &Value) -> Result<bool, RuntimeError> {
    let ordering = match op {
        ComparisonOp::Eq => return Ok(left.loose_eq(right)),
        ComparisonOp::Neq => return Ok(!left.loose_eq(right)),
        _ => match (left, right) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            _ => match (left.as_number(), right.as_number()) {
                // `None` for NaN: every ordering test is then false.
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => {
                    return Err(RuntimeError::TypeMismatch {
                        op: op.symbol(),
                        operands: operands(left, right),
                    });
                }
            },
        },
    };
    Ok(match (op, ordering) {
        (_, None) => false,
        (ComparisonOp::Lt, Some(o)) => o == Ordering::Less,
        (ComparisonOp::Gt, Some(o)) => o == Ordering::Greater,
        (ComparisonOp::Le, Some(o)) => o != Ordering::Greater,
        (ComparisonOp::Ge, Some(o)) => o != Ordering::Less,
        (ComparisonOp::Eq | ComparisonOp::Neq, _) => unreachable!("handled above"),
    })
}

fn member(base: &Value, field: &str) -> Result<Value, RuntimeError> {
    match base {
        Value::Record(fields) => Ok(fields.get(field).cloned().unwrap_or(Value::Null)),
        Value::Array(items) if field == "length" => Ok(Value::Int(items.len() as i64)),
        Value::Str(s) if field == "length" => Ok(Value::Int(s.chars().count() as i64)),
        other => Err(RuntimeError::NotIndexable {
            type_name: other.type_name(),
            key: field.to_string(),
        }),
    }
}

/// Converts an index value to a position, accepting integral floats.
fn position(index: &Value) -> Option<i64> {
    match index {
        Value::Int(n) => Some(*n),
        Value::Float(x) if x.fract() == 0.0 => Some(*x as i64),
        _ => None,
    }
}

fn subscript(base: &Value, index: &Value) -> Result<Value, RuntimeError> {
    match (base, index) {
        (Value::Record(_), Value::Str(key)) => member(base, key),
        (Value::Array(_) | Value::Str(_), Value::Str(key)) if &**key == "length" => {
            member(base, key)
        }
        (Value::Array(items), _) if position(index).is_some() => Ok(position(index)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| items.get(i).cloned())
            .unwrap_or(Value::Null)),
        (Value::Str(s), _) if position(index).is_some() => Ok(position(index)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| s.chars().nth(i))
            .map(|c| Value::str(c.to_string()))
            .unwrap_or(Value::Null)),
        _ => Err(RuntimeError::NotIndexable {
            type_name: base.type_name(),
            key: index.to_string(),
        }),
    }
}
