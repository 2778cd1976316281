use lazy_static::lazy_static;
use pest::Parser;
use pest::iterators::Pair;
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest_derive::Parser;
use std::cell::Cell;
use std::sync::Arc;

use crate::parser::error::{ParseError, convert_pest_error};
use crate::parser::{
    BinaryOp, ComparisonOp, Expr, ExprKind, Literal, LogicalOp, ParsedExpr, UnaryOp,
    syntax::Span,
};
use crate::syntax::string_literal::unescape_string;

lazy_static! {
    // Note: precedence is defined lowest to highest.
    static ref PRATT_PARSER: PrattParser<Rule> = PrattParser::new()
        // (lowest precedence)
        .op(Op::infix(Rule::conditional_op, Assoc::Right))  // `c ? a : b`

        // Logical operators.
        .op(Op::infix(Rule::or, Assoc::Left))                // `||`
        .op(Op::infix(Rule::and, Assoc::Left))               // `&&`

        // Comparison operators.
        .op(
            Op::infix(Rule::strict_eq, Assoc::Left) |
            Op::infix(Rule::strict_neq, Assoc::Left) |
            Op::infix(Rule::eq, Assoc::Left) |
            Op::infix(Rule::neq, Assoc::Left)
        )                                                    // `===`, `!==`, `==`, `!=`
        .op(
            Op::infix(Rule::lt, Assoc::Left) |
            Op::infix(Rule::gt, Assoc::Left) |
            Op::infix(Rule::le, Assoc::Left) |
            Op::infix(Rule::ge, Assoc::Left)
        )                                                    // `<`, `>`, `<=`, `>=`

        // Arithmetic operators.
        .op(
            Op::infix(Rule::add, Assoc::Left) |
            Op::infix(Rule::sub, Assoc::Left)
        )                                                    // `+`, `-`
        .op(
            Op::infix(Rule::mul, Assoc::Left) |
            Op::infix(Rule::div, Assoc::Left) |
            Op::infix(Rule::rem, Assoc::Left)
        )                                                    // `*`, `/`, `%`
        .op(Op::prefix(Rule::neg) | Op::prefix(Rule::not))   // `-`, `!`

        // Postfix operators share one level so chains read left to right.
        .op(
            Op::postfix(Rule::call_op) |
            Op::postfix(Rule::index_op) |
            Op::postfix(Rule::field_op)
        )                                                    // `()`, `[]`, `.`
        // (highest precedence)
        ;
}

#[derive(Parser)]
#[grammar = "parser/expression.pest"]
pub struct ExpressionParser;

type PestResult<T> = Result<T, pest::error::Error<Rule>>;

fn custom_error(message: impl Into<String>, span: pest::Span<'_>) -> pest::error::Error<Rule> {
    pest::error::Error::new_from_span(
        pest::error::ErrorVariant::CustomError {
            message: message.into(),
        },
        span,
    )
}

fn depth_message(max_depth: usize) -> String {
    format!("Expression nesting depth exceeds maximum of {max_depth} levels.")
}

fn is_primary(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::grouped
            | Rule::array
            | Rule::float
            | Rule::integer
            | Rule::string
            | Rule::boolean
            | Rule::null
            | Rule::ident
    )
}

struct ParseContext {
    depth: Cell<usize>,
    max_depth: usize,
}

impl ParseContext {
    fn check_depth(&self, pair: &Pair<Rule>) -> PestResult<()> {
        let current_depth = self.depth.get();
        if current_depth >= self.max_depth {
            return Err(custom_error(depth_message(self.max_depth), pair.as_span()));
        }
        self.depth.set(current_depth + 1);
        Ok(())
    }

    fn parse_expr(&self, pair: Pair<Rule>) -> PestResult<Expr> {
        self.check_depth(&pair)?;
        let result = match pair.as_rule() {
            Rule::main => self.parse_main(pair),
            Rule::expression => self.parse_expression(pair),
            Rule::grouped => self.parse_grouped(pair),
            Rule::array => self.parse_array(pair),
            Rule::integer => self.parse_integer(pair),
            Rule::float => self.parse_float(pair),
            Rule::string => self.parse_string(pair),
            Rule::boolean => Ok(Expr::new(
                ExprKind::Literal(Literal::Bool(pair.as_str() == "true")),
                pair.as_span().into(),
            )),
            Rule::null => Ok(Expr::new(
                ExprKind::Literal(Literal::Null),
                pair.as_span().into(),
            )),
            Rule::ident => Ok(Expr::new(
                ExprKind::Ident(pair.as_str().to_string()),
                pair.as_span().into(),
            )),
            other => Err(custom_error(
                format!("Unhandled rule: {other:?}"),
                pair.as_span(),
            )),
        };
        self.depth.set(self.depth.get() - 1);
        result
    }

    fn parse_main(&self, pair: Pair<Rule>) -> PestResult<Expr> {
        let span = pair.as_span();
        let inner = pair
            .into_inner()
            .next()
            .ok_or_else(|| custom_error("missing expected pair in rule", span))?;
        self.parse_expr(inner)
    }

    /// Every operator of the flat sequence adds one level to the tree, and
    /// pest's Pratt parser recurses once per prefix operator and per
    /// right-associative `?:`, so they are charged before parsing.
    fn parse_expression(&self, pair: Pair<Rule>) -> PestResult<Expr> {
        let operators = pair
            .clone()
            .into_inner()
            .filter(|inner| !is_primary(inner.as_rule()))
            .count();
        let outer = self.depth.get();
        if outer + operators >= self.max_depth {
            return Err(custom_error(depth_message(self.max_depth), pair.as_span()));
        }
        self.depth.set(outer + operators);
        let result = self.parse_operators(pair);
        self.depth.set(outer);
        result
    }

    fn parse_operators(&self, pair: Pair<Rule>) -> PestResult<Expr> {
        PRATT_PARSER
            .map_primary(|primary| self.parse_expr(primary))
            .map_prefix(|op, rhs| {
                let rhs = rhs?;
                let span = Span::combine(&op.as_span().into(), &rhs.span);
                let op = match op.as_rule() {
                    Rule::neg => UnaryOp::Neg,
                    Rule::not => UnaryOp::Not,
                    other => unreachable!("Unknown prefix operator: {other:?}"),
                };
                Ok(Expr::new(
                    ExprKind::Unary {
                        op,
                        expr: Box::new(rhs),
                    },
                    span,
                ))
            })
            .map_infix(|lhs, op, rhs| {
                let lhs = lhs?;
                let rhs = rhs?;
                let span = Span::combine(&lhs.span, &rhs.span);
                match op.as_rule() {
                    Rule::conditional_op => self.parse_conditional(lhs, op, rhs, span),
                    Rule::and | Rule::or => Ok(self.parse_logical(op, lhs, rhs, span)),
                    Rule::add | Rule::sub | Rule::mul | Rule::div | Rule::rem => {
                        Ok(self.parse_binary_op(op, lhs, rhs, span))
                    }
                    _ => Ok(self.parse_comparison_op(op, lhs, rhs, span)),
                }
            })
            .map_postfix(|lhs, op| {
                let lhs = lhs?;
                let span = Span::combine(&lhs.span, &op.as_span().into());
                match op.as_rule() {
                    Rule::call_op => self.parse_call_expr(lhs, op, span),
                    Rule::index_op => self.parse_index_expr(lhs, op, span),
                    Rule::field_op => self.parse_field_expr(lhs, op, span),
                    other => unreachable!("Unknown postfix operator: {other:?}"),
                }
            })
            .parse(pair.into_inner())
    }

    // Infix operators
    fn parse_conditional(
        &self,
        cond: Expr,
        op: Pair<Rule>,
        else_branch: Expr,
        span: Span,
    ) -> PestResult<Expr> {
        let op_span = op.as_span();
        let then_pair = op
            .into_inner()
            .next()
            .ok_or_else(|| custom_error("missing branch after `?`", op_span))?;
        let then_branch = self.parse_expr(then_pair)?;
        Ok(Expr::new(
            ExprKind::Conditional {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
            span,
        ))
    }

    fn parse_logical(&self, op: Pair<Rule>, left: Expr, right: Expr, span: Span) -> Expr {
        let op = match op.as_rule() {
            Rule::and => LogicalOp::And,
            Rule::or => LogicalOp::Or,
            other => unreachable!("Unknown logical operator: {other:?}"),
        };
        Expr::new(
            ExprKind::Logical {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }

    fn parse_binary_op(&self, op: Pair<Rule>, left: Expr, right: Expr, span: Span) -> Expr {
        let op = match op.as_rule() {
            Rule::add => BinaryOp::Add,
            Rule::sub => BinaryOp::Sub,
            Rule::mul => BinaryOp::Mul,
            Rule::div => BinaryOp::Div,
            Rule::rem => BinaryOp::Rem,
            other => unreachable!("Unknown binary operator: {other:?}"),
        };
        Expr::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }

    fn parse_comparison_op(&self, op: Pair<Rule>, left: Expr, right: Expr, span: Span) -> Expr {
        // Strict and loose equality share one semantics: values carry no
        // implicit coercions to opt out of.
        let op = match op.as_rule() {
            Rule::eq | Rule::strict_eq => ComparisonOp::Eq,
            Rule::neq | Rule::strict_neq => ComparisonOp::Neq,
            Rule::lt => ComparisonOp::Lt,
            Rule::gt => ComparisonOp::Gt,
            Rule::le => ComparisonOp::Le,
            Rule::ge => ComparisonOp::Ge,
            other => unreachable!("Unknown comparison operator: {other:?}"),
        };
        Expr::new(
            ExprKind::Comparison {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }

    // Postfix operators
    fn parse_call_expr(&self, callee: Expr, op: Pair<Rule>, span: Span) -> PestResult<Expr> {
        let args = op
            .into_inner()
            .map(|p| self.parse_expr(p))
            .collect::<PestResult<Vec<_>>>()?;
        Ok(Expr::new(
            ExprKind::Call {
                callee: Box::new(callee),
                args,
            },
            span,
        ))
    }

    fn parse_index_expr(&self, value: Expr, op: Pair<Rule>, span: Span) -> PestResult<Expr> {
        let op_span = op.as_span();
        let index_pair = op
            .into_inner()
            .next()
            .ok_or_else(|| custom_error("missing index expression", op_span))?;
        let index = self.parse_expr(index_pair)?;
        Ok(Expr::new(
            ExprKind::Index {
                value: Box::new(value),
                index: Box::new(index),
            },
            span,
        ))
    }

    fn parse_field_expr(&self, value: Expr, op: Pair<Rule>, span: Span) -> PestResult<Expr> {
        let op_span = op.as_span();
        let field = op
            .into_inner()
            .next()
            .ok_or_else(|| custom_error("missing field name", op_span))?
            .as_str()
            .to_string();
        Ok(Expr::new(
            ExprKind::Field {
                value: Box::new(value),
                field,
            },
            span,
        ))
    }

    // Primaries
    fn parse_grouped(&self, pair: Pair<Rule>) -> PestResult<Expr> {
        let span = pair.as_span();
        let inner = pair
            .into_inner()
            .next()
            .ok_or_else(|| custom_error("empty parentheses", span))?;
        let mut expr = self.parse_expr(inner)?;
        // The group's span includes its parentheses.
        expr.span = span.into();
        Ok(expr)
    }

    fn parse_array(&self, pair: Pair<Rule>) -> PestResult<Expr> {
        let span = pair.as_span();
        let items = pair
            .into_inner()
            .map(|p| self.parse_expr(p))
            .collect::<PestResult<Vec<_>>>()?;
        Ok(Expr::new(ExprKind::Array(items), span.into()))
    }

    fn parse_integer(&self, pair: Pair<Rule>) -> PestResult<Expr> {
        let span = pair.as_span();
        let value = pair
            .as_str()
            .parse::<i64>()
            .map_err(|_| custom_error("integer literal out of range", span))?;
        Ok(Expr::new(
            ExprKind::Literal(Literal::Int(value)),
            span.into(),
        ))
    }

    fn parse_float(&self, pair: Pair<Rule>) -> PestResult<Expr> {
        let span = pair.as_span();
        let value = pair
            .as_str()
            .parse::<f64>()
            .map_err(|_| custom_error("invalid float literal", span))?;
        Ok(Expr::new(
            ExprKind::Literal(Literal::Float(value)),
            span.into(),
        ))
    }

    fn parse_string(&self, pair: Pair<Rule>) -> PestResult<Expr> {
        let span = pair.as_span();
        let s = pair.as_str();
        let inner = &s[1..s.len() - 1]; // Remove opening and closing quotes
        let unescaped = unescape_string(inner)
            .map_err(|e| custom_error(format!("Invalid string literal: {e}"), span))?;
        Ok(Expr::new(
            ExprKind::Literal(Literal::Str(unescaped)),
            span.into(),
        ))
    }
}

/// Default maximum nesting depth for expression parsing.
///
/// Parsing and evaluating an expression at this depth fits in a 2 MiB
/// thread stack.
pub const DEFAULT_MAX_PARSE_DEPTH: usize = 200;

/// The generated pest parser recurses once per opening bracket before any
/// [`ParseContext`] check runs, so bracket nesting is bounded on the raw
/// text first. Each bracket level costs at least two parse levels (the
/// bracket and the expression inside it), hence half of `max_depth`.
fn check_bracket_depth(source: &str, max_depth: usize) -> Result<(), ParseError> {
    let limit = max_depth / 2;
    let mut depth = 0usize;
    let mut quote = None;
    let mut escaped = false;
    for (offset, c) in source.char_indices() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == open {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' | '?' => {
                depth += 1;
                if depth > limit {
                    return Err(ParseError {
                        message: depth_message(max_depth),
                        span: Span::new(offset, offset + 1),
                        source: source.to_string(),
                    });
                }
            }
            ')' | ']' | ':' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

/// Parses an expression with the default maximum nesting depth.
///
/// For custom depth limits, use [`parse_with_max_depth`].
pub fn parse(source: &str) -> Result<ParsedExpr, ParseError> {
    parse_with_max_depth(source, DEFAULT_MAX_PARSE_DEPTH)
}

/// Parses an expression with a custom maximum nesting depth.
///
/// The `max_depth` parameter controls how deeply expressions can be nested
/// (parentheses, arrays, call arguments, ...) before returning an error.
pub fn parse_with_max_depth(source: &str, max_depth: usize) -> Result<ParsedExpr, ParseError> {
    check_bracket_depth(source, max_depth)?;
    let mut pairs = ExpressionParser::parse(Rule::main, source).map_err(|e| {
        tracing::debug!("Pest parser failed with: {:?}", e);
        convert_pest_error(e, source)
    })?;
    let Some(pair) = pairs.next() else {
        return Err(ParseError {
            message: "empty expression".to_string(),
            span: Span::new(0, source.len()),
            source: source.to_string(),
        });
    };
    let context = ParseContext {
        depth: Cell::new(0),
        max_depth,
    };
    let expr = context
        .parse_expr(pair)
        .map_err(|e| convert_pest_error(e, source))?;
    Ok(ParsedExpr {
        source: Arc::from(source),
        expr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lit_int(value: i64, start: usize, end: usize) -> Expr {
        Expr::new(ExprKind::Literal(Literal::Int(value)), Span::new(start, end))
    }

    fn ident(name: &str, start: usize, end: usize) -> Expr {
        Expr::new(ExprKind::Ident(name.to_string()), Span::new(start, end))
    }

    #[test]
    fn test_simple_binary_expr() {
        let parsed = parse("1 + 2").unwrap();

        assert_eq!(
            parsed.expr,
            Expr::new(
                ExprKind::Binary {
                    op: BinaryOp::Add,
                    left: Box::new(lit_int(1, 0, 1)),
                    right: Box::new(lit_int(2, 4, 5)),
                },
                Span::new(0, 5)
            )
        );
        assert_eq!(&*parsed.source, "1 + 2");
    }

    #[test]
    fn test_member_comparison() {
        let parsed = parse("params.value > 10").unwrap();

        assert_eq!(
            parsed.expr,
            Expr::new(
                ExprKind::Comparison {
                    op: ComparisonOp::Gt,
                    left: Box::new(Expr::new(
                        ExprKind::Field {
                            value: Box::new(ident("params", 0, 6)),
                            field: "value".to_string(),
                        },
                        Span::new(0, 12)
                    )),
                    right: Box::new(lit_int(10, 15, 17)),
                },
                Span::new(0, 17)
            )
        );
    }

    #[test]
    fn test_precedence_mul_over_add() {
        let parsed = parse("1 + 2 * 3").unwrap();
        let ExprKind::Binary {
            op: BinaryOp::Add,
            right,
            ..
        } = parsed.expr.kind
        else {
            panic!("Expected addition at root, got {:?}", parsed.expr);
        };
        assert!(matches!(
            right.kind,
            ExprKind::Binary {
                op: BinaryOp::Mul,
                ..
            }
        ));
    }

    #[test]
    fn test_logical_precedence() {
        // `&&` binds tighter than `||`: (a && b) || c
        let parsed = parse("a && b || c").unwrap();
        let ExprKind::Logical {
            op: LogicalOp::Or,
            left,
            right,
        } = parsed.expr.kind
        else {
            panic!("Expected `||` at root");
        };
        assert!(matches!(
            left.kind,
            ExprKind::Logical {
                op: LogicalOp::And,
                ..
            }
        ));
        assert_eq!(*right, ident("c", 10, 11));
    }

    #[test]
    fn test_not_binds_tighter_than_and() {
        let parsed = parse("!a && b").unwrap();
        let ExprKind::Logical { left, .. } = parsed.expr.kind else {
            panic!("Expected logical expression");
        };
        assert_eq!(
            *left,
            Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    expr: Box::new(ident("a", 1, 2)),
                },
                Span::new(0, 2)
            )
        );
    }

    #[test]
    fn test_conditional_is_right_associative() {
        let parsed = parse("a ? 1 : b ? 2 : 3").unwrap();
        let ExprKind::Conditional {
            cond,
            then_branch,
            else_branch,
        } = parsed.expr.kind
        else {
            panic!("Expected conditional");
        };
        assert_eq!(*cond, ident("a", 0, 1));
        assert_eq!(*then_branch, lit_int(1, 4, 5));
        assert!(matches!(else_branch.kind, ExprKind::Conditional { .. }));
    }

    #[test]
    fn test_conditional_binds_looser_than_comparison() {
        let parsed = parse("params.value > 10 ? 'high' : 'low'").unwrap();
        let ExprKind::Conditional { cond, .. } = parsed.expr.kind else {
            panic!("Expected conditional");
        };
        assert!(matches!(cond.kind, ExprKind::Comparison { .. }));
    }

    #[test]
    fn test_curried_call_chain() {
        let parsed = parse("d3.format('.1f')(params.value)").unwrap();
        let ExprKind::Call { callee, args } = parsed.expr.kind else {
            panic!("Expected outer call");
        };
        assert_eq!(args.len(), 1);
        let ExprKind::Call {
            callee: inner_callee,
            args: inner_args,
        } = callee.kind
        else {
            panic!("Expected inner call");
        };
        assert_eq!(
            inner_args,
            vec![Expr::new(
                ExprKind::Literal(Literal::Str(".1f".to_string())),
                Span::new(10, 15)
            )]
        );
        assert!(matches!(
            inner_callee.kind,
            ExprKind::Field { ref field, .. } if field == "format"
        ));
    }

    #[test]
    fn test_index_and_array_literal() {
        let parsed = parse("params.data['price'] in_stock").unwrap_err();
        assert!(parsed.message.contains("expected"), "{}", parsed.message);

        let parsed = parse("[1, 2, 3][0]").unwrap();
        let ExprKind::Index { value, index } = parsed.expr.kind else {
            panic!("Expected index");
        };
        assert!(matches!(value.kind, ExprKind::Array(ref items) if items.len() == 3));
        assert_eq!(*index, lit_int(0, 10, 11));
    }

    #[test]
    fn test_negative_numbers_and_subtraction() {
        let parsed = parse("1 - -2").unwrap();
        let ExprKind::Binary {
            op: BinaryOp::Sub,
            right,
            ..
        } = parsed.expr.kind
        else {
            panic!("Expected subtraction");
        };
        assert_eq!(
            *right,
            Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Neg,
                    expr: Box::new(lit_int(2, 5, 6)),
                },
                Span::new(4, 6)
            )
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            parse("1.5e3").unwrap().expr.kind,
            ExprKind::Literal(Literal::Float(1500.0))
        );
        assert_eq!(
            parse("true").unwrap().expr.kind,
            ExprKind::Literal(Literal::Bool(true))
        );
        assert_eq!(
            parse("undefined").unwrap().expr.kind,
            ExprKind::Literal(Literal::Null)
        );
        assert_eq!(
            parse(r#""say \"hi\"""#).unwrap().expr.kind,
            ExprKind::Literal(Literal::Str("say \"hi\"".to_string()))
        );
        assert_eq!(
            parse(r"'it\'s'").unwrap().expr.kind,
            ExprKind::Literal(Literal::Str("it's".to_string()))
        );
    }

    #[test]
    fn test_keyword_prefix_in_identifier() {
        assert_eq!(
            parse("nullable").unwrap().expr.kind,
            ExprKind::Ident("nullable".to_string())
        );
        assert_eq!(
            parse("trueValue").unwrap().expr.kind,
            ExprKind::Ident("trueValue".to_string())
        );
    }

    #[test]
    fn test_keyword_as_field_name() {
        let parsed = parse("params.null").unwrap();
        assert!(matches!(parsed.expr.kind, ExprKind::Field { ref field, .. } if field == "null"));
    }

    #[test]
    fn test_strict_equality_maps_to_equality() {
        let loose = parse("a == 1").unwrap();
        let strict = parse("a === 1").unwrap();
        let (ExprKind::Comparison { op: l, .. }, ExprKind::Comparison { op: s, .. }) =
            (&loose.expr.kind, &strict.expr.kind)
        else {
            panic!("Expected comparisons");
        };
        assert_eq!(*l, ComparisonOp::Eq);
        assert_eq!(*s, ComparisonOp::Eq);
    }

    #[test]
    fn test_grouped_expression_span_includes_parens() {
        let parsed = parse("(1 + 2) * 3").unwrap();
        let ExprKind::Binary { left, .. } = parsed.expr.kind else {
            panic!("Expected multiplication");
        };
        assert_eq!(left.span, Span::new(0, 7));
    }

    #[test]
    fn test_rejects_multiple_statements() {
        let err = parse("a; b").unwrap_err();
        assert_eq!(err.span.start(), 1);
        assert_eq!(err.source, "a; b");
    }

    #[test]
    fn test_rejects_declarations() {
        assert!(parse("let x = 1").is_err());
        assert!(parse("x = 1").is_err());
        assert!(parse("").is_err());
    }

    #[test]
    fn test_unterminated_string() {
        let err = parse("'abc").unwrap_err();
        assert_eq!(err.source, "'abc");
    }

    #[test]
    fn test_integer_overflow() {
        let err = parse("99999999999999999999").unwrap_err();
        assert!(err.message.contains("out of range"), "{}", err.message);
    }

    #[test]
    fn test_parse_is_deterministic() {
        for source in [
            "params.value > 10",
            "d3.format(',.0f')(params.data.pop) + ' people'",
            "a ? [1, 2.5, 'x'] : !b",
        ] {
            assert_eq!(parse(source).unwrap(), parse(source).unwrap());
        }
    }

    #[test]
    fn test_depth_tracking_exceeds_limit() {
        let source = format!("{}1{}", "(".repeat(20), ")".repeat(20));
        assert!(parse_with_max_depth(&source, 200).is_ok());

        let err = parse_with_max_depth(&source, 10).unwrap_err();
        assert!(
            err.message.contains("nesting depth"),
            "unexpected message: {}",
            err.message
        );
    }

    #[test]
    fn test_operators_count_towards_depth() {
        // main, expression, three operators, then the primary.
        assert!(parse_with_max_depth("!!-1", 6).is_ok());
        assert!(parse_with_max_depth("!!-1", 5).is_err());
        assert!(parse_with_max_depth("1 + 2 + 3 + 4", 6).is_ok());
        assert!(parse_with_max_depth("1 + 2 + 3 + 4", 5).is_err());
        assert!(parse_with_max_depth("a ? 1 : b ? 2 : 3", 6).is_ok());
        assert!(parse_with_max_depth("a ? 1 : b ? 2 : 3", 5).is_err());
    }

    #[test]
    fn test_bracket_depth_checked_before_parsing() {
        let source = format!("{}1", "[".repeat(100_000));
        let err = parse(&source).unwrap_err();
        assert!(err.message.contains("nesting depth"), "{}", err.message);
        assert_eq!(err.span, Span::new(100, 101));
    }

    #[test]
    fn test_brackets_inside_strings_are_not_nesting() {
        let source = format!("'{}' + \"{}\"", "(".repeat(500), "[?".repeat(500));
        assert!(parse(&source).is_ok());
        assert!(parse(r"'it\'s ((((' + '))'").is_ok());
    }
}
