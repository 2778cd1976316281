mod error;
mod parsed_expr;
#[allow(clippy::module_inception)]
mod parser;
pub mod syntax;

pub use error::ParseError;
pub use parsed_expr::{
    BinaryOp, ComparisonOp, Expr, ExprKind, Literal, LogicalOp, ParsedExpr, UnaryOp,
};
pub use parser::{DEFAULT_MAX_PARSE_DEPTH, ExpressionParser, Rule, parse, parse_with_max_depth};
pub use syntax::Span;
