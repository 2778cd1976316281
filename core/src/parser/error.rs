use super::parser::Rule;
use super::syntax::Span;
use crate::api::{Diagnostic, Severity};
use pest::error::{ErrorVariant, InputLocation};

/// A syntax error in an expression source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    pub source: String,
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "syntax error at {}..{}: {}",
            self.span.start(),
            self.span.end(),
            self.message
        )
    }
}

impl std::error::Error for ParseError {}

impl ParseError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            severity: Severity::Error,
            message: self.message.clone(),
            span: self.span.clone(),
            related: Vec::new(),
            help: vec![
                "configuration expressions hold a single expression, e.g. `params.value > 10`"
                    .to_string(),
            ],
            code: Some("E001".to_string()),
        }
    }
}

pub(crate) fn convert_pest_error(err: pest::error::Error<Rule>, source: &str) -> ParseError {
    let err = err.renamed_rules(describe_rule);
    let span = match err.location {
        InputLocation::Pos(pos) => Span::new(pos, pos),
        InputLocation::Span((start, end)) => Span::new(start, end),
    };
    let message = match &err.variant {
        ErrorVariant::CustomError { message } => message.clone(),
        variant @ ErrorVariant::ParsingError { .. } => variant.message().into_owned(),
    };
    ParseError {
        message,
        span,
        source: source.to_string(),
    }
}

fn describe_rule(rule: &Rule) -> String {
    match rule {
        Rule::EOI => "end of expression",
        Rule::expression => "expression",
        Rule::call_op | Rule::index_op | Rule::field_op => "`(`, `[` or `.`",
        Rule::conditional_op => "`?`",
        Rule::or | Rule::and => "logical operator",
        Rule::strict_eq | Rule::strict_neq | Rule::eq | Rule::neq => "equality operator",
        Rule::le | Rule::ge | Rule::lt | Rule::gt => "comparison operator",
        Rule::add | Rule::sub | Rule::mul | Rule::div | Rule::rem => "arithmetic operator",
        Rule::neg | Rule::not => "prefix operator",
        Rule::grouped => "`(`",
        Rule::array => "array",
        Rule::float | Rule::integer => "number",
        Rule::string => "string",
        Rule::boolean => "boolean",
        Rule::null => "null",
        Rule::ident => "identifier",
        Rule::field_name => "field name",
        other => return format!("{other:?}"),
    }
    .to_string()
}
