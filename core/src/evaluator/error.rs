use crate::api::{Diagnostic, RelatedInfo, Severity};
use crate::parser::Span;
use thiserror::Error;

/// Failure kinds raised while evaluating an expression.
///
/// Native functions return these directly; the evaluator attaches the span of
/// the failing node when it wraps them in an [`ExecutionError`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("`{name}` is not defined")]
    UnboundIdentifier { name: String },

    #[error("a value of type {type_name} is not callable")]
    NotCallable { type_name: &'static str },

    #[error("cannot read `{key}` from a value of type {type_name}")]
    NotIndexable { type_name: &'static str, key: String },

    #[error("operator `{op}` is not defined for {operands}")]
    TypeMismatch { op: &'static str, operands: String },

    #[error("division by zero")]
    DivisionByZero {},

    #[error("integer overflow")]
    IntegerOverflow {},

    #[error("{function}: {message}")]
    InvalidArgument { function: String, message: String },

    #[error("expression nesting exceeds the evaluation limit of {limit}")]
    DepthLimitExceeded { limit: usize },
}

impl RuntimeError {
    pub fn invalid_argument(function: impl Into<String>, message: impl Into<String>) -> Self {
        RuntimeError::InvalidArgument {
            function: function.into(),
            message: message.into(),
        }
    }

    /// Stable code used in rendered diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            RuntimeError::UnboundIdentifier { .. } => "R001",
            RuntimeError::NotCallable { .. } => "R002",
            RuntimeError::NotIndexable { .. } => "R003",
            RuntimeError::TypeMismatch { .. } => "R004",
            RuntimeError::DivisionByZero {} => "R005",
            RuntimeError::IntegerOverflow {} => "R006",
            RuntimeError::InvalidArgument { .. } => "R007",
            RuntimeError::DepthLimitExceeded { .. } => "R008",
        }
    }
}

/// A runtime failure together with where it happened.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionError {
    pub kind: RuntimeError,
    pub source: String,
    pub span: Span,
    /// Nodes that explain the failure, such as the callee of a bad call.
    pub related: Vec<RelatedInfo>,
}

impl core::fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} (at {}..{})",
            self.kind,
            self.span.start(),
            self.span.end()
        )
    }
}

impl std::error::Error for ExecutionError {}

impl ExecutionError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        let help = match &self.kind {
            RuntimeError::UnboundIdentifier { .. } => {
                vec!["per-call data is available under `params`, e.g. `params.data`".to_string()]
            }
            _ => Vec::new(),
        };
        Diagnostic {
            severity: Severity::Error,
            message: self.kind.to_string(),
            span: self.span.clone(),
            related: self.related.clone(),
            help,
            code: Some(self.kind.code().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_span() {
        let err = ExecutionError {
            kind: RuntimeError::UnboundIdentifier {
                name: "unknownVar".to_string(),
            },
            source: "unknownVar + 1".to_string(),
            span: Span::new(0, 10),
            related: Vec::new(),
        };
        assert_eq!(err.to_string(), "`unknownVar` is not defined (at 0..10)");
    }

    #[test]
    fn test_diagnostic_carries_code_and_help() {
        let err = ExecutionError {
            kind: RuntimeError::UnboundIdentifier {
                name: "x".to_string(),
            },
            source: "x".to_string(),
            span: Span::new(0, 1),
            related: Vec::new(),
        };
        let diagnostic = err.to_diagnostic();
        assert_eq!(diagnostic.code.as_deref(), Some("R001"));
        assert_eq!(diagnostic.help.len(), 1);
        assert_eq!(diagnostic.span, Span::new(0, 1));
        assert!(diagnostic.related.is_empty());
    }

    #[test]
    fn test_diagnostic_keeps_related_spans() {
        let err = ExecutionError {
            kind: RuntimeError::NotCallable { type_name: "int" },
            source: "x(1)".to_string(),
            span: Span::new(0, 4),
            related: vec![RelatedInfo {
                span: Span::new(0, 1),
                message: "this is an int".to_string(),
            }],
        };
        let diagnostic = err.to_diagnostic();
        assert_eq!(diagnostic.related, err.related);
    }
}
