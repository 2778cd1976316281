//! Errors returned by [`Engine`](super::Engine) and compiled expressions.
//!
//! Parser and evaluator failures are converted into [`Error`] here, each
//! carrying span-based [`Diagnostic`]s that point into the expression text.

use crate::parser::Span;
use core::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    /// Misuse of the host API, such as two host bindings with one name.
    Api(String),

    /// The expression text is not a single valid expression, or nests too deep.
    Compilation {
        diagnostics: Vec<Diagnostic>,
        source: String,
        filename: Option<String>,
    },

    /// Evaluation failed, e.g. an unbound identifier or a division by zero.
    Runtime {
        diagnostic: Diagnostic,
        source: String,
        filename: Option<String>,
    },
}

impl Error {
    /// Attaches the name of the file or field the expression came from.
    /// `Api` errors have no source and are returned unchanged.
    pub fn with_filename(self, filename: impl Into<String>) -> Self {
        let filename = Some(filename.into());
        match self {
            Error::Compilation {
                diagnostics,
                source,
                ..
            } => Error::Compilation {
                diagnostics,
                source,
                filename,
            },
            Error::Runtime {
                diagnostic,
                source,
                ..
            } => Error::Runtime {
                diagnostic,
                source,
                filename,
            },
            api @ Error::Api(_) => api,
        }
    }

    pub fn filename(&self) -> Option<&str> {
        match self {
            Error::Compilation { filename, .. } | Error::Runtime { filename, .. } => {
                filename.as_deref()
            }
            Error::Api(_) => None,
        }
    }

    /// The expression source the error points into, if any.
    pub fn source_text(&self) -> Option<&str> {
        match self {
            Error::Compilation { source, .. } | Error::Runtime { source, .. } => Some(source),
            Error::Api(_) => None,
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Error::Compilation { diagnostics, .. } => diagnostics,
            Error::Runtime { diagnostic, .. } => core::slice::from_ref(diagnostic),
            Error::Api(_) => &[],
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Api(message) => write!(f, "API error: {message}"),
            Error::Compilation { diagnostics, .. } => match diagnostics.as_slice() {
                [only] => write!(f, "Compilation failed: {}", only.message),
                many => {
                    let errors = many
                        .iter()
                        .filter(|diagnostic| diagnostic.severity == Severity::Error)
                        .count();
                    write!(f, "Compilation failed with {errors} error(s)")
                }
            },
            Error::Runtime { diagnostic, .. } => write!(f, "Runtime error: {}", diagnostic.message),
        }
    }
}

impl std::error::Error for Error {}

/// One finding about an expression, located by byte span.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    /// Secondary spans shown next to the primary one.
    pub related: Vec<RelatedInfo>,
    /// Hints rendered under the snippet.
    pub help: Vec<String>,
    /// Stable code, `E…` for syntax and `R…` for runtime failures.
    pub code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelatedInfo {
    pub span: Span,
    pub message: String,
}

impl From<crate::parser::ParseError> for Error {
    fn from(err: crate::parser::ParseError) -> Self {
        Error::Compilation {
            diagnostics: vec![err.to_diagnostic()],
            source: err.source.clone(),
            filename: None,
        }
    }
}

impl From<crate::evaluator::ExecutionError> for Error {
    fn from(err: crate::evaluator::ExecutionError) -> Self {
        Error::Runtime {
            diagnostic: err.to_diagnostic(),
            source: err.source,
            filename: None,
        }
    }
}

impl From<crate::values::binder::Error> for Error {
    fn from(err: crate::values::binder::Error) -> Self {
        Error::Api(err.to_string())
    }
}
