//! Error rendering using ariadne
//!
//! Renders compilation and runtime errors with the offending expression,
//! a label under the failing span and any help notes.

use crate::{Diagnostic, Error, Severity};
use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use std::io::Write;

/// Character set for rendering error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharSet {
    #[default]
    Unicode,
    /// ASCII-only, for terminals and logs that mangle box drawing.
    Ascii,
}

/// Configuration for error rendering.
#[derive(Debug, Clone)]
pub struct RenderConfig<'a> {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
    /// Name shown in the report header. Falls back to the error's own
    /// filename, then to `<expression>`.
    pub filename: Option<&'a str>,
    pub charset: CharSet,
}

impl Default for RenderConfig<'_> {
    fn default() -> Self {
        Self {
            color: true,
            filename: None,
            charset: CharSet::Unicode,
        }
    }
}

/// Render an error to stderr using the default config.
pub fn render_error(error: &Error) {
    render_error_to(error, &mut std::io::stderr(), &RenderConfig::default()).ok();
}

/// Render an error to a writer with the given configuration.
///
/// # Example
/// ```
/// use gridexpr::{Engine, EngineOptions, RenderConfig, Value, render_error_to};
///
/// let engine = Engine::new(EngineOptions::default());
/// let err = engine.evaluate("price * 2", &Value::Null).unwrap_err();
///
/// let mut buf = Vec::new();
/// let config = RenderConfig { color: false, ..Default::default() };
/// render_error_to(&err, &mut buf, &config).unwrap();
/// assert!(String::from_utf8_lossy(&buf).contains("`price` is not defined"));
/// ```
pub fn render_error_to(
    error: &Error,
    writer: &mut dyn Write,
    config: &RenderConfig,
) -> std::io::Result<()> {
    let filename = config
        .filename
        .or(error.filename())
        .unwrap_or("<expression>");

    match error {
        Error::Compilation {
            diagnostics,
            source,
            ..
        } => render_diagnostics(source, diagnostics, writer, config, filename),
        Error::Runtime {
            diagnostic, source, ..
        } => render_diagnostics(source, std::slice::from_ref(diagnostic), writer, config, filename),
        Error::Api(msg) => writeln!(writer, "API error: {msg}"),
    }
}

fn render_diagnostics(
    source: &str,
    diagnostics: &[Diagnostic],
    writer: &mut dyn Write,
    config: &RenderConfig,
    filename: &str,
) -> std::io::Result<()> {
    let charset = match config.charset {
        CharSet::Unicode => ariadne::CharSet::Unicode,
        CharSet::Ascii => ariadne::CharSet::Ascii,
    };

    for diag in diagnostics {
        let mut colors = ColorGenerator::new();
        colors.next();

        let kind = match diag.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
            Severity::Info => ReportKind::Advice,
        };
        let ariadne_config = ariadne::Config::default()
            .with_color(config.color)
            .with_char_set(charset);

        let mut report = Report::build(kind, (filename, diag.span.0.clone()))
            .with_message(&diag.message)
            .with_config(ariadne_config);
        if let Some(code) = &diag.code {
            report = report.with_code(code);
        }

        report = report.with_label(
            Label::new((filename, diag.span.0.clone()))
                .with_message(&diag.message)
                .with_color(colors.next()),
        );
        for related in &diag.related {
            report = report.with_label(
                Label::new((filename, related.span.0.clone()))
                    .with_message(&related.message)
                    .with_color(colors.next()),
            );
        }
        for help in &diag.help {
            report = report.with_help(help);
        }

        report
            .finish()
            .write((filename, Source::from(source)), &mut *writer)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Engine, EngineOptions, Value};
    use expect_test::{Expect, expect};

    const UNICODE_CONFIG: RenderConfig = RenderConfig {
        color: false,
        filename: Some("test.expr"),
        charset: CharSet::Unicode,
    };

    const ASCII_CONFIG: RenderConfig = RenderConfig {
        color: false,
        filename: Some("test.expr"),
        charset: CharSet::Ascii,
    };

    fn render(error: &Error, config: &RenderConfig) -> String {
        let mut buf = Vec::new();
        render_error_to(error, &mut buf, config).unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn check_runtime_error(source: &str, config: &RenderConfig, expected: Expect) {
        let engine = Engine::new(EngineOptions::default());
        let err = engine
            .evaluate(source, &Value::Null)
            .expect_err("expression should fail at runtime");
        expected.assert_eq(&render(&err, config));
    }

    #[test]
    fn test_unbound_identifier_unicode() {
        check_runtime_error(
            "foo + 1",
            &UNICODE_CONFIG,
            expect![[r#"
                [R001] Error: `foo` is not defined
                   ╭─[ test.expr:1:1 ]
                   │
                 1 │ foo + 1
                   │ ─┬─  
                   │  ╰─── `foo` is not defined
                   │ 
                   │ Help: per-call data is available under `params`, e.g. `params.data`
                ───╯
            "#]],
        );
    }

    #[test]
    fn test_unbound_identifier_ascii() {
        check_runtime_error(
            "foo + 1",
            &ASCII_CONFIG,
            expect![[r#"
                [R001] Error: `foo` is not defined
                   ,-[ test.expr:1:1 ]
                   |
                 1 | foo + 1
                   | ^|^  
                   |  `--- `foo` is not defined
                   | 
                   | Help: per-call data is available under `params`, e.g. `params.data`
                ---'
            "#]],
        );
    }

    #[test]
    fn test_syntax_error_has_code_and_help() {
        let engine = Engine::new(EngineOptions::default());
        let err = engine.compile("params.value >").unwrap_err();
        let output = render(&err, &ASCII_CONFIG);
        assert!(output.starts_with("[E001] Error: "), "{output}");
        assert!(output.contains("test.expr"));
        assert!(output.contains("Help: configuration expressions hold a single expression"));
    }

    #[test]
    fn test_not_callable_labels_the_callee() {
        let engine = Engine::new(EngineOptions::default());
        let err = engine.evaluate("(1 + 2)(3)", &Value::Null).unwrap_err();
        let related = &err.diagnostics()[0].related;
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].span.0, 0..7);

        let output = render(&err, &ASCII_CONFIG);
        assert!(output.starts_with("[R002] Error: "), "{output}");
        assert!(output.contains("this evaluates to a value of type int"), "{output}");
    }

    #[test]
    fn test_error_filename_is_used_when_config_has_none() {
        let engine = Engine::new(EngineOptions::default());
        let err = engine
            .evaluate("missing", &Value::Null)
            .unwrap_err()
            .with_filename("grid.json");
        let config = RenderConfig {
            color: false,
            ..Default::default()
        };
        assert!(render(&err, &config).contains("grid.json:1:1"));
    }

    #[test]
    fn test_api_error() {
        let err = Error::Api("Duplicate binding for 'x'".to_string());
        assert_eq!(render(&err, &UNICODE_CONFIG), "API error: Duplicate binding for 'x'\n");
    }

    #[test]
    fn test_render_config_default_charset() {
        assert_eq!(RenderConfig::default().charset, CharSet::Unicode);
        assert_eq!(CharSet::default(), CharSet::Unicode);
    }
}
