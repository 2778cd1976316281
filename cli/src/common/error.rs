//! Error handling utilities for the CLI.

use gridexpr::{RenderConfig, render_error_to};
use thiserror::Error;

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Input(String),

    #[error("{name}: invalid JSON: {error}")]
    Json {
        name: String,
        #[source]
        error: serde_json::Error,
    },

    #[error("cannot write output: {0}")]
    Output(#[from] serde_json::Error),

    /// Expression errors are rendered with their source snippet.
    #[error(transparent)]
    Expression(#[from] gridexpr::Error),
}

/// Render an error to stderr and exit with code 1.
pub fn render_and_exit(error: CliError, no_color: bool) -> ! {
    match &error {
        CliError::Expression(err) => {
            let config = RenderConfig {
                color: !no_color,
                ..Default::default()
            };
            render_error_to(err, &mut std::io::stderr(), &config).ok();
        }
        other => eprintln!("error: {other}"),
    }
    std::process::exit(1);
}
