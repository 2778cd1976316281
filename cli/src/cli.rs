//! Command-line interface definitions.
//!
//! This module contains only clap struct definitions - no business logic.
//! All command implementations are in the `commands` module.

use clap::{Args, Parser, Subcommand};

/// gridexpr - evaluate grid expressions and sanitize grid configuration
#[derive(Parser, Debug)]
#[command(name = "gridexpr", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate an expression against `params`
    Eval(EvalArgs),

    /// Sanitize a grid configuration file
    Sanitize(SanitizeArgs),

    /// Resolve a style rule set for one set of `params`
    Style(StyleArgs),
}

/// Arguments for the `eval` command.
#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Expression to evaluate
    pub expression: String,

    /// Value of `params`, as JSON
    #[arg(long, conflicts_with = "params_file")]
    pub params: Option<String>,

    /// Read the value of `params` from a JSON file
    #[arg(long, value_name = "PATH")]
    pub params_file: Option<String>,
}

/// Arguments for the `sanitize` command.
#[derive(Args, Debug)]
pub struct SanitizeArgs {
    /// Configuration file (JSON), or `-` for stdin
    pub config: String,

    /// Keep raw markup and code in restricted fields
    #[arg(long)]
    pub allow_raw_code: bool,
}

/// Arguments for the `style` command.
#[derive(Args, Debug)]
pub struct StyleArgs {
    /// Rule set file (JSON), or `-` for stdin
    pub rules: String,

    /// Value of `params`, as JSON
    #[arg(long)]
    pub params: String,
}
