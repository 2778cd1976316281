//! gridexpr CLI - evaluate grid expressions and sanitize grid configuration.

use clap::Parser;
use gridexpr_cli::cli::{Cli, Command};
use gridexpr_cli::{commands, common};

fn main() {
    use tracing_subscriber::{EnvFilter, fmt};

    // RUST_LOG controls the level; WARN when unset or invalid.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Eval(args) => commands::eval::run(args),
        Command::Sanitize(args) => commands::sanitize::run(args),
        Command::Style(args) => commands::style::run(args),
    };

    if let Err(e) = result {
        common::error::render_and_exit(e, cli.no_color);
    }
}
