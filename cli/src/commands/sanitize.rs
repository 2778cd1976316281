//! The `sanitize` command - rewrite a grid configuration.
//!
//! The sanitized tree goes to stdout, with callables shown as
//! `"<callable>"`. Diagnostics go to stderr; a blocked field is not a
//! failure.

use gridexpr::{ConfigValue, SanitizeOptions, Sanitizer};

use crate::cli::SanitizeArgs;
use crate::common::CliResult;
use crate::common::engine::build_engine;
use crate::common::input::{parse_json, read_input};

/// Run the sanitize command.
pub fn run(args: SanitizeArgs) -> CliResult<()> {
    let (content, display_name) = read_input(&args.config)?;
    let config: ConfigValue = parse_json(&content, &display_name)?;
    let engine = build_engine();

    let options = SanitizeOptions {
        allow_raw_code: args.allow_raw_code,
    };
    let sanitized = Sanitizer::new(&engine).sanitize_with(&config, options);

    println!("{}", serde_json::to_string_pretty(&sanitized.tree)?);
    for diagnostic in &sanitized.diagnostics {
        eprintln!("warning: {diagnostic}");
    }
    Ok(())
}
