//! The `style` command - resolve a style rule set.

use gridexpr::StyleRuleSet;

use crate::cli::StyleArgs;
use crate::common::CliResult;
use crate::common::engine::build_engine;
use crate::common::input::{load_params, parse_json, read_input};

/// Run the style command. Prints the matching style, or `null`.
pub fn run(args: StyleArgs) -> CliResult<()> {
    let (content, display_name) = read_input(&args.rules)?;
    let rules: StyleRuleSet = parse_json(&content, &display_name)?;
    let params = load_params(Some(args.params.as_str()), None)?;
    let engine = build_engine();

    let style = rules.resolve(&engine, &params);
    println!("{}", serde_json::to_string(&style)?);
    Ok(())
}
