//! The `eval` command - evaluate an expression.

use crate::cli::EvalArgs;
use crate::common::CliResult;
use crate::common::engine::build_engine;
use crate::common::input::load_params;

/// Run the eval command. Prints the result as JSON.
pub fn run(args: EvalArgs) -> CliResult<()> {
    let params = load_params(args.params.as_deref(), args.params_file.as_deref())?;
    let engine = build_engine();

    let value = engine.evaluate(&args.expression, &params)?;
    println!("{}", serde_json::to_string(&value)?);
    Ok(())
}
