//! File and JSON input utilities.

use std::io::Read;

use gridexpr::Value;
use serde::de::DeserializeOwned;

use super::error::{CliError, CliResult};

/// Read input from a file path or stdin if path is "-".
///
/// Returns the content and a display name for error messages.
pub fn read_input(path: &str) -> CliResult<(String, String)> {
    if is_stdin(path) {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| CliError::Input(format!("<stdin>: {e}")))?;
        Ok((content, "<stdin>".to_string()))
    } else {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::Input(format!("{path}: {e}")))?;
        Ok((content, path.to_string()))
    }
}

/// Check if the path represents stdin.
pub fn is_stdin(path: &str) -> bool {
    path == "-"
}

pub fn parse_json<T: DeserializeOwned>(content: &str, name: &str) -> CliResult<T> {
    serde_json::from_str(content).map_err(|error| CliError::Json {
        name: name.to_string(),
        error,
    })
}

/// Builds `params` from inline JSON or a JSON file. Without either, `params`
/// is an empty record.
pub fn load_params(inline: Option<&str>, file: Option<&str>) -> CliResult<Value> {
    let json: serde_json::Value = match (inline, file) {
        (Some(text), _) => parse_json(text, "--params")?,
        (None, Some(path)) => {
            let (content, name) = read_input(path)?;
            parse_json(&content, &name)?
        }
        (None, None) => serde_json::Value::Object(Default::default()),
    };
    Ok(Value::from(json))
}
