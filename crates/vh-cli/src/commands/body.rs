use anyhow::Context;
use serde_json::Value;

use crate::cli::subcommands::BodyArgs;

/// The request body from `--body` or `--body-file`; `Null` when neither is
/// given.
pub fn read_body(args: &BodyArgs) -> anyhow::Result<Value> {
    let text = match (&args.body, &args.body_file) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read body file {}", path.display()))?,
        (None, None) => return Ok(Value::Null),
    };
    serde_json::from_str(&text).context("request body is not valid JSON")
}
