use serde::Serialize;
use vh_api::ApiResponse;

use crate::cli::OutputFormat;

/// Render a serializable value in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

/// Print the response body (errors go to stderr) and report success.
pub fn respond(response: &ApiResponse, format: OutputFormat) -> anyhow::Result<bool> {
    let rendered = render(&response.body, format)?;
    if response.is_success() {
        println!("{rendered}");
    } else {
        eprintln!("{rendered}");
        tracing::debug!(status = response.status, "command failed");
    }
    Ok(response.is_success())
}
