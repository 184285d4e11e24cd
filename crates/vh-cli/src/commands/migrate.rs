use serde_json::json;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `vh migrate`. Opening the database already applied the
/// migrations; this reports where.
pub fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<bool> {
    tracing::info!(path = %ctx.config.database.path, "database migrated");
    output(
        &json!({
            "message": "Database is up to date",
            "data": { "path": ctx.config.database.path },
        }),
        flags.format,
    )?;
    Ok(true)
}
