use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::QuestionCommands;
use crate::commands::body::read_body;
use crate::context::AppContext;
use crate::output::respond;

/// Handle `vh question`.
pub async fn handle(
    action: &QuestionCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<bool> {
    let lookups = &ctx.api.lookups;
    let response = match action {
        QuestionCommands::List { purpose } => {
            lookups.questions(json!({ "purpose": purpose.as_str() })).await
        }
        QuestionCommands::Create(body) => lookups.create_question(read_body(body)?).await,
    };
    respond(&response, flags.format)
}
