use serde_json::json;
use vh_api::services::lookup::LookupKind;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::LookupArgs;
use crate::context::AppContext;
use crate::output::respond;

/// Handle `vh lookup <kind> [--add NAME]`.
pub async fn handle(args: &LookupArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<bool> {
    let kind = LookupKind::from(args.kind);
    let lookups = &ctx.api.lookups;
    let response = match (&args.add, kind) {
        (None, kind) => lookups.list(kind).await,
        (Some(name), LookupKind::Profiles) => {
            let (first, last) = split_name(name);
            lookups
                .add_profile(json!({
                    "firstName": first,
                    "lastName": last,
                    "email": args.email,
                }))
                .await
        }
        (Some(name), kind) => lookups.add(kind, json!({ "name": name })).await,
    };
    respond(&response, flags.format)
}

/// "Ada King Lovelace" → ("Ada", "King Lovelace").
fn split_name(name: &str) -> (&str, &str) {
    let name = name.trim();
    name.split_once(char::is_whitespace)
        .map_or((name, ""), |(first, last)| (first, last.trim()))
}
