use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
///
/// Returns whether the command succeeded.
pub async fn dispatch(
    command: Commands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<bool> {
    let api = &ctx.api;
    match command {
        Commands::Permission { action } => {
            commands::domain::handle(&api.permissions, &action, flags).await
        }
        Commands::ServiceOffering { action } => {
            commands::domain::handle(&api.service_offerings, &action, flags).await
        }
        Commands::ServiceType { action } => {
            commands::domain::handle(&api.service_types, &action, flags).await
        }
        Commands::Vendor { action } => commands::domain::handle(&api.vendors, &action, flags).await,
        Commands::VendorRoom { action } => {
            commands::domain::handle(&api.vendor_rooms, &action, flags).await
        }
        Commands::Venue { action } => {
            commands::domain::handle(&api.venue_checklists, &action, flags).await
        }
        Commands::OrgHierarchy { action } => {
            commands::domain::handle(&api.org_hierarchies, &action, flags).await
        }
        Commands::Question { action } => commands::question::handle(&action, ctx, flags).await,
        Commands::Lookup(args) => commands::lookup::handle(&args, ctx, flags).await,
        Commands::Migrate => commands::migrate::handle(ctx, flags),
        Commands::Schema(args) => {
            commands::schema::handle(&args, flags)?;
            Ok(true)
        }
    }
}
