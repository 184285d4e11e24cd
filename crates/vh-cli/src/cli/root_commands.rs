use clap::{Args, Subcommand};

use crate::cli::subcommands::{DomainCommands, LookupKindArg, QuestionCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Permissions.
    Permission {
        #[command(subcommand)]
        action: DomainCommands,
    },
    /// Service offerings and their service type links.
    ServiceOffering {
        #[command(subcommand)]
        action: DomainCommands,
    },
    /// Service types.
    ServiceType {
        #[command(subcommand)]
        action: DomainCommands,
    },
    /// Vendors with addresses and client links.
    Vendor {
        #[command(subcommand)]
        action: DomainCommands,
    },
    /// Vendor rooms and their questionnaire answers.
    VendorRoom {
        #[command(subcommand)]
        action: DomainCommands,
    },
    /// Venue checklists and their questionnaire answers.
    Venue {
        #[command(subcommand)]
        action: DomainCommands,
    },
    /// Client org hierarchies and their levels.
    OrgHierarchy {
        #[command(subcommand)]
        action: DomainCommands,
    },
    /// Questionnaire questions.
    Question {
        #[command(subcommand)]
        action: QuestionCommands,
    },
    /// List a lookup table, or add a row to it.
    Lookup(LookupArgs),
    /// Create or upgrade the database schema.
    Migrate,
    /// Print the JSON Schema of an entity or request payload.
    Schema(SchemaArgs),
}

#[derive(Clone, Debug, Args)]
pub struct LookupArgs {
    pub kind: LookupKindArg,
    /// Add a row with this name (profiles: "First Last")
    #[arg(long)]
    pub add: Option<String>,
    /// Email of an added profile
    #[arg(long, requires = "add")]
    pub email: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// Type name, e.g. `vendor` or `vendor_payload`
    pub type_name: String,
}
