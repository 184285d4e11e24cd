use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use vh_api::services::lookup::LookupKind;

/// JSON request body, inline or from a file.
#[derive(Clone, Debug, Default, Args)]
pub struct BodyArgs {
    /// Inline JSON body
    #[arg(long, conflicts_with = "body_file")]
    pub body: Option<String>,
    /// Read the JSON body from a file
    #[arg(long)]
    pub body_file: Option<PathBuf>,
}

/// Operations shared by every domain.
#[derive(Clone, Debug, Subcommand)]
pub enum DomainCommands {
    /// Page through rows; the body carries searchText, filter, sortBy, offset, limit.
    List(BodyArgs),
    /// Create a row.
    Create(BodyArgs),
    /// Replace a row's editable fields.
    Edit {
        id: i64,
        #[command(flatten)]
        body: BodyArgs,
    },
    /// Show one row with its related data.
    View { id: i64 },
    /// Archive a row.
    Archive { id: i64 },
    /// Clear a row's archived mark.
    Unarchive { id: i64 },
}

#[derive(Clone, Debug, Subcommand)]
pub enum QuestionCommands {
    /// Questions of one questionnaire with options and rules.
    List {
        #[arg(long, value_enum)]
        purpose: PurposeArg,
    },
    /// Add a question.
    Create(BodyArgs),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum PurposeArg {
    VendorRoom,
    VenueChecklist,
}

impl PurposeArg {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VendorRoom => "vendor_room",
            Self::VenueChecklist => "venue_checklist",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum LookupKindArg {
    Statuses,
    Profiles,
    Roles,
    Clients,
    Menus,
    PermissionGroups,
    WorkItems,
}

impl From<LookupKindArg> for LookupKind {
    fn from(arg: LookupKindArg) -> Self {
        match arg {
            LookupKindArg::Statuses => Self::Statuses,
            LookupKindArg::Profiles => Self::Profiles,
            LookupKindArg::Roles => Self::Roles,
            LookupKindArg::Clients => Self::Clients,
            LookupKindArg::Menus => Self::Menus,
            LookupKindArg::PermissionGroups => Self::PermissionGroups,
            LookupKindArg::WorkItems => Self::WorkItems,
        }
    }
}
