use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `vh` binary.
#[derive(Debug, Parser)]
#[command(name = "vh", version, about = "VenueHub - venue and vendor management backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only in the log)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Acting profile id, recorded as `createdBy` on new rows
    #[arg(short, long, global = true)]
    pub profile: Option<i64>,

    /// Project config file (defaults to .venuehub/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            profile: self.profile,
            config: self.config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::subcommands::{DomainCommands, LookupKindArg};
    use super::{Cli, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from(["vh", "--format", "raw", "--profile", "3", "migrate"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert_eq!(cli.global_flags().profile, Some(3));
        assert!(matches!(cli.command, Commands::Migrate));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["vh", "vendor", "view", "4", "--quiet"])
            .expect("cli should parse");

        assert!(cli.quiet);
        assert!(matches!(
            cli.command,
            Commands::Vendor {
                action: DomainCommands::View { id: 4 }
            }
        ));
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["vh", "--format", "table", "migrate"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn edit_takes_id_and_body() {
        let cli = Cli::try_parse_from([
            "vh",
            "service-type",
            "edit",
            "7",
            "--body",
            r#"{"name":"Catering"}"#,
        ])
        .expect("cli should parse");

        let Commands::ServiceType {
            action: DomainCommands::Edit { id, body },
        } = cli.command
        else {
            panic!("expected service-type edit");
        };
        assert_eq!(id, 7);
        assert_eq!(body.body.as_deref(), Some(r#"{"name":"Catering"}"#));
    }

    #[test]
    fn body_and_body_file_conflict() {
        let parsed = Cli::try_parse_from([
            "vh",
            "vendor",
            "create",
            "--body",
            "{}",
            "--body-file",
            "vendor.json",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn lookup_kind_is_kebab_case() {
        let cli = Cli::try_parse_from(["vh", "lookup", "permission-groups"])
            .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Lookup(ref args) if args.kind == LookupKindArg::PermissionGroups && args.add.is_none()
        ));
    }
}
