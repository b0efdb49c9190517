//! Command-line interface for roomescape.
//!
//! This module provides the CLI structure for the `roomescape` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, MemberCommand, ReservationCommand, ServeCommand, StatusCommand, ThemeCommand,
    TimeCommand,
};

use crate::logging::Verbosity;

/// roomescape - Escape-room reservation backend
///
/// Serves the reservation API over HTTP and manages themes, time slots,
/// members and reservations from the command line.
#[derive(Debug, Parser)]
#[command(name = "roomescape")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve(ServeCommand),

    /// Show database location and record counts
    Status(StatusCommand),

    /// Insert demo data into an empty database
    Seed,

    /// Manage bookable time slots
    #[command(subcommand)]
    Time(TimeCommand),

    /// Manage themes
    #[command(subcommand)]
    Theme(ThemeCommand),

    /// Manage members
    #[command(subcommand)]
    Member(MemberCommand),

    /// Manage reservations
    #[command(subcommand)]
    Reservation(ReservationCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use clap::CommandFactory;

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "roomescape");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        let cli = Cli::try_parse_from(["roomescape", "-q", "status"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Quiet);

        let cli = Cli::try_parse_from(["roomescape", "status"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Normal);

        let cli = Cli::try_parse_from(["roomescape", "-v", "status"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Verbose);

        let cli = Cli::try_parse_from(["roomescape", "status", "-vv"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from(["roomescape", "serve", "--host", "0.0.0.0", "-p", "9000"])
            .unwrap();
        let Command::Serve(serve) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(serve.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(serve.port, Some(9000));
    }

    #[test]
    fn test_parse_status_json() {
        let cli = Cli::try_parse_from(["roomescape", "status", "--json"]).unwrap();
        assert!(matches!(cli.command, Command::Status(StatusCommand { json: true })));
    }

    #[test]
    fn test_parse_seed() {
        let cli = Cli::try_parse_from(["roomescape", "seed"]).unwrap();
        assert!(matches!(cli.command, Command::Seed));
    }

    #[test]
    fn test_parse_time_add() {
        let cli = Cli::try_parse_from(["roomescape", "time", "add", "10:30"]).unwrap();
        let Command::Time(TimeCommand::Add { start_at }) = cli.command else {
            panic!("expected time add");
        };
        assert_eq!(start_at, NaiveTime::from_hms_opt(10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_time_add_rejects_bad_time() {
        assert!(Cli::try_parse_from(["roomescape", "time", "add", "noon"]).is_err());
    }

    #[test]
    fn test_parse_theme_add() {
        let cli = Cli::try_parse_from([
            "roomescape",
            "theme",
            "add",
            "Lost Temple",
            "--description",
            "ruins",
            "-t",
            "https://img/1.png",
        ])
        .unwrap();
        let Command::Theme(ThemeCommand::Add {
            name,
            description,
            thumbnail,
        }) = cli.command
        else {
            panic!("expected theme add");
        };
        assert_eq!(name, "Lost Temple");
        assert_eq!(description, "ruins");
        assert_eq!(thumbnail, "https://img/1.png");
    }

    #[test]
    fn test_parse_theme_popular() {
        let cli = Cli::try_parse_from(["roomescape", "theme", "popular"]).unwrap();
        assert!(matches!(cli.command, Command::Theme(ThemeCommand::Popular)));
    }

    #[test]
    fn test_parse_member_add() {
        let cli =
            Cli::try_parse_from(["roomescape", "member", "add", "brown", "brown@example.com", "pw"])
                .unwrap();
        assert!(matches!(cli.command, Command::Member(MemberCommand::Add { .. })));
    }

    #[test]
    fn test_parse_reservation_add() {
        let cli = Cli::try_parse_from([
            "roomescape",
            "reservation",
            "add",
            "1",
            "2025-05-01",
            "2",
            "3",
        ])
        .unwrap();
        let Command::Reservation(ReservationCommand::Add {
            member_id,
            date,
            time_id,
            theme_id,
        }) = cli.command
        else {
            panic!("expected reservation add");
        };
        assert_eq!((member_id, time_id, theme_id), (1, 2, 3));
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());
    }

    #[test]
    fn test_parse_reservation_list_filters() {
        let cli = Cli::try_parse_from([
            "roomescape",
            "reservation",
            "list",
            "--theme-id",
            "2",
            "--from",
            "2025-05-01",
        ])
        .unwrap();
        let Command::Reservation(cmd) = cli.command else {
            panic!("expected reservation");
        };
        let filter = cmd.filter().unwrap();
        assert_eq!(filter.theme_id, Some(2));
        assert!(filter.date_to.is_none());
    }

    #[test]
    fn test_parse_with_config() {
        let cli =
            Cli::try_parse_from(["roomescape", "-c", "/custom/config.toml", "status"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = Cli::try_parse_from([
            "roomescape",
            "config",
            "validate",
            "--file",
            "/tmp/x.toml",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }
}
