//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Subcommand};

use crate::domain::{parse_date, parse_time, ReservationFilter};

fn date_arg(text: &str) -> Result<NaiveDate, String> {
    parse_date(text).map_err(|e| e.to_string())
}

fn time_arg(text: &str) -> Result<NaiveTime, String> {
    parse_time(text).map_err(|e| e.to_string())
}

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to bind (overrides `server.host`)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides `server.port`)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Time slot commands.
#[derive(Debug, Subcommand)]
pub enum TimeCommand {
    /// List all time slots
    List,

    /// Add a time slot
    Add {
        /// Start time as HH:MM
        #[arg(value_parser = time_arg)]
        start_at: NaiveTime,
    },

    /// Remove a time slot
    Remove {
        /// Slot id
        id: i64,
    },
}

/// Theme commands.
#[derive(Debug, Subcommand)]
pub enum ThemeCommand {
    /// List all themes
    List,

    /// Add a theme
    Add {
        /// Unique theme name
        name: String,

        /// Free-form description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Thumbnail image URL
        #[arg(short, long, default_value = "")]
        thumbnail: String,
    },

    /// Remove a theme
    Remove {
        /// Theme id
        id: i64,
    },

    /// Show the most reserved themes of the past days
    Popular,
}

/// Member commands.
#[derive(Debug, Subcommand)]
pub enum MemberCommand {
    /// List all members
    List,

    /// Sign up a member
    Add {
        /// Display name
        name: String,
        /// Login email
        email: String,
        /// Credential
        password: String,
    },
}

/// Reservation commands.
#[derive(Debug, Subcommand)]
pub enum ReservationCommand {
    /// List reservations, optionally filtered
    List {
        /// Only this theme
        #[arg(long)]
        theme_id: Option<i64>,

        /// Only this member
        #[arg(long)]
        member_id: Option<i64>,

        /// Earliest date (yyyy-MM-dd), inclusive
        #[arg(long, value_parser = date_arg)]
        from: Option<NaiveDate>,

        /// Latest date (yyyy-MM-dd), inclusive
        #[arg(long, value_parser = date_arg)]
        to: Option<NaiveDate>,
    },

    /// Book a session
    Add {
        /// Member id
        member_id: i64,
        /// Session date (yyyy-MM-dd)
        #[arg(value_parser = date_arg)]
        date: NaiveDate,
        /// Time slot id
        time_id: i64,
        /// Theme id
        theme_id: i64,
    },

    /// Cancel a reservation
    Remove {
        /// Reservation id
        id: i64,
    },
}

impl ReservationCommand {
    /// The filter described by `list` options, if this is `list`.
    #[must_use]
    pub fn filter(&self) -> Option<ReservationFilter> {
        match *self {
            Self::List {
                theme_id,
                member_id,
                from,
                to,
            } => Some(ReservationFilter {
                theme_id,
                member_id,
                date_from: from,
                date_to: to,
            }),
            _ => None,
        }
    }
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
