//! Command-line interface definitions.
//!
//! The binary is both a reader (show a day, print a month grid) and, against
//! the local database, the administrative surface that authors template
//! content. Remote deployments author templates through their own admin
//! tools; the admin subcommands refuse to run against a remote collaborator.

use crate::constants::{
    APP_DESCRIPTION, APP_NAME, DATE_FORMAT_COMPACT, DATE_FORMAT_ISO, LOG_FORMAT_TEXT,
};
use crate::errors::AppResult;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use uuid::Uuid;

/// A devotional journal with templated daily entries
#[derive(Parser, Debug)]
#[clap(name = APP_NAME, about = APP_DESCRIPTION)]
#[clap(author, version, long_about = None)]
pub struct CliArgs {
    /// Print verbose output
    #[clap(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Log output format: text or json
    #[clap(long, global = true, default_value = LOG_FORMAT_TEXT)]
    pub log_format: String,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize the local database schema
    Init,

    /// List the devotional year catalog
    Years {
        /// Only list active years
        #[clap(long)]
        active: bool,
    },

    /// Show the templated day and saved answers for a date
    Show {
        /// Devotional year id
        #[clap(long)]
        year_id: i64,

        /// User id (issued by the auth layer)
        #[clap(long)]
        user: Uuid,

        /// Date to show (YYYY-MM-DD or YYYYMMDD, defaults to today)
        #[clap(short = 'd', long)]
        date: Option<String>,
    },

    /// Print a month grid with completed days marked
    Calendar {
        /// User id (issued by the auth layer)
        #[clap(long)]
        user: Uuid,

        /// Calendar year
        #[clap(long)]
        year: i32,

        /// Calendar month 1..=12 (defaults to the whole year)
        #[clap(long)]
        month: Option<u32>,
    },

    /// Fill entry fields for a date and save
    Fill {
        /// Devotional year id
        #[clap(long)]
        year_id: i64,

        /// User id (issued by the auth layer)
        #[clap(long)]
        user: Uuid,

        /// Date to fill (YYYY-MM-DD or YYYYMMDD, defaults to today)
        #[clap(short = 'd', long)]
        date: Option<String>,

        /// Field text values as FIELD_ID=VALUE (repeatable)
        #[clap(long = "set", value_name = "FIELD_ID=VALUE")]
        sets: Vec<String>,

        /// Field audio URLs as FIELD_ID=URL (repeatable)
        #[clap(long = "set-audio", value_name = "FIELD_ID=URL")]
        audio_sets: Vec<String>,
    },

    /// Administrative template authoring (local database only)
    Admin {
        #[clap(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// Create a devotional year
    CreateYear {
        #[clap(long)]
        year: i32,
        #[clap(long)]
        title: String,
        #[clap(long, default_value = "")]
        theme: String,
        /// DRAFT, ACTIVE, or DISCONTINUED
        #[clap(long, default_value = "DRAFT")]
        status: String,
    },

    /// Update a devotional year's title, theme, and status
    UpdateYear {
        #[clap(long)]
        id: i64,
        #[clap(long)]
        title: String,
        #[clap(long, default_value = "")]
        theme: String,
        #[clap(long)]
        status: String,
    },

    /// Create a master month within a devotional year
    CreateMonth {
        #[clap(long)]
        year_id: i64,
        #[clap(long)]
        month: u32,
        #[clap(long)]
        name: String,
    },

    /// Create a master day within a master month
    CreateDay {
        #[clap(long)]
        month_id: i64,
        #[clap(long)]
        day: u32,
        /// NORMAL or SUNDAY
        #[clap(long, default_value = "NORMAL")]
        day_type: String,
        #[clap(long)]
        reading: Option<String>,
        #[clap(long)]
        verse: Option<String>,
    },

    /// Create a field definition in a devotional year's schema
    CreateField {
        #[clap(long)]
        year_id: i64,
        #[clap(long)]
        label: String,
        /// SHORT_TEXT, LONG_TEXT, or AUDIO
        #[clap(long, default_value = "SHORT_TEXT")]
        kind: String,
        #[clap(long)]
        required: bool,
        #[clap(long, default_value = "0")]
        order: i32,
    },
}

/// Parses an optional date argument, defaulting to today.
///
/// Accepts YYYY-MM-DD or YYYYMMDD; a string naming no real date (e.g.
/// 2025-02-30) fails with `InvalidDate`.
pub fn parse_date_arg(date: Option<&str>) -> AppResult<NaiveDate> {
    match date {
        None => Ok(Local::now().naive_local().date()),
        Some(s) => Ok(NaiveDate::parse_from_str(s, DATE_FORMAT_ISO)
            .or_else(|_| NaiveDate::parse_from_str(s, DATE_FORMAT_COMPACT))?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use chrono::Datelike;

    #[test]
    fn test_show_command_parsing() {
        let user = Uuid::new_v4();
        let args = CliArgs::parse_from(vec![
            "devocional".to_string(),
            "show".to_string(),
            "--year-id".to_string(),
            "1".to_string(),
            "--user".to_string(),
            user.to_string(),
            "--date".to_string(),
            "2025-01-15".to_string(),
        ]);

        match args.command {
            Command::Show { year_id, user: u, date } => {
                assert_eq!(year_id, 1);
                assert_eq!(u, user);
                assert_eq!(date.as_deref(), Some("2025-01-15"));
            }
            other => panic!("expected show, got {:?}", other),
        }
    }

    #[test]
    fn test_fill_command_accepts_repeated_sets() {
        let user = Uuid::new_v4().to_string();
        let args = CliArgs::parse_from(vec![
            "devocional", "fill", "--year-id", "1", "--user", &user, "--set", "1=Gracias",
            "--set", "2=Notas del día",
        ]);

        match args.command {
            Command::Fill { sets, audio_sets, .. } => {
                assert_eq!(sets, vec!["1=Gracias", "2=Notas del día"]);
                assert!(audio_sets.is_empty());
            }
            other => panic!("expected fill, got {:?}", other),
        }
    }

    #[test]
    fn test_years_active_flag() {
        let args = CliArgs::parse_from(vec!["devocional", "years", "--active"]);
        match args.command {
            Command::Years { active } => assert!(active),
            other => panic!("expected years, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_date_arg_formats() {
        let iso = parse_date_arg(Some("2025-01-15")).unwrap();
        assert_eq!((iso.year(), iso.month(), iso.day()), (2025, 1, 15));

        let compact = parse_date_arg(Some("20250115")).unwrap();
        assert_eq!(compact, iso);

        assert!(matches!(
            parse_date_arg(Some("2025-02-30")),
            Err(AppError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_parse_date_arg_defaults_to_today() {
        let today = Local::now().naive_local().date();
        assert_eq!(parse_date_arg(None).unwrap(), today);
    }
}
