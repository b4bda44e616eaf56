//! Constants used throughout the application.
//!
//! This module contains all constants used in the devocional application,
//! organized into logical groups. Having constants centralized makes them
//! easier to find, modify, and reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "devocional";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "A devotional journal with templated daily entries";

// CLI Arguments & Defaults
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Configuration Keys & Environment Variables
/// Environment variable for the SQLite database path.
pub const ENV_VAR_DB: &str = "DEVOCIONAL_DB";
/// Environment variable for the remote collaborator base URL.
pub const ENV_VAR_API_URL: &str = "DEVOCIONAL_API_URL";
/// Environment variable for the bearer token sent to the remote collaborator.
pub const ENV_VAR_TOKEN: &str = "DEVOCIONAL_TOKEN";
/// Standard environment variable for the user's home directory.
pub const ENV_VAR_HOME: &str = "HOME";
/// Default database location relative to the user's home directory.
pub const DEFAULT_DB_SUBPATH: &str = ".devocional/devocional.db";

// Database Parameters
/// Maximum number of pooled SQLite connections.
pub const DB_POOL_MAX_SIZE: u32 = 5;

// Date/Time Logic
/// Date format string for ISO date format (YYYY-MM-DD).
pub const DATE_FORMAT_ISO: &str = "%Y-%m-%d";
/// Date format string for compact date format (YYYYMMDD).
pub const DATE_FORMAT_COMPACT: &str = "%Y%m%d";
/// Smallest year accepted by calendar operations.
pub const MIN_YEAR: i32 = 1;
/// Largest year accepted by calendar operations.
pub const MAX_YEAR: i32 = 9999;
/// Number of months in a year.
pub const MONTHS_PER_YEAR: u32 = 12;
/// Number of columns in a week-aligned calendar grid.
pub const WEEK_COLUMNS: usize = 7;

// Devotional Content
/// Verse reference shown when a configured day carries no verse of its own.
pub const DEFAULT_VERSE_REF: &str = "Juan 3:16";

// Validation
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";
