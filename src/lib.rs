/*!
# Devocional

Devocional is a devotional journal engine: each calendar date maps to a
templated "day" (readings, a verse, and a set of fillable fields) drawn from a
yearly devotional definition, and a user's answers are persisted per date.

## Core Features

- Deterministic resolution of a date to its day template (readings, verse
  reference, ordered field schema)
- Editable entry sessions that merge the resolved template with previously
  saved answers and persist updates idempotently
- Week-aligned calendar grids decorated with per-month completion
- Two interchangeable backends: a local SQLite database and a remote
  HTTP+JSON service with bearer auth

## Architecture

The codebase follows a modular architecture with clear separation of concerns:

- `calendar`: pure date and month grid utilities
- `model`: data model types and the typed value map
- `stores`: the template repository and entry store contracts
- `resolver`: date → day template resolution
- `session`: entry sessions (merge, edit, commit)
- `index`: per-month completion aggregation
- `db` / `remote`: the two store implementations
- `cli` / `config` / `errors`: the usual surroundings

## Usage Example

```no_run
use devocional::db::Database;
use devocional::model::YearId;
use devocional::{resolver, session};
use chrono::NaiveDate;
use std::path::Path;

fn main() -> devocional::AppResult<()> {
    let db = Database::open(Path::new("/tmp/devocional.db"))?;
    db.initialize_schema()?;

    let user = uuid::Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

    // What should this user see today?
    let _resolution = resolver::resolve(&db, YearId(1), date)?;

    // Open a session, answer, and save.
    let mut session = session::begin_session(&db, &db, YearId(1), user, date)?;
    if let Some(field) = session.field_schema().first().map(|f| f.id) {
        session.apply_edit(field, "Hoy agradezco...")?;
        session.commit(&db)?;
    }
    Ok(())
}
```
*/

/// Pure calendar math: days-in-month, week-aligned grids
pub mod calendar;
/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// Configuration loading and management
pub mod config;
/// Centralized constants
pub mod constants;
/// SQLite-backed template repository and entry store
pub mod db;
/// Error types and utilities for error handling
pub mod errors;
/// Per-month completion aggregation for the calendar grid
pub mod index;
/// Data model types and the typed value map
pub mod model;
/// HTTP+JSON client for a remote backend
pub mod remote;
/// Date to day-template resolution
pub mod resolver;
/// Entry sessions: merge, edit, commit
pub mod session;
/// Collaborator contracts (template repository, entry store)
pub mod stores;

// Re-export important types for convenience
pub use cli::CliArgs;
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use model::{DayTemplate, Entry, FieldId, UserId, YearId};
pub use resolver::{NotConfiguredReason, Resolution};
pub use session::EntrySession;
