//! Database schema definitions and initialization.
//!
//! This module defines the SQLite schema for devotional templates and user
//! entries. All tables are created with proper indexes and foreign key
//! constraints; the uniqueness constraints mirror the data model invariants
//! (one master month per year+month, one master day per month+day, one entry
//! per user+date, one value per entry+field).

use crate::errors::{AppResult, DatabaseError};
use rusqlite::Connection;
use tracing::debug;

/// Current schema version.
///
/// Increment this whenever schema changes are made to support future migrations.
pub const SCHEMA_VERSION: i32 = 1;

/// Creates all database tables and indexes.
///
/// This function is idempotent - it uses `CREATE TABLE IF NOT EXISTS`
/// so it's safe to call multiple times.
///
/// # Tables
///
/// - `devotional_years`: yearly devotional definitions
/// - `master_months`: per-month template containers
/// - `master_days`: per-day template content
/// - `field_definitions`: the year-scoped entry form schema
/// - `entries`: one saved entry per user and date
/// - `field_values`: one value per entry and field definition
///
/// # Errors
///
/// Returns an error if any DDL statement fails.
pub fn create_tables(conn: &Connection) -> AppResult<()> {
    debug!("Creating database tables");

    // Enable foreign key constraints
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(DatabaseError::Sqlite)?;

    // Template side: administrator-authored content
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS devotional_years (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            year INTEGER NOT NULL,
            title TEXT NOT NULL,
            theme TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'DRAFT',
            cover_asset_ref TEXT,
            logo_asset_ref TEXT
        );

        CREATE TABLE IF NOT EXISTS master_months (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            devotional_year_id INTEGER NOT NULL,
            month_number INTEGER NOT NULL,
            name TEXT NOT NULL,
            FOREIGN KEY (devotional_year_id) REFERENCES devotional_years(id) ON DELETE CASCADE,
            UNIQUE(devotional_year_id, month_number)
        );

        CREATE TABLE IF NOT EXISTS master_days (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            master_month_id INTEGER NOT NULL,
            day_number INTEGER NOT NULL,
            day_type TEXT NOT NULL DEFAULT 'NORMAL',
            biblical_reading TEXT,
            daily_verse_ref TEXT,
            FOREIGN KEY (master_month_id) REFERENCES master_months(id) ON DELETE CASCADE,
            UNIQUE(master_month_id, day_number)
        );

        CREATE TABLE IF NOT EXISTS field_definitions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            devotional_year_id INTEGER NOT NULL,
            label TEXT NOT NULL,
            input_kind TEXT NOT NULL DEFAULT 'SHORT_TEXT',
            required INTEGER NOT NULL DEFAULT 0,
            display_order INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (devotional_year_id) REFERENCES devotional_years(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_field_definitions_year
            ON field_definitions(devotional_year_id, display_order);
        "#,
    )
    .map_err(DatabaseError::Sqlite)?;

    // User side: saved entries and their values
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            entry_date TEXT NOT NULL,
            devotional_year_id INTEGER NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            fill_ratio REAL NOT NULL DEFAULT 0,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (devotional_year_id) REFERENCES devotional_years(id),
            UNIQUE(user_id, entry_date)
        );

        CREATE INDEX IF NOT EXISTS idx_entries_user_date ON entries(user_id, entry_date);

        CREATE TABLE IF NOT EXISTS field_values (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            entry_id INTEGER NOT NULL,
            field_definition_id INTEGER NOT NULL,
            text TEXT NOT NULL DEFAULT '',
            audio_url TEXT,
            FOREIGN KEY (entry_id) REFERENCES entries(id) ON DELETE CASCADE,
            FOREIGN KEY (field_definition_id) REFERENCES field_definitions(id),
            UNIQUE(entry_id, field_definition_id)
        );

        CREATE INDEX IF NOT EXISTS idx_field_values_entry ON field_values(entry_id);
        "#,
    )
    .map_err(DatabaseError::Sqlite)?;

    // Schema version tracking
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );
        "#,
    )
    .map_err(DatabaseError::Sqlite)?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [SCHEMA_VERSION],
    )
    .map_err(DatabaseError::Sqlite)?;

    Ok(())
}
