//! SQLite-backed implementation of the template repository and entry store.
//!
//! Uses connection pooling via r2d2 for efficient concurrent access. The
//! [`Database`] handle implements both collaborator traits, so a single open
//! database can serve the resolver, the session layer, and the calendar
//! index.
//!
//! # Module Structure
//!
//! - `schema`: Table definitions and schema initialization
//! - `templates`: Template table operations (reads plus the admin surface)
//! - `entries`: Entry and field-value operations
//!
//! # Example
//!
//! ```no_run
//! use devocional::db::Database;
//! use std::path::Path;
//!
//! let db = Database::open(Path::new("/tmp/devocional.db"))?;
//! db.initialize_schema()?;
//! # Ok::<(), devocional::errors::AppError>(())
//! ```

pub mod entries;
pub mod schema;
pub mod templates;

use crate::constants::DB_POOL_MAX_SIZE;
use crate::errors::{AppResult, DatabaseError};
use crate::model::{
    DayType, DevotionalYear, Entry, EntryDraft, FieldDefinition, InputKind, MasterDay,
    MasterMonth, MonthId, UserId, YearId, YearStatus,
};
use crate::stores::{EntryStore, TemplateRepository};
use chrono::NaiveDate;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Type alias for a pooled SQLite connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Database handle with connection pooling.
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Opens or creates the SQLite database at `db_path`.
    ///
    /// The parent directory is created if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the connection pool
    /// cannot be initialized.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        debug!("Opening database at: {:?}", db_path);

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(DB_POOL_MAX_SIZE)
            .build(manager)
            .map_err(DatabaseError::Pool)?;

        // Fail fast if the file is not usable as a database.
        let conn = pool.get().map_err(DatabaseError::Pool)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")
            .map_err(DatabaseError::Sqlite)?;
        drop(conn);

        info!("Database opened successfully");
        Ok(Database { pool })
    }

    /// Gets a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection is available or the pool is exhausted.
    pub fn get_conn(&self) -> AppResult<PooledConnection> {
        self.pool
            .get()
            .map_err(|e| DatabaseError::Pool(e).into())
    }

    /// Initializes the database schema.
    ///
    /// Creates all necessary tables and indexes if they don't exist.
    /// This is idempotent and safe to call multiple times.
    ///
    /// # Errors
    ///
    /// Returns an error if schema creation fails.
    pub fn initialize_schema(&self) -> AppResult<()> {
        let conn = self.get_conn()?;
        schema::create_tables(&conn)?;
        info!("Database schema initialized");
        Ok(())
    }

    // Administrative surface: authors the template content the core reads.

    /// Creates a devotional year.
    pub fn create_devotional_year(
        &self,
        year: i32,
        title: &str,
        theme: &str,
        status: YearStatus,
    ) -> AppResult<DevotionalYear> {
        let conn = self.get_conn()?;
        templates::create_devotional_year(&conn, year, title, theme, status)
    }

    /// Updates a devotional year's title, theme, and status.
    pub fn update_devotional_year(
        &self,
        id: YearId,
        title: &str,
        theme: &str,
        status: YearStatus,
    ) -> AppResult<()> {
        let conn = self.get_conn()?;
        templates::update_devotional_year(&conn, id, title, theme, status)
    }

    /// Creates a master month within a devotional year.
    pub fn create_master_month(
        &self,
        devotional_year_id: YearId,
        month_number: u32,
        name: &str,
    ) -> AppResult<MasterMonth> {
        let conn = self.get_conn()?;
        templates::create_master_month(&conn, devotional_year_id, month_number, name)
    }

    /// Creates a master day within a master month.
    pub fn create_master_day(
        &self,
        master_month_id: MonthId,
        day_number: u32,
        day_type: DayType,
        biblical_reading: Option<&str>,
        daily_verse_ref: Option<&str>,
    ) -> AppResult<MasterDay> {
        let conn = self.get_conn()?;
        templates::create_master_day(
            &conn,
            master_month_id,
            day_number,
            day_type,
            biblical_reading,
            daily_verse_ref,
        )
    }

    /// Creates a field definition in a devotional year's schema.
    pub fn create_field_definition(
        &self,
        devotional_year_id: YearId,
        label: &str,
        input_kind: InputKind,
        required: bool,
        display_order: i32,
    ) -> AppResult<FieldDefinition> {
        let conn = self.get_conn()?;
        templates::create_field_definition(
            &conn,
            devotional_year_id,
            label,
            input_kind,
            required,
            display_order,
        )
    }
}

impl TemplateRepository for Database {
    fn get_devotional_years(&self) -> AppResult<Vec<DevotionalYear>> {
        let conn = self.get_conn()?;
        templates::list_devotional_years(&conn)
    }

    fn get_master_month(&self, year: YearId, month_number: u32) -> AppResult<Option<MasterMonth>> {
        let conn = self.get_conn()?;
        templates::get_master_month(&conn, year, month_number)
    }

    fn get_master_day(&self, month: MonthId, day_number: u32) -> AppResult<Option<MasterDay>> {
        let conn = self.get_conn()?;
        templates::get_master_day(&conn, month, day_number)
    }

    fn get_field_definitions(&self, year: YearId) -> AppResult<Vec<FieldDefinition>> {
        let conn = self.get_conn()?;
        templates::list_field_definitions(&conn, year)
    }
}

impl EntryStore for Database {
    fn get_entry(&self, user: UserId, date: NaiveDate) -> AppResult<Option<Entry>> {
        let conn = self.get_conn()?;
        entries::get_entry(&conn, user, date)
    }

    fn list_entries(&self, user: UserId, year: i32, month: u32) -> AppResult<Vec<Entry>> {
        let conn = self.get_conn()?;
        entries::list_entries(&conn, user, year, month)
    }

    fn upsert_entry(&self, draft: &EntryDraft) -> AppResult<Entry> {
        let mut conn = self.get_conn()?;
        entries::upsert_entry(&mut conn, draft)
    }
}
