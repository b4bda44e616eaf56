//! Collaborator contracts: template repository and entry store.
//!
//! The engine is transport-agnostic and depends only on these two traits.
//! Two implementations ship with the crate: the SQLite-backed
//! [`crate::db::Database`] and the HTTP+JSON [`crate::remote::ApiClient`].
//! Collaborator failures are terminal for the current operation; the core
//! performs no retry and no partial commit.

use crate::errors::AppResult;
use crate::model::{
    DevotionalYear, Entry, EntryDraft, FieldDefinition, MasterDay, MasterMonth, MonthId, UserId,
    YearId, YearStatus,
};
use chrono::NaiveDate;

/// Read access to administrator-authored devotional templates.
///
/// The core never mutates template entities; administrative mutation lives
/// with the implementations (admin surface), not in this contract.
pub trait TemplateRepository {
    /// Lists the devotional year catalog, all statuses included.
    fn get_devotional_years(&self) -> AppResult<Vec<DevotionalYear>>;

    /// Looks up the master month for `(devotional_year_id, month_number)`.
    fn get_master_month(&self, year: YearId, month_number: u32)
        -> AppResult<Option<MasterMonth>>;

    /// Looks up the master day for `(master_month_id, day_number)`.
    fn get_master_day(&self, month: MonthId, day_number: u32) -> AppResult<Option<MasterDay>>;

    /// Fetches the field schema of a devotional year, ordered by
    /// `display_order` ascending. Callers must not rely on tie order here;
    /// the resolver applies the stable `(display_order, id)` ordering.
    fn get_field_definitions(&self, year: YearId) -> AppResult<Vec<FieldDefinition>>;
}

/// Access to a user's saved entries, keyed by `(user_id, date)`.
pub trait EntryStore {
    /// Fetches the entry a user saved for a date, if any.
    fn get_entry(&self, user: UserId, date: NaiveDate) -> AppResult<Option<Entry>>;

    /// Lists all entries a user saved within one calendar month.
    fn list_entries(&self, user: UserId, year: i32, month: u32) -> AppResult<Vec<Entry>>;

    /// Inserts or updates the entry for `(draft.user_id, draft.date)`.
    ///
    /// The draft carries the whole value set; the store replaces, never
    /// merges. Last write wins on concurrent commits to the same key.
    fn upsert_entry(&self, draft: &EntryDraft) -> AppResult<Entry>;
}

/// Lists only the `Active` devotional years.
///
/// Status gating is a catalog-listing policy, applied here and never at
/// resolution time.
pub fn active_years(templates: &dyn TemplateRepository) -> AppResult<Vec<DevotionalYear>> {
    Ok(templates
        .get_devotional_years()?
        .into_iter()
        .filter(|y| y.status == YearStatus::Active)
        .collect())
}
