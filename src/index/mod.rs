//! Per-month completion aggregation for the calendar grid.
//!
//! Decorates the grid produced by [`crate::calendar`] with which days carry a
//! completed entry, without resolving any day templates. The semantic is
//! *completed entries only*: an entry that exists but still misses required
//! fields does not mark its day.

use crate::constants::MONTHS_PER_YEAR;
use crate::errors::AppResult;
use crate::model::UserId;
use crate::stores::EntryStore;
use chrono::Datelike;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Returns, for every month 1..=12 of `year`, the set of day numbers on
/// which the user has a completed entry.
///
/// Every month is present in the result; a month with no entries (or no
/// template at all) maps to an empty set rather than raising.
///
/// # Errors
///
/// Propagates entry store failures unchanged.
pub fn monthly_completion(
    entries: &dyn EntryStore,
    user: UserId,
    year: i32,
) -> AppResult<BTreeMap<u32, BTreeSet<u32>>> {
    let mut by_month = BTreeMap::new();

    for month in 1..=MONTHS_PER_YEAR {
        let days: BTreeSet<u32> = entries
            .list_entries(user, year, month)?
            .into_iter()
            .filter(|e| e.completed)
            .map(|e| e.date.day())
            .collect();
        debug!(year, month, completed = days.len(), "Aggregated month");
        by_month.insert(month, days);
    }

    Ok(by_month)
}
