//! Pure calendar math, no I/O.
//!
//! This module contains the Gregorian date utilities the rest of the engine
//! builds on: days-in-month (leap-year aware), date validation against the
//! configured year window, and the week-aligned grid used to lay out a month
//! of the devotional calendar. Everything here is a pure function over its
//! arguments and is safe to call from any context.

use crate::constants::{MAX_YEAR, MIN_YEAR, WEEK_COLUMNS};
use crate::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate};

/// First day of the week for grid alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeekStart {
    /// Weeks start on Monday (the observed layout).
    #[default]
    Monday,
    /// Weeks start on Sunday.
    Sunday,
}

/// Returns true if `year` is a Gregorian leap year.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Returns the number of days in the given month.
///
/// # Errors
///
/// Returns `AppError::InvalidDate` when `month` is not in `1..=12` or `year`
/// is outside the configured sane bound (`MIN_YEAR..=MAX_YEAR`).
///
/// # Examples
///
/// ```
/// use devocional::calendar::days_in_month;
///
/// assert_eq!(days_in_month(2024, 2).unwrap(), 29);
/// assert_eq!(days_in_month(2023, 2).unwrap(), 28);
/// ```
pub fn days_in_month(year: i32, month: u32) -> AppResult<u32> {
    validate_year_month(year, month)?;

    Ok(match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => unreachable!("month validated above"),
    })
}

/// Validates a `(year, month, day)` triple and returns the corresponding date.
///
/// # Errors
///
/// Returns `AppError::InvalidDate` when the triple does not name a real
/// Gregorian date within the configured year window (e.g. February 30th).
pub fn validate_date(year: i32, month: u32, day: u32) -> AppResult<NaiveDate> {
    let max_day = days_in_month(year, month)?;
    if day < 1 || day > max_day {
        return Err(AppError::InvalidDate(format!(
            "day {} is out of range for {}-{:02} (1..={})",
            day, year, month, max_day
        )));
    }
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| AppError::InvalidDate(format!("{}-{:02}-{:02}", year, month, day)))
}

/// Produces a week-aligned grid for one month.
///
/// The result is a flat sequence of slots read row by row, seven columns per
/// row. Leading slots before day 1 are `None`, followed by exactly
/// `days_in_month` numbered slots, padded with trailing `None`s so the total
/// length is always a multiple of 7.
///
/// # Errors
///
/// Returns `AppError::InvalidDate` for an out-of-range year or month.
///
/// # Examples
///
/// ```
/// use devocional::calendar::{week_aligned_grid, WeekStart};
///
/// // January 2025 starts on a Wednesday: two leading blanks, Monday-first.
/// let grid = week_aligned_grid(2025, 1, WeekStart::Monday).unwrap();
/// assert_eq!(grid.len() % 7, 0);
/// assert_eq!(grid[0], None);
/// assert_eq!(grid[2], Some(1));
/// ```
pub fn week_aligned_grid(year: i32, month: u32, week_start: WeekStart) -> AppResult<Vec<Option<u32>>> {
    let days = days_in_month(year, month)?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::InvalidDate(format!("{}-{:02}-01", year, month)))?;

    let leading = match week_start {
        WeekStart::Monday => first.weekday().num_days_from_monday(),
        WeekStart::Sunday => first.weekday().num_days_from_sunday(),
    } as usize;

    let filled = leading + days as usize;
    let total = filled.div_ceil(WEEK_COLUMNS) * WEEK_COLUMNS;

    let mut grid = Vec::with_capacity(total);
    grid.resize(leading, None);
    grid.extend((1..=days).map(Some));
    grid.resize(total, None);
    Ok(grid)
}

fn validate_year_month(year: i32, month: u32) -> AppResult<()> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(AppError::InvalidDate(format!(
            "year {} is outside {}..={}",
            year, MIN_YEAR, MAX_YEAR
        )));
    }
    if !(1..=12).contains(&month) {
        return Err(AppError::InvalidDate(format!(
            "month {} is out of range (1..=12)",
            month
        )));
    }
    Ok(())
}
