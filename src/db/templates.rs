//! Template table operations.
//!
//! Read functions back the [`crate::stores::TemplateRepository`] contract;
//! the `create_*` / `update_*` functions are the administrative surface that
//! authors template content (the core itself never calls them).

use crate::calendar;
use crate::constants::MONTHS_PER_YEAR;
use crate::errors::{AppError, AppResult, DatabaseError};
use crate::model::{
    DayId, DayType, DevotionalYear, FieldDefinition, FieldId, InputKind, MasterDay, MasterMonth,
    MonthId, YearId, YearStatus,
};
use rusqlite::{params, Connection};
use tracing::debug;

/// Lists all devotional years, newest year first.
pub fn list_devotional_years(conn: &Connection) -> AppResult<Vec<DevotionalYear>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, year, title, theme, status, cover_asset_ref, logo_asset_ref
             FROM devotional_years ORDER BY year DESC, id ASC",
        )
        .map_err(DatabaseError::Sqlite)?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                YearId(row.get::<_, i64>(0)?),
                row.get::<_, i32>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, Option<String>>(6)?,
            ))
        })
        .map_err(DatabaseError::Sqlite)?;

    let mut years = Vec::new();
    for row in rows {
        let (id, year, title, theme, raw_status, cover, logo) =
            row.map_err(DatabaseError::Sqlite)?;
        years.push(DevotionalYear {
            id,
            year,
            title,
            theme,
            status: YearStatus::parse(&raw_status)?,
            cover_asset_ref: cover,
            logo_asset_ref: logo,
        });
    }
    Ok(years)
}

/// Creates a devotional year and returns it.
pub fn create_devotional_year(
    conn: &Connection,
    year: i32,
    title: &str,
    theme: &str,
    status: YearStatus,
) -> AppResult<DevotionalYear> {
    conn.execute(
        "INSERT INTO devotional_years (year, title, theme, status) VALUES (?1, ?2, ?3, ?4)",
        params![year, title, theme, status.as_str()],
    )
    .map_err(DatabaseError::Sqlite)?;

    let id = conn.last_insert_rowid();
    debug!(id, year, "Devotional year created");
    Ok(DevotionalYear {
        id: YearId(id),
        year,
        title: title.to_string(),
        theme: theme.to_string(),
        status,
        cover_asset_ref: None,
        logo_asset_ref: None,
    })
}

/// Updates the mutable attributes of a devotional year.
///
/// # Errors
///
/// Returns `DatabaseError::NotFound` when no year has the given id.
pub fn update_devotional_year(
    conn: &Connection,
    id: YearId,
    title: &str,
    theme: &str,
    status: YearStatus,
) -> AppResult<()> {
    let changed = conn
        .execute(
            "UPDATE devotional_years SET title = ?2, theme = ?3, status = ?4 WHERE id = ?1",
            params![id.0, title, theme, status.as_str()],
        )
        .map_err(DatabaseError::Sqlite)?;

    if changed == 0 {
        return Err(DatabaseError::NotFound(format!("devotional year {}", id)).into());
    }
    Ok(())
}

/// Creates a master month for a devotional year.
///
/// The `(devotional_year_id, month_number)` pair is unique; inserting a
/// duplicate fails with a constraint violation.
///
/// # Errors
///
/// Returns `AppError::InvalidDate` when `month_number` is not in `1..=12`.
pub fn create_master_month(
    conn: &Connection,
    devotional_year_id: YearId,
    month_number: u32,
    name: &str,
) -> AppResult<MasterMonth> {
    if !(1..=MONTHS_PER_YEAR).contains(&month_number) {
        return Err(AppError::InvalidDate(format!(
            "month {} is out of range (1..=12)",
            month_number
        )));
    }

    conn.execute(
        "INSERT INTO master_months (devotional_year_id, month_number, name) VALUES (?1, ?2, ?3)",
        params![devotional_year_id.0, month_number, name],
    )
    .map_err(DatabaseError::Sqlite)?;

    Ok(MasterMonth {
        id: MonthId(conn.last_insert_rowid()),
        devotional_year_id,
        month_number,
        name: name.to_string(),
    })
}

/// Looks up the master month for `(devotional_year_id, month_number)`.
pub fn get_master_month(
    conn: &Connection,
    devotional_year_id: YearId,
    month_number: u32,
) -> AppResult<Option<MasterMonth>> {
    let result = conn.query_row(
        "SELECT id, devotional_year_id, month_number, name
         FROM master_months WHERE devotional_year_id = ?1 AND month_number = ?2",
        params![devotional_year_id.0, month_number],
        |row| {
            Ok(MasterMonth {
                id: MonthId(row.get(0)?),
                devotional_year_id: YearId(row.get(1)?),
                month_number: row.get(2)?,
                name: row.get(3)?,
            })
        },
    );

    match result {
        Ok(month) => Ok(Some(month)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(DatabaseError::Sqlite(e).into()),
    }
}

/// Creates a master day within a master month.
///
/// # Errors
///
/// Returns `AppError::InvalidDate` when `day_number` names no real day of
/// the owning month (e.g. February 30th), and `DatabaseError::NotFound` when
/// the master month does not exist.
pub fn create_master_day(
    conn: &Connection,
    master_month_id: MonthId,
    day_number: u32,
    day_type: DayType,
    biblical_reading: Option<&str>,
    daily_verse_ref: Option<&str>,
) -> AppResult<MasterDay> {
    let (year, month_number) = owning_year_month(conn, master_month_id)?;
    let max_day = calendar::days_in_month(year, month_number)?;
    if day_number < 1 || day_number > max_day {
        return Err(AppError::InvalidDate(format!(
            "day {} is out of range for {}-{:02} (1..={})",
            day_number, year, month_number, max_day
        )));
    }

    conn.execute(
        "INSERT INTO master_days
             (master_month_id, day_number, day_type, biblical_reading, daily_verse_ref)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            master_month_id.0,
            day_number,
            day_type.as_str(),
            biblical_reading,
            daily_verse_ref
        ],
    )
    .map_err(DatabaseError::Sqlite)?;

    Ok(MasterDay {
        id: DayId(conn.last_insert_rowid()),
        master_month_id,
        day_number,
        day_type,
        biblical_reading: biblical_reading.map(String::from),
        daily_verse_ref: daily_verse_ref.map(String::from),
    })
}

/// Resolves the calendar year and month number a master month belongs to.
fn owning_year_month(conn: &Connection, master_month_id: MonthId) -> AppResult<(i32, u32)> {
    let result = conn.query_row(
        "SELECT dy.year, mm.month_number
         FROM master_months mm
         JOIN devotional_years dy ON dy.id = mm.devotional_year_id
         WHERE mm.id = ?1",
        params![master_month_id.0],
        |row| Ok((row.get::<_, i32>(0)?, row.get::<_, u32>(1)?)),
    );

    match result {
        Ok(pair) => Ok(pair),
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            Err(DatabaseError::NotFound(format!("master month {}", master_month_id)).into())
        }
        Err(e) => Err(DatabaseError::Sqlite(e).into()),
    }
}

/// Looks up the master day for `(master_month_id, day_number)`.
pub fn get_master_day(
    conn: &Connection,
    master_month_id: MonthId,
    day_number: u32,
) -> AppResult<Option<MasterDay>> {
    let result = conn.query_row(
        "SELECT id, master_month_id, day_number, day_type, biblical_reading, daily_verse_ref
         FROM master_days WHERE master_month_id = ?1 AND day_number = ?2",
        params![master_month_id.0, day_number],
        |row| {
            Ok((
                DayId(row.get::<_, i64>(0)?),
                row.get::<_, u32>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        },
    );

    match result {
        Ok((id, day_number, raw_type, reading, verse)) => Ok(Some(MasterDay {
            id,
            master_month_id,
            day_number,
            day_type: DayType::parse(&raw_type)?,
            biblical_reading: reading,
            daily_verse_ref: verse,
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(DatabaseError::Sqlite(e).into()),
    }
}

/// Creates a field definition in a devotional year's schema.
pub fn create_field_definition(
    conn: &Connection,
    devotional_year_id: YearId,
    label: &str,
    input_kind: InputKind,
    required: bool,
    display_order: i32,
) -> AppResult<FieldDefinition> {
    conn.execute(
        "INSERT INTO field_definitions
             (devotional_year_id, label, input_kind, required, display_order)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            devotional_year_id.0,
            label,
            input_kind.as_str(),
            required,
            display_order
        ],
    )
    .map_err(DatabaseError::Sqlite)?;

    Ok(FieldDefinition {
        id: FieldId(conn.last_insert_rowid()),
        devotional_year_id,
        label: label.to_string(),
        input_kind,
        required,
        display_order,
    })
}

/// Lists the field schema of a devotional year, ordered by display order.
pub fn list_field_definitions(
    conn: &Connection,
    devotional_year_id: YearId,
) -> AppResult<Vec<FieldDefinition>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, devotional_year_id, label, input_kind, required, display_order
             FROM field_definitions WHERE devotional_year_id = ?1
             ORDER BY display_order ASC, id ASC",
        )
        .map_err(DatabaseError::Sqlite)?;

    let rows = stmt
        .query_map(params![devotional_year_id.0], |row| {
            Ok((
                FieldId(row.get::<_, i64>(0)?),
                YearId(row.get::<_, i64>(1)?),
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, bool>(4)?,
                row.get::<_, i32>(5)?,
            ))
        })
        .map_err(DatabaseError::Sqlite)?;

    let mut fields = Vec::new();
    for row in rows {
        let (id, year, label, raw_kind, required, display_order) =
            row.map_err(DatabaseError::Sqlite)?;
        fields.push(FieldDefinition {
            id,
            devotional_year_id: year,
            label,
            input_kind: InputKind::parse(&raw_kind)?,
            required,
            display_order,
        });
    }
    Ok(fields)
}
