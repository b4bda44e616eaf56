//! Entry and field-value table operations.
//!
//! Backs the [`crate::stores::EntryStore`] contract: one entry row per
//! `(user_id, entry_date)`, one value row per `(entry_id, field_definition_id)`,
//! both enforced by unique constraints. The upsert replaces the whole value
//! set in a single transaction.

use crate::constants::DATE_FORMAT_ISO;
use crate::errors::{AppResult, DatabaseError};
use crate::model::{Entry, EntryDraft, EntryId, FieldId, FieldValue, UserId, YearId};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use tracing::debug;

/// Inserts or updates the entry for `(draft.user_id, draft.date)` together
/// with its full value set, transactionally.
///
/// The value set is replaced, never merged: stored values for fields absent
/// from the draft are deleted.
///
/// # Errors
///
/// Returns an error if any statement fails; the transaction rolls back and
/// no partial state is persisted.
pub fn upsert_entry(conn: &mut Connection, draft: &EntryDraft) -> AppResult<Entry> {
    debug!(
        user = %draft.user_id,
        date = %draft.date,
        values = draft.values.len(),
        "Upserting entry"
    );

    let tx = conn.transaction().map_err(DatabaseError::Sqlite)?;
    let date_str = draft.date.format(DATE_FORMAT_ISO).to_string();

    tx.execute(
        r#"
        INSERT INTO entries (user_id, entry_date, devotional_year_id, completed, fill_ratio, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, CURRENT_TIMESTAMP)
        ON CONFLICT(user_id, entry_date) DO UPDATE SET
            devotional_year_id = excluded.devotional_year_id,
            completed = excluded.completed,
            fill_ratio = excluded.fill_ratio,
            updated_at = CURRENT_TIMESTAMP
        "#,
        params![
            draft.user_id.to_string(),
            date_str,
            draft.devotional_year_id.0,
            draft.completed,
            draft.fill_ratio
        ],
    )
    .map_err(DatabaseError::Sqlite)?;

    let entry_id: i64 = tx
        .query_row(
            "SELECT id FROM entries WHERE user_id = ?1 AND entry_date = ?2",
            params![draft.user_id.to_string(), date_str],
            |row| row.get(0),
        )
        .map_err(DatabaseError::Sqlite)?;

    // Replace, never merge: values for fields that dropped out of the draft
    // must not survive.
    tx.execute(
        "DELETE FROM field_values WHERE entry_id = ?1",
        params![entry_id],
    )
    .map_err(DatabaseError::Sqlite)?;

    for value in &draft.values {
        tx.execute(
            r#"
            INSERT INTO field_values (entry_id, field_definition_id, text, audio_url)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(entry_id, field_definition_id) DO UPDATE SET
                text = excluded.text,
                audio_url = excluded.audio_url
            "#,
            params![
                entry_id,
                value.field_definition_id.0,
                value.text,
                value.audio_url
            ],
        )
        .map_err(DatabaseError::Sqlite)?;
    }

    tx.commit().map_err(DatabaseError::Sqlite)?;
    debug!(entry_id, "Entry upserted");

    get_entry(conn, draft.user_id, draft.date)?.ok_or_else(|| {
        DatabaseError::NotFound(format!(
            "entry for user {} on {} vanished after upsert",
            draft.user_id, draft.date
        ))
        .into()
    })
}

/// Retrieves a user's entry for a date, values included.
///
/// Returns `Ok(None)` if no entry exists for the given key.
pub fn get_entry(conn: &Connection, user: UserId, date: NaiveDate) -> AppResult<Option<Entry>> {
    let result = conn.query_row(
        "SELECT id, user_id, entry_date, devotional_year_id, completed, fill_ratio
         FROM entries WHERE user_id = ?1 AND entry_date = ?2",
        params![user.to_string(), date.format(DATE_FORMAT_ISO).to_string()],
        entry_row,
    );

    match result {
        Ok(raw) => {
            let mut entry = decode_entry(raw)?;
            entry.values = load_values(conn, entry.id)?;
            Ok(Some(entry))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(DatabaseError::Sqlite(e).into()),
    }
}

/// Lists a user's entries within one calendar month, values included.
pub fn list_entries(
    conn: &Connection,
    user: UserId,
    year: i32,
    month: u32,
) -> AppResult<Vec<Entry>> {
    let prefix = format!("{:04}-{:02}-", year, month);
    let mut stmt = conn
        .prepare(
            "SELECT id, user_id, entry_date, devotional_year_id, completed, fill_ratio
             FROM entries WHERE user_id = ?1 AND entry_date LIKE ?2 || '%'
             ORDER BY entry_date ASC",
        )
        .map_err(DatabaseError::Sqlite)?;

    let rows = stmt
        .query_map(params![user.to_string(), prefix], entry_row)
        .map_err(DatabaseError::Sqlite)?;

    let mut entries = Vec::new();
    for row in rows {
        let mut entry = decode_entry(row.map_err(DatabaseError::Sqlite)?)?;
        entry.values = load_values(conn, entry.id)?;
        entries.push(entry);
    }
    Ok(entries)
}

type RawEntryRow = (i64, String, String, i64, bool, f64);

fn entry_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEntryRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn decode_entry(raw: RawEntryRow) -> AppResult<Entry> {
    let (id, raw_user, raw_date, year_id, completed, fill_ratio) = raw;
    let user_id = raw_user
        .parse::<UserId>()
        .map_err(|e| DatabaseError::NotFound(format!("malformed user id '{}': {}", raw_user, e)))?;
    let date = NaiveDate::parse_from_str(&raw_date, DATE_FORMAT_ISO)?;

    Ok(Entry {
        id: EntryId(id),
        user_id,
        date,
        devotional_year_id: YearId(year_id),
        completed,
        fill_ratio,
        values: Vec::new(),
    })
}

fn load_values(conn: &Connection, entry: EntryId) -> AppResult<Vec<FieldValue>> {
    let mut stmt = conn
        .prepare(
            "SELECT field_definition_id, text, audio_url
             FROM field_values WHERE entry_id = ?1
             ORDER BY field_definition_id ASC",
        )
        .map_err(DatabaseError::Sqlite)?;

    let rows = stmt
        .query_map(params![entry.0], |row| {
            Ok(FieldValue {
                field_definition_id: FieldId(row.get::<_, i64>(0)?),
                text: row.get(1)?,
                audio_url: row.get(2)?,
            })
        })
        .map_err(DatabaseError::Sqlite)?;

    let mut values = Vec::new();
    for row in rows {
        values.push(row.map_err(DatabaseError::Sqlite)?);
    }
    Ok(values)
}
