//! Entry sessions: the editable merge of a resolved template and any prior
//! saved answers.
//!
//! [`begin_session`] resolves the day, seeds draft values from a previously
//! saved entry if one exists, and hands back an [`EntrySession`]. Edits go
//! through [`EntrySession::apply_edit`] / [`EntrySession::apply_audio`]
//! (unknown fields fail immediately), and [`EntrySession::commit`] validates
//! required fields, recomputes the derived completion state, and sends the
//! whole value set to the entry store as one upsert.
//!
//! Whether a save is an insert or an update is decided exactly once, here:
//! `is_persisted` is computed in `begin_session` and flipped by `commit`,
//! never re-derived by callers.

use crate::errors::{AppError, AppResult};
use crate::model::{
    Entry, EntryDraft, FieldDefinition, FieldId, FieldValue, UserId, ValueMap, YearId,
};
use crate::resolver::{self, Resolution};
use crate::stores::{EntryStore, TemplateRepository};
use chrono::NaiveDate;
use tracing::{debug, info};

/// An in-memory editing session for one `(user, date)` entry.
///
/// Not persisted as such; the persisted artifact is the [`Entry`] returned
/// by [`EntrySession::commit`].
#[derive(Debug, Clone)]
pub struct EntrySession {
    user_id: UserId,
    devotional_year_id: YearId,
    date: NaiveDate,
    field_schema: Vec<FieldDefinition>,
    values: ValueMap,
    is_persisted: bool,
    is_dirty: bool,
}

/// Opens an editing session for `(user_id, date)` against a devotional year.
///
/// If the date resolves to no template the session carries an empty schema
/// (nothing to edit, nothing to save). If the user already saved an entry for
/// the date, its values seed the drafts and the session starts in update
/// mode (`is_persisted = true`).
///
/// # Errors
///
/// Propagates collaborator failures unchanged.
pub fn begin_session(
    templates: &dyn TemplateRepository,
    entries: &dyn EntryStore,
    devotional_year_id: YearId,
    user_id: UserId,
    date: NaiveDate,
) -> AppResult<EntrySession> {
    let schema = match resolver::resolve(templates, devotional_year_id, date)? {
        Resolution::Template(template) => template.field_schema,
        Resolution::NotConfigured(reason) => {
            debug!(?reason, %date, "Opening session with empty schema");
            return Ok(EntrySession {
                user_id,
                devotional_year_id,
                date,
                field_schema: Vec::new(),
                values: ValueMap::default(),
                is_persisted: false,
                is_dirty: false,
            });
        }
    };

    let mut values = ValueMap::from_schema(&schema);
    let existing = entries.get_entry(user_id, date)?;
    let is_persisted = existing.is_some();

    if let Some(entry) = existing {
        debug!(entry_id = entry.id.0, "Seeding session from saved entry");
        for value in entry.values {
            // Values for fields no longer in the schema are dropped; the
            // schema is the authority on what is editable.
            if values.set(value.field_definition_id, value.clone()).is_err() {
                debug!(
                    field = value.field_definition_id.0,
                    "Ignoring saved value for field outside the active schema"
                );
            }
        }
    }

    Ok(EntrySession {
        user_id,
        devotional_year_id,
        date,
        field_schema: schema,
        values,
        is_persisted,
        is_dirty: false,
    })
}

impl EntrySession {
    /// The date this session edits.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The devotional year this session belongs to.
    pub fn devotional_year_id(&self) -> YearId {
        self.devotional_year_id
    }

    /// The field schema of the session, in display order.
    pub fn field_schema(&self) -> &[FieldDefinition] {
        &self.field_schema
    }

    /// The current draft value for a field, if the field is in the schema.
    pub fn value(&self, field: FieldId) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// True when a prior saved entry backs this session (a commit will be an
    /// update, not an insert).
    pub fn is_persisted(&self) -> bool {
        self.is_persisted
    }

    /// True when a persisted session has unsaved edits.
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// Whether a save action should be offered: always for a fresh session,
    /// only after an edit for a persisted one.
    pub fn save_enabled(&self) -> bool {
        !self.is_persisted || self.is_dirty
    }

    /// Replaces the text of a field's draft value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::UnknownField` when the field is not in the schema.
    pub fn apply_edit(&mut self, field: FieldId, text: impl Into<String>) -> AppResult<()> {
        let mut value = self
            .values
            .get(field)
            .cloned()
            .ok_or(AppError::UnknownField(field))?;
        value.text = text.into();
        self.values.set(field, value)?;
        self.mark_edited();
        Ok(())
    }

    /// Replaces the audio URL of a field's draft value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::UnknownField` when the field is not in the schema.
    pub fn apply_audio(&mut self, field: FieldId, url: impl Into<String>) -> AppResult<()> {
        let mut value = self
            .values
            .get(field)
            .cloned()
            .ok_or(AppError::UnknownField(field))?;
        let url = url.into();
        value.audio_url = if url.trim().is_empty() { None } else { Some(url) };
        self.values.set(field, value)?;
        self.mark_edited();
        Ok(())
    }

    /// True once every required field holds a non-blank draft value.
    pub fn completed(&self) -> bool {
        self.field_schema
            .iter()
            .filter(|f| f.required)
            .all(|f| self.values.get(f.id).map_or(false, |v| !v.is_blank()))
    }

    /// Percentage (0..=100) of schema fields holding a non-blank draft value.
    pub fn fill_ratio(&self) -> f64 {
        if self.field_schema.is_empty() {
            return 0.0;
        }
        let filled = self
            .field_schema
            .iter()
            .filter(|f| self.values.get(f.id).map_or(false, |v| !v.is_blank()))
            .count();
        filled as f64 * 100.0 / self.field_schema.len() as f64
    }

    /// Validates required fields and persists the whole value set.
    ///
    /// Committing twice with identical drafts is idempotent: the stored
    /// entry is unchanged and `completed` is stable. After a successful
    /// commit the session is clean (`is_persisted = true, is_dirty = false`).
    ///
    /// # Errors
    ///
    /// Returns `AppError::NothingToSave` when the session's date has no
    /// configured template (empty schema), and
    /// `AppError::MissingRequiredField` for the first required field, in
    /// display order, whose draft value is blank. Propagates entry store
    /// failures unchanged; the session state is untouched on failure.
    pub fn commit(&mut self, entries: &dyn EntryStore) -> AppResult<Entry> {
        if self.field_schema.is_empty() {
            return Err(AppError::NothingToSave(self.date));
        }

        if let Some(field) = self
            .field_schema
            .iter()
            .filter(|f| f.required)
            .find(|f| self.values.get(f.id).map_or(true, |v| v.is_blank()))
        {
            return Err(AppError::MissingRequiredField {
                field: field.id,
                label: field.label.clone(),
            });
        }

        // Whole payload, in display order, unchanged fields included.
        let values: Vec<FieldValue> = self
            .field_schema
            .iter()
            .filter_map(|f| self.values.get(f.id).cloned())
            .collect();

        let draft = EntryDraft {
            user_id: self.user_id,
            date: self.date,
            devotional_year_id: self.devotional_year_id,
            completed: self.completed(),
            fill_ratio: self.fill_ratio(),
            values,
        };

        let entry = entries.upsert_entry(&draft)?;
        info!(
            entry_id = entry.id.0,
            date = %self.date,
            completed = entry.completed,
            "Entry committed"
        );

        self.is_persisted = true;
        self.is_dirty = false;
        Ok(entry)
    }

    /// A fresh session stays eligible for create semantics; only a persisted
    /// one becomes dirty on edit.
    fn mark_edited(&mut self) {
        if self.is_persisted {
            self.is_dirty = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        DayId, DayType, DevotionalYear, EntryId, InputKind, MasterDay, MasterMonth, MonthId,
    };
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct FakeTemplates {
        fields: Vec<FieldDefinition>,
        configured: bool,
    }

    impl TemplateRepository for FakeTemplates {
        fn get_devotional_years(&self) -> AppResult<Vec<DevotionalYear>> {
            Ok(vec![])
        }
        fn get_master_month(&self, year: YearId, n: u32) -> AppResult<Option<MasterMonth>> {
            if !self.configured {
                return Ok(None);
            }
            Ok(Some(MasterMonth {
                id: MonthId(10),
                devotional_year_id: year,
                month_number: n,
                name: "Enero".to_string(),
            }))
        }
        fn get_master_day(&self, month: MonthId, n: u32) -> AppResult<Option<MasterDay>> {
            Ok(Some(MasterDay {
                id: DayId(100),
                master_month_id: month,
                day_number: n,
                day_type: DayType::Normal,
                biblical_reading: Some("Juan 3".to_string()),
                daily_verse_ref: None,
            }))
        }
        fn get_field_definitions(&self, _: YearId) -> AppResult<Vec<FieldDefinition>> {
            Ok(self.fields.clone())
        }
    }

    /// In-memory entry store keyed by `(user, date)`, mirroring the
    /// uniqueness constraint of the real stores.
    struct MemoryEntries {
        rows: RefCell<HashMap<(UserId, NaiveDate), Entry>>,
        next_id: RefCell<i64>,
    }

    impl MemoryEntries {
        fn new() -> Self {
            MemoryEntries {
                rows: RefCell::new(HashMap::new()),
                next_id: RefCell::new(1),
            }
        }

        fn row_count(&self) -> usize {
            self.rows.borrow().len()
        }
    }

    impl EntryStore for MemoryEntries {
        fn get_entry(&self, user: UserId, date: NaiveDate) -> AppResult<Option<Entry>> {
            Ok(self.rows.borrow().get(&(user, date)).cloned())
        }

        fn list_entries(&self, user: UserId, year: i32, month: u32) -> AppResult<Vec<Entry>> {
            use chrono::Datelike;
            Ok(self
                .rows
                .borrow()
                .values()
                .filter(|e| e.user_id == user && e.date.year() == year && e.date.month() == month)
                .cloned()
                .collect())
        }

        fn upsert_entry(&self, draft: &EntryDraft) -> AppResult<Entry> {
            let mut rows = self.rows.borrow_mut();
            let key = (draft.user_id, draft.date);
            let id = rows.get(&key).map(|e| e.id).unwrap_or_else(|| {
                let mut next = self.next_id.borrow_mut();
                let id = EntryId(*next);
                *next += 1;
                id
            });
            let entry = Entry {
                id,
                user_id: draft.user_id,
                date: draft.date,
                devotional_year_id: draft.devotional_year_id,
                completed: draft.completed,
                fill_ratio: draft.fill_ratio,
                values: draft.values.clone(),
            };
            rows.insert(key, entry.clone());
            Ok(entry)
        }
    }

    fn field(id: i64, label: &str, required: bool, order: i32) -> FieldDefinition {
        FieldDefinition {
            id: FieldId(id),
            devotional_year_id: YearId(1),
            label: label.to_string(),
            input_kind: InputKind::LongText,
            required,
            display_order: order,
        }
    }

    fn two_field_templates() -> FakeTemplates {
        FakeTemplates {
            fields: vec![
                field(1, "Gratitud", true, 1),
                field(2, "Notas", false, 2),
            ],
            configured: true,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn test_fresh_session_has_empty_drafts_and_is_not_persisted() {
        let templates = two_field_templates();
        let store = MemoryEntries::new();
        let user = UserId::new_v4();

        let session = begin_session(&templates, &store, YearId(1), user, date()).unwrap();
        assert!(!session.is_persisted());
        assert!(!session.is_dirty());
        assert!(session.save_enabled());
        assert!(session.value(FieldId(1)).unwrap().is_blank());
        assert!(session.value(FieldId(2)).unwrap().is_blank());
    }

    #[test]
    fn test_session_seeds_drafts_from_saved_entry() {
        let templates = two_field_templates();
        let store = MemoryEntries::new();
        let user = UserId::new_v4();

        let mut first = begin_session(&templates, &store, YearId(1), user, date()).unwrap();
        first.apply_edit(FieldId(1), "Hoy agradezco la vida").unwrap();
        first.commit(&store).unwrap();

        let session = begin_session(&templates, &store, YearId(1), user, date()).unwrap();
        assert!(session.is_persisted());
        assert!(!session.is_dirty());
        assert!(!session.save_enabled());
        assert_eq!(session.value(FieldId(1)).unwrap().text, "Hoy agradezco la vida");
        assert!(session.value(FieldId(2)).unwrap().is_blank());
    }

    #[test]
    fn test_not_configured_session_carries_empty_schema() {
        let templates = FakeTemplates {
            fields: vec![],
            configured: false,
        };
        let store = MemoryEntries::new();
        let session =
            begin_session(&templates, &store, YearId(1), UserId::new_v4(), date()).unwrap();
        assert!(session.field_schema().is_empty());
        assert!(!session.is_persisted());
    }

    #[test]
    fn test_commit_on_unconfigured_date_is_refused() {
        let templates = FakeTemplates {
            fields: vec![],
            configured: false,
        };
        let store = MemoryEntries::new();
        let mut session =
            begin_session(&templates, &store, YearId(1), UserId::new_v4(), date()).unwrap();

        let err = session.commit(&store).unwrap_err();
        assert!(matches!(err, AppError::NothingToSave(d) if d == date()));
        assert_eq!(store.row_count(), 0);
        assert!(!session.is_persisted());
    }

    #[test]
    fn test_apply_edit_unknown_field_fails() {
        let templates = two_field_templates();
        let store = MemoryEntries::new();
        let mut session =
            begin_session(&templates, &store, YearId(1), UserId::new_v4(), date()).unwrap();

        let err = session.apply_edit(FieldId(99), "x").unwrap_err();
        assert!(matches!(err, AppError::UnknownField(FieldId(99))));
    }

    #[test]
    fn test_edit_on_fresh_session_does_not_mark_dirty() {
        let templates = two_field_templates();
        let store = MemoryEntries::new();
        let mut session =
            begin_session(&templates, &store, YearId(1), UserId::new_v4(), date()).unwrap();

        session.apply_edit(FieldId(1), "algo").unwrap();
        // Create semantics: never been saved, so no "update with no visible
        // change" state to track.
        assert!(!session.is_dirty());
        assert!(session.save_enabled());
    }

    #[test]
    fn test_edit_on_persisted_session_marks_dirty() {
        let templates = two_field_templates();
        let store = MemoryEntries::new();
        let user = UserId::new_v4();

        let mut session = begin_session(&templates, &store, YearId(1), user, date()).unwrap();
        session.apply_edit(FieldId(1), "primera").unwrap();
        session.commit(&store).unwrap();
        assert!(!session.is_dirty());

        session.apply_edit(FieldId(2), "segunda").unwrap();
        assert!(session.is_dirty());
        assert!(session.save_enabled());
    }

    #[test]
    fn test_commit_fails_on_first_blank_required_field_in_display_order() {
        let templates = FakeTemplates {
            fields: vec![
                field(5, "Oración", true, 2),
                field(3, "Gratitud", true, 1),
                field(2, "Notas", false, 3),
            ],
            configured: true,
        };
        let store = MemoryEntries::new();
        let mut session =
            begin_session(&templates, &store, YearId(1), UserId::new_v4(), date()).unwrap();

        // Both required fields blank: the one first in display order wins.
        match session.commit(&store).unwrap_err() {
            AppError::MissingRequiredField { field, label } => {
                assert_eq!(field, FieldId(3));
                assert_eq!(label, "Gratitud");
            }
            other => panic!("expected MissingRequiredField, got {:?}", other),
        }

        session.apply_edit(FieldId(3), "Gracias").unwrap();
        match session.commit(&store).unwrap_err() {
            AppError::MissingRequiredField { field, .. } => assert_eq!(field, FieldId(5)),
            other => panic!("expected MissingRequiredField, got {:?}", other),
        }
    }

    #[test]
    fn test_commit_succeeds_regardless_of_optional_fields() {
        let templates = two_field_templates();
        let store = MemoryEntries::new();
        let mut session =
            begin_session(&templates, &store, YearId(1), UserId::new_v4(), date()).unwrap();

        session.apply_edit(FieldId(1), "Hoy agradezco...").unwrap();
        let entry = session.commit(&store).unwrap();
        assert!(entry.completed);
        assert_eq!(entry.fill_ratio, 50.0);
        assert_eq!(entry.values.len(), 2);
        assert!(session.is_persisted());
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_commit_twice_without_edits_is_idempotent() {
        let templates = two_field_templates();
        let store = MemoryEntries::new();
        let mut session =
            begin_session(&templates, &store, YearId(1), UserId::new_v4(), date()).unwrap();

        session.apply_edit(FieldId(1), "Hoy agradezco...").unwrap();
        let first = session.commit(&store).unwrap();
        let second = session.commit(&store).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.row_count(), 1);
    }

    #[test]
    fn test_commit_sends_whole_payload_including_unchanged_fields() {
        let templates = two_field_templates();
        let store = MemoryEntries::new();
        let user = UserId::new_v4();
        let mut session = begin_session(&templates, &store, YearId(1), user, date()).unwrap();

        session.apply_edit(FieldId(1), "Gracias").unwrap();
        let entry = session.commit(&store).unwrap();

        let ids: Vec<i64> = entry.values.iter().map(|v| v.field_definition_id.0).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(entry.values[1].is_blank());
    }

    #[test]
    fn test_audio_edits_count_toward_completion() {
        let templates = FakeTemplates {
            fields: vec![FieldDefinition {
                id: FieldId(1),
                devotional_year_id: YearId(1),
                label: "Testimonio".to_string(),
                input_kind: InputKind::Audio,
                required: true,
                display_order: 1,
            }],
            configured: true,
        };
        let store = MemoryEntries::new();
        let mut session =
            begin_session(&templates, &store, YearId(1), UserId::new_v4(), date()).unwrap();

        assert!(session.commit(&store).is_err());
        session
            .apply_audio(FieldId(1), "https://cdn.example/t.mp3")
            .unwrap();
        let entry = session.commit(&store).unwrap();
        assert!(entry.completed);
        assert_eq!(entry.fill_ratio, 100.0);
    }
}
