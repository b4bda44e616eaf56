//! Data model for the devotional journal.
//!
//! Template entities (`DevotionalYear`, `MasterMonth`, `MasterDay`,
//! `FieldDefinition`) are authored by an administrator and owned by the
//! template repository; user entities (`Entry`, `FieldValue`) are owned by the
//! entry store and scoped to the user who created them. The core only reads
//! template entities and never mutates them.
//!
//! [`DayTemplate`] is a resolved, read-only projection and is never persisted;
//! it is recomputed per request by the resolver.

use crate::constants::DEFAULT_VERSE_REF;
use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A user's identity, issued by the external auth layer.
pub type UserId = uuid::Uuid;

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(
    /// Identifier of a [`DevotionalYear`].
    YearId
);
id_newtype!(
    /// Identifier of a [`MasterMonth`].
    MonthId
);
id_newtype!(
    /// Identifier of a [`MasterDay`].
    DayId
);
id_newtype!(
    /// Identifier of a [`FieldDefinition`].
    FieldId
);
id_newtype!(
    /// Identifier of a persisted [`Entry`].
    EntryId
);

/// Lifecycle status of a devotional year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum YearStatus {
    /// Still being authored; not offered to users.
    Draft,
    /// Offered in the catalog.
    Active,
    /// No longer offered; existing entries remain readable.
    Discontinued,
}

impl YearStatus {
    /// Stable string form used in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            YearStatus::Draft => "DRAFT",
            YearStatus::Active => "ACTIVE",
            YearStatus::Discontinued => "DISCONTINUED",
        }
    }

    /// Parses the stable string form.
    pub fn parse(s: &str) -> AppResult<Self> {
        match s {
            "DRAFT" => Ok(YearStatus::Draft),
            "ACTIVE" => Ok(YearStatus::Active),
            "DISCONTINUED" => Ok(YearStatus::Discontinued),
            other => Err(AppError::Config(format!("unknown year status '{}'", other))),
        }
    }
}

/// A yearly devotional definition: title, theme, and the calendar of day
/// templates and field schema it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevotionalYear {
    pub id: YearId,
    pub year: i32,
    pub title: String,
    pub theme: String,
    pub status: YearStatus,
    /// Cover image asset reference, served by the excluded asset layer.
    pub cover_asset_ref: Option<String>,
    /// Logo asset reference, served by the excluded asset layer.
    pub logo_asset_ref: Option<String>,
}

/// Administrator-authored template content for one month of a devotional year.
/// At most one per `(devotional_year_id, month_number)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterMonth {
    pub id: MonthId,
    pub devotional_year_id: YearId,
    /// Calendar month, 1..=12.
    pub month_number: u32,
    pub name: String,
}

/// Kind of a templated day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayType {
    Normal,
    Sunday,
}

impl DayType {
    /// Stable string form used in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            DayType::Normal => "NORMAL",
            DayType::Sunday => "SUNDAY",
        }
    }

    /// Parses the stable string form.
    pub fn parse(s: &str) -> AppResult<Self> {
        match s {
            "NORMAL" => Ok(DayType::Normal),
            "SUNDAY" => Ok(DayType::Sunday),
            other => Err(AppError::Config(format!("unknown day type '{}'", other))),
        }
    }
}

/// Administrator-authored template content for one day of a master month.
/// At most one per `(master_month_id, day_number)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterDay {
    pub id: DayId,
    pub master_month_id: MonthId,
    /// Day of month, 1..=31 bounded by the month.
    pub day_number: u32,
    pub day_type: DayType,
    pub biblical_reading: Option<String>,
    pub daily_verse_ref: Option<String>,
}

/// Input widget kind of a field definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputKind {
    ShortText,
    LongText,
    Audio,
}

impl InputKind {
    /// Stable string form used in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::ShortText => "SHORT_TEXT",
            InputKind::LongText => "LONG_TEXT",
            InputKind::Audio => "AUDIO",
        }
    }

    /// Parses the stable string form.
    pub fn parse(s: &str) -> AppResult<Self> {
        match s {
            "SHORT_TEXT" => Ok(InputKind::ShortText),
            "LONG_TEXT" => Ok(InputKind::LongText),
            "AUDIO" => Ok(InputKind::Audio),
            other => Err(AppError::Config(format!("unknown input kind '{}'", other))),
        }
    }
}

/// A named, typed input slot appearing on every day's entry form of a
/// devotional year. The schema is year-scoped, not day-scoped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: FieldId,
    pub devotional_year_id: YearId,
    pub label: String,
    pub input_kind: InputKind,
    pub required: bool,
    pub display_order: i32,
}

/// A user's saved (or draft) value for one field definition.
///
/// Audio fields carry a playback URL next to the text; for other kinds
/// `audio_url` stays empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub field_definition_id: FieldId,
    pub text: String,
    pub audio_url: Option<String>,
}

impl FieldValue {
    /// An empty value for the given field, used to seed fresh sessions.
    pub fn empty(field: FieldId) -> Self {
        FieldValue {
            field_definition_id: field,
            text: String::new(),
            audio_url: None,
        }
    }

    /// True when the value holds neither text nor an audio URL.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
            && self.audio_url.as_deref().map_or(true, |u| u.trim().is_empty())
    }
}

/// A user's saved answers for one calendar date.
///
/// One `Entry` exists per `(user_id, date)`; saves on the same key update in
/// place. `completed` and `fill_ratio` are derived from the schema and
/// recomputed on every commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub devotional_year_id: YearId,
    /// True once every required field definition holds a non-blank value.
    pub completed: bool,
    /// Percentage (0..=100) of schema fields holding a non-blank value.
    pub fill_ratio: f64,
    pub values: Vec<FieldValue>,
}

/// The full value set a commit hands to the entry store: one row per
/// `(user_id, date)`, whole payload every time, never a partial diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub devotional_year_id: YearId,
    pub completed: bool,
    pub fill_ratio: f64,
    pub values: Vec<FieldValue>,
}

/// The resolved, read-only projection of one templated day.
///
/// Assembled by the resolver from the master day content plus the ordered
/// field schema; never stored, recomputed per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTemplate {
    pub date: NaiveDate,
    pub day_type: DayType,
    pub biblical_reading: Option<String>,
    pub daily_verse_ref: Option<String>,
    /// Field schema ordered by `display_order` ascending, `id` ascending on ties.
    pub field_schema: Vec<FieldDefinition>,
}

impl DayTemplate {
    /// The verse reference to display for this day.
    ///
    /// Normal days show the biblical reading; Sunday days show the daily
    /// verse. A blank preferred source falls back to the other, and a day
    /// with neither falls back to the default verse.
    pub fn verse_reference(&self) -> &str {
        let reading = self.biblical_reading.as_deref().filter(|s| !s.trim().is_empty());
        let verse = self.daily_verse_ref.as_deref().filter(|s| !s.trim().is_empty());
        let preferred = match self.day_type {
            DayType::Normal => reading.or(verse),
            DayType::Sunday => verse.or(reading),
        };
        preferred.unwrap_or(DEFAULT_VERSE_REF)
    }
}

/// Typed map of draft values keyed by field definition id.
///
/// Replaces the loose index-by-id object of the observed client: the key set
/// is fixed at construction from the schema, `set` on an unknown key fails
/// with `UnknownField` instead of silently creating an entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueMap {
    inner: BTreeMap<FieldId, FieldValue>,
}

impl ValueMap {
    /// Builds a map with one empty value per schema field.
    pub fn from_schema(schema: &[FieldDefinition]) -> Self {
        ValueMap {
            inner: schema
                .iter()
                .map(|f| (f.id, FieldValue::empty(f.id)))
                .collect(),
        }
    }

    /// Returns the value for a field, if the field is part of the schema.
    pub fn get(&self, field: FieldId) -> Option<&FieldValue> {
        self.inner.get(&field)
    }

    /// Replaces the value for a known field.
    ///
    /// # Errors
    ///
    /// Returns `AppError::UnknownField` when the field is not part of the
    /// schema this map was built from.
    pub fn set(&mut self, field: FieldId, value: FieldValue) -> AppResult<()> {
        match self.inner.get_mut(&field) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(AppError::UnknownField(field)),
        }
    }

    /// Returns all values, ordered by field id.
    pub fn to_list(&self) -> Vec<FieldValue> {
        self.inner.values().cloned().collect()
    }

    /// Number of fields in the map.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True when the map holds no fields at all.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn template(day_type: DayType, reading: Option<&str>, verse: Option<&str>) -> DayTemplate {
        DayTemplate {
            date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            day_type,
            biblical_reading: reading.map(String::from),
            daily_verse_ref: verse.map(String::from),
            field_schema: vec![],
        }
    }

    #[test]
    fn test_verse_reference_prefers_reading_on_normal_days() {
        let t = template(DayType::Normal, Some("Juan 3"), Some("Salmo 23:1"));
        assert_eq!(t.verse_reference(), "Juan 3");
    }

    #[test]
    fn test_verse_reference_prefers_verse_on_sundays() {
        let t = template(DayType::Sunday, Some("Juan 3"), Some("Salmo 23:1"));
        assert_eq!(t.verse_reference(), "Salmo 23:1");
    }

    #[test]
    fn test_verse_reference_falls_back_across_sources() {
        let t = template(DayType::Sunday, Some("Juan 3"), None);
        assert_eq!(t.verse_reference(), "Juan 3");

        let t = template(DayType::Normal, None, Some("Salmo 23:1"));
        assert_eq!(t.verse_reference(), "Salmo 23:1");

        let t = template(DayType::Normal, Some("  "), None);
        assert_eq!(t.verse_reference(), DEFAULT_VERSE_REF);
    }

    #[test]
    fn test_value_map_set_unknown_field_fails() {
        let schema = vec![field(1, "Gratitud", true, 1)];
        let mut map = ValueMap::from_schema(&schema);

        let err = map
            .set(FieldId(99), FieldValue::empty(FieldId(99)))
            .unwrap_err();
        assert!(matches!(err, AppError::UnknownField(FieldId(99))));
    }

    #[test]
    fn test_value_map_set_and_get() {
        let schema = vec![field(1, "Gratitud", true, 1), field(2, "Notas", false, 2)];
        let mut map = ValueMap::from_schema(&schema);
        assert_eq!(map.len(), 2);
        assert!(map.get(FieldId(1)).unwrap().is_blank());

        let value = FieldValue {
            field_definition_id: FieldId(1),
            text: "Hoy agradezco".to_string(),
            audio_url: None,
        };
        map.set(FieldId(1), value.clone()).unwrap();
        assert_eq!(map.get(FieldId(1)), Some(&value));

        let listed = map.to_list();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].field_definition_id, FieldId(1));
    }

    #[test]
    fn test_field_value_blankness() {
        let mut value = FieldValue::empty(FieldId(1));
        assert!(value.is_blank());

        value.text = "   ".to_string();
        assert!(value.is_blank());

        value.audio_url = Some("https://cdn.example/a.mp3".to_string());
        assert!(!value.is_blank());
    }

    #[test]
    fn test_status_and_kind_round_trip_storage_form() {
        for status in [YearStatus::Draft, YearStatus::Active, YearStatus::Discontinued] {
            assert_eq!(YearStatus::parse(status.as_str()).unwrap(), status);
        }
        for kind in [InputKind::ShortText, InputKind::LongText, InputKind::Audio] {
            assert_eq!(InputKind::parse(kind.as_str()).unwrap(), kind);
        }
        for day_type in [DayType::Normal, DayType::Sunday] {
            assert_eq!(DayType::parse(day_type.as_str()).unwrap(), day_type);
        }
        assert!(YearStatus::parse("RETIRED").is_err());
    }
}
