//! Day resolution: turning `(devotional year, date)` into the template a
//! user should see.
//!
//! Resolution is data-driven, read-only, and idempotent: it walks master
//! month, then master day, then the ordered field schema, and assembles a
//! [`DayTemplate`]. A missing month or day template is a valid outcome
//! ([`Resolution::NotConfigured`]), not an error, and callers render it as an
//! informative empty state. Resolution never filters by year status; that is
//! a catalog-listing policy (see [`crate::stores::active_years`]).

use crate::calendar;
use crate::errors::AppResult;
use crate::model::{DayTemplate, FieldDefinition, YearId};
use crate::stores::TemplateRepository;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Why a date resolved to no template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotConfiguredReason {
    /// The devotional year has no master month for the date's month.
    NoMonthTemplate,
    /// The master month exists but has no master day for the date's day.
    NoDayTemplate,
}

/// Outcome of resolving one date against a devotional year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Resolution {
    /// The date maps to a templated day.
    Template(DayTemplate),
    /// Nothing is configured for this date.
    NotConfigured(NotConfiguredReason),
}

/// Resolves the day template for `(devotional_year_id, date)`.
///
/// # Errors
///
/// Propagates collaborator failures unchanged. A missing template is *not*
/// an error; it is reported as [`Resolution::NotConfigured`].
pub fn resolve(
    templates: &dyn TemplateRepository,
    devotional_year_id: YearId,
    date: NaiveDate,
) -> AppResult<Resolution> {
    debug!(
        year_id = devotional_year_id.0,
        date = %date,
        "Resolving day template"
    );

    let month = match templates.get_master_month(devotional_year_id, date.month())? {
        Some(month) => month,
        None => {
            debug!(month = date.month(), "No master month configured");
            return Ok(Resolution::NotConfigured(NotConfiguredReason::NoMonthTemplate));
        }
    };

    let day = match templates.get_master_day(month.id, date.day())? {
        Some(day) => day,
        None => {
            debug!(day = date.day(), "No master day configured");
            return Ok(Resolution::NotConfigured(NotConfiguredReason::NoDayTemplate));
        }
    };

    let mut schema = templates.get_field_definitions(devotional_year_id)?;
    sort_schema(&mut schema);

    Ok(Resolution::Template(DayTemplate {
        date,
        day_type: day.day_type,
        biblical_reading: day.biblical_reading,
        daily_verse_ref: day.daily_verse_ref,
        field_schema: schema,
    }))
}

/// Resolves from raw `(year, month, day)` components, validating them first.
///
/// # Errors
///
/// Returns `AppError::InvalidDate` when the components do not name a real
/// date (e.g. February 30th), otherwise behaves like [`resolve`].
pub fn resolve_ymd(
    templates: &dyn TemplateRepository,
    devotional_year_id: YearId,
    year: i32,
    month: u32,
    day: u32,
) -> AppResult<Resolution> {
    let date = calendar::validate_date(year, month, day)?;
    resolve(templates, devotional_year_id, date)
}

/// Applies the stable schema ordering: `display_order` ascending, `id`
/// ascending on ties, regardless of the collaborator's return order.
pub(crate) fn sort_schema(schema: &mut [FieldDefinition]) {
    schema.sort_by_key(|f| (f.display_order, f.id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::model::{
        DayId, DayType, DevotionalYear, FieldId, InputKind, MasterDay, MasterMonth, MonthId,
    };
    use std::collections::HashMap;

    /// Minimal in-memory template repository for resolver tests.
    struct FakeTemplates {
        months: HashMap<(YearId, u32), MasterMonth>,
        days: HashMap<(MonthId, u32), MasterDay>,
        fields: Vec<FieldDefinition>,
    }

    impl FakeTemplates {
        fn new() -> Self {
            FakeTemplates {
                months: HashMap::new(),
                days: HashMap::new(),
                fields: Vec::new(),
            }
        }

        fn with_january_day_15(mut self) -> Self {
            self.months.insert(
                (YearId(1), 1),
                MasterMonth {
                    id: MonthId(10),
                    devotional_year_id: YearId(1),
                    month_number: 1,
                    name: "Enero".to_string(),
                },
            );
            self.days.insert(
                (MonthId(10), 15),
                MasterDay {
                    id: DayId(100),
                    master_month_id: MonthId(10),
                    day_number: 15,
                    day_type: DayType::Normal,
                    biblical_reading: Some("Juan 3".to_string()),
                    daily_verse_ref: None,
                },
            );
            self
        }
    }

    impl TemplateRepository for FakeTemplates {
        fn get_devotional_years(&self) -> AppResult<Vec<DevotionalYear>> {
            Ok(vec![])
        }
        fn get_master_month(&self, year: YearId, n: u32) -> AppResult<Option<MasterMonth>> {
            Ok(self.months.get(&(year, n)).cloned())
        }
        fn get_master_day(&self, month: MonthId, n: u32) -> AppResult<Option<MasterDay>> {
            Ok(self.days.get(&(month, n)).cloned())
        }
        fn get_field_definitions(&self, _: YearId) -> AppResult<Vec<FieldDefinition>> {
            Ok(self.fields.clone())
        }
    }

    fn field(id: i64, order: i32) -> FieldDefinition {
        FieldDefinition {
            id: FieldId(id),
            devotional_year_id: YearId(1),
            label: format!("Campo {}", id),
            input_kind: InputKind::ShortText,
            required: false,
            display_order: order,
        }
    }

    #[test]
    fn test_resolve_missing_month_reports_no_month_template() {
        let repo = FakeTemplates::new();
        let date = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();

        let outcome = resolve(&repo, YearId(1), date).unwrap();
        assert_eq!(
            outcome,
            Resolution::NotConfigured(NotConfiguredReason::NoMonthTemplate)
        );
    }

    #[test]
    fn test_resolve_missing_day_reports_no_day_template() {
        let repo = FakeTemplates::new().with_january_day_15();
        let date = NaiveDate::from_ymd_opt(2025, 1, 16).unwrap();

        let outcome = resolve(&repo, YearId(1), date).unwrap();
        assert_eq!(
            outcome,
            Resolution::NotConfigured(NotConfiguredReason::NoDayTemplate)
        );
    }

    #[test]
    fn test_resolve_assembles_template_from_master_day() {
        let repo = FakeTemplates::new().with_january_day_15();
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        match resolve(&repo, YearId(1), date).unwrap() {
            Resolution::Template(template) => {
                assert_eq!(template.date, date);
                assert_eq!(template.day_type, DayType::Normal);
                assert_eq!(template.biblical_reading.as_deref(), Some("Juan 3"));
                assert!(template.field_schema.is_empty());
            }
            other => panic!("expected template, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut repo = FakeTemplates::new().with_january_day_15();
        repo.fields = vec![field(2, 1), field(1, 2)];
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        let first = resolve(&repo, YearId(1), date).unwrap();
        let second = resolve(&repo, YearId(1), date).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_schema_ordering_is_stable_regardless_of_return_order() {
        let mut repo = FakeTemplates::new().with_january_day_15();
        // Shuffled return order, with a display_order tie between 3 and 1.
        repo.fields = vec![field(3, 1), field(2, 2), field(1, 1)];
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        match resolve(&repo, YearId(1), date).unwrap() {
            Resolution::Template(template) => {
                let ids: Vec<i64> = template.field_schema.iter().map(|f| f.id.0).collect();
                // Ties broken by id ascending.
                assert_eq!(ids, vec![1, 3, 2]);
            }
            other => panic!("expected template, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_ymd_rejects_february_30() {
        let repo = FakeTemplates::new();
        let err = resolve_ymd(&repo, YearId(1), 2025, 2, 30).unwrap_err();
        assert!(matches!(err, AppError::InvalidDate(_)));
    }
}
