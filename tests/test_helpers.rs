//! Shared in-memory collaborator fakes for integration tests.
//!
//! `MemoryTemplates` is a builder-style template repository; `MemoryEntries`
//! mirrors the `(user_id, date)` uniqueness constraint of the real stores.

#![allow(dead_code)]

use chrono::{Datelike, NaiveDate};
use devocional::errors::AppResult;
use devocional::model::{
    DayId, DayType, DevotionalYear, Entry, EntryDraft, EntryId, FieldDefinition, FieldId,
    InputKind, MasterDay, MasterMonth, MonthId, UserId, YearId, YearStatus,
};
use devocional::stores::{EntryStore, TemplateRepository};
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Default)]
pub struct MemoryTemplates {
    pub years: Vec<DevotionalYear>,
    pub months: HashMap<(YearId, u32), MasterMonth>,
    pub days: HashMap<(MonthId, u32), MasterDay>,
    pub fields: Vec<FieldDefinition>,
}

impl MemoryTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_year(mut self, id: i64, year: i32, title: &str, status: YearStatus) -> Self {
        self.years.push(DevotionalYear {
            id: YearId(id),
            year,
            title: title.to_string(),
            theme: String::new(),
            status,
            cover_asset_ref: None,
            logo_asset_ref: None,
        });
        self
    }

    pub fn with_month(mut self, year_id: i64, month_id: i64, month_number: u32, name: &str) -> Self {
        self.months.insert(
            (YearId(year_id), month_number),
            MasterMonth {
                id: MonthId(month_id),
                devotional_year_id: YearId(year_id),
                month_number,
                name: name.to_string(),
            },
        );
        self
    }

    pub fn with_day(
        mut self,
        month_id: i64,
        day_id: i64,
        day_number: u32,
        day_type: DayType,
        reading: Option<&str>,
        verse: Option<&str>,
    ) -> Self {
        self.days.insert(
            (MonthId(month_id), day_number),
            MasterDay {
                id: DayId(day_id),
                master_month_id: MonthId(month_id),
                day_number,
                day_type,
                biblical_reading: reading.map(String::from),
                daily_verse_ref: verse.map(String::from),
            },
        );
        self
    }

    pub fn with_field(
        mut self,
        year_id: i64,
        field_id: i64,
        label: &str,
        required: bool,
        display_order: i32,
    ) -> Self {
        self.fields.push(FieldDefinition {
            id: FieldId(field_id),
            devotional_year_id: YearId(year_id),
            label: label.to_string(),
            input_kind: InputKind::LongText,
            required,
            display_order,
        });
        self
    }
}

impl TemplateRepository for MemoryTemplates {
    fn get_devotional_years(&self) -> AppResult<Vec<DevotionalYear>> {
        Ok(self.years.clone())
    }

    fn get_master_month(&self, year: YearId, n: u32) -> AppResult<Option<MasterMonth>> {
        Ok(self.months.get(&(year, n)).cloned())
    }

    fn get_master_day(&self, month: MonthId, n: u32) -> AppResult<Option<MasterDay>> {
        Ok(self.days.get(&(month, n)).cloned())
    }

    fn get_field_definitions(&self, year: YearId) -> AppResult<Vec<FieldDefinition>> {
        Ok(self
            .fields
            .iter()
            .filter(|f| f.devotional_year_id == year)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryEntries {
    rows: RefCell<HashMap<(UserId, NaiveDate), Entry>>,
    next_id: RefCell<i64>,
}

impl MemoryEntries {
    pub fn new() -> Self {
        MemoryEntries {
            rows: RefCell::new(HashMap::new()),
            next_id: RefCell::new(1),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.borrow().len()
    }
}

impl EntryStore for MemoryEntries {
    fn get_entry(&self, user: UserId, date: NaiveDate) -> AppResult<Option<Entry>> {
        Ok(self.rows.borrow().get(&(user, date)).cloned())
    }

    fn list_entries(&self, user: UserId, year: i32, month: u32) -> AppResult<Vec<Entry>> {
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
