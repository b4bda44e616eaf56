//! HTTP+JSON client for a remote template repository and entry store.
//!
//! This is the deployment where templates and entries live behind a backend
//! service: every request carries a bearer token issued by the excluded auth
//! layer. The client maps 404 to `absent`, any other non-success status to
//! [`CollaboratorError::Status`], and transport failures to
//! [`CollaboratorError::Transport`]. There is no retry; callers own timeout
//! and retry policy.

use crate::errors::{AppResult, CollaboratorError};
use crate::model::{
    DevotionalYear, Entry, EntryDraft, FieldDefinition, MasterDay, MasterMonth, MonthId, UserId,
    YearId,
};
use crate::stores::{EntryStore, TemplateRepository};
use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Client for a remote devotional backend.
pub struct ApiClient {
    base_url: String,
    token: String,
    client: Client,
}

impl ApiClient {
    /// Creates a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the backend (e.g. "https://backend.example")
    /// * `token` - Bearer token attached to every request
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        ApiClient {
            base_url,
            token: token.into(),
            client: Client::new(),
        }
    }

    /// GETs a resource, treating 404 as absence.
    fn get_optional<T: DeserializeOwned>(&self, path: &str) -> AppResult<Option<T>> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .map_err(CollaboratorError::Transport)?;

        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(CollaboratorError::Status { status, body }.into());
        }

        let body = response.text().map_err(CollaboratorError::Transport)?;
        let value = serde_json::from_str(&body).map_err(CollaboratorError::Decode)?;
        Ok(Some(value))
    }

    /// GETs a resource that must exist (404 is a collaborator failure).
    fn get_required<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        match self.get_optional(path)? {
            Some(value) => Ok(value),
            None => Err(CollaboratorError::Status {
                status: 404,
                body: format!("{} not found", path),
            }
            .into()),
        }
    }
}

impl TemplateRepository for ApiClient {
    fn get_devotional_years(&self) -> AppResult<Vec<DevotionalYear>> {
        self.get_required("/api/devotional-years")
    }

    fn get_master_month(&self, year: YearId, month_number: u32) -> AppResult<Option<MasterMonth>> {
        self.get_optional(&format!(
            "/api/devotional-years/{}/months/{}",
            year, month_number
        ))
    }

    fn get_master_day(&self, month: MonthId, day_number: u32) -> AppResult<Option<MasterDay>> {
        self.get_optional(&format!("/api/months/{}/days/{}", month, day_number))
    }

    fn get_field_definitions(&self, year: YearId) -> AppResult<Vec<FieldDefinition>> {
        self.get_required(&format!("/api/devotional-years/{}/fields", year))
    }
}

impl EntryStore for ApiClient {
    fn get_entry(&self, user: UserId, date: NaiveDate) -> AppResult<Option<Entry>> {
        self.get_optional(&format!("/api/users/{}/entries/{}", user, date))
    }

    fn list_entries(&self, user: UserId, year: i32, month: u32) -> AppResult<Vec<Entry>> {
        self.get_required(&format!(
            "/api/users/{}/entries?year={}&month={}",
            user, year, month
        ))
    }

    fn upsert_entry(&self, draft: &EntryDraft) -> AppResult<Entry> {
        let url = format!(
            "{}/api/users/{}/entries/{}",
            self.base_url, draft.user_id, draft.date
        );
        debug!(%url, "PUT");

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .json(draft)
            .send()
            .map_err(CollaboratorError::Transport)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(CollaboratorError::Status { status, body }.into());
        }

        let body = response.text().map_err(CollaboratorError::Transport)?;
        serde_json::from_str(&body).map_err(|e| CollaboratorError::Decode(e).into())
    }
}
