//! Configuration management for the devocional application.
//!
//! This module handles loading and validating configuration settings from
//! environment variables, with sensible defaults.
//!
//! # Environment Variables
//!
//! - `DEVOCIONAL_DB`: Path to the SQLite database (defaults to
//!   `~/.devocional/devocional.db`)
//! - `DEVOCIONAL_API_URL`: Base URL of a remote collaborator; when set, the
//!   CLI talks to the remote service instead of the local database
//! - `DEVOCIONAL_TOKEN`: Bearer token attached to remote requests
//! - `HOME`: Used for expanding the default database path

use crate::constants::{
    DEFAULT_DB_SUBPATH, ENV_VAR_API_URL, ENV_VAR_DB, ENV_VAR_HOME, ENV_VAR_TOKEN,
    REDACTED_PLACEHOLDER,
};
use crate::errors::{AppError, AppResult};
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Configuration for the devocional application.
pub struct Config {
    /// Path to the local SQLite database.
    pub db_path: PathBuf,
    /// Base URL of the remote collaborator, if configured.
    pub api_url: Option<String>,
    /// Bearer token for the remote collaborator.
    pub token: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("db_path", &self.db_path)
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| REDACTED_PLACEHOLDER))
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when no database path is configured and
    /// `HOME` is unset, so no default can be derived.
    pub fn load() -> AppResult<Self> {
        let db_path = match env::var(ENV_VAR_DB) {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => {
                let home = env::var(ENV_VAR_HOME).map_err(|_| {
                    AppError::Config(format!(
                        "{} is not set and {} is unavailable to derive a default",
                        ENV_VAR_DB, ENV_VAR_HOME
                    ))
                })?;
                PathBuf::from(home).join(DEFAULT_DB_SUBPATH)
            }
        };

        let api_url = env::var(ENV_VAR_API_URL).ok().filter(|s| !s.trim().is_empty());
        let token = env::var(ENV_VAR_TOKEN).ok().filter(|s| !s.trim().is_empty());

        Ok(Config {
            db_path,
            api_url,
            token,
        })
    }

    /// Validates the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when the remote URL is malformed or a
    /// remote URL is set without a bearer token.
    pub fn validate(&self) -> AppResult<()> {
        if let Some(url) = &self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AppError::Config(format!(
                    "{} must start with http:// or https://, got '{}'",
                    ENV_VAR_API_URL, url
                )));
            }
            if self.token.is_none() {
                return Err(AppError::Config(format!(
                    "{} is set but {} is missing; the collaborator requires bearer auth",
                    ENV_VAR_API_URL, ENV_VAR_TOKEN
                )));
            }
        }
        Ok(())
    }

    /// True when a remote collaborator is configured.
    pub fn uses_remote(&self) -> bool {
        self.api_url.is_some()
    }
}
