//! Host configuration, read from the environment (and `.env` outside tests).

use std::time::Duration;

use exam_core::model::{PracticeId, StudentId};
use services::{RetryPolicy, SessionSettings};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid value for the environment variable {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub db_url: String,
    pub practice_id: PracticeId,
    pub student_id: Option<StudentId>,
    pub student_name: String,
    pub log_filter: String,
    pub settings: SessionSettings,
}

impl Config {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when a variable is set but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; unset variables fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when a variable is set but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_url = lookup("EXAM_DB_URL").unwrap_or_else(|| "sqlite://exam.sqlite3".into());
        let practice_id = parse_or("EXAM_PRACTICE_ID", &lookup, 1_u64)?;
        let student_id = lookup("EXAM_STUDENT_ID")
            .map(|raw| {
                raw.parse::<StudentId>()
                    .map_err(|e| ConfigError::InvalidValue("EXAM_STUDENT_ID", e.to_string()))
            })
            .transpose()?;
        let student_name = lookup("EXAM_STUDENT_NAME").unwrap_or_else(|| "Student".into());
        let log_filter = lookup("RUST_LOG").unwrap_or_else(|| "warn".into());

        let debounce_ms = parse_or("EXAM_AUTOSAVE_DEBOUNCE_MS", &lookup, 1_000_u64)?;
        let max_attempts = parse_or("EXAM_SUBMIT_MAX_ATTEMPTS", &lookup, 3_u32)?;
        let backoff_ms = parse_or("EXAM_SUBMIT_BACKOFF_MS", &lookup, 500_u64)?;

        Ok(Self {
            db_url,
            practice_id: PracticeId::new(practice_id),
            student_id,
            student_name,
            log_filter,
            settings: SessionSettings {
                autosave_debounce: Duration::from_millis(debounce_ms),
                submit_retry: RetryPolicy::new(max_attempts, Duration::from_millis(backoff_ms)),
            },
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
    }
}
