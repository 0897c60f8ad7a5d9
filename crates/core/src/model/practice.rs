use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::PracticeId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PracticeError {
    #[error("practice title cannot be empty")]
    EmptyTitle,

    #[error("practice duration must be > 0 minutes")]
    InvalidDuration,
}

//
// ─── PRACTICE ──────────────────────────────────────────────────────────────────
//

/// A named, timed set of questions configured by a teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Practice {
    id: PracticeId,
    title: String,
    description: Option<String>,
    duration_minutes: u32,
    max_points: u32,
    graded_duration: bool,
    is_active: bool,
    allow_review: bool,
    created_at: DateTime<Utc>,
}

impl Practice {
    /// Creates an active practice with review enabled and no time bonus.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError` if the title is blank or the duration is zero.
    pub fn new(
        id: PracticeId,
        title: impl Into<String>,
        description: Option<String>,
        duration_minutes: u32,
        max_points: u32,
        created_at: DateTime<Utc>,
    ) -> Result<Self, PracticeError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(PracticeError::EmptyTitle);
        }
        if duration_minutes == 0 {
            return Err(PracticeError::InvalidDuration);
        }
        let description = description.filter(|d| !d.trim().is_empty());

        Ok(Self {
            id,
            title,
            description,
            duration_minutes,
            max_points,
            graded_duration: false,
            is_active: true,
            allow_review: true,
            created_at,
        })
    }

    /// Rehydrate a practice from persisted storage.
    ///
    /// # Errors
    ///
    /// Same validation as [`Practice::new`].
    #[allow(clippy::too_many_arguments, clippy::fn_params_excessive_bools)]
    pub fn from_persisted(
        id: PracticeId,
        title: String,
        description: Option<String>,
        duration_minutes: u32,
        max_points: u32,
        graded_duration: bool,
        is_active: bool,
        allow_review: bool,
        created_at: DateTime<Utc>,
    ) -> Result<Self, PracticeError> {
        Ok(Self::new(id, title, description, duration_minutes, max_points, created_at)?
            .with_graded_duration(graded_duration)
            .with_active(is_active)
            .with_allow_review(allow_review))
    }

    /// Enables the time bonus applied to points for early submission.
    #[must_use]
    pub fn with_graded_duration(mut self, graded_duration: bool) -> Self {
        self.graded_duration = graded_duration;
        self
    }

    #[must_use]
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    #[must_use]
    pub fn with_allow_review(mut self, allow_review: bool) -> Self {
        self.allow_review = allow_review;
        self
    }

    #[must_use]
    pub fn id(&self) -> PracticeId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    #[must_use]
    pub fn duration_secs(&self) -> u64 {
        u64::from(self.duration_minutes) * 60
    }

    #[must_use]
    pub fn max_points(&self) -> u32 {
        self.max_points
    }

    #[must_use]
    pub fn graded_duration(&self) -> bool {
        self.graded_duration
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    #[must_use]
    pub fn allow_review(&self) -> bool {
        self.allow_review
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn new_practice_defaults() {
        let p = Practice::new(PracticeId::new(1), "Algebra", None, 90, 100, fixed_now()).unwrap();
        assert!(p.is_active());
        assert!(p.allow_review());
        assert!(!p.graded_duration());
        assert_eq!(p.duration_secs(), 5_400);
    }

    #[test]
    fn rejects_blank_title_and_zero_duration() {
        let err = Practice::new(PracticeId::new(1), " ", None, 10, 0, fixed_now()).unwrap_err();
        assert_eq!(err, PracticeError::EmptyTitle);
        let err = Practice::new(PracticeId::new(1), "T", None, 0, 0, fixed_now()).unwrap_err();
        assert_eq!(err, PracticeError::InvalidDuration);
    }

    #[test]
    fn blank_description_is_dropped() {
        let p = Practice::new(PracticeId::new(1), "T", Some("  ".into()), 5, 0, fixed_now())
            .unwrap();
        assert_eq!(p.description(), None);
    }
}
