use async_trait::async_trait;
use chrono::{DateTime, Utc};
use exam_core::model::{
    AnswerSheet, AttemptDraft, AttemptId, ExamResult, Practice, PracticeId, Question, StudentId,
    SubmissionId,
};
use exam_core::scoring::{points_earned, score_attempt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    /// True for failures worth retrying (network or pool trouble).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Connection(_))
    }
}

/// Everything the store needs to record a finished attempt.
///
/// The store re-derives the score from its own question bank rather than trusting
/// a client-computed value. `submission_id` is unique per stored attempt: a
/// second submit with the same id returns the first record unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptSubmission {
    pub submission_id: SubmissionId,
    pub practice_id: PracticeId,
    pub student_id: StudentId,
    pub sheet: AnswerSheet,
    pub time_spent_secs: u64,
    pub completed_at: DateTime<Utc>,
}

/// A persisted, scored attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAttempt {
    pub id: AttemptId,
    pub submission_id: SubmissionId,
    pub practice_id: PracticeId,
    pub student_id: StudentId,
    pub attempt_number: u32,
    pub sheet: AnswerSheet,
    pub result: ExamResult,
    pub points_earned: u32,
    pub time_spent_secs: u64,
    pub completed_at: DateTime<Utc>,
}

impl StoredAttempt {
    /// Score a submission against the practice's questions.
    #[must_use]
    pub fn score(
        id: AttemptId,
        attempt_number: u32,
        practice: &Practice,
        questions: &[Question],
        submission: &AttemptSubmission,
    ) -> Self {
        let result = score_attempt(questions, &submission.sheet);
        let points_earned = points_earned(
            result.correct_count(),
            result.total(),
            practice.max_points(),
            practice.graded_duration(),
            practice.duration_minutes(),
            submission.time_spent_secs,
        );
        Self {
            id,
            submission_id: submission.submission_id,
            practice_id: submission.practice_id,
            student_id: submission.student_id,
            attempt_number,
            sheet: submission.sheet.clone(),
            result,
            points_earned,
            time_spent_secs: submission.time_spent_secs,
            completed_at: submission.completed_at,
        }
    }
}

/// Question Bank Provider contract.
#[async_trait]
pub trait QuestionBankRepository: Send + Sync {
    /// Persist or update a practice.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the practice cannot be stored.
    async fn upsert_practice(&self, practice: &Practice) -> Result<(), StorageError>;

    /// Fetch a practice by ID, active or not.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_practice(&self, id: PracticeId) -> Result<Practice, StorageError>;

    /// Replace the ordered question list of a practice.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the practice does not exist.
    async fn upsert_questions(
        &self,
        practice_id: PracticeId,
        questions: &[Question],
    ) -> Result<(), StorageError>;

    /// Ordered questions of an active practice.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the practice is missing or inactive.
    async fn load_questions(&self, practice_id: PracticeId) -> Result<Vec<Question>, StorageError>;

    /// Active practices, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_active_practices(&self) -> Result<Vec<Practice>, StorageError>;
}

/// Attempt Persistence Service contract.
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Store the latest auto-save snapshot for (practice, student), replacing any older one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the draft cannot be stored.
    async fn save_draft(&self, draft: &AttemptDraft) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn load_draft(
        &self,
        practice_id: PracticeId,
        student_id: StudentId,
    ) -> Result<Option<AttemptDraft>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn clear_draft(
        &self,
        practice_id: PracticeId,
        student_id: StudentId,
    ) -> Result<(), StorageError>;

    /// Score and record a finished attempt.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the practice is unknown, or other storage errors.
    async fn submit_attempt(
        &self,
        submission: &AttemptSubmission,
    ) -> Result<StoredAttempt, StorageError>;

    /// Attempts of a student for a practice, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_attempts(
        &self,
        practice_id: PracticeId,
        student_id: StudentId,
    ) -> Result<Vec<StoredAttempt>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    practices: Arc<Mutex<HashMap<PracticeId, Practice>>>,
    questions: Arc<Mutex<HashMap<PracticeId, Vec<Question>>>>,
    drafts: Arc<Mutex<HashMap<(PracticeId, StudentId), AttemptDraft>>>,
    attempts: Arc<Mutex<Vec<StoredAttempt>>>,
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn practice_and_questions(
        &self,
        practice_id: PracticeId,
    ) -> Result<(Practice, Vec<Question>), StorageError> {
        let practice = self
            .practices
            .lock()
            .map_err(poisoned)?
            .get(&practice_id)
            .cloned()
            .ok_or(StorageError::NotFound)?;
        let questions = self
            .questions
            .lock()
            .map_err(poisoned)?
            .get(&practice_id)
            .cloned()
            .unwrap_or_default();
        Ok((practice, questions))
    }
}

#[async_trait]
impl QuestionBankRepository for InMemoryRepository {
    async fn upsert_practice(&self, practice: &Practice) -> Result<(), StorageError> {
        let mut guard = self.practices.lock().map_err(poisoned)?;
        guard.insert(practice.id(), practice.clone());
        Ok(())
    }

    async fn get_practice(&self, id: PracticeId) -> Result<Practice, StorageError> {
        let guard = self.practices.lock().map_err(poisoned)?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn upsert_questions(
        &self,
        practice_id: PracticeId,
        questions: &[Question],
    ) -> Result<(), StorageError> {
        if !self.practices.lock().map_err(poisoned)?.contains_key(&practice_id) {
            return Err(StorageError::NotFound);
        }
        let mut guard = self.questions.lock().map_err(poisoned)?;
        guard.insert(practice_id, questions.to_vec());
        Ok(())
    }

    async fn load_questions(&self, practice_id: PracticeId) -> Result<Vec<Question>, StorageError> {
        let (practice, questions) = self.practice_and_questions(practice_id)?;
        if !practice.is_active() {
            return Err(StorageError::NotFound);
        }
        Ok(questions)
    }

    async fn list_active_practices(&self) -> Result<Vec<Practice>, StorageError> {
        let guard = self.practices.lock().map_err(poisoned)?;
        let mut active: Vec<_> = guard.values().filter(|p| p.is_active()).cloned().collect();
        active.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then(b.id().cmp(&a.id())));
        Ok(active)
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn save_draft(&self, draft: &AttemptDraft) -> Result<(), StorageError> {
        let mut guard = self.drafts.lock().map_err(poisoned)?;
        guard.insert((draft.practice_id, draft.student_id), draft.clone());
        Ok(())
    }

    async fn load_draft(
        &self,
        practice_id: PracticeId,
        student_id: StudentId,
    ) -> Result<Option<AttemptDraft>, StorageError> {
        let guard = self.drafts.lock().map_err(poisoned)?;
        Ok(guard.get(&(practice_id, student_id)).cloned())
    }

    async fn clear_draft(
        &self,
        practice_id: PracticeId,
        student_id: StudentId,
    ) -> Result<(), StorageError> {
        let mut guard = self.drafts.lock().map_err(poisoned)?;
        guard.remove(&(practice_id, student_id));
        Ok(())
    }

    async fn submit_attempt(
        &self,
        submission: &AttemptSubmission,
    ) -> Result<StoredAttempt, StorageError> {
        let (practice, questions) = self.practice_and_questions(submission.practice_id)?;
        let mut guard = self.attempts.lock().map_err(poisoned)?;
        if let Some(existing) = guard
            .iter()
            .find(|a| a.submission_id == submission.submission_id)
        {
            return Ok(existing.clone());
        }
        let previous = guard
            .iter()
            .filter(|a| {
                a.practice_id == submission.practice_id && a.student_id == submission.student_id
            })
            .map(|a| a.attempt_number)
            .max()
            .unwrap_or(0);
        let id = AttemptId::new(guard.len() as u64 + 1);
        let stored = StoredAttempt::score(id, previous + 1, &practice, &questions, submission);
        guard.push(stored.clone());
        Ok(stored)
    }

    async fn list_attempts(
        &self,
        practice_id: PracticeId,
        student_id: StudentId,
    ) -> Result<Vec<StoredAttempt>, StorageError> {
        let guard = self.attempts.lock().map_err(poisoned)?;
        let mut found: Vec<_> = guard
            .iter()
            .filter(|a| a.practice_id == practice_id && a.student_id == student_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.attempt_number.cmp(&a.attempt_number));
        Ok(found)
    }
}

/// Aggregates the question bank and attempt store behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub practices: Arc<dyn QuestionBankRepository>,
    pub attempts: Arc<dyn AttemptRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let practices: Arc<dyn QuestionBankRepository> = Arc::new(repo.clone());
        let attempts: Arc<dyn AttemptRepository> = Arc::new(repo);
        Self {
            practices,
            attempts,
        }
    }
}
