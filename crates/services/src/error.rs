//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::model::PracticeId;
use storage::repository::StorageError;

/// Errors emitted by the exam session and its controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("practice {0} does not exist or is not active")]
    PracticeNotFound(PracticeId),
    #[error("practice {0} has no questions")]
    NoQuestions(PracticeId),
    #[error("no signed-in user")]
    Unauthenticated,
    #[error("session already submitted")]
    AlreadySubmitted,
    #[error("answers can only change while taking the exam")]
    NotTaking,
    #[error("session has not been submitted yet")]
    NotSubmitted,
    #[error("question {number} is outside 1..={total}")]
    QuestionOutOfRange { number: u32, total: usize },
    #[error("question has no option {0:?}")]
    UnknownOption(String),
    #[error("submission failed after {attempts} attempt(s): {source}")]
    SubmitFailed {
        attempts: u32,
        #[source]
        source: StorageError,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SessionError {
    /// Misuse of the state machine rather than an environmental failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SessionError::AlreadySubmitted
                | SessionError::NotTaking
                | SessionError::NotSubmitted
                | SessionError::QuestionOutOfRange { .. }
                | SessionError::UnknownOption(_)
        )
    }
}
