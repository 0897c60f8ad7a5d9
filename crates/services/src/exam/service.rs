use std::sync::Arc;

use tracing::info;

use exam_core::Clock;
use exam_core::model::{Identity, Practice, PracticeId, Question};
use storage::repository::{Storage, StorageError, StoredAttempt};

use super::controller::ExamController;
use super::session::ExamSession;
use crate::error::SessionError;
use crate::identity::IdentityProvider;
use crate::settings::SessionSettings;

/// Starts exam sessions and reads attempt history.
#[derive(Clone)]
pub struct ExamService {
    clock: Clock,
    storage: Storage,
    identity: Arc<dyn IdentityProvider>,
    settings: SessionSettings,
}

impl ExamService {
    #[must_use]
    pub fn new(clock: Clock, storage: Storage, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            clock,
            storage,
            identity,
            settings: SessionSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Begin a fresh attempt at a practice.
    ///
    /// # Errors
    ///
    /// `PracticeNotFound` when the practice is missing or inactive, `NoQuestions`
    /// for an empty bank, `Unauthenticated` without a signed-in user, or
    /// `Storage` for backend failures.
    pub async fn start(&self, practice_id: PracticeId) -> Result<ExamController, SessionError> {
        let identity = self.current_identity().await?;
        let (practice, questions) = self.load(practice_id).await?;
        let session = ExamSession::new(&practice, questions, identity.user_id, self.clock)?;
        Ok(self.launch(session, practice, identity))
    }

    /// Continue from the student's last auto-save, or start fresh when there is none.
    ///
    /// # Errors
    ///
    /// Same as [`ExamService::start`].
    pub async fn resume_or_start(
        &self,
        practice_id: PracticeId,
    ) -> Result<ExamController, SessionError> {
        let identity = self.current_identity().await?;
        let (practice, questions) = self.load(practice_id).await?;
        let draft = self
            .storage
            .attempts
            .load_draft(practice_id, identity.user_id)
            .await?;

        let session = match draft {
            Some(draft) => {
                info!(%practice_id, remaining_secs = draft.remaining_secs, "resuming draft");
                ExamSession::resume(&practice, questions, draft, self.clock)?
            }
            None => ExamSession::new(&practice, questions, identity.user_id, self.clock)?,
        };
        Ok(self.launch(session, practice, identity))
    }

    /// Practices open for attempts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on backend failures.
    pub async fn list_practices(&self) -> Result<Vec<Practice>, SessionError> {
        Ok(self.storage.practices.list_active_practices().await?)
    }

    /// The signed-in student's stored attempts at a practice, newest first.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` or `Storage`.
    pub async fn history(&self, practice_id: PracticeId) -> Result<Vec<StoredAttempt>, SessionError> {
        let identity = self.current_identity().await?;
        Ok(self
            .storage
            .attempts
            .list_attempts(practice_id, identity.user_id)
            .await?)
    }

    async fn current_identity(&self) -> Result<Identity, SessionError> {
        self.identity
            .current_identity()
            .await
            .ok_or(SessionError::Unauthenticated)
    }

    async fn load(&self, practice_id: PracticeId) -> Result<(Practice, Vec<Question>), SessionError> {
        let not_found = |err: StorageError| match err {
            StorageError::NotFound => SessionError::PracticeNotFound(practice_id),
            other => SessionError::Storage(other),
        };
        let practice = self
            .storage
            .practices
            .get_practice(practice_id)
            .await
            .map_err(not_found)?;
        if !practice.is_active() {
            return Err(SessionError::PracticeNotFound(practice_id));
        }
        let questions = self
            .storage
            .practices
            .load_questions(practice_id)
            .await
            .map_err(not_found)?;
        Ok((practice, questions))
    }

    fn launch(&self, session: ExamSession, practice: Practice, identity: Identity) -> ExamController {
        ExamController::start(
            session,
            practice,
            identity,
            self.clock,
            self.settings,
            Arc::clone(&self.storage.attempts),
        )
    }
}
