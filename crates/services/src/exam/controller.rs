use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use exam_core::Clock;
use exam_core::model::{
    AttemptId, ExamResult, Identity, OptionKey, Practice, Question, QuestionNumber,
};
use storage::repository::{AttemptRepository, StoredAttempt};

use super::autosave::{AutoSaver, SaveStatus};
use super::progress::ProgressSnapshot;
use super::session::{ExamPhase, ExamSession, ExamState, SubmitRequest};
use super::timer::spawn_countdown;
use crate::error::SessionError;
use crate::settings::SessionSettings;

/// Where the terminal result is on its way to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PersistenceStatus {
    NotSubmitted,
    Submitting { attempt: u32 },
    Stored { attempt_id: AttemptId },
    /// Retries exhausted; `retry_submission` tries again.
    Failed,
}

/// Result of the UI's submit action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    ConfirmationRequired { unanswered: usize },
    Submitted(StoredAttempt),
}

pub(crate) struct ControllerInner {
    session: Mutex<ExamSession>,
    practice: Practice,
    identity: Identity,
    clock: Clock,
    settings: SessionSettings,
    attempts: Arc<dyn AttemptRepository>,
    autosaver: AutoSaver,
    cancel: CancellationToken,
    stored: tokio::sync::Mutex<Option<StoredAttempt>>,
    persistence: watch::Sender<PersistenceStatus>,
    finished: watch::Sender<bool>,
}

impl ControllerInner {
    fn session(&self) -> MutexGuard<'_, ExamSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn tick(&self, secs: u64) -> bool {
        self.session().tick(secs)
    }
}

impl Drop for ControllerInner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Async shell around an [`ExamSession`]: countdown, auto-save and submission.
///
/// Cheap to clone; all clones drive the same session. The background timer
/// and auto-save tasks stop on submission, on `abandon`, or once the last
/// handle is dropped.
#[derive(Clone)]
pub struct ExamController {
    inner: Arc<ControllerInner>,
}

impl ExamController {
    /// Take ownership of a session and start its countdown.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn start(
        session: ExamSession,
        practice: Practice,
        identity: Identity,
        clock: Clock,
        settings: SessionSettings,
        attempts: Arc<dyn AttemptRepository>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let autosaver = AutoSaver::spawn(
            Arc::clone(&attempts),
            settings.autosave_debounce,
            cancel.child_token(),
        );
        let already_submitted = session.phase().is_submitted();
        let (persistence, _) = watch::channel(PersistenceStatus::NotSubmitted);
        let (finished, _) = watch::channel(already_submitted);

        let inner = Arc::new(ControllerInner {
            session: Mutex::new(session),
            practice,
            identity,
            clock,
            settings,
            attempts,
            autosaver,
            cancel: cancel.clone(),
            stored: tokio::sync::Mutex::new(None),
            persistence,
            finished,
        });

        if already_submitted {
            // Resumed after the time ran out: store what was saved.
            let controller = Self::from_inner(Arc::clone(&inner));
            tokio::spawn(async move {
                let _ = controller.finish().await;
            });
        } else {
            spawn_countdown(Arc::downgrade(&inner), cancel);
        }
        info!(
            practice_id = %inner.practice.id(),
            student = %inner.identity.display_name,
            "exam session started"
        );
        Self { inner }
    }

    pub(crate) fn from_inner(inner: Arc<ControllerInner>) -> Self {
        Self { inner }
    }

    // ─── reads ────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn practice(&self) -> &Practice {
        &self.inner.practice
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.inner.identity
    }

    #[must_use]
    pub fn questions(&self) -> Arc<[Question]> {
        Arc::clone(self.inner.session().questions())
    }

    #[must_use]
    pub fn current_question(&self) -> Question {
        self.inner.session().current_question().clone()
    }

    #[must_use]
    pub fn progress(&self) -> ProgressSnapshot {
        self.inner.session().progress()
    }

    #[must_use]
    pub fn phase(&self) -> ExamPhase {
        self.inner.session().phase()
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.inner.session().is_last()
    }

    /// Serializable copy of the full session state.
    #[must_use]
    pub fn state(&self) -> ExamState {
        self.inner.session().state().clone()
    }

    #[must_use]
    pub fn result(&self) -> Option<ExamResult> {
        self.inner.session().result().cloned()
    }

    #[must_use]
    pub fn save_status(&self) -> SaveStatus {
        self.inner.autosaver.status()
    }

    #[must_use]
    pub fn subscribe_save_status(&self) -> watch::Receiver<SaveStatus> {
        self.inner.autosaver.subscribe()
    }

    #[must_use]
    pub fn persistence_status(&self) -> PersistenceStatus {
        *self.inner.persistence.borrow()
    }

    /// Flips to `true` once the session is submitted, manually or on timeout.
    #[must_use]
    pub fn finished(&self) -> watch::Receiver<bool> {
        self.inner.finished.subscribe()
    }

    /// Hosts should confirm before closing while this is true.
    #[must_use]
    pub fn should_warn_before_leaving(&self) -> bool {
        !self.phase().is_submitted()
    }

    // ─── mutations ────────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// See [`ExamSession::select_answer`].
    pub fn select_answer(&self, key: &OptionKey) -> Result<(), SessionError> {
        self.mutate_and_save(|s| s.select_answer(key))
    }

    /// # Errors
    ///
    /// See [`ExamSession::select_option_at`].
    pub fn select_option_at(&self, index: usize) -> Result<OptionKey, SessionError> {
        self.mutate_and_save(|s| s.select_option_at(index))
    }

    /// # Errors
    ///
    /// See [`ExamSession::toggle_review_mark`].
    pub fn toggle_review_mark(&self) -> Result<bool, SessionError> {
        self.mutate_and_save(ExamSession::toggle_review_mark)
    }

    /// # Errors
    ///
    /// See [`ExamSession::go_to`].
    pub fn go_to(&self, number: QuestionNumber) -> Result<(), SessionError> {
        self.inner.session().go_to(number)
    }

    /// # Errors
    ///
    /// See [`ExamSession::next`].
    pub fn next(&self) -> Result<QuestionNumber, SessionError> {
        self.inner.session().next()
    }

    /// # Errors
    ///
    /// See [`ExamSession::previous`].
    pub fn previous(&self) -> Result<QuestionNumber, SessionError> {
        self.inner.session().previous()
    }

    /// # Errors
    ///
    /// See [`ExamSession::show_summary`].
    pub fn show_summary(&self) -> Result<(), SessionError> {
        self.inner.session().show_summary()
    }

    /// # Errors
    ///
    /// See [`ExamSession::back_to_exam`].
    pub fn back_to_exam(&self, jump_to: Option<QuestionNumber>) -> Result<(), SessionError> {
        self.inner.session().back_to_exam(jump_to)
    }

    /// # Errors
    ///
    /// See [`ExamSession::cancel_submit`].
    pub fn cancel_submit(&self) -> Result<(), SessionError> {
        self.inner.session().cancel_submit()
    }

    // ─── submission ───────────────────────────────────────────────────────────

    /// The submit button: asks for confirmation when questions are unanswered.
    ///
    /// # Errors
    ///
    /// `AlreadySubmitted`, or `SubmitFailed` when the store keeps failing.
    pub async fn submit(&self) -> Result<SubmitOutcome, SessionError> {
        let request = self.inner.session().request_submit()?;
        match request {
            SubmitRequest::ConfirmationRequired { unanswered } => {
                Ok(SubmitOutcome::ConfirmationRequired { unanswered })
            }
            SubmitRequest::Submitted => self.finish().await.map(SubmitOutcome::Submitted),
        }
    }

    /// Submit with unanswered questions after the student confirmed.
    ///
    /// # Errors
    ///
    /// `AlreadySubmitted`, or `SubmitFailed` when the store keeps failing.
    pub async fn confirm_submit(&self) -> Result<StoredAttempt, SessionError> {
        self.inner.session().confirm_submit()?;
        self.finish().await
    }

    /// Manual retry after `SubmitFailed`. Returns the stored record if an
    /// earlier try already succeeded.
    ///
    /// # Errors
    ///
    /// `NotSubmitted` before submission, or `SubmitFailed` again.
    pub async fn retry_submission(&self) -> Result<StoredAttempt, SessionError> {
        if !self.phase().is_submitted() {
            return Err(SessionError::NotSubmitted);
        }
        self.persist_result().await
    }

    /// Leave without submitting: stops the countdown and writes any draft the
    /// debounce window still held, so `resume_or_start` picks up every answer.
    pub async fn abandon(&self) {
        self.inner.cancel.cancel();
        if self.phase().is_submitted() {
            self.inner.autosaver.shutdown().await;
            return;
        }
        info!(practice_id = %self.inner.practice.id(), "exam session abandoned");
        self.inner.autosaver.flush_and_shutdown().await;
    }

    pub(crate) async fn finish(&self) -> Result<StoredAttempt, SessionError> {
        self.inner.cancel.cancel();
        self.inner.autosaver.shutdown().await;
        self.inner.finished.send_replace(true);
        self.persist_result().await
    }

    /// Store the terminal result exactly once, retrying transient failures.
    async fn persist_result(&self) -> Result<StoredAttempt, SessionError> {
        let mut stored = self.inner.stored.lock().await;
        if let Some(existing) = stored.as_ref() {
            return Ok(existing.clone());
        }
        let submission = self
            .inner
            .session()
            .submission()
            .ok_or(SessionError::NotSubmitted)?;

        let policy = self.inner.settings.submit_retry;
        let mut attempt = 1;
        loop {
            self.inner
                .persistence
                .send_replace(PersistenceStatus::Submitting { attempt });

            match self.inner.attempts.submit_attempt(&submission).await {
                Ok(record) => {
                    info!(
                        attempt_id = %record.id,
                        attempt_number = record.attempt_number,
                        percentage = record.result.percentage(),
                        "attempt stored"
                    );
                    self.inner.persistence.send_replace(PersistenceStatus::Stored {
                        attempt_id: record.id,
                    });
                    if let Err(err) = self
                        .inner
                        .attempts
                        .clear_draft(submission.practice_id, submission.student_id)
                        .await
                    {
                        warn!(error = %err, "could not clear auto-save draft");
                    }
                    *stored = Some(record.clone());
                    return Ok(record);
                }
                Err(err) if err.is_transient() && attempt < policy.max_attempts() => {
                    let delay = policy.delay_after(attempt);
                    warn!(attempt, error = %err, ?delay, "submission failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    error!(attempt, error = %err, "submission failed");
                    self.inner
                        .persistence
                        .send_replace(PersistenceStatus::Failed);
                    return Err(SessionError::SubmitFailed {
                        attempts: attempt,
                        source: err,
                    });
                }
            }
        }
    }

    fn mutate_and_save<T>(
        &self,
        f: impl FnOnce(&mut ExamSession) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let (out, draft) = {
            let mut session = self.inner.session();
            let out = f(&mut *session)?;
            (out, session.draft(self.inner.clock.now()))
        };
        self.inner.autosaver.schedule(draft);
        Ok(out)
    }
}
