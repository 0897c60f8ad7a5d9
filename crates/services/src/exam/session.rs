use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use exam_core::Clock;
use exam_core::Countdown;
use exam_core::model::{
    AnswerSheet, AttemptDraft, ExamResult, OptionKey, Practice, PracticeId, Question,
    QuestionNumber, StudentId, SubmissionId,
};
use exam_core::scoring::score_attempt;
use storage::repository::AttemptSubmission;

use super::progress::ProgressSnapshot;
use crate::error::SessionError;

//
// ─── PHASES ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitReason {
    Manual,
    TimeExpired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ExamPhase {
    Taking,
    /// Summary screen; all answers preserved.
    Reviewing,
    Submitted { reason: SubmitReason },
}

impl ExamPhase {
    #[must_use]
    pub fn is_submitted(self) -> bool {
        matches!(self, ExamPhase::Submitted { .. })
    }
}

/// Outcome of asking to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitRequest {
    /// Unanswered questions remain; call `confirm_submit` or `cancel_submit`.
    ConfirmationRequired { unanswered: usize },
    Submitted,
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Serializable snapshot of everything the session owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamState {
    pub practice_id: PracticeId,
    pub student_id: StudentId,
    /// Fixed for the life of the session; every submit retry reuses it.
    pub submission_id: SubmissionId,
    pub phase: ExamPhase,
    pub sheet: AnswerSheet,
    pub current: QuestionNumber,
    pub countdown: Countdown,
    pub confirmation_pending: bool,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub result: Option<ExamResult>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Timed attempt at one practice.
///
/// Purely synchronous: the countdown only moves when `tick` is called, so the
/// state machine can be driven step by step in tests.
#[derive(Debug, Clone)]
pub struct ExamSession {
    questions: Arc<[Question]>,
    state: ExamState,
    clock: Clock,
}

impl ExamSession {
    /// Start a fresh attempt at question 1 with the practice's full duration.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoQuestions` if the bank is empty.
    pub fn new(
        practice: &Practice,
        questions: Vec<Question>,
        student_id: StudentId,
        clock: Clock,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::NoQuestions(practice.id()));
        }
        Ok(Self {
            questions: questions.into(),
            state: ExamState {
                practice_id: practice.id(),
                student_id,
                submission_id: SubmissionId::random(),
                phase: ExamPhase::Taking,
                sheet: AnswerSheet::new(),
                current: QuestionNumber::FIRST,
                countdown: Countdown::from_minutes(practice.duration_minutes()),
                confirmation_pending: false,
                started_at: clock.now(),
                submitted_at: None,
                result: None,
            },
            clock,
        })
    }

    /// Continue an attempt from its last auto-save.
    ///
    /// Answers beyond the bank or naming an option the question lacks are
    /// dropped, and the pointer is clamped into range. Wall-clock time since
    /// `saved_at` is charged against the remaining time; an attempt whose
    /// time ran out meanwhile comes back submitted as `TimeExpired`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoQuestions` if the bank is empty.
    pub fn resume(
        practice: &Practice,
        questions: Vec<Question>,
        draft: AttemptDraft,
        clock: Clock,
    ) -> Result<Self, SessionError> {
        let mut session = Self::new(practice, questions, draft.student_id, clock)?;
        let total = session.total();

        for (number, key) in draft.sheet.answers() {
            let on_question = session
                .questions
                .get(number.index())
                .is_some_and(|q| q.option(key).is_some());
            if on_question {
                session.state.sheet.select(*number, key.clone());
            }
        }
        for number in draft.sheet.marked() {
            if session.contains(*number) {
                session.state.sheet.toggle_mark(*number);
            }
        }
        session.state.current = if session.contains(draft.current) {
            draft.current
        } else {
            QuestionNumber::from_index(total - 1).unwrap_or(QuestionNumber::FIRST)
        };
        // The countdown keeps running while nobody is connected.
        let away_secs = u64::try_from((clock.now() - draft.saved_at).num_seconds()).unwrap_or(0);
        session.state.countdown = Countdown::resumed(
            practice.duration_secs(),
            draft.remaining_secs.saturating_sub(away_secs),
        );
        if session.state.countdown.is_expired() {
            session.submit(SubmitReason::TimeExpired);
        }
        Ok(session)
    }

    #[must_use]
    pub fn questions(&self) -> &Arc<[Question]> {
        &self.questions
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn phase(&self) -> ExamPhase {
        self.state.phase
    }

    #[must_use]
    pub fn state(&self) -> &ExamState {
        &self.state
    }

    #[must_use]
    pub fn sheet(&self) -> &AnswerSheet {
        &self.state.sheet
    }

    #[must_use]
    pub fn current_number(&self) -> QuestionNumber {
        self.state.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        // `current` is kept within 1..=total, and total >= 1.
        &self.questions[self.state.current.index().min(self.questions.len() - 1)]
    }

    #[must_use]
    pub fn progress(&self) -> ProgressSnapshot {
        ProgressSnapshot::capture(self)
    }

    #[must_use]
    pub fn result(&self) -> Option<&ExamResult> {
        self.state.result.as_ref()
    }

    #[must_use]
    pub fn countdown(&self) -> Countdown {
        self.state.countdown
    }

    /// Auto-save payload for the current state.
    #[must_use]
    pub fn draft(&self, saved_at: DateTime<Utc>) -> AttemptDraft {
        AttemptDraft {
            practice_id: self.state.practice_id,
            student_id: self.state.student_id,
            sheet: self.state.sheet.clone(),
            current: self.state.current,
            remaining_secs: self.state.countdown.remaining_secs(),
            saved_at,
        }
    }

    /// What the persistence service needs once the attempt is submitted.
    #[must_use]
    pub fn submission(&self) -> Option<AttemptSubmission> {
        let completed_at = self.state.submitted_at?;
        Some(AttemptSubmission {
            submission_id: self.state.submission_id,
            practice_id: self.state.practice_id,
            student_id: self.state.student_id,
            sheet: self.state.sheet.clone(),
            time_spent_secs: self.state.countdown.elapsed_secs(),
            completed_at,
        })
    }

    // ─── answers ──────────────────────────────────────────────────────────────

    /// Select an option on the current question, replacing any earlier choice.
    ///
    /// # Errors
    ///
    /// `AlreadySubmitted`, `NotTaking` outside the question view, or
    /// `UnknownOption` when the key is not on the current question.
    pub fn select_answer(&mut self, key: &OptionKey) -> Result<(), SessionError> {
        self.ensure_taking()?;
        if self.current_question().option(key).is_none() {
            return Err(SessionError::UnknownOption(key.as_str().to_owned()));
        }
        self.state.sheet.select(self.state.current, key.clone());
        Ok(())
    }

    /// Select by zero-based display position (numeric shortcuts).
    ///
    /// # Errors
    ///
    /// Same as [`ExamSession::select_answer`].
    pub fn select_option_at(&mut self, index: usize) -> Result<OptionKey, SessionError> {
        self.ensure_taking()?;
        let key = self
            .current_question()
            .option_at(index)
            .map(|o| o.key().clone())
            .ok_or_else(|| SessionError::UnknownOption(format!("#{}", index + 1)))?;
        self.state.sheet.select(self.state.current, key.clone());
        Ok(key)
    }

    /// Flip the review mark on the current question and return the new value.
    ///
    /// # Errors
    ///
    /// `AlreadySubmitted` or `NotTaking`.
    pub fn toggle_review_mark(&mut self) -> Result<bool, SessionError> {
        self.ensure_taking()?;
        Ok(self.state.sheet.toggle_mark(self.state.current))
    }

    // ─── navigation ───────────────────────────────────────────────────────────

    /// Jump to any question. From the summary this returns to the question view.
    ///
    /// # Errors
    ///
    /// `AlreadySubmitted` or `QuestionOutOfRange`.
    pub fn go_to(&mut self, number: QuestionNumber) -> Result<(), SessionError> {
        self.ensure_open()?;
        if !self.contains(number) {
            return Err(SessionError::QuestionOutOfRange {
                number: number.get(),
                total: self.total(),
            });
        }
        self.state.current = number;
        self.state.phase = ExamPhase::Taking;
        Ok(())
    }

    /// Move forward one question; a no-op on the last one.
    ///
    /// # Errors
    ///
    /// `AlreadySubmitted` or `NotTaking`.
    pub fn next(&mut self) -> Result<QuestionNumber, SessionError> {
        self.ensure_taking()?;
        if let Some(next) = QuestionNumber::from_index(self.state.current.index() + 1) {
            if self.contains(next) {
                self.state.current = next;
            }
        }
        Ok(self.state.current)
    }

    /// Move back one question; a no-op on the first one.
    ///
    /// # Errors
    ///
    /// `AlreadySubmitted` or `NotTaking`.
    pub fn previous(&mut self) -> Result<QuestionNumber, SessionError> {
        self.ensure_taking()?;
        if let Some(prev) = QuestionNumber::new(self.state.current.get() - 1) {
            self.state.current = prev;
        }
        Ok(self.state.current)
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.state.current.index() + 1 >= self.total()
    }

    /// Open the summary screen.
    ///
    /// # Errors
    ///
    /// `AlreadySubmitted`.
    pub fn show_summary(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.state.phase = ExamPhase::Reviewing;
        Ok(())
    }

    /// Leave the summary, optionally jumping to a question.
    ///
    /// # Errors
    ///
    /// `AlreadySubmitted` or `QuestionOutOfRange`.
    pub fn back_to_exam(&mut self, jump_to: Option<QuestionNumber>) -> Result<(), SessionError> {
        self.ensure_open()?;
        match jump_to {
            Some(number) => self.go_to(number),
            None => {
                self.state.phase = ExamPhase::Taking;
                Ok(())
            }
        }
    }

    // ─── submission ───────────────────────────────────────────────────────────

    /// Submit, or ask for confirmation while questions are unanswered.
    ///
    /// # Errors
    ///
    /// `AlreadySubmitted`.
    pub fn request_submit(&mut self) -> Result<SubmitRequest, SessionError> {
        self.ensure_open()?;
        let unanswered = self.state.sheet.unanswered_count(self.total());
        if unanswered > 0 {
            self.state.confirmation_pending = true;
            return Ok(SubmitRequest::ConfirmationRequired { unanswered });
        }
        self.submit(SubmitReason::Manual);
        Ok(SubmitRequest::Submitted)
    }

    /// Submit regardless of unanswered questions.
    ///
    /// # Errors
    ///
    /// `AlreadySubmitted`.
    pub fn confirm_submit(&mut self) -> Result<&ExamResult, SessionError> {
        self.ensure_open()?;
        Ok(self.submit(SubmitReason::Manual))
    }

    /// Dismiss a pending confirmation. Harmless when none is pending.
    ///
    /// # Errors
    ///
    /// `AlreadySubmitted`.
    pub fn cancel_submit(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.state.confirmation_pending = false;
        Ok(())
    }

    /// Advance the countdown. Returns true when this tick forced submission.
    ///
    /// Expiry submits whatever is recorded, ignoring a pending confirmation.
    /// Ticks after submission do nothing.
    pub fn tick(&mut self, secs: u64) -> bool {
        if self.state.phase.is_submitted() {
            return false;
        }
        if self.state.countdown.tick(secs) {
            self.submit(SubmitReason::TimeExpired);
            return true;
        }
        false
    }

    fn submit(&mut self, reason: SubmitReason) -> &ExamResult {
        self.state.confirmation_pending = false;
        self.state.phase = ExamPhase::Submitted { reason };
        self.state.submitted_at = Some(self.clock.now());
        self.state
            .result
            .insert(score_attempt(&self.questions, &self.state.sheet))
    }

    fn contains(&self, number: QuestionNumber) -> bool {
        number.index() < self.total()
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.state.phase.is_submitted() {
            return Err(SessionError::AlreadySubmitted);
        }
        Ok(())
    }

    fn ensure_taking(&self) -> Result<(), SessionError> {
        match self.state.phase {
            ExamPhase::Taking => Ok(()),
            ExamPhase::Reviewing => Err(SessionError::NotTaking),
            ExamPhase::Submitted { .. } => Err(SessionError::AlreadySubmitted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{AnswerOption, QuestionId, QuestionStatus};
    use exam_core::time::{fixed_clock, fixed_now};

    fn question(id: u64, correct: &str) -> Question {
        let options = ["A", "B", "C", "D"]
            .iter()
            .map(|k| {
                AnswerOption::new(OptionKey::new(*k).unwrap(), format!("{k}."), *k == correct)
                    .unwrap()
            })
            .collect();
        Question::new(QuestionId::new(id), format!("Q{id}"), options).unwrap()
    }

    fn practice(minutes: u32) -> Practice {
        Practice::new(PracticeId::new(1), "Algebra", None, minutes, 100, fixed_now()).unwrap()
    }

    fn session(correct: &[&str]) -> ExamSession {
        let bank = correct
            .iter()
            .enumerate()
            .map(|(i, c)| question(i as u64 + 1, c))
            .collect();
        ExamSession::new(&practice(10), bank, StudentId::random(), fixed_clock()).unwrap()
    }

    fn key(k: &str) -> OptionKey {
        OptionKey::new(k).unwrap()
    }

    fn n(v: u32) -> QuestionNumber {
        QuestionNumber::new(v).unwrap()
    }

    #[test]
    fn empty_bank_is_rejected() {
        let err = ExamSession::new(&practice(10), Vec::new(), StudentId::random(), fixed_clock())
            .unwrap_err();
        assert!(matches!(err, SessionError::NoQuestions(_)));
    }

    #[test]
    fn three_question_example_scores_two_of_three() {
        let mut s = session(&["B", "A", "C"]);
        s.select_answer(&key("B")).unwrap();
        s.next().unwrap();
        s.select_answer(&key("A")).unwrap();
        s.next().unwrap();
        s.select_answer(&key("D")).unwrap();

        assert_eq!(s.request_submit().unwrap(), SubmitRequest::Submitted);
        let result = s.result().unwrap();
        assert_eq!(result.correct_count(), 2);
        assert_eq!(result.percentage(), 67);
        assert_eq!(
            s.phase(),
            ExamPhase::Submitted {
                reason: SubmitReason::Manual
            }
        );
    }

    #[test]
    fn navigation_bounds_are_no_ops() {
        let mut s = session(&["A", "A", "A"]);
        assert_eq!(s.previous().unwrap(), n(1));
        s.go_to(n(3)).unwrap();
        assert!(s.is_last());
        assert_eq!(s.next().unwrap(), n(3));
        let err = s.go_to(n(4)).unwrap_err();
        assert!(matches!(
            err,
            SessionError::QuestionOutOfRange { number: 4, total: 3 }
        ));
    }

    #[test]
    fn jumping_around_preserves_untouched_answers_and_marks() {
        let mut s = session(&["A", "B", "C", "D"]);
        s.select_answer(&key("C")).unwrap();
        s.go_to(n(2)).unwrap();
        s.toggle_review_mark().unwrap();
        let before = s.sheet().clone();

        s.go_to(n(4)).unwrap();
        s.go_to(n(1)).unwrap();
        assert_eq!(s.sheet(), &before);
        assert_eq!(s.sheet().answer(n(1)), Some(&key("C")));
        assert!(s.sheet().is_marked(n(2)));
    }

    #[test]
    fn mark_then_answer_sets_both_facts() {
        let mut s = session(&["A", "B"]);
        assert!(s.toggle_review_mark().unwrap());
        s.select_answer(&key("B")).unwrap();
        assert_eq!(
            s.sheet().status(n(1)),
            exam_core::model::QuestionStatus::AnsweredMarked
        );
    }

    #[test]
    fn unknown_option_is_rejected() {
        let mut s = session(&["A"]);
        let err = s.select_answer(&key("Z")).unwrap_err();
        assert!(matches!(err, SessionError::UnknownOption(_)));
        let err = s.select_option_at(7).unwrap_err();
        assert!(matches!(err, SessionError::UnknownOption(_)));
        assert_eq!(s.select_option_at(2).unwrap(), key("C"));
    }

    #[test]
    fn summary_blocks_answers_but_allows_jump_back() {
        let mut s = session(&["A", "B", "C"]);
        s.show_summary().unwrap();
        assert_eq!(s.phase(), ExamPhase::Reviewing);
        assert!(matches!(
            s.select_answer(&key("A")).unwrap_err(),
            SessionError::NotTaking
        ));
        assert!(matches!(s.next().unwrap_err(), SessionError::NotTaking));

        s.back_to_exam(Some(n(3))).unwrap();
        assert_eq!(s.phase(), ExamPhase::Taking);
        assert_eq!(s.current_number(), n(3));
    }

    #[test]
    fn unanswered_questions_need_confirmation() {
        let mut s = session(&["A", "B", "C"]);
        s.select_answer(&key("A")).unwrap();

        assert_eq!(
            s.request_submit().unwrap(),
            SubmitRequest::ConfirmationRequired { unanswered: 2 }
        );
        assert!(s.state().confirmation_pending);
        s.cancel_submit().unwrap();
        assert!(!s.state().confirmation_pending);
        assert_eq!(s.phase(), ExamPhase::Taking);

        s.request_submit().unwrap();
        let result = s.confirm_submit().unwrap();
        assert_eq!(result.unanswered_count(), 2);
    }

    #[test]
    fn expiry_forces_submission_once_and_ignores_confirmation() {
        let mut s = session(&["A", "B"]);
        s.request_submit().unwrap();
        assert!(s.state().confirmation_pending);

        assert!(!s.tick(599));
        assert!(s.tick(1));
        assert!(!s.tick(1));
        assert_eq!(
            s.phase(),
            ExamPhase::Submitted {
                reason: SubmitReason::TimeExpired
            }
        );
        assert!(!s.state().confirmation_pending);
        assert_eq!(s.submission().unwrap().time_spent_secs, 600);
    }

    #[test]
    fn silent_expiry_scores_everything_unanswered() {
        let bank: Vec<_> = (1..=20).map(|i| question(i, "A")).collect();
        let mut s =
            ExamSession::new(&practice(1), bank, StudentId::random(), fixed_clock()).unwrap();
        for _ in 0..60 {
            s.tick(1);
        }
        let result = s.result().unwrap();
        assert_eq!(result.correct_count(), 0);
        assert_eq!(result.percentage(), 0);
        assert_eq!(result.unanswered_count(), 20);
    }

    #[test]
    fn everything_fails_after_submission() {
        let mut s = session(&["A"]);
        s.select_answer(&key("A")).unwrap();
        s.request_submit().unwrap();

        assert!(matches!(
            s.select_answer(&key("A")).unwrap_err(),
            SessionError::AlreadySubmitted
        ));
        assert!(matches!(
            s.toggle_review_mark().unwrap_err(),
            SessionError::AlreadySubmitted
        ));
        assert!(matches!(
            s.go_to(n(1)).unwrap_err(),
            SessionError::AlreadySubmitted
        ));
        assert!(matches!(
            s.request_submit().unwrap_err(),
            SessionError::AlreadySubmitted
        ));
        assert!(matches!(
            s.confirm_submit().unwrap_err(),
            SessionError::AlreadySubmitted
        ));
        assert!(s.submission().is_some());
    }

    #[test]
    fn every_submission_carries_the_same_key() {
        let mut s = session(&["A"]);
        s.select_answer(&key("A")).unwrap();
        s.request_submit().unwrap();

        let first = s.submission().unwrap();
        let again = s.submission().unwrap();
        assert_eq!(first.submission_id, again.submission_id);
        assert_eq!(first.submission_id, s.state().submission_id);
        assert_ne!(first.submission_id, session(&["A"]).state().submission_id);
    }

    #[test]
    fn resume_restores_draft_within_bank() {
        let p = practice(10);
        let bank: Vec<_> = (1..=3).map(|i| question(i, "A")).collect();
        let mut sheet = AnswerSheet::new();
        sheet.select(n(2), key("B"));
        sheet.select(n(9), key("A"));
        sheet.toggle_mark(n(3));
        let draft = AttemptDraft {
            practice_id: p.id(),
            student_id: StudentId::random(),
            sheet,
            current: n(2),
            remaining_secs: 120,
            saved_at: fixed_now(),
        };

        let s = ExamSession::resume(&p, bank, draft, fixed_clock()).unwrap();
        assert_eq!(s.phase(), ExamPhase::Taking);
        assert_eq!(s.sheet().answered_count(), 1);
        assert!(s.sheet().is_marked(n(3)));
        assert_eq!(s.current_number(), n(2));
        assert_eq!(s.countdown().remaining_secs(), 120);
        assert_eq!(s.countdown().elapsed_secs(), 480);
    }

    #[test]
    fn state_snapshot_serializes() {
        let mut s = session(&["A", "B"]);
        s.select_answer(&key("A")).unwrap();
        s.toggle_review_mark().unwrap();
        let json = serde_json::to_string(s.state()).unwrap();
        let back: ExamState = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, s.state());
    }

    fn draft_for(
        p: &Practice,
        sheet: AnswerSheet,
        remaining_secs: u64,
        saved_at: DateTime<Utc>,
    ) -> AttemptDraft {
        AttemptDraft {
            practice_id: p.id(),
            student_id: StudentId::random(),
            sheet,
            current: QuestionNumber::FIRST,
            remaining_secs,
            saved_at,
        }
    }

    #[test]
    fn resume_charges_time_spent_away() {
        let p = practice(10);
        let bank: Vec<_> = (1..=3).map(|i| question(i, "A")).collect();
        let saved_at = fixed_now() - chrono::Duration::seconds(45);
        let draft = draft_for(&p, AnswerSheet::new(), 120, saved_at);

        let s = ExamSession::resume(&p, bank, draft, fixed_clock()).unwrap();
        assert_eq!(s.phase(), ExamPhase::Taking);
        assert_eq!(s.countdown().remaining_secs(), 75);
    }

    #[test]
    fn resume_after_deadline_comes_back_expired() {
        let p = practice(10);
        let bank: Vec<_> = (1..=3).map(|i| question(i, "A")).collect();
        let mut sheet = AnswerSheet::new();
        sheet.select(n(1), key("A"));
        let saved_at = fixed_now() - chrono::Duration::hours(3);
        let draft = draft_for(&p, sheet, 120, saved_at);

        let s = ExamSession::resume(&p, bank, draft, fixed_clock()).unwrap();
        assert_eq!(
            s.phase(),
            ExamPhase::Submitted {
                reason: SubmitReason::TimeExpired
            }
        );
        assert_eq!(s.countdown().remaining_secs(), 0);
        assert_eq!(s.result().unwrap().correct_count(), 1);
    }

    #[test]
    fn resume_drops_answers_naming_foreign_options() {
        let p = practice(10);
        let bank: Vec<_> = (1..=2).map(|i| question(i, "A")).collect();
        let mut sheet = AnswerSheet::new();
        sheet.select(n(1), key("B"));
        sheet.select(n(2), key("Z"));
        let draft = draft_for(&p, sheet, 300, fixed_now());

        let s = ExamSession::resume(&p, bank, draft, fixed_clock()).unwrap();
        assert_eq!(s.sheet().answered_count(), 1);
        assert!(s.sheet().has_answer(n(1)));
        assert!(!s.sheet().has_answer(n(2)));
        assert_eq!(s.sheet().status(n(2)), QuestionStatus::Unanswered);
    }
}
