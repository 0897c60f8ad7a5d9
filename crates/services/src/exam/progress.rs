use std::collections::BTreeSet;

use serde::Serialize;

use exam_core::model::{OptionKey, QuestionNumber, QuestionStatus};

use super::session::{ExamPhase, ExamSession};

/// Read-only view of where the student is, for progress bars and grids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub phase: ExamPhase,
    pub current: QuestionNumber,
    pub current_answer: Option<OptionKey>,
    pub total: usize,
    pub answered: BTreeSet<QuestionNumber>,
    pub marked: BTreeSet<QuestionNumber>,
    /// One entry per question, in order.
    pub statuses: Vec<QuestionStatus>,
    pub remaining_secs: u64,
    pub total_secs: u64,
    pub low_time: bool,
    pub confirmation_pending: bool,
}

impl ProgressSnapshot {
    pub(crate) fn capture(session: &ExamSession) -> Self {
        let sheet = session.sheet();
        let total = session.total();
        let statuses = (0..total)
            .filter_map(QuestionNumber::from_index)
            .map(|n| sheet.status(n))
            .collect();
        let countdown = session.countdown();
        let state = session.state();

        Self {
            phase: session.phase(),
            current: session.current_number(),
            current_answer: sheet.answer(session.current_number()).cloned(),
            total,
            answered: sheet.answers().keys().copied().collect(),
            marked: sheet.marked().clone(),
            statuses,
            remaining_secs: countdown.remaining_secs(),
            total_secs: countdown.total_secs(),
            low_time: countdown.is_low(),
            confirmation_pending: state.confirmation_pending,
        }
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answered.len()
    }

    #[must_use]
    pub fn unanswered_count(&self) -> usize {
        self.statuses.iter().filter(|s| !s.has_answer()).count()
    }

    #[must_use]
    pub fn marked_count(&self) -> usize {
        self.marked.len()
    }

    /// Share of questions answered, in `0.0..=1.0`.
    #[must_use]
    pub fn answered_ratio(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.answered_count() as f32 / self.total as f32;
        ratio
    }
}
