use exam_core::model::{ExamResult, OptionKey, OutcomeKind, Question, ScoreBand};
use storage::repository::StoredAttempt;

use crate::vm::exam_vm::option_letter;
use crate::vm::time_fmt::{format_datetime, format_remaining};

fn band_message(band: ScoreBand) -> &'static str {
    match band {
        ScoreBand::Excellent => "Excellent! Outstanding work.",
        ScoreBand::VeryGood => "Very good! Keep it up.",
        ScoreBand::Good => "Good job.",
        ScoreBand::Passed => "Passed.",
        ScoreBand::NeedsWork => "Keep practicing, you can do better.",
    }
}

fn letter_for(question: Option<&Question>, key: &OptionKey) -> String {
    question
        .and_then(|q| q.position_of(key))
        .map_or_else(|| key.as_str().to_string(), |i| option_letter(i).to_string())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultRowVm {
    pub number: u32,
    pub prompt: String,
    /// `None` when unanswered.
    pub selected: Option<String>,
    pub correct: String,
    pub kind: OutcomeKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultsVm {
    pub percentage_label: String,
    pub score_label: String,
    pub band: ScoreBand,
    pub message: &'static str,
    pub passed: bool,
    pub points_label: Option<String>,
    /// Empty when the practice does not allow reviewing answers.
    pub rows: Vec<ResultRowVm>,
}

/// Map a result for display, showing option letters rather than raw keys.
#[must_use]
pub fn map_results(
    result: &ExamResult,
    questions: &[Question],
    points_earned: Option<u32>,
    allow_review: bool,
) -> ResultsVm {
    let rows = if allow_review {
        result
            .breakdown()
            .iter()
            .map(|outcome| {
                let question = questions.get(outcome.number.index());
                ResultRowVm {
                    number: outcome.number.get(),
                    prompt: question.map(|q| q.prompt().to_string()).unwrap_or_default(),
                    selected: outcome.selected.as_ref().map(|k| letter_for(question, k)),
                    correct: letter_for(question, &outcome.correct),
                    kind: outcome.kind,
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    let band = result.band();
    ResultsVm {
        percentage_label: format!("{}%", result.percentage()),
        score_label: format!("{} / {} correct", result.correct_count(), result.total()),
        band,
        message: band_message(band),
        passed: band.passed(),
        points_label: points_earned.map(|p| format!("{p} points")),
        rows,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptHistoryRowVm {
    pub attempt_number: u32,
    pub completed_at_str: String,
    pub percentage_label: String,
    pub points_label: String,
    pub time_spent_label: String,
}

impl From<&StoredAttempt> for AttemptHistoryRowVm {
    fn from(attempt: &StoredAttempt) -> Self {
        Self {
            attempt_number: attempt.attempt_number,
            completed_at_str: format_datetime(attempt.completed_at),
            percentage_label: format!("{}%", attempt.result.percentage()),
            points_label: format!("{} points", attempt.points_earned),
            time_spent_label: format_remaining(attempt.time_spent_secs),
        }
    }
}

#[must_use]
pub fn map_history(attempts: &[StoredAttempt]) -> Vec<AttemptHistoryRowVm> {
    attempts.iter().map(AttemptHistoryRowVm::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{
        AnswerOption, AnswerSheet, AttemptId, PracticeId, QuestionId, QuestionNumber, StudentId,
        SubmissionId,
    };
    use exam_core::scoring::score_attempt;
    use exam_core::time::fixed_now;

    fn question(id: u64, correct: &str) -> Question {
        let options = ["w", "x", "y", "z"]
            .iter()
            .map(|k| AnswerOption::new(OptionKey::new(*k).unwrap(), *k, *k == correct).unwrap())
            .collect();
        Question::new(QuestionId::new(id), format!("Q{id}"), options).unwrap()
    }

    fn scored() -> (Vec<Question>, AnswerSheet, ExamResult) {
        let bank = vec![question(1, "x"), question(2, "w"), question(3, "y")];
        let mut sheet = AnswerSheet::new();
        sheet.select(QuestionNumber::new(1).unwrap(), OptionKey::new("x").unwrap());
        sheet.select(QuestionNumber::new(2).unwrap(), OptionKey::new("z").unwrap());
        let result = score_attempt(&bank, &sheet);
        (bank, sheet, result)
    }

    #[test]
    fn results_show_letters_and_band() {
        let (bank, _, result) = scored();
        let vm = map_results(&result, &bank, Some(33), true);

        assert_eq!(vm.percentage_label, "33%");
        assert_eq!(vm.score_label, "1 / 3 correct");
        assert_eq!(vm.band, ScoreBand::NeedsWork);
        assert!(!vm.passed);
        assert_eq!(vm.points_label.as_deref(), Some("33 points"));

        assert_eq!(vm.rows[0].selected.as_deref(), Some("B"));
        assert_eq!(vm.rows[0].kind, OutcomeKind::Correct);
        assert_eq!(vm.rows[1].selected.as_deref(), Some("D"));
        assert_eq!(vm.rows[1].correct, "A");
        assert_eq!(vm.rows[2].selected, None);
        assert_eq!(vm.rows[2].kind, OutcomeKind::Unanswered);
    }

    #[test]
    fn review_can_be_hidden() {
        let (bank, _, result) = scored();
        let vm = map_results(&result, &bank, None, false);
        assert!(vm.rows.is_empty());
        assert_eq!(vm.points_label, None);
    }

    #[test]
    fn history_rows() {
        let (_, sheet, result) = scored();
        let attempt = StoredAttempt {
            id: AttemptId::new(4),
            submission_id: SubmissionId::random(),
            practice_id: PracticeId::new(1),
            student_id: StudentId::random(),
            attempt_number: 2,
            sheet,
            result,
            points_earned: 33,
            time_spent_secs: 754,
            completed_at: fixed_now(),
        };
        let rows = map_history(&[attempt]);
        assert_eq!(rows[0].attempt_number, 2);
        assert_eq!(rows[0].time_spent_label, "12:34");
        assert_eq!(rows[0].percentage_label, "33%");
    }
}
