//! Pure scoring of an attempt against its question bank.
//!
//! Everything here is a total function of its inputs so a stored attempt can be
//! re-scored at any time and must produce the same result.

use crate::model::{
    AnswerSheet, ExamResult, OutcomeKind, Question, QuestionNumber, QuestionOutcome,
};

/// Share of the remaining time converted into bonus points, at most 10%.
const TIME_BONUS_FACTOR: f64 = 0.1;

/// `round(100 * correct / total)` with halves rounded up; `0` for an empty bank.
#[must_use]
pub fn percentage(correct: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total);
    // Integer form of round-half-up: floor((200c + t) / 2t).
    let pct = (200 * u64::from(correct) + u64::from(total)) / (2 * u64::from(total));
    u8::try_from(pct).unwrap_or(100)
}

/// Scores `sheet` against `questions`. Unanswered questions count as incorrect.
///
/// Selections recorded for numbers beyond the bank are ignored.
#[must_use]
pub fn score_attempt(questions: &[Question], sheet: &AnswerSheet) -> ExamResult {
    let mut correct_count = 0_u32;
    let mut breakdown = Vec::with_capacity(questions.len());

    for (index, question) in questions.iter().enumerate() {
        let Some(number) = QuestionNumber::from_index(index) else {
            break;
        };
        let selected = sheet.answer(number).cloned();
        let correct = question.correct_option().key().clone();
        let kind = match &selected {
            None => OutcomeKind::Unanswered,
            Some(key) if *key == correct => OutcomeKind::Correct,
            Some(_) => OutcomeKind::Incorrect,
        };
        if kind == OutcomeKind::Correct {
            correct_count = correct_count.saturating_add(1);
        }
        breakdown.push(QuestionOutcome {
            number,
            question_id: question.id(),
            selected,
            correct,
            kind,
        });
    }

    let total = u32::try_from(breakdown.len()).unwrap_or(u32::MAX);
    ExamResult::new(
        correct_count,
        total,
        percentage(correct_count, total),
        breakdown,
    )
}

/// Points awarded for an attempt.
///
/// The base is the exact score fraction of `max_points`, rounded. When the practice
/// grades duration and the attempt finished before the limit, the base is scaled by
/// `1 + 0.1 * (limit - spent) / limit` and rounded again.
#[must_use]
pub fn points_earned(
    correct: u32,
    total: u32,
    max_points: u32,
    graded_duration: bool,
    duration_minutes: u32,
    time_spent_secs: u64,
) -> u32 {
    if total == 0 {
        return 0;
    }
    let fraction = f64::from(correct.min(total)) / f64::from(total);
    let mut points = (fraction * f64::from(max_points)).round();

    if graded_duration && duration_minutes > 0 {
        #[allow(clippy::cast_precision_loss)]
        let spent_minutes = time_spent_secs as f64 / 60.0;
        let limit = f64::from(duration_minutes);
        if spent_minutes < limit {
            let bonus = ((limit - spent_minutes) / limit * TIME_BONUS_FACTOR).max(0.0);
            points = (points * (1.0 + bonus)).round();
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let points = points.clamp(0.0, f64::from(u32::MAX)) as u32;
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerOption, OptionKey, QuestionId};

    fn question(id: u64, correct: &str) -> Question {
        let options = ["A", "B", "C", "D"]
            .iter()
            .map(|k| {
                AnswerOption::new(OptionKey::new(*k).unwrap(), format!("{k}!"), *k == correct)
                    .unwrap()
            })
            .collect();
        Question::new(QuestionId::new(id), format!("Q{id}"), options).unwrap()
    }

    fn sheet(answers: &[(u32, &str)]) -> AnswerSheet {
        let mut sheet = AnswerSheet::new();
        for (n, k) in answers {
            sheet.select(QuestionNumber::new(*n).unwrap(), OptionKey::new(*k).unwrap());
        }
        sheet
    }

    #[test]
    fn three_question_example_scores_67() {
        let bank = vec![question(1, "B"), question(2, "A"), question(3, "C")];
        let result = score_attempt(&bank, &sheet(&[(1, "B"), (2, "A"), (3, "D")]));

        assert_eq!(result.correct_count(), 2);
        assert_eq!(result.total(), 3);
        assert_eq!(result.percentage(), 67);
        assert_eq!(result.breakdown()[2].kind, OutcomeKind::Incorrect);
        assert_eq!(result.breakdown()[2].correct.as_str(), "C");
    }

    #[test]
    fn empty_sheet_scores_zero_with_all_unanswered() {
        let bank: Vec<_> = (1..=20).map(|i| question(i, "A")).collect();
        let result = score_attempt(&bank, &AnswerSheet::new());

        assert_eq!(result.correct_count(), 0);
        assert_eq!(result.total(), 20);
        assert_eq!(result.percentage(), 0);
        assert_eq!(result.unanswered_count(), 20);
        assert!(
            result
                .breakdown()
                .iter()
                .all(|o| o.kind == OutcomeKind::Unanswered && o.selected.is_none())
        );
    }

    #[test]
    fn scoring_is_idempotent() {
        let bank = vec![question(1, "B"), question(2, "A")];
        let s = sheet(&[(1, "B")]);
        assert_eq!(score_attempt(&bank, &s), score_attempt(&bank, &s));
    }

    #[test]
    fn answers_outside_bank_are_ignored() {
        let bank = vec![question(1, "A")];
        let result = score_attempt(&bank, &sheet(&[(1, "A"), (7, "A")]));
        assert_eq!(result.correct_count(), 1);
        assert_eq!(result.total(), 1);
        assert_eq!(result.percentage(), 100);
    }

    #[test]
    fn percentage_matches_rounded_ratio_for_all_small_banks() {
        for total in 1..=40_u32 {
            for correct in 0..=total {
                let expected = (100.0 * f64::from(correct) / f64::from(total) + 0.5).floor();
                assert_eq!(f64::from(percentage(correct, total)), expected, "{correct}/{total}");
                assert!(percentage(correct, total) <= 100);
            }
        }
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 8), 13);
    }

    #[test]
    fn points_without_time_bonus() {
        assert_eq!(points_earned(2, 3, 100, false, 30, 60), 67);
        assert_eq!(points_earned(0, 3, 100, true, 30, 60), 0);
        assert_eq!(points_earned(1, 0, 100, true, 30, 60), 0);
    }

    #[test]
    fn points_with_time_bonus_for_early_finish() {
        // Half the time used: bonus 5%.
        assert_eq!(points_earned(10, 10, 100, true, 60, 30 * 60), 105);
        // Limit fully used: no bonus.
        assert_eq!(points_earned(10, 10, 100, true, 60, 60 * 60), 100);
    }
}
