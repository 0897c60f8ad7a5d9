use serde::{Deserialize, Serialize};

use crate::model::attempt::QuestionNumber;
use crate::model::ids::QuestionId;
use crate::model::question::OptionKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Correct,
    Incorrect,
    Unanswered,
}

/// Selected vs. correct option for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub number: QuestionNumber,
    pub question_id: QuestionId,
    pub selected: Option<OptionKey>,
    pub correct: OptionKey,
    pub kind: OutcomeKind,
}

/// Terminal, immutable scored outcome of a submitted attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamResult {
    correct_count: u32,
    total: u32,
    percentage: u8,
    breakdown: Vec<QuestionOutcome>,
}

impl ExamResult {
    pub(crate) fn new(
        correct_count: u32,
        total: u32,
        percentage: u8,
        breakdown: Vec<QuestionOutcome>,
    ) -> Self {
        Self {
            correct_count,
            total,
            percentage,
            breakdown,
        }
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn percentage(&self) -> u8 {
        self.percentage
    }

    #[must_use]
    pub fn breakdown(&self) -> &[QuestionOutcome] {
        &self.breakdown
    }

    #[must_use]
    pub fn unanswered_count(&self) -> usize {
        self.breakdown
            .iter()
            .filter(|o| o.kind == OutcomeKind::Unanswered)
            .count()
    }

    #[must_use]
    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_percentage(self.percentage)
    }
}

/// Qualitative grade band shown alongside the percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    VeryGood,
    Good,
    Passed,
    NeedsWork,
}

impl ScoreBand {
    pub const PASS_MARK: u8 = 60;

    #[must_use]
    pub fn from_percentage(percentage: u8) -> Self {
        match percentage {
            90.. => Self::Excellent,
            80..=89 => Self::VeryGood,
            70..=79 => Self::Good,
            60..=69 => Self::Passed,
            _ => Self::NeedsWork,
        }
    }

    #[must_use]
    pub fn passed(self) -> bool {
        !matches!(self, Self::NeedsWork)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_thresholds() {
        assert_eq!(ScoreBand::from_percentage(100), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_percentage(90), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_percentage(89), ScoreBand::VeryGood);
        assert_eq!(ScoreBand::from_percentage(70), ScoreBand::Good);
        assert_eq!(ScoreBand::from_percentage(60), ScoreBand::Passed);
        assert_eq!(ScoreBand::from_percentage(59), ScoreBand::NeedsWork);
        assert!(ScoreBand::from_percentage(ScoreBand::PASS_MARK).passed());
        assert!(!ScoreBand::from_percentage(0).passed());
    }
}
