use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::model::ids::{PracticeId, StudentId};
use crate::model::question::OptionKey;

/// 1-based position of a question within a practice.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct QuestionNumber(u32);

impl QuestionNumber {
    pub const FIRST: QuestionNumber = QuestionNumber(1);

    /// Returns `None` for zero.
    #[must_use]
    pub fn new(n: u32) -> Option<Self> {
        (n >= 1).then_some(Self(n))
    }

    /// Number for a zero-based index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok()?.checked_add(1).map(Self)
    }

    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn index(self) -> usize {
        usize::try_from(self.0 - 1).unwrap_or(usize::MAX)
    }
}

impl TryFrom<u32> for QuestionNumber {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "question number must be >= 1".to_string())
    }
}

impl From<QuestionNumber> for u32 {
    fn from(value: QuestionNumber) -> Self {
        value.0
    }
}

impl fmt::Debug for QuestionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

impl fmt::Display for QuestionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display state of a question, derived from two independent facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    Answered,
    AnsweredMarked,
    Marked,
    Unanswered,
}

impl QuestionStatus {
    #[must_use]
    pub fn from_facts(has_answer: bool, is_marked: bool) -> Self {
        match (has_answer, is_marked) {
            (true, true) => Self::AnsweredMarked,
            (true, false) => Self::Answered,
            (false, true) => Self::Marked,
            (false, false) => Self::Unanswered,
        }
    }

    #[must_use]
    pub fn has_answer(self) -> bool {
        matches!(self, Self::Answered | Self::AnsweredMarked)
    }

    #[must_use]
    pub fn is_marked(self) -> bool {
        matches!(self, Self::AnsweredMarked | Self::Marked)
    }
}

/// Sparse record of selected options and review marks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSheet {
    answers: BTreeMap<QuestionNumber, OptionKey>,
    marked: BTreeSet<QuestionNumber>,
}

impl AnswerSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a selection and returns the previous one, if any.
    pub fn select(&mut self, number: QuestionNumber, key: OptionKey) -> Option<OptionKey> {
        self.answers.insert(number, key)
    }

    /// Flips the review mark and returns the new value.
    pub fn toggle_mark(&mut self, number: QuestionNumber) -> bool {
        if self.marked.remove(&number) {
            false
        } else {
            self.marked.insert(number);
            true
        }
    }

    #[must_use]
    pub fn answer(&self, number: QuestionNumber) -> Option<&OptionKey> {
        self.answers.get(&number)
    }

    #[must_use]
    pub fn has_answer(&self, number: QuestionNumber) -> bool {
        self.answers.contains_key(&number)
    }

    #[must_use]
    pub fn is_marked(&self, number: QuestionNumber) -> bool {
        self.marked.contains(&number)
    }

    #[must_use]
    pub fn status(&self, number: QuestionNumber) -> QuestionStatus {
        QuestionStatus::from_facts(self.has_answer(number), self.is_marked(number))
    }

    #[must_use]
    pub fn answers(&self) -> &BTreeMap<QuestionNumber, OptionKey> {
        &self.answers
    }

    #[must_use]
    pub fn marked(&self) -> &BTreeSet<QuestionNumber> {
        &self.marked
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn marked_count(&self) -> usize {
        self.marked.len()
    }

    /// Questions in `1..=total` without a selection.
    #[must_use]
    pub fn unanswered_count(&self, total: usize) -> usize {
        (1..=total)
            .filter_map(|i| u32::try_from(i).ok().and_then(QuestionNumber::new))
            .filter(|n| !self.has_answer(*n))
            .count()
    }
}

/// Auto-save payload: a best-effort snapshot of an in-progress attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptDraft {
    pub practice_id: PracticeId,
    pub student_id: StudentId,
    pub sheet: AnswerSheet,
    pub current: QuestionNumber,
    pub remaining_secs: u64,
    pub saved_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(v: u32) -> QuestionNumber {
        QuestionNumber::new(v).unwrap()
    }

    fn key(k: &str) -> OptionKey {
        OptionKey::new(k).unwrap()
    }

    #[test]
    fn question_number_bounds() {
        assert!(QuestionNumber::new(0).is_none());
        assert_eq!(QuestionNumber::from_index(0), Some(QuestionNumber::FIRST));
        assert_eq!(n(5).index(), 4);
    }

    #[test]
    fn mark_and_answer_are_independent() {
        let mut sheet = AnswerSheet::new();
        assert_eq!(sheet.status(n(3)), QuestionStatus::Unanswered);

        assert!(sheet.toggle_mark(n(3)));
        assert_eq!(sheet.status(n(3)), QuestionStatus::Marked);

        sheet.select(n(3), key("a"));
        assert_eq!(sheet.status(n(3)), QuestionStatus::AnsweredMarked);

        assert!(!sheet.toggle_mark(n(3)));
        assert_eq!(sheet.status(n(3)), QuestionStatus::Answered);
    }

    #[test]
    fn select_replaces_previous_answer() {
        let mut sheet = AnswerSheet::new();
        assert_eq!(sheet.select(n(5), key("a")), None);
        assert_eq!(sheet.select(n(5), key("c")), Some(key("a")));
        assert_eq!(sheet.answer(n(5)), Some(&key("c")));
        assert_eq!(sheet.answered_count(), 1);
    }

    #[test]
    fn unanswered_count_ignores_out_of_range() {
        let mut sheet = AnswerSheet::new();
        sheet.select(n(1), key("a"));
        sheet.select(n(2), key("b"));
        assert_eq!(sheet.unanswered_count(4), 2);
        assert_eq!(sheet.unanswered_count(0), 0);
    }

    #[test]
    fn sheet_serializes_with_numeric_keys() {
        let mut sheet = AnswerSheet::new();
        sheet.select(n(2), key("b"));
        sheet.toggle_mark(n(4));
        let json = serde_json::to_string(&sheet).unwrap();
        let back: AnswerSheet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sheet);
    }
}
