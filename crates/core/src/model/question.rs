use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("option key must be 1-8 characters without whitespace: {0:?}")]
    InvalidOptionKey(String),

    #[error("option text cannot be empty")]
    EmptyOptionText,

    #[error("a question needs between 2 and 4 options, got {0}")]
    OptionCount(usize),

    #[error("duplicate option key: {0}")]
    DuplicateOptionKey(OptionKey),

    #[error("exactly one option must be correct, found {0}")]
    CorrectOptionCount(usize),
}

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 4;
const MAX_OPTION_KEY_LEN: usize = 8;

//
// ─── OPTION KEY ────────────────────────────────────────────────────────────────
//

/// Short code identifying an option within its question (`a`, `B`, ...).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OptionKey(String);

impl OptionKey {
    /// # Errors
    ///
    /// Returns `QuestionError::InvalidOptionKey` for empty, long or whitespace keys.
    pub fn new(raw: impl Into<String>) -> Result<Self, QuestionError> {
        let raw = raw.into();
        if raw.is_empty()
            || raw.chars().count() > MAX_OPTION_KEY_LEN
            || raw.chars().any(char::is_whitespace)
        {
            return Err(QuestionError::InvalidOptionKey(raw));
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OptionKey {
    type Error = QuestionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OptionKey> for String {
    fn from(value: OptionKey) -> Self {
        value.0
    }
}

impl fmt::Debug for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OptionKey({})", self.0)
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//
// ─── OPTION ────────────────────────────────────────────────────────────────────
//

/// One multiple-choice option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    key: OptionKey,
    text: String,
    is_correct: bool,
}

impl AnswerOption {
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyOptionText` if the text is blank.
    pub fn new(
        key: OptionKey,
        text: impl Into<String>,
        is_correct: bool,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyOptionText);
        }
        Ok(Self {
            key,
            text,
            is_correct,
        })
    }

    #[must_use]
    pub fn key(&self) -> &OptionKey {
        &self.key
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question with exactly one correct option.
///
/// Immutable once loaded: there are no setters, only the validating constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<AnswerOption>,
}

impl Question {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is empty, the option count is outside
    /// 2..=4, keys repeat, or the number of correct options is not exactly one.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<AnswerOption>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&options.len()) {
            return Err(QuestionError::OptionCount(options.len()));
        }

        let mut seen = HashSet::with_capacity(options.len());
        for option in &options {
            if !seen.insert(option.key()) {
                return Err(QuestionError::DuplicateOptionKey(option.key().clone()));
            }
        }

        let correct = options.iter().filter(|o| o.is_correct()).count();
        if correct != 1 {
            return Err(QuestionError::CorrectOptionCount(correct));
        }

        Ok(Self {
            id,
            prompt,
            options,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    #[must_use]
    pub fn option(&self, key: &OptionKey) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.key() == key)
    }

    /// Option by zero-based display position.
    #[must_use]
    pub fn option_at(&self, index: usize) -> Option<&AnswerOption> {
        self.options.get(index)
    }

    /// Zero-based display position of an option.
    #[must_use]
    pub fn position_of(&self, key: &OptionKey) -> Option<usize> {
        self.options.iter().position(|o| o.key() == key)
    }

    #[must_use]
    pub fn correct_option(&self) -> &AnswerOption {
        // The constructor guarantees exactly one correct option.
        self.options
            .iter()
            .find(|o| o.is_correct())
            .unwrap_or(&self.options[0])
    }
}

#[derive(Deserialize)]
struct QuestionRepr {
    id: QuestionId,
    prompt: String,
    options: Vec<AnswerOption>,
}

impl<'de> Deserialize<'de> for Question {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let repr = QuestionRepr::deserialize(deserializer)?;
        Question::new(repr.id, repr.prompt, repr.options).map_err(serde::de::Error::custom)
    }
}
