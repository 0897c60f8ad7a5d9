mod attempt;
mod identity;
mod ids;
mod practice;
mod question;
mod result;

pub use attempt::{AnswerSheet, AttemptDraft, QuestionNumber, QuestionStatus};
pub use identity::{Identity, Role};
pub use ids::{AttemptId, ParseIdError, PracticeId, QuestionId, StudentId, SubmissionId};
pub use practice::{Practice, PracticeError};
pub use question::{AnswerOption, MAX_OPTIONS, MIN_OPTIONS, OptionKey, Question, QuestionError};
pub use result::{ExamResult, OutcomeKind, QuestionOutcome, ScoreBand};
