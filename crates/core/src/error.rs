use thiserror::Error;

use crate::model::{PracticeError, QuestionError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Practice(#[from] PracticeError),
}
