#![forbid(unsafe_code)]

pub mod error;
pub mod exam;
pub mod identity;
pub mod settings;

pub use exam_core::Clock;

pub use error::SessionError;
pub use exam::{
    ExamController, ExamPhase, ExamService, ExamSession, ExamState, PersistenceStatus,
    ProgressSnapshot, SaveStatus, SubmitOutcome, SubmitReason, SubmitRequest,
};
pub use identity::{IdentityProvider, StaticIdentity};
pub use settings::{RetryPolicy, SessionSettings};
