mod autosave;
mod controller;
mod progress;
mod service;
mod session;
mod timer;

// Public API of the exam subsystem.
pub use autosave::{AutoSaver, SaveStatus};
pub use controller::{ExamController, PersistenceStatus, SubmitOutcome};
pub use progress::ProgressSnapshot;
pub use service::ExamService;
pub use session::{ExamPhase, ExamSession, ExamState, SubmitReason, SubmitRequest};
