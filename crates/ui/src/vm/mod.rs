mod exam_vm;
mod keys;
mod results_vm;
mod time_fmt;

pub use exam_vm::{
    ExamScreenVm, GridCellVm, OptionRowVm, ProgressGridVm, SummaryRowVm, SummaryVm,
    map_exam_screen, map_progress_grid, map_summary, option_letter, save_label,
};
pub use keys::{ExamIntent, Key, KeyPress, apply_intent, map_key};
pub use results_vm::{AttemptHistoryRowVm, ResultRowVm, ResultsVm, map_history, map_results};
pub use time_fmt::{format_datetime, format_remaining};
