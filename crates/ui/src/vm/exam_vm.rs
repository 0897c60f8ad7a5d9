use exam_core::model::{Question, QuestionNumber, QuestionStatus};
use services::{ProgressSnapshot, SaveStatus};

use crate::vm::time_fmt::format_remaining;

/// `A`, `B`, ... for a zero-based option position.
#[must_use]
pub fn option_letter(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .and_then(|i| b'A'.checked_add(i))
        .filter(u8::is_ascii_uppercase)
        .map_or('?', char::from)
}

#[must_use]
pub fn save_label(status: SaveStatus) -> &'static str {
    match status {
        SaveStatus::Saved => "Saved",
        SaveStatus::Saving => "Saving...",
        SaveStatus::Failed => "Save failed",
    }
}

fn status_label(status: QuestionStatus) -> &'static str {
    match status {
        QuestionStatus::Answered => "Answered",
        QuestionStatus::AnsweredMarked => "Answered, marked for review",
        QuestionStatus::Marked => "Marked for review",
        QuestionStatus::Unanswered => "Not answered",
    }
}

//
// ─── QUESTION SCREEN ───────────────────────────────────────────────────────────
//

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionRowVm {
    pub letter: char,
    pub key: String,
    pub text: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExamScreenVm {
    pub header: String,
    pub prompt: String,
    pub options: Vec<OptionRowVm>,
    pub time_label: String,
    pub low_time: bool,
    pub save_label: &'static str,
    pub answered_label: String,
    pub progress_ratio: f32,
    pub is_marked: bool,
    pub can_go_previous: bool,
    /// On the last question "next" gives way to the summary action.
    pub is_last: bool,
}

#[must_use]
pub fn map_exam_screen(
    progress: &ProgressSnapshot,
    question: &Question,
    save: SaveStatus,
) -> ExamScreenVm {
    let current = progress.current;
    let options = question
        .options()
        .iter()
        .enumerate()
        .map(|(i, option)| OptionRowVm {
            letter: option_letter(i),
            key: option.key().as_str().to_string(),
            text: option.text().to_string(),
            selected: progress.current_answer.as_ref() == Some(option.key()),
        })
        .collect();

    ExamScreenVm {
        header: format!("Question {current} of {}", progress.total),
        prompt: question.prompt().to_string(),
        options,
        time_label: format_remaining(progress.remaining_secs),
        low_time: progress.low_time,
        save_label: save_label(save),
        answered_label: format!(
            "{} / {} answered",
            progress.answered_count(),
            progress.total
        ),
        progress_ratio: progress.answered_ratio(),
        is_marked: progress.marked.contains(&current),
        can_go_previous: current != QuestionNumber::FIRST,
        is_last: current.index() + 1 >= progress.total,
    }
}

//
// ─── PROGRESS GRID ─────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridCellVm {
    pub number: QuestionNumber,
    pub status: QuestionStatus,
    pub is_current: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressGridVm {
    pub cells: Vec<GridCellVm>,
}

#[must_use]
pub fn map_progress_grid(progress: &ProgressSnapshot) -> ProgressGridVm {
    let cells = progress
        .statuses
        .iter()
        .enumerate()
        .filter_map(|(i, status)| {
            QuestionNumber::from_index(i).map(|number| GridCellVm {
                number,
                status: *status,
                is_current: number == progress.current,
            })
        })
        .collect();
    ProgressGridVm { cells }
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryRowVm {
    pub number: QuestionNumber,
    pub status: QuestionStatus,
    pub status_label: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryVm {
    pub answered: usize,
    pub unanswered: usize,
    pub marked: usize,
    pub time_label: String,
    pub rows: Vec<SummaryRowVm>,
    /// Shown on the submit button while questions remain open.
    pub warning: Option<String>,
}

#[must_use]
pub fn map_summary(progress: &ProgressSnapshot) -> SummaryVm {
    let unanswered = progress.unanswered_count();
    let rows = map_progress_grid(progress)
        .cells
        .into_iter()
        .map(|cell| SummaryRowVm {
            number: cell.number,
            status: cell.status,
            status_label: status_label(cell.status),
        })
        .collect();
    let warning = (unanswered > 0).then(|| {
        format!("{unanswered} question(s) are not answered yet. Submit anyway?")
    });

    SummaryVm {
        answered: progress.answered_count(),
        unanswered,
        marked: progress.marked_count(),
        time_label: format_remaining(progress.remaining_secs),
        rows,
        warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{AnswerOption, OptionKey, QuestionId};
    use services::ExamPhase;
    use std::collections::BTreeSet;

    fn n(v: u32) -> QuestionNumber {
        QuestionNumber::new(v).unwrap()
    }

    fn question() -> Question {
        let options = ["a", "b", "c"]
            .iter()
            .map(|k| AnswerOption::new(OptionKey::new(*k).unwrap(), format!("{k}!"), *k == "b"))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        Question::new(QuestionId::new(7), "2 + 2 = ?", options).unwrap()
    }

    fn snapshot() -> ProgressSnapshot {
        ProgressSnapshot {
            phase: ExamPhase::Taking,
            current: n(2),
            current_answer: Some(OptionKey::new("c").unwrap()),
            total: 4,
            answered: BTreeSet::from([n(1), n(2)]),
            marked: BTreeSet::from([n(2), n(3)]),
            statuses: vec![
                QuestionStatus::Answered,
                QuestionStatus::AnsweredMarked,
                QuestionStatus::Marked,
                QuestionStatus::Unanswered,
            ],
            remaining_secs: 250,
            total_secs: 1_800,
            low_time: true,
            confirmation_pending: false,
        }
    }

    #[test]
    fn option_letters() {
        assert_eq!(option_letter(0), 'A');
        assert_eq!(option_letter(3), 'D');
        assert_eq!(option_letter(40), '?');
    }

    #[test]
    fn exam_screen_marks_selection_and_navigation() {
        let vm = map_exam_screen(&snapshot(), &question(), SaveStatus::Saving);
        assert_eq!(vm.header, "Question 2 of 4");
        assert_eq!(vm.time_label, "4:10");
        assert!(vm.low_time);
        assert_eq!(vm.save_label, "Saving...");
        assert_eq!(vm.answered_label, "2 / 4 answered");
        assert!(vm.is_marked);
        assert!(vm.can_go_previous);
        assert!(!vm.is_last);
        let selected: Vec<_> = vm.options.iter().filter(|o| o.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].letter, 'C');
        assert!((vm.progress_ratio - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn grid_and_summary_reflect_both_facts() {
        let grid = map_progress_grid(&snapshot());
        assert_eq!(grid.cells.len(), 4);
        assert!(grid.cells[1].is_current);
        assert_eq!(grid.cells[2].status, QuestionStatus::Marked);

        let summary = map_summary(&snapshot());
        assert_eq!(summary.answered, 2);
        assert_eq!(summary.unanswered, 2);
        assert_eq!(summary.marked, 2);
        assert_eq!(summary.rows[1].status_label, "Answered, marked for review");
        assert!(summary.warning.unwrap().starts_with("2 question(s)"));
    }
}
