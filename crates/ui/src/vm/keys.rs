use exam_core::model::QuestionNumber;
use services::{ExamController, ExamPhase, SessionError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    ArrowLeft,
    ArrowRight,
    Other,
}

/// A key event from the host, with the modifiers that matter here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub ctrl: bool,
    /// Command key on macOS.
    pub meta: bool,
}

impl KeyPress {
    #[must_use]
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            meta: false,
        }
    }

    #[must_use]
    pub fn ctrl(key: Key) -> Self {
        Self {
            key,
            ctrl: true,
            meta: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExamIntent {
    /// Zero-based option position.
    SelectOption(usize),
    Previous,
    Next,
    ToggleMark,
    GoTo(QuestionNumber),
    ShowSummary,
    BackToExam,
}

/// Keyboard shortcuts on the question screen: `1`-`4` pick an option,
/// arrows navigate, `Ctrl`/`Cmd`+`R` toggles the review mark.
#[must_use]
pub fn map_key(press: KeyPress, phase: ExamPhase) -> Option<ExamIntent> {
    if phase != ExamPhase::Taking {
        return None;
    }
    let command = press.ctrl || press.meta;
    match press.key {
        Key::Char('r' | 'R') if command => Some(ExamIntent::ToggleMark),
        Key::Char(c @ '1'..='4') if !command => c
            .to_digit(10)
            .and_then(|d| usize::try_from(d).ok())
            .map(|d| ExamIntent::SelectOption(d - 1)),
        Key::ArrowLeft if !command => Some(ExamIntent::Previous),
        Key::ArrowRight if !command => Some(ExamIntent::Next),
        _ => None,
    }
}

/// Forward an intent to the controller.
///
/// # Errors
///
/// Whatever the controller rejects, e.g. `NotTaking` or `QuestionOutOfRange`.
pub fn apply_intent(controller: &ExamController, intent: ExamIntent) -> Result<(), SessionError> {
    match intent {
        ExamIntent::SelectOption(index) => controller.select_option_at(index).map(|_| ()),
        ExamIntent::Previous => controller.previous().map(|_| ()),
        ExamIntent::Next => controller.next().map(|_| ()),
        ExamIntent::ToggleMark => controller.toggle_review_mark().map(|_| ()),
        ExamIntent::GoTo(number) => controller.go_to(number),
        ExamIntent::ShowSummary => controller.show_summary(),
        ExamIntent::BackToExam => controller.back_to_exam(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use services::SubmitReason;

    #[test]
    fn digits_select_by_position() {
        let taking = ExamPhase::Taking;
        assert_eq!(
            map_key(KeyPress::plain(Key::Char('1')), taking),
            Some(ExamIntent::SelectOption(0))
        );
        assert_eq!(
            map_key(KeyPress::plain(Key::Char('4')), taking),
            Some(ExamIntent::SelectOption(3))
        );
        assert_eq!(map_key(KeyPress::plain(Key::Char('5')), taking), None);
        assert_eq!(map_key(KeyPress::plain(Key::Char('0')), taking), None);
    }

    #[test]
    fn arrows_and_mark_shortcut() {
        let taking = ExamPhase::Taking;
        assert_eq!(
            map_key(KeyPress::plain(Key::ArrowLeft), taking),
            Some(ExamIntent::Previous)
        );
        assert_eq!(
            map_key(KeyPress::plain(Key::ArrowRight), taking),
            Some(ExamIntent::Next)
        );
        assert_eq!(
            map_key(KeyPress::ctrl(Key::Char('r')), taking),
            Some(ExamIntent::ToggleMark)
        );
        let cmd_r = KeyPress {
            key: Key::Char('R'),
            ctrl: false,
            meta: true,
        };
        assert_eq!(map_key(cmd_r, taking), Some(ExamIntent::ToggleMark));
        assert_eq!(map_key(KeyPress::plain(Key::Char('r')), taking), None);
    }

    #[test]
    fn shortcuts_are_ignored_outside_question_view() {
        let press = KeyPress::plain(Key::Char('1'));
        assert_eq!(map_key(press, ExamPhase::Reviewing), None);
        let submitted = ExamPhase::Submitted {
            reason: SubmitReason::Manual,
        };
        assert_eq!(map_key(press, submitted), None);
    }
}
