//! Line-based exam screen on stdin/stdout.

use exam_core::model::{OutcomeKind, QuestionNumber, QuestionStatus};
use services::{
    ExamController, ExamPhase, SessionError, SubmitOutcome, SubmitReason,
};
use storage::repository::StoredAttempt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};
use ui::vm::{
    ExamIntent, Key, KeyPress, apply_intent, map_exam_screen, map_key, map_progress_grid,
    map_results, map_summary,
};

/// One parsed input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Key(KeyPress),
    GoTo(QuestionNumber),
    Summary,
    Back(Option<QuestionNumber>),
    Submit,
    Yes,
    No,
    Retry,
    Quit,
    Help,
}

/// `None` for blank or unrecognised input.
#[must_use]
pub fn parse_input(line: &str) -> Option<Input> {
    let mut words = line.split_whitespace();
    let head = words.next()?.to_ascii_lowercase();
    let number = words
        .next()
        .and_then(|w| w.parse::<u32>().ok())
        .and_then(QuestionNumber::new);

    let input = match head.as_str() {
        "n" | "next" | ">" => Input::Key(KeyPress::plain(Key::ArrowRight)),
        "p" | "prev" | "<" => Input::Key(KeyPress::plain(Key::ArrowLeft)),
        "m" | "mark" | "^r" => Input::Key(KeyPress::ctrl(Key::Char('r'))),
        "go" => Input::GoTo(number?),
        "s" | "summary" => Input::Summary,
        "b" | "back" => Input::Back(number),
        "submit" => Input::Submit,
        "y" | "yes" => Input::Yes,
        "no" => Input::No,
        "retry" => Input::Retry,
        "q" | "quit" => Input::Quit,
        "h" | "help" | "?" => Input::Help,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Input::Key(KeyPress::plain(Key::Char(c))),
                _ => return None,
            }
        }
    };
    Some(input)
}

fn status_glyph(status: QuestionStatus) -> char {
    match status {
        QuestionStatus::Answered => '#',
        QuestionStatus::AnsweredMarked => '*',
        QuestionStatus::Marked => '?',
        QuestionStatus::Unanswered => '.',
    }
}

fn print_help() {
    println!("  1-4      choose an option");
    println!("  n / p    next / previous question");
    println!("  m        toggle the review mark");
    println!("  go <n>   jump to question n");
    println!("  summary  review all questions before submitting");
    println!("  back [n] return to the questions (optionally to question n)");
    println!("  submit   submit the attempt");
    println!("  quit     leave without submitting");
}

fn render(controller: &ExamController) {
    let progress = controller.progress();
    match progress.phase {
        ExamPhase::Taking => {
            let question = controller.current_question();
            let screen = map_exam_screen(&progress, &question, controller.save_status());
            let grid: String = map_progress_grid(&progress)
                .cells
                .iter()
                .map(|cell| {
                    if cell.is_current {
                        '@'
                    } else {
                        status_glyph(cell.status)
                    }
                })
                .collect();

            println!();
            println!(
                "{}  [{}{}]  {}  {}",
                screen.header,
                screen.time_label,
                if screen.low_time { " !" } else { "" },
                screen.answered_label,
                screen.save_label,
            );
            println!("{grid}");
            if screen.is_marked {
                println!("(marked for review)");
            }
            println!("{}", screen.prompt);
            for (i, option) in screen.options.iter().enumerate() {
                let pick = if option.selected { '>' } else { ' ' };
                println!(" {pick} {}. {}) {}", i + 1, option.letter, option.text);
            }
            if screen.is_last {
                println!("Last question. Type `summary` to review, or `submit`.");
            }
        }
        ExamPhase::Reviewing => {
            let summary = map_summary(&progress);
            println!();
            println!(
                "Summary  [{}]  answered {}  unanswered {}  marked {}",
                summary.time_label, summary.answered, summary.unanswered, summary.marked
            );
            for row in &summary.rows {
                println!("  {:>3}  {}", row.number, row.status_label);
            }
            if let Some(warning) = &summary.warning {
                println!("{warning}");
            }
            println!("Type `back [n]` to keep working, or `submit`.");
        }
        ExamPhase::Submitted { .. } => {}
    }
}

fn render_results(controller: &ExamController, stored: &StoredAttempt) {
    let practice = controller.practice();
    let questions = controller.questions();
    let vm = map_results(
        &stored.result,
        &questions,
        Some(stored.points_earned),
        practice.allow_review(),
    );

    println!();
    println!("{} (attempt #{})", practice.title(), stored.attempt_number);
    println!("{}  {}", vm.percentage_label, vm.score_label);
    if let Some(points) = &vm.points_label {
        println!("{points}");
    }
    println!("{}", vm.message);
    for row in &vm.rows {
        let mark = match row.kind {
            OutcomeKind::Correct => "ok",
            OutcomeKind::Incorrect => "x ",
            OutcomeKind::Unanswered => "- ",
        };
        println!(
            "  {mark} {:>3}. {}  yours: {}  correct: {}",
            row.number,
            row.prompt,
            row.selected.as_deref().unwrap_or("-"),
            row.correct
        );
    }
}

/// Wait for the stored record after the session ended, letting the student
/// retry while the store keeps failing.
async fn settle(
    controller: &ExamController,
    lines: &mut tokio::io::Lines<BufReader<tokio::io::Stdin>>,
) -> std::io::Result<Option<StoredAttempt>> {
    loop {
        match controller.retry_submission().await {
            Ok(stored) => return Ok(Some(stored)),
            Err(err) => {
                println!("{err}");
                println!("Type `retry` to try again, or `quit` to leave.");
            }
        }
        loop {
            let Some(line) = lines.next_line().await? else {
                return Ok(None);
            };
            match parse_input(&line) {
                Some(Input::Retry) => break,
                Some(Input::Quit) => return Ok(None),
                _ => println!("Type `retry` or `quit`."),
            }
        }
    }
}

/// Drive one attempt until it is stored or the student leaves.
///
/// # Errors
///
/// Only stdin failures; session errors are printed and the loop continues.
pub async fn run_exam(controller: ExamController) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut finished = controller.finished();
    let mut awaiting_confirmation = false;
    let mut leaving = false;

    println!(
        "{} as {}. Type `help` for commands.",
        controller.practice().title(),
        controller.identity().display_name
    );

    while !*finished.borrow() {
        render(&controller);

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = finished.wait_for(|done| *done) => break,
        };
        let Some(line) = line else {
            // stdin closed
            controller.abandon().await;
            return Ok(());
        };
        let Some(input) = parse_input(&line) else {
            println!("Unknown command. Type `help`.");
            continue;
        };
        debug!(?input, "terminal input");

        if leaving {
            leaving = false;
            if input == Input::Yes {
                controller.abandon().await;
                println!("Left without submitting. Your answers were auto-saved.");
                return Ok(());
            }
            continue;
        }

        if awaiting_confirmation {
            awaiting_confirmation = false;
            match input {
                Input::Yes => match controller.confirm_submit().await {
                    Ok(stored) => {
                        render_results(&controller, &stored);
                        return Ok(());
                    }
                    Err(err) => {
                        println!("{err}");
                        break;
                    }
                },
                _ => {
                    if let Err(err) = controller.cancel_submit() {
                        warn!(error = %err, "cancel_submit rejected");
                    }
                    continue;
                }
            }
        }

        let outcome: Result<(), SessionError> = match input {
            Input::Key(press) => match map_key(press, controller.phase()) {
                Some(intent) => apply_intent(&controller, intent),
                None => {
                    println!("Unknown command. Type `help`.");
                    Ok(())
                }
            },
            Input::GoTo(number) => apply_intent(&controller, ExamIntent::GoTo(number)),
            Input::Summary => apply_intent(&controller, ExamIntent::ShowSummary),
            Input::Back(None) => apply_intent(&controller, ExamIntent::BackToExam),
            Input::Back(Some(number)) => controller.back_to_exam(Some(number)),
            Input::Submit => match controller.submit().await {
                Ok(SubmitOutcome::ConfirmationRequired { unanswered }) => {
                    println!("{unanswered} question(s) are not answered. Submit anyway? (yes/no)");
                    awaiting_confirmation = true;
                    Ok(())
                }
                Ok(SubmitOutcome::Submitted(stored)) => {
                    render_results(&controller, &stored);
                    return Ok(());
                }
                Err(err) => Err(err),
            },
            Input::Quit => {
                if controller.should_warn_before_leaving() {
                    println!("The attempt is not submitted. Leave anyway? (yes/no)");
                    leaving = true;
                    continue;
                }
                return Ok(());
            }
            Input::Help => {
                print_help();
                Ok(())
            }
            Input::Yes | Input::No | Input::Retry => Ok(()),
        };
        if let Err(err) = outcome {
            println!("{err}");
        }
    }

    if let ExamPhase::Submitted {
        reason: SubmitReason::TimeExpired,
    } = controller.phase()
    {
        println!();
        println!("Time is up. Your answers were submitted automatically.");
    }
    if let Some(stored) = settle(&controller, &mut lines).await? {
        render_results(&controller, &stored);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_and_navigation_become_key_presses() {
        assert_eq!(
            parse_input("2"),
            Some(Input::Key(KeyPress::plain(Key::Char('2'))))
        );
        assert_eq!(
            parse_input(" next "),
            Some(Input::Key(KeyPress::plain(Key::ArrowRight)))
        );
        assert_eq!(
            parse_input("m"),
            Some(Input::Key(KeyPress::ctrl(Key::Char('r'))))
        );
    }

    #[test]
    fn numbered_commands() {
        let five = QuestionNumber::new(5);
        assert_eq!(parse_input("go 5"), five.map(Input::GoTo));
        assert_eq!(parse_input("go"), None);
        assert_eq!(parse_input("go 0"), None);
        assert_eq!(parse_input("back"), Some(Input::Back(None)));
        assert_eq!(parse_input("back 5"), Some(Input::Back(five)));
    }

    #[test]
    fn words_and_blanks() {
        assert_eq!(parse_input("SUBMIT"), Some(Input::Submit));
        assert_eq!(parse_input("yes"), Some(Input::Yes));
        assert_eq!(parse_input(""), None);
        assert_eq!(parse_input("launch"), None);
    }

    #[test]
    fn digit_keys_map_to_option_positions() {
        let Some(Input::Key(press)) = parse_input("3") else {
            panic!("expected a key press");
        };
        assert_eq!(
            map_key(press, ExamPhase::Taking),
            Some(ExamIntent::SelectOption(2))
        );
        assert_eq!(map_key(press, ExamPhase::Reviewing), None);
    }
}
