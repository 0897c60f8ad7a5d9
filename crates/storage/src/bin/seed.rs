use std::fmt;

use chrono::{DateTime, Utc};
use exam_core::model::{AnswerOption, OptionKey, Practice, PracticeId, Question, QuestionId};
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    practice_id: PracticeId,
    title: String,
    description: Option<String>,
    duration_minutes: u32,
    max_points: u32,
    graded_duration: bool,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidPracticeId { raw: String },
    InvalidMinutes { raw: String },
    InvalidPoints { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidPracticeId { raw } => {
                write!(f, "invalid --practice-id value: {raw}")
            }
            ArgsError::InvalidMinutes { raw } => write!(f, "invalid --minutes value: {raw}"),
            ArgsError::InvalidPoints { raw } => write!(f, "invalid --max-points value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("EXAM_DB_URL").unwrap_or_else(|_| "sqlite:exam.sqlite3?mode=rwc".into());
        let mut practice_id = std::env::var("EXAM_PRACTICE_ID")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map_or_else(|| PracticeId::new(1), PracticeId::new);
        let mut title = "Algebra Basics".to_string();
        let mut description = Some("Linear equations and simple identities".to_string());
        let mut duration_minutes = 30;
        let mut max_points = 100;
        let mut graded_duration = false;
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--practice-id" => {
                    let value = require_value(&mut args, "--practice-id")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidPracticeId { raw: value.clone() })?;
                    practice_id = PracticeId::new(parsed);
                }
                "--title" => {
                    title = require_value(&mut args, "--title")?;
                }
                "--description" => {
                    description = Some(require_value(&mut args, "--description")?);
                }
                "--minutes" => {
                    let value = require_value(&mut args, "--minutes")?;
                    duration_minutes = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidMinutes { raw: value.clone() })?;
                }
                "--max-points" => {
                    let value = require_value(&mut args, "--max-points")?;
                    max_points = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidPoints { raw: value.clone() })?;
                }
                "--graded-duration" => graded_duration = true,
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            practice_id,
            title,
            description,
            duration_minutes,
            max_points,
            graded_duration,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:exam.sqlite3?mode=rwc)");
    eprintln!("  --practice-id <id>        Practice id to upsert (default: 1)");
    eprintln!("  --title <text>            Practice title (default: Algebra Basics)");
    eprintln!("  --description <text>      Practice description");
    eprintln!("  --minutes <n>             Time limit in minutes (default: 30)");
    eprintln!("  --max-points <n>          Points for a perfect score (default: 100)");
    eprintln!("  --graded-duration         Award a bonus for finishing early");
    eprintln!("  --now <rfc3339>           Fixed creation time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  EXAM_DB_URL, EXAM_PRACTICE_ID");
}

/// Prompt, option texts and the index of the correct option.
const SAMPLES: [(&str, [&str; 4], usize); 5] = [
    ("Solve for x: 2x + 6 = 14", ["x = 3", "x = 4", "x = 5", "x = 10"], 1),
    ("Expand (a + b)^2", ["a^2 + b^2", "2a + 2b", "a^2 + 2ab + b^2", "a^2 - b^2"], 2),
    ("What is 3^4?", ["12", "64", "81", "27"], 2),
    ("Solve for y: y / 3 = 7", ["y = 21", "y = 10", "y = 4", "y = 7/3"], 0),
    ("Simplify 5(x - 2) - 3x", ["2x - 10", "8x - 10", "2x + 10", "2x - 2"], 0),
];

fn sample_questions() -> Result<Vec<Question>, exam_core::Error> {
    let keys = ["A", "B", "C", "D"];
    let mut questions = Vec::with_capacity(SAMPLES.len());
    for (i, (prompt, texts, correct)) in SAMPLES.iter().enumerate() {
        let mut options = Vec::with_capacity(texts.len());
        for (j, text) in texts.iter().enumerate() {
            options.push(AnswerOption::new(OptionKey::new(keys[j])?, *text, j == *correct)?);
        }
        questions.push(Question::new(QuestionId::new(i as u64 + 1), *prompt, options)?);
    }
    Ok(questions)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let practice = Practice::new(
        args.practice_id,
        args.title.clone(),
        args.description.clone(),
        args.duration_minutes,
        args.max_points,
        now,
    )?
    .with_graded_duration(args.graded_duration);
    storage.practices.upsert_practice(&practice).await?;

    let questions = sample_questions()?;
    storage
        .practices
        .upsert_questions(practice.id(), &questions)
        .await?;

    println!(
        "Seeded practice {} ({}) with {} questions into {}",
        practice.id(),
        practice.title(),
        questions.len(),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
