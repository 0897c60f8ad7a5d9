use std::fmt;

use exam_core::model::{PracticeId, StudentId};

use crate::config::Config;

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidPracticeId { raw: String },
    InvalidStudentId { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidPracticeId { raw } => {
                write!(f, "invalid --practice-id value: {raw}")
            }
            ArgsError::InvalidStudentId { raw } => {
                write!(f, "invalid --student-id value (expected UUID): {raw}")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Take a practice in the terminal.
    Take,
    /// List stored attempts.
    History,
    /// List active practices.
    Practices,
    Help,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "take" => Some(Self::Take),
            "history" => Some(Self::History),
            "practices" => Some(Self::Practices),
            "help" | "--help" | "-h" => Some(Self::Help),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Args {
    pub command: Command,
    pub db_url: String,
    pub practice_id: PracticeId,
    pub student_id: Option<StudentId>,
    pub student_name: String,
    pub resume: bool,
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    /// Flags override the environment-derived `config`.
    ///
    /// # Errors
    ///
    /// Returns `ArgsError` for unknown commands, flags, or malformed values.
    pub fn parse(
        argv: impl IntoIterator<Item = String>,
        config: &Config,
    ) -> Result<Self, ArgsError> {
        let mut args = argv.into_iter().peekable();
        let command = match args.peek() {
            None => Command::Take,
            Some(first) if first.starts_with("--") && first != "--help" => Command::Take,
            Some(first) => {
                let command = Command::from_arg(first)
                    .ok_or_else(|| ArgsError::UnknownCommand(first.clone()))?;
                args.next();
                command
            }
        };

        let mut parsed = Self {
            command,
            db_url: config.db_url.clone(),
            practice_id: config.practice_id,
            student_id: config.student_id,
            student_name: config.student_name.clone(),
            resume: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = value;
                }
                "--practice-id" => {
                    let value = require_value(&mut args, "--practice-id")?;
                    parsed.practice_id = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidPracticeId { raw: value.clone() })?;
                }
                "--student-id" => {
                    let value = require_value(&mut args, "--student-id")?;
                    parsed.student_id = Some(
                        value
                            .parse()
                            .map_err(|_| ArgsError::InvalidStudentId { raw: value.clone() })?,
                    );
                }
                "--name" => {
                    parsed.student_name = require_value(&mut args, "--name")?;
                }
                "--resume" => parsed.resume = true,
                "--help" | "-h" => parsed.command = Command::Help,
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        parsed.db_url = normalize_sqlite_url(parsed.db_url);
        Ok(parsed)
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- take      [--db <url>] [--practice-id <id>] [--student-id <uuid>] [--name <text>] [--resume]");
    eprintln!("  cargo run -p app -- history   [--db <url>] [--practice-id <id>] --student-id <uuid>");
    eprintln!("  cargo run -p app -- practices [--db <url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://exam.sqlite3");
    eprintln!("  --practice-id 1");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  EXAM_DB_URL, EXAM_PRACTICE_ID, EXAM_STUDENT_ID, EXAM_STUDENT_NAME, RUST_LOG,");
    eprintln!("  EXAM_AUTOSAVE_DEBOUNCE_MS, EXAM_SUBMIT_MAX_ATTEMPTS, EXAM_SUBMIT_BACKOFF_MS");
}

/// Turn a bare path or `sqlite:path` into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the database file (and parent directories) so sqlx can open it.
///
/// # Errors
///
/// Returns an I/O error, or `ArgsError::InvalidDbUrl` for a URL without a path.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::from_lookup(|_| None).unwrap()
    }

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn defaults_to_take() {
        let args = Args::parse(argv(&[]), &config()).unwrap();
        assert_eq!(args.command, Command::Take);
        let args = Args::parse(argv(&["--practice-id", "4"]), &config()).unwrap();
        assert_eq!(args.command, Command::Take);
        assert_eq!(args.practice_id, PracticeId::new(4));
    }

    #[test]
    fn history_with_student() {
        let args = Args::parse(
            argv(&[
                "history",
                "--db",
                "sqlite::memory:",
                "--student-id",
                "67e55044-10b1-426f-9247-bb680e5fe0c8",
            ]),
            &config(),
        )
        .unwrap();
        assert_eq!(args.command, Command::History);
        assert_eq!(args.db_url, "sqlite::memory:");
        assert!(args.student_id.is_some());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            Args::parse(argv(&["grade"]), &config()).unwrap_err(),
            ArgsError::UnknownCommand(_)
        ));
        assert!(matches!(
            Args::parse(argv(&["take", "--student-id", "bob"]), &config()).unwrap_err(),
            ArgsError::InvalidStudentId { .. }
        ));
        assert!(matches!(
            Args::parse(argv(&["take", "--db"]), &config()).unwrap_err(),
            ArgsError::MissingValue { flag: "--db" }
        ));
    }

    #[test]
    fn relative_paths_become_absolute_urls() {
        let url = normalize_sqlite_url("sqlite:data/exam.db".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/exam.db"));
    }
}
