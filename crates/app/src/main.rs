use std::sync::Arc;

use exam_core::Clock;
use exam_core::model::{Identity, StudentId};
use services::{ExamService, StaticIdentity};
use storage::repository::Storage;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use ui::vm::{format_datetime, map_history};

mod cli;
mod config;
mod terminal;

use cli::{Args, Command, prepare_sqlite_file, print_usage};
use config::Config;

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    // Logs go to stderr so they never interleave with the exam screen.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn identity_for(args: &Args) -> Result<Identity, std::io::Error> {
    let student_id = match (args.student_id, args.command) {
        (Some(id), _) => id,
        (None, Command::History) => {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "--student-id (or EXAM_STUDENT_ID) is required",
            ));
        }
        (None, Command::Take) => {
            let id = StudentId::random();
            println!("No student id given; using {id}. Pass --student-id {id} to resume later.");
            id
        }
        (None, _) => StudentId::random(),
    };
    Ok(Identity::student(student_id, args.student_name.clone()))
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    init_tracing(&config.log_filter);

    let parsed = Args::parse(std::env::args().skip(1), &config).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    if parsed.command == Command::Help {
        print_usage();
        return Ok(());
    }

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;
    info!(db = %parsed.db_url, command = ?parsed.command, "storage ready");

    let identity = identity_for(&parsed)?;
    let service = ExamService::new(
        Clock::default_clock(),
        storage,
        Arc::new(StaticIdentity::new(identity)),
    )
    .with_settings(config.settings);

    match parsed.command {
        Command::Take => {
            let controller = if parsed.resume {
                service.resume_or_start(parsed.practice_id).await?
            } else {
                service.start(parsed.practice_id).await?
            };
            terminal::run_exam(controller).await?;
        }
        Command::History => {
            let attempts = service.history(parsed.practice_id).await?;
            if attempts.is_empty() {
                println!("No attempts yet.");
            }
            for row in map_history(&attempts) {
                println!(
                    "#{:<3} {}  {:>4}  {:>10}  {}",
                    row.attempt_number,
                    row.completed_at_str,
                    row.percentage_label,
                    row.points_label,
                    row.time_spent_label
                );
            }
        }
        Command::Practices => {
            for practice in service.list_practices().await? {
                println!(
                    "{:>4}  {}  ({} min, {} points)  {}",
                    practice.id(),
                    practice.title(),
                    practice.duration_minutes(),
                    practice.max_points(),
                    format_datetime(practice.created_at())
                );
            }
        }
        Command::Help => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
