use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs versioned migrations for the practice and attempt schema.
#[allow(clippy::too_many_lines)]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: practices and their ordered questions.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS practices (
                    id INTEGER PRIMARY KEY,
                    title TEXT NOT NULL,
                    description TEXT,
                    duration_minutes INTEGER NOT NULL CHECK (duration_minutes > 0),
                    max_points INTEGER NOT NULL CHECK (max_points >= 0),
                    graded_duration INTEGER NOT NULL DEFAULT 0,
                    is_active INTEGER NOT NULL DEFAULT 1,
                    allow_review INTEGER NOT NULL DEFAULT 1,
                    created_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS questions (
                    practice_id INTEGER NOT NULL,
                    position INTEGER NOT NULL CHECK (position >= 0),
                    id INTEGER NOT NULL,
                    prompt TEXT NOT NULL,
                    PRIMARY KEY (practice_id, position),
                    FOREIGN KEY (practice_id) REFERENCES practices(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS question_options (
                    practice_id INTEGER NOT NULL,
                    position INTEGER NOT NULL,
                    option_index INTEGER NOT NULL CHECK (option_index BETWEEN 0 AND 3),
                    option_key TEXT NOT NULL,
                    text TEXT NOT NULL,
                    is_correct INTEGER NOT NULL,
                    PRIMARY KEY (practice_id, position, option_index),
                    FOREIGN KEY (practice_id, position)
                        REFERENCES questions(practice_id, position) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_practices_active_created
                    ON practices (is_active, created_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        mark_applied(&mut tx, 1).await?;
        tx.commit().await?;
    }

    // Version 2: auto-save drafts and scored attempts.
    if !is_applied(pool, 2).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS attempt_drafts (
                    practice_id INTEGER NOT NULL,
                    student_id TEXT NOT NULL,
                    payload TEXT NOT NULL,
                    saved_at TEXT NOT NULL,
                    PRIMARY KEY (practice_id, student_id),
                    FOREIGN KEY (practice_id) REFERENCES practices(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS attempts (
                    id INTEGER PRIMARY KEY,
                    practice_id INTEGER NOT NULL,
                    student_id TEXT NOT NULL,
                    attempt_number INTEGER NOT NULL CHECK (attempt_number >= 1),
                    answers TEXT NOT NULL,
                    result TEXT NOT NULL,
                    correct_count INTEGER NOT NULL CHECK (correct_count >= 0),
                    total INTEGER NOT NULL CHECK (total >= 0),
                    percentage INTEGER NOT NULL CHECK (percentage BETWEEN 0 AND 100),
                    points_earned INTEGER NOT NULL CHECK (points_earned >= 0),
                    time_spent_secs INTEGER NOT NULL CHECK (time_spent_secs >= 0),
                    completed_at TEXT NOT NULL,
                    UNIQUE (practice_id, student_id, attempt_number),
                    FOREIGN KEY (practice_id) REFERENCES practices(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        mark_applied(&mut tx, 2).await?;
        tx.commit().await?;
    }

    // Version 3: client submission keys, so a retried submit finds its first write.
    if !is_applied(pool, 3).await? {
        let mut tx = pool.begin().await?;

        sqlx::query("ALTER TABLE attempts ADD COLUMN submission_id TEXT")
            .execute(&mut *tx)
            .await?;

        // Rows written before version 3 get a random key in uuid simple form.
        sqlx::query(
            r"
                UPDATE attempts
                SET submission_id = lower(hex(randomblob(16)))
                WHERE submission_id IS NULL
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE UNIQUE INDEX IF NOT EXISTS idx_attempts_submission
                    ON attempts (submission_id);
            ",
        )
        .execute(&mut *tx)
        .await?;

        mark_applied(&mut tx, 3).await?;
        tx.commit().await?;
    }

    Ok(())
}

async fn mark_applied(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    version: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
            INSERT INTO schema_migrations (version, applied_at)
            VALUES (?1, ?2)
            ON CONFLICT(version) DO NOTHING
        ",
    )
    .bind(version)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;
    Ok(())
}
