use exam_core::model::{AttemptId, Practice, PracticeId, QuestionId, StudentId, SubmissionId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Maps write failures, turning constraint violations into domain errors.
pub(crate) fn write_err(e: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_foreign_key_violation() {
            return StorageError::NotFound;
        }
        if db.is_unique_violation() {
            return StorageError::Conflict;
        }
    }
    conn(e)
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn u64_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn practice_id_from_i64(v: i64) -> Result<PracticeId, StorageError> {
    Ok(PracticeId::new(i64_to_u64("practice_id", v)?))
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question_id", v)?))
}

pub(crate) fn attempt_id_from_i64(v: i64) -> Result<AttemptId, StorageError> {
    Ok(AttemptId::new(i64_to_u64("attempt_id", v)?))
}

pub(crate) fn student_id_from_str(raw: &str) -> Result<StudentId, StorageError> {
    raw.parse::<StudentId>().map_err(ser)
}

pub(crate) fn submission_id_from_str(raw: &str) -> Result<SubmissionId, StorageError> {
    raw.parse::<SubmissionId>().map_err(ser)
}

pub(crate) fn map_practice_row(row: &SqliteRow) -> Result<Practice, StorageError> {
    let id = practice_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let title: String = row.try_get("title").map_err(ser)?;
    let description: Option<String> = row.try_get("description").map_err(ser)?;
    let duration_minutes = u32_from_i64(
        "duration_minutes",
        row.try_get::<i64, _>("duration_minutes").map_err(ser)?,
    )?;
    let max_points = u32_from_i64("max_points", row.try_get::<i64, _>("max_points").map_err(ser)?)?;
    let graded_duration: bool = row.try_get("graded_duration").map_err(ser)?;
    let is_active: bool = row.try_get("is_active").map_err(ser)?;
    let allow_review: bool = row.try_get("allow_review").map_err(ser)?;
    let created_at = row.try_get("created_at").map_err(ser)?;

    Practice::from_persisted(
        id,
        title,
        description,
        duration_minutes,
        max_points,
        graded_duration,
        is_active,
        allow_review,
        created_at,
    )
    .map_err(ser)
}
