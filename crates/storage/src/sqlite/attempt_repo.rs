use exam_core::model::{AnswerSheet, AttemptDraft, ExamResult, PracticeId, StudentId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::SqliteRepository;
use super::mapping::{
    attempt_id_from_i64, conn, practice_id_from_i64, ser, student_id_from_str,
    submission_id_from_str, u32_from_i64, u64_to_i64, write_err,
};
use crate::repository::{AttemptRepository, AttemptSubmission, StorageError, StoredAttempt};

fn map_attempt_row(row: &SqliteRow) -> Result<StoredAttempt, StorageError> {
    let id = attempt_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let submission_id =
        submission_id_from_str(&row.try_get::<String, _>("submission_id").map_err(ser)?)?;
    let practice_id = practice_id_from_i64(row.try_get::<i64, _>("practice_id").map_err(ser)?)?;
    let student_id = student_id_from_str(&row.try_get::<String, _>("student_id").map_err(ser)?)?;
    let attempt_number = u32_from_i64(
        "attempt_number",
        row.try_get::<i64, _>("attempt_number").map_err(ser)?,
    )?;
    let answers: String = row.try_get("answers").map_err(ser)?;
    let sheet: AnswerSheet = serde_json::from_str(&answers).map_err(ser)?;
    let result: String = row.try_get("result").map_err(ser)?;
    let result: ExamResult = serde_json::from_str(&result).map_err(ser)?;
    let points_earned = u32_from_i64(
        "points_earned",
        row.try_get::<i64, _>("points_earned").map_err(ser)?,
    )?;
    let time_spent: i64 = row.try_get("time_spent_secs").map_err(ser)?;
    let time_spent_secs = u64::try_from(time_spent).map_err(ser)?;
    let completed_at = row.try_get("completed_at").map_err(ser)?;

    Ok(StoredAttempt {
        id,
        submission_id,
        practice_id,
        student_id,
        attempt_number,
        sheet,
        result,
        points_earned,
        time_spent_secs,
        completed_at,
    })
}

#[async_trait::async_trait]
impl AttemptRepository for SqliteRepository {
    async fn save_draft(&self, draft: &AttemptDraft) -> Result<(), StorageError> {
        let payload = serde_json::to_string(draft).map_err(ser)?;

        sqlx::query(
            r"
            INSERT INTO attempt_drafts (practice_id, student_id, payload, saved_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(practice_id, student_id) DO UPDATE SET
                payload = excluded.payload,
                saved_at = excluded.saved_at
            ",
        )
        .bind(u64_to_i64("practice_id", draft.practice_id.value())?)
        .bind(draft.student_id.to_string())
        .bind(payload)
        .bind(draft.saved_at)
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(())
    }

    async fn load_draft(
        &self,
        practice_id: PracticeId,
        student_id: StudentId,
    ) -> Result<Option<AttemptDraft>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT payload
                FROM attempt_drafts
                WHERE practice_id = ?1 AND student_id = ?2
            ",
        )
        .bind(u64_to_i64("practice_id", practice_id.value())?)
        .bind(student_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.map(|row| {
            let payload: String = row.try_get("payload").map_err(ser)?;
            serde_json::from_str::<AttemptDraft>(&payload).map_err(ser)
        })
        .transpose()
    }

    async fn clear_draft(
        &self,
        practice_id: PracticeId,
        student_id: StudentId,
    ) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM attempt_drafts WHERE practice_id = ?1 AND student_id = ?2")
            .bind(u64_to_i64("practice_id", practice_id.value())?)
            .bind(student_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }

    async fn submit_attempt(
        &self,
        submission: &AttemptSubmission,
    ) -> Result<StoredAttempt, StorageError> {
        let pid = u64_to_i64("practice_id", submission.practice_id.value())?;
        let student = submission.student_id.to_string();

        let practice = self.fetch_practice(submission.practice_id).await?;
        let questions = self.fetch_questions(submission.practice_id).await?;

        let mut tx = self.pool.begin().await.map_err(conn)?;

        let existing = sqlx::query(
            r"
                SELECT id, submission_id, practice_id, student_id, attempt_number, answers,
                       result, points_earned, time_spent_secs, completed_at
                FROM attempts
                WHERE submission_id = ?1
            ",
        )
        .bind(submission.submission_id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(conn)?;
        if let Some(row) = existing {
            return map_attempt_row(&row);
        }

        let previous: i64 = sqlx::query(
            r"
                SELECT COALESCE(MAX(attempt_number), 0) AS previous
                FROM attempts
                WHERE practice_id = ?1 AND student_id = ?2
            ",
        )
        .bind(pid)
        .bind(&student)
        .fetch_one(&mut *tx)
        .await
        .map_err(conn)?
        .try_get("previous")
        .map_err(ser)?;
        let attempt_number = u32_from_i64("attempt_number", previous)?.saturating_add(1);

        let next_id: i64 = sqlx::query("SELECT COALESCE(MAX(id), 0) + 1 AS next_id FROM attempts")
            .fetch_one(&mut *tx)
            .await
            .map_err(conn)?
            .try_get("next_id")
            .map_err(ser)?;

        let stored = StoredAttempt::score(
            attempt_id_from_i64(next_id)?,
            attempt_number,
            &practice,
            &questions,
            submission,
        );

        sqlx::query(
            r"
            INSERT INTO attempts (
                id, practice_id, student_id, attempt_number, answers, result,
                correct_count, total, percentage, points_earned, time_spent_secs, completed_at,
                submission_id
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ",
        )
        .bind(next_id)
        .bind(pid)
        .bind(&student)
        .bind(i64::from(stored.attempt_number))
        .bind(serde_json::to_string(&stored.sheet).map_err(ser)?)
        .bind(serde_json::to_string(&stored.result).map_err(ser)?)
        .bind(i64::from(stored.result.correct_count()))
        .bind(i64::from(stored.result.total()))
        .bind(i64::from(stored.result.percentage()))
        .bind(i64::from(stored.points_earned))
        .bind(u64_to_i64("time_spent_secs", stored.time_spent_secs)?)
        .bind(stored.completed_at)
        .bind(submission.submission_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(write_err)?;

        tx.commit().await.map_err(conn)?;
        Ok(stored)
    }

    async fn list_attempts(
        &self,
        practice_id: PracticeId,
        student_id: StudentId,
    ) -> Result<Vec<StoredAttempt>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, submission_id, practice_id, student_id, attempt_number, answers,
                       result, points_earned, time_spent_secs, completed_at
                FROM attempts
                WHERE practice_id = ?1 AND student_id = ?2
                ORDER BY attempt_number DESC
            ",
        )
        .bind(u64_to_i64("practice_id", practice_id.value())?)
        .bind(student_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_attempt_row).collect()
    }
}
