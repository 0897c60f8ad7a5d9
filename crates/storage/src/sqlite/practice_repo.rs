use exam_core::model::{AnswerOption, OptionKey, Practice, PracticeId, Question};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, map_practice_row, question_id_from_i64, ser, u64_to_i64};
use crate::repository::{QuestionBankRepository, StorageError};

impl SqliteRepository {
    pub(crate) async fn fetch_practice(&self, id: PracticeId) -> Result<Practice, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, title, description, duration_minutes, max_points,
                       graded_duration, is_active, allow_review, created_at
                FROM practices
                WHERE id = ?1
            ",
        )
        .bind(u64_to_i64("practice_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_practice_row(&row)
    }

    pub(crate) async fn fetch_questions(
        &self,
        practice_id: PracticeId,
    ) -> Result<Vec<Question>, StorageError> {
        let pid = u64_to_i64("practice_id", practice_id.value())?;

        let question_rows = sqlx::query(
            r"
                SELECT position, id, prompt
                FROM questions
                WHERE practice_id = ?1
                ORDER BY position ASC
            ",
        )
        .bind(pid)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let option_rows = sqlx::query(
            r"
                SELECT position, option_key, text, is_correct
                FROM question_options
                WHERE practice_id = ?1
                ORDER BY position ASC, option_index ASC
            ",
        )
        .bind(pid)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut questions = Vec::with_capacity(question_rows.len());
        for row in question_rows {
            let position: i64 = row.try_get("position").map_err(ser)?;
            let id = question_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
            let prompt: String = row.try_get("prompt").map_err(ser)?;

            let mut options = Vec::new();
            for opt in option_rows
                .iter()
                .filter(|o| o.try_get::<i64, _>("position").ok() == Some(position))
            {
                let key = OptionKey::new(opt.try_get::<String, _>("option_key").map_err(ser)?)
                    .map_err(ser)?;
                let text: String = opt.try_get("text").map_err(ser)?;
                let is_correct: bool = opt.try_get("is_correct").map_err(ser)?;
                options.push(AnswerOption::new(key, text, is_correct).map_err(ser)?);
            }

            questions.push(Question::new(id, prompt, options).map_err(ser)?);
        }

        Ok(questions)
    }
}

#[async_trait::async_trait]
impl QuestionBankRepository for SqliteRepository {
    async fn upsert_practice(&self, practice: &Practice) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO practices (
                id, title, description, duration_minutes, max_points,
                graded_duration, is_active, allow_review, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                duration_minutes = excluded.duration_minutes,
                max_points = excluded.max_points,
                graded_duration = excluded.graded_duration,
                is_active = excluded.is_active,
                allow_review = excluded.allow_review
            ",
        )
        .bind(u64_to_i64("practice_id", practice.id().value())?)
        .bind(practice.title())
        .bind(practice.description())
        .bind(i64::from(practice.duration_minutes()))
        .bind(i64::from(practice.max_points()))
        .bind(practice.graded_duration())
        .bind(practice.is_active())
        .bind(practice.allow_review())
        .bind(practice.created_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_practice(&self, id: PracticeId) -> Result<Practice, StorageError> {
        self.fetch_practice(id).await
    }

    async fn upsert_questions(
        &self,
        practice_id: PracticeId,
        questions: &[Question],
    ) -> Result<(), StorageError> {
        // Fails with NotFound before touching the question tables.
        self.fetch_practice(practice_id).await?;
        let pid = u64_to_i64("practice_id", practice_id.value())?;

        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query("DELETE FROM questions WHERE practice_id = ?1")
            .bind(pid)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for (position, question) in questions.iter().enumerate() {
            let position = i64::try_from(position).map_err(ser)?;
            sqlx::query(
                r"
                INSERT INTO questions (practice_id, position, id, prompt)
                VALUES (?1, ?2, ?3, ?4)
                ",
            )
            .bind(pid)
            .bind(position)
            .bind(u64_to_i64("question_id", question.id().value())?)
            .bind(question.prompt())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

            for (option_index, option) in question.options().iter().enumerate() {
                sqlx::query(
                    r"
                    INSERT INTO question_options (
                        practice_id, position, option_index, option_key, text, is_correct
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    ",
                )
                .bind(pid)
                .bind(position)
                .bind(i64::try_from(option_index).map_err(ser)?)
                .bind(option.key().as_str())
                .bind(option.text())
                .bind(option.is_correct())
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
            }
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn load_questions(&self, practice_id: PracticeId) -> Result<Vec<Question>, StorageError> {
        let practice = self.fetch_practice(practice_id).await?;
        if !practice.is_active() {
            return Err(StorageError::NotFound);
        }
        self.fetch_questions(practice_id).await
    }

    async fn list_active_practices(&self) -> Result<Vec<Practice>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, title, description, duration_minutes, max_points,
                       graded_duration, is_active, allow_review, created_at
                FROM practices
                WHERE is_active = 1
                ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_practice_row(&row)?);
        }
        Ok(out)
    }
}
