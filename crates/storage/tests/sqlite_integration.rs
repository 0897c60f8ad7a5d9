use exam_core::model::{
    AnswerOption, AnswerSheet, AttemptDraft, OptionKey, Practice, PracticeId, Question,
    QuestionId, QuestionNumber, StudentId, SubmissionId,
};
use exam_core::time::fixed_now;
use storage::repository::{
    AttemptRepository, AttemptSubmission, QuestionBankRepository, StorageError,
};
use storage::sqlite::SqliteRepository;

fn build_practice(id: u64) -> Practice {
    Practice::new(
        PracticeId::new(id),
        "Algebra",
        Some("Linear equations".into()),
        30,
        100,
        fixed_now(),
    )
    .unwrap()
}

fn build_question(id: u64, correct: &str) -> Question {
    let options = ["A", "B", "C", "D"]
        .iter()
        .map(|k| {
            AnswerOption::new(OptionKey::new(*k).unwrap(), format!("option {k}"), *k == correct)
                .unwrap()
        })
        .collect();
    Question::new(QuestionId::new(id), format!("Question {id}"), options).unwrap()
}

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn n(v: u32) -> QuestionNumber {
    QuestionNumber::new(v).unwrap()
}

#[tokio::test]
async fn sqlite_roundtrip_preserves_question_order_and_options() {
    let repo = connect("memdb_questions").await;
    let practice = build_practice(1).with_graded_duration(true);
    repo.upsert_practice(&practice).await.unwrap();

    let bank = vec![
        build_question(30, "B"),
        build_question(10, "A"),
        build_question(20, "D"),
    ];
    repo.upsert_questions(practice.id(), &bank).await.unwrap();

    let loaded = repo.load_questions(practice.id()).await.unwrap();
    assert_eq!(loaded, bank);

    let fetched = repo.get_practice(practice.id()).await.unwrap();
    assert_eq!(fetched, practice);

    // Replacing the bank drops questions no longer present.
    repo.upsert_questions(practice.id(), &bank[..1]).await.unwrap();
    assert_eq!(repo.load_questions(practice.id()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn sqlite_hides_inactive_practices() {
    let repo = connect("memdb_inactive").await;
    let active = build_practice(1);
    let inactive = build_practice(2).with_active(false);
    repo.upsert_practice(&active).await.unwrap();
    repo.upsert_practice(&inactive).await.unwrap();
    repo.upsert_questions(inactive.id(), &[build_question(1, "A")])
        .await
        .unwrap();

    let err = repo.load_questions(inactive.id()).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
    let err = repo.load_questions(PracticeId::new(42)).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));

    let listed = repo.list_active_practices().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id(), active.id());
}

#[tokio::test]
async fn sqlite_upsert_questions_requires_practice() {
    let repo = connect("memdb_orphan").await;
    let err = repo
        .upsert_questions(PracticeId::new(7), &[build_question(1, "A")])
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn sqlite_drafts_replace_and_clear() {
    let repo = connect("memdb_drafts").await;
    let practice = build_practice(1);
    repo.upsert_practice(&practice).await.unwrap();
    let student = StudentId::random();

    let mut sheet = AnswerSheet::new();
    sheet.select(n(2), OptionKey::new("C").unwrap());
    sheet.toggle_mark(n(3));
    let mut draft = AttemptDraft {
        practice_id: practice.id(),
        student_id: student,
        sheet,
        current: n(3),
        remaining_secs: 1_500,
        saved_at: fixed_now(),
    };
    repo.save_draft(&draft).await.unwrap();
    draft.remaining_secs = 1_400;
    repo.save_draft(&draft).await.unwrap();

    let loaded = repo.load_draft(practice.id(), student).await.unwrap();
    assert_eq!(loaded, Some(draft));

    repo.clear_draft(practice.id(), student).await.unwrap();
    assert!(repo.load_draft(practice.id(), student).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_submit_scores_and_lists_attempts() {
    let repo = connect("memdb_attempts").await;
    let practice = build_practice(1);
    repo.upsert_practice(&practice).await.unwrap();
    repo.upsert_questions(
        practice.id(),
        &[
            build_question(1, "B"),
            build_question(2, "A"),
            build_question(3, "C"),
        ],
    )
    .await
    .unwrap();
    let student = StudentId::random();

    let mut sheet = AnswerSheet::new();
    sheet.select(n(1), OptionKey::new("B").unwrap());
    sheet.select(n(2), OptionKey::new("A").unwrap());
    sheet.select(n(3), OptionKey::new("D").unwrap());
    let submission = AttemptSubmission {
        submission_id: SubmissionId::random(),
        practice_id: practice.id(),
        student_id: student,
        sheet,
        time_spent_secs: 600,
        completed_at: fixed_now(),
    };

    let first = repo.submit_attempt(&submission).await.unwrap();
    assert_eq!(first.attempt_number, 1);
    assert_eq!(first.submission_id, submission.submission_id);
    assert_eq!(first.result.correct_count(), 2);
    assert_eq!(first.result.percentage(), 67);
    assert_eq!(first.points_earned, 67);

    // Same key again: the stored row comes back, nothing new is numbered.
    let replayed = repo.submit_attempt(&submission).await.unwrap();
    assert_eq!(replayed, first);

    let retake = AttemptSubmission {
        submission_id: SubmissionId::random(),
        ..submission
    };
    let second = repo.submit_attempt(&retake).await.unwrap();
    assert_eq!(second.attempt_number, 2);
    assert_ne!(first.id, second.id);

    let listed = repo.list_attempts(practice.id(), student).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0], second);
    assert_eq!(listed[1], first);

    let other = repo
        .list_attempts(practice.id(), StudentId::random())
        .await
        .unwrap();
    assert!(other.is_empty());
}

#[tokio::test]
async fn sqlite_submit_unknown_practice_is_not_found() {
    let repo = connect("memdb_unknown").await;
    let submission = AttemptSubmission {
        submission_id: SubmissionId::random(),
        practice_id: PracticeId::new(9),
        student_id: StudentId::random(),
        sheet: AnswerSheet::new(),
        time_spent_secs: 0,
        completed_at: fixed_now(),
    };
    let err = repo.submit_attempt(&submission).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}
