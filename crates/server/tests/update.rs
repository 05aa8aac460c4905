mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use common::{MemoryStore, image, question, seed_exam, settings, setup_db, store};
use exambank_api_types::{OptionPayload, QuestionFields};
use exambank_core::domain::{PageRequest, QuestionId};
use exambank_server::repository::{ElementRepository, QuestionRecord, QuestionRepository};
use exambank_server::service::{
    CreateGroupCommand, ExamCompositionService, ExamHierarchyReader, ServiceError,
    TransactionRunner, UpdateQuestionCommand,
};
use sea_orm::DatabaseConnection;

struct Fixture {
    db: DatabaseConnection,
    files: Arc<MemoryStore>,
    composition: ExamCompositionService,
    question: QuestionRecord,
}

/// One question carrying two image attachments.
async fn fixture() -> Fixture {
    let db = setup_db().await;
    let scopes = seed_exam(&db, "Mock 1", &["Reading"]).await;
    let scope = &scopes[0];
    let files = store();
    let composition =
        ExamCompositionService::new(TransactionRunner::new(db.clone(), settings()), files.clone());

    let group = composition
        .create_question_group(
            scope.part_id,
            scope.exam_id,
            CreateGroupCommand {
                questions: vec![question("Q1")],
                question_files: BTreeMap::from([(0, vec![image("a.png"), image("b.png")])]),
                ..CreateGroupCommand::default()
            },
        )
        .await
        .expect("group");
    let question = QuestionRepository::new(&db)
        .list_for_groups(&[group.id])
        .await
        .expect("questions")
        .remove(0);

    Fixture {
        db,
        files,
        composition,
        question,
    }
}

#[tokio::test]
async fn new_uploads_replace_existing_attachments() {
    let fx = fixture().await;
    let old_urls = fx.files.stored_urls();
    assert_eq!(old_urls.len(), 2);

    let updated = fx
        .composition
        .update_question(
            fx.question.id,
            UpdateQuestionCommand {
                files: vec![image("c.png")],
                ..UpdateQuestionCommand::default()
            },
        )
        .await
        .expect("update");

    assert_eq!(updated.elements.len(), 1);
    let stored = ElementRepository::new(&fx.db)
        .list_for_question(fx.question.id)
        .await
        .expect("elements");
    assert_eq!(stored.len(), 1);
    assert!(stored[0].url.ends_with("c.png"));

    let mut removed = fx.files.removed_urls();
    removed.sort();
    assert_eq!(removed, old_urls);
}

#[tokio::test]
async fn fields_are_updated_and_attachments_kept_without_uploads() {
    let fx = fixture().await;

    let updated = fx
        .composition
        .update_question(
            fx.question.id,
            UpdateQuestionCommand {
                fields: QuestionFields {
                    title: Some("Q1 revised".to_string()),
                    option: Some(OptionPayload::Encoded(r#"{"A":"one","C":"three"}"#.to_string())),
                    correct_option: Some("C".to_string()),
                    score: Some("2.5".to_string()),
                    ..QuestionFields::default()
                },
                files: Vec::new(),
            },
        )
        .await
        .expect("update");

    assert_eq!(updated.question.title, "Q1 revised");
    assert_eq!(updated.question.correct_option, "C");
    assert_eq!(updated.question.score.value(), 2.5);
    assert_eq!(
        updated.question.options.labels().collect::<Vec<_>>(),
        vec!["A", "C"]
    );
    assert_eq!(updated.question.order, fx.question.order);
    assert_eq!(updated.question.global_order, fx.question.global_order);
    assert_eq!(updated.elements.len(), 2);
    assert!(fx.files.removed_urls().is_empty());
}

#[tokio::test]
async fn malformed_option_mutates_nothing() {
    let fx = fixture().await;

    let err = fx
        .composition
        .update_question(
            fx.question.id,
            UpdateQuestionCommand {
                fields: QuestionFields {
                    title: Some("Changed".to_string()),
                    option: Some(OptionPayload::Encoded("{bad json".to_string())),
                    ..QuestionFields::default()
                },
                files: vec![image("c.png")],
            },
        )
        .await
        .expect_err("option is malformed");

    assert!(matches!(err, ServiceError::Validation(ref m) if m == "Invalid options format"));
    let stored = QuestionRepository::new(&fx.db)
        .find_by_id(fx.question.id)
        .await
        .expect("lookup")
        .expect("question still exists");
    assert_eq!(stored.title, "Q1");
    assert_eq!(stored.options, fx.question.options);
    let elements = ElementRepository::new(&fx.db)
        .list_for_question(fx.question.id)
        .await
        .expect("elements");
    assert_eq!(elements.len(), 2);
    assert_eq!(fx.files.stored_urls().len(), 2);
}

#[tokio::test]
async fn unknown_question_is_not_found() {
    let fx = fixture().await;

    let err = fx
        .composition
        .update_question(QuestionId::new(404), UpdateQuestionCommand::default())
        .await
        .expect_err("no such question");
    assert!(matches!(err, ServiceError::NotFound(ref m) if m == "Question not found"));

    let err = fx
        .composition
        .delete_question(QuestionId::new(404))
        .await
        .expect_err("no such question");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn deleted_question_disappears_from_reads() {
    let fx = fixture().await;

    let deleted = fx
        .composition
        .delete_question(fx.question.id)
        .await
        .expect("delete");
    assert!(deleted.question.deleted_at.is_some());
    assert_eq!(deleted.elements.len(), 2);

    let page = ExamHierarchyReader::new(fx.db.clone())
        .questions_by_part_and_exam(
            fx.question.exam_id,
            fx.question.part_id,
            PageRequest::default(),
        )
        .await
        .expect("page");
    assert_eq!(page.total, 0);
    assert!(page.data.is_empty());
}
