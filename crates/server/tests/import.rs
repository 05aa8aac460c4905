mod common;

use common::{settings, setup_db};
use exambank_api_types::{ExamAndSubject, SheetRow, SpreadsheetFile, SpreadsheetUpload};
use exambank_core::domain::PageRequest;
use exambank_server::repository::{
    ExamRepository, NewPart, PartRepository, QuestionGroupRepository, SubjectRepository,
};
use exambank_server::service::{
    ExamHierarchyReader, ServiceError, SpreadsheetImporter, TransactionRunner,
};
use sea_orm::DatabaseConnection;

async fn seed_parts(db: &DatabaseConnection, names: &[&str]) {
    let parts = PartRepository::new(db);
    for name in names {
        parts
            .create(NewPart {
                name: name.to_string(),
                order: None,
            })
            .await
            .expect("part");
    }
}

fn row(part: &str, order: Option<i64>, question: &str) -> SheetRow {
    SheetRow {
        part: Some(part.to_string()),
        order,
        question: Some(question.to_string()),
        option_a: Some("a".to_string()),
        option_b: Some("b".to_string()),
        option_c: Some("c".to_string()),
        correct_option: Some("Option C".to_string()),
        ..SheetRow::default()
    }
}

fn upload(rows: Vec<SheetRow>) -> SpreadsheetUpload {
    SpreadsheetUpload {
        file: Some(SpreadsheetFile {
            detail_questions: rows,
            exam_and_subject: vec![ExamAndSubject {
                subject: Some("IELTS".to_string()),
                exam: Some("Mock 1".to_string()),
            }],
        }),
    }
}

fn importer(db: &DatabaseConnection) -> SpreadsheetImporter {
    SpreadsheetImporter::new(TransactionRunner::new(db.clone(), settings()))
}

#[tokio::test]
async fn rows_become_one_group_per_part() {
    let db = setup_db().await;
    seed_parts(&db, &["Listening", "Reading"]).await;

    let mut first = row("Listening", Some(2), "L2");
    first.element = Some("https://cdn.example.com/map.png".to_string());
    let mut second = row("Listening", Some(1), "L1");
    second.title_group = Some("Section 1".to_string());
    second.element_group = Some("https://cdn.example.com/section1.mp3".to_string());

    let summaries = importer(&db)
        .upload_from_spreadsheet(upload(vec![first, row("Reading", None, "R1"), second]))
        .await
        .expect("import");

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].part, "Listening");
    assert_eq!(summaries[0].questions_count, 2);
    assert_eq!(summaries[1].part, "Reading");

    let subject = SubjectRepository::new(&db)
        .find_by_name("IELTS")
        .await
        .expect("lookup")
        .expect("subject created");
    let exam = ExamRepository::new(&db)
        .find_by_name_in_subject("Mock 1", subject.id)
        .await
        .expect("lookup")
        .expect("exam created");
    let listening = PartRepository::new(&db)
        .find_by_name("Listening")
        .await
        .expect("lookup")
        .expect("part");

    let page = ExamHierarchyReader::new(db.clone())
        .questions_by_part_and_exam(exam.id, listening.id, PageRequest::default())
        .await
        .expect("page");
    let group = &page.data[0];
    assert_eq!(group.group.title.as_deref(), Some("Section 1"));
    assert_eq!(group.elements.len(), 1);
    assert_eq!(group.elements[0].kind, "audio");
    assert!(group.elements[0].cloud_id);
    let titles: Vec<&str> = group.questions.iter().map(|q| q.title.as_str()).collect();
    assert_eq!(titles, vec!["L1", "L2"]);
    assert!(group.questions.iter().all(|q| q.correct_option == "C"));
    assert!(group.questions.iter().all(|q| q.score == 1.0));
    assert!(group.questions[0].elements.is_empty());
    assert_eq!(group.questions[1].elements.len(), 1);
    assert_eq!(group.questions[1].elements[0].kind, "image");
}

#[tokio::test]
async fn importing_twice_reuses_subject_and_exam() {
    let db = setup_db().await;
    seed_parts(&db, &["Listening"]).await;
    let importer = importer(&db);

    importer
        .upload_from_spreadsheet(upload(vec![row("Listening", Some(1), "Q1")]))
        .await
        .expect("first import");
    importer
        .upload_from_spreadsheet(upload(vec![row("Listening", Some(1), "Q1")]))
        .await
        .expect("second import");

    let subject = SubjectRepository::new(&db)
        .find_by_name("IELTS")
        .await
        .expect("lookup")
        .expect("subject");
    let exam = ExamRepository::new(&db)
        .find_by_name_in_subject("Mock 1", subject.id)
        .await
        .expect("lookup")
        .expect("exam");
    assert_eq!(subject.id.into_inner(), 1);
    assert_eq!(exam.id.into_inner(), 1);

    let groups = QuestionGroupRepository::new(&db)
        .list_by_exam(exam.id)
        .await
        .expect("groups");
    let orders: Vec<i32> = groups.iter().map(|g| g.order).collect();
    assert_eq!(orders, vec![1, 2]);

    let listening = PartRepository::new(&db)
        .find_by_name("Listening")
        .await
        .expect("lookup")
        .expect("part");
    let page = ExamHierarchyReader::new(db.clone())
        .questions_by_part_and_exam(exam.id, listening.id, PageRequest::default())
        .await
        .expect("page");
    let orders: Vec<(i32, i32)> = page
        .data
        .iter()
        .flat_map(|g| g.questions.iter().map(|q| (q.order, q.global_order)))
        .collect();
    assert_eq!(orders, vec![(1, 1), (2, 2)]);
}

#[tokio::test]
async fn unknown_part_rolls_back_the_whole_import() {
    let db = setup_db().await;
    seed_parts(&db, &["Listening"]).await;

    let err = importer(&db)
        .upload_from_spreadsheet(upload(vec![
            row("Listening", Some(1), "Q1"),
            row("Speaking", Some(1), "S1"),
        ]))
        .await
        .expect_err("Speaking is not a part");

    assert!(matches!(err, ServiceError::Validation(ref m) if m == "Part \"Speaking\" not found"));
    let subject = SubjectRepository::new(&db)
        .find_by_name("IELTS")
        .await
        .expect("lookup");
    assert!(subject.is_none());
}

#[tokio::test]
async fn rows_without_a_correct_option_are_rejected() {
    let db = setup_db().await;
    seed_parts(&db, &["Listening"]).await;
    let mut broken = row("Listening", Some(1), "Q1");
    broken.correct_option = None;

    let err = importer(&db)
        .upload_from_spreadsheet(upload(vec![broken]))
        .await
        .expect_err("correct option required");

    assert_eq!(err.to_string(), "Missing correct option for question \"Q1\"");
}

#[tokio::test]
async fn missing_header_is_rejected() {
    let db = setup_db().await;

    let err = importer(&db)
        .upload_from_spreadsheet(SpreadsheetUpload {
            file: Some(SpreadsheetFile {
                detail_questions: vec![row("Listening", Some(1), "Q1")],
                exam_and_subject: Vec::new(),
            }),
        })
        .await
        .expect_err("header required");

    assert_eq!(
        err.to_string(),
        "Exam and Subject information is missing from the spreadsheet"
    );
}
