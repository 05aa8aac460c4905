//! Bulk authoring from a spreadsheet converted to JSON on the client.

use std::collections::BTreeMap;
use std::sync::Arc;

use exambank_api_types::{ImportSummary, SheetRow, SpreadsheetUpload};
use exambank_core::domain::{
    DomainError, ElementKind, ElementOwner, QuestionOptions, Score, answer_label_from_cell,
};
use tracing::{debug, info};

use super::error::{Result, ServiceError};
use super::transaction::TransactionRunner;
use crate::repository::{
    DEFAULT_TYPE_GROUP, ElementRepository, ExamRecord, ExamRepository, NewElement, NewExam,
    NewGroup, NewQuestion, OrderingAllocator, PartRepository, QuestionGroupRepository,
    QuestionRepository, SubjectRepository,
};

/// One spreadsheet row after validation.
#[derive(Debug, Clone)]
struct ImportRow {
    sort_key: i64,
    title: String,
    description: Option<String>,
    options: QuestionOptions,
    correct_option: String,
    element: Option<String>,
    group_title: Option<String>,
    group_description: Option<String>,
    group_element: Option<String>,
}

#[derive(Debug)]
struct ImportPlan {
    subject: String,
    exam: String,
    /// Rows keyed by part name.
    parts: BTreeMap<String, Vec<ImportRow>>,
}

/// Imports a whole spreadsheet in a single transaction: either every part is
/// stored or none is.
#[derive(Clone)]
pub struct SpreadsheetImporter {
    runner: TransactionRunner,
}

impl SpreadsheetImporter {
    pub fn new(runner: TransactionRunner) -> Self {
        Self { runner }
    }

    pub async fn upload_from_spreadsheet(
        &self,
        upload: SpreadsheetUpload,
    ) -> Result<Vec<ImportSummary>> {
        let plan = Arc::new(build_plan(upload)?);
        let (exam, summaries) = self
            .runner
            .run(move |txn| {
                let plan = Arc::clone(&plan);
                Box::pin(async move {
                    let subject = SubjectRepository::new(txn)
                        .resolve_or_create(&plan.subject)
                        .await?;

                    let exams = ExamRepository::new(txn);
                    let parts = PartRepository::new(txn);
                    let existing = exams
                        .find_by_name_in_subject(&plan.exam, subject.id)
                        .await?;
                    let exam = match existing {
                        Some(exam) => exam,
                        None => {
                            let exam = exams
                                .insert(NewExam {
                                    subject_id: subject.id,
                                    name: plan.exam.clone(),
                                })
                                .await?;
                            for name in plan.parts.keys() {
                                // Unknown names are reported by the per-part check below.
                                if let Some(part) = parts.find_by_name(name).await? {
                                    exams.ensure_link(exam.id, part.id).await?;
                                }
                            }
                            exam
                        }
                    };

                    let mut sequence = Vec::with_capacity(plan.parts.len());
                    for (name, rows) in &plan.parts {
                        let part = parts.find_by_name(name).await?.ok_or_else(|| {
                            ServiceError::validation(format!("Part \"{name}\" not found"))
                        })?;
                        let link = exams.ensure_link(exam.id, part.id).await?;
                        sequence.push((link.id, part, name, rows));
                    }
                    sequence.sort_by_key(|(link_id, ..)| *link_id);

                    let allocator = OrderingAllocator::new(txn);
                    let groups = QuestionGroupRepository::new(txn);
                    let questions = QuestionRepository::new(txn);
                    let elements = ElementRepository::new(txn);
                    let mut global_order = allocator.global_order(exam.id).await?;
                    let mut summaries = Vec::with_capacity(sequence.len());

                    for (_, part, name, rows) in sequence {
                        let mut rows: Vec<&ImportRow> = rows.iter().collect();
                        rows.sort_by_key(|row| row.sort_key);
                        let Some(first) = rows.first() else {
                            continue;
                        };

                        let group_order = allocator.group_order(part.id, exam.id).await?;
                        let group = groups
                            .create(NewGroup {
                                part_id: part.id,
                                exam_id: exam.id,
                                order: group_order.peek(),
                                type_group: DEFAULT_TYPE_GROUP,
                                title: first.group_title.clone(),
                                description: first.group_description.clone(),
                            })
                            .await?;

                        let mut order = allocator.question_order(part.id, exam.id).await?;
                        for (index, row) in rows.iter().enumerate() {
                            let question = questions
                                .create(NewQuestion {
                                    group_id: group.id,
                                    exam_id: exam.id,
                                    part_id: part.id,
                                    title: row.title.clone(),
                                    description: row.description.clone(),
                                    options: row.options.clone(),
                                    correct_option: row.correct_option.clone(),
                                    score: Score::IMPORT_DEFAULT,
                                    order: order.advance(),
                                    global_order: global_order.advance(),
                                })
                                .await?;

                            if let Some(url) = &row.element {
                                let owner = ElementOwner::Question(question.id);
                                elements.create(cloud_element(url, owner)).await?;
                            }
                            if index == 0 {
                                if let Some(url) = &row.group_element {
                                    let owner = ElementOwner::Group(group.id);
                                    elements.create(cloud_element(url, owner)).await?;
                                }
                            }
                        }

                        debug!(
                            part = %name,
                            group_id = %group.id,
                            rows = rows.len(),
                            "part imported"
                        );
                        summaries.push(ImportSummary {
                            part: name.clone(),
                            group_id: group.id.into_inner(),
                            questions_count: rows.len(),
                        });
                    }

                    Ok::<_, ServiceError>((exam, summaries))
                })
            })
            .await?;

        log_import(&exam, &summaries);
        Ok(summaries)
    }
}

fn log_import(exam: &ExamRecord, summaries: &[ImportSummary]) {
    let questions: usize = summaries.iter().map(|s| s.questions_count).sum();
    info!(
        exam_id = %exam.id,
        exam = %exam.name,
        parts = summaries.len(),
        questions,
        "spreadsheet imported"
    );
}

fn cloud_element(url: &str, owner: ElementOwner) -> NewElement {
    NewElement {
        kind: ElementKind::from_url(url),
        url: url.to_string(),
        owner,
        cloud: true,
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Checks the whole payload before anything is written.
fn build_plan(upload: SpreadsheetUpload) -> Result<ImportPlan> {
    let file = upload
        .file
        .ok_or_else(|| ServiceError::validation("Spreadsheet data is required!"))?;

    let header = file.exam_and_subject.first().ok_or_else(|| {
        ServiceError::validation("Exam and Subject information is missing from the spreadsheet")
    })?;
    let (Some(subject), Some(exam)) = (present(&header.subject), present(&header.exam)) else {
        return Err(ServiceError::validation(
            "Subject or Exam name is missing from the spreadsheet",
        ));
    };

    let mut parts: BTreeMap<String, Vec<ImportRow>> = BTreeMap::new();
    for sheet_row in file.detail_questions {
        let part = present(&sheet_row.part).ok_or_else(|| {
            ServiceError::validation("Part information is missing from the spreadsheet")
        })?;
        let row = import_row(sheet_row)?;
        parts.entry(part).or_default().push(row);
    }

    if parts.is_empty() {
        return Err(ServiceError::validation("The spreadsheet contains no questions"));
    }

    Ok(ImportPlan {
        subject,
        exam,
        parts,
    })
}

fn import_row(row: SheetRow) -> Result<ImportRow> {
    let title = present(&row.question)
        .ok_or_else(|| ServiceError::validation("Question text is missing from the spreadsheet"))?;

    let correct_option = row
        .correct_option
        .as_deref()
        .and_then(answer_label_from_cell)
        .ok_or_else(|| DomainError::MissingCorrectOption(title.clone()))?;

    let choices: BTreeMap<String, String> = [
        ("A", &row.option_a),
        ("B", &row.option_b),
        ("C", &row.option_c),
        ("D", &row.option_d),
    ]
    .into_iter()
    .filter_map(|(label, text)| text.clone().map(|text| (label.to_string(), text)))
    .collect();
    let options = QuestionOptions::from_map(choices)?;

    Ok(ImportRow {
        sort_key: row.order.unwrap_or(i64::MAX),
        title,
        description: present(&row.description),
        options,
        correct_option,
        element: present(&row.element),
        group_title: present(&row.title_group),
        group_description: present(&row.description_group),
        group_element: present(&row.element_group),
    })
}

#[cfg(test)]
mod tests {
    use exambank_api_types::{ExamAndSubject, SpreadsheetFile};

    use super::*;

    fn row(part: &str, order: i64, question: &str) -> SheetRow {
        SheetRow {
            part: Some(part.to_string()),
            order: Some(order),
            question: Some(question.to_string()),
            option_a: Some("a".to_string()),
            option_b: Some("b".to_string()),
            correct_option: Some("Option B".to_string()),
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

    #[test]
    fn rows_are_grouped_by_part() {
        let plan = build_plan(upload(vec![
            row("Listening", 2, "L2"),
            row("Reading", 1, "R1"),
            row("Listening", 1, "L1"),
        ]))
        .expect("valid sheet");

        assert_eq!(plan.subject, "IELTS");
        assert_eq!(plan.parts.len(), 2);
        let listening = &plan.parts["Listening"];
        assert_eq!(listening.len(), 2);
        assert_eq!(listening[0].correct_option, "B");
        assert_eq!(listening[0].options.labels().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn missing_part_is_rejected() {
        let mut orphan = row("Listening", 1, "Q");
        orphan.part = None;

        let err = build_plan(upload(vec![orphan])).expect_err("part required");
        assert_eq!(err.to_string(), "Part information is missing from the spreadsheet");
    }

    #[test]
    fn missing_header_names_are_rejected() {
        let mut sheet = upload(vec![row("Listening", 1, "Q")]);
        if let Some(file) = sheet.file.as_mut() {
            file.exam_and_subject[0].exam = Some("  ".to_string());
        }

        assert!(matches!(build_plan(sheet), Err(ServiceError::Validation(_))));
        assert!(matches!(
            build_plan(SpreadsheetUpload { file: None }),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn missing_answer_names_the_question() {
        let mut unanswered = row("Listening", 1, "Where is Tom?");
        unanswered.correct_option = Some("Option ".to_string());

        let err = build_plan(upload(vec![unanswered])).expect_err("answer required");
        assert_eq!(err.to_string(), "Missing correct option for question \"Where is Tom?\"");
    }
}
