use exambank_api_types::{CreateExamRequest, CreatePartRequest, FieldError};
use exambank_core::domain::SubjectId;
use sea_orm::DatabaseConnection;
use tracing::info;

use super::error::{Result, ServiceError};
use super::transaction::TransactionRunner;
use crate::repository::{
    ExamRecord, ExamRepository, NewExam, NewPart, PartRecord, PartRepository, SubjectRepository,
};

/// Parts and exams. Creating either links it to every live counterpart.
#[derive(Clone)]
pub struct CatalogService {
    db: DatabaseConnection,
    runner: TransactionRunner,
}

impl CatalogService {
    pub fn new(runner: TransactionRunner) -> Self {
        Self {
            db: runner.connection().clone(),
            runner,
        }
    }

    pub async fn list_parts(&self) -> Result<Vec<PartRecord>> {
        Ok(PartRepository::new(&self.db).list().await?)
    }

    pub async fn create_part(&self, request: CreatePartRequest) -> Result<PartRecord> {
        let name = required_name(request.name)?;
        let order = request.order;
        // A racing create with the same name fails on `uq_part_name`; the
        // retry then sees the committed row here.
        let part = self
            .runner
            .run(move |txn| {
                let new_part = NewPart {
                    name: name.clone(),
                    order,
                };
                Box::pin(async move {
                    let parts = PartRepository::new(txn);
                    if parts.find_by_name(&new_part.name).await?.is_some() {
                        return Err(ServiceError::validation(format!(
                            "Part \"{}\" already exists",
                            new_part.name
                        )));
                    }
                    let part = parts.create(new_part).await?;
                    Ok::<_, ServiceError>(part)
                })
            })
            .await?;

        info!(part_id = %part.id, name = %part.name, order = part.order, "part created");
        Ok(part)
    }

    pub async fn create_exam(&self, request: CreateExamRequest) -> Result<ExamRecord> {
        let name = non_blank(request.name);
        let subject_id = request.subject_id.map(SubjectId::new);
        let (Some(name), Some(subject_id)) = (name.clone(), subject_id) else {
            let mut errors = Vec::new();
            if name.is_none() {
                errors.push(FieldError::new("name", "Name is required"));
            }
            if subject_id.is_none() {
                errors.push(FieldError::new("subject_id", "Subject is required"));
            }
            return Err(ServiceError::InvalidFields(errors));
        };

        SubjectRepository::new(&self.db)
            .find_by_id(subject_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Subject not found"))?;

        let exam = self
            .runner
            .run(move |txn| {
                let new_exam = NewExam {
                    subject_id,
                    name: name.clone(),
                };
                Box::pin(async move {
                    let exams = ExamRepository::new(txn);
                    if exams
                        .find_by_name_in_subject(&new_exam.name, new_exam.subject_id)
                        .await?
                        .is_some()
                    {
                        return Err(ServiceError::validation(format!(
                            "Exam \"{}\" already exists",
                            new_exam.name
                        )));
                    }
                    let exam = exams.create(new_exam).await?;
                    Ok::<_, ServiceError>(exam)
                })
            })
            .await?;

        info!(exam_id = %exam.id, subject_id = %exam.subject_id, "exam created");
        Ok(exam)
    }
}

fn non_blank(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

fn required_name(name: Option<String>) -> Result<String> {
    non_blank(name).ok_or_else(|| {
        ServiceError::InvalidFields(vec![FieldError::new("name", "Name is required")])
    })
}
