use std::collections::BTreeMap;
use std::sync::Arc;

use exambank_api_types::QuestionFields;
use exambank_core::domain::{ElementKind, ElementOwner, ExamId, PartId, QuestionId};
use sea_orm::DatabaseConnection;
use tracing::{info, warn};

use super::error::{Result, ServiceError};
use super::transaction::TransactionRunner;
use super::validation::{
    QuestionDraft, classify_uploads, parse_options, validate_new_questions, validate_patch,
};
use crate::repository::{
    DEFAULT_TYPE_GROUP, ElementRecord, ElementRepository, ExamRepository, GroupRecord, NewElement,
    NewGroup, NewQuestion, OrderingAllocator, PartRepository, QuestionGroupRepository,
    QuestionRecord, QuestionRepository, QuestionUpdate,
};
use crate::storage::{AttachmentStore, UploadDir, UploadedFile};

/// A group with its questions and uploads, as received from the create form.
#[derive(Debug, Clone, Default)]
pub struct CreateGroupCommand {
    pub title: Option<String>,
    pub description: Option<String>,
    pub type_group: Option<i32>,
    pub questions: Vec<QuestionFields>,
    pub group_files: Vec<UploadedFile>,
    /// Uploads keyed by the index of the question they belong to.
    pub question_files: BTreeMap<usize, Vec<UploadedFile>>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateQuestionCommand {
    pub fields: QuestionFields,
    pub files: Vec<UploadedFile>,
}

/// A question with the attachments it owns after a write.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionWithAttachments {
    pub question: QuestionRecord,
    pub elements: Vec<ElementRecord>,
}

#[derive(Debug, Clone)]
struct SavedUpload {
    kind: ElementKind,
    url: String,
}

struct GroupPlan {
    part_id: PartId,
    exam_id: ExamId,
    title: Option<String>,
    description: Option<String>,
    type_group: i32,
    drafts: Vec<QuestionDraft>,
    group_uploads: Vec<SavedUpload>,
    question_uploads: BTreeMap<usize, Vec<SavedUpload>>,
}

/// Write path of the exam hierarchy: groups, questions and their attachments.
#[derive(Clone)]
pub struct ExamCompositionService {
    db: DatabaseConnection,
    store: Arc<dyn AttachmentStore>,
    runner: TransactionRunner,
}

impl ExamCompositionService {
    pub fn new(runner: TransactionRunner, store: Arc<dyn AttachmentStore>) -> Self {
        Self {
            db: runner.connection().clone(),
            store,
            runner,
        }
    }

    /// Creates a group, its questions and every attachment in one transaction.
    pub async fn create_question_group(
        &self,
        part_id: PartId,
        exam_id: ExamId,
        command: CreateGroupCommand,
    ) -> Result<GroupRecord> {
        let drafts = validate_new_questions(command.questions)?;
        let group_kinds = classify_uploads(&command.group_files)?;
        let mut question_kinds = BTreeMap::new();
        for (index, files) in &command.question_files {
            if *index >= drafts.len() {
                return Err(ServiceError::validation(format!(
                    "Attachments reference unknown question {index}"
                )));
            }
            question_kinds.insert(*index, classify_uploads(files)?);
        }

        let part = PartRepository::new(&self.db).find_by_id(part_id).await?;
        let exam = ExamRepository::new(&self.db).find_by_id(exam_id).await?;
        let (Some(part), Some(exam)) = (part, exam) else {
            return Err(ServiceError::not_found("Part or Exam not found"));
        };

        let dir = UploadDir::new(&exam.name, &part.name);
        let mut saved_urls = Vec::new();
        let uploads = self
            .save_group_uploads(
                &dir,
                (command.group_files.as_slice(), group_kinds.as_slice()),
                (&command.question_files, &question_kinds),
                &mut saved_urls,
            )
            .await;
        let (group_uploads, question_uploads) = match uploads {
            Ok(uploads) => uploads,
            Err(err) => {
                self.discard_uploads(&saved_urls).await;
                return Err(err);
            }
        };

        let plan = Arc::new(GroupPlan {
            part_id,
            exam_id,
            title: command.title,
            description: command.description,
            type_group: command.type_group.unwrap_or(DEFAULT_TYPE_GROUP),
            drafts,
            group_uploads,
            question_uploads,
        });

        let result = self
            .runner
            .run(move |txn| {
                let plan = Arc::clone(&plan);
                Box::pin(async move {
                    ExamRepository::new(txn)
                        .ensure_link(plan.exam_id, plan.part_id)
                        .await?;

                    let allocator = OrderingAllocator::new(txn);
                    let group_order = allocator.group_order(plan.part_id, plan.exam_id).await?;
                    let group = QuestionGroupRepository::new(txn)
                        .create(NewGroup {
                            part_id: plan.part_id,
                            exam_id: plan.exam_id,
                            order: group_order.peek(),
                            type_group: plan.type_group,
                            title: plan.title.clone(),
                            description: plan.description.clone(),
                        })
                        .await?;

                    let elements = ElementRepository::new(txn);
                    elements
                        .create_many(new_elements(
                            &plan.group_uploads,
                            ElementOwner::Group(group.id),
                        ))
                        .await?;

                    let mut global_order = allocator.global_order(plan.exam_id).await?;
                    let mut order = allocator.question_order(plan.part_id, plan.exam_id).await?;
                    let questions = QuestionRepository::new(txn);

                    for (index, draft) in plan.drafts.iter().enumerate() {
                        let options = parse_options(&draft.option)?;
                        let question = questions
                            .create(NewQuestion {
                                group_id: group.id,
                                exam_id: plan.exam_id,
                                part_id: plan.part_id,
                                title: draft.title.clone(),
                                description: draft.description.clone(),
                                options,
                                correct_option: draft.correct_option.clone(),
                                score: draft.score,
                                order: order.advance(),
                                global_order: global_order.advance(),
                            })
                            .await?;

                        if let Some(uploads) = plan.question_uploads.get(&index) {
                            elements
                                .create_many(new_elements(
                                    uploads,
                                    ElementOwner::Question(question.id),
                                ))
                                .await?;
                        }
                    }

                    Ok::<_, ServiceError>(group)
                })
            })
            .await;

        match result {
            Ok(group) => {
                info!(
                    group_id = %group.id,
                    part_id = %part_id,
                    exam_id = %exam_id,
                    order = group.order,
                    "question group created"
                );
                Ok(group)
            }
            Err(err) => {
                self.discard_uploads(&saved_urls).await;
                Err(err)
            }
        }
    }

    /// Applies the given fields. New uploads replace every attachment the
    /// question had.
    pub async fn update_question(
        &self,
        question_id: QuestionId,
        command: UpdateQuestionCommand,
    ) -> Result<QuestionWithAttachments> {
        let patch = Arc::new(validate_patch(command.fields)?);
        let kinds = classify_uploads(&command.files)?;

        let existing = QuestionRepository::new(&self.db)
            .find_by_id(question_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Question not found"))?;

        let mut saved_urls = Vec::new();
        let uploads = if command.files.is_empty() {
            Vec::new()
        } else {
            let dir = self.upload_dir_for(&existing).await?;
            let saved = self
                .save_uploads(&dir, &command.files, &kinds, &mut saved_urls)
                .await;
            match saved {
                Ok(saved) => saved,
                Err(err) => {
                    self.discard_uploads(&saved_urls).await;
                    return Err(err);
                }
            }
        };
        let uploads = Arc::new(uploads);

        let result = self
            .runner
            .run(move |txn| {
                let patch = Arc::clone(&patch);
                let uploads = Arc::clone(&uploads);
                Box::pin(async move {
                    let questions = QuestionRepository::new(txn);
                    if questions.find_by_id(question_id).await?.is_none() {
                        return Err(ServiceError::not_found("Question not found"));
                    }

                    let options = patch.option.as_ref().map(parse_options).transpose()?;
                    let question = questions
                        .update(
                            question_id,
                            QuestionUpdate {
                                title: patch.title.clone(),
                                description: patch.description.clone(),
                                options,
                                correct_option: patch.correct_option.clone(),
                                score: patch.score,
                            },
                        )
                        .await?
                        .ok_or_else(|| ServiceError::not_found("Question not found"))?;

                    let elements = ElementRepository::new(txn);
                    let mut replaced = Vec::new();
                    if !uploads.is_empty() {
                        replaced = elements.list_for_question(question_id).await?;
                        elements.delete_for_question(question_id).await?;
                        elements
                            .create_many(new_elements(
                                &uploads,
                                ElementOwner::Question(question_id),
                            ))
                            .await?;
                    }
                    let current = elements.list_for_question(question_id).await?;

                    let updated = QuestionWithAttachments {
                        question,
                        elements: current,
                    };
                    Ok::<_, ServiceError>((updated, replaced))
                })
            })
            .await;

        match result {
            Ok((updated, replaced)) => {
                for element in replaced.iter().filter(|element| !element.cloud) {
                    if let Err(err) = self.store.remove(&element.url).await {
                        warn!(
                            url = %element.url,
                            error = %err,
                            "failed to remove replaced attachment file"
                        );
                    }
                }
                info!(
                    question_id = %question_id,
                    replaced = replaced.len(),
                    attachments = updated.elements.len(),
                    "question updated"
                );
                Ok(updated)
            }
            Err(err) => {
                self.discard_uploads(&saved_urls).await;
                Err(err)
            }
        }
    }

    /// Stamps `deleted_at`. Attachments stay in place.
    pub async fn delete_question(
        &self,
        question_id: QuestionId,
    ) -> Result<QuestionWithAttachments> {
        let question = QuestionRepository::new(&self.db)
            .soft_delete(question_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Question not found"))?;
        let elements = ElementRepository::new(&self.db)
            .list_for_question(question_id)
            .await?;

        info!(question_id = %question_id, "question soft-deleted");
        Ok(QuestionWithAttachments { question, elements })
    }

    async fn upload_dir_for(&self, question: &QuestionRecord) -> Result<UploadDir> {
        let exam = ExamRepository::new(&self.db)
            .find_by_id(question.exam_id)
            .await?;
        let part = PartRepository::new(&self.db)
            .find_many(&[question.part_id])
            .await?;
        let exam_name = exam.map_or_else(|| question.exam_id.to_string(), |exam| exam.name);
        let part_name = part
            .into_iter()
            .next()
            .map_or_else(|| question.part_id.to_string(), |part| part.name);

        Ok(UploadDir::new(&exam_name, &part_name))
    }

    async fn save_group_uploads(
        &self,
        dir: &UploadDir,
        (group_files, group_kinds): (&[UploadedFile], &[ElementKind]),
        (question_files, question_kinds): (
            &BTreeMap<usize, Vec<UploadedFile>>,
            &BTreeMap<usize, Vec<ElementKind>>,
        ),
        saved_urls: &mut Vec<String>,
    ) -> Result<(Vec<SavedUpload>, BTreeMap<usize, Vec<SavedUpload>>)> {
        let group_uploads = self
            .save_uploads(dir, group_files, group_kinds, saved_urls)
            .await?;

        let mut question_uploads = BTreeMap::new();
        for (index, files) in question_files {
            let kinds = question_kinds.get(index).map(Vec::as_slice).unwrap_or(&[]);
            let saved = self.save_uploads(dir, files, kinds, saved_urls).await?;
            question_uploads.insert(*index, saved);
        }

        Ok((group_uploads, question_uploads))
    }

    async fn save_uploads(
        &self,
        dir: &UploadDir,
        files: &[UploadedFile],
        kinds: &[ElementKind],
        saved_urls: &mut Vec<String>,
    ) -> Result<Vec<SavedUpload>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        self.store.prepare_dir(dir).await?;
        let mut saved = Vec::with_capacity(files.len());
        for (file, kind) in files.iter().zip(kinds) {
            let stored = self.store.save(dir, file).await?;
            saved_urls.push(stored.url.clone());
            saved.push(SavedUpload {
                kind: *kind,
                url: stored.url,
            });
        }
        Ok(saved)
    }

    async fn discard_uploads(&self, urls: &[String]) {
        for url in urls {
            if let Err(err) = self.store.remove(url).await {
                warn!(url = %url, error = %err, "failed to remove orphaned upload");
            }
        }
    }
}

fn new_elements(uploads: &[SavedUpload], owner: ElementOwner) -> Vec<NewElement> {
    uploads
        .iter()
        .map(|upload| NewElement {
            kind: upload.kind,
            url: upload.url.clone(),
            owner,
            cloud: false,
        })
        .collect()
}
