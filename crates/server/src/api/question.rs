//! Question bank routes.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use exambank_api_types::{
    CreateGroupResponse, GroupView, ImportResponse, PartSection, QuestionResponse, QuestionsPage,
    SpreadsheetUpload,
};
use exambank_core::domain::{
    DEFAULT_LIMIT, DEFAULT_PAGE, DomainError, ExamId, PageRequest, PartId, QuestionId,
};
use serde::Deserialize;
use tracing::info;

use super::error::ApiError;
use super::form::read_question_form;
use super::state::AppState;
use crate::service::{QuestionWithAttachments, ServiceError, question_view};

pub fn create_question_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/questions/getQuestionByPartAndExam",
            get(get_question_by_part_and_exam),
        )
        .route(
            "/api/questions/getAllQuestionOnExam/{exam_id}",
            get(get_all_question_on_exam),
        )
        .route("/api/questions/createQuestion", post(create_question))
        .route("/api/questions/uploadExcel", post(upload_excel))
        .route("/api/questions/update", put(update_question))
        .route("/api/questions/delete", delete(delete_question))
}

/// Query parameters are kept as raw text so that a missing id and a
/// malformed one produce different messages.
#[derive(Debug, Default, Deserialize)]
struct ScopeQuery {
    exam_id: Option<String>,
    part_id: Option<String>,
    page: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct QuestionQuery {
    question_id: Option<String>,
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_id<T: FromStr>(raw: &str, field: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid {field}.")))
}

impl ScopeQuery {
    fn scope(&self) -> Result<(ExamId, PartId), ApiError> {
        let (Some(exam_id), Some(part_id)) = (
            present(self.exam_id.as_deref()),
            present(self.part_id.as_deref()),
        ) else {
            return Err(ApiError::bad_request("Exam or part is required!"));
        };
        Ok((parse_id(exam_id, "exam_id")?, parse_id(part_id, "part_id")?))
    }

    fn page_request(&self) -> Result<PageRequest, ApiError> {
        let page = parse_count(self.page.as_deref(), DEFAULT_PAGE, DomainError::InvalidPage)?;
        let limit = parse_count(self.limit.as_deref(), DEFAULT_LIMIT, DomainError::InvalidLimit)?;
        Ok(PageRequest::new(page, limit).map_err(ServiceError::from)?)
    }
}

fn parse_count(raw: Option<&str>, default: u64, invalid: DomainError) -> Result<u64, ApiError> {
    match present(raw) {
        Some(value) => value
            .parse()
            .map_err(|_| ApiError::from(ServiceError::from(invalid))),
        None => Ok(default),
    }
}

impl QuestionQuery {
    fn question_id(&self) -> Result<QuestionId, ApiError> {
        let raw = present(self.question_id.as_deref())
            .ok_or_else(|| ApiError::bad_request("Question ID is required!"))?;
        parse_id(raw, "question_id")
    }
}

async fn get_question_by_part_and_exam(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<QuestionsPage>, ApiError> {
    let (exam_id, part_id) = query.scope()?;
    let request = query.page_request()?;

    let page = state
        .reader
        .questions_by_part_and_exam(exam_id, part_id, request)
        .await?;
    Ok(Json(page))
}

async fn get_all_question_on_exam(
    State(state): State<Arc<AppState>>,
    Path(exam_id): Path<String>,
) -> Result<Json<Vec<PartSection>>, ApiError> {
    let exam_id: ExamId = parse_id(exam_id.trim(), "exam_id")?;
    let sections = state.reader.all_questions_for_exam(exam_id).await?;
    Ok(Json(sections))
}

async fn create_question(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScopeQuery>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CreateGroupResponse>), ApiError> {
    let (exam_id, part_id) = query.scope()?;
    let command = read_question_form(multipart).await?.into_create_command()?;

    let group = state
        .composition
        .create_question_group(part_id, exam_id, command)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateGroupResponse {
            message: "Questions created successfully.".to_string(),
            new_group: GroupView::from(group),
        }),
    ))
}

async fn upload_excel(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SpreadsheetUpload>, JsonRejection>,
) -> Result<(StatusCode, Json<ImportResponse>), ApiError> {
    let Json(upload) = payload?;
    let results = state.importer.upload_from_spreadsheet(upload).await?;
    info!(parts = results.len(), "spreadsheet imported");

    Ok((
        StatusCode::CREATED,
        Json(ImportResponse {
            message: "Spreadsheet uploaded successfully".to_string(),
            results,
        }),
    ))
}

async fn update_question(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QuestionQuery>,
    multipart: Multipart,
) -> Result<Json<QuestionResponse>, ApiError> {
    let question_id = query.question_id()?;
    let command = read_question_form(multipart).await?.into_update_command();

    let updated = state
        .composition
        .update_question(question_id, command)
        .await?;
    Ok(Json(question_response("Question updated successfully", updated)))
}

async fn delete_question(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QuestionQuery>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let question_id = query.question_id()?;
    let deleted = state.composition.delete_question(question_id).await?;
    Ok(Json(question_response("Question deleted successfully", deleted)))
}

fn question_response(message: &str, written: QuestionWithAttachments) -> QuestionResponse {
    QuestionResponse {
        message: message.to_string(),
        question: question_view(written.question, written.elements, None),
    }
}
