//! Parts and exams.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use exambank_api_types::{
    CreateExamRequest, CreatePartRequest, ExamResponse, ExamView, PartResponse, PartView,
};

use super::error::ApiError;
use super::state::AppState;

pub fn create_catalog_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/parts", get(list_parts).post(create_part))
        .route("/api/exams", post(create_exam))
}

async fn list_parts(State(state): State<Arc<AppState>>) -> Result<Json<Vec<PartView>>, ApiError> {
    let parts = state.catalog.list_parts().await?;
    Ok(Json(parts.into_iter().map(PartView::from).collect()))
}

async fn create_part(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreatePartRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PartResponse>), ApiError> {
    let Json(request) = payload?;
    let part = state.catalog.create_part(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(PartResponse {
            message: "Part created successfully".to_string(),
            part: PartView::from(part),
        }),
    ))
}

async fn create_exam(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateExamRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ExamResponse>), ApiError> {
    let Json(request) = payload?;
    let exam = state.catalog.create_exam(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ExamResponse {
            message: "Exam created successfully".to_string(),
            exam: ExamView::from(exam),
        }),
    ))
}
