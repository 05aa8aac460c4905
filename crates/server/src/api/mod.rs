//! HTTP routes.
//!
//! Question bank authoring and reading, part/exam catalog and the static
//! attachment directory.

mod catalog;
mod error;
pub mod form;
mod question;
pub mod state;

use std::sync::Arc;

use axum::{Json, Router, extract::DefaultBodyLimit, routing::get};
use exambank_api_types::HealthCheckResponse;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub use catalog::create_catalog_router;
pub use error::ApiError;
pub use question::create_question_router;
pub use state::AppState;

use crate::config::ServerConfig;

/// Builds the full application router.
pub fn create_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .merge(create_question_router())
        .merge(create_catalog_router())
        .nest_service(
            config.public_upload_prefix.trim_end_matches('/'),
            ServeDir::new(&config.upload_root),
        )
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse::ok())
}
