//! Shared request/response types used by API-facing crates.

mod de;
mod import;
mod question;

use serde::{Deserialize, Serialize};

pub use import::{
    ExamAndSubject, ImportResponse, ImportSummary, SheetRow, SpreadsheetFile, SpreadsheetUpload,
};
pub use question::{
    CreateGroupResponse, ElementView, GroupView, GroupWithQuestions, OptionPayload, PartSection,
    QuestionFields, QuestionResponse, QuestionView, QuestionsPage,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
}

impl HealthCheckResponse {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Error envelope: `{"error": "..."}` or `{"error": [{"field": .., "message": ..}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

impl ErrorResponse {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail::Message(message.into()),
        }
    }

    pub fn fields(fields: Vec<FieldError>) -> Self {
        Self {
            error: ErrorDetail::Fields(fields),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Fields(Vec<FieldError>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePartRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartView {
    pub id: i32,
    pub name: String,
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartResponse {
    pub message: String,
    pub part: PartView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateExamRequest {
    #[serde(default)]
    pub subject_id: Option<i32>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamView {
    pub id: i32,
    pub subject_id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamResponse {
    pub message: String,
    pub exam: ExamView,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_check_ok_payload() {
        let response = HealthCheckResponse::ok();
        assert_eq!(response.status, "ok");
    }

    #[test]
    fn plain_error_serialises_as_string() {
        let json = serde_json::to_value(ErrorResponse::message("Exam or part is required!"))
            .expect("serialize error response");

        assert_eq!(json, serde_json::json!({"error": "Exam or part is required!"}));
    }

    #[test]
    fn field_errors_serialise_as_list() {
        let response = ErrorResponse::fields(vec![FieldError::new(
            "questions[0][title]",
            "Question 0 must have a title.",
        )]);

        let json = serde_json::to_value(&response).expect("serialize error response");
        assert_eq!(
            json,
            serde_json::json!({"error": [{"field": "questions[0][title]", "message": "Question 0 must have a title."}]})
        );

        let decoded: ErrorResponse = serde_json::from_value(json).expect("deserialize");
        assert_eq!(decoded, response);
    }
}
