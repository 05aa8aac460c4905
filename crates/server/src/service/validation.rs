//! Field checks applied before any transaction is opened.

use exambank_api_types::{FieldError, OptionPayload, QuestionFields};
use exambank_core::domain::{
    ANSWER_LABELS, DomainError, ElementKind, QuestionOptions, Score, is_answer_label,
};

use super::error::{Result, ServiceError};
use crate::storage::UploadedFile;

/// A question of a create request whose scalar fields passed validation.
/// Its options are parsed later, inside the transaction that stores it.
#[derive(Debug, Clone)]
pub struct QuestionDraft {
    pub title: String,
    pub description: Option<String>,
    pub option: OptionPayload,
    pub correct_option: String,
    pub score: Score,
}

/// Fields of an update request; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct QuestionPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub option: Option<OptionPayload>,
    pub correct_option: Option<String>,
    pub score: Option<Score>,
}

pub fn parse_options(payload: &OptionPayload) -> std::result::Result<QuestionOptions, DomainError> {
    match payload {
        OptionPayload::Map(choices) => QuestionOptions::from_map(choices.clone()),
        OptionPayload::Encoded(raw) => QuestionOptions::parse_json(raw),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn correct_option_message() -> String {
    format!("Correct option must be one of {}", ANSWER_LABELS.join(", "))
}

pub fn validate_new_questions(questions: Vec<QuestionFields>) -> Result<Vec<QuestionDraft>> {
    if questions.is_empty() {
        return Err(ServiceError::InvalidFields(vec![FieldError::new(
            "questions",
            "At least one question is required",
        )]));
    }

    let mut errors = Vec::new();
    let mut drafts = Vec::with_capacity(questions.len());

    for (index, fields) in questions.into_iter().enumerate() {
        let field = |name: &str| format!("questions[{index}].{name}");

        let title = non_blank(fields.title);
        if title.is_none() {
            errors.push(FieldError::new(field("title"), "Title is required"));
        }

        if fields.option.is_none() {
            errors.push(FieldError::new(field("option"), "Options are required"));
        }

        let correct_option = non_blank(fields.correct_option).filter(|c| is_answer_label(c));
        if correct_option.is_none() {
            errors.push(FieldError::new(field("correct_option"), correct_option_message()));
        }

        let score = match non_blank(fields.score) {
            Some(raw) => Score::parse(&raw).ok(),
            None => None,
        };
        if score.is_none() {
            errors.push(FieldError::new(
                field("score"),
                "Score must be a positive number",
            ));
        }

        if let (Some(title), Some(option), Some(correct_option), Some(score)) =
            (title, fields.option, correct_option, score)
        {
            drafts.push(QuestionDraft {
                title,
                description: non_blank(fields.description),
                option,
                correct_option,
                score,
            });
        }
    }

    if errors.is_empty() {
        Ok(drafts)
    } else {
        Err(ServiceError::InvalidFields(errors))
    }
}

pub fn validate_patch(fields: QuestionFields) -> Result<QuestionPatch> {
    let mut errors = Vec::new();

    let title = match fields.title {
        Some(raw) => {
            let title = non_blank(Some(raw));
            if title.is_none() {
                errors.push(FieldError::new("title", "Title must not be empty"));
            }
            title
        }
        None => None,
    };

    let correct_option = match non_blank(fields.correct_option) {
        Some(label) if is_answer_label(&label) => Some(label),
        Some(_) => {
            errors.push(FieldError::new("correct_option", correct_option_message()));
            None
        }
        None => None,
    };

    let score = match non_blank(fields.score) {
        Some(raw) => match Score::parse(&raw) {
            Ok(score) => Some(score),
            Err(_) => {
                errors.push(FieldError::new("score", "Score must be a positive number"));
                None
            }
        },
        None => None,
    };

    if !errors.is_empty() {
        return Err(ServiceError::InvalidFields(errors));
    }

    Ok(QuestionPatch {
        title,
        description: fields.description,
        option: fields.option,
        correct_option,
        score,
    })
}

/// Kind of every upload, or the first rejection.
pub fn classify_uploads(files: &[UploadedFile]) -> Result<Vec<ElementKind>> {
    files
        .iter()
        .map(|file| {
            ElementKind::classify_upload(&file.file_name, &file.content_type)
                .map_err(ServiceError::from)
        })
        .collect()
}
