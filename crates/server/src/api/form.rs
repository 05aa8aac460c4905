//! Multipart forms of the question create and update endpoints.
//!
//! Questions arrive either as one JSON `questions` field or as bracketed
//! fields such as `questions[0][title]` and `questions[0][option][A]`. Files
//! named `elements` belong to the group, files named `questions[i][elements]`
//! to question `i`.

use std::collections::BTreeMap;

use axum::extract::Multipart;
use axum::extract::multipart::Field;
use exambank_api_types::{OptionPayload, QuestionFields};

use super::error::ApiError;
use crate::service::{CreateGroupCommand, UpdateQuestionCommand};
use crate::storage::UploadedFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKey {
    Title,
    Description,
    Option,
    OptionLabel(String),
    CorrectOption,
    Score,
    Elements,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormKey {
    /// A field of the question at `index`.
    Question { index: usize, key: QuestionKey },
    /// `questions` carrying a JSON array.
    Questions,
    /// A top-level field, e.g. `title` or `option[A]`.
    Top(QuestionKey),
    TypeGroup,
    Other(String),
}

fn question_key(segments: &[&str]) -> Option<QuestionKey> {
    match segments {
        ["title"] => Some(QuestionKey::Title),
        ["description"] => Some(QuestionKey::Description),
        ["option"] => Some(QuestionKey::Option),
        ["option", label] if !label.is_empty() => Some(QuestionKey::OptionLabel(label.to_string())),
        ["correct_option"] => Some(QuestionKey::CorrectOption),
        ["score"] => Some(QuestionKey::Score),
        ["elements", ..] => Some(QuestionKey::Elements),
        _ => None,
    }
}

/// Splits `a[b][c]` into `["a", "b", "c"]`.
fn segments(name: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let (head, mut rest) = match name.find('[') {
        Some(pos) => (&name[..pos], &name[pos..]),
        None => (name, ""),
    };
    parts.push(head);
    while let Some(stripped) = rest.strip_prefix('[') {
        let Some(end) = stripped.find(']') else {
            break;
        };
        parts.push(&stripped[..end]);
        rest = &stripped[end + 1..];
    }
    parts
}

pub fn parse_key(name: &str) -> FormKey {
    let parts = segments(name.trim());
    match parts.as_slice() {
        ["questions"] => FormKey::Questions,
        ["questions", index, rest @ ..] => match (index.parse::<usize>(), question_key(rest)) {
            (Ok(index), Some(key)) => FormKey::Question { index, key },
            _ => FormKey::Other(name.to_string()),
        },
        ["type_group"] => FormKey::TypeGroup,
        rest => match question_key(rest) {
            Some(key) => FormKey::Top(key),
            None => FormKey::Other(name.to_string()),
        },
    }
}

/// Everything a question form may carry, before it is split into the
/// create or update command.
#[derive(Debug, Default)]
pub struct QuestionForm {
    top: QuestionFields,
    type_group: Option<String>,
    questions: BTreeMap<usize, QuestionFields>,
    group_files: Vec<UploadedFile>,
    question_files: BTreeMap<usize, Vec<UploadedFile>>,
}

fn set_field(fields: &mut QuestionFields, key: QuestionKey, value: String) {
    match key {
        QuestionKey::Title => fields.title = Some(value),
        QuestionKey::Description => fields.description = Some(value),
        QuestionKey::Option => fields.option = Some(OptionPayload::Encoded(value)),
        QuestionKey::OptionLabel(label) => {
            let mut choices = match fields.option.take() {
                Some(OptionPayload::Map(choices)) => choices,
                _ => BTreeMap::new(),
            };
            choices.insert(label, value);
            fields.option = Some(OptionPayload::Map(choices));
        }
        QuestionKey::CorrectOption => fields.correct_option = Some(value),
        QuestionKey::Score => fields.score = Some(value),
        QuestionKey::Elements => {}
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl QuestionForm {
    pub fn apply_text(&mut self, name: &str, value: String) -> Result<(), ApiError> {
        match parse_key(name) {
            FormKey::Questions => {
                let questions: Vec<QuestionFields> = serde_json::from_str(&value)
                    .map_err(|_| ApiError::bad_request("Invalid questions format"))?;
                for (index, question) in questions.into_iter().enumerate() {
                    self.questions.insert(index, question);
                }
            }
            FormKey::Question { index, key } => {
                set_field(self.questions.entry(index).or_default(), key, value);
            }
            FormKey::Top(key) => set_field(&mut self.top, key, value),
            FormKey::TypeGroup => self.type_group = Some(value),
            FormKey::Other(_) => {}
        }
        Ok(())
    }

    pub fn apply_file(&mut self, name: &str, file: UploadedFile) {
        match parse_key(name) {
            FormKey::Question {
                index,
                key: QuestionKey::Elements,
            } => self.question_files.entry(index).or_default().push(file),
            _ => self.group_files.push(file),
        }
    }

    pub fn into_create_command(self) -> Result<CreateGroupCommand, ApiError> {
        let type_group = match non_empty(self.type_group) {
            Some(raw) => Some(
                raw.trim()
                    .parse::<i32>()
                    .map_err(|_| ApiError::bad_request("type_group must be an integer"))?,
            ),
            None => None,
        };

        // Bracket indices may have gaps; attachments follow their question.
        let mut positions = BTreeMap::new();
        let mut questions = Vec::with_capacity(self.questions.len());
        for (position, (index, fields)) in self.questions.into_iter().enumerate() {
            positions.insert(index, position);
            questions.push(fields);
        }
        let mut question_files = BTreeMap::new();
        for (index, files) in self.question_files {
            let Some(position) = positions.get(&index).copied() else {
                return Err(ApiError::bad_request(format!(
                    "Attachments reference unknown question {index}"
                )));
            };
            question_files.insert(position, files);
        }

        Ok(CreateGroupCommand {
            title: non_empty(self.top.title),
            description: non_empty(self.top.description),
            type_group,
            questions,
            group_files: self.group_files,
            question_files,
        })
    }

    /// Every uploaded file replaces the question's attachments, whatever
    /// field it was sent under.
    pub fn into_update_command(self) -> UpdateQuestionCommand {
        let mut files = self.group_files;
        files.extend(self.question_files.into_values().flatten());
        UpdateQuestionCommand {
            fields: self.top,
            files,
        }
    }
}

async fn read_file(field: Field<'_>, file_name: String) -> Result<UploadedFile, ApiError> {
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|err| ApiError::bad_request(err.body_text()))?;

    Ok(UploadedFile {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    })
}

pub async fn read_question_form(mut multipart: Multipart) -> Result<QuestionForm, ApiError> {
    let mut form = QuestionForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(err.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let file = read_file(field, file_name).await?;
                form.apply_file(&name, file);
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|err| ApiError::bad_request(err.body_text()))?;
                form.apply_text(&name, value)?;
            }
        }
    }

    Ok(form)
}
