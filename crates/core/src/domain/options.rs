use std::collections::BTreeMap;

use super::DomainError;

/// Labelled answer choices of a question, e.g. `{"A": "cat", "B": "dog"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionOptions(BTreeMap<String, String>);

impl QuestionOptions {
    pub fn from_map(choices: BTreeMap<String, String>) -> Result<Self, DomainError> {
        if choices.is_empty() {
            return Err(DomainError::EmptyOptions);
        }
        if choices.keys().any(|label| label.trim().is_empty()) {
            return Err(DomainError::InvalidOptionsFormat);
        }
        Ok(Self(choices))
    }

    /// Parses the JSON-encoded form sent by multipart clients.
    pub fn parse_json(raw: &str) -> Result<Self, DomainError> {
        let choices: BTreeMap<String, String> =
            serde_json::from_str(raw).map_err(|_| DomainError::InvalidOptionsFormat)?;
        Self::from_map(choices)
    }

    /// Canonical stored form.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| String::from("{}"))
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0.get(label).map(String::as_str)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.0
    }
}

/// Labels accepted as a correct answer on authored questions.
pub const ANSWER_LABELS: [&str; 4] = ["A", "B", "C", "D"];

pub fn is_answer_label(label: &str) -> bool {
    ANSWER_LABELS.contains(&label)
}

/// Turns a spreadsheet answer cell such as `"Option B"` into the label `"B"`.
pub fn answer_label_from_cell(cell: &str) -> Option<String> {
    let cell = cell.trim_start();
    let label = cell.strip_prefix("Option ").unwrap_or(cell).trim();
    (!label.is_empty()).then(|| label.to_string())
}
