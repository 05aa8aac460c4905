use serde::{Deserialize, Serialize};

use crate::de;

/// Body of the spreadsheet import endpoint, as produced by the client-side
/// sheet-to-JSON conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadsheetUpload {
    #[serde(default)]
    pub file: Option<SpreadsheetFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadsheetFile {
    #[serde(rename = "detailQuestions", default)]
    pub detail_questions: Vec<SheetRow>,
    #[serde(rename = "examAndSubject", default)]
    pub exam_and_subject: Vec<ExamAndSubject>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamAndSubject {
    #[serde(rename = "Subject", default, deserialize_with = "de::opt_text")]
    pub subject: Option<String>,
    #[serde(rename = "Exam", default, deserialize_with = "de::opt_text")]
    pub exam: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRow {
    #[serde(rename = "Part", default, deserialize_with = "de::opt_text")]
    pub part: Option<String>,
    #[serde(rename = "Order", default, deserialize_with = "de::opt_integer")]
    pub order: Option<i64>,
    #[serde(rename = "Question", default, deserialize_with = "de::opt_text")]
    pub question: Option<String>,
    #[serde(rename = "Description", default, deserialize_with = "de::opt_text")]
    pub description: Option<String>,
    #[serde(rename = "Option A", default, deserialize_with = "de::opt_text")]
    pub option_a: Option<String>,
    #[serde(rename = "Option B", default, deserialize_with = "de::opt_text")]
    pub option_b: Option<String>,
    #[serde(rename = "Option C", default, deserialize_with = "de::opt_text")]
    pub option_c: Option<String>,
    #[serde(rename = "Option D", default, deserialize_with = "de::opt_text")]
    pub option_d: Option<String>,
    #[serde(rename = "Correct option", default, deserialize_with = "de::opt_text")]
    pub correct_option: Option<String>,
    #[serde(rename = "Title Group", default, deserialize_with = "de::opt_text")]
    pub title_group: Option<String>,
    #[serde(rename = "Description Group", default, deserialize_with = "de::opt_text")]
    pub description_group: Option<String>,
    #[serde(rename = "Element", default, deserialize_with = "de::opt_text")]
    pub element: Option<String>,
    #[serde(rename = "Element Group", default, deserialize_with = "de::opt_text")]
    pub element_group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub part: String,
    #[serde(rename = "groupId")]
    pub group_id: i32,
    #[serde(rename = "questionsCount")]
    pub questions_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResponse {
    pub message: String,
    pub results: Vec<ImportSummary>,
}
