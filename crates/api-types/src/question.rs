use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::de;

/// Answer choices as submitted: either a label→text map or the same map
/// encoded as a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionPayload {
    Map(BTreeMap<String, String>),
    Encoded(String),
}

/// Question fields of a create or update request. Everything is optional at
/// the wire level; the service decides what is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionFields {
    #[serde(default, deserialize_with = "de::opt_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub description: Option<String>,
    #[serde(default)]
    pub option: Option<OptionPayload>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub correct_option: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub score: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementView {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub group_id: Option<i32>,
    pub question_id: Option<i32>,
    #[serde(rename = "cloudId")]
    pub cloud_id: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: i32,
    pub group_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub option: BTreeMap<String, String>,
    pub correct_option: String,
    pub score: f64,
    pub order: i32,
    pub global_order: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub elements: Vec<ElementView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupView {
    pub id: i32,
    pub part_id: i32,
    pub exam_id: i32,
    pub order: i32,
    pub type_group: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupWithQuestions {
    #[serde(flatten)]
    pub group: GroupView,
    pub questions: Vec<QuestionView>,
    pub elements: Vec<ElementView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionsPage {
    pub data: Vec<GroupWithQuestions>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

/// One entry of the whole-exam listing: every question of a part under a
/// single merged group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartSection {
    pub part: String,
    pub data: Vec<GroupWithQuestions>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateGroupResponse {
    pub message: String,
    #[serde(rename = "newGroup")]
    pub new_group: GroupView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub message: String,
    pub question: QuestionView,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_payload_accepts_map_or_string() {
        let map: QuestionFields =
            serde_json::from_str(r#"{"title":"Q1","option":{"A":"x","B":"y"},"score":5}"#)
                .expect("map payload");
        let encoded: QuestionFields =
            serde_json::from_str(r#"{"title":"Q1","option":"{\"A\":\"x\"}","score":"5"}"#)
                .expect("string payload");

        assert!(matches!(map.option, Some(OptionPayload::Map(ref m)) if m.len() == 2));
        assert!(matches!(encoded.option, Some(OptionPayload::Encoded(_))));
        assert_eq!(map.score.as_deref(), Some("5"));
        assert_eq!(encoded.score.as_deref(), Some("5"));
        assert_eq!(map.correct_option, None);
    }

    #[test]
    fn display_order_is_omitted_until_assigned() {
        let created_at = NaiveDateTime::default();
        let view = QuestionView {
            id: 1,
            group_id: 1,
            title: "Q1".to_string(),
            description: None,
            option: BTreeMap::from([("A".to_string(), "x".to_string())]),
            correct_option: "A".to_string(),
            score: 1.0,
            order: 1,
            global_order: 1,
            created_at,
            updated_at: created_at,
            deleted_at: None,
            elements: Vec::new(),
            display_order: None,
        };

        let json = serde_json::to_value(&view).expect("serialize question");
        assert!(json.get("display_order").is_none());

        let numbered = QuestionView {
            display_order: Some(3),
            ..view
        };
        let json = serde_json::to_value(&numbered).expect("serialize question");
        assert_eq!(json["display_order"], 3);
    }
}
