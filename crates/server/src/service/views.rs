//! Conversions from repository records to response DTOs.

use exambank_api_types::{ElementView, ExamView, GroupView, PartView, QuestionView};

use crate::repository::{
    ElementRecord, ExamRecord, GroupRecord, PartRecord, QuestionRecord, QuestionWithElements,
};

impl From<ElementRecord> for ElementView {
    fn from(record: ElementRecord) -> Self {
        Self {
            id: record.id.into_inner(),
            kind: record.kind.as_str().to_string(),
            url: record.url,
            group_id: record.owner.group_id().map(|id| id.into_inner()),
            question_id: record.owner.question_id().map(|id| id.into_inner()),
            cloud_id: record.cloud,
        }
    }
}

impl From<GroupRecord> for GroupView {
    fn from(record: GroupRecord) -> Self {
        Self {
            id: record.id.into_inner(),
            part_id: record.part_id.into_inner(),
            exam_id: record.exam_id.into_inner(),
            order: record.order,
            type_group: record.type_group,
            title: record.title,
            description: record.description,
            created_at: record.created_at,
            updated_at: record.updated_at,
            deleted_at: record.deleted_at,
        }
    }
}

impl From<PartRecord> for PartView {
    fn from(record: PartRecord) -> Self {
        Self {
            id: record.id.into_inner(),
            name: record.name,
            order: record.order,
        }
    }
}

impl From<ExamRecord> for ExamView {
    fn from(record: ExamRecord) -> Self {
        Self {
            id: record.id.into_inner(),
            subject_id: record.subject_id.into_inner(),
            name: record.name,
        }
    }
}

pub fn question_view(
    record: QuestionRecord,
    elements: Vec<ElementRecord>,
    display_order: Option<u64>,
) -> QuestionView {
    QuestionView {
        id: record.id.into_inner(),
        group_id: record.group_id.into_inner(),
        title: record.title,
        description: record.description,
        option: record.options.into_map(),
        correct_option: record.correct_option,
        score: record.score.value(),
        order: record.order,
        global_order: record.global_order,
        created_at: record.created_at,
        updated_at: record.updated_at,
        deleted_at: record.deleted_at,
        elements: elements.into_iter().map(ElementView::from).collect(),
        display_order,
    }
}

impl From<QuestionWithElements> for QuestionView {
    fn from(entry: QuestionWithElements) -> Self {
        question_view(entry.question, entry.elements, None)
    }
}
