use std::collections::HashMap;

use exambank_api_types::{
    ElementView, GroupView, GroupWithQuestions, PartSection, QuestionView, QuestionsPage,
};
use exambank_core::domain::{
    DEFAULT_LIMIT, DEFAULT_PAGE, ExamId, PageRequest, PartId, slice_groups,
};
use sea_orm::DatabaseConnection;

use super::error::{Result, ServiceError};
use super::views::question_view;
use crate::repository::{
    ElementRecord, ExamRepository, GroupTree, PartRepository, QuestionGroupRepository,
    QuestionRepository,
};

/// Read path: rebuilds groups, questions and attachments for display.
#[derive(Clone)]
pub struct ExamHierarchyReader {
    db: DatabaseConnection,
}

impl ExamHierarchyReader {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// One page of a part's questions, numbered across the flattened list and
    /// regrouped under the groups they came from.
    pub async fn questions_by_part_and_exam(
        &self,
        exam_id: ExamId,
        part_id: PartId,
        request: PageRequest,
    ) -> Result<QuestionsPage> {
        ExamRepository::new(&self.db)
            .find_link(exam_id, part_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Exam or part not found!"))?;

        let total = QuestionRepository::new(&self.db)
            .count_in_scope(part_id, exam_id)
            .await?;
        let trees = QuestionGroupRepository::new(&self.db)
            .list_with_questions(part_id, exam_id)
            .await?;

        let groups = trees
            .into_iter()
            .map(|tree| {
                let header = (GroupView::from(tree.group), to_views(tree.elements));
                (header, tree.questions)
            })
            .collect();

        let data = slice_groups(groups, request)
            .into_iter()
            .map(|((group, elements), questions)| GroupWithQuestions {
                group,
                questions: questions
                    .into_iter()
                    .map(|numbered| {
                        let entry = numbered.item;
                        let display_order = Some(numbered.display_order);
                        question_view(entry.question, entry.elements, display_order)
                    })
                    .collect(),
                elements,
            })
            .collect();

        Ok(QuestionsPage {
            data,
            total,
            page: request.page(),
            limit: request.limit(),
            total_pages: request.total_pages(total),
        })
    }

    /// Every part of the exam with all its questions merged into one group,
    /// ordered by `global_order`.
    pub async fn all_questions_for_exam(&self, exam_id: ExamId) -> Result<Vec<PartSection>> {
        ExamRepository::new(&self.db)
            .find_by_id(exam_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Exam not found"))?;

        let trees = QuestionGroupRepository::new(&self.db)
            .list_exam_with_questions(exam_id)
            .await?;

        let mut part_ids: Vec<PartId> = trees.iter().map(|tree| tree.group.part_id).collect();
        part_ids.dedup();
        let part_names: HashMap<PartId, String> = PartRepository::new(&self.db)
            .find_many(&part_ids)
            .await?
            .into_iter()
            .map(|part| (part.id, part.name))
            .collect();

        Ok(collapse_by_part(trees, &part_names))
    }
}

fn to_views(elements: Vec<ElementRecord>) -> Vec<ElementView> {
    elements.into_iter().map(ElementView::from).collect()
}

/// Groups arrive ordered by part; consecutive groups of one part become a
/// single section headed by the first group's metadata.
fn collapse_by_part(
    trees: Vec<GroupTree>,
    part_names: &HashMap<PartId, String>,
) -> Vec<PartSection> {
    let page = PageRequest::new(DEFAULT_PAGE, DEFAULT_LIMIT).unwrap_or_default();
    let mut sections: Vec<(PartId, GroupWithQuestions)> = Vec::new();

    for tree in trees {
        let part_id = tree.group.part_id;
        let questions = tree.questions.into_iter().map(QuestionView::from);
        let elements = to_views(tree.elements);

        match sections.last_mut() {
            Some((last_part, merged)) if *last_part == part_id => {
                merged.questions.extend(questions);
                merged.elements.extend(elements);
            }
            _ => sections.push((
                part_id,
                GroupWithQuestions {
                    group: GroupView::from(tree.group),
                    questions: questions.collect(),
                    elements,
                },
            )),
        }
    }

    sections
        .into_iter()
        .map(|(part_id, mut merged)| {
            merged.questions.sort_by_key(|question| question.global_order);
            let total = merged.questions.len() as u64;
            PartSection {
                part: part_names
                    .get(&part_id)
                    .cloned()
                    .unwrap_or_else(|| part_id.to_string()),
                data: vec![merged],
                total,
                page: page.page(),
                limit: page.limit(),
                total_pages: page.total_pages(total),
            }
        })
        .collect()
}
