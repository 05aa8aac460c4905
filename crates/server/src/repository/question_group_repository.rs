use super::element_repository::{ElementRecord, ElementRepository};
use super::question_repository::{QuestionRecord, QuestionRepository};
use crate::entity::question_group;
use anyhow::Result;
use chrono::{NaiveDateTime, Utc};
use exambank_core::domain::{ElementOwner, ExamId, PartId, QuestionGroupId, QuestionId};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder,
};
use std::collections::HashMap;

pub const DEFAULT_TYPE_GROUP: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord {
    pub id: QuestionGroupId,
    pub part_id: PartId,
    pub exam_id: ExamId,
    pub order: i32,
    pub type_group: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub part_id: PartId,
    pub exam_id: ExamId,
    pub order: i32,
    pub type_group: i32,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionWithElements {
    pub question: QuestionRecord,
    pub elements: Vec<ElementRecord>,
}

/// A live group with its live questions (by `global_order`) and every element
/// attached to either.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTree {
    pub group: GroupRecord,
    pub elements: Vec<ElementRecord>,
    pub questions: Vec<QuestionWithElements>,
}

pub struct QuestionGroupRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> QuestionGroupRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    fn map_model(model: question_group::Model) -> GroupRecord {
        GroupRecord {
            id: QuestionGroupId::new(model.id),
            part_id: PartId::new(model.part_id),
            exam_id: ExamId::new(model.exam_id),
            order: model.order,
            type_group: model.type_group,
            title: model.title,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }

    pub async fn create(&self, new_group: NewGroup) -> Result<GroupRecord> {
        let now = Utc::now().naive_utc();
        let active_model = question_group::ActiveModel {
            part_id: Set(new_group.part_id.into_inner()),
            exam_id: Set(new_group.exam_id.into_inner()),
            order: Set(new_group.order),
            type_group: Set(new_group.type_group),
            title: Set(new_group.title),
            description: Set(new_group.description),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        };

        let model = active_model.insert(self.conn).await?;
        Ok(Self::map_model(model))
    }

    /// The live group with the highest `order` in the scope.
    pub async fn find_latest_in_scope(
        &self,
        part_id: PartId,
        exam_id: ExamId,
    ) -> Result<Option<GroupRecord>> {
        let model = question_group::Entity::find()
            .filter(question_group::Column::PartId.eq(part_id.into_inner()))
            .filter(question_group::Column::ExamId.eq(exam_id.into_inner()))
            .filter(question_group::Column::DeletedAt.is_null())
            .order_by_desc(question_group::Column::Order)
            .one(self.conn)
            .await?;

        Ok(model.map(Self::map_model))
    }

    pub async fn list_in_scope(
        &self,
        part_id: PartId,
        exam_id: ExamId,
    ) -> Result<Vec<GroupRecord>> {
        let models = question_group::Entity::find()
            .filter(question_group::Column::PartId.eq(part_id.into_inner()))
            .filter(question_group::Column::ExamId.eq(exam_id.into_inner()))
            .filter(question_group::Column::DeletedAt.is_null())
            .order_by_asc(question_group::Column::Order)
            .all(self.conn)
            .await?;

        Ok(models.into_iter().map(Self::map_model).collect())
    }

    /// Live groups of an exam ordered by part then group order.
    pub async fn list_by_exam(&self, exam_id: ExamId) -> Result<Vec<GroupRecord>> {
        let models = question_group::Entity::find()
            .filter(question_group::Column::ExamId.eq(exam_id.into_inner()))
            .filter(question_group::Column::DeletedAt.is_null())
            .order_by_asc(question_group::Column::PartId)
            .order_by_asc(question_group::Column::Order)
            .all(self.conn)
            .await?;

        Ok(models.into_iter().map(Self::map_model).collect())
    }

    pub async fn list_with_questions(
        &self,
        part_id: PartId,
        exam_id: ExamId,
    ) -> Result<Vec<GroupTree>> {
        let groups = self.list_in_scope(part_id, exam_id).await?;
        self.assemble(groups).await
    }

    pub async fn list_exam_with_questions(&self, exam_id: ExamId) -> Result<Vec<GroupTree>> {
        let groups = self.list_by_exam(exam_id).await?;
        self.assemble(groups).await
    }

    async fn assemble(&self, groups: Vec<GroupRecord>) -> Result<Vec<GroupTree>> {
        let group_ids: Vec<QuestionGroupId> = groups.iter().map(|g| g.id).collect();

        let questions = QuestionRepository::new(self.conn)
            .list_for_groups(&group_ids)
            .await?;
        let question_ids: Vec<QuestionId> = questions.iter().map(|q| q.id).collect();

        let elements = ElementRepository::new(self.conn);
        let mut group_elements: HashMap<QuestionGroupId, Vec<ElementRecord>> = HashMap::new();
        for element in elements.list_for_groups(&group_ids).await? {
            if let ElementOwner::Group(group_id) = element.owner {
                group_elements.entry(group_id).or_default().push(element);
            }
        }
        let mut question_elements: HashMap<QuestionId, Vec<ElementRecord>> = HashMap::new();
        for element in elements.list_for_questions(&question_ids).await? {
            if let ElementOwner::Question(question_id) = element.owner {
                question_elements.entry(question_id).or_default().push(element);
            }
        }

        let mut group_questions: HashMap<QuestionGroupId, Vec<QuestionWithElements>> =
            HashMap::new();
        for question in questions {
            let elements = question_elements.remove(&question.id).unwrap_or_default();
            group_questions
                .entry(question.group_id)
                .or_default()
                .push(QuestionWithElements { question, elements });
        }

        Ok(groups
            .into_iter()
            .map(|group| GroupTree {
                elements: group_elements.remove(&group.id).unwrap_or_default(),
                questions: group_questions.remove(&group.id).unwrap_or_default(),
                group,
            })
            .collect())
    }
}
