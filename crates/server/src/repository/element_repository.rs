use crate::entity::element;
use anyhow::{Result, anyhow};
use exambank_core::domain::{ElementId, ElementKind, ElementOwner, QuestionGroupId, QuestionId};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder,
};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRecord {
    pub id: ElementId,
    pub kind: ElementKind,
    pub url: String,
    pub owner: ElementOwner,
    pub cloud: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewElement {
    pub kind: ElementKind,
    pub url: String,
    pub owner: ElementOwner,
    pub cloud: bool,
}

pub struct ElementRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ElementRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    fn map_model(model: element::Model) -> Result<ElementRecord> {
        let kind = ElementKind::from_str(&model.kind)
            .map_err(|e| anyhow!("invalid element.type for element {}: {e}", model.id))?;
        let owner = ElementOwner::from_columns(
            model.group_id.map(QuestionGroupId::new),
            model.question_id.map(QuestionId::new),
        )
        .ok_or_else(|| anyhow!("element {} must belong to exactly one owner", model.id))?;

        Ok(ElementRecord {
            id: ElementId::new(model.id),
            kind,
            url: model.url,
            owner,
            cloud: model.cloud_id,
        })
    }

    pub async fn create(&self, new_element: NewElement) -> Result<ElementRecord> {
        let active_model = element::ActiveModel {
            kind: Set(new_element.kind.as_str().to_string()),
            url: Set(new_element.url),
            group_id: Set(new_element.owner.group_id().map(QuestionGroupId::into_inner)),
            question_id: Set(new_element.owner.question_id().map(QuestionId::into_inner)),
            cloud_id: Set(new_element.cloud),
            ..Default::default()
        };

        let model = active_model.insert(self.conn).await?;
        Self::map_model(model)
    }

    pub async fn create_many(&self, new_elements: Vec<NewElement>) -> Result<Vec<ElementRecord>> {
        let mut created = Vec::with_capacity(new_elements.len());
        for new_element in new_elements {
            created.push(self.create(new_element).await?);
        }
        Ok(created)
    }

    pub async fn list_for_question(&self, question_id: QuestionId) -> Result<Vec<ElementRecord>> {
        self.list_for_questions(&[question_id]).await
    }

    pub async fn list_for_questions(
        &self,
        question_ids: &[QuestionId],
    ) -> Result<Vec<ElementRecord>> {
        if question_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = element::Entity::find()
            .filter(element::Column::QuestionId.is_in(question_ids.iter().map(|id| id.into_inner())))
            .order_by_asc(element::Column::Id)
            .all(self.conn)
            .await?;

        models.into_iter().map(Self::map_model).collect()
    }

    pub async fn list_for_groups(
        &self,
        group_ids: &[QuestionGroupId],
    ) -> Result<Vec<ElementRecord>> {
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = element::Entity::find()
            .filter(element::Column::GroupId.is_in(group_ids.iter().map(|id| id.into_inner())))
            .order_by_asc(element::Column::Id)
            .all(self.conn)
            .await?;

        models.into_iter().map(Self::map_model).collect()
    }

    pub async fn delete_for_question(&self, question_id: QuestionId) -> Result<u64> {
        let result = element::Entity::delete_many()
            .filter(element::Column::QuestionId.eq(question_id.into_inner()))
            .exec(self.conn)
            .await?;

        Ok(result.rows_affected)
    }
}
