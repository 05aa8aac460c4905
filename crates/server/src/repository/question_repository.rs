use crate::entity::{question, question_group};
use anyhow::{Result, anyhow};
use chrono::{NaiveDateTime, Utc};
use exambank_core::domain::{ExamId, PartId, QuestionGroupId, QuestionId, QuestionOptions, Score};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRecord {
    pub id: QuestionId,
    pub group_id: QuestionGroupId,
    pub exam_id: ExamId,
    pub part_id: PartId,
    pub title: String,
    pub description: Option<String>,
    pub options: QuestionOptions,
    pub correct_option: String,
    pub score: Score,
    pub order: i32,
    pub global_order: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub group_id: QuestionGroupId,
    pub exam_id: ExamId,
    pub part_id: PartId,
    pub title: String,
    pub description: Option<String>,
    pub options: QuestionOptions,
    pub correct_option: String,
    pub score: Score,
    pub order: i32,
    pub global_order: i32,
}

/// Fields left as `None` are not touched.
#[derive(Debug, Clone, Default)]
pub struct QuestionUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub options: Option<QuestionOptions>,
    pub correct_option: Option<String>,
    pub score: Option<Score>,
}

pub struct QuestionRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> QuestionRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    fn map_model(model: question::Model) -> Result<QuestionRecord> {
        let options = QuestionOptions::parse_json(&model.options).map_err(|e| {
            anyhow!("invalid question.option for question {} from database: {e}", model.id)
        })?;
        let score = Score::new(model.score).map_err(|e| {
            anyhow!("invalid question.score for question {} from database: {e}", model.id)
        })?;

        Ok(QuestionRecord {
            id: QuestionId::new(model.id),
            group_id: QuestionGroupId::new(model.group_id),
            exam_id: ExamId::new(model.exam_id),
            part_id: PartId::new(model.part_id),
            title: model.title,
            description: model.description,
            options,
            correct_option: model.correct_option,
            score,
            order: model.order,
            global_order: model.global_order,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        })
    }

    pub async fn create(&self, new_question: NewQuestion) -> Result<QuestionRecord> {
        let now = Utc::now().naive_utc();
        let active_model = question::ActiveModel {
            group_id: Set(new_question.group_id.into_inner()),
            exam_id: Set(new_question.exam_id.into_inner()),
            part_id: Set(new_question.part_id.into_inner()),
            title: Set(new_question.title),
            description: Set(new_question.description),
            options: Set(new_question.options.to_json()),
            correct_option: Set(new_question.correct_option),
            score: Set(new_question.score.value()),
            order: Set(new_question.order),
            global_order: Set(new_question.global_order),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        };

        let model = active_model.insert(self.conn).await?;
        Self::map_model(model)
    }

    /// Finds a question whether or not it has been soft-deleted.
    pub async fn find_by_id(&self, question_id: QuestionId) -> Result<Option<QuestionRecord>> {
        let model = question::Entity::find_by_id(question_id.into_inner())
            .one(self.conn)
            .await?;

        model.map(Self::map_model).transpose()
    }

    pub async fn update(
        &self,
        question_id: QuestionId,
        update: QuestionUpdate,
    ) -> Result<Option<QuestionRecord>> {
        let Some(model) = question::Entity::find_by_id(question_id.into_inner())
            .one(self.conn)
            .await?
        else {
            return Ok(None);
        };

        let mut active_model: question::ActiveModel = model.into();
        if let Some(title) = update.title {
            active_model.title = Set(title);
        }
        if let Some(description) = update.description {
            active_model.description = Set(Some(description));
        }
        if let Some(options) = update.options {
            active_model.options = Set(options.to_json());
        }
        if let Some(correct_option) = update.correct_option {
            active_model.correct_option = Set(correct_option);
        }
        if let Some(score) = update.score {
            active_model.score = Set(score.value());
        }
        active_model.updated_at = Set(Utc::now().naive_utc());

        let updated = active_model.update(self.conn).await?;
        Self::map_model(updated).map(Some)
    }

    /// Stamps `deleted_at`; calling it again overwrites the timestamp.
    pub async fn soft_delete(&self, question_id: QuestionId) -> Result<Option<QuestionRecord>> {
        let Some(model) = question::Entity::find_by_id(question_id.into_inner())
            .one(self.conn)
            .await?
        else {
            return Ok(None);
        };

        let now = Utc::now().naive_utc();
        let mut active_model: question::ActiveModel = model.into();
        active_model.deleted_at = Set(Some(now));
        active_model.updated_at = Set(now);

        let updated = active_model.update(self.conn).await?;
        Self::map_model(updated).map(Some)
    }

    /// Live questions of live groups in the (part, exam) scope.
    pub async fn count_in_scope(&self, part_id: PartId, exam_id: ExamId) -> Result<u64> {
        let total = question::Entity::find()
            .join(JoinType::InnerJoin, question::Relation::QuestionGroup.def())
            .filter(question::Column::PartId.eq(part_id.into_inner()))
            .filter(question::Column::ExamId.eq(exam_id.into_inner()))
            .filter(question::Column::DeletedAt.is_null())
            .filter(question_group::Column::DeletedAt.is_null())
            .count(self.conn)
            .await?;

        Ok(total)
    }

    /// Live questions of the given groups ordered by `global_order`.
    pub async fn list_for_groups(
        &self,
        group_ids: &[QuestionGroupId],
    ) -> Result<Vec<QuestionRecord>> {
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = question::Entity::find()
            .filter(question::Column::GroupId.is_in(group_ids.iter().map(|id| id.into_inner())))
            .filter(question::Column::DeletedAt.is_null())
            .order_by_asc(question::Column::GlobalOrder)
            .all(self.conn)
            .await?;

        models.into_iter().map(Self::map_model).collect()
    }
}
