use crate::entity::{exam, exam_part, part};
use anyhow::Result;
use exambank_core::domain::{ExamId, ExamPartId, PartId, SubjectId};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QuerySelect,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamRecord {
    pub id: ExamId,
    pub subject_id: SubjectId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamPartRecord {
    pub id: ExamPartId,
    pub exam_id: ExamId,
    pub part_id: PartId,
}

#[derive(Debug, Clone)]
pub struct NewExam {
    pub subject_id: SubjectId,
    pub name: String,
}

pub struct ExamRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ExamRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    fn map_model(model: exam::Model) -> ExamRecord {
        ExamRecord {
            id: ExamId::new(model.id),
            subject_id: SubjectId::new(model.subject_id),
            name: model.name,
        }
    }

    fn map_link(model: exam_part::Model) -> ExamPartRecord {
        ExamPartRecord {
            id: ExamPartId::new(model.id),
            exam_id: ExamId::new(model.exam_id),
            part_id: PartId::new(model.part_id),
        }
    }

    pub async fn find_by_id(&self, exam_id: ExamId) -> Result<Option<ExamRecord>> {
        let model = exam::Entity::find_by_id(exam_id.into_inner())
            .filter(exam::Column::DeletedAt.is_null())
            .one(self.conn)
            .await?;

        Ok(model.map(Self::map_model))
    }

    pub async fn find_by_name_in_subject(
        &self,
        name: &str,
        subject_id: SubjectId,
    ) -> Result<Option<ExamRecord>> {
        let model = exam::Entity::find()
            .filter(exam::Column::Name.eq(name))
            .filter(exam::Column::SubjectId.eq(subject_id.into_inner()))
            .filter(exam::Column::DeletedAt.is_null())
            .one(self.conn)
            .await?;

        Ok(model.map(Self::map_model))
    }

    /// Inserts the exam without linking any part.
    pub async fn insert(&self, new_exam: NewExam) -> Result<ExamRecord> {
        let active_model = exam::ActiveModel {
            subject_id: Set(new_exam.subject_id.into_inner()),
            name: Set(new_exam.name),
            ..Default::default()
        };

        let model = active_model.insert(self.conn).await?;
        Ok(Self::map_model(model))
    }

    /// Inserts the exam and links every live part to it.
    pub async fn create(&self, new_exam: NewExam) -> Result<ExamRecord> {
        let exam = self.insert(new_exam).await?;

        let part_ids: Vec<i32> = part::Entity::find()
            .select_only()
            .column(part::Column::Id)
            .filter(part::Column::DeletedAt.is_null())
            .into_tuple()
            .all(self.conn)
            .await?;

        for part_id in part_ids {
            self.ensure_link(exam.id, PartId::new(part_id)).await?;
        }

        Ok(exam)
    }

    pub async fn find_link(
        &self,
        exam_id: ExamId,
        part_id: PartId,
    ) -> Result<Option<ExamPartRecord>> {
        let model = exam_part::Entity::find()
            .filter(exam_part::Column::ExamId.eq(exam_id.into_inner()))
            .filter(exam_part::Column::PartId.eq(part_id.into_inner()))
            .one(self.conn)
            .await?;

        Ok(model.map(Self::map_link))
    }

    /// Returns the existing (exam, part) link or creates it.
    pub async fn ensure_link(&self, exam_id: ExamId, part_id: PartId) -> Result<ExamPartRecord> {
        if let Some(link) = self.find_link(exam_id, part_id).await? {
            return Ok(link);
        }

        let model = exam_part::ActiveModel {
            exam_id: Set(exam_id.into_inner()),
            part_id: Set(part_id.into_inner()),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        Ok(Self::map_link(model))
    }
}
