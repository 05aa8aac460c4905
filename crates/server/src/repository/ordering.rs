use crate::entity::{question, question_group};
use anyhow::Result;
use exambank_core::domain::{ExamId, OrderCursor, PartId};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};

/// Reads the current maximum of each ordering sequence. Soft-deleted rows are
/// counted so a value is never handed out twice.
///
/// The read itself takes no lock: the unique indexes on `question_group` and
/// `question` reject a racing duplicate and the transaction runner retries.
pub struct OrderingAllocator<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> OrderingAllocator<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn group_order(&self, part_id: PartId, exam_id: ExamId) -> Result<OrderCursor> {
        let max: Option<Option<i32>> = question_group::Entity::find()
            .select_only()
            .column_as(question_group::Column::Order.max(), "max_order")
            .filter(question_group::Column::PartId.eq(part_id.into_inner()))
            .filter(question_group::Column::ExamId.eq(exam_id.into_inner()))
            .into_tuple()
            .one(self.conn)
            .await?;

        Ok(OrderCursor::after(max.flatten()))
    }

    pub async fn question_order(&self, part_id: PartId, exam_id: ExamId) -> Result<OrderCursor> {
        let max: Option<Option<i32>> = question::Entity::find()
            .select_only()
            .column_as(question::Column::Order.max(), "max_order")
            .filter(question::Column::PartId.eq(part_id.into_inner()))
            .filter(question::Column::ExamId.eq(exam_id.into_inner()))
            .into_tuple()
            .one(self.conn)
            .await?;

        Ok(OrderCursor::after(max.flatten()))
    }

    pub async fn global_order(&self, exam_id: ExamId) -> Result<OrderCursor> {
        let max: Option<Option<i32>> = question::Entity::find()
            .select_only()
            .column_as(question::Column::GlobalOrder.max(), "max_global_order")
            .filter(question::Column::ExamId.eq(exam_id.into_inner()))
            .into_tuple()
            .one(self.conn)
            .await?;

        Ok(OrderCursor::after(max.flatten()))
    }
}
