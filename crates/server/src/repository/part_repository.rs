use crate::entity::{exam, exam_part, part};
use anyhow::Result;
use exambank_core::domain::PartId;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartRecord {
    pub id: PartId,
    pub name: String,
    pub order: i32,
}

#[derive(Debug, Clone)]
pub struct NewPart {
    pub name: String,
    pub order: Option<i32>,
}

pub struct PartRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> PartRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    fn map_model(model: part::Model) -> PartRecord {
        PartRecord {
            id: PartId::new(model.id),
            name: model.name,
            order: model.order,
        }
    }

    pub async fn find_by_id(&self, part_id: PartId) -> Result<Option<PartRecord>> {
        let model = part::Entity::find_by_id(part_id.into_inner())
            .filter(part::Column::DeletedAt.is_null())
            .one(self.conn)
            .await?;

        Ok(model.map(Self::map_model))
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<PartRecord>> {
        let model = part::Entity::find()
            .filter(part::Column::Name.eq(name))
            .filter(part::Column::DeletedAt.is_null())
            .one(self.conn)
            .await?;

        Ok(model.map(Self::map_model))
    }

    /// Live parts ordered by their catalog `order`.
    pub async fn list(&self) -> Result<Vec<PartRecord>> {
        let models = part::Entity::find()
            .filter(part::Column::DeletedAt.is_null())
            .order_by_asc(part::Column::Order)
            .order_by_asc(part::Column::Id)
            .all(self.conn)
            .await?;

        Ok(models.into_iter().map(Self::map_model).collect())
    }

    /// Looks up parts regardless of deletion, for labelling existing content.
    pub async fn find_many(&self, part_ids: &[PartId]) -> Result<Vec<PartRecord>> {
        if part_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = part::Entity::find()
            .filter(part::Column::Id.is_in(part_ids.iter().map(|id| id.into_inner())))
            .all(self.conn)
            .await?;

        Ok(models.into_iter().map(Self::map_model).collect())
    }

    /// Inserts the part and links it to every live exam.
    pub async fn create(&self, new_part: NewPart) -> Result<PartRecord> {
        let order = match new_part.order {
            Some(order) => order,
            None => {
                let max: Option<Option<i32>> = part::Entity::find()
                    .select_only()
                    .column_as(part::Column::Order.max(), "max_order")
                    .into_tuple()
                    .one(self.conn)
                    .await?;
                max.flatten().unwrap_or(0) + 1
            }
        };

        let active_model = part::ActiveModel {
            name: Set(new_part.name),
            order: Set(order),
            ..Default::default()
        };
        let model = active_model.insert(self.conn).await?;

        let exam_ids: Vec<i32> = exam::Entity::find()
            .select_only()
            .column(exam::Column::Id)
            .filter(exam::Column::DeletedAt.is_null())
            .into_tuple()
            .all(self.conn)
            .await?;

        for exam_id in exam_ids {
            exam_part::ActiveModel {
                exam_id: Set(exam_id),
                part_id: Set(model.id),
                ..Default::default()
            }
            .insert(self.conn)
            .await?;
        }

        Ok(Self::map_model(model))
    }
}
