use crate::entity::subject;
use anyhow::Result;
use exambank_core::domain::SubjectId;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectRecord {
    pub id: SubjectId,
    pub name: String,
}

pub struct SubjectRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> SubjectRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    fn map_model(model: subject::Model) -> SubjectRecord {
        SubjectRecord {
            id: SubjectId::new(model.id),
            name: model.name,
        }
    }

    pub async fn find_by_id(&self, subject_id: SubjectId) -> Result<Option<SubjectRecord>> {
        let model = subject::Entity::find_by_id(subject_id.into_inner())
            .filter(subject::Column::DeletedAt.is_null())
            .one(self.conn)
            .await?;

        Ok(model.map(Self::map_model))
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<SubjectRecord>> {
        let model = subject::Entity::find()
            .filter(subject::Column::Name.eq(name))
            .filter(subject::Column::DeletedAt.is_null())
            .one(self.conn)
            .await?;

        Ok(model.map(Self::map_model))
    }

    pub async fn create(&self, name: &str) -> Result<SubjectRecord> {
        let active_model = subject::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        };

        let model = active_model.insert(self.conn).await?;
        Ok(Self::map_model(model))
    }

    /// Returns the live subject with this name, creating it when absent.
    pub async fn resolve_or_create(&self, name: &str) -> Result<SubjectRecord> {
        match self.find_by_name(name).await? {
            Some(subject) => Ok(subject),
            None => self.create(name).await,
        }
    }
}
