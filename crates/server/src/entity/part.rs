use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "part")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub order: i32,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub deleted_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::exam_part::Entity")]
    ExamPart,
    #[sea_orm(has_many = "super::question_group::Entity")]
    QuestionGroup,
}

impl Related<super::exam_part::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExamPart.def()
    }
}

impl Related<super::question_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuestionGroup.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
