use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "question")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub group_id: i32,
    pub exam_id: i32,
    pub part_id: i32,
    #[sea_orm(column_type = "Text")]
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// Canonical JSON of the label→text map.
    #[sea_orm(column_name = "option", column_type = "Text")]
    pub options: String,
    pub correct_option: String,
    pub score: f64,
    pub order: i32,
    pub global_order: i32,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub deleted_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::question_group::Entity",
        from = "Column::GroupId",
        to = "super::question_group::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    QuestionGroup,
    #[sea_orm(has_many = "super::element::Entity")]
    Element,
}

impl Related<super::question_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuestionGroup.def()
    }
}

impl Related<super::element::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Element.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
