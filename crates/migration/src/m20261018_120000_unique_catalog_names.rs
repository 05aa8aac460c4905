use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("uq_subject_name")
                    .table(Subject::Table)
                    .col(Subject::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_part_name")
                    .table(Part::Table)
                    .col(Part::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_exam_subject_id_name")
                    .table(Exam::Table)
                    .col(Exam::SubjectId)
                    .col(Exam::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("uq_exam_subject_id_name")
                    .table(Exam::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("uq_part_name")
                    .table(Part::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("uq_subject_name")
                    .table(Subject::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Subject {
    Table,
    Name,
}

#[derive(DeriveIden)]
enum Part {
    Table,
    Name,
}

#[derive(DeriveIden)]
enum Exam {
    Table,
    SubjectId,
    Name,
}
