use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Subject::Table)
                    .if_not_exists()
                    .col(pk_auto(Subject::Id))
                    .col(string_len(Subject::Name, 200))
                    .col(timestamp(Subject::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(Subject::UpdatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_null(Subject::DeletedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Part::Table)
                    .if_not_exists()
                    .col(pk_auto(Part::Id))
                    .col(string_len(Part::Name, 100))
                    .col(integer(Part::Order))
                    .col(timestamp(Part::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(Part::UpdatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_null(Part::DeletedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Exam::Table)
                    .if_not_exists()
                    .col(pk_auto(Exam::Id))
                    .col(integer(Exam::SubjectId))
                    .col(string_len(Exam::Name, 200))
                    .col(timestamp(Exam::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(Exam::UpdatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_null(Exam::DeletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-exam-subject_id")
                            .from(Exam::Table, Exam::SubjectId)
                            .to(Subject::Table, Subject::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExamPart::Table)
                    .if_not_exists()
                    .col(pk_auto(ExamPart::Id))
                    .col(integer(ExamPart::ExamId))
                    .col(integer(ExamPart::PartId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-exam_part-exam_id")
                            .from(ExamPart::Table, ExamPart::ExamId)
                            .to(Exam::Table, Exam::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-exam_part-part_id")
                            .from(ExamPart::Table, ExamPart::PartId)
                            .to(Part::Table, Part::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_exam_part_exam_id_part_id")
                    .table(ExamPart::Table)
                    .col(ExamPart::ExamId)
                    .col(ExamPart::PartId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(QuestionGroup::Table)
                    .if_not_exists()
                    .col(pk_auto(QuestionGroup::Id))
                    .col(integer(QuestionGroup::PartId))
                    .col(integer(QuestionGroup::ExamId))
                    .col(integer(QuestionGroup::Order))
                    .col(integer(QuestionGroup::TypeGroup).default(1))
                    .col(string_len_null(QuestionGroup::Title, 500))
                    .col(text_null(QuestionGroup::Description))
                    .col(timestamp(QuestionGroup::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(QuestionGroup::UpdatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_null(QuestionGroup::DeletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-question_group-part_id")
                            .from(QuestionGroup::Table, QuestionGroup::PartId)
                            .to(Part::Table, Part::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-question_group-exam_id")
                            .from(QuestionGroup::Table, QuestionGroup::ExamId)
                            .to(Exam::Table, Exam::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Allocated orders must stay unique even when two writers race.
        manager
            .create_index(
                Index::create()
                    .name("uq_question_group_scope_order")
                    .table(QuestionGroup::Table)
                    .col(QuestionGroup::ExamId)
                    .col(QuestionGroup::PartId)
                    .col(QuestionGroup::Order)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Question::Table)
                    .if_not_exists()
                    .col(pk_auto(Question::Id))
                    .col(integer(Question::GroupId))
                    // Scope columns are copied from the owning group so that the
                    // order indexes below can be declared on this table.
                    .col(integer(Question::ExamId))
                    .col(integer(Question::PartId))
                    .col(text(Question::Title))
                    .col(text_null(Question::Description))
                    .col(text(Question::Option))
                    .col(string_len(Question::CorrectOption, 20))
                    .col(double(Question::Score))
                    .col(integer(Question::Order))
                    .col(integer(Question::GlobalOrder))
                    .col(timestamp(Question::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(Question::UpdatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_null(Question::DeletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-question-group_id")
                            .from(Question::Table, Question::GroupId)
                            .to(QuestionGroup::Table, QuestionGroup::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_question_scope_order")
                    .table(Question::Table)
                    .col(Question::ExamId)
                    .col(Question::PartId)
                    .col(Question::Order)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_question_exam_global_order")
                    .table(Question::Table)
                    .col(Question::ExamId)
                    .col(Question::GlobalOrder)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_question_group_id")
                    .table(Question::Table)
                    .col(Question::GroupId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Element::Table)
                    .if_not_exists()
                    .col(pk_auto(Element::Id))
                    // "image" or "audio"; mapped to ElementKind in app code.
                    .col(string_len(Element::Type, 10))
                    .col(text(Element::Url))
                    .col(integer_null(Element::GroupId))
                    .col(integer_null(Element::QuestionId))
                    .col(boolean(Element::CloudId).default(false))
                    .col(timestamp(Element::CreatedAt).default(Expr::current_timestamp()))
                    .check(Expr::cust("(group_id IS NULL) <> (question_id IS NULL)"))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-element-group_id")
                            .from(Element::Table, Element::GroupId)
                            .to(QuestionGroup::Table, QuestionGroup::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-element-question_id")
                            .from(Element::Table, Element::QuestionId)
                            .to(Question::Table, Question::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_element_question_id")
                    .table(Element::Table)
                    .col(Element::QuestionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_element_group_id")
                    .table(Element::Table)
                    .col(Element::GroupId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Element::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Question::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(QuestionGroup::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ExamPart::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Exam::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Part::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Subject::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Subject {
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Part {
    Table,
    Id,
    Name,
    Order,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Exam {
    Table,
    Id,
    SubjectId,
    Name,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum ExamPart {
    Table,
    Id,
    ExamId,
    PartId,
}

#[derive(DeriveIden)]
enum QuestionGroup {
    Table,
    Id,
    PartId,
    ExamId,
    Order,
    TypeGroup,
    Title,
    Description,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Question {
    Table,
    Id,
    GroupId,
    ExamId,
    PartId,
    Title,
    Description,
    Option,
    CorrectOption,
    Score,
    Order,
    GlobalOrder,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Element {
    Table,
    Id,
    Type,
    Url,
    GroupId,
    QuestionId,
    CloudId,
    CreatedAt,
}
