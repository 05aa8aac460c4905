//! Database access for the exam hierarchy.
//!
//! Every repository borrows a `ConnectionTrait`, so the same code runs against
//! the pool or inside an open `DatabaseTransaction`.

mod element_repository;
mod exam_repository;
mod ordering;
mod part_repository;
mod question_group_repository;
mod question_repository;
mod subject_repository;

pub use element_repository::{ElementRecord, ElementRepository, NewElement};
pub use exam_repository::{ExamPartRecord, ExamRecord, ExamRepository, NewExam};
pub use ordering::OrderingAllocator;
pub use part_repository::{NewPart, PartRecord, PartRepository};
pub use question_group_repository::{
    DEFAULT_TYPE_GROUP, GroupRecord, GroupTree, NewGroup, QuestionGroupRepository,
    QuestionWithElements,
};
pub use question_repository::{NewQuestion, QuestionRecord, QuestionRepository, QuestionUpdate};
pub use subject_repository::{SubjectRecord, SubjectRepository};
