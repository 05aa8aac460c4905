mod element;
mod error;
mod ids;
mod options;
mod ordering;
mod pagination;
mod score;

pub use element::{ElementKind, ElementOwner};
pub use error::DomainError;
pub use ids::{ElementId, ExamId, ExamPartId, PartId, QuestionGroupId, QuestionId, SubjectId};
pub use options::{ANSWER_LABELS, QuestionOptions, answer_label_from_cell, is_answer_label};
pub use ordering::OrderCursor;
pub use pagination::{DEFAULT_LIMIT, DEFAULT_PAGE, Numbered, PageRequest, slice_groups};
pub use score::Score;
