//! Use cases over the exam hierarchy.

mod catalog;
mod composition;
mod error;
mod hierarchy;
mod import;
mod transaction;
mod validation;
mod views;

pub use catalog::CatalogService;
pub use composition::{
    CreateGroupCommand, ExamCompositionService, QuestionWithAttachments, UpdateQuestionCommand,
};
pub use error::{Result, ServiceError};
pub use hierarchy::ExamHierarchyReader;
pub use import::SpreadsheetImporter;
pub use transaction::{TransactionRunner, is_order_conflict};
pub use validation::{QuestionDraft, QuestionPatch, parse_options};
pub use views::question_view;
