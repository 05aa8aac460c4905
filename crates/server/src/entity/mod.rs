pub mod element;
pub mod exam;
pub mod exam_part;
pub mod part;
pub mod question;
pub mod question_group;
pub mod subject;
