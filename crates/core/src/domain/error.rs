use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DomainError {
    #[error("Invalid options format")]
    InvalidOptionsFormat,
    #[error("Options must contain at least one labelled choice")]
    EmptyOptions,
    #[error("invalid score: {0}. score must be a positive number")]
    InvalidScore(f64),
    #[error("Only images and audio files are allowed!")]
    UnsupportedAttachment(String),
    #[error("unknown element type: {0}")]
    UnknownElementKind(String),
    #[error("Missing correct option for question \"{0}\"")]
    MissingCorrectOption(String),
    #[error("page must be a positive integer")]
    InvalidPage,
    #[error("limit must be a positive integer")]
    InvalidLimit,
}
