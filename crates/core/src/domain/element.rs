use std::fmt;
use std::path::Path;
use std::str::FromStr;

use super::{DomainError, QuestionGroupId, QuestionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Image,
    Audio,
}

const IMAGE_EXTENSIONS: [&str; 3] = ["jpeg", "jpg", "png"];
const AUDIO_EXTENSIONS: [&str; 2] = ["mp3", "wav"];

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Image => "image",
            ElementKind::Audio => "audio",
        }
    }

    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("image") {
            ElementKind::Image
        } else {
            ElementKind::Audio
        }
    }

    /// Accepts an uploaded file only when both its extension and its MIME type
    /// name one of the supported image or audio formats.
    pub fn classify_upload(file_name: &str, content_type: &str) -> Result<Self, DomainError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let content_type = content_type.to_ascii_lowercase();

        let known_extension = IMAGE_EXTENSIONS
            .iter()
            .chain(AUDIO_EXTENSIONS.iter())
            .any(|ext| *ext == extension);
        let known_mime = IMAGE_EXTENSIONS
            .iter()
            .chain(AUDIO_EXTENSIONS.iter())
            .chain(["mpeg", "x-wav", "wave"].iter())
            .any(|token| content_type.ends_with(&format!("/{token}")));

        if known_extension && known_mime {
            Ok(Self::from_content_type(&content_type))
        } else {
            Err(DomainError::UnsupportedAttachment(file_name.to_string()))
        }
    }

    /// Kind of an externally hosted attachment, judged from its url.
    pub fn from_url(url: &str) -> Self {
        let lowered = url.to_ascii_lowercase();
        if AUDIO_EXTENSIONS
            .iter()
            .any(|ext| lowered.contains(&format!(".{ext}")))
        {
            ElementKind::Audio
        } else {
            ElementKind::Image
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(ElementKind::Image),
            "audio" => Ok(ElementKind::Audio),
            other => Err(DomainError::UnknownElementKind(other.to_string())),
        }
    }
}

/// An element belongs to exactly one group or one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementOwner {
    Group(QuestionGroupId),
    Question(QuestionId),
}

impl ElementOwner {
    pub fn group_id(self) -> Option<QuestionGroupId> {
        match self {
            ElementOwner::Group(id) => Some(id),
            ElementOwner::Question(_) => None,
        }
    }

    pub fn question_id(self) -> Option<QuestionId> {
        match self {
            ElementOwner::Question(id) => Some(id),
            ElementOwner::Group(_) => None,
        }
    }

    pub fn from_columns(
        group_id: Option<QuestionGroupId>,
        question_id: Option<QuestionId>,
    ) -> Option<Self> {
        match (group_id, question_id) {
            (Some(group_id), None) => Some(ElementOwner::Group(group_id)),
            (None, Some(question_id)) => Some(ElementOwner::Question(question_id)),
            _ => None,
        }
    }
}
