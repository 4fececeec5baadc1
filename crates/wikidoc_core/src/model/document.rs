//! Document domain model.
//!
//! # Invariants
//! - `id` and `created_at` are assigned by the store and never change.
//! - `title` is stored trimmed and is never blank.
//! - `content` always contains at least one non-whitespace character.
//! - `parent_id = None` marks a root document.

use super::ParseNameError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Store-assigned document identifier.
pub type DocumentId = i64;

/// Canonical persisted document record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
    /// Parent document id. May dangle after the parent is deleted.
    pub parent_id: Option<DocumentId>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Document {
    /// Returns whether this document was stored without a parent.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Field-level validation failure for document input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("document title must not be empty")]
    EmptyTitle,
    #[error("document content must not be empty")]
    EmptyContent,
}

/// Validated mutable fields for a create or update.
///
/// Fields are private so a draft can only be obtained through
/// [`DocumentDraft::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDraft {
    title: String,
    content: String,
    parent_id: Option<DocumentId>,
}

impl DocumentDraft {
    /// Validates caller input into a draft.
    ///
    /// # Errors
    /// - `EmptyTitle` when the title is blank after trimming.
    /// - `EmptyContent` when the content is blank after trimming.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        parent_id: Option<DocumentId>,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let content = content.into();
        if content.trim().is_empty() {
            return Err(ValidationError::EmptyContent);
        }

        Ok(Self {
            title: title.to_string(),
            content,
            parent_id,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn parent_id(&self) -> Option<DocumentId> {
        self.parent_id
    }
}

/// Read ordering for document listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentOrder {
    /// `created_at ASC, id ASC`; display and tree order.
    #[default]
    CreatedAsc,
    /// `id DESC`; recency order.
    IdDesc,
}

impl DocumentOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAsc => "created_asc",
            Self::IdDesc => "id_desc",
        }
    }
}

impl Display for DocumentOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentOrder {
    type Err = ParseNameError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "created_asc" => Ok(Self::CreatedAsc),
            "id_desc" => Ok(Self::IdDesc),
            _ => Err(ParseNameError {
                value: value.to_string(),
                expected: "created_asc|id_desc",
            }),
        }
    }
}
