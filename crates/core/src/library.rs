//! Media library (blog) posts and their comments.
//!
//! Comments live in their own table keyed by `item_id`; deleting a post
//! deletes its comments.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::impl_record;
use crate::types::{new_id, EntityId, Timestamp};

/// Maximum length of a library comment.
pub const MAX_COMMENT_LENGTH: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryItem {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub media: MediaKind,
    pub url: String,
    pub category: Option<String>,
    pub author: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl_record!(LibraryItem, "library_items", "LibraryItem");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryComment {
    pub id: EntityId,
    pub item_id: EntityId,
    pub author: String,
    pub text: String,
    pub created_at: Timestamp,
}

impl_record!(LibraryComment, "library_comments", "LibraryComment");

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LibraryItemDraft {
    #[validate(length(min = 1, max = 200, message = "title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub media: MediaKind,
    #[validate(url(message = "url must be a valid URL"))]
    pub url: String,
    pub category: Option<String>,
    #[validate(length(min = 1, message = "author is required"))]
    pub author: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryCommentDraft {
    pub author: String,
    pub text: String,
}

impl LibraryItem {
    pub fn from_draft(draft: LibraryItemDraft, now: Timestamp) -> Result<Self, CoreError> {
        draft.validate()?;
        Ok(Self {
            id: new_id(),
            title: draft.title.trim().to_string(),
            description: draft.description,
            media: draft.media,
            url: draft.url,
            category: draft.category.filter(|c| !c.trim().is_empty()),
            author: draft.author.trim().to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply_draft(&mut self, draft: LibraryItemDraft, now: Timestamp) -> Result<(), CoreError> {
        draft.validate()?;
        self.title = draft.title.trim().to_string();
        self.description = draft.description;
        self.media = draft.media;
        self.url = draft.url;
        self.category = draft.category.filter(|c| !c.trim().is_empty());
        self.author = draft.author.trim().to_string();
        self.updated_at = now;
        Ok(())
    }
}

impl LibraryComment {
    pub fn new(
        item_id: EntityId,
        draft: LibraryCommentDraft,
        now: Timestamp,
    ) -> Result<Self, CoreError> {
        if draft.author.trim().is_empty() {
            return Err(CoreError::Validation("Comment author cannot be empty".into()));
        }
        let text = draft.text.trim();
        if text.is_empty() {
            return Err(CoreError::Validation("Comment text cannot be empty".into()));
        }
        if text.chars().count() > MAX_COMMENT_LENGTH {
            return Err(CoreError::Validation(format!(
                "Comment exceeds maximum length of {MAX_COMMENT_LENGTH} characters"
            )));
        }
        Ok(Self {
            id: new_id(),
            item_id,
            author: draft.author.trim().to_string(),
            text: text.to_string(),
            created_at: now,
        })
    }
}
