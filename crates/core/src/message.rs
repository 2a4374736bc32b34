//! Team chat messages. New rows reach other clients through the real-time
//! INSERT channel.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::impl_record;
use crate::types::{new_id, EntityId, Timestamp};

/// Maximum length of a team message body.
pub const MAX_MESSAGE_LENGTH: usize = 4_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMessage {
    pub id: EntityId,
    pub author: String,
    pub body: String,
    pub created_at: Timestamp,
}

impl_record!(TeamMessage, "team_messages", "TeamMessage");

#[derive(Debug, Clone, Deserialize)]
pub struct TeamMessageDraft {
    pub author: String,
    pub body: String,
}

impl TeamMessage {
    pub fn from_draft(draft: TeamMessageDraft, now: Timestamp) -> Result<Self, CoreError> {
        if draft.author.trim().is_empty() {
            return Err(CoreError::Validation("Message author cannot be empty".into()));
        }
        let body = draft.body.trim();
        if body.is_empty() {
            return Err(CoreError::Validation("Message body cannot be empty".into()));
        }
        if body.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(CoreError::Validation(format!(
                "Message exceeds maximum length of {MAX_MESSAGE_LENGTH} characters"
            )));
        }
        Ok(Self {
            id: new_id(),
            author: draft.author.trim().to_string(),
            body: body.to_string(),
            created_at: now,
        })
    }
}
