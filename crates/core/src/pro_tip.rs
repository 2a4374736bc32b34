//! Custom pro-tips. These live in the local cache only and are never sent
//! to the remote store.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{new_id, EntityId, Timestamp};

/// Cache key holding every custom pro-tip.
pub const PRO_TIPS_CACHE_KEY: &str = "pro_tips";

/// Maximum length of a pro-tip.
pub const MAX_TIP_LENGTH: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProTip {
    pub id: EntityId,
    pub text: String,
    pub created_at: Timestamp,
}

impl ProTip {
    pub fn new(text: &str, now: Timestamp) -> Result<Self, CoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CoreError::Validation("Pro-tip cannot be empty".into()));
        }
        if text.chars().count() > MAX_TIP_LENGTH {
            return Err(CoreError::Validation(format!(
                "Pro-tip exceeds maximum length of {MAX_TIP_LENGTH} characters"
            )));
        }
        Ok(Self {
            id: new_id(),
            text: text.to_string(),
            created_at: now,
        })
    }
}
