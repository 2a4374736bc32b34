//! Assistant chat history and tool usage counters.
//!
//! Like pro-tips, both live in the local cache only.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{new_id, EntityId, Timestamp};

pub const CHAT_LOG_CACHE_KEY: &str = "chat_log";
pub const TOOL_USAGE_CACHE_KEY: &str = "tool_usage";

/// Maximum length of one chat entry.
pub const MAX_CHAT_ENTRY_LENGTH: usize = 4000;

/// Entries kept in the chat log. Older entries are dropped first.
pub const MAX_CHAT_LOG_ENTRIES: usize = 200;

pub const MAX_TOOL_NAME_LENGTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub id: EntityId,
    pub role: ChatRole,
    pub text: String,
    pub created_at: Timestamp,
}

impl ChatEntry {
    pub fn new(role: ChatRole, text: &str, now: Timestamp) -> Result<Self, CoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CoreError::Validation("Chat entry cannot be empty".into()));
        }
        if text.chars().count() > MAX_CHAT_ENTRY_LENGTH {
            return Err(CoreError::Validation(format!(
                "Chat entry exceeds maximum length of {MAX_CHAT_ENTRY_LENGTH} characters"
            )));
        }
        Ok(Self {
            id: new_id(),
            role,
            text: text.to_string(),
            created_at: now,
        })
    }
}

/// Append `entry`, dropping the oldest entries past [`MAX_CHAT_LOG_ENTRIES`].
pub fn append_chat_entry(log: &mut Vec<ChatEntry>, entry: ChatEntry) {
    log.push(entry);
    if log.len() > MAX_CHAT_LOG_ENTRIES {
        let excess = log.len() - MAX_CHAT_LOG_ENTRIES;
        log.drain(..excess);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUsage {
    pub tool: String,
    pub count: u64,
    pub last_used_at: Timestamp,
}

/// Normalize a tool name: trimmed and lowercased.
pub fn normalize_tool_name(tool: &str) -> Result<String, CoreError> {
    let tool = tool.trim().to_lowercase();
    if tool.is_empty() {
        return Err(CoreError::Validation("Tool name cannot be empty".into()));
    }
    if tool.chars().count() > MAX_TOOL_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Tool name exceeds maximum length of {MAX_TOOL_NAME_LENGTH} characters"
        )));
    }
    Ok(tool)
}

/// Count one use of `tool`, returning the updated counter.
pub fn record_tool_use(
    usages: &mut Vec<ToolUsage>,
    tool: &str,
    now: Timestamp,
) -> Result<ToolUsage, CoreError> {
    let tool = normalize_tool_name(tool)?;
    if let Some(usage) = usages.iter_mut().find(|u| u.tool == tool) {
        usage.count += 1;
        usage.last_used_at = now;
        return Ok(usage.clone());
    }
    let usage = ToolUsage {
        tool,
        count: 1,
        last_used_at: now,
    };
    usages.push(usage.clone());
    Ok(usage)
}

/// Most used first, ties broken by most recent use.
pub fn sort_by_usage(usages: &mut [ToolUsage]) {
    usages.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| b.last_used_at.cmp(&a.last_used_at))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    // -- chat log --

    #[test]
    fn chat_entry_is_trimmed_and_validated() {
        let entry = ChatEntry::new(ChatRole::User, "  How long does wax cure? ", Utc::now()).unwrap();
        assert_eq!(entry.text, "How long does wax cure?");
        assert!(ChatEntry::new(ChatRole::Assistant, "   ", Utc::now()).is_err());
        let long = "a".repeat(MAX_CHAT_ENTRY_LENGTH + 1);
        assert!(ChatEntry::new(ChatRole::User, &long, Utc::now()).is_err());
    }

    #[test]
    fn log_drops_oldest_past_cap() {
        let now = Utc::now();
        let mut log = Vec::new();
        for i in 0..MAX_CHAT_LOG_ENTRIES + 3 {
            let entry = ChatEntry::new(ChatRole::User, &format!("msg {i}"), now).unwrap();
            append_chat_entry(&mut log, entry);
        }
        assert_eq!(log.len(), MAX_CHAT_LOG_ENTRIES);
        assert_eq!(log[0].text, "msg 3");
    }

    // -- tool usage --

    #[test]
    fn repeated_use_increments_one_counter() {
        let now = Utc::now();
        let mut usages = Vec::new();
        record_tool_use(&mut usages, "Quote Calculator", now).unwrap();
        let usage = record_tool_use(&mut usages, " quote calculator", now).unwrap();
        assert_eq!(usages.len(), 1);
        assert_eq!(usage.count, 2);
        assert_eq!(usage.tool, "quote calculator");
        assert!(record_tool_use(&mut usages, "  ", now).is_err());
    }

    #[test]
    fn sorted_by_count_then_recency() {
        let now = Utc::now();
        let mut usages = vec![
            ToolUsage { tool: "a".into(), count: 1, last_used_at: now },
            ToolUsage { tool: "b".into(), count: 3, last_used_at: now - Duration::hours(1) },
            ToolUsage { tool: "c".into(), count: 1, last_used_at: now + Duration::hours(1) },
        ];
        sort_by_usage(&mut usages);
        let order: Vec<_> = usages.iter().map(|u| u.tool.as_str()).collect();
        assert_eq!(order, ["b", "c", "a"]);
    }
}
