//! Team message feed.

use detailhq_core::error::CoreError;
use detailhq_core::message::{TeamMessage, TeamMessageDraft};
use detailhq_core::types::Timestamp;

use crate::collection::{SyncStatus, SyncedCollection};
use crate::commands::FlushReport;
use crate::error::StoreError;
use crate::repository::Repository;

pub struct MessageStore {
    messages: SyncedCollection<TeamMessage>,
}

impl MessageStore {
    pub fn new(repo: Repository<TeamMessage>) -> Self {
        Self {
            messages: SyncedCollection::new(repo),
        }
    }

    pub fn collection_mut(&mut self) -> &mut SyncedCollection<TeamMessage> {
        &mut self.messages
    }

    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        self.messages.refresh().await
    }

    pub async fn flush(&mut self) -> FlushReport {
        self.messages.flush().await
    }

    pub async fn retry_failed(&mut self) -> FlushReport {
        self.messages.retry_failed().await
    }

    pub fn status(&self) -> SyncStatus {
        self.messages.status()
    }

    /// Messages in chronological order.
    pub fn messages(&self) -> Vec<TeamMessage> {
        let mut out = self.messages.rows().to_vec();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        out
    }

    pub fn post(&mut self, draft: TeamMessageDraft, now: Timestamp) -> Result<TeamMessage, CoreError> {
        let message = TeamMessage::from_draft(draft, now)?;
        tracing::info!(message_id = %message.id, author = %message.author, "Team message posted");
        self.messages.insert(message.clone());
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRemote;
    use crate::remote::RemoteFactory;
    use crate::test_support::repo;
    use chrono::Utc;
    use detailhq_events::{ChangeEvent, ChangeKind};

    fn draft(body: &str) -> TeamMessageDraft {
        TeamMessageDraft {
            author: "alex".into(),
            body: body.into(),
        }
    }

    #[tokio::test]
    async fn remote_insert_appears_once() {
        let remote = MemoryRemote::new();
        let mut store = MessageStore::new(repo(&remote));
        store.post(draft("mine"), Utc::now()).unwrap();
        store.flush().await;

        let theirs = TeamMessage::from_draft(draft("theirs"), Utc::now()).unwrap();
        remote.table::<TeamMessage>().upsert(&theirs).await.unwrap();
        let event = ChangeEvent::upsert(ChangeKind::Insert, &theirs);
        store.collection_mut().apply_remote_change(&event).unwrap();
        store.collection_mut().apply_remote_change(&event).unwrap();

        let bodies: Vec<String> = store.messages().into_iter().map(|m| m.body).collect();
        assert_eq!(bodies, vec!["mine", "theirs"]);
    }
}
