//! In-memory rows of one table plus their command queue.
//!
//! Every domain store is built from one or more [`SyncedCollection`]s. The
//! collection owns the optimistic state; mutations go through [`insert`],
//! [`update_with`] and [`remove`], each of which enqueues a command.
//!
//! [`insert`]: SyncedCollection::insert
//! [`update_with`]: SyncedCollection::update_with
//! [`remove`]: SyncedCollection::remove

use detailhq_core::error::CoreError;
use detailhq_core::record::Record;
use detailhq_core::types::EntityId;
use detailhq_events::{ChangeEvent, ChangeKind};
use serde::Serialize;

use crate::commands::{CommandOp, CommandQueue, CommandStatus, CommandSummary, FlushReport};
use crate::error::StoreError;
use crate::repository::{ReadSource, Repository};

/// Sync state reported with every mutation and listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub pending: usize,
    pub failed: usize,
    pub confirmed: usize,
    /// Where the last read came from. `None` before the first load.
    pub source: Option<ReadSource>,
    pub warning: Option<String>,
}

impl SyncStatus {
    pub fn merge(&mut self, other: SyncStatus) {
        self.pending += other.pending;
        self.failed += other.failed;
        self.confirmed += other.confirmed;
        if other.source == Some(ReadSource::Cache) || self.source.is_none() {
            self.source = other.source;
        }
        if self.warning.is_none() {
            self.warning = other.warning;
        }
    }
}

pub struct SyncedCollection<T: Record> {
    repo: Repository<T>,
    rows: Vec<T>,
    queue: CommandQueue<T>,
    source: Option<ReadSource>,
    warning: Option<String>,
}

impl<T: Record> SyncedCollection<T> {
    pub fn new(repo: Repository<T>) -> Self {
        Self {
            repo,
            rows: Vec::new(),
            queue: CommandQueue::new(),
            source: None,
            warning: None,
        }
    }

    // -- reads --

    /// Reload rows through the unified read path.
    ///
    /// Unconfirmed local commands are replayed on top of the fresh rows, so a
    /// refresh never drops an optimistic change that has not reached the
    /// remote tier yet.
    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        let outcome = self.repo.read_all().await?;
        self.rows = outcome.rows;
        for cmd in self.queue.unconfirmed() {
            match &cmd.op {
                CommandOp::Upsert(record) => upsert_row(&mut self.rows, record.clone()),
                CommandOp::Delete => self.rows.retain(|r| r.id() != cmd.record_id),
            }
        }
        self.source = Some(outcome.source);
        self.warning = outcome.warning;
        Ok(())
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.rows.iter().find(|r| r.id() == id)
    }

    /// Like [`get`](Self::get) but a missing row is a `NotFound` error.
    pub fn require(&self, id: EntityId) -> Result<&T, CoreError> {
        self.get(id).ok_or_else(|| CoreError::not_found(T::ENTITY, id))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    // -- optimistic writes --

    /// Append a new row.
    pub fn insert(&mut self, record: T) {
        self.queue
            .enqueue(record.id(), CommandOp::Upsert(record.clone()));
        upsert_row(&mut self.rows, record);
    }

    /// Mutate the row `id` through `f`.
    ///
    /// `f` works on a copy; the stored row only changes, and a command is
    /// only enqueued, when `f` succeeds.
    pub fn update_with<R>(
        &mut self,
        id: EntityId,
        f: impl FnOnce(&mut T) -> Result<R, CoreError>,
    ) -> Result<R, CoreError> {
        let index = self
            .rows
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| CoreError::not_found(T::ENTITY, id))?;
        let mut draft = self.rows[index].clone();
        let out = f(&mut draft)?;
        self.queue.enqueue(id, CommandOp::Upsert(draft.clone()));
        self.rows[index] = draft;
        Ok(out)
    }

    pub fn remove(&mut self, id: EntityId) -> Result<T, CoreError> {
        let index = self
            .rows
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| CoreError::not_found(T::ENTITY, id))?;
        let removed = self.rows.remove(index);
        self.queue.enqueue(id, CommandOp::Delete);
        Ok(removed)
    }

    /// Remove every row matching `pred`, returning the removed ids.
    pub fn remove_where(&mut self, pred: impl Fn(&T) -> bool) -> Vec<EntityId> {
        let ids: Vec<EntityId> = self
            .rows
            .iter()
            .filter(|r| pred(*r))
            .map(|r| r.id())
            .collect();
        for id in &ids {
            self.rows.retain(|r| r.id() != *id);
            self.queue.enqueue(*id, CommandOp::Delete);
        }
        ids
    }

    // -- sync --

    /// Send pending commands to the remote tier.
    ///
    /// After the pass the cache snapshot is refreshed: on full success when
    /// the policy writes through, on any failure when it snapshots on
    /// failure.
    pub async fn flush(&mut self) -> FlushReport {
        let report = self.queue.flush(self.repo.remote()).await;
        self.after_flush(report).await;
        report
    }

    pub async fn retry_failed(&mut self) -> FlushReport {
        let report = self.queue.retry_failed(self.repo.remote()).await;
        self.after_flush(report).await;
        report
    }

    async fn after_flush(&self, report: FlushReport) {
        let policy = self.repo.policy();
        let snapshot = if report.failed > 0 {
            policy.snapshot_on_failure
        } else {
            report.confirmed > 0 && policy.write_through
        };
        if snapshot {
            if let Err(e) = self.repo.save_snapshot(&self.rows).await {
                tracing::warn!(table = T::TABLE, error = %e, "Failed to write cache snapshot");
            }
        }
    }

    pub fn prune_confirmed(&mut self) -> usize {
        self.queue.prune_confirmed()
    }

    pub fn command_summaries(&self) -> Vec<CommandSummary> {
        self.queue.summaries()
    }

    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            pending: self.queue.count(CommandStatus::Pending),
            failed: self.queue.count(CommandStatus::Failed),
            confirmed: self.queue.count(CommandStatus::Confirmed),
            source: self.source,
            warning: self.warning.clone(),
        }
    }

    // -- realtime --

    /// Apply a change observed on the remote tier.
    ///
    /// Idempotent by record id: an insert for a known id replaces the row,
    /// a delete for an unknown id does nothing. Rows with unconfirmed local
    /// commands keep their optimistic state. Returns whether the rows
    /// changed.
    pub fn apply_remote_change(&mut self, event: &ChangeEvent) -> Result<bool, serde_json::Error> {
        if !event.is_for::<T>() || self.queue.has_unconfirmed(event.record_id) {
            return Ok(false);
        }
        match event.kind {
            ChangeKind::Insert | ChangeKind::Update => {
                let record: T = event.decode()?;
                if self.get(record.id()).is_some_and(|existing| same_row(existing, &record)) {
                    return Ok(false);
                }
                upsert_row(&mut self.rows, record);
                Ok(true)
            }
            ChangeKind::Delete => {
                let before = self.rows.len();
                self.rows.retain(|r| r.id() != event.record_id);
                Ok(self.rows.len() != before)
            }
        }
    }
}

fn upsert_row<T: Record>(rows: &mut Vec<T>, record: T) {
    match rows.iter_mut().find(|r| r.id() == record.id()) {
        Some(existing) => *existing = record,
        None => rows.push(record),
    }
}

fn same_row<T: Record>(a: &T, b: &T) -> bool {
    match (serde_json::to_value(a), serde_json::to_value(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::cache::MemoryCache;
    use crate::memory::MemoryRemote;
    use crate::remote::RemoteFactory;
    use crate::repository::FallbackPolicy;
    use chrono::Utc;
    use detailhq_core::message::{TeamMessage, TeamMessageDraft};

    fn message(body: &str) -> TeamMessage {
        TeamMessage::from_draft(
            TeamMessageDraft {
                author: "sam".into(),
                body: body.into(),
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn collection(remote: &MemoryRemote, cache: Arc<MemoryCache>) -> SyncedCollection<TeamMessage> {
        SyncedCollection::new(Repository::new(
            remote.table::<TeamMessage>(),
            cache,
            FallbackPolicy::default(),
        ))
    }

    // -- update_with --

    #[tokio::test]
    async fn failed_update_changes_nothing() {
        let remote = MemoryRemote::new();
        let mut col = collection(&remote, Arc::new(MemoryCache::new()));
        let msg = message("keep");
        col.insert(msg.clone());
        col.flush().await;

        let result: Result<(), CoreError> = col.update_with(msg.id, |m| {
            m.body = "changed".into();
            Err(CoreError::Validation("nope".into()))
        });
        assert!(result.is_err());
        assert_eq!(col.get(msg.id).unwrap().body, "keep");
        assert_eq!(col.status().pending, 0);
    }

    #[tokio::test]
    async fn update_of_unknown_row_is_not_found() {
        let remote = MemoryRemote::new();
        let mut col = collection(&remote, Arc::new(MemoryCache::new()));
        let result = col.update_with(uuid::Uuid::nil(), |_| Ok(()));
        assert!(matches!(result, Err(CoreError::NotFound { .. })));
    }

    // -- flush / snapshot --

    #[tokio::test]
    async fn failed_flush_snapshots_optimistic_rows() {
        let remote = MemoryRemote::new();
        let cache = Arc::new(MemoryCache::new());
        let mut col = collection(&remote, cache.clone());
        remote.set_online(false);

        let msg = message("offline");
        col.insert(msg.clone());
        let report = col.flush().await;
        assert_eq!(report.failed, 1);
        assert_eq!(col.status().failed, 1);

        // A second collection over the same cache sees the optimistic row.
        let mut other = collection(&remote, cache);
        other.refresh().await.unwrap();
        assert_eq!(other.rows(), &[msg]);
        assert_eq!(other.status().warning.as_deref(), Some("Using local cache"));
    }

    #[tokio::test]
    async fn refresh_keeps_unconfirmed_changes() {
        let remote = MemoryRemote::new();
        let mut col = collection(&remote, Arc::new(MemoryCache::new()));
        let confirmed = message("confirmed");
        col.insert(confirmed.clone());
        col.flush().await;

        remote.set_online(false);
        let local = message("local");
        col.insert(local.clone());
        col.flush().await;
        remote.set_online(true);

        col.refresh().await.unwrap();
        assert_eq!(col.rows(), &[confirmed, local]);
        assert_eq!(col.status().source, Some(ReadSource::Remote));
    }

    // -- apply_remote_change --

    #[tokio::test]
    async fn duplicate_insert_event_does_not_duplicate_row() {
        let remote = MemoryRemote::new();
        let mut col = collection(&remote, Arc::new(MemoryCache::new()));
        let msg = message("hello");
        let event = ChangeEvent::upsert(ChangeKind::Insert, &msg);

        assert!(col.apply_remote_change(&event).unwrap());
        assert!(!col.apply_remote_change(&event).unwrap());
        assert_eq!(col.rows().len(), 1);
    }

    #[tokio::test]
    async fn delete_of_unknown_id_is_noop() {
        let remote = MemoryRemote::new();
        let mut col = collection(&remote, Arc::new(MemoryCache::new()));
        let event = ChangeEvent::delete::<TeamMessage>(uuid::Uuid::nil());
        assert!(!col.apply_remote_change(&event).unwrap());
    }

    #[tokio::test]
    async fn events_for_other_tables_ignored() {
        let remote = MemoryRemote::new();
        let mut col = collection(&remote, Arc::new(MemoryCache::new()));
        let mut event = ChangeEvent::upsert(ChangeKind::Insert, &message("x"));
        event.table = "tasks".into();
        assert!(!col.apply_remote_change(&event).unwrap());
        assert!(col.rows().is_empty());
    }

    #[tokio::test]
    async fn unconfirmed_local_row_wins_over_remote_event() {
        let remote = MemoryRemote::new();
        let mut col = collection(&remote, Arc::new(MemoryCache::new()));
        let msg = message("mine");
        col.insert(msg.clone());

        let mut theirs = msg.clone();
        theirs.body = "theirs".into();
        let event = ChangeEvent::upsert(ChangeKind::Update, &theirs);
        assert!(!col.apply_remote_change(&event).unwrap());
        assert_eq!(col.get(msg.id).unwrap().body, "mine");
    }
}
