//! The full set of domain stores, each behind its own lock.

use std::sync::Arc;

use detailhq_core::assistant::{
    ChatEntry, ToolUsage, CHAT_LOG_CACHE_KEY, TOOL_USAGE_CACHE_KEY,
};
use detailhq_core::coupon::Coupon;
use detailhq_core::customer::Customer;
use detailhq_core::library::{LibraryComment, LibraryItem};
use detailhq_core::message::TeamMessage;
use detailhq_core::notes::{Note, Notebook, Section};
use detailhq_core::pro_tip::{ProTip, PRO_TIPS_CACHE_KEY};
use detailhq_core::record::Record;
use detailhq_core::task::Task;
use detailhq_events::ChangeEvent;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::cache::LocalCache;
use crate::collection::SyncStatus;
use crate::commands::{CommandSummary, FlushReport};
use crate::coupon_store::CouponStore;
use crate::customer_store::CustomerStore;
use crate::error::StoreError;
use crate::library_store::LibraryStore;
use crate::local_collection::LocalCollection;
use crate::message_store::MessageStore;
use crate::notes_store::NotesStore;
use crate::remote::RemoteFactory;
use crate::repository::{FallbackPolicy, Repository};
use crate::task_store::TaskStore;

/// Aggregate sync state across every store.
#[derive(Debug, Clone, Serialize)]
pub struct SyncSummary {
    pub status: SyncStatus,
    pub commands: Vec<CommandSummary>,
}

pub struct Stores {
    pub customers: Mutex<CustomerStore>,
    pub tasks: Mutex<TaskStore>,
    pub notes: Mutex<NotesStore>,
    pub coupons: Mutex<CouponStore>,
    pub library: Mutex<LibraryStore>,
    pub messages: Mutex<MessageStore>,
    pub pro_tips: Mutex<LocalCollection<ProTip>>,
    pub chat_log: Mutex<LocalCollection<ChatEntry>>,
    pub tool_usage: Mutex<LocalCollection<ToolUsage>>,
}

fn repo<T: Record>(
    remote: &impl RemoteFactory,
    cache: &Arc<dyn LocalCache>,
    policy: &FallbackPolicy,
) -> Repository<T> {
    Repository::new(remote.table::<T>(), Arc::clone(cache), policy.clone())
}

impl Stores {
    pub fn new(
        remote: &impl RemoteFactory,
        cache: Arc<dyn LocalCache>,
        policy: FallbackPolicy,
    ) -> Self {
        Self {
            customers: Mutex::new(CustomerStore::new(repo::<Customer>(remote, &cache, &policy))),
            tasks: Mutex::new(TaskStore::new(repo::<Task>(remote, &cache, &policy))),
            notes: Mutex::new(NotesStore::new(
                repo::<Notebook>(remote, &cache, &policy),
                repo::<Section>(remote, &cache, &policy),
                repo::<Note>(remote, &cache, &policy),
            )),
            coupons: Mutex::new(CouponStore::new(repo::<Coupon>(remote, &cache, &policy))),
            library: Mutex::new(LibraryStore::new(
                repo::<LibraryItem>(remote, &cache, &policy),
                repo::<LibraryComment>(remote, &cache, &policy),
            )),
            messages: Mutex::new(MessageStore::new(repo::<TeamMessage>(
                remote, &cache, &policy,
            ))),
            pro_tips: Mutex::new(LocalCollection::new(PRO_TIPS_CACHE_KEY, Arc::clone(&cache))),
            chat_log: Mutex::new(LocalCollection::new(CHAT_LOG_CACHE_KEY, Arc::clone(&cache))),
            tool_usage: Mutex::new(LocalCollection::new(TOOL_USAGE_CACHE_KEY, cache)),
        }
    }

    /// Initial load of every store through the unified read path.
    pub async fn load_all(&self) -> Result<(), StoreError> {
        self.customers.lock().await.refresh().await?;
        self.tasks.lock().await.refresh().await?;
        self.notes.lock().await.refresh().await?;
        self.coupons.lock().await.refresh().await?;
        self.library.lock().await.refresh().await?;
        self.messages.lock().await.refresh().await?;
        self.pro_tips.lock().await.load().await?;
        self.chat_log.lock().await.load().await?;
        self.tool_usage.lock().await.load().await?;
        Ok(())
    }

    /// Route a remote change to the collection that owns its table.
    ///
    /// Unknown tables are ignored. Returns whether any rows changed.
    pub async fn apply_change(&self, event: &ChangeEvent) -> Result<bool, serde_json::Error> {
        if event.is_for::<Customer>() {
            return self.customers.lock().await.collection_mut().apply_remote_change(event);
        }
        if event.is_for::<Task>() {
            return self.tasks.lock().await.collection_mut().apply_remote_change(event);
        }
        if event.is_for::<Notebook>() {
            return self.notes.lock().await.notebooks_mut().apply_remote_change(event);
        }
        if event.is_for::<Section>() {
            return self.notes.lock().await.sections_mut().apply_remote_change(event);
        }
        if event.is_for::<Note>() {
            return self.notes.lock().await.notes_mut().apply_remote_change(event);
        }
        if event.is_for::<Coupon>() {
            return self.coupons.lock().await.collection_mut().apply_remote_change(event);
        }
        if event.is_for::<LibraryItem>() {
            return self.library.lock().await.items_mut().apply_remote_change(event);
        }
        if event.is_for::<LibraryComment>() {
            return self.library.lock().await.comments_mut().apply_remote_change(event);
        }
        if event.is_for::<TeamMessage>() {
            return self.messages.lock().await.collection_mut().apply_remote_change(event);
        }
        Ok(false)
    }

    /// Status totals plus every tracked command.
    pub async fn sync_summary(&self) -> SyncSummary {
        let mut status = SyncStatus::default();
        let mut commands = Vec::new();

        {
            let mut store = self.customers.lock().await;
            status.merge(store.status());
            commands.extend(store.collection_mut().command_summaries());
        }
        {
            let mut store = self.tasks.lock().await;
            status.merge(store.status());
            commands.extend(store.collection_mut().command_summaries());
        }
        {
            let mut store = self.notes.lock().await;
            status.merge(store.status());
            commands.extend(store.notebooks_mut().command_summaries());
            commands.extend(store.sections_mut().command_summaries());
            commands.extend(store.notes_mut().command_summaries());
        }
        {
            let mut store = self.coupons.lock().await;
            status.merge(store.status());
            commands.extend(store.collection_mut().command_summaries());
        }
        {
            let mut store = self.library.lock().await;
            status.merge(store.status());
            commands.extend(store.items_mut().command_summaries());
            commands.extend(store.comments_mut().command_summaries());
        }
        {
            let mut store = self.messages.lock().await;
            status.merge(store.status());
            commands.extend(store.collection_mut().command_summaries());
        }

        commands.sort_by(|a, b| a.enqueued_at.cmp(&b.enqueued_at));
        SyncSummary { status, commands }
    }

    /// Retry every failed command in every store.
    pub async fn retry_all(&self) -> FlushReport {
        let mut report = self.customers.lock().await.retry_failed().await;
        report.merge(self.tasks.lock().await.retry_failed().await);
        report.merge(self.notes.lock().await.retry_failed().await);
        report.merge(self.coupons.lock().await.retry_failed().await);
        report.merge(self.library.lock().await.retry_failed().await);
        report.merge(self.messages.lock().await.retry_failed().await);
        tracing::info!(
            confirmed = report.confirmed,
            failed = report.failed,
            "Retried failed commands"
        );
        report
    }

    /// Drop confirmed command history everywhere.
    pub async fn prune_confirmed(&self) -> usize {
        let mut pruned = self.customers.lock().await.collection_mut().prune_confirmed();
        pruned += self.tasks.lock().await.collection_mut().prune_confirmed();
        {
            let mut notes = self.notes.lock().await;
            pruned += notes.notebooks_mut().prune_confirmed();
            pruned += notes.sections_mut().prune_confirmed();
            pruned += notes.notes_mut().prune_confirmed();
        }
        pruned += self.coupons.lock().await.collection_mut().prune_confirmed();
        {
            let mut library = self.library.lock().await;
            pruned += library.items_mut().prune_confirmed();
            pruned += library.comments_mut().prune_confirmed();
        }
        pruned += self.messages.lock().await.collection_mut().prune_confirmed();
        pruned
    }
}
