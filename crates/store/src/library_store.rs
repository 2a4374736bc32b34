//! Media library items and their comment threads.

use detailhq_core::error::CoreError;
use detailhq_core::library::{LibraryComment, LibraryCommentDraft, LibraryItem, LibraryItemDraft};
use detailhq_core::types::{EntityId, Timestamp};

use crate::collection::{SyncStatus, SyncedCollection};
use crate::commands::FlushReport;
use crate::error::StoreError;
use crate::repository::Repository;

pub struct LibraryStore {
    items: SyncedCollection<LibraryItem>,
    comments: SyncedCollection<LibraryComment>,
}

impl LibraryStore {
    pub fn new(items: Repository<LibraryItem>, comments: Repository<LibraryComment>) -> Self {
        Self {
            items: SyncedCollection::new(items),
            comments: SyncedCollection::new(comments),
        }
    }

    pub fn items_mut(&mut self) -> &mut SyncedCollection<LibraryItem> {
        &mut self.items
    }

    pub fn comments_mut(&mut self) -> &mut SyncedCollection<LibraryComment> {
        &mut self.comments
    }

    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        self.items.refresh().await?;
        self.comments.refresh().await
    }

    pub async fn flush(&mut self) -> FlushReport {
        let mut report = self.items.flush().await;
        report.merge(self.comments.flush().await);
        report
    }

    pub async fn retry_failed(&mut self) -> FlushReport {
        let mut report = self.items.retry_failed().await;
        report.merge(self.comments.retry_failed().await);
        report
    }

    pub fn status(&self) -> SyncStatus {
        let mut status = self.items.status();
        status.merge(self.comments.status());
        status
    }

    /// Items, newest first, optionally limited to one category.
    pub fn items(&self, category: Option<&str>) -> Vec<LibraryItem> {
        let mut items: Vec<LibraryItem> = self
            .items
            .rows()
            .iter()
            .filter(|i| {
                category.is_none_or(|c| {
                    i.category
                        .as_deref()
                        .is_some_and(|ic| ic.eq_ignore_ascii_case(c))
                })
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items
    }

    pub fn get(&self, id: EntityId) -> Result<&LibraryItem, CoreError> {
        self.items.require(id)
    }

    pub fn create_item(
        &mut self,
        draft: LibraryItemDraft,
        now: Timestamp,
    ) -> Result<LibraryItem, CoreError> {
        let item = LibraryItem::from_draft(draft, now)?;
        tracing::info!(item_id = %item.id, title = %item.title, "Library item created");
        self.items.insert(item.clone());
        Ok(item)
    }

    pub fn update_item(
        &mut self,
        id: EntityId,
        draft: LibraryItemDraft,
        now: Timestamp,
    ) -> Result<LibraryItem, CoreError> {
        self.items.update_with(id, |item| {
            item.apply_draft(draft, now)?;
            Ok(item.clone())
        })
    }

    /// Delete an item and every comment on it.
    pub fn delete_item(&mut self, id: EntityId) -> Result<LibraryItem, CoreError> {
        let item = self.items.remove(id)?;
        let removed = self.comments.remove_where(|c| c.item_id == id);
        tracing::info!(item_id = %id, comments = removed.len(), "Library item deleted");
        Ok(item)
    }

    /// Comments on `item_id`, oldest first.
    pub fn comments_for(&self, item_id: EntityId) -> Vec<LibraryComment> {
        let mut comments: Vec<LibraryComment> = self
            .comments
            .rows()
            .iter()
            .filter(|c| c.item_id == item_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        comments
    }

    pub fn add_comment(
        &mut self,
        item_id: EntityId,
        draft: LibraryCommentDraft,
        now: Timestamp,
    ) -> Result<LibraryComment, CoreError> {
        self.items.require(item_id)?;
        let comment = LibraryComment::new(item_id, draft, now)?;
        tracing::info!(item_id = %item_id, comment_id = %comment.id, "Library comment added");
        self.comments.insert(comment.clone());
        Ok(comment)
    }
}
