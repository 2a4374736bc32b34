//! Task store: optimistic task mutations, manual ordering and derived views.

use chrono::NaiveDateTime;
use detailhq_core::error::CoreError;
use detailhq_core::task::{
    next_order, sort_tasks, splice_move, view, Task, TaskComment, TaskDraft, TaskFilter,
    TaskPatch, TaskStatus,
};
use detailhq_core::types::{EntityId, Timestamp};

use crate::collection::{SyncStatus, SyncedCollection};
use crate::commands::FlushReport;
use crate::error::StoreError;
use crate::repository::Repository;

pub struct TaskStore {
    tasks: SyncedCollection<Task>,
}

impl TaskStore {
    pub fn new(repo: Repository<Task>) -> Self {
        Self {
            tasks: SyncedCollection::new(repo),
        }
    }

    pub fn collection(&self) -> &SyncedCollection<Task> {
        &self.tasks
    }

    pub fn collection_mut(&mut self) -> &mut SyncedCollection<Task> {
        &mut self.tasks
    }

    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        self.tasks.refresh().await
    }

    pub async fn flush(&mut self) -> FlushReport {
        self.tasks.flush().await
    }

    pub async fn retry_failed(&mut self) -> FlushReport {
        self.tasks.retry_failed().await
    }

    pub fn status(&self) -> SyncStatus {
        self.tasks.status()
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.rows()
    }

    pub fn get(&self, id: EntityId) -> Result<&Task, CoreError> {
        self.tasks.require(id)
    }

    // -- mutations --

    /// Create a task at the end of the manual ordering.
    pub fn add(&mut self, draft: TaskDraft, now: Timestamp) -> Result<Task, CoreError> {
        let order = next_order(self.tasks.rows());
        let task = Task::from_draft(draft, order, now)?;
        tracing::info!(task_id = %task.id, order, "Task created");
        self.tasks.insert(task.clone());
        Ok(task)
    }

    pub fn update(
        &mut self,
        id: EntityId,
        patch: TaskPatch,
        now: Timestamp,
    ) -> Result<Task, CoreError> {
        let task = self.tasks.update_with(id, |t| {
            t.apply_patch(patch, now)?;
            Ok(t.clone())
        })?;
        tracing::info!(task_id = %id, "Task updated");
        Ok(task)
    }

    pub fn remove(&mut self, id: EntityId) -> Result<Task, CoreError> {
        let task = self.tasks.remove(id)?;
        tracing::info!(task_id = %id, "Task deleted");
        Ok(task)
    }

    /// Assign `order = index` to each listed id.
    ///
    /// Unknown ids are skipped and tasks missing from `ids` keep their
    /// order. Returns how many tasks changed.
    pub fn reorder(&mut self, ids: &[EntityId], now: Timestamp) -> usize {
        let mut changed = 0;
        for (index, id) in ids.iter().enumerate() {
            let order = index as i64;
            let Some(task) = self.tasks.get(*id) else {
                continue;
            };
            if task.order == order {
                continue;
            }
            let updated = self.tasks.update_with(*id, |t| {
                t.order = order;
                t.updated_at = now;
                Ok(())
            });
            if updated.is_ok() {
                changed += 1;
            }
        }
        tracing::info!(count = ids.len(), changed, "Tasks reordered");
        changed
    }

    /// Move `id` to `to_index` within the current manual ordering.
    pub fn move_task(
        &mut self,
        id: EntityId,
        to_index: usize,
        now: Timestamp,
    ) -> Result<usize, CoreError> {
        let mut ordered: Vec<&Task> = self.tasks.rows().iter().collect();
        sort_tasks(&mut ordered, false);
        let ids: Vec<EntityId> = ordered.iter().map(|t| t.id).collect();
        let spliced =
            splice_move(&ids, id, to_index).ok_or_else(|| CoreError::not_found("Task", id))?;
        Ok(self.reorder(&spliced, now))
    }

    /// Mark every listed task completed. Unknown and already finished tasks
    /// are skipped. Returns the ids that changed.
    pub fn bulk_complete(&mut self, ids: &[EntityId], now: Timestamp) -> Vec<EntityId> {
        let mut completed = Vec::new();
        for id in ids {
            let done = self.tasks.get(*id).map(|t| t.status.is_done());
            if done == Some(false) {
                let result = self.tasks.update_with(*id, |t| {
                    t.set_status(TaskStatus::Completed, now);
                    Ok(())
                });
                if result.is_ok() {
                    completed.push(*id);
                }
            }
        }
        tracing::info!(count = completed.len(), "Tasks bulk completed");
        completed
    }

    /// Delete every listed task. Returns the ids actually removed.
    pub fn bulk_delete(&mut self, ids: &[EntityId]) -> Vec<EntityId> {
        let removed = self.tasks.remove_where(|t| ids.contains(&t.id));
        tracing::info!(count = removed.len(), "Tasks bulk deleted");
        removed
    }

    pub fn add_comment(
        &mut self,
        id: EntityId,
        author: &str,
        text: &str,
        now: Timestamp,
    ) -> Result<TaskComment, CoreError> {
        let comment = self
            .tasks
            .update_with(id, |t| t.add_comment(author, text, now))?;
        tracing::info!(task_id = %id, comment_id = %comment.id, "Task comment added");
        Ok(comment)
    }

    pub fn mark_read(&mut self, id: EntityId, user: &str, now: Timestamp) -> Result<Task, CoreError> {
        self.tasks.update_with(id, |t| {
            t.mark_read(user, now)?;
            Ok(t.clone())
        })
    }

    /// Flip one checklist item, returning its new `done` value.
    pub fn toggle_checklist_item(
        &mut self,
        task_id: EntityId,
        item_id: EntityId,
        now: Timestamp,
    ) -> Result<bool, CoreError> {
        self.tasks
            .update_with(task_id, |t| t.toggle_checklist_item(item_id, now))
    }

    // -- views --

    pub fn view(
        &self,
        filter: TaskFilter,
        user: Option<&str>,
        now: NaiveDateTime,
        priority_sort: bool,
    ) -> Vec<Task> {
        view(self.tasks.rows(), filter, user, now, priority_sort)
            .into_iter()
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRemote;
    use crate::remote::RemoteFactory;
    use crate::test_support::repo;
    use assert_matches::assert_matches;
    use chrono::{NaiveDate, TimeZone, Utc};
    use detailhq_core::task::Priority;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
    }

    fn draft(title: &str) -> TaskDraft {
        TaskDraft {
            title: title.into(),
            ..Default::default()
        }
    }

    fn store() -> (MemoryRemote, TaskStore) {
        let remote = MemoryRemote::new();
        let store = TaskStore::new(repo(&remote));
        (remote, store)
    }

    fn titles(store: &TaskStore, priority_sort: bool) -> Vec<String> {
        store
            .view(TaskFilter::All, None, now().naive_utc(), priority_sort)
            .into_iter()
            .map(|t| t.title)
            .collect()
    }

    // -- add --

    #[test]
    fn add_appends_in_order() {
        let (_remote, mut store) = store();
        let a = store.add(draft("a"), now()).unwrap();
        let b = store.add(draft("b"), now()).unwrap();
        assert_eq!(a.order, 0);
        assert_eq!(b.order, 1);
        assert_eq!(store.status().pending, 2);
    }

    #[test]
    fn invalid_title_leaves_state_untouched() {
        let (_remote, mut store) = store();
        assert_matches!(store.add(draft("  "), now()), Err(CoreError::Validation(_)));
        assert!(store.tasks().is_empty());
        assert_eq!(store.status().pending, 0);
    }

    // -- reorder / move --

    #[test]
    fn reorder_assigns_indices_and_ignores_unknown_ids() {
        let (_remote, mut store) = store();
        let a = store.add(draft("a"), now()).unwrap();
        let b = store.add(draft("b"), now()).unwrap();
        let c = store.add(draft("c"), now()).unwrap();

        store.reorder(&[c.id, uuid::Uuid::nil(), a.id], now());
        // c -> 0, a -> 2, b untouched at 1.
        assert_eq!(store.get(c.id).unwrap().order, 0);
        assert_eq!(store.get(b.id).unwrap().order, 1);
        assert_eq!(store.get(a.id).unwrap().order, 2);
        assert_eq!(titles(&store, false), vec!["c", "b", "a"]);
    }

    #[test]
    fn move_splices_within_current_order() {
        let (_remote, mut store) = store();
        let a = store.add(draft("a"), now()).unwrap();
        store.add(draft("b"), now()).unwrap();
        store.add(draft("c"), now()).unwrap();

        store.move_task(a.id, 2, now()).unwrap();
        assert_eq!(titles(&store, false), vec!["b", "c", "a"]);
        assert_matches!(
            store.move_task(uuid::Uuid::nil(), 0, now()),
            Err(CoreError::NotFound { .. })
        );
    }

    #[test]
    fn priority_sort_then_manual_order() {
        let (_remote, mut store) = store();
        let mut low = draft("low");
        low.priority = Priority::Low;
        let mut urgent = draft("urgent");
        urgent.priority = Priority::Urgent;
        store.add(low, now()).unwrap();
        store.add(draft("medium-1"), now()).unwrap();
        store.add(urgent, now()).unwrap();
        store.add(draft("medium-2"), now()).unwrap();

        assert_eq!(
            titles(&store, true),
            vec!["urgent", "medium-1", "medium-2", "low"]
        );
        assert_eq!(
            titles(&store, false),
            vec!["low", "medium-1", "urgent", "medium-2"]
        );
    }

    // -- bulk --

    #[test]
    fn bulk_complete_sets_completed_at() {
        let (_remote, mut store) = store();
        let a = store.add(draft("a"), now()).unwrap();
        let b = store.add(draft("b"), now()).unwrap();

        let done = store.bulk_complete(&[a.id, b.id, uuid::Uuid::nil()], now());
        assert_eq!(done, vec![a.id, b.id]);
        let a = store.get(a.id).unwrap();
        assert_eq!(a.status, TaskStatus::Completed);
        assert_eq!(a.completed_at, Some(now()));

        assert!(store.bulk_complete(&[b.id], now()).is_empty());
    }

    #[test]
    fn bulk_delete_removes_listed() {
        let (_remote, mut store) = store();
        let a = store.add(draft("a"), now()).unwrap();
        let b = store.add(draft("b"), now()).unwrap();
        assert_eq!(store.bulk_delete(&[a.id]), vec![a.id]);
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.tasks()[0].id, b.id);
    }

    // -- checklist / comments / receipts --

    #[test]
    fn double_toggle_restores_item_and_spares_siblings() {
        let (_remote, mut store) = store();
        let mut d = draft("wash");
        d.checklist = vec!["rinse".into(), "dry".into()];
        let task = store.add(d, now()).unwrap();
        let first = task.checklist[0].id;

        assert!(store.toggle_checklist_item(task.id, first, now()).unwrap());
        assert!(!store.toggle_checklist_item(task.id, first, now()).unwrap());
        let after = store.get(task.id).unwrap();
        assert_eq!(after.checklist, task.checklist);
    }

    #[test]
    fn mark_read_is_unique_per_user() {
        let (_remote, mut store) = store();
        let task = store.add(draft("a"), now()).unwrap();
        store.mark_read(task.id, "alex", now()).unwrap();
        let later = now() + chrono::Duration::hours(1);
        let t = store.mark_read(task.id, "alex", later).unwrap();
        assert_eq!(t.read_by.len(), 1);
        assert_eq!(t.read_by[0].viewed_at, later);
    }

    #[test]
    fn comment_appended() {
        let (_remote, mut store) = store();
        let task = store.add(draft("a"), now()).unwrap();
        let c = store.add_comment(task.id, "sam", "done soon", now()).unwrap();
        assert_eq!(store.get(task.id).unwrap().comments, vec![c]);
        assert!(store.add_comment(task.id, "sam", " ", now()).is_err());
    }

    // -- views --

    #[test]
    fn overdue_and_today_views() {
        let (_remote, mut store) = store();
        let mut past = draft("past");
        past.due_date = NaiveDate::from_ymd_opt(2026, 3, 9);
        let mut today = draft("today");
        today.due_date = NaiveDate::from_ymd_opt(2026, 3, 10);
        let mut later = draft("later");
        later.due_date = NaiveDate::from_ymd_opt(2026, 3, 12);
        store.add(past, now()).unwrap();
        store.add(today, now()).unwrap();
        store.add(later, now()).unwrap();

        let at = now().naive_utc();
        let overdue = store.view(TaskFilter::Overdue, None, at, false);
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].title, "past");
        assert_eq!(store.view(TaskFilter::Today, None, at, false)[0].title, "today");
        assert_eq!(store.view(TaskFilter::Upcoming, None, at, false)[0].title, "later");
    }

    // -- sync --

    #[tokio::test]
    async fn flush_writes_to_remote() {
        let (remote, mut store) = store();
        store.add(draft("a"), now()).unwrap();
        let report = store.flush().await;
        assert_eq!(report.confirmed, 1);
        let rows = remote.table::<Task>().fetch_all().await.unwrap();
        assert_eq!(rows.len(), 1);
    }
}
