//! Task model, validation and derived views.
//!
//! Views (`all`, `mine`, `overdue`, `today`, `upcoming`) are computed from the
//! stored tasks against a caller-supplied "now"; nothing about a view is
//! persisted. Manual ordering is a plain integer index rewritten on every
//! reorder.

use std::borrow::Borrow;
use std::cmp::Reverse;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::impl_record;
use crate::types::{new_id, EntityId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a task title in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length of a single task comment.
pub const MAX_COMMENT_LENGTH: usize = 2_000;

/// Maximum length of a checklist item.
pub const MAX_CHECKLIST_TEXT_LENGTH: usize = 300;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Task priority. Declaration order is rank order: `low < medium < high < urgent`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Numeric rank, higher is more important.
    pub fn rank(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
            Self::Urgent => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Urgent => "Urgent",
        }
    }
}

/// Task workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Waiting,
    Completed,
    Acknowledged,
}

impl TaskStatus {
    /// All statuses in workflow order.
    pub const ALL: [TaskStatus; 5] = [
        Self::NotStarted,
        Self::InProgress,
        Self::Waiting,
        Self::Completed,
        Self::Acknowledged,
    ];

    /// Completed and acknowledged tasks are done.
    pub fn is_done(self) -> bool {
        matches!(self, Self::Completed | Self::Acknowledged)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not started",
            Self::InProgress => "In progress",
            Self::Waiting => "Waiting",
            Self::Completed => "Completed",
            Self::Acknowledged => "Acknowledged",
        }
    }
}

// ---------------------------------------------------------------------------
// Owned sub-records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: EntityId,
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

impl ChecklistItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            text: text.into(),
            done: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: EntityId,
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskComment {
    pub id: EntityId,
    pub author: String,
    pub text: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadReceipt {
    pub user: String,
    pub viewed_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub comments: Vec<TaskComment>,
    #[serde(default)]
    pub read_by: Vec<ReadReceipt>,
    #[serde(default)]
    pub order: i64,
    pub created_by: Option<String>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl_record!(Task, "tasks", "Task");

/// Form input for creating a task.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub assignees: Vec<String>,
    /// Checklist item texts; ids are generated.
    #[serde(default)]
    pub checklist: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub created_by: Option<String>,
}

/// Partial update. Absent fields are left untouched; `due_date`/`due_time`
/// distinguish "absent" from an explicit `null` that clears the value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_time: Option<Option<NaiveTime>>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub assignees: Option<Vec<String>>,
    pub checklist: Option<Vec<ChecklistItem>>,
    pub attachments: Option<Vec<Attachment>>,
    pub order: Option<i64>,
}

/// Upper bound on a manual index set through a patch.
pub const MAX_TASK_ORDER: i64 = 1_000_000_000;

fn validate_order(order: i64) -> Result<(), CoreError> {
    if !(0..=MAX_TASK_ORDER).contains(&order) {
        return Err(CoreError::Validation(format!(
            "Task order must be between 0 and {MAX_TASK_ORDER}"
        )));
    }
    Ok(())
}

fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Validate a task title: non-blank and within the length limit.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Task title cannot be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Task title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

fn validate_checklist_text(text: &str) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::Validation(
            "Checklist item cannot be empty".to_string(),
        ));
    }
    if text.chars().count() > MAX_CHECKLIST_TEXT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Checklist item exceeds maximum length of {MAX_CHECKLIST_TEXT_LENGTH} characters"
        )));
    }
    Ok(())
}

fn clean_assignees(assignees: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(assignees.len());
    for name in assignees {
        let name = name.trim().to_string();
        if !name.is_empty() && !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

impl Task {
    /// Build a task from a draft, placing it at manual index `order`.
    pub fn from_draft(draft: TaskDraft, order: i64, now: Timestamp) -> Result<Self, CoreError> {
        validate_title(&draft.title)?;
        for text in &draft.checklist {
            validate_checklist_text(text)?;
        }
        let mut task = Self {
            id: new_id(),
            title: draft.title.trim().to_string(),
            description: draft.description,
            due_date: draft.due_date,
            due_time: draft.due_time,
            priority: draft.priority,
            status: TaskStatus::NotStarted,
            assignees: clean_assignees(draft.assignees),
            checklist: draft
                .checklist
                .into_iter()
                .map(|t| ChecklistItem::new(t.trim()))
                .collect(),
            attachments: draft.attachments,
            comments: Vec::new(),
            read_by: Vec::new(),
            order,
            created_by: draft.created_by,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        task.set_status(draft.status, now);
        Ok(task)
    }

    /// Apply a partial update. Validation happens before any field changes.
    pub fn apply_patch(&mut self, patch: TaskPatch, now: Timestamp) -> Result<(), CoreError> {
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        if let Some(items) = &patch.checklist {
            for item in items {
                validate_checklist_text(&item.text)?;
            }
        }
        if let Some(order) = patch.order {
            validate_order(order)?;
        }

        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(due_time) = patch.due_time {
            self.due_time = due_time;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(assignees) = patch.assignees {
            self.assignees = clean_assignees(assignees);
        }
        if let Some(checklist) = patch.checklist {
            self.checklist = checklist;
        }
        if let Some(attachments) = patch.attachments {
            self.attachments = attachments;
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
        if let Some(status) = patch.status {
            self.set_status(status, now);
        }
        self.updated_at = now;
        Ok(())
    }

    /// Change status, maintaining `completed_at`.
    pub fn set_status(&mut self, status: TaskStatus, now: Timestamp) {
        match (self.status.is_done(), status.is_done()) {
            (false, true) => self.completed_at = Some(now),
            (_, false) => self.completed_at = None,
            (true, true) => {}
        }
        self.status = status;
        self.updated_at = now;
    }

    /// The wall-clock moment the task is due. A date without a time is due
    /// at the end of that day.
    pub fn due_at(&self) -> Option<NaiveDateTime> {
        let date = self.due_date?;
        let time = self
            .due_time
            .unwrap_or_else(|| NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN));
        Some(date.and_time(time))
    }

    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        !self.status.is_done() && self.due_at().is_some_and(|due| due < now)
    }

    pub fn is_assigned_to(&self, user: &str) -> bool {
        self.assignees.iter().any(|a| a.eq_ignore_ascii_case(user))
    }

    /// `(done, total)` checklist counts.
    pub fn checklist_progress(&self) -> (usize, usize) {
        let done = self.checklist.iter().filter(|i| i.done).count();
        (done, self.checklist.len())
    }

    /// Flip one checklist item's `done` flag, returning the new value.
    pub fn toggle_checklist_item(
        &mut self,
        item_id: EntityId,
        now: Timestamp,
    ) -> Result<bool, CoreError> {
        let item = self
            .checklist
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| CoreError::not_found("ChecklistItem", item_id))?;
        item.done = !item.done;
        let done = item.done;
        self.updated_at = now;
        Ok(done)
    }

    /// Append a comment authored by `author`.
    pub fn add_comment(
        &mut self,
        author: &str,
        text: &str,
        now: Timestamp,
    ) -> Result<TaskComment, CoreError> {
        if author.trim().is_empty() {
            return Err(CoreError::Validation(
                "Comment author cannot be empty".to_string(),
            ));
        }
        if text.trim().is_empty() {
            return Err(CoreError::Validation(
                "Comment text cannot be empty".to_string(),
            ));
        }
        if text.chars().count() > MAX_COMMENT_LENGTH {
            return Err(CoreError::Validation(format!(
                "Comment exceeds maximum length of {MAX_COMMENT_LENGTH} characters"
            )));
        }
        let comment = TaskComment {
            id: new_id(),
            author: author.trim().to_string(),
            text: text.trim().to_string(),
            created_at: now,
        };
        self.comments.push(comment.clone());
        self.updated_at = now;
        Ok(comment)
    }

    /// Record that `user` viewed the task. One receipt per user; viewing
    /// again refreshes the timestamp.
    pub fn mark_read(&mut self, user: &str, now: Timestamp) -> Result<(), CoreError> {
        let user = user.trim();
        if user.is_empty() {
            return Err(CoreError::Validation("Reader cannot be empty".to_string()));
        }
        match self.read_by.iter_mut().find(|r| r.user == user) {
            Some(receipt) => receipt.viewed_at = now,
            None => self.read_by.push(ReadReceipt {
                user: user.to_string(),
                viewed_at: now,
            }),
        }
        Ok(())
    }

    pub fn is_read_by(&self, user: &str) -> bool {
        self.read_by.iter().any(|r| r.user == user)
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Derived task listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFilter {
    #[default]
    All,
    Mine,
    Overdue,
    Today,
    Upcoming,
}

impl TaskFilter {
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "all" => Ok(Self::All),
            "mine" => Ok(Self::Mine),
            "overdue" => Ok(Self::Overdue),
            "today" => Ok(Self::Today),
            "upcoming" => Ok(Self::Upcoming),
            other => Err(CoreError::Validation(format!(
                "Invalid task view '{other}'. Must be one of: all, mine, overdue, today, upcoming"
            ))),
        }
    }
}

/// Whether `task` belongs in `filter` as seen by `user` at `now`.
///
/// `mine` with no user matches nothing.
pub fn matches_filter(
    task: &Task,
    filter: TaskFilter,
    user: Option<&str>,
    now: NaiveDateTime,
) -> bool {
    match filter {
        TaskFilter::All => true,
        TaskFilter::Mine => user.is_some_and(|u| task.is_assigned_to(u)),
        TaskFilter::Overdue => task.is_overdue(now),
        TaskFilter::Today => task.due_date == Some(now.date()),
        TaskFilter::Upcoming => task.due_date.is_some_and(|d| d > now.date()),
    }
}

/// Stable sort: priority descending then `order` ascending when
/// `priority_sort` is on, otherwise `order` ascending only.
pub fn sort_tasks<T: Borrow<Task>>(tasks: &mut [T], priority_sort: bool) {
    if priority_sort {
        tasks.sort_by_key(|t| {
            let t: &Task = Borrow::<Task>::borrow(t);
            (Reverse(t.priority), t.order)
        });
    } else {
        tasks.sort_by_key(|t| Borrow::<Task>::borrow(t).order);
    }
}

/// Filter and sort in one pass.
pub fn view<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    filter: TaskFilter,
    user: Option<&str>,
    now: NaiveDateTime,
    priority_sort: bool,
) -> Vec<&'a Task> {
    let mut out: Vec<&Task> = tasks
        .into_iter()
        .filter(|t| matches_filter(t, filter, user, now))
        .collect();
    sort_tasks(&mut out, priority_sort);
    out
}

/// Move `id` to position `to_index` within `ids`, clamping the index.
///
/// Returns `None` when `id` is not in the list.
pub fn splice_move(ids: &[EntityId], id: EntityId, to_index: usize) -> Option<Vec<EntityId>> {
    let from = ids.iter().position(|x| *x == id)?;
    let mut out = ids.to_vec();
    let moved = out.remove(from);
    let to = to_index.min(out.len());
    out.insert(to, moved);
    Some(out)
}

/// Manual index for a task appended at the end.
///
/// Saturates at `i64::MAX`; ties there keep creation order under the
/// stable sort.
pub fn next_order<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> i64 {
    tasks
        .into_iter()
        .map(|t| t.order)
        .max()
        .map_or(0, |max| max.saturating_add(1))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task(title: &str, priority: Priority, order: i64) -> Task {
        Task::from_draft(
            TaskDraft {
                title: title.to_string(),
                priority,
                ..Default::default()
            },
            order,
            Utc::now(),
        )
        .unwrap()
    }

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_time(NaiveTime::parse_from_str(time, "%H:%M").unwrap())
    }

    // -- validation ----------------------------------------------------------

    #[test]
    fn blank_title_rejected() {
        let result = Task::from_draft(TaskDraft::default(), 0, Utc::now());
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn long_title_rejected() {
        let draft = TaskDraft {
            title: "x".repeat(MAX_TITLE_LENGTH + 1),
            ..Default::default()
        };
        assert!(Task::from_draft(draft, 0, Utc::now()).is_err());
    }

    #[test]
    fn assignees_deduplicated_and_trimmed() {
        let draft = TaskDraft {
            title: "Wash".to_string(),
            assignees: vec![" alex ".into(), "alex".into(), "".into(), "sam".into()],
            ..Default::default()
        };
        let t = Task::from_draft(draft, 0, Utc::now()).unwrap();
        assert_eq!(t.assignees, vec!["alex", "sam"]);
    }

    #[test]
    fn patch_with_invalid_title_changes_nothing() {
        let mut t = task("Wash", Priority::Low, 0);
        let before = t.clone();
        let patch = TaskPatch {
            title: Some(" ".to_string()),
            priority: Some(Priority::Urgent),
            ..Default::default()
        };
        assert!(t.apply_patch(patch, Utc::now()).is_err());
        assert_eq!(t, before);
    }

    #[test]
    fn patch_null_clears_due_date() {
        let mut t = task("Wash", Priority::Low, 0);
        t.due_date = NaiveDate::from_ymd_opt(2026, 1, 1);
        let patch: TaskPatch = serde_json::from_value(serde_json::json!({"due_date": null})).unwrap();
        t.apply_patch(patch, Utc::now()).unwrap();
        assert!(t.due_date.is_none());

        t.due_date = NaiveDate::from_ymd_opt(2026, 1, 1);
        let patch: TaskPatch = serde_json::from_value(serde_json::json!({"title": "Dry"})).unwrap();
        t.apply_patch(patch, Utc::now()).unwrap();
        assert!(t.due_date.is_some());
    }

    // -- status --------------------------------------------------------------

    #[test]
    fn completing_sets_and_reopening_clears_completed_at() {
        let mut t = task("Wash", Priority::Low, 0);
        t.set_status(TaskStatus::Completed, Utc::now());
        assert!(t.completed_at.is_some());
        t.set_status(TaskStatus::Acknowledged, Utc::now());
        assert!(t.completed_at.is_some());
        t.set_status(TaskStatus::InProgress, Utc::now());
        assert!(t.completed_at.is_none());
    }

    // -- checklist -----------------------------------------------------------

    #[test]
    fn toggle_twice_restores_and_leaves_siblings_alone() {
        let draft = TaskDraft {
            title: "Interior".to_string(),
            checklist: vec!["Vacuum".into(), "Glass".into(), "Mats".into()],
            ..Default::default()
        };
        let mut t = Task::from_draft(draft, 0, Utc::now()).unwrap();
        t.checklist[2].done = true;
        let before = t.checklist.clone();
        let id = t.checklist[1].id;

        assert!(t.toggle_checklist_item(id, Utc::now()).unwrap());
        assert_eq!(t.checklist[0], before[0]);
        assert_eq!(t.checklist[2], before[2]);
        assert!(!t.toggle_checklist_item(id, Utc::now()).unwrap());
        assert_eq!(t.checklist, before);
        assert_eq!(t.checklist_progress(), (1, 3));
    }

    #[test]
    fn toggle_unknown_item_is_not_found() {
        let mut t = task("Wash", Priority::Low, 0);
        let err = t.toggle_checklist_item(new_id(), Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    // -- comments and receipts -----------------------------------------------

    #[test]
    fn empty_comment_rejected() {
        let mut t = task("Wash", Priority::Low, 0);
        assert!(t.add_comment("alex", "  ", Utc::now()).is_err());
        assert!(t.comments.is_empty());
    }

    #[test]
    fn comment_appended() {
        let mut t = task("Wash", Priority::Low, 0);
        let c = t.add_comment("alex", "Done with wheels", Utc::now()).unwrap();
        assert_eq!(t.comments.len(), 1);
        assert_eq!(t.comments[0].id, c.id);
    }

    #[test]
    fn read_receipt_unique_per_user() {
        let mut t = task("Wash", Priority::Low, 0);
        let first = Utc::now();
        t.mark_read("alex", first).unwrap();
        let later = first + chrono::Duration::minutes(5);
        t.mark_read("alex", later).unwrap();
        t.mark_read("sam", later).unwrap();
        assert_eq!(t.read_by.len(), 2);
        assert_eq!(t.read_by[0].viewed_at, later);
        assert!(t.is_read_by("sam"));
    }

    // -- sorting -------------------------------------------------------------

    #[test]
    fn priority_sort_descending_then_order() {
        let mut tasks = vec![
            task("a", Priority::Low, 0),
            task("b", Priority::Urgent, 3),
            task("c", Priority::Medium, 1),
            task("d", Priority::Urgent, 2),
        ];
        sort_tasks(&mut tasks, true);
        let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn priority_sort_is_stable_for_equal_keys() {
        let mut tasks = vec![
            task("first", Priority::High, 5),
            task("second", Priority::High, 5),
            task("third", Priority::High, 5),
        ];
        sort_tasks(&mut tasks, true);
        let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[test]
    fn disabling_priority_sort_reverts_to_manual_order() {
        let mut tasks = vec![
            task("a", Priority::Low, 2),
            task("b", Priority::Urgent, 1),
            task("c", Priority::Medium, 0),
        ];
        sort_tasks(&mut tasks, true);
        sort_tasks(&mut tasks, false);
        let orders: Vec<i64> = tasks.iter().map(|t| t.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn priority_rank_matches_ordering() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::High < Priority::Urgent);
        assert!(Priority::Urgent.rank() > Priority::High.rank());
    }

    // -- filters -------------------------------------------------------------

    #[test]
    fn filters_against_now() {
        let now = at("2026-03-10", "12:00");
        let mut overdue = task("overdue", Priority::Low, 0);
        overdue.due_date = NaiveDate::from_ymd_opt(2026, 3, 9);

        let mut due_earlier_today = task("earlier", Priority::Low, 1);
        due_earlier_today.due_date = NaiveDate::from_ymd_opt(2026, 3, 10);
        due_earlier_today.due_time = NaiveTime::from_hms_opt(9, 0, 0);

        let mut today_no_time = task("today", Priority::Low, 2);
        today_no_time.due_date = NaiveDate::from_ymd_opt(2026, 3, 10);

        let mut upcoming = task("upcoming", Priority::Low, 3);
        upcoming.due_date = NaiveDate::from_ymd_opt(2026, 3, 11);
        upcoming.assignees = vec!["alex".to_string()];

        let mut done = task("done", Priority::Low, 4);
        done.due_date = NaiveDate::from_ymd_opt(2026, 3, 1);
        done.set_status(TaskStatus::Completed, Utc::now());

        let all = vec![overdue, due_earlier_today, today_no_time, upcoming, done];
        let titles = |f: TaskFilter, user: Option<&str>| -> Vec<String> {
            view(&all, f, user, now, false)
                .into_iter()
                .map(|t| t.title.clone())
                .collect()
        };

        assert_eq!(titles(TaskFilter::All, None).len(), 5);
        assert_eq!(titles(TaskFilter::Overdue, None), vec!["overdue", "earlier"]);
        assert_eq!(titles(TaskFilter::Today, None), vec!["earlier", "today"]);
        assert_eq!(titles(TaskFilter::Upcoming, None), vec!["upcoming"]);
        assert_eq!(titles(TaskFilter::Mine, Some("ALEX")), vec!["upcoming"]);
        assert!(titles(TaskFilter::Mine, None).is_empty());
    }

    #[test]
    fn filter_parse() {
        assert_eq!(TaskFilter::parse("overdue").unwrap(), TaskFilter::Overdue);
        assert!(TaskFilter::parse("later").is_err());
    }

    // -- reordering ----------------------------------------------------------

    #[test]
    fn splice_move_forward_and_back() {
        let ids: Vec<EntityId> = (0..4).map(|_| new_id()).collect();
        let moved = splice_move(&ids, ids[0], 2).unwrap();
        assert_eq!(moved, vec![ids[1], ids[2], ids[0], ids[3]]);

        let moved = splice_move(&ids, ids[3], 0).unwrap();
        assert_eq!(moved, vec![ids[3], ids[0], ids[1], ids[2]]);

        let moved = splice_move(&ids, ids[1], 99).unwrap();
        assert_eq!(moved.last(), Some(&ids[1]));

        assert!(splice_move(&ids, new_id(), 0).is_none());
    }

    #[test]
    fn next_order_appends() {
        let tasks = vec![task("a", Priority::Low, 4), task("b", Priority::Low, 1)];
        assert_eq!(next_order(&tasks), 5);
        assert_eq!(next_order(&Vec::<Task>::new()), 0);
    }

    #[test]
    fn next_order_saturates_at_max() {
        let tasks = vec![task("a", Priority::Low, i64::MAX)];
        assert_eq!(next_order(&tasks), i64::MAX);
    }

    #[test]
    fn patch_order_out_of_range_rejected() {
        let mut t = task("a", Priority::Low, 3);
        for order in [i64::MAX, MAX_TASK_ORDER + 1, -1] {
            let patch = TaskPatch {
                order: Some(order),
                ..Default::default()
            };
            assert!(matches!(
                t.apply_patch(patch, Utc::now()),
                Err(CoreError::Validation(_))
            ));
        }
        assert_eq!(t.order, 3);

        let patch = TaskPatch {
            order: Some(MAX_TASK_ORDER),
            ..Default::default()
        };
        t.apply_patch(patch, Utc::now()).unwrap();
        assert_eq!(t.order, MAX_TASK_ORDER);
    }
}
