//! In-process change bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`ChangeBus`] is shared via `Arc<ChangeBus>` across the application.

use chrono::{DateTime, Utc};
use detailhq_core::record::Record;
use detailhq_core::types::EntityId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// ChangeEvent
// ---------------------------------------------------------------------------

/// Kind of row change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    #[serde(alias = "INSERT")]
    Insert,
    #[serde(alias = "UPDATE")]
    Update,
    #[serde(alias = "DELETE")]
    Delete,
}

/// A row change on a remote table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Remote table name, e.g. `"team_messages"`.
    pub table: String,

    pub kind: ChangeKind,

    /// Primary key of the changed row.
    pub record_id: EntityId,

    /// The new row for inserts and updates, `null` for deletes.
    #[serde(default)]
    pub record: serde_json::Value,

    /// When the change was observed (UTC).
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    /// Event for a freshly inserted or updated record.
    ///
    /// A record that fails to serialize is carried as `null`; subscribers
    /// treat that like a delete-less refresh hint.
    pub fn upsert<T: Record>(kind: ChangeKind, record: &T) -> Self {
        Self {
            table: T::TABLE.to_string(),
            kind,
            record_id: record.id(),
            record: serde_json::to_value(record).unwrap_or(serde_json::Value::Null),
            timestamp: Utc::now(),
        }
    }

    /// Event for a deleted record.
    pub fn delete<T: Record>(id: EntityId) -> Self {
        Self {
            table: T::TABLE.to_string(),
            kind: ChangeKind::Delete,
            record_id: id,
            record: serde_json::Value::Null,
            timestamp: Utc::now(),
        }
    }

    /// Whether the event concerns `T`'s table.
    pub fn is_for<T: Record>(&self) -> bool {
        self.table == T::TABLE
    }

    /// Decode the carried row as `T`.
    pub fn decode<T: Record>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.record.clone())
    }
}

// ---------------------------------------------------------------------------
// ChangeBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out change bus.
///
/// # Usage
///
/// ```rust
/// use detailhq_events::{ChangeBus, ChangeEvent};
/// use detailhq_core::message::TeamMessage;
///
/// let bus = ChangeBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(ChangeEvent::delete::<TeamMessage>(detailhq_core::types::new_id()));
/// ```
pub struct ChangeBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: ChangeEvent) {
        tracing::trace!(table = %event.table, kind = ?event.kind, record_id = %event.record_id, "Change published");
        // Ignore the SendError: it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
