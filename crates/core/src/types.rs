/// All entity primary keys are UUIDs (v7, time-ordered) so records can be
/// created offline before the remote store confirms them.
pub type EntityId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh time-ordered entity id.
pub fn new_id() -> EntityId {
    uuid::Uuid::now_v7()
}
