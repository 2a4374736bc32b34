//! The [`Record`] trait shared by every persisted entity.
//!
//! Stores, the cache layer and the database tables are generic over
//! `Record`, so adding an entity only needs a table name and an id accessor.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::types::EntityId;

/// A persisted entity that round-trips through the remote store and the
/// local cache.
///
/// - `TABLE` must be stable: it names the remote table, the cache snapshot
///   key, and the `table` field of change events.
/// - `id()` must be unique within the table.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Remote table name.
    const TABLE: &'static str;

    /// Human-readable entity name used in error messages.
    const ENTITY: &'static str;

    /// Primary key of this record.
    fn id(&self) -> EntityId;
}

/// Implements [`Record`] for a struct with an `id: EntityId` field.
#[macro_export]
macro_rules! impl_record {
    ($ty:ty, $table:literal, $entity:literal) => {
        impl $crate::record::Record for $ty {
            const TABLE: &'static str = $table;
            const ENTITY: &'static str = $entity;

            fn id(&self) -> $crate::types::EntityId {
                self.id
            }
        }
    };
}

/// Names of every remote table, in creation order.
pub const REMOTE_TABLES: &[&str] = &[
    "customers",
    "tasks",
    "notebooks",
    "sections",
    "notes",
    "coupons",
    "library_items",
    "library_comments",
    "team_messages",
];

/// Check whether `table` is one of the known remote tables.
pub fn is_remote_table(table: &str) -> bool {
    REMOTE_TABLES.contains(&table)
}
