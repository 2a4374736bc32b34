//! The remote tier seam.

use std::sync::Arc;

use async_trait::async_trait;
use detailhq_core::record::Record;
use detailhq_core::types::EntityId;

use crate::error::RemoteError;

/// One remote table of `T` rows.
///
/// Last-writer-wins: `upsert` overwrites whatever row has the same id.
#[async_trait]
pub trait RemoteTable<T: Record>: Send + Sync {
    /// Every row, oldest first.
    async fn fetch_all(&self) -> Result<Vec<T>, RemoteError>;

    /// Insert or replace the row with `record.id()`.
    async fn upsert(&self, record: &T) -> Result<(), RemoteError>;

    /// Delete the row with `id`. Deleting a missing row succeeds.
    async fn delete(&self, id: EntityId) -> Result<(), RemoteError>;
}

/// Hands out the remote table for each record type.
pub trait RemoteFactory: Send + Sync {
    fn table<T: Record>(&self) -> Arc<dyn RemoteTable<T>>;
}
