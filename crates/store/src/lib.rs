//! Local-first data layer for DetailHQ.
//!
//! Reads go through [`Repository`], which prefers the remote tier and falls
//! back to the [`LocalCache`] snapshot when the remote is unreachable.
//! Writes are optimistic: the domain stores mutate their in-memory rows and
//! record a [`Command`] that [`SyncedCollection::flush`] later sends to the
//! remote tier.

pub mod cache;
pub mod collection;
pub mod commands;
pub mod coupon_store;
pub mod customer_store;
pub mod error;
pub mod library_store;
pub mod local_collection;
pub mod memory;
pub mod message_store;
pub mod notes_store;
pub mod remote;
pub mod repository;
pub mod stores;
pub mod task_store;

pub use cache::{FileCache, LocalCache, MemoryCache};
pub use collection::{SyncStatus, SyncedCollection};
pub use commands::{Command, CommandOp, CommandQueue, CommandStatus, CommandSummary, FlushReport};
pub use error::{CacheError, RemoteError, StoreError};
pub use memory::{MemoryRemote, MemoryTable};
pub use remote::{RemoteFactory, RemoteTable};
pub use repository::{FallbackPolicy, ReadOutcome, ReadSource, Repository};
pub use stores::{Stores, SyncSummary};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use detailhq_core::record::Record;

    use crate::cache::MemoryCache;
    use crate::memory::MemoryRemote;
    use crate::remote::RemoteFactory;
    use crate::repository::{FallbackPolicy, Repository};

    /// Repository over `remote` with a fresh in-memory cache.
    pub fn repo<T: Record>(remote: &MemoryRemote) -> Repository<T> {
        Repository::new(
            remote.table::<T>(),
            Arc::new(MemoryCache::new()),
            FallbackPolicy::default(),
        )
    }
}
