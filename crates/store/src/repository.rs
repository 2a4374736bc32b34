//! Two-tier read path: remote first, local cache snapshot as fallback.

use std::sync::Arc;

use detailhq_core::record::Record;
use serde::Serialize;

use crate::cache::{get_typed, set_typed, snapshot_key, LocalCache};
use crate::error::CacheError;
use crate::remote::RemoteTable;

/// Warning attached to reads served from the cache.
pub const DEFAULT_FALLBACK_WARNING: &str = "Using local cache";

/// How the repository degrades when the remote tier fails.
#[derive(Debug, Clone)]
pub struct FallbackPolicy {
    /// Non-fatal message returned alongside cache-served rows.
    pub warning: String,
    /// Refresh the cache snapshot after every successful remote read or flush.
    pub write_through: bool,
    /// Persist the optimistic in-memory rows when a write fails.
    pub snapshot_on_failure: bool,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            warning: DEFAULT_FALLBACK_WARNING.to_string(),
            write_through: true,
            snapshot_on_failure: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadSource {
    Remote,
    Cache,
}

#[derive(Debug, Clone)]
pub struct ReadOutcome<T> {
    pub rows: Vec<T>,
    pub source: ReadSource,
    pub warning: Option<String>,
}

/// Unified read path for one table.
pub struct Repository<T: Record> {
    remote: Arc<dyn RemoteTable<T>>,
    cache: Arc<dyn LocalCache>,
    policy: FallbackPolicy,
}

impl<T: Record> Repository<T> {
    pub fn new(
        remote: Arc<dyn RemoteTable<T>>,
        cache: Arc<dyn LocalCache>,
        policy: FallbackPolicy,
    ) -> Self {
        Self {
            remote,
            cache,
            policy,
        }
    }

    pub fn remote(&self) -> &dyn RemoteTable<T> {
        self.remote.as_ref()
    }

    pub fn policy(&self) -> &FallbackPolicy {
        &self.policy
    }

    /// Read every row.
    ///
    /// Remote rows win outright. On any remote failure the cache snapshot is
    /// returned with the policy warning; a missing snapshot is an empty
    /// list. Only a failing cache on top of a failing remote is an error.
    pub async fn read_all(&self) -> Result<ReadOutcome<T>, CacheError> {
        match self.remote.fetch_all().await {
            Ok(rows) => {
                if self.policy.write_through {
                    if let Err(e) = self.save_snapshot(&rows).await {
                        tracing::warn!(table = T::TABLE, error = %e, "Failed to refresh cache snapshot");
                    }
                }
                Ok(ReadOutcome {
                    rows,
                    source: ReadSource::Remote,
                    warning: None,
                })
            }
            Err(remote_err) => {
                tracing::warn!(
                    table = T::TABLE,
                    error = %remote_err,
                    "Remote read failed, falling back to local cache"
                );
                let rows = self.load_snapshot().await?.unwrap_or_default();
                Ok(ReadOutcome {
                    rows,
                    source: ReadSource::Cache,
                    warning: Some(self.policy.warning.clone()),
                })
            }
        }
    }

    pub async fn load_snapshot(&self) -> Result<Option<Vec<T>>, CacheError> {
        get_typed(self.cache.as_ref(), &snapshot_key(T::TABLE)).await
    }

    pub async fn save_snapshot(&self, rows: &[T]) -> Result<(), CacheError> {
        set_typed(self.cache.as_ref(), &snapshot_key(T::TABLE), rows).await
    }
}
