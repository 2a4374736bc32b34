//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope. Store-backed listings
//! and mutations use [`SyncedResponse`], which adds the sync summary so a
//! client can tell an accepted-but-unsynced write or a cache read apart from
//! a confirmed one.

use detailhq_store::SyncStatus;
use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "data": T, "sync": {...}, "warning": "..." }`.
///
/// `warning` is only present when the rows came from the local cache.
#[derive(Debug, Serialize)]
pub struct SyncedResponse<T: Serialize> {
    pub data: T,
    pub sync: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl<T: Serialize> SyncedResponse<T> {
    pub fn new(data: T, sync: SyncStatus) -> Self {
        let warning = sync.warning.clone();
        Self {
            data,
            sync,
            warning,
        }
    }
}
