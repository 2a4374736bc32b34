use std::sync::Arc;

use detailhq_events::ChangeBus;
use detailhq_report::FileArchive;
use detailhq_store::Stores;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Every domain store, each behind its own lock.
    pub stores: Arc<Stores>,
    /// Change notifications from the remote tier.
    pub bus: Arc<ChangeBus>,
    /// Generated reports and uploaded media.
    pub archive: Arc<dyn FileArchive>,
    /// Present when the remote tier is PostgreSQL.
    pub pool: Option<detailhq_db::DbPool>,
}
