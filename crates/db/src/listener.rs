//! Forwards Postgres change notifications to the [`ChangeBus`].

use std::sync::Arc;
use std::time::Duration;

use detailhq_core::record::is_remote_table;
use detailhq_events::{ChangeBus, ChangeEvent, ChangeKind};
use sqlx::postgres::PgListener;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::table::remote_error;

/// Channel the change trigger notifies on.
pub const CHANGE_CHANNEL: &str = "detailhq_changes";

/// Delay before listening again after the connection could not be restored.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

pub struct PgChangeListener {
    pool: PgPool,
    bus: Arc<ChangeBus>,
}

impl PgChangeListener {
    pub fn new(pool: PgPool, bus: Arc<ChangeBus>) -> Self {
        Self { pool, bus }
    }

    /// Listen until `cancel` fires.
    ///
    /// Notifications too large for `pg_notify` arrive without the row; the
    /// row is then loaded by id before publishing.
    ///
    /// The database may be down when this starts; connecting is retried
    /// every [`RECONNECT_DELAY`] until it succeeds or `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), sqlx::Error> {
        let mut listener = loop {
            match self.connect().await {
                Ok(listener) => break listener,
                Err(e) => {
                    tracing::warn!(error = %e, "Change listener could not connect, retrying");
                    tokio::select! {
                        _ = cancel.cancelled() => return Ok(()),
                        _ = tokio::time::sleep(RECONNECT_DELAY) => {}
                    }
                }
            }
        };
        tracing::info!(channel = CHANGE_CHANNEL, "Change listener started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Change listener stopping");
                    return Ok(());
                }
                received = listener.recv() => match received {
                    Ok(notification) => self.forward(notification.payload()).await,
                    Err(e) => {
                        tracing::error!(error = %e, "Change listener lost its connection");
                        tokio::time::sleep(RECONNECT_DELAY).await;
                    }
                },
            }
        }
    }

    async fn connect(&self) -> Result<PgListener, sqlx::Error> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(CHANGE_CHANNEL).await?;
        Ok(listener)
    }

    async fn forward(&self, payload: &str) {
        let mut event: ChangeEvent = match serde_json::from_str(payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed change notification");
                return;
            }
        };

        if event.kind != ChangeKind::Delete && event.record.is_null() {
            match self.load_row(&event).await {
                Ok(Some(row)) => event.record = row,
                Ok(None) => {
                    tracing::debug!(table = %event.table, record_id = %event.record_id, "Changed row already gone");
                    return;
                }
                Err(e) => {
                    tracing::warn!(table = %event.table, error = %e, "Failed to load changed row");
                    return;
                }
            }
        }

        self.bus.publish(event);
    }

    async fn load_row(
        &self,
        event: &ChangeEvent,
    ) -> Result<Option<serde_json::Value>, detailhq_store::RemoteError> {
        if !is_remote_table(&event.table) {
            return Ok(None);
        }
        let query = format!("SELECT data FROM {} WHERE id = $1", event.table);
        sqlx::query_scalar::<_, serde_json::Value>(&query)
            .bind(event.record_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(remote_error)
    }
}
