//! Applies remote change events to the in-memory stores.
//!
//! Subscribes to the [`ChangeBus`](detailhq_events::ChangeBus) and routes
//! each event to the store that owns its table. Applying is idempotent by
//! record id, so the echo of this server's own writes is harmless.

use std::sync::Arc;

use detailhq_events::ChangeEvent;
use detailhq_store::Stores;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;

pub struct ChangeRouter {
    stores: Arc<Stores>,
}

impl ChangeRouter {
    pub fn new(stores: Arc<Stores>) -> Self {
        Self { stores }
    }

    /// Apply one event. Returns whether any store changed.
    pub async fn handle(&self, event: &ChangeEvent) -> bool {
        match self.stores.apply_change(event).await {
            Ok(changed) => {
                if changed {
                    tracing::debug!(
                        table = %event.table,
                        kind = ?event.kind,
                        record_id = %event.record_id,
                        "Applied remote change"
                    );
                }
                changed
            }
            Err(e) => {
                tracing::warn!(
                    table = %event.table,
                    record_id = %event.record_id,
                    error = %e,
                    "Undecodable change event"
                );
                false
            }
        }
    }

    /// Run until `cancel` fires or the bus closes.
    ///
    /// After falling behind the bus, every store is reloaded so missed
    /// events cannot leave stale rows behind.
    pub async fn run(self, mut rx: broadcast::Receiver<ChangeEvent>, cancel: CancellationToken) {
        tracing::info!("Change router started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Change router stopping");
                    break;
                }
                msg = rx.recv() => match msg {
                    Ok(event) => {
                        self.handle(&event).await;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Change router lagged, reloading stores");
                        if let Err(e) = self.stores.load_all().await {
                            tracing::error!(error = %e, "Store reload after lag failed");
                        }
                    }
                    Err(RecvError::Closed) => {
                        tracing::info!("Change bus closed, change router stopping");
                        break;
                    }
                },
            }
        }
    }
}
