//! Database readiness: health check plus migrations.
//!
//! An unreachable database at startup is not fatal. The server boots on the
//! local cache and [`retry_until_ready`] keeps trying in the background.
//! Once the schema is in place the stores are reloaded from the remote and
//! writes that failed while it was down are retried.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use detailhq_db::DbPool;
use detailhq_store::Stores;
use tokio_util::sync::CancellationToken;

/// Delay between readiness attempts.
pub const RETRY_DELAY: Duration = Duration::from_secs(10);

/// Check connectivity and apply migrations once.
pub async fn prepare(pool: &DbPool) -> anyhow::Result<()> {
    detailhq_db::health_check(pool)
        .await
        .context("Database health check failed")?;
    detailhq_db::run_migrations(pool)
        .await
        .context("Failed to run database migrations")?;
    Ok(())
}

/// Retry [`prepare`] until it succeeds or `cancel` fires.
pub async fn retry_until_ready(pool: DbPool, stores: Arc<Stores>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(RETRY_DELAY) => {}
        }
        match prepare(&pool).await {
            Ok(()) => {
                tracing::info!("Database reachable, migrations applied");
                if let Err(e) = stores.load_all().await {
                    tracing::error!(error = %e, "Store reload after database recovery failed");
                }
                let report = stores.retry_all().await;
                tracing::info!(
                    confirmed = report.confirmed,
                    failed = report.failed,
                    "Retried queued writes after database recovery"
                );
                return;
            }
            Err(e) => {
                tracing::warn!(error = ?e, "Database still unavailable");
            }
        }
    }
}
