//! PostgreSQL remote tier for DetailHQ.
//!
//! Every entity lives in a JSONB document table `(id, data, created_at,
//! updated_at)`. A trigger on each table publishes row changes on the
//! `detailhq_changes` channel, which [`PgChangeListener`] forwards to the
//! in-process change bus.

pub mod listener;
pub mod table;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

pub use listener::{PgChangeListener, CHANGE_CHANNEL};
pub use table::{remote_error, PgRemote, PgTable};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
///
/// Connections are opened on first use, so an unreachable database at
/// startup does not fail here. Only a malformed URL does. Each checkout
/// waits at most `acquire_timeout`, after which the read path falls back to
/// the local cache.
pub fn create_pool(database_url: &str, acquire_timeout: Duration) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(acquire_timeout)
        .connect_lazy(database_url)
}

/// Round-trip a trivial query to verify the pool can reach the database.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map(|_| ())
}

/// Apply the embedded migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pool_creation_does_not_need_a_reachable_database() {
        let pool = create_pool(
            "postgres://detailhq@127.0.0.1:1/detailhq",
            Duration::from_millis(300),
        )
        .unwrap();
        let checked = tokio::time::timeout(Duration::from_secs(5), health_check(&pool))
            .await
            .unwrap();
        assert!(checked.is_err());
    }

    #[test]
    fn malformed_url_is_rejected() {
        assert!(create_pool("not a url", Duration::from_secs(1)).is_err());
    }
}
