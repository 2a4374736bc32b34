//! `RemoteTable` over a JSONB document table.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use detailhq_core::record::Record;
use detailhq_core::types::EntityId;
use detailhq_store::{RemoteError, RemoteFactory, RemoteTable};
use sqlx::types::Json;
use sqlx::PgPool;

/// Classify a driver error for the store layer.
///
/// Constraint and permission failures come back from the server and are
/// `Rejected`; decode failures are `Decode`; everything else (pool timeouts,
/// I/O, TLS) means the database could not be reached.
pub fn remote_error(err: sqlx::Error) -> RemoteError {
    match err {
        sqlx::Error::Database(db) => RemoteError::Rejected(db.to_string()),
        e @ (sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_)) => {
            RemoteError::Decode(e.to_string())
        }
        other => RemoteError::Unavailable(other.to_string()),
    }
}

/// Rows of `T` stored as JSONB in table `T::TABLE`.
pub struct PgTable<T> {
    pool: PgPool,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> PgTable<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    /// Fetch one row's document by id.
    pub async fn find_by_id(&self, id: EntityId) -> Result<Option<T>, RemoteError> {
        let query = format!("SELECT data FROM {} WHERE id = $1", T::TABLE);
        let data = sqlx::query_scalar::<_, serde_json::Value>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(remote_error)?;
        data.map(decode::<T>).transpose()
    }
}

fn decode<T: Record>(data: serde_json::Value) -> Result<T, RemoteError> {
    serde_json::from_value(data).map_err(|e| RemoteError::Decode(format!("{}: {e}", T::TABLE)))
}

#[async_trait]
impl<T: Record> RemoteTable<T> for PgTable<T> {
    async fn fetch_all(&self) -> Result<Vec<T>, RemoteError> {
        let query = format!("SELECT data FROM {} ORDER BY created_at, id", T::TABLE);
        let rows = sqlx::query_scalar::<_, serde_json::Value>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(remote_error)?;
        rows.into_iter().map(decode::<T>).collect()
    }

    async fn upsert(&self, record: &T) -> Result<(), RemoteError> {
        let query = format!(
            "INSERT INTO {} (id, data) VALUES ($1, $2) \
             ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()",
            T::TABLE
        );
        sqlx::query(&query)
            .bind(record.id())
            .bind(Json(record))
            .execute(&self.pool)
            .await
            .map_err(remote_error)?;
        Ok(())
    }

    async fn delete(&self, id: EntityId) -> Result<(), RemoteError> {
        let query = format!("DELETE FROM {} WHERE id = $1", T::TABLE);
        sqlx::query(&query)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(remote_error)?;
        Ok(())
    }
}

/// [`RemoteFactory`] handing out [`PgTable`]s over one pool.
#[derive(Clone)]
pub struct PgRemote {
    pool: PgPool,
}

impl PgRemote {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl RemoteFactory for PgRemote {
    fn table<T: Record>(&self) -> Arc<dyn RemoteTable<T>> {
        Arc::new(PgTable::<T>::new(self.pool.clone()))
    }
}
