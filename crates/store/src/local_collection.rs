//! Client-only collections persisted in the local cache and never sent to
//! the remote tier.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::{get_typed, set_typed, LocalCache};
use crate::error::CacheError;

pub struct LocalCollection<T> {
    key: &'static str,
    cache: Arc<dyn LocalCache>,
    items: Vec<T>,
}

impl<T> LocalCollection<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(key: &'static str, cache: Arc<dyn LocalCache>) -> Self {
        Self {
            key,
            cache,
            items: Vec::new(),
        }
    }

    /// Reload from the cache. A missing key is an empty collection.
    pub async fn load(&mut self) -> Result<(), CacheError> {
        self.items = get_typed(self.cache.as_ref(), self.key)
            .await?
            .unwrap_or_default();
        Ok(())
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub async fn push(&mut self, item: T) -> Result<(), CacheError> {
        self.items.push(item);
        self.persist().await
    }

    /// Remove every item matching `pred`, returning how many were removed.
    pub async fn remove_where(&mut self, pred: impl Fn(&T) -> bool) -> Result<usize, CacheError> {
        let before = self.items.len();
        self.items.retain(|i| !pred(i));
        let removed = before - self.items.len();
        if removed > 0 {
            self.persist().await?;
        }
        Ok(removed)
    }

    /// Mutate the items in place and persist the result.
    pub async fn update<R>(&mut self, f: impl FnOnce(&mut Vec<T>) -> R) -> Result<R, CacheError> {
        let out = f(&mut self.items);
        self.persist().await?;
        Ok(out)
    }

    /// Drop every item, returning how many there were.
    pub async fn clear(&mut self) -> Result<usize, CacheError> {
        let removed = self.items.len();
        self.items.clear();
        self.persist().await?;
        Ok(removed)
    }

    async fn persist(&self) -> Result<(), CacheError> {
        set_typed(self.cache.as_ref(), self.key, &self.items).await
    }
}
