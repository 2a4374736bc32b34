//! In-memory remote tier.
//!
//! Used when no database is configured and throughout the tests. Every
//! table shares one online flag, so [`MemoryRemote::set_online`] simulates
//! a network outage for the whole remote store.

use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use detailhq_core::record::Record;
use detailhq_core::types::EntityId;
use detailhq_events::{ChangeBus, ChangeEvent, ChangeKind};

use crate::error::RemoteError;
use crate::remote::{RemoteFactory, RemoteTable};

// ---------------------------------------------------------------------------
// MemoryTable
// ---------------------------------------------------------------------------

pub struct MemoryTable<T: Record> {
    rows: RwLock<Vec<T>>,
    online: Arc<AtomicBool>,
    bus: Option<Arc<ChangeBus>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> MemoryTable<T> {
    fn new(online: Arc<AtomicBool>, bus: Option<Arc<ChangeBus>>) -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            online,
            bus,
            _marker: PhantomData,
        }
    }

    fn ensure_online(&self) -> Result<(), RemoteError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RemoteError::Unavailable(format!(
                "{} table is offline",
                T::TABLE
            )))
        }
    }

    /// Current rows, ignoring the online flag.
    pub fn snapshot(&self) -> Vec<T> {
        self.rows.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn publish(&self, event: ChangeEvent) {
        if let Some(bus) = &self.bus {
            bus.publish(event);
        }
    }
}

#[async_trait]
impl<T: Record> RemoteTable<T> for MemoryTable<T> {
    async fn fetch_all(&self) -> Result<Vec<T>, RemoteError> {
        self.ensure_online()?;
        Ok(self.snapshot())
    }

    async fn upsert(&self, record: &T) -> Result<(), RemoteError> {
        self.ensure_online()?;
        let kind = {
            let mut rows = self.rows.write().unwrap_or_else(|e| e.into_inner());
            match rows.iter_mut().find(|r| r.id() == record.id()) {
                Some(existing) => {
                    *existing = record.clone();
                    ChangeKind::Update
                }
                None => {
                    rows.push(record.clone());
                    ChangeKind::Insert
                }
            }
        };
        self.publish(ChangeEvent::upsert(kind, record));
        Ok(())
    }

    async fn delete(&self, id: EntityId) -> Result<(), RemoteError> {
        self.ensure_online()?;
        let removed = {
            let mut rows = self.rows.write().unwrap_or_else(|e| e.into_inner());
            let before = rows.len();
            rows.retain(|r| r.id() != id);
            rows.len() != before
        };
        if removed {
            self.publish(ChangeEvent::delete::<T>(id));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryRemote
// ---------------------------------------------------------------------------

/// Factory of [`MemoryTable`]s. Asking twice for the same record type
/// returns the same table.
pub struct MemoryRemote {
    tables: Mutex<HashMap<&'static str, Arc<dyn Any + Send + Sync>>>,
    online: Arc<AtomicBool>,
    bus: Option<Arc<ChangeBus>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            online: Arc::new(AtomicBool::new(true)),
            bus: None,
        }
    }

    /// Publish a [`ChangeEvent`] on `bus` for every successful write.
    pub fn with_bus(mut self, bus: Arc<ChangeBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// The concrete table for `T`, for seeding and inspection.
    pub fn typed_table<T: Record>(&self) -> Arc<MemoryTable<T>> {
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = tables.get(T::TABLE) {
            if let Ok(table) = Arc::clone(existing).downcast::<MemoryTable<T>>() {
                return table;
            }
        }
        let table = Arc::new(MemoryTable::<T>::new(
            Arc::clone(&self.online),
            self.bus.clone(),
        ));
        tables.insert(T::TABLE, table.clone());
        table
    }
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteFactory for MemoryRemote {
    fn table<T: Record>(&self) -> Arc<dyn RemoteTable<T>> {
        self.typed_table::<T>()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
