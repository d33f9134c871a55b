//! In-memory profile store

use crate::area::ChangeNotifier;
use crate::{Area, ChangeSet, Items, Result, Storage, StorageError};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Profile held in memory
///
/// Clones share the same data and notifications, so several page sessions
/// built on clones behave like tabs of one browser profile.
#[derive(Clone)]
pub struct MemoryStorage {
    inner: Arc<Inner>,
}

struct Inner {
    local: RwLock<Items>,
    sync: RwLock<Items>,
    notifier: ChangeNotifier,
    /// Simulates an invalidated extension context
    unavailable: AtomicBool,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                local: RwLock::new(Items::new()),
                sync: RwLock::new(Items::new()),
                notifier: ChangeNotifier::new(),
                unavailable: AtomicBool::new(false),
            }),
        }
    }

    /// Make every subsequent operation fail (or succeed again)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn area(&self, area: Area) -> &RwLock<Items> {
        match area {
            Area::Local => &self.inner.local,
            Area::Sync => &self.inner.sync,
        }
    }

    fn check_available(&self) -> Result<()> {
        if self.inner.unavailable.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable(
                "extension context invalidated".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, area: Area, keys: &[&str]) -> Result<Items> {
        self.check_available()?;
        let items = self.area(area).read();
        Ok(keys
            .iter()
            .filter_map(|key| items.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    async fn get_all(&self, area: Area) -> Result<Items> {
        self.check_available()?;
        Ok(self.area(area).read().clone())
    }

    async fn set(&self, area: Area, new_items: Items) -> Result<()> {
        self.check_available()?;
        let mut changes = ChangeSet::new(area);
        {
            let mut items = self.area(area).write();
            for (key, value) in new_items {
                let old = items.insert(key.clone(), value.clone());
                changes.record(&key, old, Some(value));
            }
        }
        self.inner.notifier.notify(changes);
        Ok(())
    }

    async fn remove(&self, area: Area, keys: &[&str]) -> Result<()> {
        self.check_available()?;
        let mut changes = ChangeSet::new(area);
        {
            let mut items = self.area(area).write();
            for key in keys {
                let old = items.remove(*key);
                changes.record(key, old, None);
            }
        }
        self.inner.notifier.notify(changes);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeSet> {
        self.inner.notifier.subscribe()
    }
}
