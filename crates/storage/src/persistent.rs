//! Persistent profile store using sled

use crate::area::ChangeNotifier;
use crate::{Area, ChangeSet, Items, Result, Storage};
use async_trait::async_trait;
use serde_json::Value;
use sled::{Db, Tree};
use std::path::Path;
use tokio::sync::broadcast;

/// Profile stored on disk, one sled tree per area, JSON-encoded values
///
/// Notifications only reach subscribers in this process; sled allows a
/// single process per database.
pub struct SledStorage {
    /// Sled database
    db: Db,
    local: Tree,
    sync: Tree,
    notifier: ChangeNotifier,
}

impl SledStorage {
    /// Open or create a profile at the given directory
    pub fn open(path: &Path) -> Result<Self> {
        let db = sled::open(path.join("profile.db"))?;
        let local = db.open_tree(Area::Local.as_str())?;
        let sync = db.open_tree(Area::Sync.as_str())?;

        Ok(Self {
            db,
            local,
            sync,
            notifier: ChangeNotifier::new(),
        })
    }

    fn tree(&self, area: Area) -> &Tree {
        match area {
            Area::Local => &self.local,
            Area::Sync => &self.sync,
        }
    }

    fn decode(bytes: &[u8]) -> Result<Value> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[async_trait]
impl Storage for SledStorage {
    async fn get(&self, area: Area, keys: &[&str]) -> Result<Items> {
        let tree = self.tree(area);
        let mut items = Items::new();

        for key in keys {
            if let Some(bytes) = tree.get(key.as_bytes())? {
                items.insert(key.to_string(), Self::decode(&bytes)?);
            }
        }

        Ok(items)
    }

    async fn get_all(&self, area: Area) -> Result<Items> {
        let mut items = Items::new();

        for entry in self.tree(area).iter() {
            let (key, value) = entry?;
            let key = String::from_utf8_lossy(&key).into_owned();
            items.insert(key, Self::decode(&value)?);
        }

        Ok(items)
    }

    async fn set(&self, area: Area, items: Items) -> Result<()> {
        let tree = self.tree(area);
        let mut changes = ChangeSet::new(area);

        for (key, value) in items {
            let encoded = serde_json::to_vec(&value)?;
            let old = tree.insert(key.as_bytes(), encoded)?;
            // An undecodable old value still counts as a change
            let old = old.and_then(|bytes| Self::decode(&bytes).ok());
            changes.record(&key, old, Some(value));
        }

        // Flush to ensure durability
        self.db.flush_async().await?;
        self.notifier.notify(changes);
        Ok(())
    }

    async fn remove(&self, area: Area, keys: &[&str]) -> Result<()> {
        let tree = self.tree(area);
        let mut changes = ChangeSet::new(area);

        for key in keys {
            if let Some(old) = tree.remove(key.as_bytes())? {
                changes.record(key, Self::decode(&old).ok(), None);
            }
        }

        self.db.flush_async().await?;
        self.notifier.notify(changes);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeSet> {
        self.notifier.subscribe()
    }
}
