//! Browser-profile storage for Trimless
//!
//! This crate provides:
//! - Two key-value areas: `Local` (per device) and `Sync` (user preferences)
//! - Change notifications after every write that changed a key
//! - An in-memory store (one profile shared by several page contexts)
//! - A persistent store (sled embedded DB)
//! - Typed accessors for the keys the extension uses

pub mod area;
pub mod error;
pub mod memory;
pub mod persistent;
pub mod profile;

// Re-exports
pub use area::{Area, Change, ChangeSet};
pub use error::StorageError;
pub use memory::MemoryStorage;
pub use persistent::SledStorage;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::broadcast;

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Key-value items as stored in an area
pub type Items = Map<String, Value>;

/// Asynchronous key-value store with change notifications
#[async_trait]
pub trait Storage: Send + Sync {
    /// Values for `keys`; missing keys are absent from the result
    async fn get(&self, area: Area, keys: &[&str]) -> Result<Items>;

    /// Every key in the area
    async fn get_all(&self, area: Area) -> Result<Items>;

    /// Write `items`, notifying subscribers of the keys that changed
    async fn set(&self, area: Area, items: Items) -> Result<()>;

    /// Delete `keys`, notifying subscribers of the keys that existed
    async fn remove(&self, area: Area, keys: &[&str]) -> Result<()>;

    /// Receive a `ChangeSet` for every effective write
    fn subscribe(&self) -> broadcast::Receiver<ChangeSet>;
}

#[async_trait]
impl<S: Storage + ?Sized> Storage for std::sync::Arc<S> {
    async fn get(&self, area: Area, keys: &[&str]) -> Result<Items> {
        (**self).get(area, keys).await
    }

    async fn get_all(&self, area: Area) -> Result<Items> {
        (**self).get_all(area).await
    }

    async fn set(&self, area: Area, items: Items) -> Result<()> {
        (**self).set(area, items).await
    }

    async fn remove(&self, area: Area, keys: &[&str]) -> Result<()> {
        (**self).remove(area, keys).await
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeSet> {
        (**self).subscribe()
    }
}
