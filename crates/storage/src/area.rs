//! Storage areas and change records

use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::broadcast;

/// Capacity of the change channel; slow subscribers see `Lagged`
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Logical storage area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Area {
    /// Per-device state: feature flag, entitlement, usage
    Local,
    /// Cross-device user preferences
    Sync,
}

impl Area {
    pub fn as_str(&self) -> &'static str {
        match self {
            Area::Local => "local",
            Area::Sync => "sync",
        }
    }
}

impl std::fmt::Display for Area {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Old and new value of one key (`None` = absent)
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

/// Keys changed by one write
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet {
    pub area: Area,
    pub changes: BTreeMap<String, Change>,
}

impl ChangeSet {
    pub fn new(area: Area) -> Self {
        Self {
            area,
            changes: BTreeMap::new(),
        }
    }

    /// Record a transition, skipping no-ops
    pub fn record(&mut self, key: &str, old_value: Option<Value>, new_value: Option<Value>) {
        if old_value != new_value {
            self.changes.insert(
                key.to_string(),
                Change {
                    old_value,
                    new_value,
                },
            );
        }
    }

    pub fn get(&self, key: &str) -> Option<&Change> {
        self.changes.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.changes.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Fan-out of change sets to subscribers
#[derive(Debug, Clone)]
pub(crate) struct ChangeNotifier {
    tx: broadcast::Sender<ChangeSet>,
}

impl ChangeNotifier {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<ChangeSet> {
        self.tx.subscribe()
    }

    pub(crate) fn notify(&self, changes: ChangeSet) {
        if changes.is_empty() {
            return;
        }
        tracing::trace!(area = %changes.area, keys = changes.changes.len(), "Storage changed");
        // No subscribers is fine
        let _ = self.tx.send(changes);
    }
}
