//! Daily usage record for the free tier

use crate::ThreadId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Threads counted against the free quota on one calendar day
///
/// The count is always the size of the thread set. The persisted form
/// carries an explicit `count` field; it is ignored on load and rebuilt
/// from the set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UsageBlob", into = "UsageBlob")]
pub struct UsageRecord {
    date: Option<NaiveDate>,
    threads: BTreeSet<ThreadId>,
}

/// Stored shape: `{"date": "YYYY-MM-DD" | null, "threads": [..], "count": n}`
#[derive(Serialize, Deserialize)]
struct UsageBlob {
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(default)]
    threads: Vec<ThreadId>,
    #[serde(default)]
    count: usize,
}

impl From<UsageBlob> for UsageRecord {
    fn from(blob: UsageBlob) -> Self {
        let threads: BTreeSet<ThreadId> = blob.threads.into_iter().collect();
        if threads.len() != blob.count {
            tracing::debug!(
                stored = blob.count,
                actual = threads.len(),
                "Usage count disagrees with thread set, using thread set"
            );
        }
        Self {
            date: blob.date,
            threads,
        }
    }
}

impl From<UsageRecord> for UsageBlob {
    fn from(record: UsageRecord) -> Self {
        let count = record.threads.len();
        Self {
            date: record.date,
            threads: record.threads.into_iter().collect(),
            count,
        }
    }
}

impl UsageRecord {
    /// Fresh record for `day`
    pub fn for_day(day: NaiveDate) -> Self {
        Self {
            date: Some(day),
            threads: BTreeSet::new(),
        }
    }

    /// Day this record belongs to (unset before first use)
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Number of distinct threads counted
    pub fn count(&self) -> usize {
        self.threads.len()
    }

    /// Whether `thread` was already counted
    pub fn contains(&self, thread: &ThreadId) -> bool {
        self.threads.contains(thread)
    }

    /// Counted threads in id order
    pub fn threads(&self) -> impl Iterator<Item = &ThreadId> {
        self.threads.iter()
    }

    /// Whether this record is for `day`
    pub fn is_for(&self, day: NaiveDate) -> bool {
        self.date == Some(day)
    }

    /// Drop everything and start over on `day`
    pub fn reset(&mut self, day: NaiveDate) {
        self.date = Some(day);
        self.threads.clear();
    }

    /// Count `thread`; returns false if it was already counted
    pub fn insert(&mut self, thread: ThreadId) -> bool {
        self.threads.insert(thread)
    }
}
