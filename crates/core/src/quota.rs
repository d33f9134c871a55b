//! Free-tier quota: distinct threads per local calendar day

use crate::clock::calendar_day;
use crate::{EntitlementState, ThreadId, UsageRecord};
use chrono::{DateTime, TimeZone};

/// Distinct threads a free user may untrim per day
pub const DAILY_FREE_LIMIT: usize = 5;

/// Outcome of asking to untrim one thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Paid or in trial; nothing counted
    Premium,
    /// Thread could not be identified; allowed without counting
    Untracked,
    /// Thread already counted today
    AlreadyCounted,
    /// Thread newly counted; the record changed and must be persisted
    Counted { used: usize },
    /// Quota exhausted; the caller shows the upgrade prompt
    Denied { used: usize, limit: usize },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Admission::Denied { .. })
    }

    /// Whether the usage record was modified by this decision
    pub fn is_mutation(&self) -> bool {
        matches!(self, Admission::Counted { .. })
    }
}

/// Per-page quota tracker over a cached usage record
///
/// The record is a cache of the persisted blob. Other tabs write the same
/// blob without coordination; the last write wins.
#[derive(Debug, Clone)]
pub struct QuotaTracker {
    record: UsageRecord,
    limit: usize,
}

impl Default for QuotaTracker {
    fn default() -> Self {
        Self::new(UsageRecord::default())
    }
}

impl QuotaTracker {
    /// Tracker with the standard daily limit
    pub fn new(record: UsageRecord) -> Self {
        Self::with_limit(record, DAILY_FREE_LIMIT)
    }

    pub fn with_limit(record: UsageRecord, limit: usize) -> Self {
        Self { record, limit }
    }

    pub fn record(&self) -> &UsageRecord {
        &self.record
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Replace the cached record after an explicit reload
    pub fn replace_record(&mut self, record: UsageRecord) {
        self.record = record;
    }

    /// Decide whether `thread` may be untrimmed at `now`
    ///
    /// A record from another day counts as empty. The reset to the new day
    /// is only written together with the first thread counted on it, so
    /// denial, premium access and unknown threads never touch the record.
    pub fn request_action<Tz: TimeZone>(
        &mut self,
        thread: Option<&ThreadId>,
        now: &DateTime<Tz>,
        entitlement: &EntitlementState,
    ) -> Admission {
        if entitlement.has_premium_access(now) {
            return Admission::Premium;
        }

        let Some(thread) = thread else {
            return Admission::Untracked;
        };

        let today = calendar_day(now);
        let same_day = self.record.is_for(today);

        if same_day && self.record.contains(thread) {
            return Admission::AlreadyCounted;
        }

        let used = if same_day { self.record.count() } else { 0 };
        if used >= self.limit {
            return Admission::Denied {
                used,
                limit: self.limit,
            };
        }

        if !same_day {
            tracing::debug!(%today, previous = ?self.record.date(), "New day, resetting usage");
            self.record.reset(today);
        }
        self.record.insert(thread.clone());

        Admission::Counted {
            used: self.record.count(),
        }
    }

    /// Threads counted on the calendar day of `now`
    pub fn usage_today<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> usize {
        if self.record.is_for(calendar_day(now)) {
            self.record.count()
        } else {
            0
        }
    }

    /// Whether a new thread would be denied right now
    pub fn is_limit_reached<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
        entitlement: &EntitlementState,
    ) -> bool {
        !entitlement.has_premium_access(now) && self.usage_today(now) >= self.limit
    }
}
