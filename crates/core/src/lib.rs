//! Core logic for Trimless
//!
//! This crate provides:
//! - Thread identity parsed from the webmail location hash
//! - Daily usage record and the free-tier quota tracker
//! - Entitlement state (paid / 7-day trial) and premium derivation
//! - Display options stored in the synced area
//! - A clock abstraction pinned to local calendar days

pub mod clock;
pub mod entitlement;
pub mod options;
pub mod quota;
pub mod thread;
pub mod usage;

// Re-exports
pub use clock::{calendar_day, Clock, ManualClock, SystemClock};
pub use entitlement::{EntitlementState, PremiumStatus, TRIAL_DAYS};
pub use options::DisplayOptions;
pub use quota::{Admission, QuotaTracker, DAILY_FREE_LIMIT};
pub use thread::ThreadId;
pub use usage::UsageRecord;

/// Storage keys shared by every component that touches the profile
pub mod keys {
    /// Feature flag (local area)
    pub const ENABLED: &str = "trimless-enabled";
    /// Paid flag (local area)
    pub const PAID: &str = "trimless-paid";
    /// Trial activation timestamp, ISO-8601 or null (local area)
    pub const TRIAL_STARTED: &str = "trimless-trial-started";
    /// Daily usage blob (local area)
    pub const DAILY_USAGE: &str = "trimless-daily-usage";

    /// Display options (sync area)
    pub const COLOR_ENABLED: &str = "trimless-color-enabled";
    pub const COLOR_VALUE: &str = "trimless-color-value";
    pub const COLOR_BORDER: &str = "trimless-color-border";
    pub const INDENTATION_ENABLED: &str = "trimless-indentation-enabled";
    pub const INDENTATION_VALUE: &str = "trimless-indentation-value";
    pub const REPLY_ENABLED: &str = "trimless-reply-enabled";
}
