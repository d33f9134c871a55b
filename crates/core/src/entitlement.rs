//! Paid / trial entitlement

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Trial length in days, counted from activation
pub const TRIAL_DAYS: i64 = 7;

/// Trial length as a duration
pub fn trial_length() -> Duration {
    Duration::days(TRIAL_DAYS)
}

/// What the payment collaborator has told us about this user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementState {
    /// Set once a payment completes
    pub paid: bool,
    /// Set once when the trial starts, never changed afterwards
    pub trial_started_at: Option<DateTime<Utc>>,
}

/// Premium status as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PremiumStatus {
    /// Paid user
    Paid,
    /// Trial still running
    Trial { days_remaining: i64 },
    /// Free tier (no trial, or trial expired)
    Free { used_today: usize, limit: usize },
}

impl EntitlementState {
    /// Paid, or inside the trial window
    ///
    /// The window is half-open: exactly seven days after activation is
    /// already outside it.
    pub fn has_premium_access<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        self.paid || self.trial_active(now)
    }

    /// Trial started and less than seven days have elapsed
    pub fn trial_active<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        match self.trial_started_at {
            Some(started) => now.with_timezone(&Utc) - started < trial_length(),
            None => false,
        }
    }

    /// Whole days left in the trial, rounded up; 0 without a trial
    pub fn days_remaining_in_trial<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> i64 {
        let Some(started) = self.trial_started_at else {
            return 0;
        };

        let remaining = trial_length() - (now.with_timezone(&Utc) - started);
        if remaining <= Duration::zero() {
            return 0;
        }

        let day_ms = Duration::days(1).num_milliseconds();
        let remaining_ms = remaining.num_milliseconds();
        (remaining_ms + day_ms - 1) / day_ms
    }

    /// Status line for display; `used_today` only matters on the free tier
    pub fn status<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
        used_today: usize,
        limit: usize,
    ) -> PremiumStatus {
        if self.paid {
            PremiumStatus::Paid
        } else if self.trial_active(now) {
            PremiumStatus::Trial {
                days_remaining: self.days_remaining_in_trial(now),
            }
        } else {
            PremiumStatus::Free { used_today, limit }
        }
    }
}
