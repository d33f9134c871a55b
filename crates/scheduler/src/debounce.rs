//! Trigger/tick state machine
//!
//! Timing-free: the driver decides when `tick` runs. Kept separate so the
//! decay rules can be tested without a runtime.

use std::time::Duration;

/// Decay parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceConfig {
    /// Delay between ticks (default: 1s)
    pub period: Duration,
    /// Pending ticks granted by a trigger from idle (default: 2)
    pub initial_ticks: u32,
    /// Upper bound on pending ticks (default: 4)
    pub max_ticks: u32,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(1),
            initial_ticks: 2,
            max_ticks: 4,
        }
    }
}

/// What a trigger asks the driver to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Feature disabled: undo now, state untouched
    Undo,
    /// Was idle: run the first tick now
    Start,
    /// Already ticking: the run was extended (or was at the cap)
    Extended { pending_ticks: u32 },
}

/// What a tick asks the driver to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Feature disabled: undo, loop is now idle, no apply
    Disabled,
    /// Apply, then tick again after one period
    Continue,
    /// Apply, loop is now idle
    Finished,
}

/// Pending-tick counter plus running flag
///
/// Idle means `!is_running`; the only way back to idle is a tick that finds
/// no pending ticks or sees the feature disabled.
#[derive(Debug, Clone)]
pub struct DebounceState {
    config: DebounceConfig,
    pending_ticks: u32,
    is_running: bool,
}

impl Default for DebounceState {
    fn default() -> Self {
        Self::new(DebounceConfig::default())
    }
}

impl DebounceState {
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            config,
            pending_ticks: 0,
            is_running: false,
        }
    }

    pub fn config(&self) -> &DebounceConfig {
        &self.config
    }

    pub fn pending_ticks(&self) -> u32 {
        self.pending_ticks
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Something on the page changed
    pub fn trigger(&mut self, enabled: bool) -> TriggerOutcome {
        if !enabled {
            return TriggerOutcome::Undo;
        }

        if self.is_running {
            self.pending_ticks = (self.pending_ticks + 1).min(self.config.max_ticks);
            TriggerOutcome::Extended {
                pending_ticks: self.pending_ticks,
            }
        } else {
            self.pending_ticks = self.config.initial_ticks.min(self.config.max_ticks);
            self.is_running = true;
            TriggerOutcome::Start
        }
    }

    /// One iteration of the tick loop
    pub fn tick(&mut self, enabled: bool) -> TickOutcome {
        if !enabled {
            self.pending_ticks = 0;
            self.is_running = false;
            return TickOutcome::Disabled;
        }

        if self.pending_ticks > 0 {
            self.pending_ticks -= 1;
            TickOutcome::Continue
        } else {
            self.is_running = false;
            TickOutcome::Finished
        }
    }
}
