//! Debounced re-apply scheduling for Trimless
//!
//! Page events (navigation, visibility, clicks, load) arrive in bursts and
//! the host page keeps rendering for a while after each one. This crate
//! turns those triggers into a short, self-decaying series of transform
//! applications:
//! - A trigger from idle applies at once and keeps ticking once per period
//! - Triggers while ticking extend the run, up to a fixed cap
//! - A disabled feature undoes the transform and stops the loop

pub mod debounce;
pub mod driver;

pub use debounce::{DebounceConfig, DebounceState, TickOutcome, TriggerOutcome};
pub use driver::Debouncer;

/// The page transform the scheduler drives
///
/// Both calls are fire-and-forget. An implementation handles its own
/// failures; nothing it does can stop the tick loop.
pub trait Transform: Send + Sync + 'static {
    /// Apply (or re-apply) the transform
    fn apply(&self);

    /// Revert the transform
    fn undo(&self);
}
