//! Tokio driver for the debounce state machine

use crate::debounce::{DebounceConfig, DebounceState, TickOutcome, TriggerOutcome};
use crate::Transform;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, trace};

/// Debounced transform runner
///
/// Cheap to clone; clones share one state machine. `trigger` must be called
/// from inside a tokio runtime since it may spawn the tick loop.
pub struct Debouncer<T: Transform> {
    inner: Arc<Inner<T>>,
}

struct Inner<T: Transform> {
    state: Mutex<DebounceState>,
    transform: T,
    enabled: watch::Receiver<bool>,
    /// Published after each step, once the transform has been called
    running: watch::Sender<bool>,
}

impl<T: Transform> Clone for Debouncer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transform> Debouncer<T> {
    /// Create an idle debouncer; `enabled` is read on every trigger and tick
    pub fn new(transform: T, enabled: watch::Receiver<bool>, config: DebounceConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(DebounceState::new(config)),
                transform,
                enabled,
                running: watch::Sender::new(false),
            }),
        }
    }

    /// Something changed on the page
    ///
    /// From idle the first tick (and its apply) runs before this returns.
    pub fn trigger(&self) {
        let enabled = self.inner.is_enabled();
        let outcome = self.inner.state.lock().trigger(enabled);

        match outcome {
            TriggerOutcome::Undo => self.inner.transform.undo(),
            TriggerOutcome::Start => {
                debug!("Debounce loop started");
                self.inner.running.send_replace(true);
                if self.inner.step() {
                    self.spawn_loop();
                }
            }
            TriggerOutcome::Extended { pending_ticks } => {
                trace!(pending_ticks, "Debounce loop extended");
            }
        }
    }

    /// Whether a tick loop is active
    pub fn is_running(&self) -> bool {
        self.inner.state.lock().is_running()
    }

    /// Ticks left before the loop goes idle
    pub fn pending_ticks(&self) -> u32 {
        self.inner.state.lock().pending_ticks()
    }

    /// Resolves once the loop is idle and its last transform call returned
    pub async fn wait_idle(&self) {
        let mut running = self.inner.running.subscribe();
        let _ = running.wait_for(|running| !*running).await;
    }

    pub fn transform(&self) -> &T {
        &self.inner.transform
    }

    fn spawn_loop(&self) {
        let inner = Arc::clone(&self.inner);
        let period = inner.state.lock().config().period;

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(period).await;
                if !inner.step() {
                    break;
                }
            }
            debug!("Debounce loop idle");
        });
    }
}

impl<T: Transform> Inner<T> {
    fn is_enabled(&self) -> bool {
        *self.enabled.borrow()
    }

    /// Run one tick; returns whether another one is scheduled
    fn step(&self) -> bool {
        let enabled = self.is_enabled();
        // Lock released before calling out so the transform may trigger again
        let outcome = self.state.lock().tick(enabled);

        let scheduled = match outcome {
            TickOutcome::Disabled => {
                self.transform.undo();
                false
            }
            TickOutcome::Continue => {
                self.transform.apply();
                true
            }
            TickOutcome::Finished => {
                self.transform.apply();
                false
            }
        };

        // A trigger may have restarted the loop in the meantime
        self.running.send_replace(self.state.lock().is_running());
        scheduled
    }
}
