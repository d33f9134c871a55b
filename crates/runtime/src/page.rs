//! Page-context session (one per open webmail tab)
//!
//! Owns everything the content script used to keep in globals: the feature
//! flag, cached entitlement, the quota tracker and display options. Page
//! events go through the debouncer; every debounced apply asks the quota
//! tracker before touching the page.

use crate::message::{Response, RuntimeMessage};
use parking_lot::Mutex;
use scheduler::{DebounceConfig, Debouncer, Transform};
use std::sync::Arc;
use storage::{profile, Area, ChangeSet, Storage};
use tm_core::{keys, Admission, Clock, DisplayOptions, EntitlementState, QuotaTracker, ThreadId};
use tokio::sync::{broadcast, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

/// The page the session runs against (DOM side)
pub trait PageHost: Send + Sync + 'static {
    /// Current location hash, e.g. `#inbox/18c2f0a1b2`
    fn location_hash(&self) -> String;

    /// Reveal trimmed content; `expand_replies` also opens quoted text in drafts
    fn apply_untrim(&self, expand_replies: bool);

    /// Put trimmed content back
    fn undo_untrim(&self);

    /// Replace the injected stylesheet
    fn apply_style(&self, css: &str);

    /// Tell the user the free quota is used up
    fn show_upgrade_prompt(&self, used: usize, limit: usize);
}

impl<T: PageHost + ?Sized> PageHost for Arc<T> {
    fn location_hash(&self) -> String {
        (**self).location_hash()
    }

    fn apply_untrim(&self, expand_replies: bool) {
        (**self).apply_untrim(expand_replies)
    }

    fn undo_untrim(&self) {
        (**self).undo_untrim()
    }

    fn apply_style(&self, css: &str) {
        (**self).apply_style(css)
    }

    fn show_upgrade_prompt(&self, used: usize, limit: usize) {
        (**self).show_upgrade_prompt(used, limit)
    }
}

/// Page events that may need the transform re-applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    Load,
    HashChange,
    VisibilityChange,
    /// A click; clicks on the page's own "show trimmed content" control are
    /// left alone
    Click { on_trim_toggle: bool },
}

/// Session tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub daily_limit: usize,
    pub debounce: DebounceConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            daily_limit: tm_core::DAILY_FREE_LIMIT,
            debounce: DebounceConfig::default(),
        }
    }
}

/// State cached by one page context
struct SessionState {
    entitlement: EntitlementState,
    quota: QuotaTracker,
    options: DisplayOptions,
}

struct SessionInner<S, H> {
    storage: S,
    host: H,
    clock: Arc<dyn Clock>,
    state: Mutex<SessionState>,
    enabled: watch::Sender<bool>,
    /// Untrims spawned by the debouncer
    untrims: Mutex<JoinSet<()>>,
}

/// Debounced transform: quota-gated untrim, plain undo
struct Untrimmer<S, H> {
    inner: Arc<SessionInner<S, H>>,
}

impl<S, H> Transform for Untrimmer<S, H>
where
    S: Storage + 'static,
    H: PageHost,
{
    fn apply(&self) {
        let inner = Arc::clone(&self.inner);
        let mut untrims = self.inner.untrims.lock();
        while untrims.try_join_next().is_some() {}
        untrims.spawn(async move {
            inner.untrim().await;
        });
    }

    fn undo(&self) {
        self.inner.host.undo_untrim();
    }
}

/// One page context
pub struct PageSession<S, H>
where
    S: Storage + 'static,
    H: PageHost,
{
    inner: Arc<SessionInner<S, H>>,
    debouncer: Debouncer<Untrimmer<S, H>>,
}

impl<S, H> Clone for PageSession<S, H>
where
    S: Storage + 'static,
    H: PageHost,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            debouncer: self.debouncer.clone(),
        }
    }
}

impl<S, H> PageSession<S, H>
where
    S: Storage + 'static,
    H: PageHost,
{
    /// Build a session with empty state; call `start` to load and run it
    pub fn new(storage: S, host: H, clock: Arc<dyn Clock>, config: SessionConfig) -> Self {
        let (enabled, enabled_rx) = watch::channel(false);
        let inner = Arc::new(SessionInner {
            storage,
            host,
            clock,
            state: Mutex::new(SessionState {
                entitlement: EntitlementState::default(),
                quota: QuotaTracker::with_limit(Default::default(), config.daily_limit),
                options: DisplayOptions::default(),
            }),
            enabled,
            untrims: Mutex::new(JoinSet::new()),
        });

        let debouncer = Debouncer::new(
            Untrimmer {
                inner: Arc::clone(&inner),
            },
            enabled_rx,
            config.debounce,
        );

        Self { inner, debouncer }
    }

    /// Load state, style the page, listen for storage changes and run the
    /// first debounced apply
    pub async fn start(&self) -> JoinHandle<()> {
        self.reload().await;
        let listener = self.spawn_change_listener();
        self.debouncer.trigger();
        listener
    }

    /// Re-read everything from storage
    ///
    /// On failure the cached state is kept and the page stays usable.
    pub async fn reload(&self) {
        let inner = &self.inner;

        match inner.storage.get_all(Area::Local).await {
            Ok(local) => {
                let enabled = profile::parse_enabled(local.get(keys::ENABLED));
                let entitlement = profile::parse_entitlement(&local);
                let usage = profile::parse_usage(local.get(keys::DAILY_USAGE));
                {
                    let mut state = inner.state.lock();
                    state.entitlement = entitlement;
                    state.quota.replace_record(usage);
                }
                inner.enabled.send_replace(enabled);
            }
            Err(e) => {
                error!(error = %e, "Failed to load state (extension may have been reloaded)");
            }
        }

        self.refresh_options().await;
    }

    /// Route a page event to the debouncer
    pub fn on_event(&self, event: PageEvent) {
        match event {
            PageEvent::Load | PageEvent::HashChange | PageEvent::VisibilityChange => {
                self.debouncer.trigger()
            }
            PageEvent::Click { on_trim_toggle } => {
                if self.is_enabled() && !on_trim_toggle {
                    self.debouncer.trigger();
                }
            }
        }
    }

    /// React to a storage write from any context
    pub async fn on_storage_change(&self, changes: &ChangeSet) {
        if changes.area == Area::Sync {
            self.refresh_options().await;
            self.debouncer.trigger();
            return;
        }

        if let Some(change) = changes.get(keys::ENABLED) {
            let enabled = profile::parse_enabled(change.new_value.as_ref());
            self.inner.enabled.send_replace(enabled);
            info!(enabled, "Feature toggled");
            if enabled {
                self.debouncer.trigger();
            } else {
                self.inner.host.undo_untrim();
            }
        }

        if let Some(change) = changes.get(keys::PAID) {
            self.inner.state.lock().entitlement.paid =
                profile::parse_paid(change.new_value.as_ref());
        }

        if let Some(change) = changes.get(keys::TRIAL_STARTED) {
            self.inner.state.lock().entitlement.trial_started_at =
                profile::parse_trial_started(change.new_value.as_ref());
        }
    }

    /// Handle a message from the background worker
    pub async fn on_message(&self, message: &RuntimeMessage) -> Option<Response> {
        match message {
            RuntimeMessage::PaymentUpdated => {
                match profile::load_paid(&self.inner.storage).await {
                    Ok(paid) => self.inner.state.lock().entitlement.paid = paid,
                    Err(e) => warn!(error = %e, "Failed to refresh paid state, keeping cached"),
                }
                None
            }
            RuntimeMessage::TrialStarted => {
                match profile::load_trial_started(&self.inner.storage).await {
                    Ok(at) => self.inner.state.lock().entitlement.trial_started_at = at,
                    Err(e) => warn!(error = %e, "Failed to refresh trial state, keeping cached"),
                }
                None
            }
            RuntimeMessage::Ping => Some(Response { trimless: true }),
            other => {
                debug!(message = ?other, "Ignoring message meant for the background worker");
                None
            }
        }
    }

    /// Forward storage notifications to `on_storage_change` until the
    /// store goes away
    pub fn spawn_change_listener(&self) -> JoinHandle<()> {
        let mut rx = self.inner.storage.subscribe();
        let session = self.clone();

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(changes) => session.on_storage_change(&changes).await,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "Missed storage notifications, reloading");
                        session.reload().await;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// One quota-gated untrim, as run by each debounced apply
    pub async fn untrim(&self) -> Admission {
        self.inner.untrim().await
    }

    pub fn is_enabled(&self) -> bool {
        *self.inner.enabled.borrow()
    }

    pub fn entitlement(&self) -> EntitlementState {
        self.inner.state.lock().entitlement
    }

    pub fn display_options(&self) -> DisplayOptions {
        self.inner.state.lock().options.clone()
    }

    /// Snapshot of the cached quota tracker
    pub fn quota(&self) -> QuotaTracker {
        self.inner.state.lock().quota.clone()
    }

    /// Whether the debounce loop is currently ticking
    pub fn is_ticking(&self) -> bool {
        self.debouncer.is_running()
    }

    /// Wait until the debounce loop is idle and every spawned untrim has
    /// finished
    pub async fn settle(&self) {
        loop {
            self.debouncer.wait_idle().await;

            let mut untrims = std::mem::take(&mut *self.inner.untrims.lock());
            if untrims.is_empty() && !self.is_ticking() {
                return;
            }
            while let Some(joined) = untrims.join_next().await {
                if let Err(e) = joined {
                    error!(error = %e, "Untrim task failed");
                }
            }
        }
    }

    async fn refresh_options(&self) {
        match profile::load_display_options(&self.inner.storage).await {
            Ok(options) => {
                let css = options.stylesheet();
                self.inner.state.lock().options = options;
                self.inner.host.apply_style(&css);
            }
            Err(e) => warn!(error = %e, "Failed to load display options, keeping cached"),
        }
    }
}

impl<S, H> SessionInner<S, H>
where
    S: Storage + 'static,
    H: PageHost,
{
    async fn untrim(&self) -> Admission {
        let thread = ThreadId::from_location_hash(&self.host.location_hash());
        let now = self.clock.now();

        let (admission, changed, expand_replies) = {
            let mut state = self.state.lock();
            let entitlement = state.entitlement;
            let admission = state.quota.request_action(thread.as_ref(), &now, &entitlement);
            let changed = admission
                .is_mutation()
                .then(|| state.quota.record().clone());
            (admission, changed, state.options.reply_enabled)
        };

        // A failed write is picked up by the next mutation, which writes the
        // whole record again
        if let Some(record) = changed {
            if let Err(e) = profile::save_usage(&self.storage, &record).await {
                error!(error = %e, "Failed to save usage data (extension may have been reloaded)");
            }
        }

        match admission {
            Admission::Denied { used, limit } => {
                info!(thread = ?thread, used, limit, "Daily limit reached");
                self.host.show_upgrade_prompt(used, limit);
            }
            _ => {
                debug!(thread = ?thread, ?admission, "Untrimming");
                self.host.apply_untrim(expand_replies);
            }
        }

        admission
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, FixedOffset, Utc};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use storage::{Items, MemoryStorage};
    use tm_core::ManualClock;

    #[derive(Default)]
    struct FakePage {
        hash: Mutex<String>,
        applied: AtomicUsize,
        undone: AtomicUsize,
        prompts: AtomicUsize,
        styles: Mutex<Vec<String>>,
    }

    impl FakePage {
        fn navigate(&self, hash: &str) {
            *self.hash.lock() = hash.to_string();
        }
        fn applied(&self) -> usize {
            self.applied.load(Ordering::SeqCst)
        }
        fn undone(&self) -> usize {
            self.undone.load(Ordering::SeqCst)
        }
        fn prompts(&self) -> usize {
            self.prompts.load(Ordering::SeqCst)
        }
        fn last_style(&self) -> Option<String> {
            self.styles.lock().last().cloned()
        }
    }

    impl PageHost for FakePage {
        fn location_hash(&self) -> String {
            self.hash.lock().clone()
        }
        fn apply_untrim(&self, _expand_replies: bool) {
            self.applied.fetch_add(1, Ordering::SeqCst);
        }
        fn undo_untrim(&self) {
            self.undone.fetch_add(1, Ordering::SeqCst);
        }
        fn apply_style(&self, css: &str) {
            self.styles.lock().push(css.to_string());
        }
        fn show_upgrade_prompt(&self, _used: usize, _limit: usize) {
            self.prompts.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn noon() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2026-10-19T12:00:00+02:00").unwrap()
    }

    fn session(
        storage: &MemoryStorage,
        clock: &Arc<ManualClock>,
    ) -> (PageSession<MemoryStorage, Arc<FakePage>>, Arc<FakePage>) {
        let page = Arc::new(FakePage::default());
        let session = PageSession::new(
            storage.clone(),
            Arc::clone(&page),
            Arc::clone(clock) as Arc<dyn Clock>,
            SessionConfig::default(),
        );
        (session, page)
    }

    async fn installed() -> MemoryStorage {
        let storage = MemoryStorage::new();
        profile::initialize_defaults(&storage).await.unwrap();
        storage
    }

    #[tokio::test]
    async fn test_quota_gates_untrim() {
        let storage = installed().await;
        let clock = Arc::new(ManualClock::new(noon()));
        let (session, page) = session(&storage, &clock);
        session.reload().await;

        for i in 0..5 {
            page.navigate(&format!("#inbox/{:x}", 0xa0 + i));
            assert!(session.untrim().await.is_allowed());
        }

        page.navigate("#inbox/ff");
        assert_eq!(
            session.untrim().await,
            Admission::Denied { used: 5, limit: 5 }
        );
        assert_eq!(page.prompts(), 1);
        assert_eq!(page.applied(), 5);

        // Persisted for other tabs
        let stored = profile::load_usage(&storage).await.unwrap();
        assert_eq!(stored.count(), 5);

        // Back to a counted thread
        page.navigate("#inbox/a0");
        assert_eq!(session.untrim().await, Admission::AlreadyCounted);
    }

    #[tokio::test]
    async fn test_list_view_is_untracked() {
        let storage = installed().await;
        let clock = Arc::new(ManualClock::new(noon()));
        let (session, page) = session(&storage, &clock);
        session.reload().await;

        page.navigate("#inbox");
        assert_eq!(session.untrim().await, Admission::Untracked);
        assert_eq!(profile::load_usage(&storage).await.unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_failed_save_retried_on_next_mutation() {
        let storage = installed().await;
        let clock = Arc::new(ManualClock::new(noon()));
        let (session, page) = session(&storage, &clock);
        session.reload().await;

        storage.set_unavailable(true);
        page.navigate("#inbox/a1");
        assert!(session.untrim().await.is_allowed());
        assert_eq!(session.quota().record().count(), 1);

        storage.set_unavailable(false);
        assert_eq!(profile::load_usage(&storage).await.unwrap().count(), 0);

        page.navigate("#inbox/a2");
        session.untrim().await;
        assert_eq!(profile::load_usage(&storage).await.unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_entitlement_follows_storage_changes() {
        let storage = installed().await;
        let clock = Arc::new(ManualClock::new(noon()));
        let (session, page) = session(&storage, &clock);
        session.reload().await;
        let mut rx = storage.subscribe();

        let mut items = Items::new();
        items.insert(keys::PAID.into(), json!(true));
        storage.set(Area::Local, items).await.unwrap();
        session.on_storage_change(&rx.recv().await.unwrap()).await;
        assert!(session.entitlement().paid);

        for i in 0..10 {
            page.navigate(&format!("#inbox/{:x}", 0xb0 + i));
            assert_eq!(session.untrim().await, Admission::Premium);
        }
        assert_eq!(profile::load_usage(&storage).await.unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_message_refresh_keeps_cache_on_failure() {
        let storage = installed().await;
        let clock = Arc::new(ManualClock::new(noon()));
        let (session, _page) = session(&storage, &clock);
        session.reload().await;

        let started = (noon() - Duration::days(1)).with_timezone(&Utc);
        profile::save_entitlement(
            &storage,
            &EntitlementState {
                paid: false,
                trial_started_at: Some(started),
            },
        )
        .await
        .unwrap();

        assert_eq!(session.on_message(&RuntimeMessage::TrialStarted).await, None);
        assert_eq!(session.entitlement().trial_started_at, Some(started));

        storage.set_unavailable(true);
        session.on_message(&RuntimeMessage::PaymentUpdated).await;
        assert_eq!(session.entitlement().trial_started_at, Some(started));
        assert!(!session.entitlement().paid);

        assert_eq!(
            session.on_message(&RuntimeMessage::Ping).await,
            Some(Response { trimless: true })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_applies_and_styles() {
        let storage = installed().await;
        let clock = Arc::new(ManualClock::new(noon()));
        let (session, page) = session(&storage, &clock);
        page.navigate("#inbox/c0");

        let listener = session.start().await;
        session.settle().await;

        assert!(session.is_enabled());
        assert_eq!(page.applied(), 3);
        assert!(!session.is_ticking());
        assert_eq!(
            page.last_style(),
            Some(DisplayOptions::default().stylesheet())
        );
        // Repeats on one thread count once
        assert_eq!(profile::load_usage(&storage).await.unwrap().count(), 1);
        listener.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_synced_options_restyle_and_reapply() {
        let storage = installed().await;
        let clock = Arc::new(ManualClock::new(noon()));
        let (session, page) = session(&storage, &clock);
        page.navigate("#inbox/c1");

        let listener = session.start().await;
        session.settle().await;
        assert_eq!(page.applied(), 3);

        let options = DisplayOptions {
            indentation_value: 12,
            ..DisplayOptions::default()
        };
        profile::save_display_options(&storage, &options).await.unwrap();
        // Let the listener pick the change up
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        session.settle().await;

        assert_eq!(session.display_options(), options);
        assert_eq!(page.last_style(), Some(options.stylesheet()));
        assert_eq!(page.applied(), 6);
        assert!(!session.is_ticking());
        listener.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_disable_from_another_context() {
        let storage = installed().await;
        let clock = Arc::new(ManualClock::new(noon()));
        let (session, page) = session(&storage, &clock);
        page.navigate("#inbox/c0");

        let listener = session.start().await;
        profile::save_enabled(&storage, false).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;

        assert!(!session.is_enabled());
        assert!(page.undone() >= 1);
        assert!(!session.is_ticking());

        let applied = page.applied();
        session.on_event(PageEvent::HashChange);
        session.on_event(PageEvent::Click { on_trim_toggle: false });
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        assert_eq!(page.applied(), applied);
        listener.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_on_trim_toggle_ignored() {
        let storage = installed().await;
        let clock = Arc::new(ManualClock::new(noon()));
        let (session, page) = session(&storage, &clock);
        session.reload().await;

        session.on_event(PageEvent::Click { on_trim_toggle: true });
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        assert_eq!(page.applied(), 0);

        session.on_event(PageEvent::Click { on_trim_toggle: false });
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        assert_eq!(page.applied(), 3);
    }

    #[tokio::test]
    async fn test_tabs_race_last_writer_wins() {
        let storage = installed().await;
        let clock = Arc::new(ManualClock::new(noon()));
        let (tab_a, page_a) = session(&storage, &clock);
        let (tab_b, page_b) = session(&storage, &clock);
        tab_a.reload().await;
        tab_b.reload().await;

        for i in 0..4 {
            page_a.navigate(&format!("#inbox/{:x}", 0xd0 + i));
            tab_a.untrim().await;
        }
        // Tab B never reloaded, so it still sees an empty record
        page_b.navigate("#inbox/e0");
        assert_eq!(tab_b.untrim().await, Admission::Counted { used: 1 });

        let stored = profile::load_usage(&storage).await.unwrap();
        assert_eq!(stored.count(), 1);
    }

    #[tokio::test]
    async fn test_next_day_fresh_quota() {
        let storage = installed().await;
        let clock = Arc::new(ManualClock::new(noon()));
        let (session, page) = session(&storage, &clock);
        session.reload().await;

        for i in 0..5 {
            page.navigate(&format!("#inbox/{:x}", 0xa0 + i));
            session.untrim().await;
        }
        page.navigate("#inbox/ff");
        assert!(!session.untrim().await.is_allowed());

        clock.advance(Duration::days(1));
        assert_eq!(session.untrim().await, Admission::Counted { used: 1 });
    }
}
