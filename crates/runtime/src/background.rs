//! Background worker: install defaults, payment events, feature toggle

use crate::message::{Plan, RuntimeMessage};
use crate::{Result, RuntimeError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use storage::profile::{self, InstallReport};
use storage::{Area, Items, Storage};
use tm_core::{keys, EntitlementState};
use tracing::{debug, error, info, warn};

/// Placeholder shipped in the sample configuration
const PLACEHOLDER_EXTENSION_ID: &str = "your-extension-id";

/// User record reported by the payment provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaymentUser {
    pub paid: bool,
    pub trial_started_at: Option<DateTime<Utc>>,
}

impl From<PaymentUser> for EntitlementState {
    fn from(user: PaymentUser) -> Self {
        EntitlementState {
            paid: user.paid,
            trial_started_at: user.trial_started_at,
        }
    }
}

/// External payment collaborator
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Current payment state of this user
    async fn get_user(&self) -> Result<PaymentUser>;

    /// Open the trial sign-up page (e.g. "7-day")
    async fn open_trial_page(&self, label: &str) -> Result<()>;

    /// Open checkout, optionally preselecting a plan
    async fn open_payment_page(&self, plan: Option<Plan>) -> Result<()>;
}

/// Delivers messages to every open webmail tab
#[async_trait]
pub trait TabNotifier: Send + Sync {
    async fn notify_tabs(&self, message: RuntimeMessage);
}

/// Why the extension was (re)installed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallReason {
    Install,
    Update,
    BrowserUpdate,
}

/// Toolbar icon for the current feature state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconState {
    pub title: String,
    pub path_19: String,
    pub path_38: String,
}

impl IconState {
    pub fn for_enabled(enabled: bool) -> Self {
        let suffix = if enabled { "" } else { "-gray" };
        Self {
            title: if enabled {
                "Trimless is enabled".to_string()
            } else {
                "Trimless is disabled".to_string()
            },
            path_19: format!("images/icon-action{}-19.png", suffix),
            path_38: format!("images/icon-action{}-38.png", suffix),
        }
    }
}

/// Payment provider settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfig {
    /// Extension id registered with the payment provider
    pub extension_id: String,
}

impl PaymentConfig {
    /// The provider id must be set and not the sample placeholder
    pub fn validate(&self) -> Result<()> {
        let id = self.extension_id.trim();
        if id.is_empty() || id == PLACEHOLDER_EXTENSION_ID {
            return Err(RuntimeError::InvalidConfig(
                "payment extension id is not configured".to_string(),
            ));
        }
        Ok(())
    }
}

/// Worker tunables
#[derive(Debug, Clone)]
pub struct BackgroundConfig {
    /// Wait before opening the trial page after install (default: 1s)
    pub trial_page_delay: Duration,
    /// Period of the payment state sync (default: 30 min)
    pub sync_interval: Duration,
    /// Trial offered on install
    pub trial_label: String,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            trial_page_delay: Duration::from_secs(1),
            sync_interval: Duration::from_secs(30 * 60),
            trial_label: "7-day".to_string(),
        }
    }
}

/// The extension's background worker
pub struct Background<S, P, N> {
    storage: S,
    provider: P,
    tabs: N,
    config: BackgroundConfig,
}

impl<S, P, N> Background<S, P, N>
where
    S: Storage,
    P: PaymentProvider,
    N: TabNotifier,
{
    /// Fails when the payment configuration is unusable
    pub fn new(
        storage: S,
        provider: P,
        tabs: N,
        payment: &PaymentConfig,
        config: BackgroundConfig,
    ) -> Result<Self> {
        payment.validate()?;
        Ok(Self {
            storage,
            provider,
            tabs,
            config,
        })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// First install writes defaults and offers the trial; other reasons
    /// leave the profile alone
    pub async fn on_installed(&self, reason: InstallReason) -> Result<Option<InstallReport>> {
        if reason != InstallReason::Install {
            debug!(?reason, "Not a fresh install, keeping profile");
            return Ok(None);
        }

        let report = profile::initialize_defaults(&self.storage).await?;

        tokio::time::sleep(self.config.trial_page_delay).await;
        if let Err(e) = self.provider.open_trial_page(&self.config.trial_label).await {
            warn!(error = %e, "Failed to open trial page");
        }

        Ok(Some(report))
    }

    /// Payment completed
    pub async fn on_paid(&self) -> Result<()> {
        info!("User paid");
        let mut items = Items::new();
        items.insert(keys::PAID.into(), Value::Bool(true));
        self.storage.set(Area::Local, items).await?;

        self.tabs.notify_tabs(RuntimeMessage::PaymentUpdated).await;
        Ok(())
    }

    /// Trial activated at `at`
    pub async fn on_trial_started(&self, at: DateTime<Utc>) -> Result<()> {
        info!(%at, "Trial started");
        let mut items = Items::new();
        items.insert(
            keys::TRIAL_STARTED.into(),
            profile::encode_trial_started(Some(at)),
        );
        self.storage.set(Area::Local, items).await?;

        self.tabs.notify_tabs(RuntimeMessage::TrialStarted).await;
        Ok(())
    }

    /// Toolbar click: flip the feature flag
    pub async fn toggle_enabled(&self) -> Result<IconState> {
        let enabled = !profile::load_enabled(&self.storage).await?;
        profile::save_enabled(&self.storage, enabled).await?;
        info!(enabled, "Feature toggled");
        Ok(IconState::for_enabled(enabled))
    }

    /// Icon for a tab whose content script answered a ping
    pub async fn icon_state(&self) -> Result<IconState> {
        let enabled = profile::load_enabled(&self.storage).await?;
        Ok(IconState::for_enabled(enabled))
    }

    /// Requests from pages and the options page
    pub async fn on_message(&self, message: &RuntimeMessage) -> Result<()> {
        match message {
            RuntimeMessage::OpenTrial => {
                self.provider
                    .open_trial_page(&self.config.trial_label)
                    .await
            }
            RuntimeMessage::OpenPayment => self.provider.open_payment_page(None).await,
            RuntimeMessage::OpenPlan { plan } => {
                self.provider.open_payment_page(Some(*plan)).await
            }
            other => {
                debug!(message = ?other, "Ignoring message meant for page contexts");
                Ok(())
            }
        }
    }

    /// Copy the provider's view of the user into storage
    ///
    /// Returns whether it succeeded; on failure the stored state is left as
    /// it was.
    pub async fn sync_payment_state(&self) -> bool {
        let user = match self.provider.get_user().await {
            Ok(user) => user,
            Err(e) => {
                error!(error = %e, "Error syncing payment state");
                return false;
            }
        };

        match profile::save_entitlement(&self.storage, &user.into()).await {
            Ok(()) => {
                debug!(paid = user.paid, trial = ?user.trial_started_at, "Payment state synced");
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to store payment state");
                false
            }
        }
    }

    /// Sync now and then every `sync_interval`, forever
    pub async fn run_payment_sync(self: Arc<Self>) {
        let mut timer = tokio::time::interval(self.config.sync_interval);
        info!(interval = ?self.config.sync_interval, "Starting payment sync");

        loop {
            timer.tick().await;
            self.sync_payment_state().await;
        }
    }
}
