//! Terminal stand-ins for the browser: a page that prints what it would
//! do, and payment/tab collaborators for the background worker

use async_trait::async_trait;
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use runtime::{
    PageHost, PaymentProvider, PaymentUser, Plan, RuntimeError, RuntimeMessage, TabNotifier,
};
use std::sync::Arc;
use tracing::debug;

/// A page whose DOM is stdout
#[derive(Debug, Default)]
pub struct ConsolePage {
    hash: Mutex<String>,
}

impl ConsolePage {
    pub fn new(hash: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            hash: Mutex::new(hash.into()),
        })
    }

    pub fn navigate(&self, hash: &str) {
        *self.hash.lock() = hash.to_string();
    }
}

impl PageHost for ConsolePage {
    fn location_hash(&self) -> String {
        self.hash.lock().clone()
    }

    fn apply_untrim(&self, expand_replies: bool) {
        let hash = self.location_hash();
        if expand_replies {
            println!("{} {} (replies expanded)", "untrim".green(), hash);
        } else {
            println!("{} {}", "untrim".green(), hash);
        }
    }

    fn undo_untrim(&self) {
        println!("{}", "undo".yellow());
    }

    fn apply_style(&self, css: &str) {
        debug!(css, "Stylesheet applied");
    }

    fn show_upgrade_prompt(&self, used: usize, limit: usize) {
        println!(
            "{} {}/{} threads used today. Upgrade for unlimited access.",
            "limit".red(),
            used,
            limit
        );
    }
}

/// Payment collaborator for a profile without a browser
///
/// Opening a page prints where the user would be sent. There is no remote
/// account to query, so syncing is unavailable.
#[derive(Debug, Clone)]
pub struct OfflineProvider {
    extension_id: String,
}

impl OfflineProvider {
    pub fn new(extension_id: impl Into<String>) -> Self {
        Self {
            extension_id: extension_id.into(),
        }
    }
}

#[async_trait]
impl PaymentProvider for OfflineProvider {
    async fn get_user(&self) -> runtime::Result<PaymentUser> {
        Err(RuntimeError::Payment(format!(
            "no payment provider reachable for '{}'",
            self.extension_id
        )))
    }

    async fn open_trial_page(&self, label: &str) -> runtime::Result<()> {
        println!("{} {} trial for {}", "open".cyan(), label, self.extension_id);
        Ok(())
    }

    async fn open_payment_page(&self, plan: Option<Plan>) -> runtime::Result<()> {
        match plan {
            Some(plan) => println!("{} {} checkout for {}", "open".cyan(), plan, self.extension_id),
            None => println!("{} checkout for {}", "open".cyan(), self.extension_id),
        }
        Ok(())
    }
}

/// No tabs are open from the terminal; sessions in this process still
/// see the storage notifications
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTabs;

#[async_trait]
impl TabNotifier for NoTabs {
    async fn notify_tabs(&self, message: RuntimeMessage) {
        debug!(?message, "No tabs to notify");
    }
}
