//! CLI command implementations

pub mod config;
pub mod install;
pub mod options;
pub mod payment;
pub mod status;
pub mod toggle;
pub mod untrim;
pub mod watch;

use crate::host::{NoTabs, OfflineProvider};
use crate::util::Paths;
use anyhow::{Context, Result};
use runtime::Background;
use storage::SledStorage;

/// Background worker over the on-disk profile
pub(crate) fn background(paths: &Paths) -> Result<Background<SledStorage, OfflineProvider, NoTabs>> {
    let config = paths.load_config()?;
    let storage = paths.open_storage()?;

    Background::new(
        storage,
        OfflineProvider::new(config.payment.extension_id.clone()),
        NoTabs,
        &config.payment_config(),
        config.background_config(),
    )
    .context("Failed to start background worker")
}
