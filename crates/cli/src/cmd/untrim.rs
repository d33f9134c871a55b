//! One quota-gated untrim outside the debounce loop

use crate::host::ConsolePage;
use crate::util::{self, Paths};
use anyhow::Result;
use owo_colors::OwoColorize;
use runtime::PageSession;
use std::sync::Arc;
use tm_core::{Admission, SystemClock};

pub async fn run(paths: &Paths, reference: &str) -> Result<()> {
    let config = paths.load_config()?;
    let storage = paths.open_storage()?;
    let page = ConsolePage::new(util::location_hash_for(reference));

    let session = PageSession::new(
        storage,
        page,
        Arc::new(SystemClock),
        config.session_config(),
    );
    session.reload().await;

    if !session.is_enabled() {
        println!(
            "{}",
            "Trimless is disabled. Turn it on with 'trimless enable'".yellow()
        );
        return Ok(());
    }

    match session.untrim().await {
        Admission::Premium => println!("  {}", "premium: not counted".dimmed()),
        Admission::Untracked => println!("  {}", "no thread here: not counted".dimmed()),
        Admission::AlreadyCounted => println!("  {}", "already counted today".dimmed()),
        Admission::Counted { used } => println!(
            "  {}",
            format!("{}/{} threads today", used, session.quota().limit()).dimmed()
        ),
        Admission::Denied { .. } => {}
    }

    Ok(())
}
