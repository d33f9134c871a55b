//! First-install setup

use crate::util::Paths;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use runtime::InstallReason;

pub async fn run(paths: &Paths) -> Result<()> {
    let background = super::background(paths)?;

    let report = background
        .on_installed(InstallReason::Install)
        .await
        .context("Failed to write install defaults")?
        .unwrap_or_default();

    if report.local_keys.is_empty() && !report.sync_defaults {
        println!("{}", "Profile already initialized".dimmed());
    } else {
        println!(
            "{} Initialized profile at {}",
            "✓".green(),
            paths.profile_dir.display()
        );
        for key in &report.local_keys {
            println!("  {} {}", "+".green(), key);
        }
        if report.sync_defaults {
            println!("  {} display options", "+".green());
        }
    }

    Ok(())
}
