//! Show feature state, plan and today's usage

use crate::util::{self, Paths};
use anyhow::{Context, Result};
use chrono::Utc;
use owo_colors::OwoColorize;
use storage::profile;
use tm_core::{Clock, PremiumStatus, QuotaTracker, SystemClock};

pub async fn run(paths: &Paths) -> Result<()> {
    let config = paths.load_config()?;
    let storage = paths.open_storage()?;

    let enabled = profile::load_enabled(&storage)
        .await
        .context("Failed to read feature flag")?;
    let entitlement = profile::load_entitlement(&storage)
        .await
        .context("Failed to read entitlement")?;
    let usage = profile::load_usage(&storage)
        .await
        .context("Failed to read usage")?;

    let now = SystemClock.now();
    let quota = QuotaTracker::with_limit(usage, config.quota.daily_limit);
    let used_today = quota.usage_today(&now);

    println!("{}", "Trimless Status".bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();

    println!("Profile:       {}", paths.profile_dir.display().to_string().cyan());
    print!("Feature:       ");
    if enabled {
        println!("{}", "Enabled ✓".green());
    } else {
        println!("{}", "Disabled".yellow());
        println!("  {}", "Tip: Turn it on with 'trimless enable'".dimmed());
    }
    println!();

    print!("Plan:          ");
    match entitlement.status(&now, used_today, quota.limit()) {
        PremiumStatus::Paid => println!("{}", "Paid".green()),
        PremiumStatus::Trial { days_remaining } => {
            println!("{} ({} days left)", "Trial".green(), days_remaining)
        }
        PremiumStatus::Free { used_today, limit } => {
            let line = format!("Free ({}/{} threads today)", used_today, limit);
            if used_today >= limit {
                println!("{}", line.red());
            } else {
                println!("{}", line);
            }
        }
    }
    if let Some(started) = entitlement.trial_started_at {
        println!(
            "  Trial started: {}",
            util::format_relative_time(started, Utc::now())
        );
    }
    println!();

    println!("Today:");
    if used_today == 0 {
        println!("  {}", "No threads untrimmed yet".dimmed());
    } else {
        for thread in quota.record().threads() {
            println!("  - {}", thread);
        }
    }

    Ok(())
}
