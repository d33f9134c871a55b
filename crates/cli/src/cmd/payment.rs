//! Payment events recorded by hand

use crate::util::Paths;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use std::sync::Arc;
use tracing::info;

pub async fn run_paid(paths: &Paths) -> Result<()> {
    let background = super::background(paths)?;
    background.on_paid().await?;
    println!("{} Marked as paid", "✓".green());
    Ok(())
}

pub async fn run_trial(paths: &Paths, at: Option<&str>) -> Result<()> {
    let at = match at {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("Invalid timestamp '{}': expected RFC 3339", raw))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let background = super::background(paths)?;
    background.on_trial_started(at).await?;
    println!("{} Trial started at {}", "✓".green(), at.to_rfc3339());
    Ok(())
}

pub async fn run_sync(paths: &Paths, repeat: bool) -> Result<()> {
    let background = super::background(paths)?;

    if !repeat {
        if !background.sync_payment_state().await {
            anyhow::bail!("Payment sync failed");
        }
        println!("{} Payment state synced", "✓".green());
        return Ok(());
    }

    let background = Arc::new(background);
    tokio::select! {
        _ = background.run_payment_sync() => {}
        _ = tokio::signal::ctrl_c() => info!("Payment sync interrupted"),
    }
    Ok(())
}
