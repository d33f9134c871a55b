//! Configuration management command
//!
//! Provides CLI interface to view and edit system configuration.

use crate::system_config;
use crate::util::Paths;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

/// List all configuration values
pub async fn run_list(paths: &Paths) -> Result<()> {
    let config = paths.load_config()?;

    println!("{}", "System Configuration".bold());
    println!(
        "{}: {}\n",
        "Location".dimmed(),
        paths.config_file.display().dimmed()
    );

    println!("{}", "[quota]".yellow());
    println!(
        "  {} = {} {}",
        "daily_limit".cyan(),
        config.quota.daily_limit,
        "(threads per day)".dimmed()
    );

    println!("\n{}", "[scheduler]".yellow());
    println!(
        "  {} = {} {}",
        "tick_interval_ms".cyan(),
        config.scheduler.tick_interval_ms,
        format!("({}ms)", config.scheduler.tick_interval_ms).dimmed()
    );
    println!(
        "  {} = {}",
        "initial_ticks".cyan(),
        config.scheduler.initial_ticks
    );
    println!("  {} = {}", "max_ticks".cyan(), config.scheduler.max_ticks);

    println!("\n{}", "[payment]".yellow());
    println!(
        "  {} = {}",
        "extension_id".cyan(),
        config.payment.extension_id
    );
    println!(
        "  {} = {} {}",
        "sync_interval_secs".cyan(),
        config.payment.sync_interval_secs,
        format!("({} min)", config.payment.sync_interval_secs / 60).dimmed()
    );

    println!("\n{}", "Valid Ranges:".bold());
    println!("  daily_limit: 1-1000");
    println!("  tick_interval_ms: 50-60000");
    println!("  max_ticks: >= initial_ticks");

    Ok(())
}

/// Get a single configuration value
pub async fn run_get(paths: &Paths, key: &str) -> Result<()> {
    let config = paths.load_config()?;

    let value = match key {
        "quota.daily_limit" => config.quota.daily_limit.to_string(),
        "scheduler.tick_interval_ms" => config.scheduler.tick_interval_ms.to_string(),
        "scheduler.initial_ticks" => config.scheduler.initial_ticks.to_string(),
        "scheduler.max_ticks" => config.scheduler.max_ticks.to_string(),
        "payment.extension_id" => config.payment.extension_id.clone(),
        "payment.sync_interval_secs" => config.payment.sync_interval_secs.to_string(),
        _ => anyhow::bail!(
            "Unknown config key: {}. Use 'trimless config list' to see available keys.",
            key
        ),
    };

    println!("{}", value);
    Ok(())
}

/// Set a configuration value
pub async fn run_set(paths: &Paths, key: &str, value: &str) -> Result<()> {
    let mut config = paths.load_config()?;

    match key {
        "quota.daily_limit" => {
            config.quota.daily_limit = value
                .parse()
                .context("Invalid value: must be a positive integer")?;
        }
        "scheduler.tick_interval_ms" => {
            config.scheduler.tick_interval_ms = value
                .parse()
                .context("Invalid value: must be a positive integer")?;
        }
        "scheduler.initial_ticks" => {
            config.scheduler.initial_ticks = value
                .parse()
                .context("Invalid value: must be a positive integer")?;
        }
        "scheduler.max_ticks" => {
            config.scheduler.max_ticks = value
                .parse()
                .context("Invalid value: must be a positive integer")?;
        }
        "payment.extension_id" => config.payment.extension_id = value.to_string(),
        "payment.sync_interval_secs" => {
            config.payment.sync_interval_secs = value
                .parse()
                .context("Invalid value: must be a positive integer")?;
        }
        _ => anyhow::bail!(
            "Unknown config key: {}. Use 'trimless config list' to see available keys.",
            key
        ),
    }

    // Validate before saving
    config
        .validate()
        .context("Invalid configuration value")?;

    system_config::save(&paths.config_file, &config)?;

    println!("{} {} = {}", "✓".green(), key.cyan(), value);
    Ok(())
}

/// Show the config file path and optionally create it
pub async fn run_path(paths: &Paths, create: bool) -> Result<()> {
    let config_path = &paths.config_file;

    if create && system_config::init_if_missing(config_path)? {
        println!(
            "{} Created config file at: {}",
            "✓".green(),
            config_path.display()
        );
    } else if config_path.exists() {
        println!("{}", config_path.display());
    } else {
        println!("{}", config_path.display());
        println!(
            "{}",
            "File does not exist. Use --create to create it.".yellow()
        );
    }

    Ok(())
}

/// Show example configuration
pub async fn run_example() -> Result<()> {
    println!("{}", system_config::example_config());
    Ok(())
}
