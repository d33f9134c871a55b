//! Display options command
//!
//! Options live in the synced area; a running session restyles as soon as
//! they change.

use crate::util::Paths;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use storage::profile;
use tm_core::DisplayOptions;

const KEYS: [&str; 6] = [
    "color.enabled",
    "color.value",
    "color.border",
    "indentation.enabled",
    "indentation.value",
    "reply.enabled",
];

fn get_value(options: &DisplayOptions, key: &str) -> Result<String> {
    let value = match key {
        "color.enabled" => options.color_enabled.to_string(),
        "color.value" => options.color_value.clone(),
        "color.border" => options.color_border.clone(),
        "indentation.enabled" => options.indentation_enabled.to_string(),
        "indentation.value" => options.indentation_value.to_string(),
        "reply.enabled" => options.reply_enabled.to_string(),
        _ => anyhow::bail!(
            "Unknown option: {}. Use 'trimless options list' to see available options.",
            key
        ),
    };
    Ok(value)
}

fn set_value(options: &mut DisplayOptions, key: &str, value: &str) -> Result<()> {
    match key {
        "color.enabled" => {
            options.color_enabled = value
                .parse()
                .context("Invalid value: must be 'true' or 'false'")?;
        }
        "color.value" => options.color_value = parse_color(value)?,
        "color.border" => options.color_border = parse_color(value)?,
        "indentation.enabled" => {
            options.indentation_enabled = value
                .parse()
                .context("Invalid value: must be 'true' or 'false'")?;
        }
        "indentation.value" => {
            options.indentation_value = value
                .parse()
                .context("Invalid value: must be a number of pixels")?;
        }
        "reply.enabled" => {
            options.reply_enabled = value
                .parse()
                .context("Invalid value: must be 'true' or 'false'")?;
        }
        _ => anyhow::bail!(
            "Unknown option: {}. Use 'trimless options list' to see available options.",
            key
        ),
    }
    Ok(())
}

/// `#rgb` or `#rrggbb`
fn parse_color(value: &str) -> Result<String> {
    let hex = value
        .strip_prefix('#')
        .context("Invalid colour: must start with '#'")?;
    if !matches!(hex.len(), 3 | 6) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        anyhow::bail!("Invalid colour '{}': expected #rgb or #rrggbb", value);
    }
    Ok(value.to_ascii_lowercase())
}

pub async fn run_list(paths: &Paths) -> Result<()> {
    let storage = paths.open_storage()?;
    let options = profile::load_display_options(&storage).await?;

    println!("{}", "Display Options".bold());
    for key in KEYS {
        println!("  {} = {}", key.cyan(), get_value(&options, key)?);
    }
    println!();
    println!("{}", "Stylesheet:".dimmed());
    println!("{}", options.stylesheet().dimmed());

    Ok(())
}

pub async fn run_get(paths: &Paths, key: &str) -> Result<()> {
    let storage = paths.open_storage()?;
    let options = profile::load_display_options(&storage).await?;
    println!("{}", get_value(&options, key)?);
    Ok(())
}

pub async fn run_set(paths: &Paths, key: &str, value: &str) -> Result<()> {
    let storage = paths.open_storage()?;
    let mut options = profile::load_display_options(&storage).await?;

    set_value(&mut options, key, value)?;
    profile::save_display_options(&storage, &options).await?;

    println!("{} {} = {}", "✓".green(), key.cyan(), value);
    Ok(())
}

pub async fn run_reset(paths: &Paths) -> Result<()> {
    let storage = paths.open_storage()?;
    profile::save_display_options(&storage, &DisplayOptions::default()).await?;
    println!("{} Display options reset to defaults", "✓".green());
    Ok(())
}
