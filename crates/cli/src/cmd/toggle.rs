//! Feature flag commands

use crate::util::Paths;
use anyhow::Result;
use owo_colors::OwoColorize;
use runtime::IconState;
use storage::profile;

/// Flip the flag, like a toolbar click
pub async fn run_toggle(paths: &Paths) -> Result<()> {
    let background = super::background(paths)?;
    let icon = background.toggle_enabled().await?;
    print_icon(&icon);
    Ok(())
}

/// Force the flag to `enabled`
pub async fn run_set(paths: &Paths, enabled: bool) -> Result<()> {
    let background = super::background(paths)?;
    profile::save_enabled(background.storage(), enabled).await?;
    print_icon(&background.icon_state().await?);
    Ok(())
}

fn print_icon(icon: &IconState) {
    if icon.path_19.contains("-gray") {
        println!("{} {}", "○".dimmed(), icon.title);
    } else {
        println!("{} {}", "●".green(), icon.title);
    }
}
