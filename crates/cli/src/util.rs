//! Shared utilities for CLI commands

use crate::system_config::{self, SystemConfig};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use storage::SledStorage;

/// Where this invocation reads its profile and configuration
#[derive(Debug, Clone)]
pub struct Paths {
    pub profile_dir: PathBuf,
    pub config_file: PathBuf,
}

impl Paths {
    /// Resolve command-line overrides against the platform defaults
    pub fn resolve(profile: Option<PathBuf>, config: Option<PathBuf>) -> Result<Self> {
        let profile_dir = match profile {
            Some(dir) => dir,
            None => default_profile_dir().context("Could not determine data directory")?,
        };
        let config_file = match config {
            Some(file) => file,
            None => system_config::config_file_path()
                .context("Could not determine config file path")?,
        };

        Ok(Self {
            profile_dir,
            config_file,
        })
    }

    pub fn load_config(&self) -> Result<SystemConfig> {
        system_config::load(&self.config_file)
    }

    /// Open (creating if needed) the persisted profile
    pub fn open_storage(&self) -> Result<SledStorage> {
        open_profile(&self.profile_dir)
    }
}

/// `<data_dir>/trimless/profile`
pub fn default_profile_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("trimless").join("profile"))
}

pub fn open_profile(dir: &Path) -> Result<SledStorage> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create profile directory: {}", dir.display()))?;
    SledStorage::open(dir)
        .with_context(|| format!("Failed to open profile at {}", dir.display()))
}

/// Location hash for a `untrim` argument: hashes pass through, bare ids
/// are placed in the inbox
pub fn location_hash_for(reference: &str) -> String {
    if reference.starts_with('#') {
        reference.to_string()
    } else {
        format!("#inbox/{}", reference)
    }
}

/// Format timestamp as relative time ("2 hours ago")
pub fn format_relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);
    if elapsed < chrono::Duration::zero() {
        return "in the future".to_string();
    }

    let seconds = elapsed.num_seconds();
    if seconds < 60 {
        format!("{} seconds ago", seconds)
    } else if seconds < 3600 {
        format!("{} minutes ago", seconds / 60)
    } else if seconds < 86400 {
        format!("{} hours ago", seconds / 3600)
    } else if seconds < 604800 {
        format!("{} days ago", seconds / 86400)
    } else {
        format!("{} weeks ago", seconds / 604800)
    }
}
