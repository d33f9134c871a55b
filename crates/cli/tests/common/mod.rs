//! Common utilities for integration tests

pub mod cli;

use anyhow::Result;
use std::path::PathBuf;
use tempfile::TempDir;

/// Throwaway profile and config file, removed on drop
pub struct TestProfile {
    dir: TempDir,
}

impl TestProfile {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    /// Profile whose config uses a short tick so `watch` finishes quickly
    pub fn fast() -> Result<Self> {
        let profile = Self::new()?;
        profile.write_config("[scheduler]\ntick_interval_ms = 50\n")?;
        Ok(profile)
    }

    pub fn profile_dir(&self) -> PathBuf {
        self.dir.path().join("profile")
    }

    pub fn config_file(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    pub fn write_config(&self, contents: &str) -> Result<()> {
        std::fs::write(self.config_file(), contents)?;
        Ok(())
    }
}
