//! System configuration (`config.toml`)
//!
//! Lives at `<config_dir>/trimless/config.toml` unless `--config` points
//! elsewhere. Missing file means defaults; missing keys mean defaults too.

use anyhow::{Context, Result};
use runtime::{BackgroundConfig, PaymentConfig, SessionConfig};
use scheduler::DebounceConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub quota: QuotaConfig,
    pub scheduler: SchedulerConfig,
    pub payment: PaymentSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Distinct threads per day on the free tier
    pub daily_limit: usize,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            daily_limit: tm_core::DAILY_FREE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub tick_interval_ms: u64,
    pub initial_ticks: u32,
    pub max_ticks: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        let debounce = DebounceConfig::default();
        Self {
            tick_interval_ms: debounce.period.as_millis() as u64,
            initial_ticks: debounce.initial_ticks,
            max_ticks: debounce.max_ticks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentSection {
    /// Id registered with the payment provider
    pub extension_id: String,
    pub sync_interval_secs: u64,
}

impl Default for PaymentSection {
    fn default() -> Self {
        Self {
            extension_id: "trimless".to_string(),
            sync_interval_secs: 30 * 60,
        }
    }
}

impl SystemConfig {
    /// Check every value against its allowed range
    pub fn validate(&self) -> Result<()> {
        if !(1..=1000).contains(&self.quota.daily_limit) {
            anyhow::bail!(
                "quota.daily_limit must be between 1 and 1000 (got {})",
                self.quota.daily_limit
            );
        }
        if !(50..=60_000).contains(&self.scheduler.tick_interval_ms) {
            anyhow::bail!(
                "scheduler.tick_interval_ms must be between 50 and 60000 (got {})",
                self.scheduler.tick_interval_ms
            );
        }
        if self.scheduler.initial_ticks == 0 {
            anyhow::bail!("scheduler.initial_ticks must be at least 1");
        }
        if self.scheduler.max_ticks < self.scheduler.initial_ticks {
            anyhow::bail!(
                "scheduler.max_ticks ({}) must be >= scheduler.initial_ticks ({})",
                self.scheduler.max_ticks,
                self.scheduler.initial_ticks
            );
        }
        if self.payment.sync_interval_secs == 0 {
            anyhow::bail!("payment.sync_interval_secs must be at least 1");
        }
        self.payment_config().validate()?;
        Ok(())
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            daily_limit: self.quota.daily_limit,
            debounce: DebounceConfig {
                period: Duration::from_millis(self.scheduler.tick_interval_ms),
                initial_ticks: self.scheduler.initial_ticks,
                max_ticks: self.scheduler.max_ticks,
            },
        }
    }

    pub fn payment_config(&self) -> PaymentConfig {
        PaymentConfig {
            extension_id: self.payment.extension_id.clone(),
        }
    }

    pub fn background_config(&self) -> BackgroundConfig {
        BackgroundConfig {
            sync_interval: Duration::from_secs(self.payment.sync_interval_secs),
            ..BackgroundConfig::default()
        }
    }
}

/// Default location of the config file
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("trimless").join("config.toml"))
}

/// Load from `path`, falling back to defaults when the file is absent
pub fn load(path: &Path) -> Result<SystemConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        return Ok(SystemConfig::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: SystemConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("Invalid config file: {}", path.display()))?;

    Ok(config)
}

/// Write `config` to `path`, creating parent directories
pub fn save(path: &Path, config: &SystemConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    Ok(())
}

/// Write the defaults if nothing exists at `path` yet
pub fn init_if_missing(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save(path, &SystemConfig::default())?;
    Ok(true)
}

/// Commented sample configuration
pub fn example_config() -> String {
    let defaults = SystemConfig::default();
    format!(
        r#"# Trimless configuration

[quota]
# Distinct threads a free user may untrim per local calendar day (1-1000)
daily_limit = {}

[scheduler]
# Delay between re-applies after a page event (50-60000)
tick_interval_ms = {}
# Re-applies granted by an event when idle
initial_ticks = {}
# Upper bound on pending re-applies (>= initial_ticks)
max_ticks = {}

[payment]
# Extension id registered with the payment provider
extension_id = "your-extension-id"
# Seconds between payment state syncs
sync_interval_secs = {}
"#,
        defaults.quota.daily_limit,
        defaults.scheduler.tick_interval_ms,
        defaults.scheduler.initial_ticks,
        defaults.scheduler.max_ticks,
        defaults.payment.sync_interval_secs,
    )
}
