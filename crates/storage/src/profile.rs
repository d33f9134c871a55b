//! Typed access to the profile keys
//!
//! Malformed stored values never fail a read: they are logged and replaced
//! by the value a fresh install would have.

use crate::{Area, Items, Result, Storage};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tm_core::{keys, DisplayOptions, EntitlementState, UsageRecord};
use tracing::{info, warn};

/// Feature flag; absent means disabled
pub fn parse_enabled(value: Option<&Value>) -> bool {
    value.and_then(Value::as_bool).unwrap_or(false)
}

/// Paid flag; absent or malformed means not paid
pub fn parse_paid(value: Option<&Value>) -> bool {
    value.and_then(Value::as_bool).unwrap_or(false)
}

/// Trial start; null or absent means no trial
pub fn parse_trial_started(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => match DateTime::parse_from_rfc3339(s) {
            Ok(ts) => Some(ts.with_timezone(&Utc)),
            Err(e) => {
                warn!(value = %s, error = %e, "Unparseable trial start, ignoring");
                None
            }
        },
        Some(other) => {
            warn!(value = %other, "Unexpected trial start value, ignoring");
            None
        }
    }
}

/// Usage blob; absent or malformed gives an empty record
pub fn parse_usage(value: Option<&Value>) -> UsageRecord {
    match value {
        None | Some(Value::Null) => UsageRecord::default(),
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            warn!(error = %e, "Malformed usage record, starting empty");
            UsageRecord::default()
        }),
    }
}

/// Entitlement from a local-area snapshot
pub fn parse_entitlement(items: &Items) -> EntitlementState {
    EntitlementState {
        paid: parse_paid(items.get(keys::PAID)),
        trial_started_at: parse_trial_started(items.get(keys::TRIAL_STARTED)),
    }
}

/// Stored form of a trial start
pub fn encode_trial_started(at: Option<DateTime<Utc>>) -> Value {
    match at {
        Some(at) => Value::String(at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
        None => Value::Null,
    }
}

pub async fn load_enabled<S: Storage + ?Sized>(storage: &S) -> Result<bool> {
    let items = storage.get(Area::Local, &[keys::ENABLED]).await?;
    Ok(parse_enabled(items.get(keys::ENABLED)))
}

pub async fn save_enabled<S: Storage + ?Sized>(storage: &S, enabled: bool) -> Result<()> {
    let mut items = Items::new();
    items.insert(keys::ENABLED.into(), Value::Bool(enabled));
    storage.set(Area::Local, items).await
}

pub async fn load_entitlement<S: Storage + ?Sized>(storage: &S) -> Result<EntitlementState> {
    let items = storage
        .get(Area::Local, &[keys::PAID, keys::TRIAL_STARTED])
        .await?;
    Ok(parse_entitlement(&items))
}

/// Write both entitlement keys
pub async fn save_entitlement<S: Storage + ?Sized>(
    storage: &S,
    entitlement: &EntitlementState,
) -> Result<()> {
    let mut items = Items::new();
    items.insert(keys::PAID.into(), Value::Bool(entitlement.paid));
    items.insert(
        keys::TRIAL_STARTED.into(),
        encode_trial_started(entitlement.trial_started_at),
    );
    storage.set(Area::Local, items).await
}

pub async fn load_paid<S: Storage + ?Sized>(storage: &S) -> Result<bool> {
    let items = storage.get(Area::Local, &[keys::PAID]).await?;
    Ok(parse_paid(items.get(keys::PAID)))
}

pub async fn load_trial_started<S: Storage + ?Sized>(
    storage: &S,
) -> Result<Option<DateTime<Utc>>> {
    let items = storage.get(Area::Local, &[keys::TRIAL_STARTED]).await?;
    Ok(parse_trial_started(items.get(keys::TRIAL_STARTED)))
}

pub async fn load_usage<S: Storage + ?Sized>(storage: &S) -> Result<UsageRecord> {
    let items = storage.get(Area::Local, &[keys::DAILY_USAGE]).await?;
    Ok(parse_usage(items.get(keys::DAILY_USAGE)))
}

pub async fn save_usage<S: Storage + ?Sized>(storage: &S, record: &UsageRecord) -> Result<()> {
    let mut items = Items::new();
    items.insert(keys::DAILY_USAGE.into(), serde_json::to_value(record)?);
    storage.set(Area::Local, items).await
}

pub async fn load_display_options<S: Storage + ?Sized>(storage: &S) -> Result<DisplayOptions> {
    let items = storage.get_all(Area::Sync).await?;
    Ok(DisplayOptions::from_map(&items))
}

pub async fn save_display_options<S: Storage + ?Sized>(
    storage: &S,
    options: &DisplayOptions,
) -> Result<()> {
    storage.set(Area::Sync, options.to_map()).await
}

/// Keys written by `initialize_defaults`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub local_keys: Vec<String>,
    pub sync_defaults: bool,
}

/// First-install defaults; existing keys are never overwritten
///
/// Display options are written as a block, only when the synced area has
/// no colour setting yet (another device may have set them).
pub async fn initialize_defaults<S: Storage + ?Sized>(storage: &S) -> Result<InstallReport> {
    let mut report = InstallReport::default();

    let local = storage.get_all(Area::Local).await?;
    let mut missing = Items::new();
    let defaults = [
        (keys::ENABLED, Value::Bool(true)),
        (keys::PAID, Value::Bool(false)),
        (keys::TRIAL_STARTED, Value::Null),
        (
            keys::DAILY_USAGE,
            serde_json::to_value(UsageRecord::default())?,
        ),
    ];
    for (key, value) in defaults {
        if !local.contains_key(key) {
            missing.insert(key.to_string(), value);
            report.local_keys.push(key.to_string());
        }
    }
    if !missing.is_empty() {
        storage.set(Area::Local, missing).await?;
    }

    let sync = storage.get(Area::Sync, &[keys::COLOR_ENABLED]).await?;
    if sync.is_empty() {
        storage
            .set(Area::Sync, DisplayOptions::default().to_map())
            .await?;
        report.sync_defaults = true;
    }

    info!(
        local = ?report.local_keys,
        sync = report.sync_defaults,
        "Install defaults written"
    );
    Ok(report)
}
