//! Display options (synced across devices)

use crate::keys;
use serde_json::{Map, Value};

/// How untrimmed content is styled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayOptions {
    pub color_enabled: bool,
    pub color_value: String,
    pub color_border: String,
    pub indentation_enabled: bool,
    /// Left padding in pixels
    pub indentation_value: u32,
    /// Also expand the quoted text inside reply drafts
    pub reply_enabled: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            color_enabled: true,
            color_value: "#888888".to_string(),
            color_border: "#a8a8a8".to_string(),
            indentation_enabled: true,
            indentation_value: 32,
            reply_enabled: false,
        }
    }
}

impl DisplayOptions {
    /// Read options from a sync-area snapshot, defaulting missing or
    /// malformed entries
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let defaults = Self::default();

        Self {
            color_enabled: read_bool(map, keys::COLOR_ENABLED, defaults.color_enabled),
            color_value: read_string(map, keys::COLOR_VALUE, defaults.color_value),
            color_border: read_string(map, keys::COLOR_BORDER, defaults.color_border),
            indentation_enabled: read_bool(
                map,
                keys::INDENTATION_ENABLED,
                defaults.indentation_enabled,
            ),
            indentation_value: read_pixels(
                map,
                keys::INDENTATION_VALUE,
                defaults.indentation_value,
            ),
            reply_enabled: read_bool(map, keys::REPLY_ENABLED, defaults.reply_enabled),
        }
    }

    /// Sync-area representation
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(keys::COLOR_ENABLED.into(), Value::Bool(self.color_enabled));
        map.insert(keys::COLOR_VALUE.into(), Value::String(self.color_value.clone()));
        map.insert(keys::COLOR_BORDER.into(), Value::String(self.color_border.clone()));
        map.insert(
            keys::INDENTATION_ENABLED.into(),
            Value::Bool(self.indentation_enabled),
        );
        map.insert(
            keys::INDENTATION_VALUE.into(),
            Value::from(self.indentation_value),
        );
        map.insert(keys::REPLY_ENABLED.into(), Value::Bool(self.reply_enabled));
        map
    }

    /// CSS injected into the page for untrimmed content
    pub fn stylesheet(&self) -> String {
        let mut css = String::new();

        if self.color_enabled {
            css.push_str(&format!(
                ".trimless-content, .trimless-content * {{color: {} !important;border-color: {} !important;}}",
                self.color_value, self.color_border
            ));
        }

        if self.indentation_enabled {
            css.push_str(&format!(
                ".trimless-content {{padding-left: {}px !important;}}",
                self.indentation_value
            ));
        }

        css
    }
}

fn read_bool(map: &Map<String, Value>, key: &str, default: bool) -> bool {
    match map.get(key) {
        None | Some(Value::Null) => default,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            tracing::warn!(key, value = %other, "Expected boolean option, using default");
            default
        }
    }
}

fn read_string(map: &Map<String, Value>, key: &str, default: String) -> String {
    match map.get(key) {
        None | Some(Value::Null) => default,
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            tracing::warn!(key, value = %other, "Expected string option, using default");
            default
        }
    }
}

/// Pixel values arrive as numbers or, from the options form, numeric strings
fn read_pixels(map: &Map<String, Value>, key: &str, default: u32) -> u32 {
    let parsed = match map.get(key) {
        None | Some(Value::Null) => return default,
        Some(Value::Number(n)) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Some(Value::String(s)) => s.trim().parse::<u32>().ok(),
        Some(_) => None,
    };

    parsed.unwrap_or_else(|| {
        tracing::warn!(key, "Invalid pixel option, using default");
        default
    })
}
