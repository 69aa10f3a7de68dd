//! TOML-based application preferences.
//!
//! Preferences only: the hydration state itself (remaining target, daily
//! goal, reminder interval, schedule) lives in the database kv store so that
//! every mutation is persisted next to the drink log.
//!
//! Stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

use super::data_dir;

/// Notification preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Intake logging preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Amount logged when `drink` is invoked without an explicit amount.
    #[serde(default = "default_drink_ml")]
    pub default_drink_ml: f64,
    /// Quick-add amounts surfaced by UI layers.
    #[serde(default = "default_quick_add_ml")]
    pub quick_add_ml: Vec<f64>,
}

/// Reminder preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Interval choices offered by the settings surface, in minutes.
    #[serde(default = "default_interval_choices_min")]
    pub interval_choices_min: Vec<u64>,
}

/// Application preferences.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub intake: IntakeConfig,
    #[serde(default)]
    pub reminder: ReminderConfig,
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_drink_ml() -> f64 {
    250.0
}
fn default_quick_add_ml() -> Vec<f64> {
    vec![100.0, 250.0, 500.0]
}
fn default_interval_choices_min() -> Vec<u64> {
    vec![5, 15, 30, 45, 60, 90, 120, 180, 240]
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            default_drink_ml: default_drink_ml(),
            quick_add_ml: default_quick_add_ml(),
        }
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            interval_choices_min: default_interval_choices_min(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notifications: NotificationsConfig::default(),
            intake: IntakeConfig::default(),
            reminder: ReminderConfig::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("."),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk, writing the defaults on first run.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from disk, returning defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Persist to disk.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Get a config value as a string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let value = lookup(&json, key)?;
        match value {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key and persist.
    ///
    /// # Errors
    /// Returns an error if the key is unknown, the value cannot be parsed
    /// into the field's type, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        assign(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.save()
    }
}

fn lookup<'a>(root: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
    if key.is_empty() {
        return None;
    }
    key.split('.').try_fold(root, |node, part| node.get(part))
}

fn assign(root: &mut serde_json::Value, key: &str, value: &str) -> Result<(), ConfigError> {
    let unknown = || ConfigError::UnknownKey(key.to_string());
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };

    let mut parts: Vec<&str> = key.split('.').collect();
    let leaf = match parts.pop() {
        Some(p) if !p.is_empty() => p,
        _ => return Err(unknown()),
    };
    let mut node = root;
    for part in parts {
        node = node.get_mut(part).ok_or_else(unknown)?;
    }
    let slot = node.get_mut(leaf).ok_or_else(unknown)?;

    // Coerce based on the existing field's type.
    let parsed = match slot {
        serde_json::Value::Bool(_) => serde_json::Value::Bool(
            value
                .parse::<bool>()
                .map_err(|_| invalid("expected a boolean".to_string()))?,
        ),
        serde_json::Value::Number(_) => {
            if let Ok(n) = value.parse::<u64>() {
                serde_json::Value::Number(n.into())
            } else if let Ok(n) = value.parse::<f64>() {
                serde_json::Number::from_f64(n)
                    .map(serde_json::Value::Number)
                    .ok_or_else(|| invalid("expected a finite number".to_string()))?
            } else {
                return Err(invalid("expected a number".to_string()));
            }
        }
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
        }
        _ => serde_json::Value::String(value.to_string()),
    };

    *slot = parsed;
    Ok(())
}
