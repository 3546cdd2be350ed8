//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - The active timer preset and the `custom` preset's lengths
//! - The persistence key of the timer snapshot
//! - Streak and session-recording limits
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{data_dir, TIMER_STATE_KEY};
use crate::error::ConfigError;
use crate::timer::{Preset, PresetTable, DEFAULT_PRESET};

/// Timer-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_preset")]
    pub preset: String,
    #[serde(default = "default_state_key")]
    pub state_key: String,
    #[serde(default = "default_custom_work_minutes")]
    pub custom_work_minutes: u64,
    #[serde(default = "default_custom_break_minutes")]
    pub custom_break_minutes: u64,
    #[serde(default = "default_add_time_seconds")]
    pub add_time_seconds: u64,
}

/// Session recording and streak configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakConfig {
    /// Oldest check-ins are evicted beyond this count.
    #[serde(default = "default_max_check_ins")]
    pub max_check_ins: usize,
    /// Sessions shorter than this never produce an automatic check-in.
    #[serde(default = "default_min_auto_check_in_seconds")]
    pub min_auto_check_in_seconds: u64,
    /// Recorded durations above this are treated as clock skew.
    #[serde(default = "default_max_session_minutes")]
    pub max_session_minutes: i64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub streak: StreakConfig,
}

fn default_preset() -> String {
    DEFAULT_PRESET.into()
}
fn default_state_key() -> String {
    TIMER_STATE_KEY.into()
}
fn default_custom_work_minutes() -> u64 {
    45
}
fn default_custom_break_minutes() -> u64 {
    15
}
fn default_add_time_seconds() -> u64 {
    300
}
fn default_max_check_ins() -> usize {
    30
}
fn default_min_auto_check_in_seconds() -> u64 {
    300
}
fn default_max_session_minutes() -> i64 {
    180
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            state_key: default_state_key(),
            custom_work_minutes: default_custom_work_minutes(),
            custom_break_minutes: default_custom_break_minutes(),
            add_time_seconds: default_add_time_seconds(),
        }
    }
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            max_check_ins: default_max_check_ins(),
            min_auto_check_in_seconds: default_min_auto_check_in_seconds(),
            max_session_minutes: default_max_session_minutes(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parent, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        if let Some(parent) = parent {
            for part in parent.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => value
                .parse::<u64>()
                .map(|n| serde_json::Value::Number(n.into()))
                .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                return Err(invalid("not a scalar setting".into()));
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    /// Location of `config.toml`.
    pub fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("config.toml"),
                message: e.to_string(),
            })
    }

    /// Load from disk, writing the defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
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

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(error = %e, "falling back to default configuration");
                Self::default()
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
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

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |e: serde_json::Error| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        };
        let mut json = serde_json::to_value(&*self).map_err(invalid)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(invalid)?;
        if key == "timer.preset" && updated.presets().get(&updated.timer.preset).is_none() {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("unknown preset '{value}'"),
            });
        }
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Preset table with the configured `custom` entry.
    pub fn presets(&self) -> PresetTable {
        PresetTable::with_custom(Preset::minutes(
            self.timer.custom_work_minutes,
            self.timer.custom_break_minutes,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.timer.preset, "default");
        assert_eq!(parsed.timer.state_key, "timerState");
        assert_eq!(parsed.streak.max_check_ins, 30);
    }

    #[test]
    fn missing_sections_take_defaults() {
        let parsed: Config = toml::from_str("[timer]\npreset = \"deepWork\"\n").unwrap();
        assert_eq!(parsed.timer.preset, "deepWork");
        assert_eq!(parsed.timer.add_time_seconds, 300);
        assert_eq!(parsed.streak.max_session_minutes, 180);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.preset").as_deref(), Some("default"));
        assert_eq!(cfg.get("streak.min_auto_check_in_seconds").as_deref(), Some("300"));
        assert!(cfg.get("timer.missing_key").is_none());
    }

    #[test]
    fn apply_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.apply("timer.custom_work_minutes", "30").unwrap();
        assert_eq!(cfg.timer.custom_work_minutes, 30);
        assert_eq!(cfg.presets().get("custom"), Some(Preset::minutes(30, 15)));
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("timer.nonexistent_key", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.apply("", "1"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        let result = cfg.apply("streak.max_check_ins", "lots");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        assert_eq!(cfg.streak.max_check_ins, 30);
    }

    #[test]
    fn apply_rejects_unknown_preset() {
        let mut cfg = Config::default();
        assert!(cfg.apply("timer.preset", "marathon").is_err());
        cfg.apply("timer.preset", "pomodoro").unwrap();
        assert_eq!(cfg.timer.preset, "pomodoro");
    }
}
