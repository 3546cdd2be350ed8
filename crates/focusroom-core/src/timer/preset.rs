use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TimerError;

pub const DEFAULT_PRESET: &str = "default";
pub const CUSTOM_PRESET: &str = "custom";

/// A named work/break duration pair, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub work: u64,
    #[serde(rename = "break")]
    pub break_: u64,
}

impl Preset {
    pub const fn minutes(work: u64, break_: u64) -> Self {
        Self {
            work: work * 60,
            break_: break_ * 60,
        }
    }

    pub fn work_minutes(&self) -> u64 {
        self.work / 60
    }
}

/// Lookup table of presets known to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetTable {
    presets: BTreeMap<String, Preset>,
}

impl PresetTable {
    /// Built-in presets plus a `custom` entry with the given lengths.
    pub fn with_custom(custom: Preset) -> Self {
        let mut presets = BTreeMap::new();
        presets.insert(DEFAULT_PRESET.to_string(), Preset::minutes(25, 5));
        presets.insert("pomodoro".to_string(), Preset::minutes(25, 5));
        presets.insert("deepWork".to_string(), Preset::minutes(52, 17));
        presets.insert("ultradian".to_string(), Preset::minutes(90, 20));
        presets.insert(CUSTOM_PRESET.to_string(), custom);
        Self { presets }
    }

    pub fn get(&self, key: &str) -> Option<Preset> {
        self.presets.get(key).copied()
    }

    /// Like [`get`](Self::get) but reports unknown keys as
    /// [`TimerError::InvalidPreset`].
    pub fn resolve(&self, key: &str) -> Result<Preset, TimerError> {
        self.get(key)
            .ok_or_else(|| TimerError::InvalidPreset(key.to_string()))
    }

    /// The `default` entry; always present.
    pub fn default_preset(&self) -> Preset {
        self.get(DEFAULT_PRESET).unwrap_or(Preset::minutes(25, 5))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }
}

impl Default for PresetTable {
    fn default() -> Self {
        Self::with_custom(Preset::minutes(45, 15))
    }
}
