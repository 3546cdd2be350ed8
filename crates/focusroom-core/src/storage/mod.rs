mod config;
mod memory;
mod sqlite;

pub use config::{Config, StreakConfig, TimerConfig};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::path::PathBuf;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

/// Default key for the persisted timer snapshot.
pub const TIMER_STATE_KEY: &str = "timerState";
/// Append-only list of `SessionHistoryEntry`.
pub const SESSION_HISTORY_KEY: &str = "sessionHistory";
/// Project collection (goal, todos, check-ins, streak).
pub const PROJECTS_KEY: &str = "projects";
/// Id of the project sessions are currently attributed to.
pub const ACTIVE_PROJECT_KEY: &str = "activeProjectId";

/// Durable key-value store shared by the engine, recorder and tracker.
///
/// Values are opaque strings; [`JsonStoreExt`] layers JSON on top.
pub trait PersistentStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Shared handle to a store.
pub type SharedStore = Arc<dyn PersistentStore>;

/// JSON convenience accessors for any [`PersistentStore`].
pub trait JsonStoreExt {
    /// Read and deserialize `key`, returning `default` when it is absent.
    fn get_json<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, StoreError>;

    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError>;
}

impl<S: PersistentStore + ?Sized> JsonStoreExt for S {
    fn get_json<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, StoreError> {
        match self.get_item(key)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Json {
                key: key.to_string(),
                source,
            }),
            None => Ok(default),
        }
    }

    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Json {
            key: key.to_string(),
            source,
        })?;
        self.set_item(key, &raw)
    }
}

/// Returns the focusroom data directory.
///
/// `FOCUSROOM_DATA_DIR` wins when set; otherwise `~/.config/focusroom[-dev]/`
/// depending on `FOCUSROOM_ENV`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("FOCUSROOM_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FOCUSROOM_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focusroom-dev")
            } else {
                base_dir.join("focusroom")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
