pub mod checkin;
pub mod config;
pub mod history;
pub mod project;
pub mod timer;

use std::sync::Arc;

use focusroom_core::{SharedStore, SqliteStore};
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// The on-disk store every command works against.
pub fn open_store() -> Result<SharedStore, Box<dyn std::error::Error>> {
    Ok(Arc::new(SqliteStore::open()?))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
