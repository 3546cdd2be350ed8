use clap::Args;
use focusroom_core::storage::SESSION_HISTORY_KEY;
use focusroom_core::{JsonStoreExt, SessionHistoryEntry};

use super::{open_store, print_json, CmdResult};

#[derive(Args)]
pub struct HistoryArgs {
    /// Only sessions attributed to this project
    #[arg(long)]
    project: Option<String>,
    /// Show at most this many of the newest sessions
    #[arg(long)]
    limit: Option<usize>,
}

pub fn run(args: HistoryArgs) -> CmdResult {
    let store = open_store()?;
    let history: Vec<SessionHistoryEntry> = store.get_json(SESSION_HISTORY_KEY, Vec::new())?;

    let mut entries: Vec<SessionHistoryEntry> = history
        .into_iter()
        .filter(|e| match &args.project {
            Some(id) => e.project_id.as_deref() == Some(id.as_str()),
            None => true,
        })
        .collect();
    if let Some(limit) = args.limit {
        let skip = entries.len().saturating_sub(limit);
        entries.drain(..skip);
    }
    print_json(&entries)
}
