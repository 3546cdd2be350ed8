//! Session history: one immutable entry per completed work interval.

mod recorder;

pub use recorder::SessionRecorder;

use serde::{Deserialize, Serialize};

use crate::clock::MS_PER_DAY;
use crate::project::Todo;

/// A recorded work interval. Written once, never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHistoryEntry {
    /// Epoch ms.
    pub start: i64,
    /// Epoch ms.
    pub end: i64,
    /// Whole minutes, after clamping.
    pub duration: i64,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub music: String,
    #[serde(default)]
    pub todos: Vec<Todo>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
}

/// Minutes recorded for `project_id` in sessions that started on the day
/// beginning at `day_start`.
pub fn focus_minutes_on(history: &[SessionHistoryEntry], project_id: &str, day_start: i64) -> u64 {
    let day_end = day_start + MS_PER_DAY;
    history
        .iter()
        .filter(|e| e.project_id.as_deref() == Some(project_id))
        .filter(|e| e.start >= day_start && e.start < day_end)
        .map(|e| e.duration.max(0) as u64)
        .sum()
}
