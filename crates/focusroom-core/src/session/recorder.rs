use std::sync::Arc;

use tracing::{info, warn};

use super::SessionHistoryEntry;
use crate::clock::{Clock, MS_PER_MINUTE, MS_PER_SECOND};
use crate::error::StoreError;
use crate::events::CompletedWork;
use crate::project::{ProjectContext, Todo};
use crate::storage::{JsonStoreExt, SharedStore, StreakConfig, SESSION_HISTORY_KEY};
use crate::streak::{FocusTime, StreakTracker};

/// Turns finished work intervals into history entries and feeds the
/// streak tracker.
pub struct SessionRecorder {
    store: SharedStore,
    projects: ProjectContext,
    tracker: StreakTracker,
    clock: Arc<dyn Clock>,
    max_session_minutes: i64,
}

impl SessionRecorder {
    pub fn new(
        store: SharedStore,
        clock: Arc<dyn Clock>,
        tracker: StreakTracker,
        config: &StreakConfig,
    ) -> Self {
        Self {
            projects: ProjectContext::new(store.clone()),
            store,
            tracker,
            clock,
            max_session_minutes: config.max_session_minutes,
        }
    }

    pub fn tracker(&self) -> &StreakTracker {
        &self.tracker
    }

    /// Record an interval reported by the timer engine, with the active
    /// project's todo list as it stands now.
    ///
    /// An interval that lost its wall-clock anchor (paused, or resumed after
    /// a reload) is dated back from the seconds it actually counted down.
    pub fn record_completed(&self, work: &CompletedWork) -> SessionHistoryEntry {
        let start = work.start_time.unwrap_or_else(|| {
            self.clock.now_ms() - work.elapsed_secs as i64 * MS_PER_SECOND
        });
        let todos = match self.projects.active() {
            Ok(project) => project.map(|p| p.todos).unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "could not read active project todos");
                Vec::new()
            }
        };
        self.record_session(start, todos, work.preset_work_secs / 60)
    }

    /// Append a history entry for a work interval that began at
    /// `start_time` and ends now, then credit the minutes to the active
    /// project's streak.
    ///
    /// Durations outside `0..=max_session_minutes` come from clock skew or a
    /// long-dead session and are replaced by the preset length (capped).
    pub fn record_session(
        &self,
        start_time: i64,
        todos: Vec<Todo>,
        preset_work_minutes: u64,
    ) -> SessionHistoryEntry {
        let end = self.clock.now_ms();
        let raw = ((end - start_time) as f64 / MS_PER_MINUTE as f64).round() as i64;
        let duration = clamp_duration(raw, preset_work_minutes as i64, self.max_session_minutes);

        let project = match self.projects.active() {
            Ok(project) => project,
            Err(e) => {
                warn!(error = %e, "could not resolve active project");
                None
            }
        };

        let entry = SessionHistoryEntry {
            start: start_time,
            end,
            duration,
            goal: project.as_ref().map(|p| p.goal.clone()).unwrap_or_default(),
            music: project.as_ref().map(|p| p.music.clone()).unwrap_or_default(),
            todos,
            project_id: project.as_ref().map(|p| p.id.clone()),
            project_name: project.as_ref().map(|p| p.name.clone()),
        };

        if let Err(e) = self.append(&entry) {
            warn!(error = %e, "could not append session history");
        }
        info!(
            duration,
            project = entry.project_id.as_deref().unwrap_or("-"),
            "session recorded"
        );

        if let Some(project_id) = &entry.project_id {
            self.tracker
                .add_automatic_check_in_for(project_id, FocusTime::Minutes(duration.max(0) as u64));
        }
        entry
    }

    pub fn history(&self) -> Result<Vec<SessionHistoryEntry>, StoreError> {
        self.store.get_json(SESSION_HISTORY_KEY, Vec::new())
    }

    fn append(&self, entry: &SessionHistoryEntry) -> Result<(), StoreError> {
        let mut history = self.history()?;
        history.push(entry.clone());
        self.store.set_json(SESSION_HISTORY_KEY, &history)
    }
}

/// Keep a computed duration (minutes) when it is plausible, otherwise fall
/// back to the preset length capped at `max_minutes`.
pub fn clamp_duration(raw_minutes: i64, preset_work_minutes: i64, max_minutes: i64) -> i64 {
    if raw_minutes > max_minutes || raw_minutes < 0 {
        max_minutes.min(preset_work_minutes)
    } else {
        raw_minutes
    }
}
