use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerPhase;

/// A finished (or early-ended) work interval, as handed to the recorder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedWork {
    /// Epoch ms the interval began, when it ran without a pause.
    pub start_time: Option<i64>,
    /// Seconds of work actually counted down.
    pub elapsed_secs: u64,
    /// Work length of the preset in force, in seconds.
    pub preset_work_secs: u64,
    /// Ended by the user before the countdown reached zero.
    pub ended_early: bool,
    pub at: DateTime<Utc>,
}

/// Every state change of the timer produces an Event.
/// The front end renders them; the pipeline routes `WorkCompleted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        on_break: bool,
        remaining_time: u64,
        /// `true` when the wall-clock anchor was left untouched.
        resumed: bool,
        at: DateTime<Utc>,
    },
    TimerPaused {
        reason: String,
        remaining_time: u64,
        at: DateTime<Utc>,
    },
    TimeAdded {
        seconds: u64,
        remaining_time: u64,
        work_duration: u64,
        at: DateTime<Utc>,
    },
    PresetChanged {
        preset: String,
        work_duration: u64,
        break_duration: u64,
        at: DateTime<Utc>,
    },
    WorkCompleted {
        session: CompletedWork,
    },
    BreakCompleted {
        at: DateTime<Utc>,
    },
    /// The rest of a break was skipped by the user.
    BreakSkipped {
        remaining_time: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    /// A persisted running timer was picked up again after a reload.
    TimerRecovered {
        phase: TimerPhase,
        remaining_time: u64,
        at: DateTime<Utc>,
    },
    /// A persisted running flag was older than its whole interval and was
    /// dropped instead of resumed.
    StaleResumeDiscarded {
        start_time: i64,
        age_ms: i64,
        at: DateTime<Utc>,
    },
}

/// Epoch milliseconds to a UTC timestamp.
pub(crate) fn timestamp(epoch_ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(epoch_ms).unwrap_or_default()
}
