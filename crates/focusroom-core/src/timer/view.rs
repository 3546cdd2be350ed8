use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use super::snapshot::{TimerPhase, TimerSnapshot};

/// What a front end needs to draw the timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerDisplay {
    pub remaining_time: u64,
    pub on_break: bool,
    pub is_running: bool,
    pub phase: TimerPhase,
    pub progress_pct: f64,
    pub preset: String,
    /// `MM:SS`, minutes unbounded.
    pub clock: String,
}

impl From<&TimerSnapshot> for TimerDisplay {
    fn from(s: &TimerSnapshot) -> Self {
        Self {
            remaining_time: s.remaining_time,
            on_break: s.on_break,
            is_running: s.is_running,
            phase: s.phase(),
            progress_pct: s.progress_pct(),
            preset: s.current_preset.clone(),
            clock: format_clock(s.remaining_time),
        }
    }
}

pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Receives a fresh [`TimerDisplay`] after every tick and transition.
pub trait TimerView: Send {
    fn render(&mut self, display: &TimerDisplay);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopView;

impl TimerView for NoopView {
    fn render(&mut self, _display: &TimerDisplay) {}
}

/// Keeps every rendered frame; clones share the frame list.
#[derive(Debug, Default, Clone)]
pub struct RecordingView {
    frames: Arc<Mutex<Vec<TimerDisplay>>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<TimerDisplay> {
        self.frames.lock().map(|f| f.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<TimerDisplay> {
        self.frames.lock().ok().and_then(|f| f.last().cloned())
    }
}

impl TimerView for RecordingView {
    fn render(&mut self, display: &TimerDisplay) {
        if let Ok(mut frames) = self.frames.lock() {
            frames.push(display.clone());
        }
    }
}
