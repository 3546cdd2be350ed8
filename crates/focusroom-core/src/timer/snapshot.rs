use serde::{Deserialize, Serialize};

use super::preset::{Preset, DEFAULT_PRESET};

/// Phase of the work/break cycle, derived from `(on_break, is_running)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerPhase {
    WorkIdle,
    WorkRunning,
    WorkPaused,
    BreakRunning,
    BreakIdle,
}

/// The durable timer state, persisted once per tick and transition.
///
/// Field names match the JSON already written by earlier versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    /// Seconds left in the current interval.
    pub remaining_time: u64,
    pub on_break: bool,
    /// Epoch ms at which the current, never-paused work interval began.
    pub start_time: Option<i64>,
    pub is_running: bool,
    pub current_preset: String,
    /// Work length in seconds, including any `add_time` extensions.
    pub work_duration: u64,
    /// The preset's work length, frozen across extensions.
    pub original_work_duration: u64,
    pub break_duration: u64,
}

impl TimerSnapshot {
    /// Idle at the start of a work interval for `preset`.
    pub fn idle(preset_key: &str, preset: Preset) -> Self {
        Self {
            remaining_time: preset.work,
            on_break: false,
            start_time: None,
            is_running: false,
            current_preset: preset_key.to_string(),
            work_duration: preset.work,
            original_work_duration: preset.work,
            break_duration: preset.break_,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        match (self.on_break, self.is_running) {
            (true, true) => TimerPhase::BreakRunning,
            (true, false) => TimerPhase::BreakIdle,
            (false, true) => TimerPhase::WorkRunning,
            (false, false) if self.remaining_time < self.work_duration => TimerPhase::WorkPaused,
            (false, false) => TimerPhase::WorkIdle,
        }
    }

    /// Length in seconds of the interval currently counting down.
    pub fn active_duration(&self) -> u64 {
        if self.on_break {
            self.break_duration
        } else {
            self.work_duration
        }
    }

    /// Seconds of the current work interval already spent.
    pub fn work_elapsed(&self) -> u64 {
        self.work_duration.saturating_sub(self.remaining_time)
    }

    /// Progress through the current interval, 0.0 ..= 100.0.
    ///
    /// Before any extension progress is measured against the preset length.
    /// Once `add_time` has grown `work_duration`, it is measured against the
    /// extended total instead, so the bar neither sticks at 100% nor jumps
    /// when time is added.
    pub fn progress_pct(&self) -> f64 {
        if self.on_break {
            if self.break_duration == 0 {
                return 0.0;
            }
            let done = self.break_duration.saturating_sub(self.remaining_time) as f64;
            return (100.0 * done / self.break_duration as f64).clamp(0.0, 100.0);
        }

        let work = self.work_duration as f64;
        let original = self.original_work_duration as f64;
        let remaining = self.remaining_time as f64;

        if self.work_duration > self.original_work_duration {
            return (100.0 * (work - remaining) / work).clamp(0.0, 100.0);
        }
        if self.original_work_duration == 0 {
            return 0.0;
        }
        let elapsed = original - (remaining - (work - original));
        (100.0 * elapsed / original).clamp(0.0, 100.0)
    }

    /// Bring a snapshot read from disk back inside its invariants.
    pub(crate) fn sanitize(&mut self) {
        let ceiling = self.work_duration.max(self.break_duration);
        self.remaining_time = self.remaining_time.min(ceiling);
        if self.original_work_duration == 0 || self.original_work_duration > self.work_duration {
            self.original_work_duration = self.work_duration;
        }
        if self.on_break || !self.is_running {
            self.start_time = None;
        }
        if self.current_preset.trim().is_empty() {
            self.current_preset = DEFAULT_PRESET.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> TimerSnapshot {
        TimerSnapshot::idle("default", Preset::minutes(25, 5))
    }

    #[test]
    fn phases() {
        let mut s = snapshot();
        assert_eq!(s.phase(), TimerPhase::WorkIdle);
        s.is_running = true;
        assert_eq!(s.phase(), TimerPhase::WorkRunning);
        s.is_running = false;
        s.remaining_time -= 1;
        assert_eq!(s.phase(), TimerPhase::WorkPaused);
        s.on_break = true;
        assert_eq!(s.phase(), TimerPhase::BreakIdle);
        s.is_running = true;
        assert_eq!(s.phase(), TimerPhase::BreakRunning);
    }

    #[test]
    fn unextended_progress_uses_preset_length() {
        let mut s = snapshot();
        assert_eq!(s.progress_pct(), 0.0);
        s.remaining_time = 750;
        assert!((s.progress_pct() - 50.0).abs() < 1e-9);
        s.remaining_time = 0;
        assert_eq!(s.progress_pct(), 100.0);
    }

    #[test]
    fn extended_progress_uses_extended_total() {
        let mut s = snapshot();
        s.remaining_time = 300;
        s.work_duration += 300;
        s.remaining_time += 300;
        // 1200 of 1800 seconds done.
        assert!((s.progress_pct() - 1200.0 / 1800.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn break_progress() {
        let mut s = snapshot();
        s.on_break = true;
        s.remaining_time = 60;
        assert!((s.progress_pct() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn sanitize_clamps_remaining_and_start() {
        let mut s = snapshot();
        s.remaining_time = 99_999;
        s.start_time = Some(1);
        s.current_preset = "  ".into();
        s.sanitize();
        assert_eq!(s.remaining_time, 1500);
        assert_eq!(s.start_time, None);
        assert_eq!(s.current_preset, "default");
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(snapshot()).unwrap();
        assert_eq!(json["remainingTime"], 1500);
        assert_eq!(json["originalWorkDuration"], 1500);
        assert_eq!(json["startTime"], serde_json::Value::Null);
        assert_eq!(json["currentPreset"], "default");
    }
}
