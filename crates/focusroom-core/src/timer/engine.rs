//! Timer engine implementation.
//!
//! The timer engine is a one-second countdown state machine. It does not use
//! internal threads - it asks its [`Scheduler`] for a periodic schedule and
//! the caller delivers each tick through [`TimerEngine::handle_tick`].
//!
//! ## State Transitions
//!
//! ```text
//! WorkIdle -> WorkRunning -> (WorkPaused -> WorkRunning)* -> BreakRunning -> WorkIdle
//! ```
//!
//! Every tick and transition is written to the [`PersistentStore`] as a
//! [`TimerSnapshot`] so a crashed or reloaded host can pick the session up
//! again with [`TimerEngine::restore`]. Store failures are logged and
//! otherwise ignored: the in-memory state is authoritative while the engine
//! is alive.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(store, ManualScheduler::new(), clock, presets);
//! engine.restore();
//! engine.start(true);
//! // Once per second, for the engine's live token:
//! engine.handle_tick(token); // Returns Some(Event) on completion
//! ```
//!
//! [`PersistentStore`]: crate::storage::PersistentStore

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::preset::{PresetTable, DEFAULT_PRESET};
use super::scheduler::{Scheduler, TickToken};
use super::snapshot::{TimerPhase, TimerSnapshot};
use super::view::{NoopView, TimerDisplay, TimerView};
use crate::clock::{Clock, MS_PER_SECOND};
use crate::error::TimerError;
use crate::events::{timestamp, CompletedWork, Event};
use crate::storage::{JsonStoreExt, SharedStore, TIMER_STATE_KEY};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);
/// Seconds added by [`TimerEngine::add_default_time`].
pub const DEFAULT_ADD_TIME_SECS: u64 = 300;

/// Core timer engine.
pub struct TimerEngine {
    state: TimerSnapshot,
    presets: PresetTable,
    store: SharedStore,
    state_key: String,
    scheduler: Box<dyn Scheduler>,
    clock: Arc<dyn Clock>,
    view: Box<dyn TimerView>,
    tick_token: Option<TickToken>,
}

impl TimerEngine {
    /// Create an engine idle at the `default` preset's work duration.
    pub fn new(
        store: SharedStore,
        scheduler: impl Scheduler + 'static,
        clock: Arc<dyn Clock>,
        presets: PresetTable,
    ) -> Self {
        let state = TimerSnapshot::idle(DEFAULT_PRESET, presets.default_preset());
        Self {
            state,
            presets,
            store,
            state_key: TIMER_STATE_KEY.to_string(),
            scheduler: Box::new(scheduler),
            clock,
            view: Box::new(NoopView),
            tick_token: None,
        }
    }

    /// Start idle at another preset instead of `default`.
    pub fn with_preset(mut self, key: &str) -> Result<Self, TimerError> {
        let preset = self.presets.resolve(key)?;
        self.state = TimerSnapshot::idle(key, preset);
        Ok(self)
    }

    /// Persist under `key` instead of `"timerState"`.
    pub fn with_state_key(mut self, key: impl Into<String>) -> Self {
        self.state_key = key.into();
        self
    }

    pub fn with_view(mut self, view: impl TimerView + 'static) -> Self {
        self.view = Box::new(view);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> &TimerSnapshot {
        &self.state
    }

    pub fn remaining_time(&self) -> u64 {
        self.state.remaining_time
    }

    pub fn on_break(&self) -> bool {
        self.state.on_break
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn start_time(&self) -> Option<i64> {
        self.state.start_time
    }

    pub fn phase(&self) -> TimerPhase {
        self.state.phase()
    }

    pub fn progress_pct(&self) -> f64 {
        self.state.progress_pct()
    }

    pub fn current_preset(&self) -> &str {
        &self.state.current_preset
    }

    pub fn presets(&self) -> &PresetTable {
        &self.presets
    }

    pub fn state_key(&self) -> &str {
        &self.state_key
    }

    /// The token ticks are currently accepted for.
    pub fn tick_token(&self) -> Option<TickToken> {
        self.tick_token
    }

    pub fn display(&self) -> TimerDisplay {
        TimerDisplay::from(&self.state)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Run the current interval.
    ///
    /// With `reset_start_time` a work interval gets a fresh wall-clock
    /// anchor; without it (resuming persisted state) the anchor is left
    /// alone. Any live schedule is cancelled before the new one is created.
    pub fn start(&mut self, reset_start_time: bool) -> Option<Event> {
        self.cancel_tick();
        if reset_start_time && !self.state.on_break {
            self.state.start_time = Some(self.clock.now_ms());
        }
        self.state.is_running = true;
        self.tick_token = Some(self.scheduler.schedule(TICK_PERIOD));
        debug!(
            on_break = self.state.on_break,
            remaining = self.state.remaining_time,
            "timer started"
        );
        self.commit();
        Some(Event::TimerStarted {
            on_break: self.state.on_break,
            remaining_time: self.state.remaining_time,
            resumed: !reset_start_time,
            at: self.now(),
        })
    }

    /// Deliver a scheduler tick. Ticks for anything but the live token are
    /// stale and ignored.
    pub fn handle_tick(&mut self, token: TickToken) -> Option<Event> {
        if self.tick_token != Some(token) {
            debug!(token = token.id(), "dropping stale tick");
            return None;
        }
        self.tick()
    }

    /// Count down one second. Returns `Some(Event)` when the interval ends.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.state.is_running {
            return None;
        }
        self.state.remaining_time = self.state.remaining_time.saturating_sub(1);
        self.persist();

        if self.state.remaining_time > 0 {
            self.render();
            return None;
        }

        self.cancel_tick();
        if self.state.on_break {
            return Some(self.end_break());
        }
        let session = self.complete_work_interval(false);
        self.start_break();
        Some(Event::WorkCompleted { session })
    }

    /// Pause with a user-supplied reason.
    ///
    /// A blank reason means the user backed out of the pause prompt: nothing
    /// changes. Pausing drops the wall-clock anchor, so the recorded length
    /// of the interval falls back to the counted-down seconds.
    pub fn pause(&mut self, reason: &str) -> Option<Event> {
        let reason = reason.trim();
        if reason.is_empty() {
            debug!("pause cancelled: no reason given");
            return None;
        }
        if !self.state.is_running {
            return None;
        }
        self.cancel_tick();
        self.state.is_running = false;
        self.state.start_time = None;
        info!(reason, remaining = self.state.remaining_time, "timer paused");
        self.commit();
        Some(Event::TimerPaused {
            reason: reason.to_string(),
            remaining_time: self.state.remaining_time,
            at: self.now(),
        })
    }

    /// End the current interval early.
    ///
    /// During a break this skips the rest of it. During work it needs the
    /// user's confirmation, reports the seconds worked so far and starts the
    /// break, even when no tick has been counted yet.
    pub fn end_session(&mut self, confirmed: bool) -> Result<Option<Event>, TimerError> {
        if self.state.on_break {
            self.cancel_tick();
            let remaining_time = self.state.remaining_time;
            self.enter_work_idle();
            info!(remaining_time, "break skipped");
            self.commit();
            return Ok(Some(Event::BreakSkipped {
                remaining_time,
                at: self.now(),
            }));
        }

        if !confirmed {
            return Err(TimerError::ConfirmationRequired("ending the session"));
        }

        self.cancel_tick();
        let session = self.complete_work_interval(true);
        self.start_break();
        Ok(Some(Event::WorkCompleted { session }))
    }

    /// Back to an idle work interval at the active preset's lengths,
    /// discarding extensions and the wall-clock anchor.
    pub fn reset(&mut self, confirmed: bool) -> Result<Option<Event>, TimerError> {
        if !confirmed {
            return Err(TimerError::ConfirmationRequired("resetting the timer"));
        }
        self.cancel_tick();
        let (key, preset) = match self.presets.get(&self.state.current_preset) {
            Some(preset) => (self.state.current_preset.clone(), preset),
            None => (DEFAULT_PRESET.to_string(), self.presets.default_preset()),
        };
        self.state = TimerSnapshot::idle(&key, preset);
        debug!(preset = %key, "timer reset");
        self.commit();
        Ok(Some(Event::TimerReset { at: self.now() }))
    }

    /// Extend a running work interval. Ignored in every other phase.
    pub fn add_time(&mut self, seconds: u64) -> Option<Event> {
        if self.state.phase() != TimerPhase::WorkRunning || seconds == 0 {
            return None;
        }
        self.state.remaining_time += seconds;
        self.state.work_duration += seconds;
        debug!(seconds, work_duration = self.state.work_duration, "time added");
        self.commit();
        Some(Event::TimeAdded {
            seconds,
            remaining_time: self.state.remaining_time,
            work_duration: self.state.work_duration,
            at: self.now(),
        })
    }

    pub fn add_default_time(&mut self) -> Option<Event> {
        self.add_time(DEFAULT_ADD_TIME_SECS)
    }

    /// Switch presets. Unknown keys are rejected without touching state.
    ///
    /// A stopped timer is reset to the new length of the current mode; a
    /// running one keeps counting, clamped to the new length.
    pub fn update_preset(&mut self, key: &str) -> Result<Option<Event>, TimerError> {
        let preset = self.presets.resolve(key)?;
        self.state.current_preset = key.to_string();
        self.state.work_duration = preset.work;
        self.state.original_work_duration = preset.work;
        self.state.break_duration = preset.break_;

        let active = self.state.active_duration();
        self.state.remaining_time = if self.state.is_running {
            self.state.remaining_time.min(active)
        } else {
            active
        };
        debug!(preset = key, "preset changed");
        self.commit();
        Ok(Some(Event::PresetChanged {
            preset: key.to_string(),
            work_duration: preset.work,
            break_duration: preset.break_,
            at: self.now(),
        }))
    }

    /// Load the persisted snapshot and apply the recovery policy.
    ///
    /// A snapshot claiming to be running whose anchor is older than the whole
    /// interval is stale (crash, sleep, closed window) and comes back
    /// stopped. Any other running snapshot resumes without a new anchor.
    pub fn restore(&mut self) -> Option<Event> {
        let loaded = match self
            .store
            .get_json::<Option<TimerSnapshot>>(&self.state_key, None)
        {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(error = %e, key = %self.state_key, "could not read timer state");
                return None;
            }
        };
        let Some(mut snapshot) = loaded else {
            return None;
        };
        snapshot.sanitize();
        if self.presets.get(&snapshot.current_preset).is_none() {
            warn!(
                preset = %snapshot.current_preset,
                "persisted preset is unknown; keeping its durations"
            );
        }

        self.cancel_tick();
        self.state = snapshot;

        if !self.state.is_running {
            self.render();
            return None;
        }

        if let Some(start_time) = self.state.start_time {
            let age_ms = self.clock.now_ms() - start_time;
            let limit_ms = self.state.active_duration() as i64 * MS_PER_SECOND;
            if age_ms > limit_ms {
                self.state.is_running = false;
                self.state.start_time = None;
                info!(start_time, age_ms, "discarding stale running timer");
                self.commit();
                return Some(Event::StaleResumeDiscarded {
                    start_time,
                    age_ms,
                    at: self.now(),
                });
            }
        }

        self.start(false);
        info!(remaining = self.state.remaining_time, "resumed persisted timer");
        Some(Event::TimerRecovered {
            phase: self.state.phase(),
            remaining_time: self.state.remaining_time,
            at: self.now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete_work_interval(&mut self, ended_early: bool) -> CompletedWork {
        let session = CompletedWork {
            start_time: self.state.start_time,
            elapsed_secs: self.state.work_elapsed(),
            preset_work_secs: self.state.original_work_duration,
            ended_early,
            at: self.now(),
        };
        info!(
            elapsed_secs = session.elapsed_secs,
            ended_early, "work interval complete"
        );
        session
    }

    fn start_break(&mut self) {
        self.state.on_break = true;
        self.state.start_time = None;
        self.state.remaining_time = self.state.break_duration;
        self.state.is_running = true;
        self.tick_token = Some(self.scheduler.schedule(TICK_PERIOD));
        debug!(break_duration = self.state.break_duration, "break started");
        self.commit();
    }

    fn end_break(&mut self) -> Event {
        self.cancel_tick();
        self.enter_work_idle();
        debug!("break finished");
        self.commit();
        Event::BreakCompleted { at: self.now() }
    }

    fn enter_work_idle(&mut self) {
        self.state.on_break = false;
        self.state.is_running = false;
        self.state.start_time = None;
        self.state.work_duration = self.state.original_work_duration;
        self.state.remaining_time = self.state.work_duration;
    }

    fn cancel_tick(&mut self) {
        if let Some(token) = self.tick_token.take() {
            self.scheduler.cancel(token);
        }
    }

    fn commit(&mut self) {
        self.persist();
        self.render();
    }

    fn persist(&self) {
        if let Err(e) = self.store.set_json(&self.state_key, &self.state) {
            warn!(error = %e, key = %self.state_key, "could not persist timer state");
        }
    }

    fn render(&mut self) {
        let display = TimerDisplay::from(&self.state);
        self.view.render(&display);
    }

    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        timestamp(self.clock.now_ms())
    }
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("state", &self.state)
            .field("state_key", &self.state_key)
            .field("tick_token", &self.tick_token)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::{MemoryStore, PersistentStore};
    use crate::timer::{ManualScheduler, RecordingView};

    struct Harness {
        engine: TimerEngine,
        scheduler: ManualScheduler,
        clock: ManualClock,
        store: Arc<MemoryStore>,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryStore::new());
        let scheduler = ManualScheduler::new();
        let clock = ManualClock::new(1_700_000_000_000);
        let engine = TimerEngine::new(
            store.clone(),
            scheduler.clone(),
            Arc::new(clock.clone()),
            PresetTable::default(),
        );
        Harness {
            engine,
            scheduler,
            clock,
            store,
        }
    }

    fn persisted(store: &MemoryStore) -> TimerSnapshot {
        store
            .get_json::<Option<TimerSnapshot>>(TIMER_STATE_KEY, None)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn starts_idle_at_preset_work_duration() {
        let h = harness();
        assert_eq!(h.engine.phase(), TimerPhase::WorkIdle);
        assert_eq!(h.engine.remaining_time(), 1500);
        assert!(!h.engine.is_running());
        assert_eq!(h.engine.start_time(), None);
    }

    #[test]
    fn start_sets_anchor_only_when_asked() {
        let mut h = harness();
        h.engine.start(false);
        assert_eq!(h.engine.start_time(), None);
        h.engine.start(true);
        assert_eq!(h.engine.start_time(), Some(h.clock.now_ms()));
        h.clock.advance_secs(10);
        h.engine.start(false);
        assert_eq!(h.engine.start_time(), Some(h.clock.now_ms() - 10_000));
    }

    #[test]
    fn restarting_keeps_a_single_schedule() {
        let mut h = harness();
        h.engine.start(true);
        let first = h.engine.tick_token().unwrap();
        h.engine.start(true);
        assert_eq!(h.scheduler.active_count(), 1);
        assert_eq!(h.scheduler.scheduled_total(), 2);

        // A tick still in flight for the old schedule is dropped.
        assert!(h.engine.handle_tick(first).is_none());
        assert_eq!(h.engine.remaining_time(), 1500);
    }

    #[test]
    fn tick_decrements_and_persists() {
        let mut h = harness();
        h.engine.start(true);
        for token in h.scheduler.fire() {
            h.engine.handle_tick(token);
        }
        assert_eq!(h.engine.remaining_time(), 1499);
        assert_eq!(persisted(&h.store).remaining_time, 1499);
    }

    #[test]
    fn tick_while_stopped_is_ignored() {
        let mut h = harness();
        assert!(h.engine.tick().is_none());
        assert_eq!(h.engine.remaining_time(), 1500);
    }

    #[test]
    fn work_completion_starts_break() {
        let mut h = harness();
        h.engine.update_preset("custom").unwrap();
        h.engine.start(true);
        let started = h.engine.start_time();
        let mut completed = None;
        for _ in 0..45 * 60 {
            if let Some(event) = h.engine.tick() {
                completed = Some(event);
                break;
            }
        }
        match completed {
            Some(Event::WorkCompleted { session }) => {
                assert_eq!(session.start_time, started);
                assert_eq!(session.elapsed_secs, 45 * 60);
                assert_eq!(session.preset_work_secs, 45 * 60);
                assert!(!session.ended_early);
            }
            other => panic!("expected WorkCompleted, got {other:?}"),
        }
        assert_eq!(h.engine.phase(), TimerPhase::BreakRunning);
        assert_eq!(h.engine.remaining_time(), 15 * 60);
        assert_eq!(h.engine.start_time(), None);
        assert_eq!(h.scheduler.active_count(), 1);
    }

    #[test]
    fn break_completion_returns_to_work_idle() {
        let mut h = harness();
        h.engine.start(true);
        h.engine.add_time(60);
        let mut events = Vec::new();
        for _ in 0..(1560 + 300) {
            if let Some(event) = h.engine.tick() {
                events.push(event);
            }
        }
        assert!(matches!(events[0], Event::WorkCompleted { .. }));
        assert!(matches!(events[1], Event::BreakCompleted { .. }));
        assert_eq!(events.len(), 2);
        assert_eq!(h.engine.phase(), TimerPhase::WorkIdle);
        // The extension does not carry into the next interval.
        assert_eq!(h.engine.remaining_time(), 1500);
        assert_eq!(h.engine.snapshot().work_duration, 1500);
        assert_eq!(h.scheduler.active_count(), 0);
    }

    #[test]
    fn blank_pause_reason_changes_nothing() {
        let mut h = harness();
        h.engine.start(true);
        let before = h.engine.snapshot().clone();
        let token = h.engine.tick_token();
        assert!(h.engine.pause("").is_none());
        assert!(h.engine.pause("   ").is_none());
        assert_eq!(h.engine.snapshot(), &before);
        assert_eq!(h.engine.tick_token(), token);
        assert_eq!(h.scheduler.active_count(), 1);
    }

    #[test]
    fn pause_stops_schedule_and_drops_anchor() {
        let mut h = harness();
        h.engine.start(true);
        h.engine.tick();
        let event = h.engine.pause("phone call");
        assert!(matches!(event, Some(Event::TimerPaused { ref reason, .. }) if reason == "phone call"));
        assert_eq!(h.engine.phase(), TimerPhase::WorkPaused);
        assert_eq!(h.engine.start_time(), None);
        assert_eq!(h.scheduler.active_count(), 0);
        assert!(h.engine.pause("again").is_none());
    }

    #[test]
    fn end_session_during_work_needs_confirmation() {
        let mut h = harness();
        h.engine.start(true);
        h.engine.tick();
        assert_eq!(
            h.engine.end_session(false),
            Err(TimerError::ConfirmationRequired("ending the session"))
        );
        assert_eq!(h.engine.phase(), TimerPhase::WorkRunning);
    }

    #[test]
    fn end_session_reports_elapsed_so_far() {
        let mut h = harness();
        h.engine.start(true);
        for _ in 0..600 {
            h.engine.tick();
        }
        let event = h.engine.end_session(true).unwrap();
        match event {
            Some(Event::WorkCompleted { session }) => {
                assert_eq!(session.elapsed_secs, 600);
                assert!(session.ended_early);
            }
            other => panic!("expected WorkCompleted, got {other:?}"),
        }
        assert_eq!(h.engine.phase(), TimerPhase::BreakRunning);
    }

    #[test]
    fn end_session_without_ticks_still_completes() {
        let mut h = harness();
        h.engine.start(true);
        let anchor = h.engine.start_time();
        h.clock.advance_secs(1200);
        match h.engine.end_session(true) {
            Ok(Some(Event::WorkCompleted { session })) => {
                assert_eq!(session.elapsed_secs, 0);
                assert_eq!(session.start_time, anchor);
                assert!(session.ended_early);
            }
            other => panic!("expected WorkCompleted, got {other:?}"),
        }
        assert_eq!(h.engine.phase(), TimerPhase::BreakRunning);
    }

    #[test]
    fn end_session_on_break_skips_it() {
        let mut h = harness();
        h.engine.start(true);
        h.engine.tick();
        h.engine.add_time(120);
        h.engine.end_session(true).unwrap();
        assert!(h.engine.on_break());
        h.engine.tick();

        let event = h.engine.end_session(false).unwrap();
        assert!(matches!(event, Some(Event::BreakSkipped { remaining_time: 299, .. })));
        assert_eq!(h.engine.phase(), TimerPhase::WorkIdle);
        assert_eq!(h.engine.remaining_time(), 1500);
        assert_eq!(h.scheduler.active_count(), 0);
    }

    #[test]
    fn reset_needs_confirmation_and_restores_preset() {
        let mut h = harness();
        h.engine.update_preset("deepWork").unwrap();
        h.engine.start(true);
        h.engine.add_time(600);
        h.engine.tick();

        assert!(h.engine.reset(false).is_err());
        assert!(h.engine.is_running());

        h.engine.reset(true).unwrap();
        let s = h.engine.snapshot();
        assert_eq!(s.remaining_time, 52 * 60);
        assert_eq!(s.work_duration, 52 * 60);
        assert_eq!(s.original_work_duration, 52 * 60);
        assert_eq!(s.start_time, None);
        assert_eq!(h.engine.phase(), TimerPhase::WorkIdle);
        assert_eq!(h.scheduler.active_count(), 0);
    }

    #[test]
    fn add_time_only_while_working() {
        let mut h = harness();
        let idle = h.engine.snapshot().clone();
        assert!(h.engine.add_default_time().is_none());
        assert_eq!(h.engine.snapshot(), &idle);

        h.engine.start(true);
        h.engine.tick();
        let event = h.engine.add_default_time();
        assert!(matches!(event, Some(Event::TimeAdded { seconds: 300, .. })));
        assert_eq!(h.engine.remaining_time(), 1799);
        assert_eq!(h.engine.snapshot().work_duration, 1800);
        assert_eq!(h.engine.snapshot().original_work_duration, 1500);
    }

    #[test]
    fn unknown_preset_is_rejected_without_change() {
        let mut h = harness();
        let before = h.engine.snapshot().clone();
        assert_eq!(
            h.engine.update_preset("marathon"),
            Err(TimerError::InvalidPreset("marathon".into()))
        );
        assert_eq!(h.engine.snapshot(), &before);
    }

    #[test]
    fn preset_change_while_idle_resets_remaining() {
        let mut h = harness();
        h.engine.update_preset("ultradian").unwrap();
        assert_eq!(h.engine.remaining_time(), 90 * 60);
        assert_eq!(h.engine.current_preset(), "ultradian");
        assert_eq!(h.engine.snapshot().break_duration, 20 * 60);
    }

    #[test]
    fn preset_change_while_running_keeps_counting() {
        let mut h = harness();
        h.engine.start(true);
        h.engine.tick();
        h.engine.update_preset("deepWork").unwrap();
        assert_eq!(h.engine.remaining_time(), 1499);
        assert!(h.engine.is_running());
    }

    #[test]
    fn restore_resumes_fresh_running_snapshot() {
        let mut h = harness();
        h.engine.start(true);
        for _ in 0..100 {
            h.engine.tick();
        }
        let anchor = h.engine.start_time();
        h.clock.advance_secs(100);

        let mut reloaded = TimerEngine::new(
            h.store.clone(),
            h.scheduler.clone(),
            Arc::new(h.clock.clone()),
            PresetTable::default(),
        );
        let event = reloaded.restore();
        assert!(matches!(event, Some(Event::TimerRecovered { remaining_time: 1400, .. })));
        assert!(reloaded.is_running());
        assert_eq!(reloaded.start_time(), anchor);
        assert!(reloaded.tick_token().is_some());
    }

    #[test]
    fn restore_discards_stale_running_snapshot() {
        let h = harness();
        let now = h.clock.now_ms();
        let mut snapshot = TimerSnapshot::idle("default", PresetTable::default().default_preset());
        snapshot.is_running = true;
        snapshot.remaining_time = 1200;
        snapshot.start_time = Some(now - 1_600_000);
        h.store.set_json(TIMER_STATE_KEY, &snapshot).unwrap();

        let mut engine = h.engine;
        let event = engine.restore();
        assert!(matches!(
            event,
            Some(Event::StaleResumeDiscarded { age_ms: 1_600_000, .. })
        ));
        assert!(!engine.is_running());
        assert_eq!(engine.start_time(), None);
        assert_eq!(h.scheduler.active_count(), 0);
        assert!(!persisted(&h.store).is_running);
    }

    #[test]
    fn restore_ignores_corrupt_snapshot() {
        let mut h = harness();
        h.store.set_item(TIMER_STATE_KEY, "{\"remainingTime\":").unwrap();
        assert!(h.engine.restore().is_none());
        assert_eq!(h.engine.remaining_time(), 1500);
    }

    #[test]
    fn store_failures_do_not_stop_the_timer() {
        let mut h = harness();
        h.store.set_failing(true);
        h.engine.start(true);
        h.engine.tick();
        assert_eq!(h.engine.remaining_time(), 1499);
        assert!(h.engine.restore().is_none());
        assert!(h.engine.is_running());
    }

    #[test]
    fn custom_state_key_is_used() {
        let h = harness();
        let mut engine = h.engine.with_state_key("timerState:tab2");
        engine.start(true);
        assert!(h.store.get_item("timerState:tab2").unwrap().is_some());
        assert!(h.store.get_item(TIMER_STATE_KEY).unwrap().is_none());
    }

    #[test]
    fn view_sees_every_tick() {
        let h = harness();
        let view = RecordingView::new();
        let mut engine = h.engine.with_view(view.clone());
        engine.start(true);
        engine.tick();
        engine.tick();
        let frames = view.frames();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2].clock, "24:58");
        assert_eq!(view.last(), Some(frames[2].clone()));

        engine.pause("lunch");
        let last = view.last().unwrap();
        assert_eq!(last.phase, TimerPhase::WorkPaused);
        assert!(!last.is_running);
    }

    #[test]
    fn every_tick_and_transition_is_persisted() {
        let mut h = harness();
        h.engine.start(true);
        assert_eq!(h.store.write_count(), 1);
        for _ in 0..10 {
            h.engine.tick();
        }
        assert_eq!(h.store.write_count(), 11);
        h.engine.pause("door");
        assert_eq!(h.store.write_count(), 12);
        // A cancelled pause writes nothing.
        h.engine.pause(" ");
        assert_eq!(h.store.write_count(), 12);
        assert_eq!(persisted(&h.store).remaining_time, 1490);
    }
}
