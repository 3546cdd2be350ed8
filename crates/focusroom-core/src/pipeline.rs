//! Wiring of timer → recorder → streak tracker.
//!
//! Front ends drive a [`FocusPipeline`] instead of the bare engine so that
//! every finished work interval is recorded exactly once. Break completions
//! never reach the recorder.

use std::sync::Arc;

use crate::clock::Clock;
use crate::error::TimerError;
use crate::events::Event;
use crate::session::{SessionHistoryEntry, SessionRecorder};
use crate::storage::{Config, SharedStore};
use crate::streak::{CheckIn, StreakTracker};
use crate::timer::{Scheduler, TickToken, TimerEngine, TimerPhase, TimerView};

pub struct FocusPipeline {
    engine: TimerEngine,
    recorder: SessionRecorder,
    last_entry: Option<SessionHistoryEntry>,
}

impl FocusPipeline {
    pub fn new(engine: TimerEngine, recorder: SessionRecorder) -> Self {
        Self {
            engine,
            recorder,
            last_entry: None,
        }
    }

    /// Build the whole pipeline over one store from the user's config.
    pub fn from_config(
        store: SharedStore,
        scheduler: impl Scheduler + 'static,
        clock: Arc<dyn Clock>,
        config: &Config,
    ) -> Result<Self, TimerError> {
        let engine = TimerEngine::new(store.clone(), scheduler, clock.clone(), config.presets())
            .with_state_key(config.timer.state_key.clone())
            .with_preset(&config.timer.preset)?;
        let tracker = StreakTracker::new(store.clone(), clock.clone(), &config.streak);
        let recorder = SessionRecorder::new(store, clock, tracker, &config.streak);
        Ok(Self::new(engine, recorder))
    }

    pub fn with_view(mut self, view: impl TimerView + 'static) -> Self {
        self.engine = self.engine.with_view(view);
        self
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn recorder(&self) -> &SessionRecorder {
        &self.recorder
    }

    pub fn tracker(&self) -> &StreakTracker {
        self.recorder.tracker()
    }

    /// The entry written for the most recent completed work interval.
    pub fn last_entry(&self) -> Option<&SessionHistoryEntry> {
        self.last_entry.as_ref()
    }

    pub fn restore(&mut self) -> Option<Event> {
        self.engine.restore()
    }

    pub fn start(&mut self, reset_start_time: bool) -> Option<Event> {
        self.engine.start(reset_start_time)
    }

    /// Start an idle interval or continue a paused one. A paused work
    /// interval keeps no wall-clock anchor, so its recorded length comes
    /// from the seconds counted down.
    pub fn resume(&mut self) -> Option<Event> {
        if self.engine.is_running() {
            return None;
        }
        let fresh = self.engine.phase() != TimerPhase::WorkPaused;
        self.engine.start(fresh)
    }

    pub fn handle_tick(&mut self, token: TickToken) -> Option<Event> {
        let event = self.engine.handle_tick(token);
        self.dispatch(event)
    }

    pub fn tick(&mut self) -> Option<Event> {
        let event = self.engine.tick();
        self.dispatch(event)
    }

    pub fn pause(&mut self, reason: &str) -> Option<Event> {
        self.engine.pause(reason)
    }

    pub fn end_session(&mut self, confirmed: bool) -> Result<Option<Event>, TimerError> {
        let event = self.engine.end_session(confirmed)?;
        Ok(self.dispatch(event))
    }

    pub fn reset(&mut self, confirmed: bool) -> Result<Option<Event>, TimerError> {
        self.engine.reset(confirmed)
    }

    pub fn add_time(&mut self, seconds: u64) -> Option<Event> {
        self.engine.add_time(seconds)
    }

    pub fn update_preset(&mut self, key: &str) -> Result<Option<Event>, TimerError> {
        self.engine.update_preset(key)
    }

    /// Manual end-of-day check-in for the active project.
    pub fn check_in(&self, reflection: &str) -> Option<CheckIn> {
        self.tracker().add_daily_check_in(reflection)
    }

    fn dispatch(&mut self, event: Option<Event>) -> Option<Event> {
        if let Some(Event::WorkCompleted { session }) = &event {
            self.last_entry = Some(self.recorder.record_completed(session));
        }
        event
    }
}
