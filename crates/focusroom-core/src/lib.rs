//! # Focusroom Core Library
//!
//! This library provides the core business logic for Focusroom, a personal
//! focus-session timer. Front ends (the CLI in this workspace, or any GUI)
//! only call into this crate and render what it reports.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a one-second work/break countdown state machine that
//!   persists a snapshot on every tick and recovers it after a crash
//! - **Session Recorder**: turns each finished work interval into an
//!   immutable history entry
//! - **Streak Tracker**: per-project daily check-ins and consecutive-day
//!   streaks derived from that history
//! - **Storage**: a key-value [`PersistentStore`] (SQLite or in-memory) and
//!   TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`FocusPipeline`]: Engine wired to recorder and tracker
//! - [`SessionRecorder`]: History writer
//! - [`StreakTracker`]: Check-ins and streaks
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod project;
pub mod session;
pub mod storage;
pub mod streak;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, ProjectError, StoreError, TimerError};
pub use events::{CompletedWork, Event};
pub use pipeline::FocusPipeline;
pub use project::{Project, ProjectContext, Todo};
pub use session::{SessionHistoryEntry, SessionRecorder};
pub use storage::{Config, JsonStoreExt, MemoryStore, PersistentStore, SharedStore, SqliteStore};
pub use streak::{CheckIn, CheckInKind, FocusTime, StreakTracker};
pub use timer::{
    ManualScheduler, Preset, PresetTable, Scheduler, TickToken, TimerDisplay, TimerEngine,
    TimerPhase, TimerSnapshot, TimerView, TokioScheduler,
};
