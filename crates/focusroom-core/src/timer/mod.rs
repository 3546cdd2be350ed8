mod engine;
mod preset;
mod scheduler;
mod snapshot;
mod view;

pub use engine::{TimerEngine, DEFAULT_ADD_TIME_SECS, TICK_PERIOD};
pub use preset::{Preset, PresetTable, CUSTOM_PRESET, DEFAULT_PRESET};
pub use scheduler::{ManualScheduler, Scheduler, TickToken, TokioScheduler};
pub use snapshot::{TimerPhase, TimerSnapshot};
pub use view::{format_clock, NoopView, RecordingView, TimerDisplay, TimerView};
