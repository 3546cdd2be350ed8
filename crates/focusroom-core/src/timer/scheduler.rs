//! Periodic tick scheduling.
//!
//! The engine never sleeps or spawns on its own. It asks a [`Scheduler`] for
//! a periodic schedule and receives a [`TickToken`]; whoever drives the
//! engine delivers ticks for that token back through
//! `TimerEngine::handle_tick`. Ticks for a cancelled token are dropped by
//! the engine, so a late delivery can never decrement twice.

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Handle to one periodic schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickToken(u64);

impl TickToken {
    pub fn id(&self) -> u64 {
        self.0
    }
}

pub trait Scheduler: Send {
    /// Begin firing every `period`.
    fn schedule(&mut self, period: Duration) -> TickToken;

    /// Stop a schedule. Cancelling an unknown or already cancelled token is a
    /// no-op.
    fn cancel(&mut self, token: TickToken);
}

#[derive(Debug, Default)]
struct ManualState {
    next_id: u64,
    active: BTreeSet<TickToken>,
    scheduled_total: u64,
}

/// Virtual scheduler for tests and single-shot command runs.
///
/// Nothing fires by itself; [`fire`](Self::fire) returns the tokens that
/// would have fired. Clones share state, so a test can keep one handle while
/// the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens that are currently scheduled.
    pub fn active(&self) -> Vec<TickToken> {
        self.lock().active.iter().copied().collect()
    }

    pub fn active_count(&self) -> usize {
        self.lock().active.len()
    }

    /// How many schedules were ever created.
    pub fn scheduled_total(&self) -> u64 {
        self.lock().scheduled_total
    }

    /// One period elapses: every live token fires once.
    pub fn fire(&self) -> Vec<TickToken> {
        self.active()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        // A panic while holding this lock can only come from a failing test.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, _period: Duration) -> TickToken {
        let mut state = self.lock();
        state.next_id += 1;
        state.scheduled_total += 1;
        let token = TickToken(state.next_id);
        state.active.insert(token);
        token
    }

    fn cancel(&mut self, token: TickToken) {
        self.lock().active.remove(&token);
    }
}

/// Scheduler backed by tokio intervals.
///
/// Each schedule is a spawned task that sends its token over a channel once
/// per period; cancelling aborts the task. The receiver is handed to the
/// loop that owns the engine. Must be used from within a tokio runtime.
pub struct TokioScheduler {
    tx: mpsc::UnboundedSender<TickToken>,
    tasks: HashMap<TickToken, JoinHandle<()>>,
    next_id: u64,
}

impl TokioScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TickToken>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                tasks: HashMap::new(),
                next_id: 0,
            },
            rx,
        )
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, period: Duration) -> TickToken {
        self.next_id += 1;
        let token = TickToken(self.next_id);
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick of a tokio interval completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(token).is_err() {
                    break;
                }
            }
        });
        self.tasks.insert(token, handle);
        token
    }

    fn cancel(&mut self, token: TickToken) {
        if let Some(handle) = self.tasks.remove(&token) {
            handle.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }
}
