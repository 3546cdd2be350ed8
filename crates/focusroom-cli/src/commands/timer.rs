use std::io::Write;
use std::sync::Arc;

use clap::Subcommand;
use focusroom_core::{
    Config, Event, FocusPipeline, ManualScheduler, SystemClock, TimerDisplay, TimerView,
    TokioScheduler,
};
use tracing::debug;

use super::{open_store, print_json, CmdResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run the countdown in the foreground until the next break ends
    Run,
    /// Start or resume the current interval
    Start,
    /// Pause with a reason (a blank reason leaves the timer running)
    Pause {
        /// Why the session is being interrupted
        reason: String,
    },
    /// End the work interval early, or skip the rest of a break
    End {
        /// Confirm ending a work interval
        #[arg(long)]
        yes: bool,
    },
    /// Reset to an idle work interval of the current preset
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// Extend the running work interval
    AddTime {
        /// Seconds to add (defaults to `timer.add_time_seconds`)
        #[arg(long)]
        seconds: Option<u64>,
    },
    /// Switch to another preset (default, pomodoro, deepWork, ultradian, custom)
    Preset {
        key: String,
    },
    /// Print current timer state as JSON
    Status,
}

/// Live countdown on stderr.
struct TerminalView;

impl TimerView for TerminalView {
    fn render(&mut self, display: &TimerDisplay) {
        let label = match (display.on_break, display.is_running) {
            (false, true) => "focus",
            (true, true) => "break",
            _ => "paused",
        };
        let mut err = std::io::stderr();
        let _ = write!(err, "\r{} {:<6}", display.clock, label);
        let _ = err.flush();
    }
}

fn load_pipeline(config: &Config) -> Result<FocusPipeline, Box<dyn std::error::Error>> {
    let mut pipeline = FocusPipeline::from_config(
        open_store()?,
        ManualScheduler::new(),
        Arc::new(SystemClock),
        config,
    )?;
    pipeline.restore();
    Ok(pipeline)
}

/// Print the event if there is one, the timer state otherwise.
fn report(pipeline: &FocusPipeline, event: Option<Event>) -> CmdResult {
    match event {
        Some(event) => print_json(&event),
        None => print_json(&pipeline.engine().display()),
    }
}

pub fn run(action: TimerAction) -> CmdResult {
    let config = Config::load_or_default();

    if let TimerAction::Run = action {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        return runtime.block_on(run_loop(config));
    }

    let mut pipeline = load_pipeline(&config)?;
    let event = match action {
        TimerAction::Run | TimerAction::Status => None,
        TimerAction::Start => pipeline.resume(),
        TimerAction::Pause { reason } => pipeline.pause(&reason),
        TimerAction::End { yes } => pipeline.end_session(yes)?,
        TimerAction::Reset { yes } => pipeline.reset(yes)?,
        TimerAction::AddTime { seconds } => {
            pipeline.add_time(seconds.unwrap_or(config.timer.add_time_seconds))
        }
        TimerAction::Preset { key } => pipeline.update_preset(&key)?,
    };

    if let Some(entry) = pipeline.last_entry() {
        print_json(entry)?;
    }
    report(&pipeline, event)
}

/// Drive the pipeline from a tokio ticker. The loop owns the pipeline, so
/// ticks and commands never interleave.
async fn run_loop(config: Config) -> CmdResult {
    let (scheduler, mut ticks) = TokioScheduler::new();
    let mut pipeline =
        FocusPipeline::from_config(open_store()?, scheduler, Arc::new(SystemClock), &config)?
            .with_view(TerminalView);

    if let Some(event) = pipeline.restore() {
        emit(&event)?;
    }
    if let Some(event) = pipeline.resume() {
        emit(&event)?;
    }

    while pipeline.engine().is_running() {
        let Some(token) = ticks.recv().await else {
            break;
        };
        let Some(event) = pipeline.handle_tick(token) else {
            continue;
        };
        eprintln!();
        emit(&event)?;
        if matches!(event, Event::WorkCompleted { .. }) {
            if let Some(entry) = pipeline.last_entry() {
                emit(entry)?;
            }
        }
    }
    debug!(phase = ?pipeline.engine().phase(), "run loop finished");
    Ok(())
}

fn emit<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
