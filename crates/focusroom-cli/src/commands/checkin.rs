use std::sync::Arc;

use clap::Args;
use focusroom_core::{Config, StreakTracker, SystemClock};

use super::{open_store, print_json, CmdResult};

#[derive(Args)]
pub struct CheckinArgs {
    /// How the day went
    reflection: String,
    /// Check in for this project instead of the active one
    #[arg(long)]
    project: Option<String>,
}

pub fn run(args: CheckinArgs) -> CmdResult {
    let config = Config::load_or_default();
    let tracker = StreakTracker::new(open_store()?, Arc::new(SystemClock), &config.streak);

    let check_in = match &args.project {
        Some(id) => tracker.add_daily_check_in_for(id, &args.reflection),
        None => tracker.add_daily_check_in(&args.reflection),
    };
    match check_in {
        Some(check_in) => print_json(&check_in),
        None => Err("no check-in recorded: no such project or no active project".into()),
    }
}
