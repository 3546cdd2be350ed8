mod checkin;
mod tracker;

pub use checkin::{record_check_in, CheckIn, CheckInKind};
pub use tracker::{FocusTime, StreakTracker};
