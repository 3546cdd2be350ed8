//! Wall-clock access and local calendar-day arithmetic.
//!
//! All timestamps are epoch milliseconds. Day boundaries are local
//! midnights, so check-ins line up with the user's calendar rather than UTC.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{Days, Local, NaiveDate, NaiveTime, TimeZone};

pub const MS_PER_SECOND: i64 = 1_000;
pub const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
pub const MS_PER_DAY: i64 = 24 * 60 * MS_PER_MINUTE;

/// Source of "now".
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// The host's real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(now_ms)),
        }
    }

    /// Start at the current wall-clock time.
    pub fn starting_now() -> Self {
        Self::new(SystemClock.now_ms())
    }

    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance_ms(&self, delta_ms: i64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance_ms(secs * MS_PER_SECOND);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Local midnight (epoch ms) of the calendar day containing `epoch_ms`.
pub fn local_midnight(epoch_ms: i64) -> i64 {
    match Local.timestamp_millis_opt(epoch_ms).earliest() {
        Some(dt) => midnight_of(dt.date_naive()),
        None => epoch_ms - epoch_ms.rem_euclid(MS_PER_DAY),
    }
}

/// Local midnight of the day `days` calendar days before the day containing
/// `epoch_ms`.
pub fn local_midnight_days_ago(epoch_ms: i64, days: u64) -> i64 {
    let Some(dt) = Local.timestamp_millis_opt(epoch_ms).earliest() else {
        return local_midnight(epoch_ms) - days as i64 * MS_PER_DAY;
    };
    match dt.date_naive().checked_sub_days(Days::new(days)) {
        Some(date) => midnight_of(date),
        None => local_midnight(epoch_ms) - days as i64 * MS_PER_DAY,
    }
}

fn midnight_of(date: NaiveDate) -> i64 {
    let naive = date.and_time(NaiveTime::default());
    // Midnight can be skipped by a DST jump; the first valid instant of the
    // day is then an hour later.
    Local
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            Local
                .from_local_datetime(&(naive + chrono::Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}
