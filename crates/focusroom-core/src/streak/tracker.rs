//! Daily check-ins and consecutive-day streaks per project.
//!
//! A day counts toward the streak when the minutes recorded for the project
//! that day reach its `target_focus_time`. Both entry points derive today's
//! minutes from the session history rather than trusting the caller.
//!
//! A day with the target met after a gap of more than one day leaves the
//! streak where it was instead of restarting it at 1.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::checkin::{record_check_in, CheckIn};
use crate::clock::{local_midnight, local_midnight_days_ago, Clock};
use crate::error::Result;
use crate::project::{Project, ProjectContext};
use crate::session::{focus_minutes_on, SessionHistoryEntry};
use crate::storage::{JsonStoreExt, SharedStore, StreakConfig, SESSION_HISTORY_KEY};

/// A focus-time contribution with an explicit unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTime {
    Seconds(u64),
    Minutes(u64),
}

impl FocusTime {
    /// Interpret a bare number the way older callers passed it: values above
    /// 100 are seconds, anything else minutes.
    pub fn from_ambiguous(value: u64) -> Self {
        if value > 100 {
            FocusTime::Seconds(value)
        } else {
            FocusTime::Minutes(value)
        }
    }

    pub fn as_seconds(&self) -> u64 {
        match *self {
            FocusTime::Seconds(s) => s,
            FocusTime::Minutes(m) => m.saturating_mul(60),
        }
    }
}

/// The calendar facts a check-in is judged against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Day {
    today: i64,
    yesterday: i64,
    focus_minutes: u64,
}

impl Day {
    fn target_met(&self, project: &Project) -> bool {
        project.target_focus_time > 0 && self.focus_minutes >= project.target_focus_time
    }

    fn is_consecutive(&self, project: &Project) -> bool {
        project.last_check_in == Some(self.yesterday)
    }

    fn is_today(&self, project: &Project) -> bool {
        project.last_check_in == Some(self.today)
    }
}

pub struct StreakTracker {
    store: SharedStore,
    projects: ProjectContext,
    clock: Arc<dyn Clock>,
    max_check_ins: usize,
    min_auto_seconds: u64,
}

impl StreakTracker {
    pub fn new(store: SharedStore, clock: Arc<dyn Clock>, config: &StreakConfig) -> Self {
        Self {
            projects: ProjectContext::new(store.clone()),
            store,
            clock,
            max_check_ins: config.max_check_ins,
            min_auto_seconds: config.min_auto_check_in_seconds,
        }
    }

    /// Manual check-in with the user's reflection for the active project.
    ///
    /// Returns the appended check-in, or `None` when there is no active
    /// project or the store failed.
    pub fn add_daily_check_in(&self, reflection: &str) -> Option<CheckIn> {
        let id = self.active_project_id()?;
        self.add_daily_check_in_for(&id, reflection)
    }

    pub fn add_daily_check_in_for(&self, project_id: &str, reflection: &str) -> Option<CheckIn> {
        let reflection = reflection.to_string();
        self.update_project(project_id, |project, day, cap| {
            Some(apply_manual(project, day, reflection, cap))
        })
    }

    /// Automatic check-in for the active project after a recorded session.
    pub fn add_automatic_check_in(&self, focus_time: FocusTime) -> Option<CheckIn> {
        let id = self.active_project_id()?;
        self.add_automatic_check_in_for(&id, focus_time)
    }

    /// Sessions shorter than the configured floor (5 minutes by default)
    /// never produce a check-in.
    pub fn add_automatic_check_in_for(&self, project_id: &str, focus_time: FocusTime) -> Option<CheckIn> {
        if focus_time.as_seconds() < self.min_auto_seconds {
            debug!(seconds = focus_time.as_seconds(), "session too short for a check-in");
            return None;
        }
        self.update_project(project_id, |project, day, cap| {
            Some(apply_automatic(project, day, cap))
        })
    }

    /// Minutes recorded today for `project_id`.
    pub fn today_focus_minutes(&self, project_id: &str) -> Result<u64> {
        let history = self.history()?;
        Ok(focus_minutes_on(&history, project_id, local_midnight(self.clock.now_ms())))
    }

    fn active_project_id(&self) -> Option<String> {
        match self.projects.active_id() {
            Ok(Some(id)) => Some(id),
            Ok(None) => {
                debug!("no active project; check-in skipped");
                None
            }
            Err(e) => {
                warn!(error = %e, "could not read active project");
                None
            }
        }
    }

    fn update_project<F>(&self, project_id: &str, apply: F) -> Option<CheckIn>
    where
        F: FnOnce(&mut Project, Day, usize) -> Option<CheckIn>,
    {
        match self.try_update_project(project_id, apply) {
            Ok(check_in) => check_in,
            Err(e) => {
                warn!(error = %e, project = project_id, "check-in not saved");
                None
            }
        }
    }

    fn try_update_project<F>(&self, project_id: &str, apply: F) -> Result<Option<CheckIn>>
    where
        F: FnOnce(&mut Project, Day, usize) -> Option<CheckIn>,
    {
        let Some(mut project) = self.projects.get(project_id)? else {
            debug!(project = project_id, "unknown project; check-in skipped");
            return Ok(None);
        };
        let now = self.clock.now_ms();
        let today = local_midnight(now);
        let day = Day {
            today,
            yesterday: local_midnight_days_ago(now, 1),
            focus_minutes: focus_minutes_on(&self.history()?, project_id, today),
        };

        let check_in = apply(&mut project, day, self.max_check_ins);
        if let Some(c) = &check_in {
            self.projects.save(&project)?;
            info!(
                project = project_id,
                streak = c.streak,
                target_met = c.target_met,
                automatic = c.automatic,
                "check-in recorded"
            );
        }
        Ok(check_in)
    }

    fn history(&self) -> Result<Vec<SessionHistoryEntry>> {
        Ok(self.store.get_json(SESSION_HISTORY_KEY, Vec::new())?)
    }
}

fn apply_manual(project: &mut Project, day: Day, reflection: String, cap: usize) -> CheckIn {
    let target_met = day.target_met(project);
    let consecutive = day.is_consecutive(project);

    if target_met {
        if consecutive || project.last_check_in.is_none() {
            project.streak += 1;
        }
    } else if !consecutive {
        project.streak = 0;
    }

    let entry = CheckIn::manual(day.today, day.focus_minutes, target_met, project.streak, reflection);
    record_check_in(&mut project.check_ins, entry.clone(), cap);
    project.last_check_in = Some(day.today);
    entry
}

fn apply_automatic(project: &mut Project, day: Day, cap: usize) -> CheckIn {
    let target_met = day.target_met(project);
    let consecutive = day.is_consecutive(project);
    let is_today = day.is_today(project);
    let credited_today = project
        .check_ins
        .iter()
        .any(|c| c.date == day.today && c.target_met);

    if target_met {
        if project.last_check_in.is_none() || consecutive || (is_today && !credited_today) {
            project.streak += 1;
        }
    } else if !consecutive && !is_today {
        project.streak = 0;
    }

    let entry = CheckIn::automatic(day.today, day.focus_minutes, target_met, project.streak);
    record_check_in(&mut project.check_ins, entry.clone(), cap);
    project.last_check_in = Some(day.today);
    entry
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 86_400_000;

    fn day(focus_minutes: u64) -> Day {
        Day {
            today: 100 * DAY,
            yesterday: 99 * DAY,
            focus_minutes,
        }
    }

    fn project(target: u64, streak: u32, last: Option<i64>) -> Project {
        let mut p = Project::new("p");
        p.target_focus_time = target;
        p.streak = streak;
        p.last_check_in = last;
        p
    }

    #[test]
    fn ambiguous_focus_time() {
        assert_eq!(FocusTime::from_ambiguous(200), FocusTime::Seconds(200));
        assert_eq!(FocusTime::from_ambiguous(100), FocusTime::Minutes(100));
        assert_eq!(FocusTime::from_ambiguous(25).as_seconds(), 1500);
    }

    #[test]
    fn manual_consecutive_day_extends_streak() {
        let mut p = project(60, 1, Some(99 * DAY));
        let c = apply_manual(&mut p, day(60), "done".into(), 30);
        assert_eq!(p.streak, 2);
        assert_eq!(c.streak, 2);
        assert_eq!(p.last_check_in, Some(100 * DAY));
    }

    #[test]
    fn manual_first_check_in_starts_streak() {
        let mut p = project(60, 0, None);
        apply_manual(&mut p, day(90), "first".into(), 30);
        assert_eq!(p.streak, 1);
    }

    #[test]
    fn manual_gap_with_target_met_keeps_streak() {
        let mut p = project(60, 5, Some(98 * DAY));
        apply_manual(&mut p, day(75), "back".into(), 30);
        assert_eq!(p.streak, 5);
    }

    #[test]
    fn manual_miss_after_gap_resets() {
        let mut p = project(60, 5, Some(98 * DAY));
        let c = apply_manual(&mut p, day(10), "rough".into(), 30);
        assert_eq!(p.streak, 0);
        assert!(!c.target_met);
    }

    #[test]
    fn manual_miss_on_consecutive_day_keeps_streak() {
        let mut p = project(60, 3, Some(99 * DAY));
        apply_manual(&mut p, day(10), "meh".into(), 30);
        assert_eq!(p.streak, 3);
    }

    #[test]
    fn zero_target_is_never_met() {
        let mut p = project(0, 2, Some(99 * DAY));
        let c = apply_manual(&mut p, day(500), "no target".into(), 30);
        assert!(!c.target_met);
        assert_eq!(p.streak, 2);
    }

    #[test]
    fn manual_check_ins_append_even_on_same_day() {
        let mut p = project(60, 0, None);
        apply_manual(&mut p, day(10), "a".into(), 30);
        apply_manual(&mut p, day(20), "b".into(), 30);
        assert_eq!(p.check_ins.len(), 2);
    }

    #[test]
    fn automatic_credits_today_once() {
        let mut p = project(50, 2, Some(99 * DAY));
        // First session of the day: not there yet.
        apply_automatic(&mut p, day(25), 30);
        assert_eq!(p.streak, 2);
        // Second session crosses the target.
        apply_automatic(&mut p, day(50), 30);
        assert_eq!(p.streak, 3);
        // Third session: already credited.
        apply_automatic(&mut p, day(75), 30);
        assert_eq!(p.streak, 3);

        assert_eq!(p.check_ins.len(), 1);
        assert_eq!(p.check_ins[0].focus_time, 75);
        assert!(p.check_ins[0].automatic);
    }

    #[test]
    fn automatic_miss_today_does_not_reset() {
        let mut p = project(50, 4, Some(100 * DAY));
        apply_automatic(&mut p, day(10), 30);
        assert_eq!(p.streak, 4);
    }

    #[test]
    fn automatic_miss_after_gap_resets() {
        let mut p = project(50, 4, Some(97 * DAY));
        apply_automatic(&mut p, day(10), 30);
        assert_eq!(p.streak, 0);
    }

    #[test]
    fn automatic_replaces_manual_entry_for_today() {
        let mut p = project(50, 0, None);
        apply_manual(&mut p, day(10), "morning".into(), 30);
        apply_automatic(&mut p, day(55), 30);
        assert_eq!(p.check_ins.len(), 1);
        assert!(p.check_ins[0].automatic);
        assert_eq!(p.streak, 1);
    }
}
