use serde::{Deserialize, Serialize};

/// One day's record of whether a project's focus target was met.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    /// Local midnight (epoch ms) of the day.
    pub date: i64,
    /// Minutes focused on the project that day.
    pub focus_time: u64,
    pub target_met: bool,
    /// Streak value right after this check-in.
    pub streak: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub automatic: bool,
}

/// Where a check-in came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInKind<'a> {
    /// Written by the user, with their reflection. Always appended.
    Manual { reflection: &'a str },
    /// Written after a recorded session. At most one per day, refined in
    /// place as the day goes on.
    Automatic,
}

impl CheckIn {
    pub fn manual(date: i64, focus_time: u64, target_met: bool, streak: u32, reflection: String) -> Self {
        Self {
            date,
            focus_time,
            target_met,
            streak,
            reflection: Some(reflection),
            automatic: false,
        }
    }

    pub fn automatic(date: i64, focus_time: u64, target_met: bool, streak: u32) -> Self {
        Self {
            date,
            focus_time,
            target_met,
            streak,
            reflection: None,
            automatic: true,
        }
    }

    pub fn kind(&self) -> CheckInKind<'_> {
        if self.automatic {
            CheckInKind::Automatic
        } else {
            CheckInKind::Manual {
                reflection: self.reflection.as_deref().unwrap_or_default(),
            }
        }
    }
}

/// Add `entry` to `ledger`: automatic entries replace whatever is already
/// recorded for their day, manual ones are appended. The ledger keeps only
/// the newest `cap` entries.
pub fn record_check_in(ledger: &mut Vec<CheckIn>, entry: CheckIn, cap: usize) {
    if entry.kind() == CheckInKind::Automatic {
        if let Some(existing) = ledger.iter_mut().find(|c| c.date == entry.date) {
            *existing = entry;
            return;
        }
    }
    ledger.push(entry);
    if ledger.len() > cap {
        let excess = ledger.len() - cap;
        ledger.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 86_400_000;

    #[test]
    fn manual_entries_always_append() {
        let mut ledger = Vec::new();
        record_check_in(&mut ledger, CheckIn::manual(DAY, 30, false, 0, "slow".into()), 30);
        record_check_in(&mut ledger, CheckIn::manual(DAY, 60, true, 1, "better".into()), 30);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[1].kind(), CheckInKind::Manual { reflection: "better" });
    }

    #[test]
    fn automatic_entries_replace_same_day() {
        let mut ledger = Vec::new();
        record_check_in(&mut ledger, CheckIn::automatic(DAY, 25, false, 0), 30);
        record_check_in(&mut ledger, CheckIn::automatic(DAY, 50, true, 1), 30);
        record_check_in(&mut ledger, CheckIn::automatic(2 * DAY, 25, false, 1), 30);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[0].focus_time, 50);
        assert!(ledger[0].target_met);
    }

    #[test]
    fn oldest_entries_are_evicted() {
        let mut ledger = Vec::new();
        for day in 0..35 {
            record_check_in(&mut ledger, CheckIn::automatic(day * DAY, 30, true, day as u32), 30);
        }
        assert_eq!(ledger.len(), 30);
        assert_eq!(ledger[0].date, 5 * DAY);
        assert_eq!(ledger[29].date, 34 * DAY);
    }

    #[test]
    fn wire_format_omits_defaults() {
        let json = serde_json::to_value(CheckIn::automatic(DAY, 25, true, 3)).unwrap();
        assert_eq!(json["focusTime"], 25);
        assert_eq!(json["targetMet"], true);
        assert_eq!(json["automatic"], true);
        assert!(json.get("reflection").is_none());

        let manual: CheckIn =
            serde_json::from_str(r#"{"date":0,"focusTime":10,"targetMet":false,"streak":0,"reflection":"meh"}"#)
                .unwrap();
        assert!(!manual.automatic);
        assert!(serde_json::to_value(&manual).unwrap().get("automatic").is_none());
    }
}
