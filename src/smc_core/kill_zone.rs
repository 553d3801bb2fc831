//! Session window ("kill zone") classification
//!
//! Pure function of an instant: converted into the configured session timezone,
//! then matched against the configured windows.

use crate::config::{AnalysisConfig, Priority};
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillZone {
    /// Active window name; absent when no window is active
    pub name: Option<String>,
    pub priority: Priority,
    pub is_active: bool,
    /// Minutes left in the active window, or minutes until the next one opens
    pub remaining_minutes: u32,
}

impl KillZone {
    pub fn inactive(minutes_until_next: u32) -> Self {
        Self {
            name: None,
            priority: Priority::Low,
            is_active: false,
            remaining_minutes: minutes_until_next,
        }
    }
}

pub fn classify_session(now: DateTime<Utc>, config: &AnalysisConfig) -> KillZone {
    let local = now.with_timezone(&config.session_timezone);
    let minute_of_day = local.hour() * 60 + local.minute();

    if let Some(window) = config.sessions.iter().find(|w| w.contains(minute_of_day)) {
        let remaining = (window.end_of_day() + MINUTES_PER_DAY - minute_of_day) % MINUTES_PER_DAY;
        return KillZone {
            name: Some(window.name.clone()),
            priority: window.priority,
            is_active: true,
            remaining_minutes: remaining,
        };
    }

    let until_next = config
        .sessions
        .iter()
        .map(|w| (w.start_of_day() + MINUTES_PER_DAY - minute_of_day) % MINUTES_PER_DAY)
        .min()
        .unwrap_or(0);

    KillZone::inactive(until_next)
}
