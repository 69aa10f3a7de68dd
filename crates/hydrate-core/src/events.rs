use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every state change in the system produces an Event.
/// The CLI prints them as JSON; long-running consumers poll
/// [`crate::HydrationState::snapshot`] instead of subscribing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    WaterLogged {
        amount_ml: f64,
        remaining_ml: f64,
        at: DateTime<Utc>,
    },
    /// The remaining target crossed zero: the daily goal was just reached.
    /// Emitted at most once per crossing, never while already at zero.
    GoalReached {
        goal_ml: f64,
        at: DateTime<Utc>,
    },
    TargetReset {
        goal_ml: f64,
        at: DateTime<Utc>,
    },
    /// The calendar day changed since the last reset, so the counter was
    /// reset on construction.
    DailyReset {
        goal_ml: f64,
        at: DateTime<Utc>,
    },
    CelebrationDismissed {
        at: DateTime<Utc>,
    },
    GoalUpdated {
        goal_ml: f64,
        remaining_ml: f64,
        at: DateTime<Utc>,
    },
    IntervalUpdated {
        interval_secs: f64,
        next_reminder_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    ReminderFired {
        remaining_ml: f64,
        goal_ml: f64,
        next_reminder_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        remaining_ml: f64,
        goal_ml: f64,
        consumed_ml: f64,
        interval_secs: f64,
        next_reminder_at: DateTime<Utc>,
        next_reminder_in: String,
        progress_pct: f64,
        show_celebration: bool,
        notifications_authorized: bool,
        at: DateTime<Utc>,
    },
}
