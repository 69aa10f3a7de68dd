//! Hydration state machine.
//!
//! Wall-clock based, with no internal threads: the owner calls
//! `reminder_due()` / `mark_reminder_fired()` periodically and persists after
//! every mutation. There is exactly one authoritative instance per process;
//! a long-running consumer owns it behind a single loop and every mutation is
//! serialized through that owner.
//!
//! ## Invariants
//!
//! - `0 <= remaining_ml <= goal_ml` after every mutation
//! - `goal_ml > 0`, `interval_secs > 0`
//! - `next_reminder_at == now + interval` at the moment it is (re)computed,
//!   i.e. whenever the interval changes or a reminder fires

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use tracing::debug;

use crate::error::{DatabaseError, ValidationError};
use crate::events::Event;
use crate::storage::Database;

/// Default daily goal in milliliters.
pub const DEFAULT_GOAL_ML: f64 = 2000.0;
/// Default reminder interval in seconds (one hour).
pub const DEFAULT_INTERVAL_SECS: f64 = 3600.0;

// kv keys; stable across releases, no schema versioning.
const KEY_REMAINING: &str = "remaining_target";
const KEY_GOAL: &str = "daily_goal";
const KEY_INTERVAL: &str = "reminder_interval";
const KEY_LAST_RESET: &str = "last_reset_date";
const KEY_NEXT_REMINDER: &str = "next_reminder_at";
const KEY_CELEBRATION: &str = "show_celebration";

/// Daily intake tracking and reminder schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct HydrationState {
    /// Water still to drink today, in ml.
    remaining_ml: f64,
    /// User-configured daily target, in ml.
    goal_ml: f64,
    /// Period between reminder notifications, in seconds.
    interval_secs: f64,
    /// When the next reminder is due.
    next_reminder_at: DateTime<Utc>,
    /// True exactly when the goal was just reached and the celebration has
    /// not been dismissed yet.
    show_celebration: bool,
    /// Mirrors the platform permission state. Runtime-only, never persisted.
    notifications_authorized: bool,
    /// Local calendar day of the last counter reset.
    last_reset_date: Option<NaiveDate>,
}

impl HydrationState {
    /// Fresh state with the default goal and interval, target untouched.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            remaining_ml: DEFAULT_GOAL_ML,
            goal_ml: DEFAULT_GOAL_ML,
            interval_secs: DEFAULT_INTERVAL_SECS,
            next_reminder_at: now + interval_duration(DEFAULT_INTERVAL_SECS),
            show_celebration: false,
            notifications_authorized: false,
            last_reset_date: None,
        }
    }

    /// Load persisted state, apply the daily reset, and write the result
    /// back. Returns the reset event when the calendar day rolled over.
    ///
    /// # Errors
    /// Returns an error only when the store itself fails; absent keys are
    /// first-run state and default silently.
    pub fn open(db: &Database) -> Result<(Self, Option<Event>), DatabaseError> {
        let now = Utc::now();
        let mut state = Self::load_at(db, now)?;
        let event = state.check_for_daily_reset(Local::now().date_naive(), now);
        state.persist(db)?;
        Ok((state, event))
    }

    /// Load persisted state without the daily-reset check.
    ///
    /// # Errors
    /// Returns an error when the store fails. Absent keys default: goal
    /// 2000 ml, interval 3600 s, remaining target equal to the goal.
    pub fn load(db: &Database) -> Result<Self, DatabaseError> {
        Self::load_at(db, Utc::now())
    }

    fn load_at(db: &Database, now: DateTime<Utc>) -> Result<Self, DatabaseError> {
        let goal_ml = match db.kv_get_f64(KEY_GOAL)? {
            Some(v) if v > 0.0 => v,
            _ => DEFAULT_GOAL_ML,
        };
        let interval_secs = match db.kv_get_f64(KEY_INTERVAL)? {
            Some(v) if v > 0.0 => v,
            _ => DEFAULT_INTERVAL_SECS,
        };
        // An absent key is first-run state; a stored value is clamped into
        // range. Zero is a legitimate value here (goal met today).
        let remaining_ml = db
            .kv_get_f64(KEY_REMAINING)?
            .map_or(goal_ml, |v| v.clamp(0.0, goal_ml));
        let last_reset_date = db
            .kv_get(KEY_LAST_RESET)?
            .and_then(|v| v.parse::<NaiveDate>().ok());
        // The schedule survives across invocations; recompute only when it
        // was never recorded.
        let next_reminder_at = db
            .kv_get(KEY_NEXT_REMINDER)?
            .and_then(|v| v.parse::<DateTime<Utc>>().ok())
            .unwrap_or_else(|| now + interval_duration(interval_secs));
        // The flag outlives the process that set it, so an undismissed
        // celebration is still showing on the next invocation.
        let show_celebration = db
            .kv_get(KEY_CELEBRATION)?
            .map(|v| v == "true")
            .unwrap_or(false)
            && remaining_ml == 0.0;

        Ok(Self {
            remaining_ml,
            goal_ml,
            interval_secs,
            next_reminder_at,
            show_celebration,
            notifications_authorized: false,
            last_reset_date,
        })
    }

    /// Write the persisted keys back to the store. Called by the owner after
    /// every mutation.
    ///
    /// # Errors
    /// Returns an error when the write fails; there is no retry.
    pub fn persist(&self, db: &Database) -> Result<(), DatabaseError> {
        db.kv_set(KEY_REMAINING, &self.remaining_ml.to_string())?;
        db.kv_set(KEY_GOAL, &self.goal_ml.to_string())?;
        db.kv_set(KEY_INTERVAL, &self.interval_secs.to_string())?;
        db.kv_set(KEY_NEXT_REMINDER, &self.next_reminder_at.to_rfc3339())?;
        db.kv_set(KEY_CELEBRATION, if self.show_celebration { "true" } else { "false" })?;
        if let Some(date) = self.last_reset_date {
            db.kv_set(KEY_LAST_RESET, &date.to_string())?;
        }
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn remaining_ml(&self) -> f64 {
        self.remaining_ml
    }

    pub fn goal_ml(&self) -> f64 {
        self.goal_ml
    }

    pub fn interval_secs(&self) -> f64 {
        self.interval_secs
    }

    pub fn next_reminder_at(&self) -> DateTime<Utc> {
        self.next_reminder_at
    }

    pub fn show_celebration(&self) -> bool {
        self.show_celebration
    }

    pub fn notifications_authorized(&self) -> bool {
        self.notifications_authorized
    }

    pub fn last_reset_date(&self) -> Option<NaiveDate> {
        self.last_reset_date
    }

    /// Water already drunk today, in ml.
    pub fn consumed_ml(&self) -> f64 {
        self.goal_ml - self.remaining_ml
    }

    /// 0.0 .. 1.0 share of the daily goal already drunk.
    pub fn progress_percentage(&self) -> f64 {
        1.0 - (self.remaining_ml / self.goal_ml).min(1.0)
    }

    /// Whether the reminder deadline has passed.
    pub fn reminder_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_reminder_at
    }

    /// Human countdown to the next reminder: `"now"`, `"{s}s"` or
    /// `"{m}m {s}s"`.
    pub fn formatted_time_remaining(&self, now: DateTime<Utc>) -> String {
        let secs = (self.next_reminder_at - now).num_seconds();
        if secs <= 0 {
            return "now".to_string();
        }
        let minutes = secs / 60;
        let seconds = secs % 60;
        if minutes > 0 {
            format!("{minutes}m {seconds}s")
        } else {
            format!("{seconds}s")
        }
    }

    /// Build a full state snapshot event for polling consumers.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Event {
        Event::StateSnapshot {
            remaining_ml: self.remaining_ml,
            goal_ml: self.goal_ml,
            consumed_ml: self.consumed_ml(),
            interval_secs: self.interval_secs,
            next_reminder_at: self.next_reminder_at,
            next_reminder_in: self.formatted_time_remaining(now),
            progress_pct: self.progress_percentage(),
            show_celebration: self.show_celebration,
            notifications_authorized: self.notifications_authorized,
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Log a drink. Emits `WaterLogged`, plus `GoalReached` exactly when the
    /// remaining target crosses zero with this drink.
    ///
    /// # Errors
    /// Rejects non-positive or non-finite amounts.
    pub fn drink_water(
        &mut self,
        amount_ml: f64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, ValidationError> {
        if !amount_ml.is_finite() || amount_ml <= 0.0 {
            return Err(ValidationError::positive("amount_ml", amount_ml));
        }

        let previous = self.remaining_ml;
        self.remaining_ml = (self.remaining_ml - amount_ml).max(0.0);

        let mut events = vec![Event::WaterLogged {
            amount_ml,
            remaining_ml: self.remaining_ml,
            at: now,
        }];

        // Celebrate only on the zero crossing, never while already at zero.
        if previous > 0.0 && self.remaining_ml == 0.0 {
            self.show_celebration = true;
            events.push(Event::GoalReached {
                goal_ml: self.goal_ml,
                at: now,
            });
        }

        Ok(events)
    }

    /// Reset the remaining target to the daily goal and clear the
    /// celebration, recording `today` as the last reset day.
    pub fn reset_target(&mut self, today: NaiveDate, now: DateTime<Utc>) -> Event {
        self.remaining_ml = self.goal_ml;
        self.show_celebration = false;
        self.last_reset_date = Some(today);
        Event::TargetReset {
            goal_ml: self.goal_ml,
            at: now,
        }
    }

    /// Reset the counter when the local calendar day changed since the last
    /// reset. When no reset was ever recorded, record `today` without
    /// resetting.
    pub fn check_for_daily_reset(
        &mut self,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Option<Event> {
        match self.last_reset_date {
            None => {
                self.last_reset_date = Some(today);
                None
            }
            Some(last) if last != today => {
                debug!(%last, %today, "calendar day changed, resetting target");
                self.reset_target(today, now);
                Some(Event::DailyReset {
                    goal_ml: self.goal_ml,
                    at: now,
                })
            }
            Some(_) => None,
        }
    }

    /// Clear the celebration overlay after the user has seen it.
    pub fn dismiss_celebration(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.show_celebration {
            return None;
        }
        self.show_celebration = false;
        Some(Event::CelebrationDismissed { at: now })
    }

    /// Change the daily goal, preserving the amount already drunk. When the
    /// new goal is already exceeded, the remaining target stays at zero and
    /// the celebration shows.
    ///
    /// # Errors
    /// Rejects non-positive or non-finite goals.
    pub fn update_daily_goal(
        &mut self,
        new_goal_ml: f64,
        now: DateTime<Utc>,
    ) -> Result<Event, ValidationError> {
        if !new_goal_ml.is_finite() || new_goal_ml <= 0.0 {
            return Err(ValidationError::positive("goal_ml", new_goal_ml));
        }

        let consumed = self.consumed_ml();
        self.goal_ml = new_goal_ml;
        if consumed < new_goal_ml {
            self.remaining_ml = new_goal_ml - consumed;
            // The goal is no longer met, so a showing celebration is stale.
            self.show_celebration = false;
        } else {
            self.remaining_ml = 0.0;
            self.show_celebration = true;
        }

        Ok(Event::GoalUpdated {
            goal_ml: self.goal_ml,
            remaining_ml: self.remaining_ml,
            at: now,
        })
    }

    /// Change the reminder period. The pending schedule is replaced: the next
    /// reminder is due `new_interval_secs` from the call time, not from the
    /// original schedule time.
    ///
    /// # Errors
    /// Rejects non-positive or non-finite intervals.
    pub fn update_reminder_interval(
        &mut self,
        new_interval_secs: f64,
        now: DateTime<Utc>,
    ) -> Result<Event, ValidationError> {
        if !new_interval_secs.is_finite() || new_interval_secs <= 0.0 {
            return Err(ValidationError::positive("interval_secs", new_interval_secs));
        }

        self.interval_secs = new_interval_secs;
        self.next_reminder_at = now + interval_duration(self.interval_secs);
        Ok(Event::IntervalUpdated {
            interval_secs: self.interval_secs,
            next_reminder_at: self.next_reminder_at,
            at: now,
        })
    }

    /// Record a reminder firing and schedule the next one a full period out.
    pub fn mark_reminder_fired(&mut self, now: DateTime<Utc>) -> Event {
        self.next_reminder_at = now + interval_duration(self.interval_secs);
        Event::ReminderFired {
            remaining_ml: self.remaining_ml,
            goal_ml: self.goal_ml,
            next_reminder_at: self.next_reminder_at,
            at: now,
        }
    }

    pub fn set_notifications_authorized(&mut self, authorized: bool) {
        self.notifications_authorized = authorized;
    }
}

fn interval_duration(interval_secs: f64) -> Duration {
    Duration::milliseconds((interval_secs * 1000.0) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn fresh() -> HydrationState {
        HydrationState::new(noon())
    }

    #[test]
    fn drink_subtracts_and_floors_at_zero() {
        let mut state = fresh();
        state.drink_water(1500.0, noon()).unwrap();
        assert_eq!(state.remaining_ml(), 500.0);
        state.drink_water(800.0, noon()).unwrap();
        assert_eq!(state.remaining_ml(), 0.0);
    }

    #[test]
    fn drink_rejects_non_positive_amounts() {
        let mut state = fresh();
        assert!(state.drink_water(0.0, noon()).is_err());
        assert!(state.drink_water(-100.0, noon()).is_err());
        assert!(state.drink_water(f64::NAN, noon()).is_err());
        assert_eq!(state.remaining_ml(), 2000.0);
    }

    #[test]
    fn celebration_fires_only_on_the_zero_crossing() {
        let mut state = fresh();

        let events = state.drink_water(1500.0, noon()).unwrap();
        assert!(!state.show_celebration());
        assert_eq!(events.len(), 1);

        let events = state.drink_water(600.0, noon()).unwrap();
        assert_eq!(state.remaining_ml(), 0.0);
        assert!(state.show_celebration());
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::GoalReached { .. })));

        // Already at zero: no re-trigger.
        state.dismiss_celebration(noon());
        let events = state.drink_water(250.0, noon()).unwrap();
        assert!(!state.show_celebration());
        assert!(!events
            .iter()
            .any(|e| matches!(e, Event::GoalReached { .. })));
    }

    #[test]
    fn reset_restores_goal_and_clears_celebration() {
        let mut state = fresh();
        state.drink_water(2000.0, noon()).unwrap();
        assert!(state.show_celebration());

        state.reset_target(day(15), noon());
        assert_eq!(state.remaining_ml(), state.goal_ml());
        assert!(!state.show_celebration());
        assert_eq!(state.last_reset_date(), Some(day(15)));
    }

    #[test]
    fn dismiss_clears_celebration_once() {
        let mut state = fresh();
        state.drink_water(2000.0, noon()).unwrap();
        assert!(state.dismiss_celebration(noon()).is_some());
        assert!(state.dismiss_celebration(noon()).is_none());
        assert!(!state.show_celebration());
    }

    #[test]
    fn daily_reset_on_calendar_day_change() {
        let mut state = fresh();
        state.reset_target(day(14), noon());
        state.drink_water(1200.0, noon()).unwrap();

        let event = state.check_for_daily_reset(day(15), noon());
        assert!(matches!(event, Some(Event::DailyReset { .. })));
        assert_eq!(state.remaining_ml(), state.goal_ml());
        assert_eq!(state.last_reset_date(), Some(day(15)));
    }

    #[test]
    fn daily_reset_same_day_is_a_no_op() {
        let mut state = fresh();
        state.reset_target(day(15), noon());
        state.drink_water(700.0, noon()).unwrap();

        assert!(state.check_for_daily_reset(day(15), noon()).is_none());
        assert_eq!(state.remaining_ml(), 1300.0);
    }

    #[test]
    fn first_run_records_today_without_resetting() {
        let mut state = fresh();
        state.drink_water(500.0, noon()).unwrap();

        assert!(state.check_for_daily_reset(day(15), noon()).is_none());
        assert_eq!(state.remaining_ml(), 1500.0);
        assert_eq!(state.last_reset_date(), Some(day(15)));
    }

    #[test]
    fn raising_the_goal_preserves_consumed_water() {
        let mut state = fresh();
        state.drink_water(1500.0, noon()).unwrap();
        assert_eq!(state.remaining_ml(), 500.0);

        state.update_daily_goal(3000.0, noon()).unwrap();
        assert_eq!(state.goal_ml(), 3000.0);
        assert_eq!(state.remaining_ml(), 1500.0);
        assert!(!state.show_celebration());
    }

    #[test]
    fn raising_a_met_goal_clears_the_celebration() {
        let db = Database::open_memory().unwrap();
        let mut state = fresh();
        state.drink_water(2000.0, noon()).unwrap();
        assert!(state.show_celebration());

        state.update_daily_goal(3000.0, noon()).unwrap();
        assert_eq!(state.remaining_ml(), 1000.0);
        assert!(!state.show_celebration());

        // The same state comes back after a persistence round-trip.
        state.persist(&db).unwrap();
        let loaded = HydrationState::load(&db).unwrap();
        assert_eq!(loaded.remaining_ml(), 1000.0);
        assert!(!loaded.show_celebration());
    }

    #[test]
    fn lowering_the_goal_below_consumed_celebrates() {
        let mut state = fresh();
        state.drink_water(2000.0, noon()).unwrap();
        assert!(state.show_celebration());

        // Consumed 2000 ml, new goal 1800: already exceeded.
        state.update_daily_goal(1800.0, noon()).unwrap();
        assert_eq!(state.remaining_ml(), 0.0);
        assert!(state.show_celebration());
    }

    #[test]
    fn goal_update_rejects_non_positive() {
        let mut state = fresh();
        assert!(state.update_daily_goal(0.0, noon()).is_err());
        assert!(state.update_daily_goal(-500.0, noon()).is_err());
        assert_eq!(state.goal_ml(), 2000.0);
    }

    #[test]
    fn interval_update_replaces_the_pending_schedule() {
        let mut state = fresh();
        let original_deadline = state.next_reminder_at();

        let later = noon() + Duration::seconds(600);
        state.update_reminder_interval(1800.0, later).unwrap();

        assert_eq!(state.interval_secs(), 1800.0);
        assert_eq!(state.next_reminder_at(), later + Duration::seconds(1800));
        assert_ne!(state.next_reminder_at(), original_deadline);
    }

    #[test]
    fn reminder_fires_and_reschedules_a_full_period_out() {
        let mut state = fresh();
        let deadline = state.next_reminder_at();
        assert!(!state.reminder_due(noon()));
        assert!(state.reminder_due(deadline));

        state.mark_reminder_fired(deadline);
        assert_eq!(
            state.next_reminder_at(),
            deadline + Duration::seconds(3600)
        );
        assert!(!state.reminder_due(deadline));
    }

    #[test]
    fn formatted_time_remaining_formats() {
        let state = fresh();
        // next reminder is one hour out
        assert_eq!(state.formatted_time_remaining(noon()), "60m 0s");
        assert_eq!(
            state.formatted_time_remaining(noon() + Duration::seconds(3575)),
            "25s"
        );
        assert_eq!(
            state.formatted_time_remaining(noon() + Duration::seconds(3600)),
            "now"
        );
        assert_eq!(
            state.formatted_time_remaining(noon() + Duration::seconds(9999)),
            "now"
        );
    }

    #[test]
    fn progress_spans_zero_to_one() {
        let mut state = fresh();
        assert_eq!(state.progress_percentage(), 0.0);
        state.drink_water(1000.0, noon()).unwrap();
        assert_eq!(state.progress_percentage(), 0.5);
        state.drink_water(5000.0, noon()).unwrap();
        assert_eq!(state.progress_percentage(), 1.0);
    }

    #[test]
    fn persists_and_reloads_through_the_store() {
        let db = Database::open_memory().unwrap();
        let mut state = fresh();
        state.drink_water(750.0, noon()).unwrap();
        state.update_reminder_interval(1800.0, noon()).unwrap();
        state.reset_target(day(15), noon());
        state.drink_water(300.0, noon()).unwrap();
        state.persist(&db).unwrap();

        let loaded = HydrationState::load(&db).unwrap();
        assert_eq!(loaded.remaining_ml(), 1700.0);
        assert_eq!(loaded.goal_ml(), 2000.0);
        assert_eq!(loaded.interval_secs(), 1800.0);
        assert_eq!(loaded.next_reminder_at(), state.next_reminder_at());
        assert_eq!(loaded.last_reset_date(), Some(day(15)));
    }

    #[test]
    fn empty_store_loads_defaults() {
        let db = Database::open_memory().unwrap();
        let state = HydrationState::load(&db).unwrap();
        assert_eq!(state.goal_ml(), DEFAULT_GOAL_ML);
        assert_eq!(state.interval_secs(), DEFAULT_INTERVAL_SECS);
        assert_eq!(state.remaining_ml(), DEFAULT_GOAL_ML);
        assert_eq!(state.last_reset_date(), None);
    }

    #[test]
    fn zero_goal_in_store_falls_back_to_default() {
        let db = Database::open_memory().unwrap();
        db.kv_set("daily_goal", "0").unwrap();
        db.kv_set("reminder_interval", "0").unwrap();
        let state = HydrationState::load(&db).unwrap();
        assert_eq!(state.goal_ml(), DEFAULT_GOAL_ML);
        assert_eq!(state.interval_secs(), DEFAULT_INTERVAL_SECS);
    }

    #[test]
    fn met_goal_survives_a_reload() {
        let db = Database::open_memory().unwrap();
        let mut state = fresh();
        state.drink_water(2000.0, noon()).unwrap();
        state.persist(&db).unwrap();

        let loaded = HydrationState::load(&db).unwrap();
        assert_eq!(loaded.remaining_ml(), 0.0);
        assert!(loaded.show_celebration());
    }

    proptest! {
        #[test]
        fn drink_arithmetic_holds(amount in 0.1f64..10_000.0) {
            let mut state = fresh();
            let previous = state.remaining_ml();
            state.drink_water(amount, noon()).unwrap();
            prop_assert_eq!(state.remaining_ml(), (previous - amount).max(0.0));
            prop_assert!(state.remaining_ml() >= 0.0);
            prop_assert!(state.remaining_ml() <= state.goal_ml());
        }

        #[test]
        fn progress_is_monotone_and_bounded(amounts in prop::collection::vec(0.1f64..1_000.0, 0..20)) {
            let mut state = fresh();
            let mut last = state.progress_percentage();
            for amount in amounts {
                state.drink_water(amount, noon()).unwrap();
                let progress = state.progress_percentage();
                prop_assert!((0.0..=1.0).contains(&progress));
                prop_assert!(progress >= last);
                last = progress;
            }
        }

        #[test]
        fn goal_update_preserves_progress(drunk in 0.1f64..5_000.0, new_goal in 1.0f64..5_000.0) {
            let mut state = fresh();
            state.drink_water(drunk, noon()).unwrap();
            let consumed = state.consumed_ml();
            state.update_daily_goal(new_goal, noon()).unwrap();
            if consumed < new_goal {
                prop_assert_eq!(state.remaining_ml(), new_goal - consumed);
                prop_assert!(!state.show_celebration());
            } else {
                prop_assert_eq!(state.remaining_ml(), 0.0);
                prop_assert!(state.show_celebration());
            }
        }
    }
}
