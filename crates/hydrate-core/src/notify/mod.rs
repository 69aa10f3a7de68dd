//! Notification dispatch.
//!
//! The platform notification service is an external collaborator behind the
//! [`Notifier`] trait. Dispatch is fire-and-forget: failures are logged and
//! swallowed, never retried — the worst case is a missed reminder, recovered
//! on the next period.

mod desktop;

pub use desktop::DesktopNotifier;

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::NotifyError;
use crate::events::Event;
use crate::hydration::HydrationState;

pub const REMINDER_TITLE: &str = "Hydration Reminder";
pub const CELEBRATION_TITLE: &str = "Congratulations! 🎉";

/// Delivery delay for immediate sends.
const IMMEDIATE_DELAY: Duration = Duration::from_millis(100);

const REMINDER_MESSAGES: [&str; 5] = [
    "It's hydration time! Just a friendly reminder that your body needs water. 💧",
    "Water break! Take a moment to hydrate - your future self will thank you. 🌊",
    "Staying hydrated is a form of self-care. Time for some refreshment! 🥤",
    "Your friendly hydration reminder is here! Take a sip and stay energized. ⚡",
    "Hydration checkpoint! Remember to drink water for better focus and energy. 🧠",
];

/// Contract with the platform notification service.
pub trait Notifier {
    /// Ask the platform for permission to notify. Returns the granted state.
    fn request_authorization(&self) -> bool;

    /// Current permission state, without prompting.
    fn authorization_status(&self) -> bool;

    /// Drop any notification that is scheduled but not yet delivered.
    fn cancel_all_pending(&self);

    /// Deliver a notification after `delay`, tagged with a unique
    /// `identifier`.
    ///
    /// # Errors
    /// Returns an error when the platform refuses or fails to deliver.
    fn schedule(
        &self,
        title: &str,
        body: &str,
        delay: Duration,
        identifier: &str,
    ) -> Result<(), NotifyError>;
}

/// Reminder body: a random message from the pool, plus the remaining/goal
/// interpolation.
pub fn reminder_body(remaining_ml: f64, goal_ml: f64) -> String {
    let message = REMINDER_MESSAGES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Time to hydrate!");
    format!(
        "{message} You still need to drink {}ml to reach your {}ml goal.",
        remaining_ml as i64, goal_ml as i64
    )
}

pub fn celebration_body(goal_ml: f64) -> String {
    format!(
        "You've reached your daily hydration goal of {}ml! Amazing job taking care of yourself!",
        goal_ml as i64
    )
}

/// Send the periodic reminder. Errors are logged, not surfaced.
pub fn send_reminder(notifier: &dyn Notifier, remaining_ml: f64, goal_ml: f64) {
    let body = reminder_body(remaining_ml, goal_ml);
    let identifier = format!("reminder-{}", Uuid::new_v4());
    if let Err(e) = notifier.schedule(REMINDER_TITLE, &body, IMMEDIATE_DELAY, &identifier) {
        warn!(error = %e, "failed to deliver reminder notification");
    }
}

/// Send the goal-reached celebration. Errors are logged, not surfaced.
pub fn send_celebration(notifier: &dyn Notifier, goal_ml: f64) {
    let body = celebration_body(goal_ml);
    let identifier = format!("celebration-{}", Uuid::new_v4());
    if let Err(e) = notifier.schedule(CELEBRATION_TITLE, &body, IMMEDIATE_DELAY, &identifier) {
        warn!(error = %e, "failed to deliver celebration notification");
    }
}

/// The settings surface's test-notification action.
///
/// When authorized: cancel anything pending, notify immediately, and push the
/// next scheduled reminder a full period out. When not authorized: re-request
/// permission instead of sending.
pub fn trigger_notification(
    state: &mut HydrationState,
    notifier: &dyn Notifier,
    now: DateTime<Utc>,
) -> Option<Event> {
    if state.notifications_authorized() {
        notifier.cancel_all_pending();
        let body = reminder_body(state.remaining_ml(), state.goal_ml());
        let identifier = format!("test-notification-{}", Uuid::new_v4());
        if let Err(e) = notifier.schedule(REMINDER_TITLE, &body, IMMEDIATE_DELAY, &identifier) {
            warn!(error = %e, "failed to deliver test notification");
        }
        Some(state.mark_reminder_fired(now))
    } else {
        info!("notifications not authorized, re-requesting permission");
        let granted = notifier.request_authorization();
        state.set_notifications_authorized(granted);
        None
    }
}
