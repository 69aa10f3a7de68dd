//! Foreground reminder loop.
//!
//! Owns the authoritative state for the lifetime of the process. A one-second
//! tick drives both periodic tasks: the countdown redraw and the reminder
//! check. The schedule itself lives in the kv store, so settings changed by
//! another invocation (a new interval replaces the pending deadline) take
//! effect on the next tick. All mutation is serialized through this loop.

use std::io::Write;

use chrono::{Local, Utc};
use hydrate_core::{notify, Config, Database, DesktopNotifier, HydrationState, Notifier};
use tracing::info;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(watch_loop())
}

async fn watch_loop() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let notifier = DesktopNotifier::new();

    let (mut state, reset) = HydrationState::open(&db)?;
    if reset.is_some() {
        info!("daily target reset on startup");
    }
    state.set_notifications_authorized(notifier.request_authorization());
    let authorized = state.notifications_authorized();

    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(1));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Utc::now();

                // Pick up writes from other invocations; while this loop
                // runs it is the only mutator.
                state = HydrationState::load(&db)?;
                state.set_notifications_authorized(authorized);

                if let Some(event) = state.check_for_daily_reset(Local::now().date_naive(), now) {
                    state.persist(&db)?;
                    info!(event = ?event, "daily target reset");
                }

                if state.reminder_due(now) {
                    let config = Config::load_or_default();
                    if config.notifications.enabled && state.notifications_authorized() {
                        notify::send_reminder(&notifier, state.remaining_ml(), state.goal_ml());
                    }
                    state.mark_reminder_fired(now);
                    state.persist(&db)?;
                    info!(remaining_ml = state.remaining_ml(), "reminder fired");
                }

                print!(
                    "\rNext reminder in {}  ({:.0} ml remaining)   ",
                    state.formatted_time_remaining(now),
                    state.remaining_ml()
                );
                std::io::stdout().flush().ok();
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                info!("watch loop stopped");
                return Ok(());
            }
        }
    }
}
