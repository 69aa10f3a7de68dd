use chrono::{Local, Utc};
use hydrate_core::{notify, Config, Database, DesktopNotifier, Event, HydrationState};

use super::print_events;

/// Log a drink, persisting state and appending to the drink log.
pub fn run_drink(amount_ml: Option<f64>) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let (mut state, reset) = HydrationState::open(&db)?;
    let config = Config::load_or_default();
    let amount = amount_ml.unwrap_or(config.intake.default_drink_ml);

    let now = Utc::now();
    let events = state.drink_water(amount, now)?;
    state.persist(&db)?;
    db.log_drink(amount, now)?;

    if config.notifications.enabled
        && events.iter().any(|e| matches!(e, Event::GoalReached { .. }))
    {
        let notifier = DesktopNotifier::new();
        notify::send_celebration(&notifier, state.goal_ml());
    }

    print_events(reset.iter().chain(events.iter()))
}

/// Reset the remaining target back to the daily goal.
pub fn run_reset() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let (mut state, _) = HydrationState::open(&db)?;

    let event = state.reset_target(Local::now().date_naive(), Utc::now());
    state.persist(&db)?;
    print_events([&event])
}

/// Clear the goal-reached celebration.
pub fn run_dismiss() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let (mut state, _) = HydrationState::open(&db)?;

    match state.dismiss_celebration(Utc::now()) {
        Some(event) => {
            state.persist(&db)?;
            print_events([&event])
        }
        None => {
            println!("no celebration to dismiss");
            Ok(())
        }
    }
}
