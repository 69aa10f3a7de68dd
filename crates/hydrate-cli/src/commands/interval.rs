use chrono::Utc;
use clap::Subcommand;
use hydrate_core::{Config, Database, HydrationState};

use super::print_events;

#[derive(Subcommand)]
pub enum IntervalAction {
    /// Print the reminder interval in minutes
    Get,
    /// Set the reminder interval in minutes; replaces the pending schedule
    Set {
        /// New interval in minutes
        minutes: f64,
    },
    /// List the interval choices offered by the settings surface
    Choices,
}

pub fn run(action: IntervalAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        IntervalAction::Get => {
            let db = Database::open()?;
            let (state, _) = HydrationState::open(&db)?;
            println!("{:.0}", state.interval_secs() / 60.0);
        }
        IntervalAction::Set { minutes } => {
            let db = Database::open()?;
            let (mut state, _) = HydrationState::open(&db)?;
            let event = state.update_reminder_interval(minutes * 60.0, Utc::now())?;
            state.persist(&db)?;
            print_events([&event])?;
        }
        IntervalAction::Choices => {
            let config = Config::load_or_default();
            for minutes in config.reminder.interval_choices_min {
                println!("{minutes}");
            }
        }
    }
    Ok(())
}
