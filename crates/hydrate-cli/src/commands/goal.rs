use chrono::Utc;
use clap::Subcommand;
use hydrate_core::{Database, HydrationState};

use super::print_events;

#[derive(Subcommand)]
pub enum GoalAction {
    /// Print the daily goal in ml
    Get,
    /// Set the daily goal in ml (progress already drunk is preserved)
    Set {
        /// New daily goal in milliliters
        goal_ml: f64,
    },
}

pub fn run(action: GoalAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let (mut state, _) = HydrationState::open(&db)?;

    match action {
        GoalAction::Get => {
            println!("{:.0}", state.goal_ml());
        }
        GoalAction::Set { goal_ml } => {
            let event = state.update_daily_goal(goal_ml, Utc::now())?;
            state.persist(&db)?;
            print_events([&event])?;
        }
    }
    Ok(())
}
