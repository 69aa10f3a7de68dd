use chrono::{Local, Utc};
use hydrate_core::{Database, HydrationState};

/// Print the current hydration state, human-readable or as a JSON snapshot.
pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let (state, _) = HydrationState::open(&db)?;
    let now = Utc::now();

    if json {
        println!("{}", serde_json::to_string_pretty(&state.snapshot(now))?);
        return Ok(());
    }

    println!(
        "{:.0} / {:.0} ml consumed ({:.0}%)",
        state.consumed_ml(),
        state.goal_ml(),
        state.progress_percentage() * 100.0
    );
    println!("Remaining target: {:.0} ml", state.remaining_ml());
    println!("Next reminder in {}", state.formatted_time_remaining(now));
    if let Some(drink) = db.latest_drink()? {
        println!(
            "Last drink: {:.0} ml at {}",
            drink.amount_ml,
            drink.at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        );
    }
    if state.show_celebration() {
        println!("Daily goal reached! Run `hydrate-cli dismiss` to clear the celebration.");
    }
    Ok(())
}
