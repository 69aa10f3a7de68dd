use clap::Subcommand;
use hydrate_core::Database;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's intake
    Today,
    /// All-time intake
    All,
    /// Intake grouped by calendar day
    Daily,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        StatsAction::Today => {
            let stats = db.stats_today()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::All => {
            let stats = db.stats_all()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::Daily => {
            let totals = db.daily_totals()?;
            println!("{}", serde_json::to_string_pretty(&totals)?);
        }
    }
    Ok(())
}
