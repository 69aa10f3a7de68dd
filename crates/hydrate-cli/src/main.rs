use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "hydrate-cli", version, about = "Hydrate CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a drink (amount in ml, default from intake.default_drink_ml)
    Drink {
        /// Amount of water drunk, in milliliters
        amount_ml: Option<f64>,
    },
    /// Print the current hydration state
    Status {
        /// Print a machine-readable JSON snapshot
        #[arg(long)]
        json: bool,
    },
    /// Reset today's remaining target back to the daily goal
    Reset,
    /// Dismiss the goal-reached celebration
    Dismiss,
    /// Daily goal management
    Goal {
        #[command(subcommand)]
        action: commands::goal::GoalAction,
    },
    /// Reminder interval management
    Interval {
        #[command(subcommand)]
        action: commands::interval::IntervalAction,
    },
    /// Notification controls
    Notify {
        #[command(subcommand)]
        action: commands::notify::NotifyAction,
    },
    /// Intake statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Run the reminder loop in the foreground
    Watch,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Drink { amount_ml } => commands::drink::run_drink(amount_ml),
        Commands::Status { json } => commands::status::run(json),
        Commands::Reset => commands::drink::run_reset(),
        Commands::Dismiss => commands::drink::run_dismiss(),
        Commands::Goal { action } => commands::goal::run(action),
        Commands::Interval { action } => commands::interval::run(action),
        Commands::Notify { action } => commands::notify::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Watch => commands::watch::run(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
