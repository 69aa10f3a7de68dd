use chrono::Utc;
use clap::Subcommand;
use hydrate_core::{notify, Config, Database, DesktopNotifier, HydrationState, Notifier};

use super::print_events;

#[derive(Subcommand)]
pub enum NotifyAction {
    /// Send a test reminder now
    Test,
    /// Print the notification authorization state
    Status,
}

pub fn run(action: NotifyAction) -> Result<(), Box<dyn std::error::Error>> {
    let notifier = DesktopNotifier::new();

    match action {
        NotifyAction::Test => {
            let config = Config::load_or_default();
            if !config.notifications.enabled {
                println!("notifications are disabled (notifications.enabled = false)");
                return Ok(());
            }

            let db = Database::open()?;
            let (mut state, _) = HydrationState::open(&db)?;
            state.set_notifications_authorized(notifier.authorization_status());

            match notify::trigger_notification(&mut state, &notifier, Utc::now()) {
                Some(event) => {
                    state.persist(&db)?;
                    print_events([&event])?;
                }
                None => println!("notification permission requested"),
            }
        }
        NotifyAction::Status => {
            if notifier.authorization_status() {
                println!("authorized");
            } else {
                println!("not authorized");
            }
        }
    }
    Ok(())
}
