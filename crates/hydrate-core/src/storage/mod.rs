mod config;
pub mod database;

pub use config::Config;
pub use database::{DailyTotal, Database, DrinkRecord, Stats};

use std::path::PathBuf;

/// Returns `~/.config/hydrate[-dev]/` based on HYDRATE_ENV.
///
/// Set HYDRATE_ENV=dev to use the development data directory, or
/// HYDRATE_DATA_DIR to override the location entirely (used by the CLI
/// end-to-end tests to stay away from the real store).
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = if let Ok(dir) = std::env::var("HYDRATE_DATA_DIR") {
        PathBuf::from(dir)
    } else {
        let base_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config");
        let env = std::env::var("HYDRATE_ENV").unwrap_or_else(|_| "production".to_string());
        if env == "dev" {
            base_dir.join("hydrate-dev")
        } else {
            base_dir.join("hydrate")
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
