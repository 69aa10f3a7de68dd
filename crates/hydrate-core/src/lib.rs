//! # Hydrate Core Library
//!
//! This library provides the core logic for Hydrate, a water-reminder utility:
//! daily intake tracking against a configurable goal, reminder scheduling, and
//! persistence. It follows a CLI-first philosophy where every operation is
//! available via a standalone CLI binary, with any GUI being a thin layer over
//! the same core library.
//!
//! ## Architecture
//!
//! - **Hydration state**: A wall-clock-based state machine with no internal
//!   threads; the owning loop checks `reminder_due()` periodically and
//!   persists after every mutation
//! - **Storage**: SQLite-based key-value state store and drink log, plus
//!   TOML-based preferences
//! - **Notifications**: Platform dispatch behind the [`Notifier`] trait;
//!   failures are logged, never fatal
//!
//! ## Key Components
//!
//! - [`HydrationState`]: Goal tracking, daily reset, and reminder schedule
//! - [`Database`]: State persistence and intake statistics
//! - [`Config`]: User preferences
//! - [`Notifier`]: Contract for the platform notification service

pub mod error;
pub mod events;
pub mod hydration;
pub mod notify;
pub mod storage;

pub use error::{ConfigError, CoreError, DatabaseError, NotifyError, ValidationError};
pub use events::Event;
pub use hydration::{HydrationState, DEFAULT_GOAL_ML, DEFAULT_INTERVAL_SECS};
pub use notify::{DesktopNotifier, Notifier};
pub use storage::{Config, Database};
