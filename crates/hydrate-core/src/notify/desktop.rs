use std::time::Duration;

use tracing::{debug, trace};

use crate::error::NotifyError;

use super::Notifier;

/// Notifications via the desktop notification daemon.
///
/// The daemon delivers immediately and keeps no deferred queue, so
/// `cancel_all_pending` has nothing to drop and sub-second delays collapse
/// to immediate dispatch; sleeping for them would block the caller, which
/// may be a single-threaded runtime. Permission is managed at the OS level
/// rather than per-app prompts.
#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for DesktopNotifier {
    fn request_authorization(&self) -> bool {
        true
    }

    fn authorization_status(&self) -> bool {
        true
    }

    fn cancel_all_pending(&self) {
        trace!("no deferred notification queue, nothing to cancel");
    }

    fn schedule(
        &self,
        title: &str,
        body: &str,
        delay: Duration,
        identifier: &str,
    ) -> Result<(), NotifyError> {
        if !delay.is_zero() {
            trace!(?delay, "delivering immediately, daemon keeps no schedule");
        }
        debug!(%identifier, "dispatching desktop notification");
        notify_rust::Notification::new()
            .appname("hydrate")
            .summary(title)
            .body(body)
            .show()
            .map(|_| ())
            .map_err(|e| NotifyError::DispatchFailed(e.to_string()))
    }
}
