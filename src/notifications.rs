//! Desktop notifications for filing outcomes.
//!
//! Delivered through the platform notification service via `notify-rust`
//! (D-Bus on Linux and the BSDs, Notification Center on macOS). Delivery is
//! best effort: the first failure is logged at debug level, later ones are
//! ignored.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use notify_rust::Notification;

/// Notification title.
pub const APP_NAME: &str = "Johnny Decimal Daemon";

/// Sends notifications when enabled.
#[derive(Debug, Clone)]
pub struct Notifier {
    enabled: bool,
    warned: Arc<AtomicBool>,
}

impl Notifier {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            warned: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Show `message`. No-op when disabled.
    ///
    /// `show` blocks on the notification service, so it runs on its own
    /// thread and never holds up the outcome channel.
    pub fn send(&self, message: &str) {
        if !self.enabled {
            return;
        }

        let notification = build_notification(message);
        let warned = self.warned.clone();
        std::thread::spawn(move || {
            if let Err(e) = notification.show() {
                warn_once(&warned, &e.to_string());
            }
        });
    }
}

fn build_notification(message: &str) -> Notification {
    let mut notification = Notification::new();
    notification.summary(APP_NAME).body(message).appname(APP_NAME);
    notification
}

fn warn_once(warned: &AtomicBool, reason: &str) {
    if !warned.swap(true, Ordering::Relaxed) {
        crate::debug_event!("notify", "unavailable", "{reason}");
    }
}
