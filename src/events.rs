//! Outcome channel from the core to the host.
//!
//! Every classified file produces exactly one [`DaemonEvent::Outcome`].
//! Errors raised by the filesystem subscription mid-run arrive as
//! [`DaemonEvent::WatchError`]. The host decides what to log or notify.

use tokio::sync::mpsc;

use crate::classify::{Outcome, Source};
use crate::watcher::WatchError;

#[derive(Debug)]
pub enum DaemonEvent {
    Outcome { source: Source, outcome: Outcome },
    WatchError(WatchError),
}

/// Sending half of the outcome channel.
///
/// Sending never blocks, so it can be used from the blocking scan thread
/// as well as from async tasks.
#[derive(Debug, Clone)]
pub struct OutcomeSink {
    sender: mpsc::UnboundedSender<DaemonEvent>,
}

/// Create a connected sink/receiver pair.
pub fn channel() -> (OutcomeSink, mpsc::UnboundedReceiver<DaemonEvent>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (OutcomeSink { sender }, receiver)
}

impl OutcomeSink {
    pub fn outcome(&self, source: Source, outcome: Outcome) {
        self.send(DaemonEvent::Outcome { source, outcome });
    }

    pub fn watch_error(&self, error: WatchError) {
        self.send(DaemonEvent::WatchError(error));
    }

    fn send(&self, event: DaemonEvent) {
        if let Err(e) = self.sender.send(event) {
            // Host stopped listening; the filesystem is still the record.
            tracing::trace!("outcome dropped, no receiver: {:?}", e.0);
        }
    }
}
