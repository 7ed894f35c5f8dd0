//! Recursive create-event watcher that files new documents as they appear.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio::time::{Duration, sleep};
use tokio_util::sync::CancellationToken;

use crate::classify::{Classifier, Outcome, Source};
use crate::events::OutcomeSink;

use super::error::WatchError;
use super::state::WatchState;

/// Counters reported when the driver closes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WatchStats {
    /// Create events received (one per path).
    pub created: usize,
    /// Paths handed to the classifier.
    pub classified: usize,
    /// Errors surfaced by the subscription.
    pub errors: usize,
}

/// Owns the filesystem subscription and consumes its events.
///
/// Subscribe first, then [`run`](WatchDriver::run). Events that arrive in
/// between are queued, so nothing created during the initial scan is lost.
/// `run` consumes the driver: a closed driver cannot be restarted.
pub struct WatchDriver {
    root: PathBuf,
    /// Settle delay applied to each create event before classification.
    delay: Duration,
    /// Channel for receiving file events.
    event_rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
    /// The underlying file watcher. Dropping it closes the subscription.
    watcher: Option<RecommendedWatcher>,
    state: watch::Sender<WatchState>,
}

impl WatchDriver {
    /// Open a recursive subscription on `root`.
    pub fn subscribe(root: &Path, delay: Duration) -> Result<Self, WatchError> {
        let (state, _) = watch::channel(WatchState::Idle);
        let (tx, rx) = mpsc::unbounded_channel();

        // notify delivers on its own thread; an unbounded queue keeps it from
        // blocking while the initial scan runs.
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        })?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|e| WatchError::PathWatchFailed {
                path: root.to_path_buf(),
                reason: e.to_string(),
            })?;

        state.send_replace(WatchState::Subscribed);
        crate::debug_event!("watcher", "subscribed", "{}", root.display());

        Ok(Self {
            root: root.to_path_buf(),
            delay,
            event_rx: rx,
            watcher: Some(watcher),
            state,
        })
    }

    /// Driver fed from a hand-held channel instead of a live subscription.
    #[cfg(test)]
    fn from_channel(
        root: &Path,
        delay: Duration,
        event_rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
    ) -> Self {
        let (state, _) = watch::channel(WatchState::Subscribed);
        Self {
            root: root.to_path_buf(),
            delay,
            event_rx,
            watcher: None,
            state,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state(&self) -> WatchState {
        *self.state.borrow()
    }

    /// Follow state transitions from another task.
    pub fn state_receiver(&self) -> watch::Receiver<WatchState> {
        self.state.subscribe()
    }

    /// Consume events until cancelled or the event stream closes.
    ///
    /// Each create event is classified in its own task after the settle
    /// delay, so a burst of new files is not serialized behind one another.
    /// On shutdown the subscription is released first, then classification
    /// already underway is awaited; tasks still waiting out their delay are
    /// dropped.
    pub async fn run(
        mut self,
        classifier: Arc<Classifier>,
        sink: OutcomeSink,
        cancel: CancellationToken,
    ) -> WatchStats {
        let mut stats = WatchStats::default();
        let mut tasks: JoinSet<Option<PathBuf>> = JoinSet::new();

        crate::log_event!("watcher", "started", "{}", self.root.display());

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,

                res = self.event_rx.recv() => {
                    match res {
                        Some(Ok(event)) => {
                            for path in create_paths(event) {
                                stats.created += 1;
                                tasks.spawn(classify_after_delay(
                                    path,
                                    self.delay,
                                    classifier.clone(),
                                    sink.clone(),
                                    cancel.clone(),
                                ));
                            }
                        }
                        Some(Err(e)) => {
                            stats.errors += 1;
                            sink.watch_error(WatchError::EventError {
                                details: e.to_string(),
                            });
                        }
                        None => {
                            crate::debug_event!("watcher", "event stream closed");
                            break;
                        }
                    }
                }

                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    reap(joined, &mut stats, &sink);
                }
            }
        }

        self.state.send_replace(WatchState::Draining);
        // Release the subscription before waiting on in-flight work.
        self.watcher.take();
        self.event_rx.close();

        while let Some(joined) = tasks.join_next().await {
            reap(joined, &mut stats, &sink);
        }

        self.state.send_replace(WatchState::Closed);
        crate::log_event!(
            "watcher",
            "closed",
            "{} created, {} classified, {} errors",
            stats.created,
            stats.classified,
            stats.errors
        );
        stats
    }
}

/// Paths that may hold a newly arrived file.
///
/// Besides creation this covers files renamed or moved into the tree. For a
/// paired rename only the destination counts. Untyped renames pass every
/// path; sources that no longer exist are dropped after the settle delay.
fn create_paths(event: Event) -> Vec<PathBuf> {
    match event.kind {
        EventKind::Create(_) => event.paths,
        EventKind::Modify(ModifyKind::Name(RenameMode::To | RenameMode::Any)) => event.paths,
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            event.paths.into_iter().last().into_iter().collect()
        }
        _ => Vec::new(),
    }
}

fn reap(
    joined: Result<Option<PathBuf>, tokio::task::JoinError>,
    stats: &mut WatchStats,
    sink: &OutcomeSink,
) {
    match joined {
        Ok(Some(_)) => stats.classified += 1,
        Ok(None) => {}
        Err(e) => {
            stats.errors += 1;
            sink.watch_error(WatchError::TaskFailed {
                reason: e.to_string(),
            });
        }
    }
}

/// Wait out the settle delay, then classify `path` if it is still a regular file.
///
/// Returns the path when the classifier ran.
async fn classify_after_delay(
    path: PathBuf,
    delay: Duration,
    classifier: Arc<Classifier>,
    sink: OutcomeSink,
    cancel: CancellationToken,
) -> Option<PathBuf> {
    if !delay.is_zero() {
        tokio::select! {
            _ = sleep(delay) => {}
            _ = cancel.cancelled() => return None,
        }
    }
    if cancel.is_cancelled() {
        return None;
    }

    let task_path = path.clone();
    let result = tokio::task::spawn_blocking(move || -> Option<Outcome> {
        // Folders (including the ones the resolver creates) are never classified.
        match std::fs::symlink_metadata(&task_path) {
            Ok(meta) if meta.is_file() => Some(classifier.process_file(&task_path)),
            Ok(_) => None,
            Err(e) => {
                crate::debug_event!("watcher", "vanished", "{}: {e}", task_path.display());
                None
            }
        }
    })
    .await;

    match result {
        Ok(Some(outcome)) => {
            sink.outcome(Source::Watch, outcome);
            Some(path)
        }
        Ok(None) => None,
        Err(e) => {
            sink.watch_error(WatchError::TaskFailed {
                reason: format!("{}: {e}", path.display()),
            });
            None
        }
    }
}
