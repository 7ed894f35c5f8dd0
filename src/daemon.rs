//! Lifecycle controller: subscribe, scan, watch, stop.
//!
//! The ordering is load-bearing. The filesystem subscription is opened
//! *before* the initial scan starts, so a file created while the scan runs
//! is queued for the watcher instead of lost. Seeing the same file from both
//! sides is harmless: the second look finds it already in place.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::classify::Classifier;
use crate::config::{ConfigError, Settings, expand_tilde};
use crate::events::OutcomeSink;
use crate::exclude::{ExcludeError, ExclusionSet};
use crate::scan::{self, ScanError, ScanReport};
use crate::watcher::{WatchDriver, WatchError, WatchState, WatchStats};

/// Startup and shutdown failures. Per-file problems never show up here.
#[derive(Error, Debug)]
pub enum DaemonError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Root {} is not a watchable directory: {source}", .path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to compile exclude patterns: {0}")]
    Exclude(#[from] ExcludeError),

    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error("Initial scan failed: {0}")]
    Scan(#[from] ScanError),

    #[error("Background task failed: {0}")]
    Join(String),
}

/// Canonical absolute form of the configured root.
///
/// Canonicalizing up front keeps scan paths and watcher event paths
/// comparable (e.g. `/var` vs `/private/var` on macOS).
pub fn resolve_root(root: &Path) -> Result<PathBuf, DaemonError> {
    let expanded = expand_tilde(root)?;
    let canonical = expanded
        .canonicalize()
        .map_err(|source| DaemonError::Root {
            path: expanded.clone(),
            source,
        })?;
    if !canonical.is_dir() {
        return Err(DaemonError::Root {
            path: canonical,
            source: std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
        });
    }
    Ok(canonical)
}

/// Runtime state of one watched root.
///
/// Owns the subscription; the drivers only borrow the classifier.
pub struct WatchSession {
    root: PathBuf,
    classifier: Arc<Classifier>,
    driver: WatchDriver,
}

impl WatchSession {
    /// Resolve the root, compile exclusions and subscribe recursively.
    ///
    /// Any failure here is fatal and happens before a file is touched.
    pub fn open(settings: &Settings) -> Result<Self, DaemonError> {
        let (root, classifier) = classifier_for(settings)?;
        let driver = WatchDriver::subscribe(&root, settings.delay)?;

        Ok(Self {
            root,
            classifier,
            driver,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn classifier(&self) -> &Arc<Classifier> {
        &self.classifier
    }

    pub fn state(&self) -> WatchState {
        self.driver.state()
    }
}

/// Entry point for hosts.
pub struct Daemon;

impl Daemon {
    /// Start with a fresh cancellation token.
    pub async fn start(settings: &Settings, sink: OutcomeSink) -> Result<DaemonHandle, DaemonError> {
        Self::start_with_token(settings, sink, CancellationToken::new()).await
    }

    /// Open the session, run the initial scan to completion, then leave the
    /// watcher running in the background.
    ///
    /// The daemon is ready when this returns. Cancelling `cancel` while the
    /// scan runs stops it between files; the returned handle then reports a
    /// cancelled scan and its watcher exits immediately.
    pub async fn start_with_token(
        settings: &Settings,
        sink: OutcomeSink,
        cancel: CancellationToken,
    ) -> Result<DaemonHandle, DaemonError> {
        let session = WatchSession::open(settings)?;
        crate::log_event!("daemon", "watching", "{}", session.root.display());

        crate::log_event!("scan", "starting");
        let scan_report = run_scan(
            session.root.clone(),
            session.classifier.clone(),
            sink.clone(),
            cancel.clone(),
        )
        .await?;
        crate::log_event!("scan", "complete", "{scan_report}");

        let WatchSession {
            root,
            classifier,
            driver,
        } = session;
        let state = driver.state_receiver();
        let task = tokio::spawn(driver.run(classifier, sink, cancel.clone()));

        Ok(DaemonHandle {
            root,
            scan_report,
            cancel,
            state,
            task,
        })
    }

    /// Run the initial scan only, without subscribing.
    pub async fn scan_once(settings: &Settings, sink: OutcomeSink) -> Result<ScanReport, DaemonError> {
        let (root, classifier) = classifier_for(settings)?;
        run_scan(root, classifier, sink, CancellationToken::new()).await
    }
}

/// Resolve the root and compile exclusions. Touches no files.
fn classifier_for(settings: &Settings) -> Result<(PathBuf, Arc<Classifier>), DaemonError> {
    let root = resolve_root(&settings.root)?;
    let exclusions = ExclusionSet::compile(&settings.exclude, &root)?;
    let classifier = Classifier::new(root.clone(), exclusions, settings.dry_run);
    Ok((root, Arc::new(classifier)))
}

async fn run_scan(
    root: PathBuf,
    classifier: Arc<Classifier>,
    sink: OutcomeSink,
    cancel: CancellationToken,
) -> Result<ScanReport, DaemonError> {
    tokio::task::spawn_blocking(move || scan::scan(&root, &classifier, &sink, &cancel))
        .await
        .map_err(|e| DaemonError::Join(e.to_string()))?
        .map_err(DaemonError::from)
}

/// A running daemon.
pub struct DaemonHandle {
    root: PathBuf,
    scan_report: ScanReport,
    cancel: CancellationToken,
    state: watch::Receiver<WatchState>,
    task: JoinHandle<WatchStats>,
}

impl DaemonHandle {
    /// The canonical watched root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Result of the initial scan.
    pub fn scan_report(&self) -> &ScanReport {
        &self.scan_report
    }

    /// Token that stops the daemon when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn watch_state(&self) -> WatchState {
        *self.state.borrow()
    }

    /// Follow watcher state transitions.
    pub fn state_receiver(&self) -> watch::Receiver<WatchState> {
        self.state.clone()
    }

    /// Cancel, release the subscription and wait for in-flight moves.
    pub async fn stop(self) -> Result<WatchStats, DaemonError> {
        self.cancel.cancel();
        self.wait().await
    }

    /// Wait for the watcher to finish on its own (or via the token).
    pub async fn wait(self) -> Result<WatchStats, DaemonError> {
        self.task
            .await
            .map_err(|e| DaemonError::Join(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_session_subscribes_before_any_scan() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("15.23 Notes.txt"), "notes").unwrap();
        let settings = Settings {
            root: temp.path().to_path_buf(),
            ..Settings::default()
        };

        let session = WatchSession::open(&settings).unwrap();

        assert_eq!(session.state(), WatchState::Subscribed);
        assert_eq!(session.root(), temp.path().canonicalize().unwrap());
        // Opening is side-effect free: the scan has not run yet.
        assert!(temp.path().join("15.23 Notes.txt").is_file());
    }

    #[test]
    fn test_root_must_be_a_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain.txt");
        std::fs::write(&file, "x").unwrap();

        assert!(matches!(resolve_root(&file), Err(DaemonError::Root { .. })));
    }
}
