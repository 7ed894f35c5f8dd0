//! Run command - scan, then keep filing until a shutdown signal.

use anyhow::Context;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::cli::report;
use crate::config::Settings;
use crate::daemon::Daemon;
use crate::events;
use crate::notifications::Notifier;
use crate::pidfile::PidFile;
use crate::watcher::WatchState;

/// Run the daemon in the foreground until SIGINT/SIGTERM.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let _pid_file = if settings.daemonize {
        let pid = PidFile::create(&settings.pid_file)
            .with_context(|| format!("cannot write PID file {}", settings.pid_file.display()))?;
        crate::log_event!("daemon", "started", "pid file {}", pid.path().display());
        Some(pid)
    } else {
        crate::log_event!("daemon", "running in foreground");
        None
    };

    if settings.dry_run {
        crate::log_event!("daemon", "dry run", "no files will be moved");
    }

    let (sink, events) = events::channel();
    let reporter = tokio::spawn(report::forward(
        events,
        Notifier::new(settings.notifications),
    ));

    // Listen before starting so a signal during the initial scan stops it.
    let cancel = CancellationToken::new();
    let signals = tokio::spawn(cancel_on_signal(cancel.clone()));

    let handle = Daemon::start_with_token(&settings, sink, cancel.clone()).await?;
    crate::log_event!("daemon", "ready", "{}", handle.root().display());

    if watcher_ended(&cancel, handle.state_receiver()).await {
        tracing::warn!("[daemon] watcher stopped unexpectedly");
    }
    crate::log_event!("daemon", "shutting down");

    handle.stop().await?;
    signals.abort();
    // All senders are gone once the watcher has closed.
    let _ = reporter.await;

    crate::log_event!("daemon", "cleanup complete");
    Ok(())
}

/// Wait for a shutdown request or for the watcher to close by itself.
///
/// Returns `true` in the second case.
async fn watcher_ended(cancel: &CancellationToken, mut state: watch::Receiver<WatchState>) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        closed = state.wait_for(|s| s.is_closed()) => closed.is_ok() && !cancel.is_cancelled(),
    }
}

/// Cancel `token` on the first SIGINT or SIGTERM.
async fn cancel_on_signal(token: CancellationToken) {
    let name = wait_for_signal().await;
    crate::log_event!("daemon", "received signal", "{name}");
    token.cancel();
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            tracing::warn!("[daemon] cannot listen for SIGTERM: {e}");
            let _ = tokio::signal::ctrl_c().await;
            return "SIGINT";
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => "SIGINT",
        _ = term.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "Ctrl-C"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_when_watcher_closes_on_its_own() {
        let cancel = CancellationToken::new();
        let (tx, rx) = watch::channel(WatchState::Subscribed);
        tx.send_replace(WatchState::Closed);

        assert!(watcher_ended(&cancel, rx).await);
    }

    #[tokio::test]
    async fn test_returns_on_cancel() {
        let cancel = CancellationToken::new();
        let (_tx, rx) = watch::channel(WatchState::Subscribed);
        cancel.cancel();

        assert!(!watcher_ended(&cancel, rx).await);
    }
}
