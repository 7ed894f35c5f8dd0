//! Turns daemon events into log lines and desktop notifications.

use std::path::Path;

use tokio::sync::mpsc;

use crate::classify::{Outcome, Source};
use crate::events::DaemonEvent;
use crate::notifications::Notifier;

/// Paths are shown with `/` separators on every platform.
fn pretty(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// One-line description of an outcome.
pub fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Moved {
            from,
            to,
            dry_run: false,
        } => format!("Moved {} -> {}", pretty(from), pretty(to)),
        Outcome::Moved {
            from,
            to,
            dry_run: true,
        } => format!("[dry run] Would move {} -> {}", pretty(from), pretty(to)),
        Outcome::AlreadyInPlace { path } => format!("In place: {}", pretty(path)),
        Outcome::Excluded { path } => format!("Excluded: {}", pretty(path)),
        Outcome::NotJdFile { path } => format!("Not a Johnny Decimal file: {}", pretty(path)),
        Outcome::Failed { path, error } => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| pretty(path));
            format!("Error filing {name}: {error}")
        }
    }
}

/// Log one event at the level its kind deserves and notify when notable.
pub fn report(event: &DaemonEvent, notifier: &Notifier) {
    match event {
        DaemonEvent::Outcome { source, outcome } => report_outcome(*source, outcome, notifier),
        DaemonEvent::WatchError(e) => tracing::error!("[watcher] {e}"),
    }
}

fn report_outcome(source: Source, outcome: &Outcome, notifier: &Notifier) {
    let message = describe(outcome);
    match outcome {
        Outcome::Moved { .. } => crate::log_event!(source, "filed", "{message}"),
        Outcome::Failed { .. } => tracing::error!("[{source}] {message}"),
        Outcome::AlreadyInPlace { .. } | Outcome::Excluded { .. } | Outcome::NotJdFile { .. } => {
            crate::debug_event!(source, "skipped", "{message}")
        }
    }

    if outcome.is_notable() {
        notifier.send(&message);
    }
}

/// Drain the outcome channel until every sender is gone.
pub async fn forward(mut events: mpsc::UnboundedReceiver<DaemonEvent>, notifier: Notifier) {
    while let Some(event) = events.recv().await {
        report(&event, &notifier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ClassifyError;
    use std::path::PathBuf;

    #[test]
    fn test_describe_moves() {
        let moved = Outcome::Moved {
            from: PathBuf::from("/r/15.23 a.txt"),
            to: PathBuf::from("/r/10-19/15/15.23/15.23 a.txt"),
            dry_run: false,
        };
        assert_eq!(
            describe(&moved),
            "Moved /r/15.23 a.txt -> /r/10-19/15/15.23/15.23 a.txt"
        );

        let planned = Outcome::Moved {
            from: PathBuf::from("/r/15.23 a.txt"),
            to: PathBuf::from("/r/10-19/15/15.23/15.23 a.txt"),
            dry_run: true,
        };
        assert!(describe(&planned).starts_with("[dry run] Would move"));
    }

    #[test]
    fn test_describe_failure_uses_file_name() {
        let failed = Outcome::Failed {
            path: PathBuf::from("/r/15.23 a.txt"),
            error: ClassifyError::NoFileName,
        };
        assert_eq!(
            describe(&failed),
            "Error filing 15.23 a.txt: Path has no file name"
        );
        assert!(failed.is_notable());
    }
}
