//! Scan command - one pass over the tree, no watching.

use crate::cli::report;
use crate::config::Settings;
use crate::daemon::Daemon;
use crate::events;
use crate::notifications::Notifier;

pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let (sink, events) = events::channel();
    let reporter = tokio::spawn(report::forward(
        events,
        Notifier::new(settings.notifications),
    ));

    let result = Daemon::scan_once(&settings, sink).await;
    let _ = reporter.await;
    let report = result?;

    println!("Scanned {}", settings.root.display());
    println!("{report}");
    Ok(())
}
