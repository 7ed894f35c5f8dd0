//! Johnny Decimal Daemon.
//!
//! Keeps a directory tree filed by Johnny Decimal codes: a file named
//! `15.23 Report.pdf` anywhere under the root ends up in
//! `10-19/15/15.23/15.23 Report.pdf`.
//!
//! The core (`jd`, `exclude`, `classify`, `scan`, `watcher`, `daemon`)
//! reports every decision through [`events`] and leaves logging and
//! notifications to the host (`cli`).

pub mod logging;

pub mod classify;
pub mod cli;
pub mod config;
pub mod daemon;
pub mod events;
pub mod exclude;
pub mod jd;
pub mod notifications;
pub mod pidfile;
pub mod scan;
pub mod watcher;

pub use classify::{Classifier, ClassifyError, Outcome, OutcomeKind, Source};
pub use config::Settings;
pub use daemon::{Daemon, DaemonError, DaemonHandle, WatchSession};
pub use events::{DaemonEvent, OutcomeSink};
pub use exclude::{ExcludeError, ExclusionSet};
pub use jd::JohnnyDecimalId;
pub use scan::{ScanError, ScanReport};
pub use watcher::{WatchDriver, WatchError, WatchState, WatchStats};
