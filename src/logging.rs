//! Logging setup for the daemon binary.
//!
//! Compact timestamped output, filtered by the configured `log_level`.
//! The `RUST_LOG` environment variable takes precedence:
//! ```bash
//! RUST_LOG=debug jdd run
//! RUST_LOG=jdd::watcher=trace jdd run
//! ```
//!
//! The core library only emits `tracing` events for its own plumbing
//! (subscription, scan start/stop). Per-file outcomes are logged by the
//! host from the outcome channel.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Mutex, Once};
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: Once = Once::new();

/// Compact time format: HH:MM:SS.mmm
struct CompactTime;

impl FormatTime for CompactTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

/// Map a configured level onto an `EnvFilter` directive.
///
/// Unknown levels fall back to `info`.
pub fn level_directive(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "error" => "error",
        "warn" | "warning" => "warn",
        "debug" => "debug",
        "trace" => "trace",
        _ => "info",
    }
}

/// Initialize logging.
///
/// Call once at startup. Safe to call multiple times (only the first call
/// takes effect). When `log_file` is given, output is appended there without
/// ANSI colors; otherwise it goes to stderr.
pub fn init(level: &str, log_file: Option<&Path>) -> std::io::Result<()> {
    let file = match log_file {
        Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
        None => None,
    };

    let level = level_directive(level);
    INIT.call_once(move || {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(level)
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_timer(CompactTime)
            .with_level(true);

        let layer = match file {
            Some(file) => fmt_layer
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(filter)
                .boxed(),
            None => fmt_layer
                .with_writer(std::io::stderr)
                .with_filter(filter)
                .boxed(),
        };

        tracing_subscriber::registry().with(layer).init();
    });
    Ok(())
}

/// Log an event with component context.
///
/// # Examples
/// ```ignore
/// log_event!("scan", "moved", "{}", path.display());
/// log_event!("watcher", "started");
/// ```
#[macro_export]
macro_rules! log_event {
    ($component:expr, $event:expr) => {
        tracing::info!("[{}] {}", $component, $event)
    };
    ($component:expr, $event:expr, $($arg:tt)*) => {
        tracing::info!("[{}] {}: {}", $component, $event, format!($($arg)*))
    };
}

/// Debug-only event logging.
///
/// # Examples
/// ```ignore
/// debug_event!("watcher", "create", "{}", path.display());
/// ```
#[macro_export]
macro_rules! debug_event {
    ($component:expr, $event:expr) => {
        tracing::debug!("[{}] {}", $component, $event)
    };
    ($component:expr, $event:expr, $($arg:tt)*) => {
        tracing::debug!("[{}] {}: {}", $component, $event, format!($($arg)*))
    };
}
