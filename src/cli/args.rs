//! CLI argument parsing using clap.
//!
//! Contains the Cli struct, Commands enum and the daemon flag group.

use clap::{
    Args, Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{Settings, split_patterns};

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Johnny Decimal Daemon
#[derive(Parser, Debug)]
#[command(
    name = "jdd",
    version = env!("CARGO_PKG_VERSION"),
    about = "Johnny Decimal Daemon",
    long_about = "Watch a directory and file everything named like `15.23 Report.pdf` into\n`10-19/15/15.23/`, creating the folders it needs.",
    styles = clap_cargo_style(),
    after_help = "Examples:\n  jdd init\n  jdd run --root ~/Documents --exclude 'Inbox/**'\n  jdd scan --dry-run\n  JDD_DELAY=500ms jdd run"
)]
pub struct Cli {
    /// Path to a custom .jd.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan once, then keep filing new files until interrupted (default)
    Run {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Scan the tree once and exit
    Scan {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Display the effective configuration
    Config {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Write a default .jd.toml
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Flags that override the file and environment configuration.
#[derive(Args, Debug, Default, Clone)]
pub struct Overrides {
    /// Root directory to watch
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Glob patterns to exclude (repeat or comma-separated)
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Report moves without performing them
    #[arg(long)]
    pub dry_run: bool,

    /// Settle delay before filing a new file (e.g. 500ms, 2s)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub delay: Option<Duration>,

    /// Logging level: error, warn, info, debug, trace
    #[arg(long)]
    pub log_level: Option<String>,

    /// Write a PID file and log to a file
    #[arg(long)]
    pub daemonize: bool,

    /// Send desktop notifications
    #[arg(long)]
    pub notifications: bool,
}

impl Overrides {
    /// Apply flags on top of loaded settings. Boolean flags only switch on.
    ///
    /// A `--root` given on the command line is made absolute against the
    /// working directory.
    pub fn apply(&self, settings: &mut Settings) -> Result<(), crate::config::ConfigError> {
        if let Some(root) = &self.root {
            settings.root = root.clone();
            settings.resolve_root(None)?;
        }
        if !self.exclude.is_empty() {
            settings.exclude = split_patterns(&self.exclude);
        }
        if self.dry_run {
            settings.dry_run = true;
        }
        if let Some(delay) = self.delay {
            settings.delay = delay;
        }
        if let Some(level) = &self.log_level {
            settings.log_level = level.to_lowercase();
        }
        if self.daemonize {
            settings.daemonize = true;
        }
        if self.notifications {
            settings.notifications = true;
        }
        Ok(())
    }
}
