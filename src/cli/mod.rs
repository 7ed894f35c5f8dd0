//! CLI module for the Johnny Decimal Daemon.
//!
//! Provides command-line interface parsing and command dispatch. This is the
//! host side: it loads configuration, sets up logging, and turns daemon
//! events into log lines and notifications.

pub mod args;
pub mod commands;
pub mod report;

pub use args::{Cli, Commands, Overrides};

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::{DEFAULT_CONFIG_FILE, Settings};

/// Load settings from file and environment, then apply command line flags.
pub fn load_settings(config: Option<&Path>, overrides: &Overrides) -> anyhow::Result<Settings> {
    let mut settings = Settings::load(config).context("failed to load configuration")?;
    overrides.apply(&mut settings)?;
    Ok(settings)
}

/// Parse-independent entry point used by `main`.
pub async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let command = cli.command.unwrap_or(Commands::Run {
        overrides: Overrides::default(),
    });
    let config = cli.config.as_deref();

    match command {
        Commands::Init { force } => {
            let path = config
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            commands::init::run_init(&path, force)
        }
        Commands::Config { overrides } => {
            let settings = load_settings(config, &overrides)?;
            commands::init::run_config(&settings)
        }
        Commands::Scan { overrides } => {
            let settings = load_settings(config, &overrides)?;
            init_logging(&settings, false)?;
            commands::scan::run(settings).await
        }
        Commands::Run { overrides } => {
            let settings = load_settings(config, &overrides)?;
            init_logging(&settings, settings.daemonize)?;
            tracing::debug!("Config set as: {settings:?}");
            commands::run::run(settings).await
        }
    }
}

fn init_logging(settings: &Settings, to_file: bool) -> anyhow::Result<()> {
    let log_file = to_file.then_some(settings.log_file.as_path());
    crate::logging::init(&settings.log_level, log_file)
        .with_context(|| format!("cannot open log file {}", settings.log_file.display()))
}
