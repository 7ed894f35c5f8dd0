//! Layered daemon configuration.
//!
//! Sources, lowest to highest precedence:
//! - built-in defaults
//! - TOML file (`.jd.toml` in the working directory, or `--config <file>`)
//! - environment variables prefixed with `JDD_`
//! - command line flags (applied by the binary)
//!
//! # Environment Variables
//!
//! - `JDD_ROOT=~/Documents` sets `root`
//! - `JDD_DRY_RUN=true` sets `dry_run`
//! - `JDD_DELAY=500ms` sets `delay`
//! - `JDD_EXCLUDE="Inbox/**,*.part"` sets `exclude` (comma-separated)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".jd.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "JDD_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Cannot resolve root {}: {source}", .root.display())]
    Root {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot expand '~': home directory is unknown")]
    NoHomeDir,

    #[error("Configuration file already exists at {}. Use --force to overwrite", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Cannot write configuration: {0}")]
    Write(#[from] std::io::Error),

    #[error("Cannot serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Directory to watch. `~` is expanded to the home directory.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns, relative to `root`, that are never filed.
    #[serde(default, deserialize_with = "deserialize_patterns")]
    pub exclude: Vec<String>,

    /// Report moves without performing them.
    #[serde(default)]
    pub dry_run: bool,

    /// Settle delay before a newly created file is classified.
    #[serde(default, with = "humantime_serde")]
    pub delay: Duration,

    /// Logging level: error, warn, info, debug, trace.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Write a PID file and log to a file instead of the terminal.
    #[serde(default)]
    pub daemonize: bool,

    /// Send a desktop notification for every move or failure.
    #[serde(default)]
    pub notifications: bool,

    /// PID file written when daemonized.
    #[serde(default = "default_pid_file")]
    pub pid_file: PathBuf,

    /// Log file used when daemonized.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_pid_file() -> PathBuf {
    PathBuf::from("jdd.pid")
}
fn default_log_file() -> PathBuf {
    PathBuf::from("jdd.log")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: Vec::new(),
            dry_run: false,
            delay: Duration::ZERO,
            log_level: default_log_level(),
            daemonize: false,
            notifications: false,
            pid_file: default_pid_file(),
            log_file: default_log_file(),
        }
    }
}

/// Accept either a list of patterns or a single comma-separated string.
fn deserialize_patterns<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Patterns {
        One(String),
        Many(Vec<String>),
    }

    let raw = match Patterns::deserialize(deserializer)? {
        Patterns::One(s) => vec![s],
        Patterns::Many(v) => v,
    };
    Ok(split_patterns(raw))
}

/// Split comma-separated entries and drop empty ones.
pub fn split_patterns<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .flat_map(|s| {
            s.as_ref()
                .split(',')
                .map(|p| p.trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|p| !p.is_empty())
        .collect()
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> Result<PathBuf, ConfigError> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(rest))
}

impl Settings {
    /// Load configuration from all sources.
    ///
    /// `config_path` defaults to [`DEFAULT_CONFIG_FILE`]; a missing file is
    /// not an error. A relative `root` from the file resolves against the
    /// file's directory.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut settings: Settings = Self::figment(&path).extract().map_err(Box::new)?;

        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty() && path.exists())
            .map(Path::to_path_buf);
        settings.resolve_root(base.as_deref())?;
        Ok(settings)
    }

    /// The provider stack behind [`Settings::load`].
    pub fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Expand `~` and make `root` absolute.
    ///
    /// Relative roots are joined onto `base` when given, otherwise onto the
    /// working directory.
    pub fn resolve_root(&mut self, base: Option<&Path>) -> Result<(), ConfigError> {
        let mut root = expand_tilde(&self.root)?;
        if root.is_relative() {
            if let Some(base) = base {
                root = base.join(root);
            }
        }
        self.root = std::path::absolute(&root).map_err(|source| ConfigError::Root {
            root: root.clone(),
            source,
        })?;
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Write a default configuration file.
    pub fn init_config_file(path: impl AsRef<Path>, force: bool) -> Result<PathBuf, ConfigError> {
        let path = path.as_ref();
        if !force && path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        Settings::default().save(path)?;
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.root, PathBuf::from("."));
        assert!(settings.exclude.is_empty());
        assert!(!settings.dry_run);
        assert_eq!(settings.delay, Duration::ZERO);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("jd.toml");

        let toml_content = r#"
root = "/srv/files"
exclude = ["Inbox/**", "*.part,*.tmp"]
dry_run = true
delay = "750ms"
log_level = "debug"
"#;
        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load(Some(&config_path)).unwrap();
        assert_eq!(settings.root, PathBuf::from("/srv/files"));
        assert_eq!(settings.exclude, vec!["Inbox/**", "*.part", "*.tmp"]);
        assert!(settings.dry_run);
        assert_eq!(settings.delay, Duration::from_millis(750));
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_relative_root_resolves_against_config_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("jd.toml");
        fs::write(&config_path, "root = \"docs\"\n").unwrap();

        let settings = Settings::load(Some(&config_path)).unwrap();
        assert_eq!(settings.root, temp_dir.path().join("docs"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load(Some(&temp_dir.path().join("absent.toml"))).unwrap();
        assert!(settings.root.is_absolute());
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_env_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("jd.toml");
        fs::write(&config_path, "notifications = false\n").unwrap();

        unsafe {
            std::env::set_var("JDD_NOTIFICATIONS", "true");
        }
        let settings = Settings::load(Some(&config_path));
        unsafe {
            std::env::remove_var("JDD_NOTIFICATIONS");
        }

        assert!(settings.unwrap().notifications);
    }

    #[test]
    fn test_expand_tilde() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_tilde(Path::new("~/Documents")).unwrap(), home.join("Documents"));
        assert_eq!(expand_tilde(Path::new("~")).unwrap(), home);
        assert_eq!(expand_tilde(Path::new("/abs")).unwrap(), PathBuf::from("/abs"));
        assert_eq!(expand_tilde(Path::new("~user/x")).unwrap(), PathBuf::from("~user/x"));
    }

    #[test]
    fn test_split_patterns() {
        assert_eq!(
            split_patterns(["a/*, b/*", "", "c"]),
            vec!["a/*", "b/*", "c"]
        );
    }

    #[test]
    fn test_save_and_init() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/.jd.toml");

        Settings::init_config_file(&path, false).unwrap();
        assert!(path.exists());
        assert!(matches!(
            Settings::init_config_file(&path, false),
            Err(ConfigError::AlreadyExists(_))
        ));

        let mut settings = Settings::default();
        settings.delay = Duration::from_secs(2);
        settings.exclude = vec!["Inbox/**".to_string()];
        settings.save(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("delay = \"2s\""));

        let loaded = Settings::load(Some(&path)).unwrap();
        assert_eq!(loaded.delay, Duration::from_secs(2));
        assert_eq!(loaded.exclude, vec!["Inbox/**"]);
    }
}
