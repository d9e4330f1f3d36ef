//! Configuration loading and per-user paths.
//!
//! Precedence, lowest first:
//! 1. Built-in defaults ([`MonitorConfig::default`])
//! 2. JSON config file: `--config`, else `<config dir>/queue-clicker/config.json`
//!    when it exists. Missing keys keep their defaults.
//! 3. Command-line flags
//!
//! The merged result is validated before it is returned.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use queue_clicker_core::config::MonitorConfig;
use thiserror::Error;
use tracing::debug;

use crate::args::WatchArgs;

const APP_DIR: &str = "queue-clicker";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Invalid(#[from] queue_clicker_core::error::Error),
}

impl SettingsError {
    /// The validation error behind `Invalid`.
    pub fn core(&self) -> Option<&queue_clicker_core::error::Error> {
        match self {
            Self::Invalid(e) => Some(e),
            _ => None,
        }
    }
}

/// `<config dir>/queue-clicker/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
}

/// `<data dir>/queue-clicker/queue-clicker.log`.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(APP_DIR).join("queue-clicker.log"))
}

/// `<cache dir>/queue-clicker/debug`, falling back to the system temp dir.
pub fn default_debug_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
        .join("debug")
}

/// Defaults overlaid with the config file, if any. Not yet validated.
pub fn load(explicit: Option<&Path>) -> Result<MonitorConfig, SettingsError> {
    if let Some(path) = explicit {
        return read_file(path);
    }
    match default_config_path() {
        Some(path) if path.is_file() => read_file(&path),
        _ => Ok(MonitorConfig::default()),
    }
}

/// Parse one JSON config file.
pub fn read_file(path: &Path) -> Result<MonitorConfig, SettingsError> {
    let text = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Overlay `watch` flags onto `config`.
pub fn apply_watch_args(config: &mut MonitorConfig, args: &WatchArgs) {
    if let Some(interval) = args.interval {
        config.check_interval = interval;
    }
    if let Some(confidence) = args.confidence {
        config.confidence = confidence;
    }
    if !args.keywords.is_empty() {
        config.keywords = args.keywords.clone();
    }
    if args.no_ocr {
        config.use_ocr = false;
    }
    if args.debug {
        config.debug = true;
    }
}

/// Load, overlay `watch` flags, and validate.
pub fn resolve_watch(
    explicit: Option<&Path>,
    args: &WatchArgs,
) -> Result<MonitorConfig, SettingsError> {
    let mut config = load(explicit)?;
    apply_watch_args(&mut config, args);
    config.validate()?;
    Ok(config)
}
