//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/i3pomo/config.json`.
//! Every section is optional, so the file can grow new sections without
//! breaking older ones.  Command-line arguments override the file.
//!
//! # Example
//!
//! ```json
//! {
//!   "daemon": { "restricted_workspaces": [3, 4], "nagbar": true },
//!   "i3": { "socket_path": "/run/user/1000/sway-ipc.sock" },
//!   "nagbar": { "program": "swaynag" },
//!   "status": { "icon_text": "🍅", "show_seconds": false, "always": true }
//! }
//! ```

use crate::format::StatusOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
///
/// A minimal `{}` file is valid and all sections fall back to their
/// compiled-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Workspace restrictions.
    #[serde(default)]
    pub daemon: DaemonConfig,

    /// Window-manager connection.
    #[serde(default)]
    pub i3: I3Config,

    /// Warning surface.
    #[serde(default)]
    pub nagbar: NagbarConfig,

    /// `status` command output.
    #[serde(default)]
    pub status: StatusConfig,
}

/// Workspace restrictions applied during a focus interval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Workspace numbers that may not be focused during a running pomodoro.
    pub restricted_workspaces: Vec<i32>,
    /// Show a nagbar when a switch is denied.
    pub nagbar: bool,
}

/// Window-manager connection settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct I3Config {
    /// IPC socket.  `None` uses `$I3SOCK` / `$SWAYSOCK`.
    pub socket_path: Option<PathBuf>,
}

/// Warning surface settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NagbarConfig {
    /// Program to run.  `None` picks `swaynag` or `i3-nagbar`.
    pub program: Option<String>,
}

/// Defaults for the `status` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    pub icon_text: String,
    pub show_seconds: bool,
    pub always: bool,
}

impl Default for StatusConfig {
    fn default() -> Self {
        let defaults = StatusOptions::default();
        Self {
            icon_text: defaults.icon_text,
            show_seconds: defaults.show_seconds,
            always: defaults.always,
        }
    }
}

impl From<StatusConfig> for StatusOptions {
    fn from(c: StatusConfig) -> Self {
        Self {
            icon_text: c.icon_text,
            show_seconds: c.show_seconds,
            always: c.always,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/i3pomo`).
pub fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("i3pomo")
}

/// Default config file path.
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
