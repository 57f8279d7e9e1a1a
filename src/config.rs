//! Configuration Module
//!
//! Constants shared by the library and both binaries, plus the optional TOML
//! settings file read by the daemon.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Well-known name, object path and interface of the compositor display-config service
pub const DISPLAY_CONFIG_BUS_NAME: &str = "org.gnome.Mutter.DisplayConfig";
pub const DISPLAY_CONFIG_OBJECT_PATH: &str = "/org/gnome/Mutter/DisplayConfig";
pub const DISPLAY_CONFIG_INTERFACE: &str = "org.gnome.Mutter.DisplayConfig";

/// Number of layout slots in the store
pub const NUM_SLOTS: usize = 5;

/// Largest scale difference still treated as the same scale
pub const SCALE_TOLERANCE: f64 = 0.01;

/// Quiescence window before a name edit is committed
pub const RENAME_DEBOUNCE: Duration = Duration::from_millis(500);

/// Constants for default settings
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/dispmodesd.sock";
pub const DEFAULT_LOG_PATH: &str = "/tmp/dispmodesd.log";
pub const DEFAULT_STORE_FILE: &str = "layouts.toml";
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
pub const APP_DIR_NAME: &str = "dispmodes";

/// Directory holding the store and the settings file, following XDG_CONFIG_HOME
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME").filter(|d| !d.is_empty()) {
        return PathBuf::from(dir).join(APP_DIR_NAME);
    }
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".config").join(APP_DIR_NAME),
        None => PathBuf::from(".").join(APP_DIR_NAME),
    }
}

/// Daemon settings, read from `config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    pub socket_path: PathBuf,
    pub log_path: PathBuf,
    pub store_path: PathBuf,
    /// Apply with the compositor's confirmation dialog unless told otherwise
    pub require_confirmation: bool,
    pub rename_debounce_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            store_path: config_dir().join(DEFAULT_STORE_FILE),
            require_confirmation: true,
            rename_debounce_ms: RENAME_DEBOUNCE.as_millis() as u64,
        }
    }
}

impl Settings {
    /// Loads settings from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&text)?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Endpoint the daemon binds and the CLI connects to
    pub fn endpoint(&self) -> String {
        format!("ipc://{}", self.socket_path.display())
    }

    pub fn rename_debounce(&self) -> Duration {
        Duration::from_millis(self.rename_debounce_ms)
    }

    /// Whether an apply without an explicit method should skip the confirmation dialog
    pub fn default_persistent(&self) -> bool {
        !self.require_confirmation
    }
}
