//! Unified Error Handling System
//!
//! This module defines centralized error types for the whole dispmodes crate, so
//! that the compositor client, the layout store and the daemon report failures
//! the same way.

use thiserror::Error;

/// Enumeration of all error types in the application
#[derive(Error, Debug)]
pub enum DisplayModesError {
    /// The compositor answered with a reply of the wrong shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// The compositor rejected an apply request because the topology changed
    /// after the serial was fetched
    #[error("Stale serial {serial}: {message}")]
    StaleSerial { serial: u32, message: String },

    /// IPC-level failure talking to an external service
    #[error("Transport error {service}: {message}")]
    Transport { service: String, message: String },

    /// Stored text (a layout slot, a usage counter) could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid arguments error
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Resource not found error
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Configuration or store file could not be read or written as TOML
    #[error("Config error: {0}")]
    Config(String),

    /// System I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<std::num::ParseIntError> for DisplayModesError {
    fn from(error: std::num::ParseIntError) -> Self {
        DisplayModesError::Parse(error.to_string())
    }
}

impl From<serde_json::Error> for DisplayModesError {
    fn from(error: serde_json::Error) -> Self {
        DisplayModesError::Parse(error.to_string())
    }
}

impl From<toml::ser::Error> for DisplayModesError {
    fn from(error: toml::ser::Error) -> Self {
        DisplayModesError::Config(error.to_string())
    }
}

impl From<toml::de::Error> for DisplayModesError {
    fn from(error: toml::de::Error) -> Self {
        DisplayModesError::Config(error.to_string())
    }
}

impl From<zbus::Error> for DisplayModesError {
    fn from(error: zbus::Error) -> Self {
        match error {
            zbus::Error::Variant(e) => DisplayModesError::Decode(e.to_string()),
            zbus::Error::MethodError(name, detail, _) => {
                let message = detail.unwrap_or_default();
                if message.to_lowercase().contains("stale") {
                    // Serial is filled in by the caller, which knows what it sent.
                    DisplayModesError::StaleSerial { serial: 0, message }
                } else {
                    DisplayModesError::Transport {
                        service: crate::config::DISPLAY_CONFIG_BUS_NAME.to_string(),
                        message: format!("{}: {}", name.as_str(), message),
                    }
                }
            }
            other => DisplayModesError::Transport {
                service: crate::config::DISPLAY_CONFIG_BUS_NAME.to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// Standardized result type for the entire crate
pub type Result<T> = std::result::Result<T, DisplayModesError>;
