//! Stored Layouts
//!
//! A [`Layout`] is the portable, persisted record of a desired display
//! configuration. It is a plain value with no tie to the snapshot it was
//! captured from, serialised as JSON text into one of the store's slots.
//!
//! Submodules:
//! - `codec`: capture from a snapshot, human-readable summary, apply request
//! - `matcher`: decides whether a layout is the one currently shown
//! - `geometry`: one reference rectangle per connector across many layouts
//! - `preview`: icon-sized rectangles for a layout, including disabled outputs

use crate::display::MonitorRef;
use crate::error::Result;
use serde::{Deserialize, Serialize};

pub mod codec;
pub mod geometry;
pub mod matcher;
pub mod preview;

pub use codec::{ApplyMethod, ApplyRequest, build_apply_request, summarize, to_layout};
pub use geometry::{Rect, ReferenceGeometry};
pub use matcher::is_active;

/// A persisted display configuration.
///
/// `logicalMonitors` is required when decoding; every other field falls back
/// to its default, which is how records written before `disabledMonitors`
/// existed are still accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    #[serde(default)]
    pub name: String,
    pub logical_monitors: Vec<LogicalMonitorStored>,
    #[serde(default)]
    pub disabled_monitors: Vec<MonitorRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogicalMonitorStored {
    pub x: i32,
    pub y: i32,
    pub scale: f64,
    pub transform: u32,
    pub primary: bool,
    pub monitors: Vec<StoredMonitor>,
}

impl Default for LogicalMonitorStored {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            scale: 1.0,
            transform: 0,
            primary: false,
            monitors: Vec::new(),
        }
    }
}

impl LogicalMonitorStored {
    /// Whether the transform rotates by 90 or 270 degrees
    pub fn is_rotated(&self) -> bool {
        self.transform % 2 == 1
    }

    /// Size of `monitor` in logical (scaled, rotated) coordinates
    pub fn logical_size(&self, monitor: &StoredMonitor) -> (f64, f64) {
        let scale = if self.scale > 0.0 { self.scale } else { 1.0 };
        let w = f64::from(monitor.width) / scale;
        let h = f64::from(monitor.height) / scale;
        if self.is_rotated() { (h, w) } else { (w, h) }
    }
}

/// A physical output inside a stored logical monitor, with the mode it should run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredMonitor {
    pub connector: String,
    pub vendor: String,
    pub product: String,
    pub serial: String,
    /// Opaque compositor mode id; empty if the output had no current mode
    pub mode: String,
    pub width: i32,
    pub height: i32,
}

impl Layout {
    /// Decodes a slot's JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Encodes the layout for storage in a slot
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// The name shown to users
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() { "Unnamed" } else { &self.name }
    }

    /// Connectors of every stored monitor, in encounter order
    pub fn connectors(&self) -> impl Iterator<Item = &str> {
        self.logical_monitors
            .iter()
            .flat_map(|lm| lm.monitors.iter().map(|m| m.connector.as_str()))
    }
}
