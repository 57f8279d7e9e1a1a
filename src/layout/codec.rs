//! Layout Codec
//!
//! Converts an observed [`StateSnapshot`] into a storable [`Layout`] and renders
//! a layout back out, either as a one-line summary or as the wire-level
//! "apply monitors config" request.

use super::{Layout, LogicalMonitorStored, StoredMonitor};
use crate::display::StateSnapshot;

/// How the compositor should apply a configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApplyMethod {
    /// Temporary change, reverted unless the user confirms in time
    Temporary,
    /// Unconditional change
    #[default]
    Persistent,
}

impl ApplyMethod {
    pub fn from_persistent(persistent: bool) -> Self {
        if persistent { ApplyMethod::Persistent } else { ApplyMethod::Temporary }
    }

    /// Method code on the wire
    pub fn code(self) -> u32 {
        match self {
            ApplyMethod::Temporary => 1,
            ApplyMethod::Persistent => 2,
        }
    }
}

/// A physical output to drive in a given mode
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyMonitor {
    pub connector: String,
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplyLogicalMonitor {
    pub x: i32,
    pub y: i32,
    pub scale: f64,
    pub transform: u32,
    pub primary: bool,
    pub monitors: Vec<ApplyMonitor>,
}

/// Everything the compositor needs for one apply call. The options map sent
/// alongside is always empty, as are the per-monitor property maps.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyRequest {
    pub serial: u32,
    pub method: ApplyMethod,
    pub logical_monitors: Vec<ApplyLogicalMonitor>,
}

/// Captures `snapshot` as a layout called `name`.
///
/// Outputs that sit in a logical monitor but report no current mode are kept
/// with an empty mode id and a 0x0 size. Outputs that no logical monitor
/// references become `disabled_monitors`, in the snapshot's monitor order.
pub fn to_layout(snapshot: &StateSnapshot, name: &str) -> Layout {
    let logical_monitors = snapshot
        .logical_monitors
        .iter()
        .map(|lm| LogicalMonitorStored {
            x: lm.x,
            y: lm.y,
            scale: lm.scale,
            transform: lm.transform,
            primary: lm.primary,
            monitors: lm
                .monitors
                .iter()
                .map(|mon| {
                    let mode = snapshot
                        .monitors
                        .get(&mon.connector)
                        .and_then(|info| info.current_mode.as_ref());
                    StoredMonitor {
                        connector: mon.connector.clone(),
                        vendor: mon.vendor.clone(),
                        product: mon.product.clone(),
                        serial: mon.serial.clone(),
                        mode: mode.map(|m| m.id.clone()).unwrap_or_default(),
                        width: mode.map_or(0, |m| m.width),
                        height: mode.map_or(0, |m| m.height),
                    }
                })
                .collect(),
        })
        .collect();

    let active = snapshot.active_connectors();
    let disabled_monitors = snapshot
        .monitors
        .iter()
        .filter(|info| !active.contains(&info.connector.as_str()))
        .map(|info| info.monitor_ref())
        .collect();

    Layout {
        name: name.to_string(),
        logical_monitors,
        disabled_monitors,
    }
}

/// One-line description such as `"DP-1 2560x1440 + DP-2 1920x1080 + (off: HDMI-1)"`
pub fn summarize(layout: &Layout) -> String {
    let mut parts: Vec<String> = layout
        .logical_monitors
        .iter()
        .flat_map(|lm| lm.monitors.iter())
        .map(|mon| format!("{} {}x{}", mon.connector, mon.width, mon.height))
        .collect();

    if !layout.disabled_monitors.is_empty() {
        let off = layout
            .disabled_monitors
            .iter()
            .map(|m| m.connector.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        parts.push(format!("(off: {})", off));
    }

    parts.join(" + ")
}

/// Builds the apply request for `layout` against the freshly fetched `serial`.
///
/// Disabled monitors are never sent: the compositor turns off whatever the
/// request leaves out.
pub fn build_apply_request(layout: &Layout, serial: u32, persistent: bool) -> ApplyRequest {
    let logical_monitors = layout
        .logical_monitors
        .iter()
        .map(|lm| ApplyLogicalMonitor {
            x: lm.x,
            y: lm.y,
            scale: lm.scale,
            transform: lm.transform,
            primary: lm.primary,
            monitors: lm
                .monitors
                .iter()
                .map(|mon| ApplyMonitor {
                    connector: mon.connector.clone(),
                    mode: mon.mode.clone(),
                })
                .collect(),
        })
        .collect();

    ApplyRequest {
        serial,
        method: ApplyMethod::from_persistent(persistent),
        logical_monitors,
    }
}
