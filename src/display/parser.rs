//! StateSnapshot Parser
//!
//! Normalises the decoded reply of the compositor's "get current state" query
//! into a [`StateSnapshot`]. The raw types here are the transport-neutral shape
//! of that reply; the D-Bus client fills them in with fixed arity, so a reply of
//! the wrong shape never reaches this module.

use super::{LogicalMonitorObserved, Mode, MonitorInfo, MonitorMap, MonitorRef, StateSnapshot};
use crate::error::{DisplayModesError, Result};
use tracing::debug;

/// `(connector, vendor, product, serial)`
#[derive(Debug, Clone, PartialEq)]
pub struct RawMonitorSpec {
    pub connector: String,
    pub vendor: String,
    pub product: String,
    pub serial: String,
}

impl From<(String, String, String, String)> for RawMonitorSpec {
    fn from((connector, vendor, product, serial): (String, String, String, String)) -> Self {
        Self { connector, vendor, product, serial }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawMode {
    pub id: String,
    pub width: i32,
    pub height: i32,
    pub refresh_rate: f64,
    /// Set when the mode's property map carries `is-current = true`
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawMonitor {
    pub spec: RawMonitorSpec,
    pub modes: Vec<RawMode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawLogicalMonitor {
    pub x: i32,
    pub y: i32,
    pub scale: f64,
    pub transform: u32,
    pub primary: bool,
    pub monitors: Vec<RawMonitorSpec>,
}

/// `(serial, monitorEntries, logicalMonitorEntries)`
#[derive(Debug, Clone, PartialEq)]
pub struct RawState {
    pub serial: u32,
    pub monitors: Vec<RawMonitor>,
    pub logical_monitors: Vec<RawLogicalMonitor>,
}

/// Highest valid transform code (flipped + 270 degrees)
const MAX_TRANSFORM: u32 = 7;

/// Parses a raw state reply into a snapshot, preserving the order of both collections.
///
/// A monitor with no mode marked current gets `current_mode: None`. Logical
/// monitors that reference an unknown connector, or that carry an out-of-range
/// scale or transform, are a [`DisplayModesError::Decode`].
pub fn parse(raw: RawState) -> Result<StateSnapshot> {
    let monitors: MonitorMap = raw
        .monitors
        .into_iter()
        .map(|monitor| {
            let current_mode = monitor
                .modes
                .into_iter()
                .find(|mode| mode.is_current)
                .map(|mode| Mode {
                    id: mode.id,
                    width: mode.width,
                    height: mode.height,
                    refresh_rate: mode.refresh_rate,
                });
            if current_mode.is_none() {
                debug!("Connector {} has no current mode", monitor.spec.connector);
            }
            MonitorInfo {
                connector: monitor.spec.connector,
                vendor: monitor.spec.vendor,
                product: monitor.spec.product,
                serial: monitor.spec.serial,
                current_mode,
            }
        })
        .collect();

    let mut logical_monitors = Vec::with_capacity(raw.logical_monitors.len());
    for lm in raw.logical_monitors {
        if !(lm.scale.is_finite() && lm.scale > 0.0) {
            return Err(DisplayModesError::Decode(format!(
                "logical monitor at {},{} has invalid scale {}",
                lm.x, lm.y, lm.scale
            )));
        }
        if lm.transform > MAX_TRANSFORM {
            return Err(DisplayModesError::Decode(format!(
                "logical monitor at {},{} has invalid transform {}",
                lm.x, lm.y, lm.transform
            )));
        }

        let mut refs = Vec::with_capacity(lm.monitors.len());
        for spec in lm.monitors {
            if !monitors.contains(&spec.connector) {
                return Err(DisplayModesError::Decode(format!(
                    "logical monitor references unknown connector {}",
                    spec.connector
                )));
            }
            refs.push(MonitorRef {
                connector: spec.connector,
                vendor: spec.vendor,
                product: spec.product,
                serial: spec.serial,
            });
        }

        logical_monitors.push(LogicalMonitorObserved {
            x: lm.x,
            y: lm.y,
            scale: lm.scale,
            transform: lm.transform,
            primary: lm.primary,
            monitors: refs,
        });
    }

    debug!(
        "Parsed state serial {}: {} monitors, {} logical monitors",
        raw.serial,
        monitors.len(),
        logical_monitors.len()
    );

    Ok(StateSnapshot {
        serial: raw.serial,
        monitors,
        logical_monitors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(connector: &str) -> RawMonitorSpec {
        RawMonitorSpec {
            connector: connector.to_string(),
            vendor: "GSM".to_string(),
            product: "LG ULTRAGEAR".to_string(),
            serial: format!("{}-serial", connector),
        }
    }

    fn mode(id: &str, width: i32, height: i32, is_current: bool) -> RawMode {
        RawMode {
            id: id.to_string(),
            width,
            height,
            refresh_rate: 59.951,
            is_current,
        }
    }

    fn logical(x: i32, connectors: &[&str]) -> RawLogicalMonitor {
        RawLogicalMonitor {
            x,
            y: 0,
            scale: 1.0,
            transform: 0,
            primary: x == 0,
            monitors: connectors.iter().map(|c| spec(c)).collect(),
        }
    }

    #[test]
    fn test_parse_picks_first_current_mode() {
        let raw = RawState {
            serial: 7,
            monitors: vec![RawMonitor {
                spec: spec("DP-1"),
                modes: vec![
                    mode("3840x2160@60", 3840, 2160, false),
                    mode("2560x1440@144", 2560, 1440, true),
                    mode("2560x1440@60", 2560, 1440, true),
                ],
            }],
            logical_monitors: vec![logical(0, &["DP-1"])],
        };

        let snapshot = parse(raw).unwrap();
        assert_eq!(snapshot.serial, 7);
        let current = snapshot.monitors.get("DP-1").unwrap().current_mode.as_ref().unwrap();
        assert_eq!(current.id, "2560x1440@144");
        assert_eq!((current.width, current.height), (2560, 1440));
    }

    #[test]
    fn test_parse_without_current_mode_is_not_an_error() {
        let raw = RawState {
            serial: 1,
            monitors: vec![RawMonitor {
                spec: spec("HDMI-1"),
                modes: vec![mode("1920x1080@60", 1920, 1080, false)],
            }],
            logical_monitors: vec![],
        };

        let snapshot = parse(raw).unwrap();
        assert!(snapshot.monitors.get("HDMI-1").unwrap().current_mode.is_none());
        assert!(snapshot.logical_monitors.is_empty());
    }

    #[test]
    fn test_parse_preserves_order_and_identity() {
        let raw = RawState {
            serial: 3,
            monitors: vec![
                RawMonitor { spec: spec("eDP-1"), modes: vec![mode("a", 1920, 1200, true)] },
                RawMonitor { spec: spec("DP-2"), modes: vec![mode("b", 2560, 1440, true)] },
            ],
            logical_monitors: vec![logical(1920, &["DP-2"]), logical(0, &["eDP-1"])],
        };

        let snapshot = parse(raw).unwrap();
        let connectors: Vec<&str> = snapshot.monitors.iter().map(|m| m.connector.as_str()).collect();
        assert_eq!(connectors, vec!["eDP-1", "DP-2"]);
        assert_eq!(snapshot.logical_monitors[0].x, 1920);
        assert_eq!(snapshot.logical_monitors[0].monitors[0].serial, "DP-2-serial");
        assert_eq!(snapshot.logical_monitors[1].monitors[0].product, "LG ULTRAGEAR");
    }

    #[test]
    fn test_parse_rejects_unknown_connector() {
        let raw = RawState {
            serial: 1,
            monitors: vec![],
            logical_monitors: vec![logical(0, &["DP-9"])],
        };
        assert!(matches!(parse(raw), Err(DisplayModesError::Decode(_))));
    }

    #[test]
    fn test_parse_rejects_bad_transform_and_scale() {
        let monitors = vec![RawMonitor { spec: spec("DP-1"), modes: vec![] }];

        let mut bad_transform = logical(0, &["DP-1"]);
        bad_transform.transform = 8;
        let raw = RawState { serial: 1, monitors: monitors.clone(), logical_monitors: vec![bad_transform] };
        assert!(matches!(parse(raw), Err(DisplayModesError::Decode(_))));

        let mut bad_scale = logical(0, &["DP-1"]);
        bad_scale.scale = 0.0;
        let raw = RawState { serial: 1, monitors, logical_monitors: vec![bad_scale] };
        assert!(matches!(parse(raw), Err(DisplayModesError::Decode(_))));
    }
}
