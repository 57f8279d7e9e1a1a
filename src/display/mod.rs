//! Observed Display State
//!
//! In-memory model of one compositor display-state query: the physical outputs
//! keyed by connector and the ordered list of logical monitors. A
//! [`StateSnapshot`] is only valid for one query/decision cycle; its serial must
//! be fetched again right before anything is applied.

use serde::{Deserialize, Serialize};

pub mod dbus;
pub mod parser;

/// A display mode offered by a physical output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mode {
    pub id: String,
    pub width: i32,
    pub height: i32,
    pub refresh_rate: f64,
}

/// Identity of a physical output as the compositor reports it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorRef {
    pub connector: String,
    pub vendor: String,
    pub product: String,
    pub serial: String,
}

/// Current state of one physical output
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorInfo {
    pub connector: String,
    pub vendor: String,
    pub product: String,
    pub serial: String,
    /// `None` when the output is detached or has no active mode
    pub current_mode: Option<Mode>,
}

impl MonitorInfo {
    pub fn monitor_ref(&self) -> MonitorRef {
        MonitorRef {
            connector: self.connector.clone(),
            vendor: self.vendor.clone(),
            product: self.product.clone(),
            serial: self.serial.clone(),
        }
    }
}

/// Physical outputs keyed by connector.
///
/// Lookups go by connector; iteration follows the order the compositor listed
/// the outputs in. Inserting a connector twice replaces the earlier entry in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorMap {
    entries: Vec<MonitorInfo>,
}

impl MonitorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, info: MonitorInfo) {
        match self.entries.iter_mut().find(|m| m.connector == info.connector) {
            Some(existing) => *existing = info,
            None => self.entries.push(info),
        }
    }

    pub fn get(&self, connector: &str) -> Option<&MonitorInfo> {
        self.entries.iter().find(|m| m.connector == connector)
    }

    pub fn contains(&self, connector: &str) -> bool {
        self.get(connector).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MonitorInfo> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<MonitorInfo> for MonitorMap {
    fn from_iter<I: IntoIterator<Item = MonitorInfo>>(iter: I) -> Self {
        let mut map = MonitorMap::new();
        for info in iter {
            map.insert(info);
        }
        map
    }
}

/// A logical monitor as currently laid out by the compositor
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalMonitorObserved {
    pub x: i32,
    pub y: i32,
    pub scale: f64,
    /// 0..=7; odd values are rotated by 90 or 270 degrees
    pub transform: u32,
    pub primary: bool,
    pub monitors: Vec<MonitorRef>,
}

/// One complete observation of the compositor display state
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    /// Generation token, invalidated by any topology change
    pub serial: u32,
    pub monitors: MonitorMap,
    /// Order-sensitive: kept as the compositor reported it
    pub logical_monitors: Vec<LogicalMonitorObserved>,
}

impl StateSnapshot {
    /// Connectors referenced by any logical monitor, in encounter order
    pub fn active_connectors(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for lm in &self.logical_monitors {
            for mon in &lm.monitors {
                if !seen.contains(&mon.connector.as_str()) {
                    seen.push(&mon.connector);
                }
            }
        }
        seen
    }
}
