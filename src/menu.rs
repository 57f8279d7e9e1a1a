//! Menu model
//!
//! What a status-area menu shows: the currently shown layout (if it is one of
//! the saved ones) and the others to switch to, most used first.

use crate::display::StateSnapshot;
use crate::layout::preview::{Preview, preview};
use crate::layout::{ReferenceGeometry, is_active, summarize};
use crate::store::SlotEntry;
use serde::Serialize;
use tracing::debug;

pub const EMPTY_LABEL: &str = "No layouts saved";
pub const UNSAVED_LABEL: &str = "Unsaved layout";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuEntry {
    pub slot: usize,
    pub name: String,
    pub label: String,
    pub summary: String,
    pub usage: u64,
    pub preview: Preview,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Menu {
    Empty {
        label: String,
    },
    Layouts {
        header: String,
        active: Option<MenuEntry>,
        available: Vec<MenuEntry>,
        references: ReferenceGeometry,
    },
}

impl Menu {
    pub fn header(&self) -> &str {
        match self {
            Menu::Empty { label } => label,
            Menu::Layouts { header, .. } => header,
        }
    }
}

fn menu_entry(entry: &SlotEntry, refs: &ReferenceGeometry, label: String) -> MenuEntry {
    MenuEntry {
        slot: entry.slot,
        name: entry.layout.display_name().to_string(),
        label,
        summary: summarize(&entry.layout),
        usage: entry.usage,
        preview: preview(&entry.layout, refs),
    }
}

/// Builds the menu from the store's entries (slot order) and the current
/// state. `snapshot` is `None` when the state query failed; nothing is active then.
pub fn build_menu(entries: &[SlotEntry], snapshot: Option<&StateSnapshot>) -> Menu {
    if entries.is_empty() {
        return Menu::Empty {
            label: EMPTY_LABEL.to_string(),
        };
    }

    let refs = ReferenceGeometry::resolve(entries.iter().map(|e| &e.layout));

    let active = snapshot.and_then(|snapshot| entries.iter().find(|e| is_active(&e.layout, snapshot)));
    let header = match active {
        Some(entry) => format!("{} ✔", entry.layout.display_name()),
        None => UNSAVED_LABEL.to_string(),
    };
    debug!("Menu header '{}'", header);

    let mut others: Vec<&SlotEntry> = entries
        .iter()
        .filter(|e| active.is_none_or(|a| a.slot != e.slot))
        .collect();
    others.sort_by(|a, b| b.usage.cmp(&a.usage));

    let available = others
        .into_iter()
        .map(|e| menu_entry(e, &refs, format!("Switch to {}", e.layout.display_name())))
        .collect();

    Menu::Layouts {
        active: active.map(|e| menu_entry(e, &refs, header.clone())),
        header,
        available,
        references: refs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{LogicalMonitorObserved, Mode, MonitorInfo, MonitorMap, MonitorRef};
    use crate::layout::{Layout, LogicalMonitorStored, StoredMonitor};

    fn stored(connector: &str, mode: &str, x: i32) -> LogicalMonitorStored {
        LogicalMonitorStored {
            x,
            monitors: vec![StoredMonitor {
                connector: connector.to_string(),
                mode: mode.to_string(),
                width: 1920,
                height: 1080,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn entry(slot: usize, name: &str, usage: u64, monitors: Vec<LogicalMonitorStored>) -> SlotEntry {
        SlotEntry {
            slot,
            layout: Layout {
                name: name.to_string(),
                logical_monitors: monitors,
                disabled_monitors: vec![],
            },
            usage,
        }
    }

    /// A single 1920x1080 output on DP-1 at the origin
    fn snapshot() -> StateSnapshot {
        let monitor_ref = MonitorRef {
            connector: "DP-1".to_string(),
            ..Default::default()
        };
        StateSnapshot {
            serial: 1,
            monitors: MonitorMap::from_iter([MonitorInfo {
                connector: "DP-1".to_string(),
                vendor: String::new(),
                product: String::new(),
                serial: String::new(),
                current_mode: Some(Mode {
                    id: "1080p".to_string(),
                    width: 1920,
                    height: 1080,
                    refresh_rate: 60.0,
                }),
            }]),
            logical_monitors: vec![LogicalMonitorObserved {
                x: 0,
                y: 0,
                scale: 1.0,
                transform: 0,
                primary: true,
                monitors: vec![monitor_ref],
            }],
        }
    }

    #[test]
    fn test_empty_menu() {
        let menu = build_menu(&[], Some(&snapshot()));
        assert_eq!(menu, Menu::Empty { label: EMPTY_LABEL.to_string() });
        assert_eq!(menu.header(), "No layouts saved");
    }

    /// Test that the active entry is pulled out and the rest are ordered by usage
    #[test]
    fn test_active_and_ordering() {
        let entries = vec![
            entry(0, "Travel", 1, vec![stored("eDP-1", "a", 0)]),
            entry(1, "Desk", 0, vec![stored("DP-1", "1080p", 0)]),
            entry(2, "", 5, vec![stored("HDMI-1", "b", 0)]),
            entry(4, "Office", 1, vec![stored("DP-2", "c", 0)]),
        ];

        let Menu::Layouts { header, active, available, references } = build_menu(&entries, Some(&snapshot())) else {
            panic!("expected layouts");
        };
        assert_eq!(header, "Desk ✔");
        assert_eq!(active.unwrap().slot, 1);

        let labels: Vec<&str> = available.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Switch to Unnamed", "Switch to Travel", "Switch to Office"]);
        assert_eq!(available[1].summary, "eDP-1 1920x1080");
        assert_eq!(references.len(), 4);
    }

    #[test]
    fn test_first_active_slot_wins() {
        let entries = vec![
            entry(1, "Desk", 0, vec![stored("DP-1", "1080p", 0)]),
            entry(3, "Desk copy", 9, vec![stored("DP-1", "1080p", 0)]),
        ];

        let menu = build_menu(&entries, Some(&snapshot()));
        assert_eq!(menu.header(), "Desk ✔");
        let Menu::Layouts { available, .. } = menu else {
            panic!("expected layouts");
        };
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].slot, 3);
    }

    #[test]
    fn test_unknown_state_has_nothing_active() {
        let entries = vec![entry(0, "Desk", 0, vec![stored("DP-1", "1080p", 0)])];

        let Menu::Layouts { header, active, available, .. } = build_menu(&entries, None) else {
            panic!("expected layouts");
        };
        assert_eq!(header, UNSAVED_LABEL);
        assert!(active.is_none());
        assert_eq!(available.len(), 1);
    }

    #[test]
    fn test_menu_serializes_with_kind_tag() {
        let json = serde_json::to_value(build_menu(&[], None)).unwrap();
        assert_eq!(json["kind"], "empty");
        assert_eq!(json["label"], EMPTY_LABEL);
    }
}
