//! Activity Matcher
//!
//! Structural comparison of a stored [`Layout`] against a live
//! [`StateSnapshot`]. Scales are compared with a small tolerance because the
//! compositor reports them as floats; mode ids are opaque and compared exactly.

use super::{Layout, LogicalMonitorStored};
use crate::config::SCALE_TOLERANCE;
use crate::display::{LogicalMonitorObserved, StateSnapshot};

fn same_placement(stored: &LogicalMonitorStored, observed: &LogicalMonitorObserved) -> bool {
    stored.x == observed.x
        && stored.y == observed.y
        && (stored.scale - observed.scale).abs() < SCALE_TOLERANCE
        && stored.transform == observed.transform
}

fn modes_current(stored: &LogicalMonitorStored, snapshot: &StateSnapshot) -> bool {
    stored.monitors.iter().all(|mon| {
        snapshot
            .monitors
            .get(&mon.connector)
            .and_then(|info| info.current_mode.as_ref())
            .is_some_and(|mode| mode.id == mon.mode)
    })
}

/// Whether `layout` is what the compositor is showing right now.
///
/// Each stored logical monitor needs some observed logical monitor with the same
/// position, transform and scale, and every output it names must be running the
/// stored mode. Two stored logical monitors may match the same observed one.
pub fn is_active(layout: &Layout, snapshot: &StateSnapshot) -> bool {
    if layout.logical_monitors.len() != snapshot.logical_monitors.len() {
        return false;
    }

    layout.logical_monitors.iter().all(|stored| {
        snapshot
            .logical_monitors
            .iter()
            .any(|observed| same_placement(stored, observed))
            && modes_current(stored, snapshot)
    })
}
