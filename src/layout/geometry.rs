//! Reference Geometry Resolver
//!
//! Saved layouts often cover different subsets of the connected outputs (a
//! docked three-screen layout next to a laptop-only one). The resolver picks
//! one physical rectangle per connector so previews stay consistent and
//! outputs a layout turns off can still be drawn where they physically are.

use super::Layout;
use serde::Serialize;
use tracing::trace;

/// Axis-aligned rectangle in logical coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Smallest rectangle containing every rectangle in `rects`
    pub fn union<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
        let mut iter = rects.into_iter();
        let first = *iter.next()?;
        let (min_x, min_y, max_x, max_y) = iter.fold(
            (first.x, first.y, first.right(), first.bottom()),
            |(min_x, min_y, max_x, max_y), r| {
                (min_x.min(r.x), min_y.min(r.y), max_x.max(r.right()), max_y.max(r.bottom()))
            },
        );
        Some(Rect {
            x: min_x,
            y: min_y,
            w: max_x - min_x,
            h: max_y - min_y,
        })
    }
}

/// One reference rectangle per connector seen in any stored layout
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReferenceGeometry {
    rects: Vec<(String, Rect)>,
}

impl ReferenceGeometry {
    /// Resolves reference rectangles from `layouts`.
    ///
    /// Layouts with more logical monitors are consulted first; among equals the
    /// given order is kept. The first rectangle recorded for a connector wins.
    pub fn resolve<'a>(layouts: impl IntoIterator<Item = &'a Layout>) -> Self {
        let mut by_size: Vec<&Layout> = layouts.into_iter().collect();
        by_size.sort_by(|a, b| b.logical_monitors.len().cmp(&a.logical_monitors.len()));

        let mut geometry = ReferenceGeometry::default();
        for layout in by_size {
            for lm in &layout.logical_monitors {
                for mon in &lm.monitors {
                    if geometry.get(&mon.connector).is_some() {
                        continue;
                    }
                    let (w, h) = lm.logical_size(mon);
                    let rect = Rect {
                        x: f64::from(lm.x),
                        y: f64::from(lm.y),
                        w,
                        h,
                    };
                    trace!("Reference for {} from '{}': {:?}", mon.connector, layout.name, rect);
                    geometry.rects.push((mon.connector.clone(), rect));
                }
            }
        }
        geometry
    }

    /// Reference rectangle for `connector`, or `None` when no stored layout
    /// ever placed it
    pub fn get(&self, connector: &str) -> Option<Rect> {
        self.rects
            .iter()
            .find(|(c, _)| c == connector)
            .map(|(_, rect)| *rect)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rect)> {
        self.rects.iter().map(|(c, r)| (c.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}
