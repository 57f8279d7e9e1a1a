//! Layout Preview Geometry
//!
//! Rectangles for drawing a small picture of a layout: its active outputs
//! placed where they physically sit, and its disabled outputs shown next to
//! them. Painting itself is left to the caller.

use super::{Layout, Rect, ReferenceGeometry};
use serde::Serialize;

/// Fallback size for a disabled output when nothing else is known
const FALLBACK_WIDTH: f64 = 1920.0;
const FALLBACK_HEIGHT: f64 = 1080.0;
/// Synthetic rectangles are this fraction of the average known rectangle
const FALLBACK_SHRINK: f64 = 0.6;
/// Gap between the known bounding box and a synthetic rectangle, relative to its width
const FALLBACK_GAP: f64 = 0.3;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Preview {
    pub active: Vec<Rect>,
    pub disabled: Vec<Rect>,
}

impl Preview {
    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.disabled.is_empty()
    }

    /// Union of all rectangles, `None` for an empty preview
    pub fn bounds(&self) -> Option<Rect> {
        Rect::union(self.active.iter().chain(self.disabled.iter()))
    }

    /// Scales and centres the preview into a `width` x `height` box keeping
    /// `pad` free on every side. `None` if there is nothing with an area to draw.
    pub fn fit(&self, width: f64, height: f64, pad: f64) -> Option<Preview> {
        let bounds = self.bounds()?;
        if bounds.w <= 0.0 || bounds.h <= 0.0 {
            return None;
        }

        let draw_w = width - pad * 2.0;
        let draw_h = height - pad * 2.0;
        let scale = (draw_w / bounds.w).min(draw_h / bounds.h);
        let off_x = pad + (draw_w - bounds.w * scale) / 2.0;
        let off_y = pad + (draw_h - bounds.h * scale) / 2.0;

        let place = |r: &Rect| Rect {
            x: off_x + (r.x - bounds.x) * scale,
            y: off_y + (r.y - bounds.y) * scale,
            w: r.w * scale,
            h: r.h * scale,
        };

        Some(Preview {
            active: self.active.iter().map(place).collect(),
            disabled: self.disabled.iter().map(place).collect(),
        })
    }
}

/// Rectangle for a disabled output with no reference: to the right of
/// everything placed so far, vertically centred on it
fn synthetic_rect(placed: &[&Rect]) -> Rect {
    let Some(bounds) = Rect::union(placed.iter().copied()) else {
        return Rect {
            x: 0.0,
            y: 0.0,
            w: FALLBACK_WIDTH * FALLBACK_SHRINK,
            h: FALLBACK_HEIGHT * FALLBACK_SHRINK,
        };
    };

    let count = placed.len() as f64;
    let w = placed.iter().map(|r| r.w).sum::<f64>() / count * FALLBACK_SHRINK;
    let h = placed.iter().map(|r| r.h).sum::<f64>() / count * FALLBACK_SHRINK;
    let center_y = bounds.y + bounds.h / 2.0;

    Rect {
        x: bounds.right() + w * FALLBACK_GAP,
        y: center_y - h / 2.0,
        w,
        h,
    }
}

/// Builds the preview of `layout` using `refs` for physical placement
pub fn preview(layout: &Layout, refs: &ReferenceGeometry) -> Preview {
    let active: Vec<Rect> = layout
        .logical_monitors
        .iter()
        .flat_map(|lm| {
            lm.monitors.iter().map(move |mon| {
                refs.get(&mon.connector).unwrap_or_else(|| {
                    let (w, h) = lm.logical_size(mon);
                    Rect {
                        x: f64::from(lm.x),
                        y: f64::from(lm.y),
                        w,
                        h,
                    }
                })
            })
        })
        .collect();

    let mut disabled: Vec<Rect> = Vec::with_capacity(layout.disabled_monitors.len());
    for mon in &layout.disabled_monitors {
        let rect = match refs.get(&mon.connector) {
            Some(rect) => rect,
            None => {
                let placed: Vec<&Rect> = active.iter().chain(disabled.iter()).collect();
                synthetic_rect(&placed)
            }
        };
        disabled.push(rect);
    }

    Preview { active, disabled }
}
