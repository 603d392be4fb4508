//! Visible bounds calculator
//!
//! Aggregates element extents into the culling volume written to the
//! geometry description. Model space spans ±8 around the origin; the volume
//! is shifted by 8 on every axis before measuring.

use crate::project::Element;

/// Shift from model space into the 0-based volume
const MODEL_OFFSET: f64 = 8.0;

/// Units per block
const BLOCK_SIZE: f64 = 16.0;

/// Culling volume in blocks
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VisibleBounds {
    pub width: f64,
    pub height: f64,
    /// Vertical center of the volume
    pub offset: f64,
}

/// Axis-aligned box accumulator
#[derive(Debug, Clone, Copy, PartialEq)]
struct Extent {
    min: [f64; 3],
    max: [f64; 3],
}

impl Extent {
    fn expand(&mut self, point: [f64; 3]) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(point[axis]);
            self.max[axis] = self.max[axis].max(point[axis]);
        }
    }
}

/// Compute the visible bounds of `elements`
///
/// Only elements with both corners count. The origin is always part of a
/// non-empty volume. `stored` is a previously saved `[width, height, offset]`
/// triple; the result never shrinks below it.
pub fn calculate(elements: &[Element], stored: Option<[f64; 3]>) -> VisibleBounds {
    let mut extent: Option<Extent> = None;
    for element in elements {
        let (Some(from), Some(to)) = (element.from, element.to) else {
            continue;
        };
        let extent = extent.get_or_insert(Extent {
            min: [0.0; 3],
            max: [0.0; 3],
        });
        extent.expand(from);
        extent.expand(to);
    }

    // An empty volume behaves like an infinite one: every term collapses to 0
    let (mut width, mut y_min, mut y_max) = match extent {
        Some(extent) => {
            let min = extent.min.map(|v| v + MODEL_OFFSET);
            let max = extent.max.map(|v| v + MODEL_OFFSET);
            let radius = max[0].max(max[2]).max(-min[0]).max(-min[2]);
            (
                (radius * 2.0 / BLOCK_SIZE).ceil(),
                (min[1] / BLOCK_SIZE).floor(),
                (max[1] / BLOCK_SIZE).ceil(),
            )
        }
        None => (0.0, 0.0, 0.0),
    };

    if let Some([stored_width, stored_height, stored_offset]) = stored {
        width = width.max(stored_width);
        y_min = y_min.min(stored_offset - stored_height / 2.0);
        y_max = y_max.max(stored_offset + stored_height / 2.0);
    }

    VisibleBounds {
        width,
        height: y_max - y_min,
        offset: (y_max + y_min) / 2.0,
    }
}
