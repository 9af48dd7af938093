//! Spiral placement
//!
//! Boxes are placed on concentric diamond-shaped rings around a center
//! point. Ring 0 is the center cell; ring `n` has `4n` cells. Cells that do
//! not fit inside the viewport are skipped, and once enough consecutive
//! cells have been skipped the walk gives up, leaving the remaining items
//! unplaced.

use serde::{Deserialize, Serialize};

use crate::error::MosaicError;
use crate::shared::geometry::{Point, Rect};

/// Viewport, box size and spiral center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutGeometry {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub box_width: u32,
    pub box_height: u32,
    pub center: Point,
}

impl LayoutGeometry {
    /// Largest viewport or box dimension, so every placed box fits screen
    /// coordinates
    pub const MAX_EXTENT: u32 = i32::MAX as u32;

    pub fn new(
        viewport_width: u32,
        viewport_height: u32,
        box_width: u32,
        box_height: u32,
        center: Point,
    ) -> Result<Self, MosaicError> {
        if box_width == 0 || box_height == 0 {
            return Err(MosaicError::InvalidGeometry(format!(
                "box size {box_width}x{box_height} must be positive"
            )));
        }
        if viewport_width == 0 || viewport_height == 0 {
            return Err(MosaicError::InvalidGeometry(format!(
                "viewport {viewport_width}x{viewport_height} must be positive"
            )));
        }
        let largest = viewport_width.max(viewport_height).max(box_width).max(box_height);
        if largest > Self::MAX_EXTENT {
            return Err(MosaicError::InvalidGeometry(format!(
                "dimension {largest} exceeds {}",
                Self::MAX_EXTENT
            )));
        }
        Ok(Self {
            viewport_width,
            viewport_height,
            box_width,
            box_height,
            center,
        })
    }

    /// Centered on the viewport
    pub fn centered(
        viewport_width: u32,
        viewport_height: u32,
        box_width: u32,
        box_height: u32,
    ) -> Result<Self, MosaicError> {
        let center = Point::new((viewport_width / 2) as i32, (viewport_height / 2) as i32);
        Self::new(viewport_width, viewport_height, box_width, box_height, center)
    }

    pub fn viewport(&self) -> Rect {
        Rect::new(0, 0, self.viewport_width, self.viewport_height)
    }

    /// Consecutive misses tolerated before the walk stops
    pub fn max_offset(&self) -> u64 {
        (2 * self.viewport_width as u64) / self.box_width as u64
            + (2 * self.viewport_height as u64) / self.box_height as u64
    }

    /// Pull the center in so that the center box lies fully on screen.
    ///
    /// Used when centering on the pointer, which may sit at a screen edge.
    pub fn clamp_center(&mut self) {
        fn clamp_axis(value: i32, extent: u32, size: u32) -> i32 {
            let half = (size / 2) as i32;
            let far = extent as i32 - half;
            if value < half {
                half + 1
            } else if value > far {
                far - 1
            } else {
                value
            }
        }
        self.center.x = clamp_axis(self.center.x, self.viewport_width, self.box_width);
        self.center.y = clamp_axis(self.center.y, self.viewport_height, self.box_height);
    }
}

/// One cell visited by [`SpiralWalk`]
///
/// Far rings of a large box leave screen coordinates, so the origin is kept
/// wide until the cell is known to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
    pub ring: u64,
    /// Last cell of its ring
    pub ends_ring: bool,
}

impl Cell {
    /// The cell as a screen rectangle, if it lies fully inside `viewport`
    pub fn within(&self, viewport: &Rect) -> Option<Rect> {
        let inside = self.x >= viewport.x as i64
            && self.y >= viewport.y as i64
            && self.x + self.width as i64 <= viewport.right()
            && self.y + self.height as i64 <= viewport.bottom();
        if !inside {
            return None;
        }
        let x = i32::try_from(self.x).ok()?;
        let y = i32::try_from(self.y).ok()?;
        Some(Rect::new(x, y, self.width, self.height))
    }
}

/// Endless iterator over spiral cells, inside the viewport or not.
pub struct SpiralWalk {
    box_width: i64,
    box_height: i64,
    start_x: i64,
    ring_start_y: i64,
    cursor: (i64, i64),
    side: u64,
    step: u64,
}

impl SpiralWalk {
    pub fn new(geometry: &LayoutGeometry) -> Self {
        let box_width = geometry.box_width as i64;
        let box_height = geometry.box_height as i64;
        let start_x = geometry.center.x as i64 - box_width / 2;
        let ring_start_y = geometry.center.y as i64 - box_height / 2;
        Self {
            box_width,
            box_height,
            start_x,
            ring_start_y,
            cursor: (start_x, ring_start_y),
            side: 0,
            step: 0,
        }
    }

    fn ring_len(&self) -> u64 {
        if self.side == 0 { 1 } else { 4 * self.side }
    }
}

impl Iterator for SpiralWalk {
    type Item = Cell;

    fn next(&mut self) -> Option<Cell> {
        let (x, y) = self.cursor;
        let cell = Cell {
            x,
            y,
            width: self.box_width as u32,
            height: self.box_height as u32,
            ring: self.side,
            ends_ring: self.step + 1 == self.ring_len(),
        };

        if self.side > 0 {
            let s = self.side;
            let phase = self.step % (4 * s);
            let dx = if phase < s || phase >= 3 * s {
                self.box_width
            } else {
                -self.box_width
            };
            let dy = if phase < 2 * s {
                self.box_height
            } else {
                -self.box_height
            };
            self.cursor = (x.saturating_add(dx), y.saturating_add(dy));
        }

        self.step += 1;
        if cell.ends_ring {
            self.side += 1;
            self.step = 0;
            self.ring_start_y = self.ring_start_y.saturating_sub(self.box_height);
            self.cursor = (self.start_x, self.ring_start_y);
        }

        Some(cell)
    }
}

/// Result of a layout pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    /// Positions for the first `rects.len()` items, in order
    pub rects: Vec<Rect>,
    /// Clamped focus, `None` when nothing was placed
    pub focus: Option<usize>,
}

impl Placement {
    pub fn placed(&self) -> usize {
        self.rects.len()
    }
}

/// Place up to `count` boxes and clamp `focus` to what fit.
pub fn place(count: usize, geometry: &LayoutGeometry, focus: usize) -> Placement {
    let mut rects = Vec::new();
    if count == 0 {
        return Placement { rects, focus: None };
    }

    let viewport = geometry.viewport();
    let max_offset = geometry.max_offset();
    let mut misses = 0u64;

    for cell in SpiralWalk::new(geometry) {
        if let Some(rect) = cell.within(&viewport) {
            rects.push(rect);
            misses = 0;
            if rects.len() == count {
                break;
            }
        } else {
            misses += 1;
        }

        if cell.ends_ring && misses >= max_offset {
            break;
        }
    }

    if rects.len() < count {
        tracing::debug!(placed = rects.len(), count, "viewport saturated");
    }

    let focus = rects.len().checked_sub(1).map(|last| focus.min(last));
    Placement { rects, focus }
}
