//! Page geometry shared between detectors, redactors and document bindings

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in page coordinates
///
/// `(x0, y0)` is the top-left corner and `(x1, y1)` the bottom-right corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0.0 || self.height() == 0.0
    }

    /// Whether the two rectangles share any interior area
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }
}

/// Bounding area of one occurrence of a literal value on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRegion {
    /// Zero-based page index
    pub page_index: usize,

    /// Location of the occurrence on the page
    pub rect: Rect,

    /// The literal that was searched for
    pub value: String,
}

/// Fill color applied over a redacted region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionFill(pub u8, pub u8, pub u8);

impl RedactionFill {
    pub const BLACK: RedactionFill = RedactionFill(0, 0, 0);
}

impl Default for RedactionFill {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<[u8; 3]> for RedactionFill {
    fn from(rgb: [u8; 3]) -> Self {
        RedactionFill(rgb[0], rgb[1], rgb[2])
    }
}
