use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in image pixel units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Rectangle with its top-left corner at (x, y)
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge, exclusive
    pub fn end_x(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge, exclusive
    pub fn end_y(&self) -> f32 {
        self.y + self.height
    }

    /// Zero or negative extents mean "no area"
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Point containment, half-open on the far edges
    pub fn has_point(&self, px: f32, py: f32) -> bool {
        px >= self.x && py >= self.y && px < self.end_x() && py < self.end_y()
    }

    /// Expand outward by `amount` on every side
    pub fn grow(&self, amount: f32) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }

    /// Smallest rectangle containing this one and the given point
    pub fn expand(&self, px: f32, py: f32) -> Rect {
        let x0 = self.x.min(px);
        let y0 = self.y.min(py);
        let x1 = self.end_x().max(px);
        let y1 = self.end_y().max(py);
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Check if this rectangle overlaps another with non-zero area.
    /// Touching edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.end_x()
            && self.end_x() > other.x
            && self.y < other.end_y()
            && self.end_y() > other.y
    }

    /// Bounding union of both rectangles
    pub fn merge(&self, other: &Rect) -> Rect {
        self.expand(other.x, other.y)
            .expand(other.end_x(), other.end_y())
    }

    /// Check if this rectangle fully contains another
    pub fn contains(&self, other: &Rect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && self.end_x() >= other.end_x()
            && self.end_y() >= other.end_y()
    }
}
