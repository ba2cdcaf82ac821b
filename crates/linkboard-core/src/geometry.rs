//! Axis-aligned bounds, hit testing and canvas clamping.

use crate::shapes::{Shape, ShapeKind};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounds of a shape, derived from its center and kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl Bounds {
    /// Bounds of a `kind`-shaped box centered at `center`.
    pub fn of_kind(kind: &ShapeKind, center: Point) -> Self {
        let half = kind.half_extents();
        Self {
            left: center.x - half.x,
            right: center.x + half.x,
            top: center.y - half.y,
            bottom: center.y + half.y,
            center_x: center.x,
            center_y: center.y,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Point {
        Point::new(self.center_x, self.center_y)
    }
}

impl From<Bounds> for Rect {
    fn from(bounds: Bounds) -> Self {
        Rect::new(bounds.left, bounds.top, bounds.right, bounds.bottom)
    }
}

/// Compute the bounds of a shape.
pub fn bounds_of(shape: &Shape) -> Bounds {
    Bounds::of_kind(&shape.kind, shape.center)
}

/// Check if a point lies inside a shape (edges included).
pub fn contains_point(shape: &Shape, point: Point) -> bool {
    match shape.kind {
        ShapeKind::Device { .. } => {
            let b = bounds_of(shape);
            point.x >= b.left && point.x <= b.right && point.y >= b.top && point.y <= b.bottom
        }
        ShapeKind::Tool { radius } => point.distance(shape.center) <= radius,
    }
}

/// Find the topmost shape under a point.
///
/// Shapes are ordered back to front, so the scan runs in reverse and later
/// shapes win.
pub fn shape_at_point(point: Point, shapes: &[Shape]) -> Option<&Shape> {
    shapes.iter().rev().find(|s| contains_point(s, point))
}

/// Clamp a center so a `kind`-shaped box stays inside the canvas.
///
/// Each axis is clamped independently. When the canvas is smaller than the
/// shape the result is pinned to the half-extent.
pub fn constrain_to_canvas(kind: &ShapeKind, center: Point, canvas: Size) -> Point {
    let half = kind.half_extents();
    Point::new(
        half.x.max((canvas.width - half.x).min(center.x)),
        half.y.max((canvas.height - half.y).min(center.y)),
    )
}
