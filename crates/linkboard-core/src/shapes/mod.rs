//! Shape definitions for the diagram.

mod color;

pub use color::{ColorParseError, SerializableColor};

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Width of every device shape.
pub const DEVICE_WIDTH: f64 = 120.0;
/// Height of every device shape.
pub const DEVICE_HEIGHT: f64 = 80.0;
/// Radius of every tool shape.
pub const TOOL_RADIUS: f64 = 50.0;

/// The two shape variants and their size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeKind {
    /// Rounded rectangle.
    Device { width: f64, height: f64 },
    /// Circle.
    Tool { radius: f64 },
}

impl ShapeKind {
    /// A device with the standard 120x80 size.
    pub const fn device() -> Self {
        ShapeKind::Device {
            width: DEVICE_WIDTH,
            height: DEVICE_HEIGHT,
        }
    }

    /// A tool with the standard radius of 50.
    pub const fn tool() -> Self {
        ShapeKind::Tool { radius: TOOL_RADIUS }
    }

    /// Half-width and half-height of the axis-aligned bounding box.
    ///
    /// Circles are treated as their circumscribed square. This is the only
    /// place geometry dispatches on the variant.
    pub fn half_extents(&self) -> Vec2 {
        match *self {
            ShapeKind::Device { width, height } => Vec2::new(width / 2.0, height / 2.0),
            ShapeKind::Tool { radius } => Vec2::new(radius, radius),
        }
    }

    pub fn is_device(&self) -> bool {
        matches!(self, ShapeKind::Device { .. })
    }

    pub fn is_tool(&self) -> bool {
        matches!(self, ShapeKind::Tool { .. })
    }
}

/// A shape placed on the canvas.
///
/// Everything but the position is fixed at creation; moving a shape replaces
/// its center wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub(crate) id: ShapeId,
    /// Center point in canvas coordinates.
    pub center: Point,
    /// Variant and size.
    pub kind: ShapeKind,
    /// Fill color.
    pub color: SerializableColor,
    /// Text drawn inside the shape.
    pub label: String,
}

impl Shape {
    /// Create a new shape with a fresh id.
    pub fn new(
        kind: ShapeKind,
        center: Point,
        color: SerializableColor,
        label: impl Into<String>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), kind, center, color, label)
    }

    /// Create a shape with a known id (for documents loaded by the host).
    pub fn with_id(
        id: ShapeId,
        kind: ShapeKind,
        center: Point,
        color: SerializableColor,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id,
            center,
            kind,
            color,
            label: label.into(),
        }
    }

    /// A standard device at `center` with the palette's device color.
    pub fn device(center: Point) -> Self {
        Self::new(
            ShapeKind::device(),
            center,
            SerializableColor::rgb(0x42, 0x85, 0xf4),
            "Device",
        )
    }

    /// A standard tool at `center` with the palette's tool color.
    pub fn tool(center: Point) -> Self {
        Self::new(
            ShapeKind::tool(),
            center,
            SerializableColor::rgb(0x34, 0xa8, 0x53),
            "Tool",
        )
    }

    /// Get the unique identifier.
    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// A copy of this shape centered at `center`, keeping its id.
    pub fn moved_to(&self, center: Point) -> Self {
        Self {
            center,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_half_extents() {
        let half = ShapeKind::device().half_extents();
        assert!((half.x - 60.0).abs() < f64::EPSILON);
        assert!((half.y - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tool_half_extents() {
        let half = ShapeKind::tool().half_extents();
        assert!((half.x - 50.0).abs() < f64::EPSILON);
        assert!((half.y - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_moved_to_keeps_id() {
        let shape = Shape::device(Point::new(10.0, 20.0));
        let moved = shape.moved_to(Point::new(30.0, 40.0));
        assert_eq!(moved.id(), shape.id());
        assert_eq!(moved.center, Point::new(30.0, 40.0));
        assert_eq!(moved.label, shape.label);
    }

    #[test]
    fn test_unique_ids() {
        let a = Shape::tool(Point::ZERO);
        let b = Shape::tool(Point::ZERO);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ShapeKind::tool()).unwrap();
        assert_eq!(json, r#"{"type":"tool","radius":50.0}"#);
    }
}
