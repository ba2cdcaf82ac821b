//! Connection ports: the four fixed anchor points of every shape.

use crate::shapes::{Shape, ShapeId};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Radius of the port dot drawn on hovered shapes.
pub const PORT_RADIUS: f64 = 4.0;

/// Maximum pointer distance for a port interaction to register.
pub const PORT_CAPTURE_RADIUS: f64 = 15.0;

/// Cardinal position of a port on its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortPosition {
    Top,
    Right,
    Bottom,
    Left,
}

impl PortPosition {
    /// All positions in port order.
    pub const ALL: [PortPosition; 4] = [
        PortPosition::Top,
        PortPosition::Right,
        PortPosition::Bottom,
        PortPosition::Left,
    ];

    /// Offset from the shape center given the shape's half-extents.
    fn offset(self, half: Vec2) -> Vec2 {
        match self {
            PortPosition::Top => Vec2::new(0.0, -half.y),
            PortPosition::Right => Vec2::new(half.x, 0.0),
            PortPosition::Bottom => Vec2::new(0.0, half.y),
            PortPosition::Left => Vec2::new(-half.x, 0.0),
        }
    }
}

/// A resolved port on a specific shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub shape_id: ShapeId,
    pub position: PortPosition,
    pub point: Point,
}

/// Get the four ports of a shape, in top, right, bottom, left order.
///
/// Ports sit on the midpoints of the bounding box, which for tools coincides
/// with the 0/90/180/270 degree points of the circle.
pub fn ports_of(shape: &Shape) -> [Port; 4] {
    PortPosition::ALL.map(|position| Port {
        shape_id: shape.id(),
        position,
        point: port_coordinates(shape, position),
    })
}

/// Coordinates of one port of a shape.
pub fn port_coordinates(shape: &Shape, position: PortPosition) -> Point {
    shape.center + position.offset(shape.kind.half_extents())
}

/// Find the port closest to `point` within `capture_radius`.
///
/// Only distances strictly below the radius count. On ties the port found
/// first in shape order wins.
pub fn find_nearest_port(point: Point, shapes: &[Shape], capture_radius: f64) -> Option<Port> {
    let mut nearest: Option<Port> = None;
    let mut best_dist = capture_radius;

    for shape in shapes {
        for port in ports_of(shape) {
            let dist = port.point.distance(point);
            if dist < best_dist {
                best_dist = dist;
                nearest = Some(port);
            }
        }
    }

    nearest
}
