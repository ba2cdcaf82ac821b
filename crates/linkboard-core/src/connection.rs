//! Directed connections between shape ports and the tool that draws them.

use crate::ports::{Port, PortPosition, find_nearest_port, port_coordinates};
use crate::shapes::{SerializableColor, Shape, ShapeId};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_6;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for connections.
pub type ConnectionId = Uuid;

/// Color of connections drawn with the connection tool.
pub const DEFAULT_CONNECTION_COLOR: SerializableColor = SerializableColor::black();

/// Length of the two arrow-head strokes.
pub const ARROW_HEAD_LENGTH: f64 = 10.0;

/// Connection errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConnectionError {
    #[error("Connection would start and end on shape {0}")]
    SelfLoop(ShapeId),
}

/// A straight directed link from a port of one shape to a port of another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub(crate) id: ConnectionId,
    pub from_shape_id: ShapeId,
    pub from_port: PortPosition,
    pub to_shape_id: ShapeId,
    pub to_port: PortPosition,
    pub color: SerializableColor,
}

impl Connection {
    /// Create a connection between two ports with a fresh id.
    ///
    /// Both ports on the same shape is rejected.
    pub fn new(from: &Port, to: &Port, color: SerializableColor) -> Result<Self, ConnectionError> {
        if from.shape_id == to.shape_id {
            return Err(ConnectionError::SelfLoop(from.shape_id));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            from_shape_id: from.shape_id,
            from_port: from.position,
            to_shape_id: to.shape_id,
            to_port: to.position,
            color,
        })
    }

    /// Get the unique identifier.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Check if either end is attached to `shape_id`.
    pub fn touches(&self, shape_id: ShapeId) -> bool {
        self.from_shape_id == shape_id || self.to_shape_id == shape_id
    }
}

/// Resolve the start and end coordinates of a connection.
///
/// Returns `None` when either shape is missing from `shapes`.
pub fn connection_endpoints(connection: &Connection, shapes: &[Shape]) -> Option<(Point, Point)> {
    let from = shapes.iter().find(|s| s.id() == connection.from_shape_id)?;
    let to = shapes.iter().find(|s| s.id() == connection.to_shape_id)?;
    Some((
        port_coordinates(from, connection.from_port),
        port_coordinates(to, connection.to_port),
    ))
}

/// Arrow-head triangle for a segment ending at `to`: the tip followed by the
/// two barb ends at +-30 degrees from the shaft.
pub fn arrow_head(from: Point, to: Point, length: f64) -> [Point; 3] {
    let angle = (to - from).atan2();
    let barb = |a: f64| to - Vec2::from_angle(a) * length;
    [to, barb(angle - FRAC_PI_6), barb(angle + FRAC_PI_6)]
}

/// State of the connection tool.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ConnectionToolState {
    /// Waiting for a press on a port.
    #[default]
    Idle,
    /// A start port is anchored and the preview line follows the pointer.
    AnchorSelected {
        start_port: Port,
        preview_end: Point,
    },
}

impl ConnectionToolState {
    /// Press: anchor on the nearest port, or go idle when none is in range.
    pub fn pointer_down(self, point: Point, shapes: &[Shape], capture_radius: f64) -> Self {
        match find_nearest_port(point, shapes, capture_radius) {
            Some(port) => ConnectionToolState::AnchorSelected {
                start_port: port,
                preview_end: port.point,
            },
            None => ConnectionToolState::Idle,
        }
    }

    /// Move: the preview end tracks the raw pointer.
    pub fn pointer_move(self, point: Point) -> Self {
        match self {
            ConnectionToolState::AnchorSelected { start_port, .. } => {
                ConnectionToolState::AnchorSelected {
                    start_port,
                    preview_end: point,
                }
            }
            ConnectionToolState::Idle => ConnectionToolState::Idle,
        }
    }

    /// Get the anchored port, if any.
    pub fn start_port(&self) -> Option<&Port> {
        match self {
            ConnectionToolState::AnchorSelected { start_port, .. } => Some(start_port),
            ConnectionToolState::Idle => None,
        }
    }

    /// Get the live end of the preview line, if any.
    pub fn preview_end(&self) -> Option<Point> {
        match self {
            ConnectionToolState::AnchorSelected { preview_end, .. } => Some(*preview_end),
            ConnectionToolState::Idle => None,
        }
    }

    /// Check if a connection is being drawn.
    pub fn is_dragging(&self) -> bool {
        matches!(self, ConnectionToolState::AnchorSelected { .. })
    }
}

/// Drives [`ConnectionToolState`] from pointer events.
#[derive(Debug, Clone, Default)]
pub struct ConnectionMachine {
    state: ConnectionToolState,
}

impl ConnectionMachine {
    /// Create an idle machine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> &ConnectionToolState {
        &self.state
    }

    /// Handle a press. Returns true if a port was anchored.
    pub fn on_pointer_down(&mut self, point: Point, shapes: &[Shape], capture_radius: f64) -> bool {
        self.state = self.state.pointer_down(point, shapes, capture_radius);
        if let Some(port) = self.state.start_port() {
            log::debug!("Anchored connection at {:?} port of {}", port.position, port.shape_id);
        }
        self.state.is_dragging()
    }

    /// Handle a move.
    pub fn on_pointer_move(&mut self, point: Point) {
        self.state = self.state.pointer_move(point);
    }

    /// Handle a release, returning the connection to commit if one was made.
    ///
    /// The machine is always idle afterwards.
    pub fn on_pointer_up(
        &mut self,
        point: Point,
        shapes: &[Shape],
        capture_radius: f64,
        color: SerializableColor,
    ) -> Option<Connection> {
        let state = std::mem::take(&mut self.state);
        let start = *state.start_port()?;

        let Some(end) = find_nearest_port(point, shapes, capture_radius) else {
            log::debug!("Connection released away from any port");
            return None;
        };

        match Connection::new(&start, &end, color) {
            Ok(connection) => {
                log::debug!(
                    "Connected {} ({:?}) -> {} ({:?})",
                    connection.from_shape_id,
                    connection.from_port,
                    connection.to_shape_id,
                    connection.to_port
                );
                Some(connection)
            }
            Err(e) => {
                log::debug!("Connection rejected: {}", e);
                None
            }
        }
    }

    /// Drop any anchored port.
    pub fn reset(&mut self) {
        self.state = ConnectionToolState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PORT_CAPTURE_RADIUS;

    fn two_devices() -> Vec<Shape> {
        vec![
            Shape::device(Point::new(100.0, 100.0)),
            Shape::device(Point::new(300.0, 100.0)),
        ]
    }

    fn up(machine: &mut ConnectionMachine, point: Point, shapes: &[Shape]) -> Option<Connection> {
        machine.on_pointer_up(point, shapes, PORT_CAPTURE_RADIUS, DEFAULT_CONNECTION_COLOR)
    }

    #[test]
    fn test_connect_right_to_left() {
        let shapes = two_devices();
        let mut machine = ConnectionMachine::new();

        assert!(machine.on_pointer_down(Point::new(162.0, 102.0), &shapes, PORT_CAPTURE_RADIUS));
        let start = machine.state().start_port().unwrap();
        assert_eq!(start.shape_id, shapes[0].id());
        assert_eq!(start.position, PortPosition::Right);
        assert_eq!(machine.state().preview_end(), Some(Point::new(160.0, 100.0)));

        machine.on_pointer_move(Point::new(200.0, 120.0));
        assert_eq!(machine.state().preview_end(), Some(Point::new(200.0, 120.0)));

        let connection = up(&mut machine, Point::new(235.0, 105.0), &shapes).unwrap();
        assert_eq!(connection.from_shape_id, shapes[0].id());
        assert_eq!(connection.from_port, PortPosition::Right);
        assert_eq!(connection.to_shape_id, shapes[1].id());
        assert_eq!(connection.to_port, PortPosition::Left);
        assert_eq!(connection.color, SerializableColor::black());
        assert!(!machine.state().is_dragging());
    }

    #[test]
    fn test_no_self_loop() {
        let shapes = two_devices();
        let mut machine = ConnectionMachine::new();
        machine.on_pointer_down(Point::new(160.0, 100.0), &shapes, PORT_CAPTURE_RADIUS);
        assert!(up(&mut machine, Point::new(102.0, 62.0), &shapes).is_none());
        assert_eq!(*machine.state(), ConnectionToolState::Idle);
    }

    #[test]
    fn test_down_away_from_ports_stays_idle() {
        let shapes = two_devices();
        let mut machine = ConnectionMachine::new();
        assert!(!machine.on_pointer_down(Point::new(100.0, 100.0), &shapes, PORT_CAPTURE_RADIUS));
        assert_eq!(*machine.state(), ConnectionToolState::Idle);
        machine.on_pointer_move(Point::new(120.0, 100.0));
        assert!(machine.state().preview_end().is_none());
    }

    #[test]
    fn test_up_while_idle_is_noop() {
        let shapes = two_devices();
        let mut machine = ConnectionMachine::new();
        assert!(up(&mut machine, Point::new(240.0, 100.0), &shapes).is_none());
        assert_eq!(*machine.state(), ConnectionToolState::Idle);
    }

    #[test]
    fn test_release_away_from_ports_resets() {
        let shapes = two_devices();
        let mut machine = ConnectionMachine::new();
        machine.on_pointer_down(Point::new(160.0, 100.0), &shapes, PORT_CAPTURE_RADIUS);
        assert!(up(&mut machine, Point::new(200.0, 300.0), &shapes).is_none());
        assert!(!machine.state().is_dragging());
    }

    #[test]
    fn test_connection_new_rejects_self_loop() {
        let shape = Shape::tool(Point::new(0.0, 0.0));
        let [top, right, ..] = crate::ports::ports_of(&shape);
        let err = Connection::new(&top, &right, SerializableColor::black()).unwrap_err();
        assert_eq!(err, ConnectionError::SelfLoop(shape.id()));
    }

    #[test]
    fn test_connection_endpoints() {
        let shapes = two_devices();
        let [_, a_right, ..] = crate::ports::ports_of(&shapes[0]);
        let [.., b_left] = crate::ports::ports_of(&shapes[1]);
        let connection = Connection::new(&a_right, &b_left, SerializableColor::black()).unwrap();
        let (from, to) = connection_endpoints(&connection, &shapes).unwrap();
        assert_eq!(from, Point::new(160.0, 100.0));
        assert_eq!(to, Point::new(240.0, 100.0));
        assert!(connection_endpoints(&connection, &shapes[..1]).is_none());
        assert!(connection.touches(shapes[1].id()));
    }

    #[test]
    fn test_arrow_head() {
        let [tip, a, b] = arrow_head(Point::ZERO, Point::new(10.0, 0.0), ARROW_HEAD_LENGTH);
        let back = 10.0 - 10.0 * FRAC_PI_6.cos();
        assert_eq!(tip, Point::new(10.0, 0.0));
        assert!((a.x - back).abs() < 1e-9 && (a.y - 5.0).abs() < 1e-9);
        assert!((b.x - back).abs() < 1e-9 && (b.y + 5.0).abs() < 1e-9);
    }
}
