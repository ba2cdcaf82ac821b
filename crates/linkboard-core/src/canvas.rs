//! Canvas document and interaction state management.

use crate::config::EditorConfig;
use crate::connection::{Connection, ConnectionId, ConnectionMachine, ConnectionToolState};
use crate::input::{KeyEvent, PointerEvent};
use crate::selection::{DragMachine, DragState, PressOutcome};
use crate::shapes::{SerializableColor, Shape, ShapeId, ShapeKind};
use crate::snap::AlignmentGuide;
use crate::spacing::SpacingGuide;
use crate::tools::{CreationPreviewMachine, CreationPreviewState, ToolKind, ToolManager};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Document errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Shape not found: {0}")]
    UnknownShape(ShapeId),
    #[error("Connection would start and end on shape {0}")]
    SelfLoop(ShapeId),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Commits and requests produced by the interaction engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CanvasEvent {
    /// A placement tool was clicked on the canvas.
    ShapeCreated {
        kind: ShapeKind,
        position: Point,
        color: SerializableColor,
        label: String,
    },
    /// A drag finished.
    ShapeMoved { id: ShapeId, position: Point },
    ConnectionCreated(Connection),
    /// A click on empty canvas in selection mode.
    CanvasClicked { position: Point },
    /// Start delivering window-wide pointer releases.
    SubscribeGlobalRelease,
    /// Stop delivering window-wide pointer releases.
    UnsubscribeGlobalRelease,
}

/// The shapes and connections of a diagram.
///
/// Shapes are ordered back to front.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasDocument {
    pub shapes: Vec<Shape>,
    pub connections: Vec<Connection>,
}

impl CanvasDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape on top of the others.
    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id();
        self.shapes.push(shape);
        id
    }

    /// Get a shape by ID.
    pub fn get_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id() == id)
    }

    /// Replace a shape with a copy centered at `position`.
    pub fn move_shape(&mut self, id: ShapeId, position: Point) -> DocumentResult<()> {
        let slot = self
            .shapes
            .iter_mut()
            .find(|s| s.id() == id)
            .ok_or(DocumentError::UnknownShape(id))?;
        *slot = slot.moved_to(position);
        Ok(())
    }

    /// Add a connection whose ends both exist in the document.
    pub fn add_connection(&mut self, connection: Connection) -> DocumentResult<ConnectionId> {
        self.check_connection(&connection)?;
        let id = connection.id();
        self.connections.push(connection);
        Ok(id)
    }

    fn check_connection(&self, connection: &Connection) -> DocumentResult<()> {
        if connection.from_shape_id == connection.to_shape_id {
            return Err(DocumentError::SelfLoop(connection.from_shape_id));
        }
        for id in [connection.from_shape_id, connection.to_shape_id] {
            if self.get_shape(id).is_none() {
                return Err(DocumentError::UnknownShape(id));
            }
        }
        Ok(())
    }

    /// Connections attached to a shape.
    pub fn connections_of(&self, shape_id: ShapeId) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.touches(shape_id))
    }

    /// Apply a commit event. Subscription requests are ignored.
    pub fn apply(&mut self, event: &CanvasEvent) -> DocumentResult<()> {
        match event {
            CanvasEvent::ShapeCreated {
                kind,
                position,
                color,
                label,
            } => {
                self.add_shape(Shape::new(*kind, *position, *color, label.clone()));
            }
            CanvasEvent::ShapeMoved { id, position } => self.move_shape(*id, *position)?,
            CanvasEvent::ConnectionCreated(connection) => {
                self.add_connection(connection.clone())?;
            }
            CanvasEvent::CanvasClicked { .. }
            | CanvasEvent::SubscribeGlobalRelease
            | CanvasEvent::UnsubscribeGlobalRelease => {}
        }
        Ok(())
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Get the number of shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> DocumentResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| DocumentError::Serialization(e.to_string()))
    }

    /// Deserialize from JSON, rejecting dangling or self-looping connections.
    pub fn from_json(json: &str) -> DocumentResult<Self> {
        let document: Self =
            serde_json::from_str(json).map_err(|e| DocumentError::Serialization(e.to_string()))?;
        for connection in &document.connections {
            document.check_connection(connection)?;
        }
        Ok(document)
    }
}

/// Runtime interaction state (not persisted).
///
/// Routes the pointer stream to exactly one machine based on the current
/// tool. The shape collection is owned by the host and passed in on every
/// event; commits come back as [`CanvasEvent`]s.
#[derive(Debug, Clone)]
pub struct Canvas {
    pub config: EditorConfig,
    /// Tool manager.
    pub tool_manager: ToolManager,
    canvas_size: Size,
    drag: DragMachine,
    creation: CreationPreviewMachine,
    connection: ConnectionMachine,
    release_subscribed: bool,
    /// A placement tool was pressed on the canvas and not yet released.
    placement_pressed: bool,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Create a canvas with the default config.
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            canvas_size: config.default_canvas_size(),
            config,
            tool_manager: ToolManager::new(),
            drag: DragMachine::new(),
            creation: CreationPreviewMachine::new(),
            connection: ConnectionMachine::new(),
            release_subscribed: false,
            placement_pressed: false,
        }
    }

    /// Set the canvas size used to clamp dragged shapes.
    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.canvas_size = Size::new(width, height);
    }

    pub fn canvas_size(&self) -> Size {
        self.canvas_size
    }

    pub fn current_tool(&self) -> ToolKind {
        self.tool_manager.current_tool
    }

    /// Set the current tool, resetting whatever the previous tool had in progress.
    pub fn set_tool(&mut self, tool: ToolKind) -> Vec<CanvasEvent> {
        let previous = self.tool_manager.current_tool;
        self.tool_manager.set_tool(tool);
        self.tool_changed(previous)
    }

    /// Pick a tool, or deselect it if it is already current.
    pub fn toggle_tool(&mut self, tool: ToolKind) -> Vec<CanvasEvent> {
        let previous = self.tool_manager.current_tool;
        self.tool_manager.toggle_tool(tool);
        self.tool_changed(previous)
    }

    fn tool_changed(&mut self, previous: ToolKind) -> Vec<CanvasEvent> {
        let current = self.tool_manager.current_tool;
        if previous == current {
            return Vec::new();
        }
        log::debug!("Tool changed: {:?} -> {:?}", previous, current);
        self.reset_machines()
    }

    /// Deselect the current tool and abandon any interaction in progress.
    pub fn cancel(&mut self) -> Vec<CanvasEvent> {
        log::debug!("Cancelled interaction");
        self.tool_manager.set_tool(ToolKind::Select);
        self.reset_machines()
    }

    fn reset_machines(&mut self) -> Vec<CanvasEvent> {
        self.drag.reset();
        self.creation.deactivate();
        self.connection.reset();
        self.placement_pressed = false;
        self.release_subscription()
    }

    fn release_subscription(&mut self) -> Vec<CanvasEvent> {
        if std::mem::take(&mut self.release_subscribed) {
            vec![CanvasEvent::UnsubscribeGlobalRelease]
        } else {
            Vec::new()
        }
    }

    /// Handle a press.
    pub fn on_pointer_down(&mut self, point: Point, shapes: &[Shape]) -> Vec<CanvasEvent> {
        match self.tool_manager.current_tool {
            ToolKind::Connection => {
                self.connection
                    .on_pointer_down(point, shapes, self.config.port_capture_radius);
                Vec::new()
            }
            // Placement commits on the matching release.
            ToolKind::Device | ToolKind::Tool => {
                self.placement_pressed = true;
                Vec::new()
            }
            ToolKind::Select => {
                // A drag whose release never arrived ends here.
                let mut events = if self.drag.state().is_dragging() {
                    log::debug!("Press during drag, finishing the previous drag");
                    self.finish_drag()
                } else {
                    Vec::new()
                };
                match self.drag.on_pointer_down(point, shapes, &self.config) {
                    PressOutcome::DragStarted(_) => {
                        if !std::mem::replace(&mut self.release_subscribed, true) {
                            events.push(CanvasEvent::SubscribeGlobalRelease);
                        }
                    }
                    PressOutcome::OnPort => {}
                    PressOutcome::Empty => {
                        events.push(CanvasEvent::CanvasClicked { position: point });
                    }
                }
                events
            }
        }
    }

    /// Handle a move.
    pub fn on_pointer_move(&mut self, point: Point, shapes: &[Shape]) -> Vec<CanvasEvent> {
        match self.tool_manager.current_tool {
            ToolKind::Connection => {
                self.connection.on_pointer_move(point);
                Vec::new()
            }
            ToolKind::Device | ToolKind::Tool => {
                match self.tool_manager.current_entry() {
                    Some(tool) => {
                        self.creation.on_pointer_move(point, tool, shapes, &self.config);
                    }
                    None => self.creation.deactivate(),
                }
                Vec::new()
            }
            ToolKind::Select => {
                let was_dragging = self.drag.state().is_dragging();
                let dragging =
                    self.drag
                        .on_pointer_move(point, shapes, self.canvas_size, &self.config);
                if was_dragging && !dragging {
                    self.release_subscription()
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Handle a release over the canvas.
    pub fn on_pointer_up(&mut self, point: Point, shapes: &[Shape]) -> Vec<CanvasEvent> {
        match self.tool_manager.current_tool {
            ToolKind::Connection => self
                .connection
                .on_pointer_up(
                    point,
                    shapes,
                    self.config.port_capture_radius,
                    self.config.connection_color,
                )
                .map(CanvasEvent::ConnectionCreated)
                .into_iter()
                .collect(),
            ToolKind::Device | ToolKind::Tool => {
                if !std::mem::take(&mut self.placement_pressed) {
                    log::debug!("Release without a press on the canvas, nothing placed");
                    return Vec::new();
                }
                let Some(tool) = self.tool_manager.current_entry() else {
                    return Vec::new();
                };
                let Some(kind) = tool.kind.shape_kind() else {
                    return Vec::new();
                };
                let Some(position) = self.creation.final_position(point, tool, shapes, &self.config)
                else {
                    return Vec::new();
                };
                log::debug!("Placing {} at ({}, {})", tool.label, position.x, position.y);
                vec![CanvasEvent::ShapeCreated {
                    kind,
                    position,
                    color: tool.color,
                    label: tool.label.clone(),
                }]
            }
            ToolKind::Select => self.finish_drag(),
        }
    }

    /// Handle a window-wide release. Ignored unless a drag subscribed to it.
    pub fn on_global_pointer_up(&mut self) -> Vec<CanvasEvent> {
        if !self.release_subscribed {
            return Vec::new();
        }
        self.finish_drag()
    }

    fn finish_drag(&mut self) -> Vec<CanvasEvent> {
        let mut events: Vec<CanvasEvent> = self
            .drag
            .on_pointer_up()
            .map(|(id, position)| CanvasEvent::ShapeMoved { id, position })
            .into_iter()
            .collect();
        events.extend(self.release_subscription());
        events
    }

    /// The pointer left the canvas.
    pub fn on_pointer_leave(&mut self) {
        self.creation.on_pointer_leave();
    }

    /// Dispatch a pointer event.
    pub fn handle_pointer_event(
        &mut self,
        event: PointerEvent,
        shapes: &[Shape],
    ) -> Vec<CanvasEvent> {
        match event {
            PointerEvent::Down { position } => self.on_pointer_down(position, shapes),
            PointerEvent::Move { position } => self.on_pointer_move(position, shapes),
            PointerEvent::Up { position } => self.on_pointer_up(position, shapes),
            PointerEvent::Leave => {
                self.on_pointer_leave();
                Vec::new()
            }
            PointerEvent::GlobalUp => self.on_global_pointer_up(),
        }
    }

    /// Dispatch a key event. Only the cancel key does anything.
    pub fn handle_key_event(&mut self, event: &KeyEvent) -> Vec<CanvasEvent> {
        if event.is_cancel() {
            self.cancel()
        } else {
            Vec::new()
        }
    }

    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    pub fn connection_state(&self) -> &ConnectionToolState {
        self.connection.state()
    }

    pub fn creation_preview(&self) -> &CreationPreviewState {
        self.creation.state()
    }

    /// Currently selected shape.
    pub fn selection(&self) -> Option<ShapeId> {
        self.drag.selection()
    }

    /// Check if a window-wide release listener should be installed.
    pub fn is_release_subscribed(&self) -> bool {
        self.release_subscribed
    }

    /// Alignment guides of whichever machine is active.
    pub fn alignment_guides(&self) -> &[AlignmentGuide] {
        if self.tool_manager.current_tool.is_placement() {
            self.creation.alignment_guides()
        } else {
            self.drag.alignment_guides()
        }
    }

    /// Spacing guides of whichever machine is active.
    pub fn spacing_guides(&self) -> &[SpacingGuide] {
        if self.tool_manager.current_tool.is_placement() {
            self.creation.spacing_guides()
        } else {
            self.drag.spacing_guides()
        }
    }
}
