//! Scripted pointer sessions replayed through the interaction engine.
//!
//! The session plays the part of the host: it owns the document, applies the
//! engine's commit events to it and installs the window-wide release listener
//! only while the engine asks for it.

use linkboard_core::{
    Canvas, CanvasDocument, CanvasEvent, ConfigError, DocumentError, EditorConfig, KeyEvent,
    PointerEvent, ToolKind,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Usage: {0}")]
    Usage(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum SessionStep {
    Pointer(PointerEvent),
    Key { key: KeyEvent },
    SelectTool { tool: ToolKind },
    ToggleTool { tool: ToolKind },
    Resize { width: f64, height: f64 },
}

/// A replayable session: starting document, canvas size and inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionScript {
    /// Falls back to the configured default canvas width.
    #[serde(default)]
    pub canvas_width: Option<f64>,
    #[serde(default)]
    pub canvas_height: Option<f64>,
    #[serde(default)]
    pub document: CanvasDocument,
    #[serde(default)]
    pub steps: Vec<SessionStep>,
}

impl SessionScript {
    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        serde_json::from_str(json).map_err(|e| SessionError::Parse(e.to_string()))
    }

    /// Load a session script from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| SessionError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }
}

/// Host-side state while replaying.
pub struct Session {
    canvas: Canvas,
    document: CanvasDocument,
    release_listener: bool,
    committed: usize,
}

impl Session {
    pub fn new(config: EditorConfig, document: CanvasDocument) -> Self {
        Self {
            canvas: Canvas::with_config(config),
            document,
            release_listener: false,
            committed: 0,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn document(&self) -> &CanvasDocument {
        &self.document
    }

    /// Whether the window-wide release listener is installed.
    pub fn is_listening_for_release(&self) -> bool {
        self.release_listener
    }

    /// Number of document changes applied so far.
    pub fn committed(&self) -> usize {
        self.committed
    }

    /// Feed one step to the engine and apply what comes back.
    pub fn step(&mut self, step: &SessionStep) -> Result<(), SessionError> {
        let events = match step {
            SessionStep::Pointer(PointerEvent::GlobalUp) if !self.release_listener => {
                log::debug!("Dropping global release, no listener installed");
                Vec::new()
            }
            SessionStep::Pointer(event) => {
                self.canvas.handle_pointer_event(*event, &self.document.shapes)
            }
            SessionStep::Key { key } => self.canvas.handle_key_event(key),
            SessionStep::SelectTool { tool } => self.canvas.set_tool(*tool),
            SessionStep::ToggleTool { tool } => self.canvas.toggle_tool(*tool),
            SessionStep::Resize { width, height } => {
                self.canvas.set_canvas_size(*width, *height);
                Vec::new()
            }
        };
        self.dispatch(&events)
    }

    fn dispatch(&mut self, events: &[CanvasEvent]) -> Result<(), SessionError> {
        for event in events {
            match event {
                CanvasEvent::SubscribeGlobalRelease => self.release_listener = true,
                CanvasEvent::UnsubscribeGlobalRelease => self.release_listener = false,
                CanvasEvent::CanvasClicked { position } => {
                    log::debug!("Canvas clicked at ({}, {})", position.x, position.y);
                }
                _ => {
                    self.document.apply(event)?;
                    self.committed += 1;
                }
            }
        }
        Ok(())
    }

    pub fn into_document(self) -> CanvasDocument {
        self.document
    }
}

/// Replay a whole script and return the resulting document.
pub fn replay(
    script: &SessionScript,
    config: EditorConfig,
) -> Result<CanvasDocument, SessionError> {
    let width = script.canvas_width.unwrap_or(config.default_canvas_width);
    let height = script.canvas_height.unwrap_or(config.default_canvas_height);
    let mut session = Session::new(config, script.document.clone());
    session.canvas.set_canvas_size(width, height);

    for step in &script.steps {
        session.step(step)?;
    }
    log::info!(
        "Replayed {} steps, {} changes committed",
        script.steps.len(),
        session.committed()
    );
    Ok(session.into_document())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use linkboard_core::{PortPosition, Shape};
    use std::io::Write;

    fn pointer(event: PointerEvent) -> SessionStep {
        SessionStep::Pointer(event)
    }

    #[test]
    fn test_place_and_connect() {
        let script = SessionScript {
            steps: vec![
                SessionStep::SelectTool { tool: ToolKind::Device },
                pointer(PointerEvent::Move { position: Point::new(100.0, 100.0) }),
                pointer(PointerEvent::Down { position: Point::new(100.0, 100.0) }),
                pointer(PointerEvent::Up { position: Point::new(100.0, 100.0) }),
                pointer(PointerEvent::Move { position: Point::new(300.0, 102.0) }),
                pointer(PointerEvent::Down { position: Point::new(300.0, 102.0) }),
                pointer(PointerEvent::Up { position: Point::new(300.0, 102.0) }),
                SessionStep::SelectTool { tool: ToolKind::Connection },
                pointer(PointerEvent::Down { position: Point::new(161.0, 99.0) }),
                pointer(PointerEvent::Move { position: Point::new(200.0, 100.0) }),
                pointer(PointerEvent::Up { position: Point::new(236.0, 103.0) }),
            ],
            ..SessionScript::default()
        };

        let doc = replay(&script, EditorConfig::default()).unwrap();
        assert_eq!(doc.shapes.len(), 2);
        // Second device snapped onto the first one's row.
        assert_eq!(doc.shapes[1].center, Point::new(300.0, 100.0));
        assert_eq!(doc.connections.len(), 1);
        let connection = &doc.connections[0];
        assert_eq!(connection.from_shape_id, doc.shapes[0].id());
        assert_eq!(connection.from_port, PortPosition::Right);
        assert_eq!(connection.to_shape_id, doc.shapes[1].id());
        assert_eq!(connection.to_port, PortPosition::Left);
    }

    #[test]
    fn test_drag_released_outside_canvas() {
        let mut document = CanvasDocument::new();
        let id = document.add_shape(Shape::tool(Point::new(100.0, 100.0)));
        let mut session = Session::new(EditorConfig::default(), document);

        session
            .step(&pointer(PointerEvent::Down { position: Point::new(100.0, 100.0) }))
            .unwrap();
        assert!(session.is_listening_for_release());
        session
            .step(&pointer(PointerEvent::Move { position: Point::new(400.0, 300.0) }))
            .unwrap();
        session.step(&pointer(PointerEvent::Leave)).unwrap();
        session.step(&pointer(PointerEvent::GlobalUp)).unwrap();

        assert!(!session.is_listening_for_release());
        assert_eq!(session.committed(), 1);
        assert_eq!(session.document().get_shape(id).unwrap().center, Point::new(400.0, 300.0));
    }

    #[test]
    fn test_global_release_without_listener_is_dropped() {
        let mut session = Session::new(EditorConfig::default(), CanvasDocument::new());
        session.step(&pointer(PointerEvent::GlobalUp)).unwrap();
        assert_eq!(session.committed(), 0);
    }

    #[test]
    fn test_escape_abandons_drag() {
        let mut document = CanvasDocument::new();
        let id = document.add_shape(Shape::device(Point::new(100.0, 100.0)));
        let mut session = Session::new(EditorConfig::default(), document);

        session
            .step(&pointer(PointerEvent::Down { position: Point::new(100.0, 100.0) }))
            .unwrap();
        session
            .step(&pointer(PointerEvent::Move { position: Point::new(300.0, 300.0) }))
            .unwrap();
        session
            .step(&SessionStep::Key { key: KeyEvent::Pressed("Escape".to_string()) })
            .unwrap();
        session
            .step(&pointer(PointerEvent::Up { position: Point::new(300.0, 300.0) }))
            .unwrap();

        assert!(!session.is_listening_for_release());
        assert_eq!(session.committed(), 0);
        assert_eq!(session.document().get_shape(id).unwrap().center, Point::new(100.0, 100.0));
    }

    #[test]
    fn test_script_json() {
        let json = r#"{
            "canvas_width": 400,
            "steps": [
                {"step": "toggle_tool", "tool": "tool"},
                {"step": "pointer", "type": "down", "position": {"x": 10.0, "y": 20.0}},
                {"step": "pointer", "type": "up", "position": {"x": 10.0, "y": 20.0}},
                {"step": "key", "key": {"Pressed": "Escape"}},
                {"step": "resize", "width": 300, "height": 200}
            ]
        }"#;
        let script = SessionScript::from_json(json).unwrap();
        assert_eq!(script.canvas_width, Some(400.0));
        assert_eq!(script.canvas_height, None);
        assert_eq!(script.steps.len(), 5);
        assert_eq!(script.steps[0], SessionStep::ToggleTool { tool: ToolKind::Tool });

        let doc = replay(&script, EditorConfig::default()).unwrap();
        assert_eq!(doc.shapes.len(), 1);
        assert_eq!(doc.shapes[0].center, Point::new(10.0, 20.0));
    }

    #[test]
    fn test_load_script_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"steps": []}}"#).unwrap();
        let script = SessionScript::load(file.path()).unwrap();
        assert!(script.steps.is_empty());

        let err = SessionScript::from_json(r#"{"steps": [{"step": "jump"}]}"#).unwrap_err();
        assert!(matches!(err, SessionError::Parse(_)));
    }
}
