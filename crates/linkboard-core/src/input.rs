//! Pointer and keyboard events in canvas-local coordinates.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Key name that cancels the current interaction.
pub const CANCEL_KEY: &str = "Escape";

/// Pointer event type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
    /// The pointer left the canvas.
    Leave,
    /// A release seen anywhere in the window while a drag is in progress.
    GlobalUp,
}

impl PointerEvent {
    /// Position carried by the event, if any.
    pub fn position(&self) -> Option<Point> {
        match *self {
            PointerEvent::Down { position }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position } => Some(position),
            PointerEvent::Leave | PointerEvent::GlobalUp => None,
        }
    }
}

/// Keyboard event type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(String),
    Released(String),
}

impl KeyEvent {
    /// Check if this is a press of the cancel key.
    pub fn is_cancel(&self) -> bool {
        matches!(self, KeyEvent::Pressed(key) if key == CANCEL_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_event_json() {
        let event: PointerEvent =
            serde_json::from_str(r#"{"type":"down","position":{"x":1.0,"y":2.0}}"#).unwrap();
        assert_eq!(event, PointerEvent::Down { position: Point::new(1.0, 2.0) });
        let event: PointerEvent = serde_json::from_str(r#"{"type":"global_up"}"#).unwrap();
        assert_eq!(event, PointerEvent::GlobalUp);
        assert!(event.position().is_none());
    }

    #[test]
    fn test_cancel_key() {
        assert!(KeyEvent::Pressed("Escape".to_string()).is_cancel());
        assert!(!KeyEvent::Released("Escape".to_string()).is_cancel());
        assert!(!KeyEvent::Pressed("Enter".to_string()).is_cancel());
    }
}
