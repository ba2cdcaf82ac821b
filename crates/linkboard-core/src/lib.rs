//! Linkboard Core Library
//!
//! Geometry, alignment, spacing and pointer-driven interaction state for the
//! Linkboard diagram editor. Rendering and persistence live in the host.

pub mod canvas;
pub mod config;
pub mod connection;
pub mod geometry;
pub mod input;
pub mod ports;
pub mod selection;
pub mod shapes;
pub mod snap;
pub mod spacing;
pub mod tools;

pub use canvas::{Canvas, CanvasDocument, CanvasEvent, DocumentError, DocumentResult};
pub use config::{ConfigError, ConfigResult, EditorConfig};
pub use connection::{
    Connection, ConnectionError, ConnectionId, ConnectionMachine, ConnectionToolState,
};
pub use geometry::{Bounds, bounds_of, constrain_to_canvas, contains_point, shape_at_point};
pub use input::{KeyEvent, PointerEvent};
pub use ports::{Port, PortPosition, find_nearest_port, port_coordinates, ports_of};
pub use selection::{DragMachine, DragState};
pub use shapes::{SerializableColor, Shape, ShapeId, ShapeKind};
pub use snap::{
    AlignmentGuide, AlignmentKind, Orientation, SnapResult, apply_snapping, detect_alignments,
};
pub use spacing::{SpacingGuide, detect_equal_spacing};
pub use tools::{
    CreationPreviewMachine, CreationPreviewState, PaletteTool, ToolKind, ToolManager,
    default_palette,
};
