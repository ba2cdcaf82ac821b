//! Tool palette and the placement preview.

use crate::config::EditorConfig;
use crate::shapes::{SerializableColor, Shape, ShapeKind};
use crate::snap::{AlignmentGuide, apply_snapping, detect_alignments};
use crate::spacing::{SpacingGuide, detect_equal_spacing};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// No palette tool: select and drag shapes.
    #[default]
    Select,
    Device,
    Tool,
    Connection,
}

impl ToolKind {
    /// The shape this tool places, if it is a placement tool.
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            ToolKind::Device => Some(ShapeKind::device()),
            ToolKind::Tool => Some(ShapeKind::tool()),
            ToolKind::Select | ToolKind::Connection => None,
        }
    }

    pub fn is_placement(self) -> bool {
        self.shape_kind().is_some()
    }
}

/// A palette entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteTool {
    pub kind: ToolKind,
    pub label: String,
    pub color: SerializableColor,
}

impl PaletteTool {
    pub fn new(kind: ToolKind, label: impl Into<String>, color: SerializableColor) -> Self {
        Self {
            kind,
            label: label.into(),
            color,
        }
    }
}

/// The standard palette: device, tool and connection.
pub fn default_palette() -> Vec<PaletteTool> {
    vec![
        PaletteTool::new(ToolKind::Device, "Device", SerializableColor::rgb(0x42, 0x85, 0xf4)),
        PaletteTool::new(ToolKind::Tool, "Tool", SerializableColor::rgb(0x34, 0xa8, 0x53)),
        PaletteTool::new(
            ToolKind::Connection,
            "Connection",
            SerializableColor::rgb(0xfb, 0xbc, 0x04),
        ),
    ]
}

/// Manages the current tool and the palette it is picked from.
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    palette: Vec<PaletteTool>,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::with_palette(default_palette())
    }
}

impl ToolManager {
    /// Create a new tool manager with the default palette.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_palette(palette: Vec<PaletteTool>) -> Self {
        Self {
            current_tool: ToolKind::Select,
            palette,
        }
    }

    pub fn palette(&self) -> &[PaletteTool] {
        &self.palette
    }

    /// Palette entry for a tool.
    pub fn entry(&self, kind: ToolKind) -> Option<&PaletteTool> {
        self.palette.iter().find(|t| t.kind == kind)
    }

    /// Palette entry of the current tool (`None` for select).
    pub fn current_entry(&self) -> Option<&PaletteTool> {
        self.entry(self.current_tool)
    }

    /// Set the current tool.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
    }

    /// Pick a tool, or go back to select if it is already current.
    /// Returns the tool that ends up current.
    pub fn toggle_tool(&mut self, tool: ToolKind) -> ToolKind {
        self.current_tool = if self.current_tool == tool {
            ToolKind::Select
        } else {
            tool
        };
        self.current_tool
    }
}

/// State of the placement preview.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CreationPreviewState {
    #[default]
    Inactive,
    /// A not-yet-created shape following the pointer.
    Active {
        /// Snapped center.
        position: Point,
        kind: ShapeKind,
        color: SerializableColor,
        label: String,
    },
}

impl CreationPreviewState {
    /// Snapped center of the preview, if active.
    pub fn position(&self) -> Option<Point> {
        match self {
            CreationPreviewState::Active { position, .. } => Some(*position),
            CreationPreviewState::Inactive => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, CreationPreviewState::Active { .. })
    }

    /// The preview as a shape (with the nil id) for rendering.
    pub fn shape(&self) -> Option<Shape> {
        match self {
            CreationPreviewState::Active {
                position,
                kind,
                color,
                label,
            } => Some(Shape::with_id(Uuid::nil(), *kind, *position, *color, label.clone())),
            CreationPreviewState::Inactive => None,
        }
    }
}

/// A snapped placement for a palette tool.
struct Placement {
    position: Point,
    kind: ShapeKind,
    alignment_guides: Vec<AlignmentGuide>,
    spacing_guides: Vec<SpacingGuide>,
}

/// Snap a transient shape of `tool`'s kind at `point` against `shapes`.
fn place(
    point: Point,
    tool: &PaletteTool,
    shapes: &[Shape],
    config: &EditorConfig,
) -> Option<Placement> {
    let kind = tool.kind.shape_kind()?;
    let candidate = Shape::with_id(Uuid::nil(), kind, point, tool.color, tool.label.clone());
    let alignment_guides = detect_alignments(&candidate, shapes, None, config.alignment_tolerance);
    let position = apply_snapping(&candidate, &alignment_guides, config.snap_distance).point;
    let spacing_guides = detect_equal_spacing(
        &candidate.moved_to(position),
        shapes,
        None,
        config.center_alignment_tolerance,
        config.spacing_tolerance,
    );
    Some(Placement {
        position,
        kind,
        alignment_guides,
        spacing_guides,
    })
}

/// Drives [`CreationPreviewState`] while a placement tool is selected.
#[derive(Debug, Clone, Default)]
pub struct CreationPreviewMachine {
    state: CreationPreviewState,
    alignment_guides: Vec<AlignmentGuide>,
    spacing_guides: Vec<SpacingGuide>,
}

impl CreationPreviewMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CreationPreviewState {
        &self.state
    }

    pub fn alignment_guides(&self) -> &[AlignmentGuide] {
        &self.alignment_guides
    }

    pub fn spacing_guides(&self) -> &[SpacingGuide] {
        &self.spacing_guides
    }

    /// Move the preview to `point`, snapped. Returns false (and deactivates)
    /// if `tool` does not place shapes.
    pub fn on_pointer_move(
        &mut self,
        point: Point,
        tool: &PaletteTool,
        shapes: &[Shape],
        config: &EditorConfig,
    ) -> bool {
        let Some(placement) = place(point, tool, shapes, config) else {
            self.deactivate();
            return false;
        };
        log::trace!(
            "Preview move: {} alignment guides, {} spacing guides",
            placement.alignment_guides.len(),
            placement.spacing_guides.len()
        );
        self.state = CreationPreviewState::Active {
            position: placement.position,
            kind: placement.kind,
            color: tool.color,
            label: tool.label.clone(),
        };
        self.alignment_guides = placement.alignment_guides;
        self.spacing_guides = placement.spacing_guides;
        true
    }

    /// The pointer left the canvas.
    pub fn on_pointer_leave(&mut self) {
        self.deactivate();
    }

    /// Hide the preview and drop its guides.
    pub fn deactivate(&mut self) {
        self.state = CreationPreviewState::Inactive;
        self.alignment_guides.clear();
        self.spacing_guides.clear();
    }

    /// Where a shape created by a click at `point` should go.
    ///
    /// Uses the active preview position, or snaps at `point` when the preview
    /// was never shown.
    pub fn final_position(
        &self,
        point: Point,
        tool: &PaletteTool,
        shapes: &[Shape],
        config: &EditorConfig,
    ) -> Option<Point> {
        match self.state.position() {
            Some(position) => Some(position),
            None => place(point, tool, shapes, config).map(|p| p.position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snap::AlignmentKind;

    fn device_tool() -> PaletteTool {
        default_palette().remove(0)
    }

    #[test]
    fn test_tool_selection() {
        let mut tm = ToolManager::new();
        assert_eq!(tm.current_tool, ToolKind::Select);

        tm.set_tool(ToolKind::Device);
        assert_eq!(tm.current_tool, ToolKind::Device);
        assert_eq!(tm.current_entry().map(|t| t.label.as_str()), Some("Device"));
    }

    #[test]
    fn test_toggle_tool() {
        let mut tm = ToolManager::new();
        assert_eq!(tm.toggle_tool(ToolKind::Tool), ToolKind::Tool);
        assert_eq!(tm.toggle_tool(ToolKind::Connection), ToolKind::Connection);
        assert_eq!(tm.toggle_tool(ToolKind::Connection), ToolKind::Select);
        assert!(tm.current_entry().is_none());
    }

    #[test]
    fn test_default_palette() {
        let palette = default_palette();
        let colors: Vec<String> = palette.iter().map(|t| t.color.to_hex()).collect();
        assert_eq!(colors, vec!["#4285f4", "#34a853", "#fbbc04"]);
        assert!(palette[0].kind.is_placement());
        assert!(palette[1].kind.is_placement());
        assert!(!palette[2].kind.is_placement());
    }

    #[test]
    fn test_preview_follows_pointer() {
        let config = EditorConfig::default();
        let mut machine = CreationPreviewMachine::new();
        let tool = device_tool();
        assert!(machine.on_pointer_move(Point::new(300.0, 200.0), &tool, &[], &config));
        let shape = machine.state().shape().unwrap();
        assert!(shape.id().is_nil());
        assert_eq!(shape.center, Point::new(300.0, 200.0));
        assert_eq!(shape.kind, ShapeKind::device());
        assert_eq!(shape.label, "Device");
    }

    #[test]
    fn test_preview_snaps_to_existing_shape() {
        let config = EditorConfig::default();
        let shapes = vec![Shape::device(Point::new(100.0, 100.0))];
        let mut machine = CreationPreviewMachine::new();
        machine.on_pointer_move(Point::new(300.0, 103.0), &device_tool(), &shapes, &config);
        assert_eq!(machine.state().position(), Some(Point::new(300.0, 100.0)));
        let kinds: Vec<AlignmentKind> = machine.alignment_guides().iter().map(|g| g.kind).collect();
        assert_eq!(kinds, vec![AlignmentKind::Top, AlignmentKind::Bottom]);
    }

    #[test]
    fn test_preview_without_snap_at_eight_pixels() {
        let config = EditorConfig::default();
        // Candidate left edge 8px right of the device's right edge.
        let shapes = vec![Shape::device(Point::new(100.0, 100.0))];
        let mut machine = CreationPreviewMachine::new();
        machine.on_pointer_move(Point::new(228.0, 300.0), &device_tool(), &shapes, &config);
        assert_eq!(machine.state().position(), Some(Point::new(228.0, 300.0)));
        assert!(machine.alignment_guides().is_empty());
    }

    #[test]
    fn test_leave_deactivates() {
        let config = EditorConfig::default();
        let shapes = vec![Shape::device(Point::new(100.0, 100.0))];
        let mut machine = CreationPreviewMachine::new();
        machine.on_pointer_move(Point::new(300.0, 103.0), &device_tool(), &shapes, &config);
        machine.on_pointer_leave();
        assert_eq!(*machine.state(), CreationPreviewState::Inactive);
        assert!(machine.alignment_guides().is_empty());
        assert!(machine.spacing_guides().is_empty());
    }

    #[test]
    fn test_non_placement_tool_deactivates() {
        let config = EditorConfig::default();
        let palette = default_palette();
        let mut machine = CreationPreviewMachine::new();
        machine.on_pointer_move(Point::new(10.0, 10.0), &palette[0], &[], &config);
        assert!(!machine.on_pointer_move(Point::new(10.0, 10.0), &palette[2], &[], &config));
        assert!(!machine.state().is_active());
    }

    #[test]
    fn test_final_position() {
        let shapes = vec![Shape::device(Point::new(100.0, 100.0))];
        let config = EditorConfig::default();
        let tool = device_tool();
        let mut machine = CreationPreviewMachine::new();

        // Never shown: snap at the click point.
        assert_eq!(
            machine.final_position(Point::new(300.0, 104.0), &tool, &shapes, &config),
            Some(Point::new(300.0, 100.0))
        );

        machine.on_pointer_move(Point::new(400.0, 300.0), &tool, &shapes, &config);
        assert_eq!(
            machine.final_position(Point::new(401.0, 301.0), &tool, &shapes, &config),
            Some(Point::new(400.0, 300.0))
        );
    }

    #[test]
    fn test_spacing_on_snapped_position() {
        let shapes = vec![
            Shape::tool(Point::new(100.0, 100.0)),
            Shape::tool(Point::new(250.0, 100.0)),
        ];
        let tool = default_palette().remove(1);
        let mut machine = CreationPreviewMachine::new();
        machine.on_pointer_move(Point::new(400.0, 102.0), &tool, &shapes, &EditorConfig::default());
        assert_eq!(machine.state().position(), Some(Point::new(400.0, 100.0)));
        assert_eq!(machine.spacing_guides().len(), 2);
    }
}
