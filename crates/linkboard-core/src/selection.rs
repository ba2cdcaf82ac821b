//! Selection and dragging of existing shapes.

use crate::config::EditorConfig;
use crate::geometry::{constrain_to_canvas, shape_at_point};
use crate::ports::find_nearest_port;
use crate::shapes::{Shape, ShapeId};
use crate::snap::{AlignmentGuide, apply_snapping, detect_alignments};
use crate::spacing::{SpacingGuide, detect_equal_spacing};
use kurbo::{Point, Size, Vec2};

/// State of a drag interaction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// A shape follows the pointer.
    Dragging {
        shape_id: ShapeId,
        /// Pointer position minus shape center at press time.
        offset: Vec2,
        /// Where the shape would land if released now.
        preview: Point,
    },
}

impl DragState {
    /// Id of the dragged shape, if any.
    pub fn shape_id(&self) -> Option<ShapeId> {
        match self {
            DragState::Dragging { shape_id, .. } => Some(*shape_id),
            DragState::Idle => None,
        }
    }

    /// Live preview center of the dragged shape, if any.
    pub fn preview(&self) -> Option<Point> {
        match self {
            DragState::Dragging { preview, .. } => Some(*preview),
            DragState::Idle => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }
}

/// What a press in selection mode landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PressOutcome {
    /// A shape was selected and is now being dragged.
    DragStarted(ShapeId),
    /// The press was on a port of the shape under the pointer.
    OnPort,
    /// Nothing was hit; the selection was cleared.
    Empty,
}

/// Selection plus live repositioning of the selected shape.
///
/// The committed shape is never touched; the new position is handed back on
/// release for the host to apply.
#[derive(Debug, Clone, Default)]
pub struct DragMachine {
    state: DragState,
    selected: Option<ShapeId>,
    alignment_guides: Vec<AlignmentGuide>,
    spacing_guides: Vec<SpacingGuide>,
}

impl DragMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Currently selected shape.
    pub fn selection(&self) -> Option<ShapeId> {
        self.selected
    }

    /// Check if a shape is selected.
    pub fn is_selected(&self, id: ShapeId) -> bool {
        self.selected == Some(id)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Guides from the last move.
    pub fn alignment_guides(&self) -> &[AlignmentGuide] {
        &self.alignment_guides
    }

    pub fn spacing_guides(&self) -> &[SpacingGuide] {
        &self.spacing_guides
    }

    /// Handle a press: select and start dragging the topmost shape under the pointer.
    pub fn on_pointer_down(
        &mut self,
        point: Point,
        shapes: &[Shape],
        config: &EditorConfig,
    ) -> PressOutcome {
        let Some(hit) = shape_at_point(point, shapes) else {
            self.selected = None;
            self.state = DragState::Idle;
            return PressOutcome::Empty;
        };

        if find_nearest_port(point, shapes, config.port_capture_radius)
            .is_some_and(|port| port.shape_id == hit.id())
        {
            return PressOutcome::OnPort;
        }

        self.selected = Some(hit.id());
        self.state = DragState::Dragging {
            shape_id: hit.id(),
            offset: point - hit.center,
            preview: hit.center,
        };
        log::debug!("Started dragging {}", hit.id());
        PressOutcome::DragStarted(hit.id())
    }

    /// Handle a move: snap, clamp and measure spacing for the new position.
    ///
    /// Returns false if no drag is in progress. A drag whose shape is no longer
    /// in `shapes` is abandoned.
    pub fn on_pointer_move(
        &mut self,
        point: Point,
        shapes: &[Shape],
        canvas: Size,
        config: &EditorConfig,
    ) -> bool {
        let DragState::Dragging { shape_id, offset, .. } = self.state else {
            return false;
        };
        let Some(shape) = shapes.iter().find(|s| s.id() == shape_id) else {
            log::debug!("Dragged shape {} disappeared, abandoning drag", shape_id);
            self.reset();
            return false;
        };

        let candidate = shape.moved_to(point - offset);
        let alignment_guides =
            detect_alignments(&candidate, shapes, Some(shape_id), config.alignment_tolerance);
        let snapped = apply_snapping(&candidate, &alignment_guides, config.snap_distance);
        let preview = constrain_to_canvas(&shape.kind, snapped.point, canvas);
        let spacing_guides = detect_equal_spacing(
            &shape.moved_to(preview),
            shapes,
            Some(shape_id),
            config.center_alignment_tolerance,
            config.spacing_tolerance,
        );
        log::trace!(
            "Drag move: {} alignment guides, {} spacing guides",
            alignment_guides.len(),
            spacing_guides.len()
        );

        self.state = DragState::Dragging {
            shape_id,
            offset,
            preview,
        };
        self.alignment_guides = alignment_guides;
        self.spacing_guides = spacing_guides;
        true
    }

    /// Handle a release (local or global): finish the drag.
    ///
    /// Returns the shape and its new center for the host to commit.
    pub fn on_pointer_up(&mut self) -> Option<(ShapeId, Point)> {
        let state = std::mem::take(&mut self.state);
        self.clear_guides();
        let DragState::Dragging { shape_id, preview, .. } = state else {
            return None;
        };
        log::debug!("Committed drag of {} to ({}, {})", shape_id, preview.x, preview.y);
        Some((shape_id, preview))
    }

    /// Abandon any drag without committing. Returns true if one was in progress.
    pub fn reset(&mut self) -> bool {
        let was_dragging = self.state.is_dragging();
        if was_dragging {
            log::debug!("Cancelled drag");
        }
        self.state = DragState::Idle;
        self.clear_guides();
        was_dragging
    }

    fn clear_guides(&mut self) {
        self.alignment_guides.clear();
        self.spacing_guides.clear();
    }
}
