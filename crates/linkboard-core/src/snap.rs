//! Alignment guides and snapping of shapes onto them.

use crate::geometry::{Bounds, bounds_of};
use crate::shapes::{Shape, ShapeId};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Max deviation for two edges or centers to count as aligned.
pub const ALIGNMENT_TOLERANCE: f64 = 5.0;

/// Max deviation for a guide to pull a shape exactly onto it.
pub const SNAP_DISTANCE: f64 = 8.0;

/// Guides kept per orientation after deduplication.
pub const MAX_GUIDES_PER_ORIENTATION: usize = 2;

/// Direction of a guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Constant y, spans the canvas width.
    Horizontal,
    /// Constant x, spans the canvas height.
    Vertical,
}

/// Which bound of the candidate lines up with which bound of the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlignmentKind {
    Left,
    Right,
    CenterX,
    /// Candidate left touches the reference right.
    LeftToRight,
    /// Candidate right touches the reference left.
    RightToLeft,
    Top,
    Bottom,
    CenterY,
    /// Candidate top touches the reference bottom.
    TopToBottom,
    /// Candidate bottom touches the reference top.
    BottomToTop,
}

/// Which bound along an axis: near side, center or far side.
#[derive(Clone, Copy)]
enum Edge {
    Near,
    Center,
    Far,
}

impl AlignmentKind {
    /// Detection order for a single reference shape.
    pub const ALL: [AlignmentKind; 10] = [
        AlignmentKind::Left,
        AlignmentKind::Right,
        AlignmentKind::CenterX,
        AlignmentKind::LeftToRight,
        AlignmentKind::RightToLeft,
        AlignmentKind::Top,
        AlignmentKind::Bottom,
        AlignmentKind::CenterY,
        AlignmentKind::TopToBottom,
        AlignmentKind::BottomToTop,
    ];

    pub fn orientation(self) -> Orientation {
        match self {
            AlignmentKind::Left
            | AlignmentKind::Right
            | AlignmentKind::CenterX
            | AlignmentKind::LeftToRight
            | AlignmentKind::RightToLeft => Orientation::Vertical,
            AlignmentKind::Top
            | AlignmentKind::Bottom
            | AlignmentKind::CenterY
            | AlignmentKind::TopToBottom
            | AlignmentKind::BottomToTop => Orientation::Horizontal,
        }
    }

    /// The candidate edge this kind aligns.
    fn candidate_edge(self) -> Edge {
        match self {
            AlignmentKind::Left
            | AlignmentKind::LeftToRight
            | AlignmentKind::Top
            | AlignmentKind::TopToBottom => Edge::Near,
            AlignmentKind::CenterX | AlignmentKind::CenterY => Edge::Center,
            AlignmentKind::Right
            | AlignmentKind::RightToLeft
            | AlignmentKind::Bottom
            | AlignmentKind::BottomToTop => Edge::Far,
        }
    }

    /// Value of the candidate bound compared by this kind.
    pub fn candidate_value(self, bounds: &Bounds) -> f64 {
        axis_value(bounds, self.orientation(), self.candidate_edge())
    }

    /// Value of the reference bound compared by this kind (the guide position).
    pub fn reference_value(self, bounds: &Bounds) -> f64 {
        let edge = match self {
            AlignmentKind::LeftToRight | AlignmentKind::TopToBottom => Edge::Far,
            AlignmentKind::RightToLeft | AlignmentKind::BottomToTop => Edge::Near,
            other => other.candidate_edge(),
        };
        axis_value(bounds, self.orientation(), edge)
    }
}

fn axis_value(bounds: &Bounds, orientation: Orientation, edge: Edge) -> f64 {
    match (orientation, edge) {
        (Orientation::Vertical, Edge::Near) => bounds.left,
        (Orientation::Vertical, Edge::Center) => bounds.center_x,
        (Orientation::Vertical, Edge::Far) => bounds.right,
        (Orientation::Horizontal, Edge::Near) => bounds.top,
        (Orientation::Horizontal, Edge::Center) => bounds.center_y,
        (Orientation::Horizontal, Edge::Far) => bounds.bottom,
    }
}

/// An alignment between the candidate and one reference shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentGuide {
    pub kind: AlignmentKind,
    /// Line position: x for vertical guides, y for horizontal ones.
    pub position: f64,
    pub orientation: Orientation,
    pub reference_shape_id: ShapeId,
}

/// Result of a snap operation.
#[derive(Debug, Clone, Copy)]
pub struct SnapResult {
    /// The snapped center.
    pub point: Point,
    /// Whether the X coordinate was snapped.
    pub snapped_x: bool,
    /// Whether the Y coordinate was snapped.
    pub snapped_y: bool,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped_x: false,
            snapped_y: false,
        }
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// Detect alignments between `candidate` and every shape in `others`.
///
/// `exclude` skips one shape (the one being dragged). The result holds at most
/// [`MAX_GUIDES_PER_ORIENTATION`] guides per orientation with distinct
/// positions, vertical guides first.
pub fn detect_alignments(
    candidate: &Shape,
    others: &[Shape],
    exclude: Option<ShapeId>,
    tolerance: f64,
) -> Vec<AlignmentGuide> {
    let candidate_bounds = bounds_of(candidate);
    let mut guides = Vec::new();

    for other in others {
        if Some(other.id()) == exclude {
            continue;
        }
        let other_bounds = bounds_of(other);
        for kind in AlignmentKind::ALL {
            let position = kind.reference_value(&other_bounds);
            if (kind.candidate_value(&candidate_bounds) - position).abs() <= tolerance {
                guides.push(AlignmentGuide {
                    kind,
                    position,
                    orientation: kind.orientation(),
                    reference_shape_id: other.id(),
                });
            }
        }
    }

    filter_guides(guides)
}

/// Deduplicate by position and cap each orientation independently.
fn filter_guides(guides: Vec<AlignmentGuide>) -> Vec<AlignmentGuide> {
    let pick = |orientation: Orientation| {
        let mut kept: Vec<AlignmentGuide> = Vec::with_capacity(MAX_GUIDES_PER_ORIENTATION);
        for guide in guides.iter().filter(|g| g.orientation == orientation) {
            if kept.len() == MAX_GUIDES_PER_ORIENTATION {
                break;
            }
            if !kept.iter().any(|k| k.position == guide.position) {
                kept.push(*guide);
            }
        }
        kept
    };

    let mut filtered = pick(Orientation::Vertical);
    filtered.extend(pick(Orientation::Horizontal));
    filtered
}

/// Move `candidate` onto the first qualifying guide of each orientation.
///
/// A guide qualifies when the candidate bound it compares lies within
/// `snap_distance` (inclusive) of the guide position. The center is shifted so
/// that bound lands exactly on the guide.
pub fn apply_snapping(
    candidate: &Shape,
    guides: &[AlignmentGuide],
    snap_distance: f64,
) -> SnapResult {
    let bounds = bounds_of(candidate);
    let half = candidate.kind.half_extents();
    let mut result = SnapResult::none(candidate.center);

    let snapped_center = |orientation: Orientation, half_extent: f64| {
        guides
            .iter()
            .filter(|g| g.orientation == orientation)
            .find(|g| (g.position - g.kind.candidate_value(&bounds)).abs() <= snap_distance)
            .map(|g| match g.kind.candidate_edge() {
                Edge::Near => g.position + half_extent,
                Edge::Center => g.position,
                Edge::Far => g.position - half_extent,
            })
    };

    if let Some(x) = snapped_center(Orientation::Vertical, half.x) {
        result.point.x = x;
        result.snapped_x = true;
    }
    if let Some(y) = snapped_center(Orientation::Horizontal, half.y) {
        result.point.y = y;
        result.snapped_y = true;
    }

    result
}
