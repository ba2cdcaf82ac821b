//! Equal-spacing detection.
//!
//! A candidate shape is checked against the shapes sharing its row (for
//! horizontal spacing) or its column (for vertical spacing). Sorting that line
//! by center gives a sequence of signed gaps; starting from the candidate we
//! extend outwards while the gaps stay equal to the gap next to the candidate.
//! Runs of at least two equal gaps produce one guide per gap.

use crate::geometry::{Bounds, bounds_of};
use crate::shapes::{Shape, ShapeId};
use crate::snap::Orientation;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Max deviation for two consecutive gaps to count as equal.
pub const SPACING_TOLERANCE: f64 = 5.0;

/// Max deviation of the cross-axis center for a shape to join the line.
pub const CENTER_ALIGNMENT_TOLERANCE: f64 = 5.0;

/// Minimum number of equal gaps (three shapes) for a run to count.
const MIN_RUN_GAPS: usize = 2;

/// One gap inside a run of equally spaced shapes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpacingGuide {
    /// Horizontal guides measure gaps along x, vertical ones along y.
    pub orientation: Orientation,
    /// Reference gap of the run this guide belongs to.
    pub spacing: f64,
    pub start_shape_id: ShapeId,
    pub end_shape_id: ShapeId,
    /// Far edge of the start shape, on its center line.
    pub start: Point,
    /// Near edge of the end shape, on its center line.
    pub end: Point,
}

/// A shape on the line being measured.
struct Member {
    id: ShapeId,
    bounds: Bounds,
    is_candidate: bool,
}

/// Consecutive gaps `first..=last` that share a spacing.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GapRun {
    first: usize,
    last: usize,
    spacing: f64,
}

impl GapRun {
    fn gap_count(&self) -> usize {
        self.last - self.first + 1
    }
}

impl Orientation {
    /// Center along the measured axis.
    fn main_center(self, b: &Bounds) -> f64 {
        match self {
            Orientation::Horizontal => b.center_x,
            Orientation::Vertical => b.center_y,
        }
    }

    /// Center along the other axis.
    fn cross_center(self, b: &Bounds) -> f64 {
        match self {
            Orientation::Horizontal => b.center_y,
            Orientation::Vertical => b.center_x,
        }
    }

    fn near_edge(self, b: &Bounds) -> f64 {
        match self {
            Orientation::Horizontal => b.left,
            Orientation::Vertical => b.top,
        }
    }

    fn far_edge(self, b: &Bounds) -> f64 {
        match self {
            Orientation::Horizontal => b.right,
            Orientation::Vertical => b.bottom,
        }
    }

    /// Endpoints of the segment drawn across the gap between `a` and `b`.
    fn gap_segment(self, a: &Bounds, b: &Bounds) -> (Point, Point) {
        match self {
            Orientation::Horizontal => (
                Point::new(a.right, a.center_y),
                Point::new(b.left, b.center_y),
            ),
            Orientation::Vertical => (
                Point::new(a.center_x, a.bottom),
                Point::new(b.center_x, b.top),
            ),
        }
    }
}

/// Detect equal spacing between `candidate` and the other shapes.
///
/// `exclude` skips one shape (the one being dragged). Horizontal guides are
/// returned before vertical ones.
pub fn detect_equal_spacing(
    candidate: &Shape,
    others: &[Shape],
    exclude: Option<ShapeId>,
    center_tolerance: f64,
    spacing_tolerance: f64,
) -> Vec<SpacingGuide> {
    let mut guides = detect_along(
        Orientation::Horizontal,
        candidate,
        others,
        exclude,
        center_tolerance,
        spacing_tolerance,
    );
    guides.extend(detect_along(
        Orientation::Vertical,
        candidate,
        others,
        exclude,
        center_tolerance,
        spacing_tolerance,
    ));
    guides
}

fn detect_along(
    orientation: Orientation,
    candidate: &Shape,
    others: &[Shape],
    exclude: Option<ShapeId>,
    center_tolerance: f64,
    spacing_tolerance: f64,
) -> Vec<SpacingGuide> {
    let candidate_bounds = bounds_of(candidate);
    let cross = orientation.cross_center(&candidate_bounds);

    let mut line: Vec<Member> = others
        .iter()
        .filter(|s| Some(s.id()) != exclude)
        .map(|s| Member {
            id: s.id(),
            bounds: bounds_of(s),
            is_candidate: false,
        })
        .filter(|m| (orientation.cross_center(&m.bounds) - cross).abs() <= center_tolerance)
        .collect();

    if line.is_empty() {
        return Vec::new();
    }

    line.push(Member {
        id: candidate.id(),
        bounds: candidate_bounds,
        is_candidate: true,
    });
    // Stable, so shapes sharing a center keep their document order.
    line.sort_by(|a, b| {
        orientation
            .main_center(&a.bounds)
            .total_cmp(&orientation.main_center(&b.bounds))
    });

    let Some(anchor) = line.iter().position(|m| m.is_candidate) else {
        return Vec::new();
    };

    let gaps: Vec<f64> = line
        .windows(2)
        .map(|pair| orientation.near_edge(&pair[1].bounds) - orientation.far_edge(&pair[0].bounds))
        .collect();

    equal_gap_runs(&gaps, anchor, spacing_tolerance)
        .into_iter()
        .flat_map(|run| {
            let line = &line;
            (run.first..=run.last).map(move |i| {
                let (a, b) = (&line[i], &line[i + 1]);
                let (start, end) = orientation.gap_segment(&a.bounds, &b.bounds);
                SpacingGuide {
                    orientation,
                    spacing: run.spacing,
                    start_shape_id: a.id,
                    end_shape_id: b.id,
                    start,
                    end,
                }
            })
        })
        .collect()
}

/// Find the runs of equal gaps touching the shape at index `anchor`.
///
/// Gap `i` separates shapes `i` and `i + 1`, so the gaps adjacent to the
/// anchor are `anchor - 1` and `anchor`. Each side extends outwards while the
/// gaps match the adjacent one. When both sides share a spacing they form a
/// single run; both sides touch the anchor, so that run is contiguous and no
/// gap is reported twice.
fn equal_gap_runs(gaps: &[f64], anchor: usize, tolerance: f64) -> Vec<GapRun> {
    let same = |a: f64, b: f64| (a - b).abs() <= tolerance;

    let before = (anchor > 0 && anchor <= gaps.len()).then(|| {
        let spacing = gaps[anchor - 1];
        let mut first = anchor - 1;
        while first > 0 && same(gaps[first - 1], spacing) {
            first -= 1;
        }
        GapRun {
            first,
            last: anchor - 1,
            spacing,
        }
    });

    let after = (anchor < gaps.len()).then(|| {
        let spacing = gaps[anchor];
        let mut last = anchor;
        while last + 1 < gaps.len() && same(gaps[last + 1], spacing) {
            last += 1;
        }
        GapRun {
            first: anchor,
            last,
            spacing,
        }
    });

    let runs: Vec<GapRun> = match (before, after) {
        (Some(b), Some(a)) if same(b.spacing, a.spacing) => vec![GapRun {
            first: b.first,
            last: a.last,
            spacing: b.spacing,
        }],
        (b, a) => b.into_iter().chain(a).collect(),
    };

    runs.into_iter()
        .filter(|run| run.gap_count() >= MIN_RUN_GAPS)
        .collect()
}
