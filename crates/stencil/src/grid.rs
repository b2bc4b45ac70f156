//! Grid pattern detection.
//!
//! Recognizes instances laid out as a row, a column or a matrix of equally
//! spaced cells. X and Y coordinates are clustered independently; the
//! clusters become columns and rows. Confidence is the product of the spacing
//! consistency of both axes and the fraction of cells that are occupied.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use log::debug;

use stencil_core::{
    compressed::GridLayout,
    geometry::{GridPosition, LayoutBox},
};

use crate::config::GridConfig;

/// Shape of a detected arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKind {
    Row,
    Column,
    Matrix,
}

/// Outcome of [`detect_grid`].
#[derive(Debug, Clone, PartialEq)]
pub struct GridDetection {
    /// The accepted grid, or `None` when confidence stayed below the threshold.
    pub grid: Option<GridLayout>,
    /// Computed confidence in `[0, 1]`; also reported for rejected candidates.
    pub confidence: f64,
    /// Shape of the candidate; `None` when geometry was insufficient.
    pub kind: Option<GridKind>,
}

impl GridDetection {
    fn insufficient() -> Self {
        Self {
            grid: None,
            confidence: 0.0,
            kind: None,
        }
    }
}

/// Sorted cluster representatives of one axis.
#[derive(Debug)]
struct Axis {
    representatives: Vec<f64>,
}

impl Axis {
    /// Clusters `values` so that each member lies within `tolerance` of the
    /// smallest value in its cluster.
    fn cluster(values: impl Iterator<Item = f64>, tolerance: f64) -> Self {
        let mut sorted: Vec<f64> = values.collect();
        sorted.sort_by(f64::total_cmp);

        let mut representatives: Vec<f64> = Vec::new();
        for value in sorted {
            match representatives.last() {
                Some(last) if value - last <= tolerance => {}
                _ => representatives.push(value),
            }
        }
        Self { representatives }
    }

    fn len(&self) -> usize {
        self.representatives.len()
    }

    fn origin(&self) -> f64 {
        self.representatives.first().copied().unwrap_or_default()
    }

    fn index_of(&self, value: f64) -> usize {
        self.representatives
            .partition_point(|representative| *representative <= value)
            .saturating_sub(1)
    }

    fn steps(&self) -> Vec<f64> {
        self.representatives
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .collect()
    }

    /// Returns the most common step and the fraction of steps within
    /// `tolerance` of it. A single cluster has no step and full consistency.
    fn pitch(&self, tolerance: f64) -> (Option<f64>, f64) {
        let steps = self.steps();
        let mut best: Option<(f64, usize)> = None;
        for step in &steps {
            let agreeing = steps
                .iter()
                .filter(|other| (*other - step).abs() <= tolerance)
                .count();
            if best.is_none_or(|(_, count)| agreeing > count) {
                best = Some((*step, agreeing));
            }
        }
        match best {
            Some((step, agreeing)) => (Some(step), agreeing as f64 / steps.len() as f64),
            None => (None, 1.0),
        }
    }
}

/// Returns the shared size when every value is within `tolerance` of the first.
fn uniform(mut values: impl Iterator<Item = f64>, tolerance: f64) -> Option<f64> {
    let first = values.next()?;
    values
        .all(|value| (value - first).abs() <= tolerance)
        .then_some(first)
}

/// Looks for a regular arrangement of the given instance boxes.
///
/// # Arguments
///
/// * `id` - Identifier given to the resulting [`GridLayout`].
/// * `members` - Instance ids with their layout box, if any.
/// * `config` - Tolerance and acceptance thresholds.
///
/// Candidates with fewer than `min_instances` members, or with a member
/// lacking finite geometry, are rejected with zero confidence.
///
/// # Examples
///
/// ```
/// # use stencil::{config::GridConfig, grid::{detect_grid, GridKind}};
/// # use stencil_core::geometry::LayoutBox;
/// let members: Vec<(&str, Option<LayoutBox>)> = [0.0, 110.0, 220.0, 330.0]
///     .iter()
///     .enumerate()
///     .map(|(i, x)| (["a", "b", "c", "d"][i], Some(LayoutBox::new(*x, 0.0, 100.0, 50.0))))
///     .collect();
///
/// let detection = detect_grid("grid-0", &members, &GridConfig::default());
/// let grid = detection.grid.unwrap();
/// assert_eq!(detection.kind, Some(GridKind::Row));
/// assert_eq!((grid.columns, grid.rows), (4, 1));
/// assert_eq!(grid.gap_x, 10.0);
/// ```
pub fn detect_grid(
    id: &str,
    members: &[(&str, Option<LayoutBox>)],
    config: &GridConfig,
) -> GridDetection {
    if members.len() < config.min_instances().max(1) {
        return GridDetection::insufficient();
    }
    let Some(boxes) = members
        .iter()
        .map(|(_, layout)| layout.filter(|layout| layout.is_finite()))
        .collect::<Option<Vec<LayoutBox>>>()
    else {
        debug!(grid = id; "Grid candidate lacks geometry");
        return GridDetection::insufficient();
    };

    let tolerance = config.tolerance();
    let xs = Axis::cluster(boxes.iter().map(|layout| layout.x()), tolerance);
    let ys = Axis::cluster(boxes.iter().map(|layout| layout.y()), tolerance);

    let kind = if ys.len() == 1 {
        GridKind::Row
    } else if xs.len() == 1 {
        GridKind::Column
    } else {
        GridKind::Matrix
    };

    let cells: Vec<GridPosition> = boxes
        .iter()
        .map(|layout| GridPosition::new(xs.index_of(layout.x()), ys.index_of(layout.y())))
        .collect();
    let occupied = cells.iter().collect::<BTreeSet<_>>().len();
    let fill = occupied as f64 / (xs.len() * ys.len()) as f64;

    let (pitch_x, consistency_x) = xs.pitch(tolerance);
    let (pitch_y, consistency_y) = ys.pitch(tolerance);
    let confidence = consistency_x * consistency_y * fill;

    if confidence < config.min_confidence() {
        debug!(grid = id, kind:? = kind, confidence = confidence; "Grid candidate rejected");
        return GridDetection {
            grid: None,
            confidence,
            kind: Some(kind),
        };
    }

    let column_width = uniform(boxes.iter().map(|layout| layout.width()), tolerance);
    let row_height = uniform(boxes.iter().map(|layout| layout.height()), tolerance);
    let gap_x = pitch_x.map_or(0.0, |pitch| pitch - column_width.unwrap_or(0.0));
    let gap_y = pitch_y.map_or(0.0, |pitch| pitch - row_height.unwrap_or(0.0));

    let positions: IndexMap<String, GridPosition> = members
        .iter()
        .zip(cells)
        .map(|((member_id, _), cell)| (member_id.to_string(), cell))
        .collect();

    debug!(
        grid = id,
        kind:? = kind,
        columns = xs.len(),
        rows = ys.len(),
        confidence = confidence;
        "Grid detected"
    );

    GridDetection {
        grid: Some(GridLayout {
            id: id.to_string(),
            columns: xs.len(),
            rows: ys.len(),
            column_width,
            row_height,
            gap_x,
            gap_y,
            origin_x: xs.origin(),
            origin_y: ys.origin(),
            positions,
            confidence,
        }),
        confidence,
        kind: Some(kind),
    }
}
