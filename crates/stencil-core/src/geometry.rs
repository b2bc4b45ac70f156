//! Geometric primitives for node placement.
//!
//! # Overview
//!
//! - [`LayoutBox`] - An axis-aligned box given by its top-left corner and size
//! - [`GridPosition`] - A `(column, row)` cell inside a detected grid
//!
//! # Coordinate System
//!
//! Design exports use screen coordinates:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! Coordinates may be negative; no origin is assumed.

use serde::{Deserialize, Serialize};

/// An axis-aligned layout box in design coordinates.
///
/// # Examples
///
/// ```
/// # use stencil_core::geometry::LayoutBox;
/// let bounds = LayoutBox::new(10.0, 20.0, 100.0, 50.0);
/// assert_eq!(bounds.max_x(), 110.0);
/// assert_eq!(bounds.max_y(), 70.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutBox {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl LayoutBox {
    /// Creates a new layout box from its top-left corner and size
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the x-coordinate of the left edge
    pub fn x(self) -> f64 {
        self.x
    }

    /// Returns the y-coordinate of the top edge
    pub fn y(self) -> f64 {
        self.y
    }

    /// Returns the width of the box
    pub fn width(self) -> f64 {
        self.width
    }

    /// Returns the height of the box
    pub fn height(self) -> f64 {
        self.height
    }

    /// Returns the x-coordinate of the right edge
    pub fn max_x(self) -> f64 {
        self.x + self.width
    }

    /// Returns the y-coordinate of the bottom edge
    pub fn max_y(self) -> f64 {
        self.y + self.height
    }

    /// Returns a copy moved to the given top-left corner
    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Checks whether every coordinate and dimension is a finite number
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Checks whether the box has no area
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// A cell coordinate inside a grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    column: usize,
    row: usize,
}

impl GridPosition {
    /// Creates a new grid position
    pub fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }

    /// Returns the zero-based column index
    pub fn column(self) -> usize {
        self.column
    }

    /// Returns the zero-based row index
    pub fn row(self) -> usize {
        self.row
    }
}
