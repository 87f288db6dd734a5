//! Grid and world-space coordinates.
//!
//! The world is a rectangle of square tiles. [`GridCell`] addresses a tile;
//! [`WorldPos`] is a continuous position in world units. Conversion between
//! the two needs the tile size and lives with the grid in `snowglobe-world`.

use serde::{Deserialize, Serialize};

/// Integer coordinate of one tile.
///
/// Ordered by `(x, y)` so cells can key `BTreeMap`/`BTreeSet` collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct GridCell {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl GridCell {
    /// Create a cell from column and row.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance in cells. Saturates instead of overflowing.
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }

    /// The cell shifted by `(dx, dy)`, saturating at the `i32` range.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// The four orthogonal neighbours in a fixed order: right, left, down, up.
    pub const fn neighbors(self) -> [Self; 4] {
        [
            self.offset(1, 0),
            self.offset(-1, 0),
            self.offset(0, 1),
            self.offset(0, -1),
        ]
    }
}

impl core::fmt::Display for GridCell {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Continuous position in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPos {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl WorldPos {
    /// Create a position.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Straight-line distance to `other`.
    pub fn distance_to(self, other: Self) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Move toward `target` by at most `max_step`, never overshooting.
    pub fn step_toward(self, target: Self, max_step: f32) -> Self {
        let distance = self.distance_to(target);
        if distance <= max_step || distance <= f32::EPSILON {
            return target;
        }
        let ratio = max_step / distance;
        Self {
            x: (target.x - self.x).mul_add(ratio, self.x),
            y: (target.y - self.y).mul_add(ratio, self.y),
        }
    }
}

impl core::fmt::Display for WorldPos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}
