//! Tile grid, walkability, and grid/world coordinate conversion.
//!
//! The world is a `width` x `height` rectangle of square tiles of side
//! `tile_size` world units, with cell `(0, 0)` at the world origin. A cell's
//! world position is its centre. Only grass tiles are walkable; water and
//! stone are solid.

use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};
use snowglobe_types::{GridCell, WorldPos};

use crate::error::WorldError;

/// Number of random probes before [`TileGrid::random_walkable_cell`] gives up.
pub const RANDOM_CELL_ATTEMPTS: u32 = 100;

/// Default tile side length in world units.
pub const DEFAULT_TILE_SIZE: f32 = 64.0;

// ---------------------------------------------------------------------------
// GridMap
// ---------------------------------------------------------------------------

/// Walkability and coordinate conversion over a grid of cells.
///
/// Pathfinding and the interaction gate only see the world through this
/// trait, so tests can supply tiny hand-built maps.
pub trait GridMap {
    /// Whether `cell` lies inside the grid.
    fn in_bounds(&self, cell: GridCell) -> bool;

    /// Whether `cell` can be walked on. Out-of-bounds cells are not walkable.
    fn is_walkable(&self, cell: GridCell) -> bool;

    /// World position of the centre of `cell`.
    fn cell_to_world(&self, cell: GridCell) -> WorldPos;

    /// The cell containing `pos`.
    fn world_to_cell(&self, pos: WorldPos) -> GridCell;
}

// ---------------------------------------------------------------------------
// Tile
// ---------------------------------------------------------------------------

/// Terrain of a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tile {
    /// Open ground.
    #[default]
    Grass,
    /// Open water.
    Water,
    /// Rock.
    Stone,
}

impl Tile {
    /// Look up a tile by its tileset name. Unknown names are stone.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Grass" => Self::Grass,
            "Water" => Self::Water,
            _ => Self::Stone,
        }
    }

    /// Parse one character of an ASCII map: `.` grass, `~` water, anything
    /// else stone.
    pub const fn from_ascii(c: char) -> Self {
        match c {
            '.' => Self::Grass,
            '~' => Self::Water,
            _ => Self::Stone,
        }
    }

    /// Tileset name of this tile.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Grass => "Grass",
            Self::Water => "Water",
            Self::Stone => "Stone",
        }
    }

    /// Only grass is walkable.
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Grass)
    }
}

/// One entry of a [`TileGrid::nearby_cells`] scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellInfo {
    /// The cell.
    pub cell: GridCell,
    /// Its terrain.
    pub tile: Tile,
    /// Whether it can be walked on.
    pub walkable: bool,
}

// ---------------------------------------------------------------------------
// TileGrid
// ---------------------------------------------------------------------------

/// A rectangular grid of tiles stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tile_size: f32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// A grid where every cell holds `tile`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidGrid`] if a dimension is zero, the cell
    /// count overflows, or `tile_size` is not positive.
    pub fn filled(width: u32, height: u32, tile_size: f32, tile: Tile) -> Result<Self, WorldError> {
        let count = cell_count(width, height)?;
        validate_tile_size(tile_size)?;
        Ok(Self {
            width,
            height,
            tile_size,
            tiles: vec![tile; count],
        })
    }

    /// Build a grid from ASCII rows (see [`Tile::from_ascii`]).
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidGrid`] if there are no rows, the rows
    /// differ in length, or `tile_size` is not positive.
    pub fn from_ascii(rows: &[&str], tile_size: f32) -> Result<Self, WorldError> {
        let first = rows.first().ok_or_else(|| WorldError::InvalidGrid {
            reason: String::from("no rows"),
        })?;
        let row_len = first.chars().count();
        let mut tiles = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != row_len {
                return Err(WorldError::InvalidGrid {
                    reason: format!("row {y} has {} cells, expected {row_len}", row.chars().count()),
                });
            }
            tiles.extend(row.chars().map(Tile::from_ascii));
        }
        let width = u32::try_from(row_len).map_err(|_e| WorldError::InvalidGrid {
            reason: String::from("row too long"),
        })?;
        let height = u32::try_from(rows.len()).map_err(|_e| WorldError::InvalidGrid {
            reason: String::from("too many rows"),
        })?;
        cell_count(width, height)?;
        validate_tile_size(tile_size)?;
        Ok(Self {
            width,
            height,
            tile_size,
            tiles,
        })
    }

    /// Grid width in cells.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Tile side length in world units.
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// The tile at `cell`, or `None` outside the grid.
    pub fn tile(&self, cell: GridCell) -> Option<Tile> {
        self.index(cell).and_then(|i| self.tiles.get(i).copied())
    }

    /// Replace the tile at `cell`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CellOutOfBounds`] if `cell` is outside the grid.
    pub fn set_tile(&mut self, cell: GridCell, tile: Tile) -> Result<(), WorldError> {
        let slot = self
            .index(cell)
            .and_then(|i| self.tiles.get_mut(i))
            .ok_or(WorldError::CellOutOfBounds(cell))?;
        *slot = tile;
        Ok(())
    }

    /// The middle cell of the grid.
    pub const fn center(&self) -> GridCell {
        GridCell::new(half(self.width), half(self.height))
    }

    /// Pick a random walkable cell, probing up to [`RANDOM_CELL_ATTEMPTS`]
    /// times and falling back to the grid centre.
    pub fn random_walkable_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> GridCell {
        let (Ok(w), Ok(h)) = (i32::try_from(self.width), i32::try_from(self.height)) else {
            return self.center();
        };
        for _ in 0..RANDOM_CELL_ATTEMPTS {
            let cell = GridCell::new(rng.random_range(0..w), rng.random_range(0..h));
            if self.is_walkable(cell) {
                return cell;
            }
        }
        self.center()
    }

    /// Every in-bounds cell within a square of side `2 * radius + 1` around
    /// `center`, scanned row by row. The scan is clipped to the grid first,
    /// so its cost is bounded by the grid size whatever the radius.
    pub fn nearby_cells(&self, center: GridCell, radius: u32) -> Vec<CellInfo> {
        let Some((xs, ys)) = self.clip_square(center, radius) else {
            return Vec::new();
        };
        let mut cells = Vec::new();
        for y in ys {
            for x in xs.clone() {
                let cell = GridCell::new(x, y);
                if let Some(tile) = self.tile(cell) {
                    cells.push(CellInfo {
                        cell,
                        tile,
                        walkable: tile.is_walkable(),
                    });
                }
            }
        }
        cells
    }

    /// Column and row ranges of the square around `center` that lie inside
    /// the grid, or `None` if they do not overlap.
    fn clip_square(
        &self,
        center: GridCell,
        radius: u32,
    ) -> Option<(RangeInclusive<i32>, RangeInclusive<i32>)> {
        let r = i64::from(radius);
        let clip = |c: i32, len: u32| -> Option<RangeInclusive<i32>> {
            let last = i64::from(len).checked_sub(1)?;
            let lo = i64::from(c).saturating_sub(r).max(0);
            let hi = i64::from(c).saturating_add(r).min(last);
            if lo > hi {
                return None;
            }
            Some(i32::try_from(lo).ok()?..=i32::try_from(hi).ok()?)
        };
        Some((clip(center.x, self.width)?, clip(center.y, self.height)?))
    }

    /// Row-major index of `cell`, or `None` outside the grid.
    fn index(&self, cell: GridCell) -> Option<usize> {
        let x = u32::try_from(cell.x).ok()?;
        let y = u32::try_from(cell.y).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = y.checked_mul(self.width)?.checked_add(x)?;
        usize::try_from(i).ok()
    }
}

impl GridMap for TileGrid {
    fn in_bounds(&self, cell: GridCell) -> bool {
        self.index(cell).is_some()
    }

    fn is_walkable(&self, cell: GridCell) -> bool {
        self.tile(cell).is_some_and(Tile::is_walkable)
    }

    #[allow(clippy::cast_precision_loss)]
    fn cell_to_world(&self, cell: GridCell) -> WorldPos {
        WorldPos::new(
            (cell.x as f32 + 0.5) * self.tile_size,
            (cell.y as f32 + 0.5) * self.tile_size,
        )
    }

    #[allow(clippy::cast_possible_truncation)]
    fn world_to_cell(&self, pos: WorldPos) -> GridCell {
        GridCell::new(
            (pos.x / self.tile_size).floor() as i32,
            (pos.y / self.tile_size).floor() as i32,
        )
    }
}

fn cell_count(width: u32, height: u32) -> Result<usize, WorldError> {
    if width == 0 || height == 0 {
        return Err(WorldError::InvalidGrid {
            reason: format!("dimensions must be non-zero, got {width}x{height}"),
        });
    }
    width
        .checked_mul(height)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| WorldError::InvalidGrid {
            reason: format!("{width}x{height} cells overflow"),
        })
}

fn validate_tile_size(tile_size: f32) -> Result<(), WorldError> {
    if tile_size.is_finite() && tile_size > 0.0 {
        Ok(())
    } else {
        Err(WorldError::InvalidGrid {
            reason: format!("tile size must be positive, got {tile_size}"),
        })
    }
}

const fn half(n: u32) -> i32 {
    let h = n / 2;
    if h > i32::MAX as u32 { i32::MAX } else { h as i32 }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn open_grid(w: u32, h: u32) -> TileGrid {
        TileGrid::filled(w, h, DEFAULT_TILE_SIZE, Tile::Grass).unwrap()
    }

    #[test]
    fn only_grass_is_walkable() {
        assert!(Tile::from_name("Grass").is_walkable());
        assert!(!Tile::from_name("Water").is_walkable());
        assert!(!Tile::from_name("Lava").is_walkable());
    }

    #[test]
    fn ascii_map_parses_terrain() {
        let grid = TileGrid::from_ascii(&["..~", "#..", "..."], 32.0).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.tile(GridCell::new(2, 0)), Some(Tile::Water));
        assert_eq!(grid.tile(GridCell::new(0, 1)), Some(Tile::Stone));
        assert!(grid.is_walkable(GridCell::new(1, 1)));
        assert!(!grid.is_walkable(GridCell::new(3, 0)));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        assert!(TileGrid::from_ascii(&["...", ".."], 32.0).is_err());
        assert!(TileGrid::from_ascii(&[], 32.0).is_err());
        assert!(TileGrid::filled(0, 4, 32.0, Tile::Grass).is_err());
        assert!(TileGrid::filled(4, 4, 0.0, Tile::Grass).is_err());
    }

    #[test]
    fn coordinate_conversion_round_trips_through_cell_centres() {
        let grid = open_grid(10, 10);
        let cell = GridCell::new(3, 7);
        let centre = grid.cell_to_world(cell);
        assert!((centre.x - 224.0).abs() < f32::EPSILON);
        assert!((centre.y - 480.0).abs() < f32::EPSILON);
        assert_eq!(grid.world_to_cell(centre), cell);
        assert_eq!(grid.world_to_cell(WorldPos::new(-1.0, 0.0)), GridCell::new(-1, 0));
    }

    #[test]
    fn set_tile_blocks_cell() {
        let mut grid = open_grid(3, 3);
        assert!(grid.set_tile(GridCell::new(1, 1), Tile::Stone).is_ok());
        assert!(!grid.is_walkable(GridCell::new(1, 1)));
        assert!(grid.set_tile(GridCell::new(5, 5), Tile::Stone).is_err());
    }

    #[test]
    fn random_cell_is_walkable() {
        let grid = TileGrid::from_ascii(&["~~~~", "~..~", "~~~~"], 16.0).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..20 {
            let cell = grid.random_walkable_cell(&mut rng);
            assert!(grid.is_walkable(cell));
        }
    }

    #[test]
    fn random_cell_falls_back_to_centre() {
        let grid = TileGrid::filled(5, 3, 16.0, Tile::Water).unwrap();
        let mut rng = SmallRng::seed_from_u64(7);
        assert_eq!(grid.random_walkable_cell(&mut rng), GridCell::new(2, 1));
    }

    #[test]
    fn nearby_cells_clip_to_grid() {
        let grid = open_grid(4, 4);
        assert_eq!(grid.nearby_cells(GridCell::new(0, 0), 1).len(), 4);
        assert_eq!(grid.nearby_cells(GridCell::new(2, 2), 1).len(), 9);
        assert_eq!(grid.nearby_cells(GridCell::new(2, 2), 0).len(), 1);
    }

    #[test]
    fn huge_radius_covers_grid_once() {
        let grid = open_grid(4, 4);
        let cells = grid.nearby_cells(GridCell::new(1, 1), u32::MAX);
        assert_eq!(cells.len(), 16);
        assert_eq!(cells.first().unwrap().cell, GridCell::new(0, 0));
        assert_eq!(cells.last().unwrap().cell, GridCell::new(3, 3));
    }

    #[test]
    fn centre_outside_grid_sees_only_overlap() {
        let grid = open_grid(4, 4);
        assert_eq!(grid.nearby_cells(GridCell::new(-2, 0), 2).len(), 3);
        assert!(grid.nearby_cells(GridCell::new(10, 10), 2).is_empty());
    }
}
