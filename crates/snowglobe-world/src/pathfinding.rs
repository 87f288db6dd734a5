//! A* search over a [`GridMap`].
//!
//! Movement is 4-directional with unit step cost and a Manhattan heuristic.
//! The open set is a `BTreeSet<(f, seq, cell)>`; `seq` is an insertion
//! counter, so entries with equal f-scores pop in FIFO order and repeated
//! queries on an unchanged grid return the same path.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use snowglobe_types::{GridCell, WorldPos};
use tracing::debug;

use crate::error::{PathFailure, WorldError};
use crate::grid::GridMap;

/// Find the shortest cell path from `start` to `goal`, both inclusive.
///
/// # Errors
///
/// Returns [`WorldError::PathUnreachable`] if either endpoint is out of
/// bounds or solid, or if no path exists.
pub fn find_path<M: GridMap + ?Sized>(
    map: &M,
    start: GridCell,
    goal: GridCell,
) -> Result<Vec<GridCell>, WorldError> {
    let fail = |reason| WorldError::PathUnreachable {
        from: start,
        to: goal,
        reason,
    };

    if !map.in_bounds(start) || !map.in_bounds(goal) {
        return Err(fail(PathFailure::OutOfBounds));
    }
    if !map.is_walkable(start) || !map.is_walkable(goal) {
        return Err(fail(PathFailure::Solid));
    }
    if start == goal {
        return Ok(vec![start]);
    }

    let mut g_score: BTreeMap<GridCell, u32> = BTreeMap::new();
    let mut came_from: BTreeMap<GridCell, GridCell> = BTreeMap::new();
    let mut closed: BTreeSet<GridCell> = BTreeSet::new();
    let mut open: BTreeSet<(u32, u64, GridCell)> = BTreeSet::new();
    let mut seq: u64 = 0;

    g_score.insert(start, 0);
    open.insert((start.manhattan(goal), seq, start));

    while let Some((_, _, current)) = open.pop_first() {
        if current == goal {
            return Ok(reconstruct(&came_from, start, goal));
        }
        if !closed.insert(current) {
            // Stale duplicate left behind by a later improvement.
            continue;
        }
        let current_g = g_score.get(&current).copied().unwrap_or(u32::MAX);

        for neighbor in current.neighbors() {
            if closed.contains(&neighbor) || !map.is_walkable(neighbor) {
                continue;
            }
            let Some(tentative) = current_g.checked_add(1) else {
                continue;
            };
            let improves = g_score
                .get(&neighbor)
                .is_none_or(|&existing| tentative < existing);
            if improves {
                g_score.insert(neighbor, tentative);
                came_from.insert(neighbor, current);
                seq = seq.saturating_add(1);
                let f = tentative.saturating_add(neighbor.manhattan(goal));
                open.insert((f, seq, neighbor));
            }
        }
    }

    Err(fail(PathFailure::NoRoute))
}

/// Find a path between two world positions and return it as world-space
/// waypoints (cell centres), starting with the start cell.
///
/// Returns an empty sequence when no path exists; the reason is logged at
/// debug level.
pub fn find_world_path<M: GridMap + ?Sized>(map: &M, from: WorldPos, to: WorldPos) -> Vec<WorldPos> {
    let start = map.world_to_cell(from);
    let goal = map.world_to_cell(to);
    match find_path(map, start, goal) {
        Ok(cells) => cells.into_iter().map(|c| map.cell_to_world(c)).collect(),
        Err(e) => {
            debug!(from = %start, to = %goal, error = %e, "No path");
            Vec::new()
        }
    }
}

fn reconstruct(
    came_from: &BTreeMap<GridCell, GridCell>,
    start: GridCell,
    goal: GridCell,
) -> Vec<GridCell> {
    let mut path = VecDeque::new();
    let mut current = goal;
    path.push_front(current);
    while let Some(&predecessor) = came_from.get(&current) {
        path.push_front(predecessor);
        current = predecessor;
        if current == start {
            break;
        }
    }
    path.into_iter().collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::grid::{Tile, TileGrid};

    fn open_5x5() -> TileGrid {
        TileGrid::filled(5, 5, 10.0, Tile::Grass).unwrap()
    }

    fn is_connected(path: &[GridCell]) -> bool {
        path.windows(2)
            .all(|w| matches!(w, [a, b] if a.manhattan(*b) == 1))
    }

    #[test]
    fn open_grid_path_has_manhattan_length() {
        let grid = open_5x5();
        let path = find_path(&grid, GridCell::new(0, 0), GridCell::new(4, 4)).unwrap();
        assert_eq!(path.len(), 9);
        assert_eq!(path.first(), Some(&GridCell::new(0, 0)));
        assert_eq!(path.last(), Some(&GridCell::new(4, 4)));
        assert!(is_connected(&path));
    }

    #[test]
    fn solid_goal_yields_no_path() {
        let mut grid = open_5x5();
        grid.set_tile(GridCell::new(4, 4), Tile::Stone).unwrap();
        let result = find_path(&grid, GridCell::new(0, 0), GridCell::new(4, 4));
        assert!(matches!(
            result,
            Err(WorldError::PathUnreachable {
                reason: PathFailure::Solid,
                ..
            })
        ));
        let waypoints = find_world_path(&grid, WorldPos::new(5.0, 5.0), WorldPos::new(45.0, 45.0));
        assert!(waypoints.is_empty());
    }

    #[test]
    fn out_of_bounds_endpoint_yields_no_path() {
        let grid = open_5x5();
        let result = find_path(&grid, GridCell::new(0, 0), GridCell::new(5, 0));
        assert!(matches!(
            result,
            Err(WorldError::PathUnreachable {
                reason: PathFailure::OutOfBounds,
                ..
            })
        ));
    }

    #[test]
    fn walled_off_goal_is_unreachable() {
        let grid = TileGrid::from_ascii(&["..#..", "..#..", "..#.."], 10.0).unwrap();
        let result = find_path(&grid, GridCell::new(0, 0), GridCell::new(4, 2));
        assert!(matches!(
            result,
            Err(WorldError::PathUnreachable {
                reason: PathFailure::NoRoute,
                ..
            })
        ));
    }

    #[test]
    fn path_routes_around_walls() {
        let grid = TileGrid::from_ascii(&[".....", ".###.", "....."], 10.0).unwrap();
        let path = find_path(&grid, GridCell::new(0, 1), GridCell::new(4, 1)).unwrap();
        // Around the wall: up or down one row, across four, back one.
        assert_eq!(path.len(), 7);
        assert!(is_connected(&path));
        assert!(path.iter().all(|c| grid.is_walkable(*c)));
    }

    #[test]
    fn repeated_queries_are_identical() {
        let grid = open_5x5();
        let first = find_path(&grid, GridCell::new(0, 4), GridCell::new(4, 0)).unwrap();
        for _ in 0..5 {
            let again = find_path(&grid, GridCell::new(0, 4), GridCell::new(4, 0)).unwrap();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn start_equals_goal() {
        let grid = open_5x5();
        let path = find_path(&grid, GridCell::new(2, 2), GridCell::new(2, 2)).unwrap();
        assert_eq!(path, vec![GridCell::new(2, 2)]);
    }

    #[test]
    fn world_path_uses_cell_centres() {
        let grid = open_5x5();
        let waypoints = find_world_path(&grid, WorldPos::new(1.0, 1.0), WorldPos::new(21.0, 1.0));
        assert_eq!(waypoints.len(), 3);
        let last = waypoints.last().copied().unwrap();
        assert!((last.x - 25.0).abs() < f32::EPSILON);
        assert!((last.y - 5.0).abs() < f32::EPSILON);
    }
}
