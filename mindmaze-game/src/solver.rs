//! Breadth-first routing through carved passages.
//!
//! Used by the autopilot tester and by tests that need to reach a specific cell. Cell types
//! are ignored: a route may run through locked gates, which the walker then has to answer.
use std::collections::VecDeque;

use crate::grid::{Direction, Grid, Position};

/// Shortest route from `from` to `to`, both ends included.
///
/// Returns `None` when either end is off-grid or no passage connects them.
#[must_use]
pub fn shortest_path(grid: &Grid, from: Position, to: Position) -> Option<Vec<Position>> {
    if !grid.contains(from) || !grid.contains(to) {
        return None;
    }
    let mut parent: Vec<Option<Position>> = vec![None; grid.len()];
    let mut seen = vec![false; grid.len()];
    seen[grid.index_of(from)] = true;
    let mut queue = VecDeque::from([from]);

    while let Some(pos) = queue.pop_front() {
        if pos == to {
            break;
        }
        for (dir, next) in grid.neighbors(pos) {
            let idx = grid.index_of(next);
            if seen[idx] || !grid.is_open(pos, dir) {
                continue;
            }
            seen[idx] = true;
            parent[idx] = Some(pos);
            queue.push_back(next);
        }
    }

    if !seen[grid.index_of(to)] {
        return None;
    }
    let mut path = vec![to];
    let mut cursor = to;
    while let Some(prev) = parent[grid.index_of(cursor)] {
        path.push(prev);
        cursor = prev;
    }
    path.reverse();
    Some(path)
}

/// Directions that walk `path` step by step. Non-adjacent pairs are skipped.
#[must_use]
pub fn path_directions(path: &[Position]) -> Vec<Direction> {
    path.windows(2)
        .filter_map(|pair| {
            let dx = i32::try_from(pair[1].x).ok()? - i32::try_from(pair[0].x).ok()?;
            let dy = i32::try_from(pair[1].y).ok()? - i32::try_from(pair[0].y).ok()?;
            Direction::from_delta(dx, dy)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn finds_route_in_hand_built_grid() {
        let mut grid = Grid::new(2, 2);
        grid.carve(Position::new(0, 0), Direction::Down);
        grid.carve(Position::new(0, 1), Direction::Right);
        grid.carve(Position::new(1, 1), Direction::Up);
        let path = shortest_path(&grid, Position::new(0, 0), Position::new(1, 0)).unwrap();
        assert_eq!(
            path,
            vec![
                Position::new(0, 0),
                Position::new(0, 1),
                Position::new(1, 1),
                Position::new(1, 0),
            ]
        );
        assert_eq!(
            path_directions(&path),
            vec![Direction::Down, Direction::Right, Direction::Up]
        );
    }

    #[test]
    fn disconnected_or_off_grid_has_no_route() {
        let grid = Grid::new(3, 3);
        assert_eq!(
            shortest_path(&grid, Position::new(0, 0), Position::new(2, 2)),
            None
        );
        assert_eq!(
            shortest_path(&grid, Position::new(0, 0), Position::new(3, 0)),
            None
        );
        assert_eq!(
            shortest_path(&grid, Position::new(1, 1), Position::new(1, 1)),
            Some(vec![Position::new(1, 1)])
        );
    }

    #[test]
    fn every_generated_maze_is_solvable() {
        for seed in 0..20 {
            let layout = generate(9, 7, &mut ChaCha20Rng::seed_from_u64(seed)).unwrap();
            let path = shortest_path(&layout.grid, layout.start, layout.end).unwrap();
            assert_eq!(path.first(), Some(&layout.start));
            assert_eq!(path.last(), Some(&layout.end));
            assert_eq!(path_directions(&path).len(), path.len() - 1);
        }
    }
}
