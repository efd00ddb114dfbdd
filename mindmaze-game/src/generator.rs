//! Maze generation: randomized recursive backtracker plus locked-gate scattering.
//!
//! Carving walks a depth-first stack from `(0, 0)`, always extending from the top of the
//! stack into a random unvisited neighbour and popping when none remain. Every cell is
//! entered exactly once, so exactly `cols * rows - 1` walls are removed and the passage
//! graph is a spanning tree.
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::VecDeque;
use thiserror::Error;

use crate::config::MazeConfig;
use crate::grid::{CellType, Direction, Grid, Position};
use crate::numbers::floor_fraction;

/// Generated level: the grid plus its start and end coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeLayout {
    pub grid: Grid,
    pub start: Position,
    pub end: Position,
}

/// Knobs for a single generation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorParams {
    pub locked_fraction: f64,
    pub max_placement_attempts_per_cell: usize,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self::from(&MazeConfig::default())
    }
}

impl From<&MazeConfig> for GeneratorParams {
    fn from(cfg: &MazeConfig) -> Self {
        Self {
            locked_fraction: cfg.locked_fraction,
            max_placement_attempts_per_cell: cfg.max_placement_attempts_per_cell,
        }
    }
}

/// Fatal construction errors. Gameplay never produces these.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("maze dimensions must be positive (got {cols}x{rows})")]
    EmptyGrid { cols: usize, rows: usize },
    #[error("cannot place {requested} locked gates: only {eligible} eligible cells")]
    NotEnoughCells { requested: usize, eligible: usize },
    #[error("placed {placed} of {requested} locked gates before exhausting {attempts} attempts")]
    PlacementExhausted {
        placed: usize,
        requested: usize,
        attempts: usize,
    },
}

/// Generate a maze with the default gate fraction.
///
/// # Errors
///
/// Returns `GenerationError` for zero dimensions or when gates cannot be placed.
pub fn generate<R: Rng + ?Sized>(
    cols: usize,
    rows: usize,
    rng: &mut R,
) -> Result<MazeLayout, GenerationError> {
    generate_with(cols, rows, GeneratorParams::default(), rng)
}

/// Generate a maze with explicit parameters.
///
/// # Errors
///
/// Returns `GenerationError` for zero dimensions or when gates cannot be placed.
pub fn generate_with<R: Rng + ?Sized>(
    cols: usize,
    rows: usize,
    params: GeneratorParams,
    rng: &mut R,
) -> Result<MazeLayout, GenerationError> {
    if cols == 0 || rows == 0 {
        return Err(GenerationError::EmptyGrid { cols, rows });
    }

    let mut grid = Grid::new(cols, rows);
    let carved = carve_passages(&mut grid, rng);
    debug_assert_eq!(carved, cols * rows - 1);

    grid.clear_visited();

    let start = Position::new(0, 0);
    let end = Position::new(cols - 1, rows - 1);
    grid.set_kind(start, CellType::Start);
    grid.set_kind(end, CellType::End);

    let requested = floor_fraction(grid.len(), params.locked_fraction);
    place_locked_gates(&mut grid, requested, params.max_placement_attempts_per_cell, rng)?;

    log::debug!("generated {cols}x{rows} maze: {carved} passages, {requested} locked gates");
    Ok(MazeLayout { grid, start, end })
}

/// Depth-first carve from the origin. Returns the number of walls removed.
fn carve_passages<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) -> usize {
    let mut seen = vec![false; grid.len()];
    let origin = Position::new(0, 0);
    seen[grid.index_of(origin)] = true;
    let mut stack = vec![origin];
    let mut carved = 0;

    while let Some(&current) = stack.last() {
        let candidates: SmallVec<[(Direction, Position); 4]> = grid
            .neighbors(current)
            .into_iter()
            .filter(|(_, next)| !seen[grid.index_of(*next)])
            .collect();

        if candidates.is_empty() {
            stack.pop();
            continue;
        }

        let (dir, next) = candidates[rng.gen_range(0..candidates.len())];
        grid.carve(current, dir);
        seen[grid.index_of(next)] = true;
        stack.push(next);
        carved += 1;
    }

    carved
}

/// Rejection-sample `requested` distinct `Empty` cells (never the origin) and lock them.
fn place_locked_gates<R: Rng + ?Sized>(
    grid: &mut Grid,
    requested: usize,
    attempts_per_cell: usize,
    rng: &mut R,
) -> Result<(), GenerationError> {
    if requested == 0 {
        return Ok(());
    }

    let eligible = grid
        .cells()
        .filter(|cell| cell.kind == CellType::Empty && !(cell.x == 0 && cell.y == 0))
        .count();
    if requested > eligible {
        return Err(GenerationError::NotEnoughCells {
            requested,
            eligible,
        });
    }

    let max_attempts = grid.len().saturating_mul(attempts_per_cell);
    let (cols, rows) = (grid.cols(), grid.rows());
    let mut placed = 0;
    let mut attempts = 0;

    while placed < requested {
        if attempts >= max_attempts {
            return Err(GenerationError::PlacementExhausted {
                placed,
                requested,
                attempts,
            });
        }
        attempts += 1;

        let pos = Position::new(rng.gen_range(0..cols), rng.gen_range(0..rows));
        let is_candidate = pos != Position::new(0, 0)
            && grid
                .get(pos)
                .is_some_and(|cell| cell.kind == CellType::Empty);
        if is_candidate {
            grid.set_kind(pos, CellType::Locked);
            placed += 1;
        }
    }

    Ok(())
}

/// Cells reachable from `from` through carved passages, ignoring cell types.
#[must_use]
pub fn reachable_count(grid: &Grid, from: Position) -> usize {
    if !grid.contains(from) {
        return 0;
    }
    let mut seen = vec![false; grid.len()];
    seen[grid.index_of(from)] = true;
    let mut queue = VecDeque::from([from]);
    let mut count = 0;

    while let Some(pos) = queue.pop_front() {
        count += 1;
        for (dir, next) in grid.neighbors(pos) {
            let idx = grid.index_of(next);
            if grid.is_open(pos, dir) && !seen[idx] {
                seen[idx] = true;
                queue.push_back(next);
            }
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn rng(seed: u64) -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(seed)
    }

    #[test]
    fn spanning_tree_over_many_sizes() {
        for (cols, rows) in [(1, 1), (1, 5), (5, 1), (2, 2), (3, 3), (8, 8), (12, 7), (18, 27)] {
            let layout = generate(cols, rows, &mut rng(cols as u64 * 31 + rows as u64)).unwrap();
            assert_eq!(layout.grid.passage_count(), cols * rows - 1);
            assert_eq!(reachable_count(&layout.grid, layout.start), cols * rows);
        }
    }

    #[test]
    fn walls_agree_between_neighbours() {
        let layout = generate(10, 9, &mut rng(5)).unwrap();
        let grid = &layout.grid;
        for cell in grid.cells() {
            let pos = cell.position();
            for (dir, next) in grid.neighbors(pos) {
                assert_eq!(
                    grid.is_open(pos, dir),
                    grid.is_open(next, dir.opposite()),
                    "asymmetric wall between {pos:?} and {next:?}"
                );
            }
        }
    }

    #[test]
    fn border_walls_stay_closed() {
        let layout = generate(6, 4, &mut rng(17)).unwrap();
        let grid = &layout.grid;
        for cell in grid.cells() {
            if cell.y == 0 {
                assert!(cell.walls.top);
            }
            if cell.x == 0 {
                assert!(cell.walls.left);
            }
            if cell.y == grid.rows() - 1 {
                assert!(cell.walls.bottom);
            }
            if cell.x == grid.cols() - 1 {
                assert!(cell.walls.right);
            }
        }
    }

    #[test]
    fn start_end_and_gate_counts() {
        for (cols, rows) in [(2, 1), (3, 3), (6, 6), (8, 8), (13, 9)] {
            let layout = generate(cols, rows, &mut rng(99)).unwrap();
            let grid = &layout.grid;
            assert_eq!(layout.start, Position::new(0, 0));
            assert_eq!(layout.end, Position::new(cols - 1, rows - 1));
            assert_eq!(grid.get(layout.start).unwrap().kind, CellType::Start);
            assert_eq!(grid.get(layout.end).unwrap().kind, CellType::End);
            assert_eq!(grid.count_kind(CellType::Start), 1);
            assert_eq!(grid.count_kind(CellType::End), 1);
            assert_eq!(
                grid.count_kind(CellType::Locked),
                floor_fraction(cols * rows, 0.15)
            );
            assert!(grid.cells().all(|cell| !cell.visited));
        }
    }

    #[test]
    fn single_cell_maze_is_start_then_end() {
        let layout = generate(1, 1, &mut rng(1)).unwrap();
        assert_eq!(layout.start, layout.end);
        // End is written last and wins on the shared cell.
        assert_eq!(layout.grid.get(layout.start).unwrap().kind, CellType::End);
        assert_eq!(layout.grid.count_kind(CellType::Locked), 0);
    }

    #[test]
    fn same_seed_same_maze() {
        let a = generate(11, 7, &mut rng(2024)).unwrap();
        let b = generate(11, 7, &mut rng(2024)).unwrap();
        let c = generate(11, 7, &mut rng(2025)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.grid, c.grid);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert_eq!(
            generate(0, 4, &mut rng(1)),
            Err(GenerationError::EmptyGrid { cols: 0, rows: 4 })
        );
    }

    #[test]
    fn oversubscribed_gates_fail_fast() {
        let params = GeneratorParams {
            locked_fraction: 1.0,
            max_placement_attempts_per_cell: 64,
        };
        assert_eq!(
            generate_with(2, 2, params, &mut rng(3)),
            Err(GenerationError::NotEnoughCells {
                requested: 4,
                eligible: 2
            })
        );
    }

    #[test]
    fn placement_cap_is_enforced() {
        let params = GeneratorParams {
            locked_fraction: 0.5,
            max_placement_attempts_per_cell: 0,
        };
        assert!(matches!(
            generate_with(4, 4, params, &mut rng(3)),
            Err(GenerationError::PlacementExhausted { placed: 0, .. })
        ));
    }
}
