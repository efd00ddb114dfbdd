//! Grid primitives: positions, directions, walls and the cell arena.
//!
//! The grid is stored row-major in a single `Vec<Cell>` indexed by `y * cols + x`.
//! Topology (walls) is fixed once the generator hands the grid over; afterwards only
//! `visited` and the `Locked -> Open` transition change.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

/// Grid coordinate. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Neighbouring position one step in `dir`, or `None` when it would leave `cols × rows`.
    #[must_use]
    pub fn step(self, dir: Direction, cols: usize, rows: usize) -> Option<Self> {
        let (dx, dy) = dir.delta();
        let x = self.x.checked_add_signed(dx as isize)?;
        let y = self.y.checked_add_signed(dy as isize)?;
        (x < cols && y < rows).then_some(Self { x, y })
    }
}

/// Orthogonal movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Neighbour scan order used by the generator.
    pub const ALL: [Self; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
        }
    }

    /// Map a unit step back to its direction. Diagonals and zero steps have none.
    #[must_use]
    pub const fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Self::Up),
            (1, 0) => Some(Self::Right),
            (0, 1) => Some(Self::Down),
            (-1, 0) => Some(Self::Left),
            _ => None,
        }
    }

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
        }
    }
}

/// Four independent wall flags. All present until carved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Walls {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Walls {
    pub const CLOSED: Self = Self {
        top: true,
        right: true,
        bottom: true,
        left: true,
    };

    #[must_use]
    pub const fn has(self, dir: Direction) -> bool {
        match dir {
            Direction::Up => self.top,
            Direction::Right => self.right,
            Direction::Down => self.bottom,
            Direction::Left => self.left,
        }
    }

    fn clear(&mut self, dir: Direction) {
        match dir {
            Direction::Up => self.top = false,
            Direction::Right => self.right = false,
            Direction::Down => self.bottom = false,
            Direction::Left => self.left = false,
        }
    }
}

impl Default for Walls {
    fn default() -> Self {
        Self::CLOSED
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellType {
    #[default]
    Empty,
    Start,
    End,
    /// Requires a correct challenge answer before it can be entered.
    Locked,
    /// A previously locked cell. Never reverts.
    Open,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
    pub walls: Walls,
    #[serde(rename = "type")]
    pub kind: CellType,
    /// Set once the player has physically occupied the cell.
    pub visited: bool,
}

impl Cell {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self {
            x,
            y,
            walls: Walls::CLOSED,
            kind: CellType::Empty,
            visited: false,
        }
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    #[must_use]
    pub const fn is_locked(&self) -> bool {
        matches!(self.kind, CellType::Locked)
    }
}

/// Fixed-size `cols × rows` arena of cells.
///
/// Deserialized grids are checked: the arena must hold exactly `cols * rows` cells in
/// row-major order, and shared walls must agree on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

/// Why a serialized grid was refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("a {cols}x{rows} grid needs {expected} cells, found {found}")]
    CellCount {
        cols: usize,
        rows: usize,
        expected: usize,
        found: usize,
    },
    #[error("cell {index} claims ({x}, {y}), out of row-major order")]
    Misplaced { index: usize, x: usize, y: usize },
    #[error("wall between ({x}, {y}) and its {direction:?} neighbour is one-sided")]
    OneSidedWall {
        x: usize,
        y: usize,
        direction: Direction,
    },
}

#[derive(Deserialize)]
struct RawGrid {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl TryFrom<RawGrid> for Grid {
    type Error = GridError;

    fn try_from(raw: RawGrid) -> Result<Self, Self::Error> {
        let RawGrid { cols, rows, cells } = raw;
        let expected = cols.checked_mul(rows).unwrap_or(usize::MAX);
        if cells.len() != expected {
            return Err(GridError::CellCount {
                cols,
                rows,
                expected,
                found: cells.len(),
            });
        }
        for (index, cell) in cells.iter().enumerate() {
            let slot = cell.y.checked_mul(cols).and_then(|row| row.checked_add(cell.x));
            if cell.x >= cols || slot != Some(index) {
                return Err(GridError::Misplaced {
                    index,
                    x: cell.x,
                    y: cell.y,
                });
            }
        }
        let grid = Self { cols, rows, cells };
        for cell in &grid.cells {
            let pos = cell.position();
            for direction in [Direction::Right, Direction::Down] {
                let Some(next) = pos.step(direction, cols, rows).and_then(|p| grid.get(p)) else {
                    continue;
                };
                if cell.walls.has(direction) != next.walls.has(direction.opposite()) {
                    return Err(GridError::OneSidedWall {
                        x: pos.x,
                        y: pos.y,
                        direction,
                    });
                }
            }
        }
        Ok(grid)
    }
}

impl Grid {
    /// Fully walled grid with every cell `Empty`.
    #[must_use]
    pub fn new(cols: usize, rows: usize) -> Self {
        let cells = (0..rows)
            .flat_map(|y| (0..cols).map(move |x| Cell::new(x, y)))
            .collect();
        Self { cols, rows, cells }
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[must_use]
    pub const fn contains(&self, pos: Position) -> bool {
        pos.x < self.cols && pos.y < self.rows
    }

    #[must_use]
    pub const fn index_of(&self, pos: Position) -> usize {
        pos.y * self.cols + pos.x
    }

    #[must_use]
    pub fn get(&self, pos: Position) -> Option<&Cell> {
        if self.contains(pos) {
            self.cells.get(self.index_of(pos))
        } else {
            None
        }
    }

    pub(crate) fn get_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        if self.contains(pos) {
            let idx = self.index_of(pos);
            self.cells.get_mut(idx)
        } else {
            None
        }
    }

    /// Iterate cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Iterate rows as slices, top to bottom.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.cols.max(1))
    }

    /// In-bounds neighbours of `pos`, in `Direction::ALL` order.
    #[must_use]
    pub fn neighbors(&self, pos: Position) -> SmallVec<[(Direction, Position); 4]> {
        Direction::ALL
            .iter()
            .filter_map(|&dir| pos.step(dir, self.cols, self.rows).map(|next| (dir, next)))
            .collect()
    }

    /// Whether the wall on `pos`'s `dir` side has been carved away.
    #[must_use]
    pub fn is_open(&self, pos: Position, dir: Direction) -> bool {
        self.get(pos).is_some_and(|cell| !cell.walls.has(dir))
    }

    /// Remove the wall between `pos` and its neighbour in `dir`, on both cells.
    ///
    /// Returns `false` without touching anything when the neighbour is off-grid.
    pub fn carve(&mut self, pos: Position, dir: Direction) -> bool {
        let Some(next) = pos.step(dir, self.cols, self.rows) else {
            return false;
        };
        if let Some(cell) = self.get_mut(pos) {
            cell.walls.clear(dir);
        }
        if let Some(cell) = self.get_mut(next) {
            cell.walls.clear(dir.opposite());
        }
        true
    }

    /// Count of carved passages, each shared wall counted once.
    #[must_use]
    pub fn passage_count(&self) -> usize {
        self.cells
            .iter()
            .map(|cell| usize::from(!cell.walls.right) + usize::from(!cell.walls.bottom))
            .sum()
    }

    /// Overwrite the type of the cell at `pos`. Off-grid positions are ignored.
    pub fn set_kind(&mut self, pos: Position, kind: CellType) {
        if let Some(cell) = self.get_mut(pos) {
            cell.kind = kind;
        }
    }

    pub(crate) fn mark_visited(&mut self, pos: Position) {
        if let Some(cell) = self.get_mut(pos) {
            cell.visited = true;
        }
    }

    pub(crate) fn clear_visited(&mut self) {
        for cell in &mut self.cells {
            cell.visited = false;
        }
    }

    #[must_use]
    pub fn count_kind(&self, kind: CellType) -> usize {
        self.cells.iter().filter(|cell| cell.kind == kind).count()
    }
}
