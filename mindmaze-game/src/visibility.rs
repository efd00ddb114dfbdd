//! Fog of war: how much of each cell the presentation layer may reveal.
use serde::{Deserialize, Serialize};

use crate::config::VisibilityConfig;
use crate::grid::{Cell, Grid, Position};
use crate::numbers::grid_distance;

/// Reveal level for a single cell relative to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Right next to the player.
    Visible,
    /// Inside sight radius.
    Dimmed,
    /// Out of sight but previously occupied.
    Remembered,
    Hidden,
}

impl Visibility {
    /// Whether walls and cell type may be drawn at all.
    #[must_use]
    pub const fn is_revealed(self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

/// Classify `cell` as seen from `player`.
#[must_use]
pub fn classify(cell: &Cell, player: Position, cfg: &VisibilityConfig) -> Visibility {
    let distance = grid_distance(cell.x, cell.y, player.x, player.y);
    if distance < cfg.near_radius {
        Visibility::Visible
    } else if distance <= cfg.sight_radius {
        Visibility::Dimmed
    } else if cell.visited {
        Visibility::Remembered
    } else {
        Visibility::Hidden
    }
}

/// Read-only projection of a grid through the fog.
#[derive(Debug, Clone, Copy)]
pub struct FogView<'a> {
    grid: &'a Grid,
    player: Position,
    cfg: &'a VisibilityConfig,
}

impl<'a> FogView<'a> {
    #[must_use]
    pub const fn new(grid: &'a Grid, player: Position, cfg: &'a VisibilityConfig) -> Self {
        Self { grid, player, cfg }
    }

    #[must_use]
    pub const fn grid(&self) -> &'a Grid {
        self.grid
    }

    #[must_use]
    pub const fn player(&self) -> Position {
        self.player
    }

    #[must_use]
    pub fn at(&self, pos: Position) -> Option<Visibility> {
        self.grid
            .get(pos)
            .map(|cell| classify(cell, self.player, self.cfg))
    }

    /// Cells paired with their visibility, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (&'a Cell, Visibility)> + use<'a> {
        let (player, cfg) = (self.player, self.cfg);
        self.grid
            .cells()
            .map(move |cell| (cell, classify(cell, player, cfg)))
    }

    #[must_use]
    pub fn revealed_count(&self) -> usize {
        self.cells()
            .filter(|(_, visibility)| visibility.is_revealed())
            .count()
    }
}
