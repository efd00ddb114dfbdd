//! Plain-text maze rendering for logs, the tester and failing test output.
//!
//! Each cell is three characters wide. Glyphs: `@` player, `S` start, `E` end, `#` locked,
//! `+` opened gate, `.` visited floor. Under fog, unrevealed cells are drawn as solid `:`.
use std::fmt::Write as _;

use crate::grid::{Cell, CellType, Grid, Position};
use crate::visibility::FogView;

/// Render the whole grid, optionally marking the player.
#[must_use]
pub fn render_ascii(grid: &Grid, player: Option<Position>) -> String {
    render_with(grid, |cell| Some(glyph(cell, player)))
}

/// Render only what the fog reveals around the player.
#[must_use]
pub fn render_fogged(view: &FogView<'_>) -> String {
    let player = Some(view.player());
    render_with(view.grid(), |cell| {
        view.at(cell.position())
            .filter(|visibility| visibility.is_revealed())
            .map(|_| glyph(cell, player))
    })
}

fn glyph(cell: &Cell, player: Option<Position>) -> char {
    if player == Some(cell.position()) {
        return '@';
    }
    match cell.kind {
        CellType::Start => 'S',
        CellType::End => 'E',
        CellType::Locked => '#',
        CellType::Open => '+',
        CellType::Empty if cell.visited => '.',
        CellType::Empty => ' ',
    }
}

/// `reveal` returns `None` for cells whose walls and contents must stay hidden.
fn render_with<F>(grid: &Grid, reveal: F) -> String
where
    F: Fn(&Cell) -> Option<char>,
{
    let mut out = String::new();
    if grid.is_empty() {
        return out;
    }
    out.push('+');
    for _ in 0..grid.cols() {
        out.push_str("---+");
    }
    out.push('\n');

    for row in grid.rows_iter() {
        let mut body = String::from("|");
        let mut floor = String::from("+");
        for cell in row {
            match reveal(cell) {
                Some(ch) => {
                    let _ = write!(body, " {ch} ");
                    body.push(if cell.walls.right { '|' } else { ' ' });
                    floor.push_str(if cell.walls.bottom { "---" } else { "   " });
                }
                None => {
                    body.push_str(":::|");
                    floor.push_str("---");
                }
            }
            floor.push('+');
        }
        out.push_str(&body);
        out.push('\n');
        out.push_str(&floor);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VisibilityConfig;
    use crate::grid::Direction;

    #[test]
    fn draws_walls_and_glyphs() {
        let mut grid = Grid::new(2, 2);
        grid.carve(Position::new(0, 0), Direction::Right);
        grid.carve(Position::new(1, 0), Direction::Down);
        grid.carve(Position::new(1, 1), Direction::Left);
        grid.set_kind(Position::new(0, 0), CellType::Start);
        grid.set_kind(Position::new(1, 1), CellType::End);
        grid.set_kind(Position::new(0, 1), CellType::Locked);

        let text = render_ascii(&grid, Some(Position::new(1, 0)));
        let expected = "\
+---+---+
| S   @ |
+---+   +
| #   E |
+---+---+
";
        assert_eq!(text, expected);
    }

    #[test]
    fn fog_hides_far_cells() {
        let grid = Grid::new(8, 1);
        let cfg = VisibilityConfig::default();
        let view = FogView::new(&grid, Position::new(0, 0), &cfg);
        let text = render_fogged(&view);
        let body = text.lines().nth(1).unwrap();
        assert!(body.starts_with("| @ |"));
        assert!(body.ends_with(":::|:::|"));
    }

    #[test]
    fn empty_grid_renders_nothing() {
        assert!(render_ascii(&Grid::new(0, 0), None).is_empty());
    }
}
