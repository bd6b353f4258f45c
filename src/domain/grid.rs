/// Grid model: positions, directions, and the two-layer cell grid.
///
/// ## Layer Architecture
///
/// Two layers, composed at write time:
///   - `floor`: what lies under dynamic entities (Floor, Wall, Target,
///     Marker). Built once from the level. **Never mutated.**
///   - `cells`: the visible grid, including Player / Box / Enemy.
///
/// Moving an entity off a cell is `vacate()`: the cell reverts to its
/// floor value. This is how a target reappears after the player or a
/// box leaves it.
///
/// Grids are cheap to clone and every tick works on a copy
/// (copy-on-write): the grid a previous tick published is never
/// written again.

use crate::error::{EngineError, LevelError};

use super::tile::Cell;
use super::variant::Variant;

// ── Position / Direction ──

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Pos { row, col }
    }

    /// One step in `dir`. `None` if that would leave the non-negative quadrant;
    /// the upper bound is checked against a grid, not here.
    pub fn step(self, dir: Dir) -> Option<Pos> {
        let (dr, dc) = dir.delta();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        Some(Pos { row, col })
    }

    pub fn manhattan(self, other: Pos) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    /// Fixed neighbour order. Search results depend on it.
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    /// (row, col) unit vector.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (-1, 0),
            Dir::Down => (1, 0),
            Dir::Left => (0, -1),
            Dir::Right => (0, 1),
        }
    }
}

// ── Grid ──

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    cells: Vec<Vec<Cell>>,
    floor: Vec<Vec<Cell>>,
    width: usize,
    height: usize,
}

impl Grid {
    /// Build a grid from level rows. Only checks shape and vocabulary;
    /// entity counts are the level loader's business.
    pub fn from_rows<S: AsRef<str>>(rows: &[S], variant: Variant) -> Result<Grid, LevelError> {
        if rows.is_empty() {
            return Err(LevelError::Empty);
        }
        let width = rows[0].as_ref().chars().count();
        if width == 0 {
            return Err(LevelError::Empty);
        }

        let mut cells = Vec::with_capacity(rows.len());
        let mut floor = Vec::with_capacity(rows.len());
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(LevelError::Ragged { row: r, expected: width, found });
            }
            let mut line = Vec::with_capacity(width);
            let mut under = Vec::with_capacity(width);
            for (c, ch) in row.chars().enumerate() {
                let cell = Cell::from_symbol(ch, variant)
                    .ok_or(LevelError::UnknownSymbol { row: r, col: c, symbol: ch })?;
                line.push(cell);
                under.push(if cell.is_dynamic() { Cell::Floor } else { cell });
            }
            cells.push(line);
            floor.push(under);
        }

        Ok(Grid { cells, floor, width, height: rows.len() })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.row < self.height && pos.col < self.width
    }

    /// Bounds-checked read.
    pub fn cell_at(&self, pos: Pos) -> Result<Cell, EngineError> {
        if self.in_bounds(pos) {
            Ok(self.cells[pos.row][pos.col])
        } else {
            Err(EngineError::OutOfBounds { row: pos.row, col: pos.col })
        }
    }

    /// Read that treats anything off the grid as wall.
    #[inline]
    pub fn get(&self, pos: Pos) -> Cell {
        self.cell_at(pos).unwrap_or(Cell::Wall)
    }

    /// What lies under whatever currently occupies `pos`.
    pub fn underlay_at(&self, pos: Pos) -> Result<Cell, EngineError> {
        if self.in_bounds(pos) {
            Ok(self.floor[pos.row][pos.col])
        } else {
            Err(EngineError::OutOfBounds { row: pos.row, col: pos.col })
        }
    }

    /// A copy of this grid with one cell replaced.
    pub fn with_cell(&self, pos: Pos, cell: Cell) -> Result<Grid, EngineError> {
        let mut next = self.clone();
        next.set(pos, cell)?;
        Ok(next)
    }

    /// In-place write. Only used on a tick's private working copy.
    pub(crate) fn set(&mut self, pos: Pos, cell: Cell) -> Result<(), EngineError> {
        if !self.in_bounds(pos) {
            return Err(EngineError::OutOfBounds { row: pos.row, col: pos.col });
        }
        self.cells[pos.row][pos.col] = cell;
        Ok(())
    }

    /// Revert `pos` to its floor value.
    pub(crate) fn vacate(&mut self, pos: Pos) -> Result<(), EngineError> {
        let under = self.underlay_at(pos)?;
        self.set(pos, under)
    }

    // ── Queries ──

    pub fn positions_of(&self, cell: Cell) -> Vec<Pos> {
        let mut found = Vec::new();
        for (r, row) in self.cells.iter().enumerate() {
            for (c, &here) in row.iter().enumerate() {
                if here == cell {
                    found.push(Pos::new(r, c));
                }
            }
        }
        found
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().flatten().filter(|&&c| c == cell).count()
    }

    /// Row-major scan for the player. The round tracks the player
    /// explicitly; this is for validation and consistency checks.
    pub fn find_player(&self) -> Option<Pos> {
        self.positions_of(Cell::Player).into_iter().next()
    }

    /// Target tiles not covered by a box (including ones under the
    /// player or an enemy).
    pub fn uncovered_targets(&self) -> usize {
        self.floor
            .iter()
            .zip(&self.cells)
            .flat_map(|(under, row)| under.iter().zip(row))
            .filter(|&(&u, &c)| u == Cell::Target && c != Cell::Box)
            .count()
    }

    pub fn target_count(&self) -> usize {
        self.floor.iter().flatten().filter(|&&c| c == Cell::Target).count()
    }

    /// Snapshot as symbol rows, for the presentation layer.
    pub fn to_rows(&self, variant: Variant) -> Vec<String> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|c| c.symbol(variant)).collect())
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Helper: build a pursuit grid from a diagram.
    pub(crate) fn grid_from(rows: &[&str]) -> Grid {
        Grid::from_rows(rows, Variant::Pursuit).expect("test grid")
    }

    pub(crate) fn classic_from(rows: &[&str]) -> Grid {
        Grid::from_rows(rows, Variant::Classic).expect("test grid")
    }

    #[test]
    fn cell_at_bounds() {
        let g = grid_from(&["#P.", "..."]);
        assert_eq!(g.cell_at(Pos::new(0, 1)), Ok(Cell::Player));
        assert_eq!(
            g.cell_at(Pos::new(2, 0)),
            Err(EngineError::OutOfBounds { row: 2, col: 0 })
        );
        assert_eq!(
            g.cell_at(Pos::new(0, 3)),
            Err(EngineError::OutOfBounds { row: 0, col: 3 })
        );
        assert_eq!(g.get(Pos::new(9, 9)), Cell::Wall);
    }

    #[test]
    fn with_cell_leaves_original_untouched() {
        let g = grid_from(&["P.."]);
        let h = g.with_cell(Pos::new(0, 2), Cell::Box).unwrap();
        assert_eq!(g.to_rows(Variant::Pursuit), vec!["P.."]);
        assert_eq!(h.to_rows(Variant::Pursuit), vec!["P.B"]);
        assert!(g.with_cell(Pos::new(1, 0), Cell::Box).is_err());
    }

    #[test]
    fn step_underflow_is_none() {
        assert_eq!(Pos::new(0, 0).step(Dir::Up), None);
        assert_eq!(Pos::new(0, 0).step(Dir::Left), None);
        assert_eq!(Pos::new(0, 0).step(Dir::Right), Some(Pos::new(0, 1)));
        assert_eq!(Pos::new(0, 0).step(Dir::Down), Some(Pos::new(1, 0)));
    }

    #[test]
    fn ragged_rows_rejected() {
        let err = Grid::from_rows(&["...", ".."], Variant::Pursuit).unwrap_err();
        assert_eq!(err, LevelError::Ragged { row: 1, expected: 3, found: 2 });
    }

    #[test]
    fn unknown_symbol_rejected() {
        let err = Grid::from_rows(&["P?"], Variant::Pursuit).unwrap_err();
        assert_eq!(err, LevelError::UnknownSymbol { row: 0, col: 1, symbol: '?' });
        assert_eq!(Grid::from_rows::<&str>(&[], Variant::Pursuit), Err(LevelError::Empty));
    }

    #[test]
    fn vacate_restores_underlay() {
        let mut g = classic_from(&["PX."]);
        g.set(Pos::new(0, 1), Cell::Player).unwrap();
        g.vacate(Pos::new(0, 0)).unwrap();
        assert_eq!(g.to_rows(Variant::Classic), vec![".P."]);
        g.vacate(Pos::new(0, 1)).unwrap();
        assert_eq!(g.to_rows(Variant::Classic), vec![".X."]);
    }

    #[test]
    fn uncovered_targets_counts_hidden_ones() {
        let mut g = classic_from(&["PXBX"]);
        assert_eq!(g.target_count(), 2);
        assert_eq!(g.uncovered_targets(), 2);
        g.set(Pos::new(0, 1), Cell::Box).unwrap();
        assert_eq!(g.uncovered_targets(), 1);
        g.set(Pos::new(0, 3), Cell::Player).unwrap();
        assert_eq!(g.uncovered_targets(), 1);
        g.set(Pos::new(0, 3), Cell::Box).unwrap();
        assert_eq!(g.uncovered_targets(), 0);
    }

    #[test]
    fn find_player_row_major() {
        let g = grid_from(&["...", "..P"]);
        assert_eq!(g.find_player(), Some(Pos::new(1, 2)));
        assert_eq!(grid_from(&["..."]).find_player(), None);
    }
}
