/// Dynamic entities tracked alongside the grid.
///
/// The grid carries `P` / `E` symbols; the round carries these
/// positions. Both are updated together on every mutation.

use super::grid::{Grid, Pos};
use super::tile::Cell;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enemy {
    /// Discovery index (row-major order in the starting grid).
    pub id: usize,
    pub pos: Pos,
}

impl Enemy {
    pub fn new(id: usize, pos: Pos) -> Self {
        Enemy { id, pos }
    }
}

/// Enemy list in row-major discovery order. This order is the tick
/// processing order.
pub fn enemies_on(grid: &Grid) -> Vec<Enemy> {
    grid.positions_of(Cell::Enemy)
        .into_iter()
        .enumerate()
        .map(|(id, pos)| Enemy::new(id, pos))
        .collect()
}

/// Do the grid's `E` cells match the list exactly (as sets)?
pub fn enemies_consistent(grid: &Grid, enemies: &[Enemy]) -> bool {
    let mut on_grid = grid.positions_of(Cell::Enemy);
    let mut listed: Vec<Pos> = enemies.iter().map(|e| e.pos).collect();
    on_grid.sort();
    listed.sort();
    on_grid == listed
}
