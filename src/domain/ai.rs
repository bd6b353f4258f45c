/// Enemy AI: BFS pursuit over the grid.
///
/// Each enemy searches outward from its own cell over open ground
/// (Floor, Target, Marker) and the player's cell. Walls, boxes, other
/// enemies and the grid edge block. Every queued cell remembers the
/// first step taken from the start; the cell closest to the player
/// (Manhattan) decides which first step the enemy takes.
///
/// Every cell is queued at most once, so a search visits at most
/// `width * height` cells.
///
/// Determinism:
///   - neighbours are expanded in `Dir::ALL` order (up, down, left, right)
///   - a cell is marked visited when queued and never queued twice
///   - only a strictly closer cell replaces the current best
///   - enemies move in list order, each seeing the moves before it

use std::collections::VecDeque;

use log::{debug, warn};

use super::entity::Enemy;
use super::grid::{Dir, Grid, Pos};
use super::tile::Cell;

/// Terminal result of an enemy tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PursuitOutcome {
    /// Every enemy is boxed in on all four sides.
    Trapped,
    /// An enemy reached the player's cell.
    Captured,
}

#[derive(Clone, Debug)]
pub struct EnemyMove {
    pub id: usize,
    pub from: Pos,
    pub to: Pos,
}

#[derive(Clone, Debug)]
pub struct PursuitResult {
    pub grid: Grid,
    pub enemies: Vec<Enemy>,
    pub moves: Vec<EnemyMove>,
    pub outcome: Option<PursuitOutcome>,
}

fn can_enter(grid: &Grid, pos: Pos, player: Pos) -> bool {
    pos == player || grid.get(pos).is_open()
}

fn neighbor(grid: &Grid, pos: Pos, dir: Dir) -> Option<Pos> {
    pos.step(dir).filter(|&p| grid.in_bounds(p))
}

// ── Search ──

/// Best single step for an enemy at `from` chasing `player`.
/// `None` when no reachable cell is closer than `from` itself.
pub fn find_step(grid: &Grid, from: Pos, player: Pos) -> Option<Pos> {
    if !grid.in_bounds(from) {
        warn!("enemy search from {from:?} ignored: off the grid");
        return None;
    }
    if from == player {
        return None;
    }

    let mut visited = vec![vec![false; grid.width()]; grid.height()];
    visited[from.row][from.col] = true;

    let mut queue: VecDeque<(Pos, Pos)> = VecDeque::with_capacity(64);
    let mut best_dist = from.manhattan(player);
    let mut best_step: Option<Pos> = None;

    for dir in Dir::ALL {
        if let Some(n) = neighbor(grid, from, dir) {
            if can_enter(grid, n, player) && !visited[n.row][n.col] {
                visited[n.row][n.col] = true;
                queue.push_back((n, n));
            }
        }
    }

    while let Some((cell, first)) = queue.pop_front() {
        let dist = cell.manhattan(player);
        if dist < best_dist {
            best_dist = dist;
            best_step = Some(first);
        }
        if cell == player { break; }

        for dir in Dir::ALL {
            if let Some(n) = neighbor(grid, cell, dir) {
                if can_enter(grid, n, player) && !visited[n.row][n.col] {
                    visited[n.row][n.col] = true;
                    queue.push_back((n, first));
                }
            }
        }
    }

    best_step.filter(|&s| s != from)
}

/// No legal cardinal move: every neighbour is off-grid, wall, box or enemy.
/// A position off the grid is not an enemy on it, so it is never trapped.
pub fn is_trapped(grid: &Grid, pos: Pos) -> bool {
    if !grid.in_bounds(pos) {
        return false;
    }
    Dir::ALL.iter().all(|&dir| match neighbor(grid, pos, dir) {
        None => true,
        Some(n) => grid.get(n).blocks_push(),
    })
}

// ── Tick ──

/// Move every enemy one step toward the player.
///
/// Works on a private copy of `grid`; the caller publishes the result.
pub fn step_enemies(grid: &Grid, enemies: &[Enemy], player: Pos) -> PursuitResult {
    let mut next = grid.clone();
    let mut moved_enemies = Vec::with_capacity(enemies.len());
    let mut moves = Vec::new();

    for enemy in enemies {
        let mut e = enemy.clone();
        // After a capture the rest hold still; the player cell takes one enemy.
        let caught = moved_enemies.iter().any(|m: &Enemy| m.pos == player);
        if caught {
            moved_enemies.push(e);
            continue;
        }
        if let Some(to) = find_step(&next, e.pos, player) {
            // Both cells are in bounds: `from` is on the grid, `to` came from the search.
            if next.vacate(e.pos).and_then(|_| next.set(to, Cell::Enemy)).is_ok() {
                debug!("enemy {} {:?} -> {:?}", e.id, e.pos, to);
                moves.push(EnemyMove { id: e.id, from: e.pos, to });
                e.pos = to;
            }
        }
        moved_enemies.push(e);
    }

    let outcome = if !moved_enemies.is_empty()
        && moved_enemies.iter().all(|e| is_trapped(&next, e.pos))
    {
        Some(PursuitOutcome::Trapped)
    } else if moved_enemies.iter().any(|e| e.pos == player) {
        Some(PursuitOutcome::Captured)
    } else {
        None
    };

    PursuitResult { grid: next, enemies: moved_enemies, moves, outcome }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::enemies_on;
    use crate::domain::grid::tests::grid_from;
    use crate::domain::variant::Variant;

    fn player(g: &Grid) -> Pos {
        g.find_player().expect("player")
    }

    #[test]
    fn corridor_first_step_toward_player() {
        let g = grid_from(&["E..P"]);
        assert_eq!(find_step(&g, Pos::new(0, 0), player(&g)), Some(Pos::new(0, 1)));
    }

    #[test]
    fn adjacent_enemy_steps_onto_player() {
        let g = grid_from(&[".EP"]);
        assert_eq!(find_step(&g, Pos::new(0, 1), Pos::new(0, 2)), Some(Pos::new(0, 2)));
    }

    #[test]
    fn routes_around_wall() {
        // Direct line blocked; only way is down and around.
        let g = grid_from(&[
            "E#P",
            "...",
        ]);
        assert_eq!(find_step(&g, Pos::new(0, 0), Pos::new(0, 2)), Some(Pos::new(1, 0)));
    }

    #[test]
    fn boxes_and_enemies_block_search() {
        let g = grid_from(&["EBP"]);
        assert_eq!(find_step(&g, Pos::new(0, 0), Pos::new(0, 2)), None);
        let g = grid_from(&["EE.P"]);
        assert_eq!(find_step(&g, Pos::new(0, 0), Pos::new(0, 3)), None);
    }

    #[test]
    fn long_detour_is_found() {
        // Wall down the middle column with a gap on the last row only.
        let height = 3000;
        let mut rows = vec!["E#P".to_string()];
        rows.extend((1..height - 1).map(|_| ".#.".to_string()));
        rows.push("...".to_string());
        let g = Grid::from_rows(&rows, Variant::Pursuit).unwrap();
        assert_eq!(find_step(&g, Pos::new(0, 0), Pos::new(0, 2)), Some(Pos::new(1, 0)));
    }

    #[test]
    fn off_grid_enemy_holds_still() {
        let g = grid_from(&["P.E"]);
        assert_eq!(find_step(&g, Pos::new(7, 7), Pos::new(0, 0)), None);
        assert!(!is_trapped(&g, Pos::new(7, 7)));

        let r = step_enemies(&g, &[Enemy::new(0, Pos::new(7, 7))], Pos::new(0, 0));
        assert!(r.moves.is_empty());
        assert_eq!(r.outcome, None);
        assert_eq!(r.enemies, vec![Enemy::new(0, Pos::new(7, 7))]);
        assert_eq!(r.grid, g);
    }

    #[test]
    fn tie_break_prefers_up_then_down() {
        let g = grid_from(&[
            "...",
            ".E.",
            "..P",
        ]);
        // Down reaches (2,1) at distance 1 before Right reaches (1,2),
        // both distance 1; the first strictly-closer cell wins.
        assert_eq!(find_step(&g, Pos::new(1, 1), Pos::new(2, 2)), Some(Pos::new(2, 1)));
    }

    #[test]
    fn step_never_increases_distance_on_open_ground() {
        let g = grid_from(&[
            ".....",
            ".....",
            "..P..",
            ".....",
            ".....",
        ]);
        let p = Pos::new(2, 2);
        for r in 0..5 {
            for c in 0..5 {
                let from = Pos::new(r, c);
                if from == p { continue; }
                let g = g.with_cell(from, Cell::Enemy).unwrap();
                let step = find_step(&g, from, p).expect("open ground always has a step");
                assert!(step.manhattan(p) < from.manhattan(p));
            }
        }
    }

    #[test]
    fn trapped_detection() {
        let g = grid_from(&[
            "#B#",
            "#E#",
            "#E#",
            "###",
        ]);
        assert!(is_trapped(&g, Pos::new(1, 1)));
        assert!(is_trapped(&g, Pos::new(2, 1)));
        let g = grid_from(&["E."]);
        assert!(!is_trapped(&g, Pos::new(0, 0)));
    }

    #[test]
    fn step_enemies_moves_and_keeps_list_in_sync() {
        let g = grid_from(&[
            "E....",
            ".....",
            "....P",
        ]);
        let enemies = enemies_on(&g);
        let r = step_enemies(&g, &enemies, player(&g));
        assert_eq!(r.moves.len(), 1);
        assert_eq!(r.outcome, None);
        assert_eq!(r.grid.positions_of(Cell::Enemy), r.enemies.iter().map(|e| e.pos).collect::<Vec<_>>());
        // original untouched
        assert_eq!(g.positions_of(Cell::Enemy), vec![Pos::new(0, 0)]);
    }

    #[test]
    fn earlier_enemy_claims_contested_cell() {
        // Both enemies want (0,1); enemy 0 goes first and takes it.
        let g = grid_from(&[
            "E.E",
            "#.#",
            "#P#",
        ]);
        let enemies = enemies_on(&g);
        assert_eq!(enemies.len(), 2);
        let r = step_enemies(&g, &enemies, player(&g));
        // Enemy 0 moves right; enemy 1 is then boxed between enemy 0 and the edge.
        assert_eq!(r.enemies[0].pos, Pos::new(0, 1));
        assert_eq!(r.enemies[1].pos, Pos::new(0, 2));
        assert_eq!(r.grid.to_rows(Variant::Pursuit)[0], ".EE");
    }

    #[test]
    fn capture_when_enemy_reaches_player() {
        let g = grid_from(&["..EP."]);
        let enemies = enemies_on(&g);
        let r = step_enemies(&g, &enemies, player(&g));
        assert_eq!(r.outcome, Some(PursuitOutcome::Captured));
        assert_eq!(r.enemies[0].pos, Pos::new(0, 3));
    }

    #[test]
    fn all_trapped_is_reported() {
        let g = grid_from(&[
            "#####",
            "#E#E#",
            "#B#B#",
            "..P..",
        ]);
        let enemies = enemies_on(&g);
        let r = step_enemies(&g, &enemies, player(&g));
        assert!(r.moves.is_empty());
        assert_eq!(r.outcome, Some(PursuitOutcome::Trapped));
    }

    #[test]
    fn one_free_enemy_is_not_trapped() {
        let g = grid_from(&[
            "#####",
            "#E#.E",
            "#B#..",
            "..P..",
        ]);
        let enemies = enemies_on(&g);
        let r = step_enemies(&g, &enemies, player(&g));
        assert_eq!(r.outcome, None);
    }

    #[test]
    fn no_enemies_is_not_trapped() {
        let g = grid_from(&["P.."]);
        let r = step_enemies(&g, &[], Pos::new(0, 0));
        assert_eq!(r.outcome, None);
    }
}
