/// Move resolution: truth-table driven.
///
/// Pure function over a grid snapshot: the input grid is never written,
/// the result carries a new grid.
///
/// ## Move Truth Table
///
/// Let `T` = mover + direction.
/// ┌──────────────────────────────┬──────────────┬──────────────────┐
/// │ Condition                     │ Result       │ Notes            │
/// ├──────────────────────────────┼──────────────┼──────────────────┤
/// │ mover off grid                │ no-op        │ logged           │
/// │ T off grid                    │ BLOCKED      │ map edge         │
/// │ T = Wall                      │ BLOCKED      │                  │
/// │ T = Enemy, contact captures   │ CAPTURED     │ grid unchanged   │
/// │ T = Enemy, otherwise          │ BLOCKED      │                  │
/// │ T open (Floor/Target/Marker)  │ STEP         │                  │
/// │ T = Box, chain end open       │ PUSH(n)      │ n = chain length │
/// │ T = Box, chain end blocked    │ BLOCKED      │ Wall/Box/Enemy/edge │
/// └──────────────────────────────┴──────────────┴──────────────────┘
///
/// ### Push chain
/// Boxes are counted from `T` along the direction until the first
/// non-box cell (the chain end). The end cell is inspected BEFORE any
/// write; a blocked chain returns the input grid unchanged.
///
/// STEP and PUSH both vacate the mover's old cell (revert to floor
/// underlay) and write the mover symbol into `T`.

use log::{debug, warn};

use super::grid::{Dir, Grid, Pos};
use super::tile::Cell;
use super::variant::Variant;

/// Outcome of one move request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveResult {
    pub grid: Grid,
    pub mover: Pos,
    pub moved: bool,
    /// Number of boxes shifted (0 for a plain step).
    pub pushed: usize,
    /// The mover walked into an enemy under a rule-set where that is a capture.
    pub captured: bool,
}

impl MoveResult {
    fn blocked(grid: &Grid, mover: Pos) -> Self {
        MoveResult { grid: grid.clone(), mover, moved: false, pushed: 0, captured: false }
    }
}

/// Chain scan result: how many boxes, and where the chain ends.
/// `end` is `None` when the chain runs off the grid.
fn scan_chain(grid: &Grid, first: Pos, dir: Dir) -> (usize, Option<Pos>) {
    let mut count = 0;
    let mut cursor = Some(first);
    while let Some(pos) = cursor {
        if !grid.in_bounds(pos) {
            return (count, None);
        }
        if grid.get(pos) != Cell::Box {
            return (count, Some(pos));
        }
        count += 1;
        cursor = pos.step(dir);
    }
    (count, None)
}

pub fn resolve_move(grid: &Grid, mover: Pos, dir: Dir, variant: Variant) -> MoveResult {
    let mover_cell = match grid.cell_at(mover) {
        Ok(c) => c,
        Err(e) => {
            warn!("move ignored: {e}");
            return MoveResult::blocked(grid, mover);
        }
    };

    let target = match mover.step(dir) {
        Some(t) if grid.in_bounds(t) => t,
        _ => {
            debug!("move {dir:?} from {mover:?} blocked by map edge");
            return MoveResult::blocked(grid, mover);
        }
    };

    match grid.get(target) {
        Cell::Wall | Cell::Player => MoveResult::blocked(grid, mover),
        Cell::Enemy => {
            let mut result = MoveResult::blocked(grid, mover);
            result.captured = variant.enemy_contact_captures();
            result
        }
        c if c.is_open() => {
            let mut next = grid.clone();
            if shift(&mut next, mover, target, mover_cell).is_err() {
                return MoveResult::blocked(grid, mover);
            }
            MoveResult { grid: next, mover: target, moved: true, pushed: 0, captured: false }
        }
        Cell::Box => resolve_push(grid, mover, target, dir, mover_cell),
        other => {
            debug!("move into {other:?} not handled; treated as blocked");
            MoveResult::blocked(grid, mover)
        }
    }
}

fn resolve_push(grid: &Grid, mover: Pos, first: Pos, dir: Dir, mover_cell: Cell) -> MoveResult {
    let (count, end) = scan_chain(grid, first, dir);
    let end = match end {
        Some(e) if !grid.get(e).blocks_push() => e,
        _ => {
            debug!("push of {count} box(es) from {mover:?} blocked");
            return MoveResult::blocked(grid, mover);
        }
    };

    // Validated: every write below is in bounds.
    let mut next = grid.clone();
    let mut cells = Vec::with_capacity(count + 1);
    let mut cursor = first;
    cells.push(cursor);
    for _ in 0..count {
        match cursor.step(dir) {
            Some(p) => {
                cursor = p;
                cells.push(p);
            }
            None => return MoveResult::blocked(grid, mover),
        }
    }
    debug_assert_eq!(cursor, end);

    // Far end first: each box moves into the cell its successor just left.
    let applied = cells
        .windows(2)
        .rev()
        .try_for_each(|w| next.set(w[1], Cell::Box))
        .and_then(|_| shift(&mut next, mover, first, mover_cell));
    if applied.is_err() {
        return MoveResult::blocked(grid, mover);
    }

    MoveResult { grid: next, mover: first, moved: true, pushed: count, captured: false }
}

/// Move an entity symbol from `from` to `to` on a working copy.
fn shift(grid: &mut Grid, from: Pos, to: Pos, cell: Cell) -> Result<(), crate::error::EngineError> {
    grid.vacate(from)?;
    grid.set(to, cell)
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::tests::{classic_from, grid_from};

    fn mv(grid: &Grid, dir: Dir) -> MoveResult {
        let p = grid.find_player().expect("player");
        resolve_move(grid, p, dir, Variant::Pursuit)
    }

    fn rows(g: &Grid) -> Vec<String> {
        g.to_rows(Variant::Pursuit)
    }

    // ── Blocked moves ──

    #[test]
    fn walled_room_blocks_every_direction() {
        let g = grid_from(&[
            "###",
            "#P#",
            "###",
        ]);
        for dir in Dir::ALL {
            let r = mv(&g, dir);
            assert!(!r.moved);
            assert_eq!(r.grid, g);
            assert_eq!(r.mover, Pos::new(1, 1));
        }
    }

    #[test]
    fn map_edge_blocks() {
        let g = grid_from(&["P."]);
        let r = mv(&g, Dir::Left);
        assert!(!r.moved);
        let r = mv(&g, Dir::Up);
        assert!(!r.moved);
        assert_eq!(r.grid, g);
    }

    #[test]
    fn mover_off_grid_is_noop() {
        let g = grid_from(&["P."]);
        let r = resolve_move(&g, Pos::new(5, 5), Dir::Left, Variant::Pursuit);
        assert!(!r.moved);
        assert_eq!(r.grid, g);
    }

    // ── Plain steps ──

    #[test]
    fn step_onto_floor() {
        let g = grid_from(&["P.."]);
        let r = mv(&g, Dir::Right);
        assert!(r.moved);
        assert_eq!(r.pushed, 0);
        assert_eq!(r.mover, Pos::new(0, 1));
        assert_eq!(rows(&r.grid), vec![".P."]);
        // input snapshot untouched
        assert_eq!(rows(&g), vec!["P.."]);
    }

    #[test]
    fn target_reappears_after_player_leaves() {
        let g = classic_from(&["PX."]);
        let r1 = resolve_move(&g, Pos::new(0, 0), Dir::Right, Variant::Classic);
        assert_eq!(r1.grid.to_rows(Variant::Classic), vec![".P."]);
        let r2 = resolve_move(&r1.grid, r1.mover, Dir::Right, Variant::Classic);
        assert_eq!(r2.grid.to_rows(Variant::Classic), vec![".XP"]);
    }

    #[test]
    fn step_onto_marker() {
        let g = classic_from(&["P@"]);
        let r = resolve_move(&g, Pos::new(0, 0), Dir::Right, Variant::Classic);
        assert!(r.moved);
        assert_eq!(r.grid.to_rows(Variant::Classic), vec![".P"]);
    }

    // ── Pushes ──

    #[test]
    fn push_single_box() {
        let g = grid_from(&["PB."]);
        let r = mv(&g, Dir::Right);
        assert!(r.moved);
        assert_eq!(r.pushed, 1);
        assert_eq!(r.mover, Pos::new(0, 1));
        assert_eq!(rows(&r.grid), vec![".PB"]);
    }

    #[test]
    fn push_chain_of_three() {
        let g = grid_from(&["PBBB.."]);
        let r = mv(&g, Dir::Right);
        assert!(r.moved);
        assert_eq!(r.pushed, 3);
        assert_eq!(rows(&r.grid), vec![".PBBB."]);
    }

    #[test]
    fn push_chain_vertical() {
        let g = grid_from(&[
            ".",
            "B",
            "B",
            "P",
        ]);
        let r = mv(&g, Dir::Up);
        assert!(r.moved);
        assert_eq!(r.pushed, 2);
        assert_eq!(rows(&r.grid), vec!["B", "B", "P", "."]);
    }

    #[test]
    fn push_blocked_by_wall_is_byte_identical() {
        let g = grid_from(&["PBB#"]);
        let r = mv(&g, Dir::Right);
        assert!(!r.moved);
        assert_eq!(r.pushed, 0);
        assert_eq!(r.grid, g);
    }

    #[test]
    fn push_blocked_by_enemy() {
        let g = grid_from(&["PBE."]);
        let r = mv(&g, Dir::Right);
        assert!(!r.moved);
        assert!(!r.captured);
        assert_eq!(r.grid, g);
    }

    #[test]
    fn push_blocked_by_edge() {
        let g = grid_from(&["..PBB"]);
        let r = mv(&g, Dir::Right);
        assert!(!r.moved);
        assert_eq!(r.grid, g);
    }

    #[test]
    fn push_box_onto_target_covers_it() {
        let g = classic_from(&["PBX"]);
        let r = resolve_move(&g, Pos::new(0, 0), Dir::Right, Variant::Classic);
        assert!(r.moved);
        assert_eq!(r.grid.to_rows(Variant::Classic), vec![".PB"]);
        assert_eq!(r.grid.uncovered_targets(), 0);
    }

    #[test]
    fn push_box_off_target_uncovers_it() {
        let mut g = classic_from(&["PBX."]);
        g = resolve_move(&g, Pos::new(0, 0), Dir::Right, Variant::Classic).grid;
        let r = resolve_move(&g, Pos::new(0, 1), Dir::Right, Variant::Classic);
        assert_eq!(r.grid.to_rows(Variant::Classic), vec!["..PB"]);
        assert_eq!(r.grid.uncovered_targets(), 1);
        // player now stands on the target
        assert_eq!(r.grid.underlay_at(Pos::new(0, 2)), Ok(Cell::Target));
    }

    // ── Enemy contact ──

    #[test]
    fn stepping_into_enemy_captures_in_pursuit() {
        let g = grid_from(&["PE"]);
        let r = mv(&g, Dir::Right);
        assert!(!r.moved);
        assert!(r.captured);
        assert_eq!(r.grid, g);
    }

    #[test]
    fn stepping_into_enemy_is_a_bump_in_classic() {
        let g = grid_from(&["PE"]);
        let r = resolve_move(&g, Pos::new(0, 0), Dir::Right, Variant::Classic);
        assert!(!r.moved);
        assert!(!r.captured);
    }
}
