/// RoundState: the complete snapshot of a running round.
///
/// ## Two representations, one truth
///
///   - `grid`   : what the presentation layer draws (`P`, `E`, `B` ...)
///   - `player`, `enemies`: explicit positions used by the engine
///
/// Every tick computes a new grid from the old one and replaces
/// `grid`, `player` and `enemies` together. `consistent()` checks that
/// the two never drift; tests assert it after every tick.
///
/// A round owns its `Schedule`. Dropping the round (exit, new level)
/// drops its pending ticks with it.

use crate::domain::entity::{enemies_consistent, Enemy};
use crate::domain::grid::{Grid, Pos};
use crate::domain::tile::Cell;
use crate::domain::variant::Variant;

use super::level::{LevelData, LevelSettings};
use super::schedule::Schedule;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Won,
    LostCapture,
    LostTimeout,
}

impl Outcome {
    pub fn is_win(self) -> bool {
        self == Outcome::Won
    }

    pub fn message(self) -> &'static str {
        match self {
            Outcome::Won => "You Won!",
            Outcome::LostCapture => "Game Over",
            Outcome::LostTimeout => "Time Out!",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Menu,
    Playing,
    Ended(Outcome),
}

pub struct RoundState {
    pub level: usize,
    pub name: String,
    pub variant: Variant,
    pub settings: LevelSettings,

    // ── Board ──
    pub grid: Grid,
    pub player: Pos,
    pub enemies: Vec<Enemy>,
    /// Targets in the starting grid; decides whether covering them wins.
    pub initial_targets: usize,

    // ── Clock ──
    pub time_remaining: u32,
    pub schedule: Schedule,
    pub tick: u64,

    // ── Result ──
    pub outcome: Option<Outcome>,
    /// Set when the grid lost its player; no tick changes the round after.
    pub stalled: bool,
}

impl RoundState {
    pub fn new(level: usize, data: LevelData) -> Self {
        let initial_targets = data.grid.target_count();
        let schedule = Schedule::for_round(data.variant, &data.settings);
        RoundState {
            level,
            name: data.name,
            variant: data.variant,
            time_remaining: data.settings.time_limit,
            settings: data.settings,
            grid: data.grid,
            player: data.player,
            enemies: data.enemies,
            initial_targets,
            schedule,
            tick: 0,
            outcome: None,
            stalled: false,
        }
    }

    /// Accepting ticks: no outcome yet and not stalled.
    pub fn is_live(&self) -> bool {
        self.outcome.is_none() && !self.stalled
    }

    /// Record a terminal outcome and cancel every pending tick.
    pub fn finish(&mut self, outcome: Outcome) {
        if self.outcome.is_none() {
            self.outcome = Some(outcome);
        }
        self.schedule.cancel_all();
    }

    pub fn stall(&mut self) {
        self.stalled = true;
        self.schedule.cancel_all();
    }

    /// Grid markers agree with the tracked positions.
    /// After a capture the enemy stands on the player's cell, so only the
    /// enemy list is checked then.
    pub fn consistent(&self) -> bool {
        let enemies_ok = enemies_consistent(&self.grid, &self.enemies);
        if self.outcome == Some(Outcome::LostCapture) {
            return enemies_ok;
        }
        enemies_ok
            && self.grid.find_player() == Some(self.player)
            && self.grid.count(Cell::Player) == 1
    }

    /// Snapshot rows for the presentation layer.
    pub fn rows(&self) -> Vec<String> {
        self.grid.to_rows(self.variant)
    }
}
