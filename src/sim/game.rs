/// Round controller: the `Menu → Playing → Ended` state machine.
///
/// ```text
///   Menu ──select_level──▶ Playing ──(outcome)──▶ Ended(outcome)
///    ▲                       │                      │
///    └────────exit───────────┘                      │
///    └────────restart / exit────────────────────────┘
/// ```
///
/// The controller owns at most one round. Starting a level replaces it,
/// `exit`/`restart` drop it; either way its schedule goes with it, so no
/// tick can reach a discarded round. An ended round is kept (inert) so
/// the presentation layer can show the final board.

use std::time::Duration;

use log::{info, warn};

use crate::domain::grid::{Dir, Grid};
use crate::error::{EngineError, LevelError};

use super::event::GameEvent;
use super::level::LevelDef;
use super::step;
use super::world::{Outcome, Phase, RoundState};

pub struct Game {
    levels: Vec<LevelDef>,
    phase: Phase,
    round: Option<RoundState>,
}

impl Game {
    pub fn new(levels: Vec<LevelDef>) -> Self {
        Game { levels, phase: Phase::Menu, round: None }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn levels(&self) -> &[LevelDef] {
        &self.levels
    }

    pub fn round(&self) -> Option<&RoundState> {
        self.round.as_ref()
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.round.as_ref().map(|r| &r.grid)
    }

    pub fn time_remaining(&self) -> Option<u32> {
        self.round.as_ref().map(|r| r.time_remaining)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::Ended(o) => Some(o),
            _ => None,
        }
    }

    // ── Transitions ──

    /// Start a round on level `index`. Invalid level data is rejected
    /// before anything changes; a running round is replaced otherwise.
    pub fn select_level(&mut self, index: usize) -> Result<Vec<GameEvent>, EngineError> {
        let def = self.levels.get(index).ok_or(LevelError::IndexOutOfRange {
            index,
            count: self.levels.len(),
        })?;
        let data = def.validate().map_err(|e| {
            warn!("level {} '{}' rejected: {e}", index, def.name);
            e
        })?;

        info!("starting level {} '{}' ({})", index, data.name, data.variant.name());
        self.round = Some(RoundState::new(index, data));
        self.phase = Phase::Playing;
        Ok(vec![GameEvent::RoundStarted { level: index }])
    }

    pub fn player_move(&mut self, dir: Dir) -> Vec<GameEvent> {
        let events = match (self.phase, self.round.as_mut()) {
            (Phase::Playing, Some(round)) => step::player_move(round, dir),
            _ => return vec![],
        };
        self.sync_phase();
        events
    }

    /// Feed elapsed wall-clock time; runs due enemy and clock ticks.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<GameEvent> {
        let events = match (self.phase, self.round.as_mut()) {
            (Phase::Playing, Some(round)) => step::advance(round, elapsed),
            _ => return vec![],
        };
        self.sync_phase();
        events
    }

    /// Abort the round (or leave the end screen) and return to the menu.
    pub fn exit(&mut self) {
        if self.round.take().is_some() {
            info!("round discarded");
        }
        self.phase = Phase::Menu;
    }

    /// From the end screen back to the menu.
    pub fn restart(&mut self) {
        match self.phase {
            Phase::Ended(_) => self.exit(),
            other => warn!("restart ignored in {other:?}"),
        }
    }

    fn sync_phase(&mut self) {
        if let Some(outcome) = self.round.as_ref().and_then(|r| r.outcome) {
            self.phase = Phase::Ended(outcome);
        }
    }
}
