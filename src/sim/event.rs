/// Events emitted during a tick.
/// The presentation layer consumes these for its status line.

use crate::domain::grid::{Dir, Pos};

use super::world::Outcome;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    RoundStarted { level: usize },
    PlayerMoved { from: Pos, to: Pos },
    BoxesPushed { count: usize },
    MoveBlocked { dir: Dir },
    EnemyMoved { id: usize, from: Pos, to: Pos },
    TimerTick { remaining: u32 },
    TargetsCovered,
    EnemiesTrapped,
    PlayerCaptured,
    TimedOut,
    RoundEnded { outcome: Outcome },
    Stalled,
}
