/// Tick functions: each advances a round by one serialized step.
///
/// Tick kinds:
///   1. Player move : on input
///   2. Enemy step  : every `1000 / enemy_speed` ms (pursuit)
///   3. Clock       : every second (pursuit)
///
/// Each tick reads the current grid, computes a new one with the pure
/// domain functions, then publishes grid + positions together. A round
/// with an outcome (or stalled) ignores every tick.
///
/// Outcome mapping:
///   move into enemy (pursuit)       → LostCapture
///   push covers last target          → Won
///   every enemy trapped              → Won
///   enemy reaches player             → LostCapture
///   clock reaches zero               → LostTimeout

use std::time::Duration;

use log::{debug, error, info};

use crate::domain::ai::{self, PursuitOutcome};
use crate::domain::grid::Dir;
use crate::domain::rules;
use crate::domain::tile::Cell;
use crate::error::EngineError;
use super::event::GameEvent;
use super::schedule::TickKind;
use super::world::{Outcome, RoundState};

// ══════════════════════════════════════════════════════════════
// Player move
// ══════════════════════════════════════════════════════════════

pub fn player_move(round: &mut RoundState, dir: Dir) -> Vec<GameEvent> {
    if !round.is_live() { return vec![]; }

    let mut events = Vec::new();
    round.tick += 1;

    if stall_if_player_lost(round, "player move", &mut events) {
        return events;
    }

    let result = rules::resolve_move(&round.grid, round.player, dir, round.variant);

    if result.captured {
        events.push(GameEvent::PlayerCaptured);
        end_round(round, Outcome::LostCapture, &mut events);
        return events;
    }
    if !result.moved {
        events.push(GameEvent::MoveBlocked { dir });
        return events;
    }

    let from = round.player;
    round.grid = result.grid;
    round.player = result.mover;
    events.push(GameEvent::PlayerMoved { from, to: round.player });

    if result.pushed > 0 {
        events.push(GameEvent::BoxesPushed { count: result.pushed });
        resolve_cover_win(round, &mut events);
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Enemy step
// ══════════════════════════════════════════════════════════════

pub fn enemy_tick(round: &mut RoundState) -> Vec<GameEvent> {
    if !round.is_live() || !round.variant.has_enemies() { return vec![]; }

    let mut events = Vec::new();
    round.tick += 1;

    if stall_if_player_lost(round, "enemy tick", &mut events) {
        return events;
    }

    let result = ai::step_enemies(&round.grid, &round.enemies, round.player);
    round.grid = result.grid;
    round.enemies = result.enemies;
    for m in result.moves {
        events.push(GameEvent::EnemyMoved { id: m.id, from: m.from, to: m.to });
    }

    match result.outcome {
        Some(PursuitOutcome::Trapped) if round.variant.wins_by_trapping() => {
            events.push(GameEvent::EnemiesTrapped);
            end_round(round, Outcome::Won, &mut events);
        }
        Some(PursuitOutcome::Captured) => {
            events.push(GameEvent::PlayerCaptured);
            end_round(round, Outcome::LostCapture, &mut events);
        }
        _ => {}
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Clock
// ══════════════════════════════════════════════════════════════

pub fn timer_tick(round: &mut RoundState) -> Vec<GameEvent> {
    if !round.is_live() || !round.variant.has_timer() { return vec![]; }

    let mut events = Vec::new();
    round.tick += 1;

    round.time_remaining = round.time_remaining.saturating_sub(1);
    events.push(GameEvent::TimerTick { remaining: round.time_remaining });

    if round.time_remaining == 0 {
        events.push(GameEvent::TimedOut);
        end_round(round, Outcome::LostTimeout, &mut events);
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Scheduled ticks
// ══════════════════════════════════════════════════════════════

/// Feed wall-clock time to the round and run every tick that falls due,
/// in order. Stops at the first terminal outcome.
pub fn advance(round: &mut RoundState, elapsed: Duration) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if !round.is_live() { return events; }

    round.schedule.feed(elapsed);
    while round.is_live() {
        match round.schedule.next_due() {
            Some(TickKind::Enemy) => events.extend(enemy_tick(round)),
            Some(TickKind::Clock) => events.extend(timer_tick(round)),
            None => break,
        }
    }
    events
}

// ══════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════

fn resolve_cover_win(round: &mut RoundState, events: &mut Vec<GameEvent>) {
    if !round.variant.wins_by_covering(round.initial_targets) { return; }
    let left = round.grid.uncovered_targets();
    debug!("{left} target(s) uncovered");
    if left == 0 {
        events.push(GameEvent::TargetsCovered);
        end_round(round, Outcome::Won, events);
    }
}

/// The grid must show the player where the round tracks it. When it
/// does not, the round stalls and every later tick is a no-op.
fn stall_if_player_lost(round: &mut RoundState, tick: &str, events: &mut Vec<GameEvent>) -> bool {
    if round.grid.cell_at(round.player) == Ok(Cell::Player) {
        return false;
    }
    error!("{tick} on round '{}': {}", round.name, EngineError::PlayerNotFound);
    round.stall();
    events.push(GameEvent::Stalled);
    true
}

fn end_round(round: &mut RoundState, outcome: Outcome, events: &mut Vec<GameEvent>) {
    round.finish(outcome);
    info!("round '{}' ended: {outcome:?} after {} tick(s)", round.name, round.tick);
    events.push(GameEvent::RoundEnded { outcome });
}
