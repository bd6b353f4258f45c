/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use log::{info, warn};

use config::GameConfig;
use domain::grid::Dir;
use sim::event::GameEvent;
use sim::game::Game;
use sim::level::load_levels;
use sim::world::Phase;
use ui::input::{Action, InputState, KeyBindings};
use ui::renderer::{status_for, Renderer, View};

fn main() {
    env_logger::init();

    let config = GameConfig::load();
    let levels = load_levels(&config.defaults, &config.levels_dir);
    info!("{} levels available", levels.len());

    let mut game = Game::new(levels);
    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut game, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }
}

/// Front-end state that is not the engine's business.
struct Shell {
    cursor: usize,
    status: String,
}

fn game_loop(
    game: &mut Game,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = InputState::new();
    let bindings = KeyBindings::from_config(&config.keys);
    let frame_sleep = Duration::from_millis(config.frame_ms);
    let mut shell = Shell { cursor: 0, status: String::new() };
    let mut last_frame = Instant::now();

    loop {
        input.drain_events();
        if input.ctrl_c_pressed() {
            break;
        }

        for action in bindings.actions(&input) {
            if handle_action(game, &mut shell, action) {
                return Ok(());
            }
        }

        // Scheduled ticks run on wall-clock time
        let now = Instant::now();
        let events = game.advance(now.duration_since(last_frame));
        last_frame = now;
        note(&mut shell, &events);

        renderer.render(&View { game, cursor: shell.cursor, status: &shell.status })?;
        std::thread::sleep(frame_sleep);
    }

    Ok(())
}

/// Apply one action. Returns true when the program should quit.
fn handle_action(game: &mut Game, shell: &mut Shell, action: Action) -> bool {
    match game.phase() {
        // ── Menu ──
        Phase::Menu => match action {
            Action::Move(Dir::Up) => shell.cursor = shell.cursor.saturating_sub(1),
            Action::Move(Dir::Down) => {
                if shell.cursor + 1 < game.levels().len() {
                    shell.cursor += 1;
                }
            }
            Action::Confirm => match game.select_level(shell.cursor) {
                Ok(events) => note(shell, &events),
                Err(e) => shell.status = format!("cannot start: {e}"),
            },
            Action::Exit | Action::Quit => return true,
            Action::Move(_) => {}
        },

        // ── Playing ──
        Phase::Playing => match action {
            Action::Move(dir) => {
                let events = game.player_move(dir);
                note(shell, &events);
            }
            Action::Exit => {
                game.exit();
                shell.status.clear();
            }
            Action::Confirm | Action::Quit => {}
        },

        // ── Ended ──
        Phase::Ended(_) => match action {
            Action::Confirm => {
                game.restart();
                shell.status.clear();
            }
            Action::Exit => {
                game.exit();
                shell.status.clear();
            }
            Action::Quit => return true,
            Action::Move(_) => {}
        },
    }
    false
}

fn note(shell: &mut Shell, events: &[GameEvent]) {
    if events.contains(&GameEvent::Stalled) {
        warn!("round stalled; press Esc to return to the menu");
    }
    if let Some(status) = status_for(events) {
        shell.status = status;
    }
}
