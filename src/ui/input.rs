/// Input state tracker.
///
/// Each frame `drain_events()` empties crossterm's queue and records the
/// keys pressed since the last frame. Moves are discrete, so only fresh
/// presses (Press and Repeat) matter; Release events are ignored.
///
/// `KeyBindings` turns the key names from `config.toml` into key codes
/// and maps a press to an `Action`.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::warn;

use crate::config::KeyConfig;
use crate::domain::grid::Dir;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Move(Dir),
    Confirm,
    Exit,
    Quit,
}

pub struct InputState {
    /// Keys pressed during the most recent drain, in arrival order.
    fresh_presses: Vec<KeyCode>,
    ctrl_c: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            fresh_presses: Vec::with_capacity(8),
            ctrl_c: false,
        }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.ctrl_c = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key);
            }
        }
    }

    fn record(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            self.ctrl_c = true;
            return;
        }
        self.fresh_presses.push(key.code);
    }

    pub fn presses(&self) -> &[KeyCode] {
        &self.fresh_presses
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.ctrl_c
    }
}

// ── Bindings ──

pub struct KeyBindings {
    table: Vec<(KeyCode, Action)>,
}

impl KeyBindings {
    pub fn from_config(keys: &KeyConfig) -> Self {
        let groups: [(&[String], Action); 7] = [
            (&keys.up, Action::Move(Dir::Up)),
            (&keys.down, Action::Move(Dir::Down)),
            (&keys.left, Action::Move(Dir::Left)),
            (&keys.right, Action::Move(Dir::Right)),
            (&keys.confirm, Action::Confirm),
            (&keys.exit, Action::Exit),
            (&keys.quit, Action::Quit),
        ];

        let mut table = Vec::new();
        for (names, action) in groups {
            for name in names {
                match parse_key(name) {
                    Some(code) => table.push((code, action)),
                    None => warn!("config: unknown key name '{name}'"),
                }
            }
        }
        KeyBindings { table }
    }

    /// First binding wins when a key is listed twice.
    pub fn action_for(&self, code: KeyCode) -> Option<Action> {
        let code = match code {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        };
        self.table.iter().find(|(k, _)| *k == code).map(|(_, a)| *a)
    }

    /// Actions for this frame's presses, in order.
    pub fn actions(&self, input: &InputState) -> Vec<Action> {
        input.presses().iter().filter_map(|c| self.action_for(*c)).collect()
    }
}

/// `Up`, `Enter`, ... or a single character (case-insensitive).
fn parse_key(name: &str) -> Option<KeyCode> {
    let code = match name.to_ascii_lowercase().as_str() {
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "space" => KeyCode::Char(' '),
        "backspace" => KeyCode::Backspace,
        "tab" => KeyCode::Tab,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return None,
            }
        }
    };
    Some(code)
}
