/// Presentation layer: line-diffed terminal renderer.
///
/// How it works:
///   1. Compose the next frame into `front` (one `Line` per terminal row)
///   2. Compare each line with `back` (the previous frame)
///   3. Rewrite only the lines that changed, batched with `queue!`
///   4. Flush once, then swap front/back
///
/// The board is a plain character dump of `Grid::to_rows`; colour is
/// applied per symbol and carries no game meaning.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::variant::Variant;
use crate::sim::event::GameEvent;
use crate::sim::game::Game;
use crate::sim::world::{Outcome, Phase, RoundState};

// ── Line: the unit of the back-buffer ──

#[derive(Clone, Debug, PartialEq)]
struct Span {
    text: String,
    fg: Color,
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Line {
    spans: Vec<Span>,
}

impl Line {
    fn plain(text: impl Into<String>, fg: Color) -> Self {
        Line { spans: vec![Span { text: text.into(), fg }] }
    }

    /// Board row: consecutive symbols of the same colour share a span.
    fn board(row: &str, variant: Variant) -> Self {
        let mut spans: Vec<Span> = Vec::new();
        for ch in row.chars() {
            let fg = symbol_color(ch, variant);
            match spans.last_mut() {
                Some(last) if last.fg == fg => last.text.push(ch),
                _ => spans.push(Span { text: ch.to_string(), fg }),
            }
        }
        Line { spans }
    }

    #[cfg(test)]
    fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

fn symbol_color(ch: char, variant: Variant) -> Color {
    match ch {
        '#' => Color::DarkGrey,
        'P' => Color::Yellow,
        'B' => Color::Rgb { r: 200, g: 140, b: 60 },
        'E' => Color::Red,
        '@' => Color::Cyan,
        c if c == variant.target_symbol() => Color::Green,
        _ => Color::Grey,
    }
}

/// What the front end shows besides the engine state.
pub struct View<'a> {
    pub game: &'a Game,
    pub cursor: usize,
    pub status: &'a str,
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: Vec<Line>,
    back: Vec<Line>,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(8192, io::stdout()),
            front: Vec::new(),
            back: Vec::new(),
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            Clear(ClearType::All)
        )
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, view: &View) -> io::Result<()> {
        // Phase change → full repaint
        let phase = view.game.phase();
        if self.last_phase != Some(phase) {
            self.back.clear();
            queue!(self.writer, Clear(ClearType::All))?;
            self.last_phase = Some(phase);
        }

        self.front = compose(view);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only rewrite changed lines ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let rows = self.front.len().max(self.back.len());
        for y in 0..rows {
            let line = self.front.get(y);
            if line == self.back.get(y) {
                continue;
            }
            queue!(self.writer, MoveTo(0, y as u16))?;
            if let Some(line) = line {
                for span in &line.spans {
                    queue!(self.writer, SetForegroundColor(span.fg), Print(&span.text))?;
                }
            }
            queue!(self.writer, Clear(ClearType::UntilNewLine))?;
        }
        queue!(self.writer, ResetColor)?;
        self.writer.flush()
    }
}

// ── Compose: build front buffer content ──

fn compose(view: &View) -> Vec<Line> {
    let game = view.game;
    let mut lines = match (game.phase(), game.round()) {
        (Phase::Menu, _) => compose_menu(game, view.cursor),
        (Phase::Playing, Some(round)) => compose_round(round),
        (Phase::Ended(outcome), Some(round)) => {
            let mut lines = compose_round(round);
            lines.push(Line::default());
            lines.extend(compose_end(outcome));
            lines
        }
        // Playing/Ended always carry a round
        (_, None) => vec![],
    };
    if !view.status.is_empty() {
        lines.push(Line::default());
        lines.push(Line::plain(format!(" {}", view.status), Color::Grey));
    }
    lines
}

fn compose_menu(game: &Game, cursor: usize) -> Vec<Line> {
    let mut lines = vec![
        Line::plain(" BOXEM", Color::Yellow),
        Line::plain(" push boxes, trap the geese", Color::DarkGrey),
        Line::default(),
    ];
    if game.levels().is_empty() {
        lines.push(Line::plain(" no levels found", Color::Red));
    }
    for (i, level) in game.levels().iter().enumerate() {
        let (marker, fg) = if i == cursor { ('>', Color::White) } else { (' ', Color::Grey) };
        lines.push(Line::plain(
            format!(" {marker} {:>2}. {:<24} [{}]", i + 1, level.name, level.variant.name()),
            fg,
        ));
    }
    lines.push(Line::default());
    lines.push(Line::plain(" [Up/Down] select  [Enter] play  [q] quit", Color::DarkGrey));
    lines
}

fn compose_round(round: &RoundState) -> Vec<Line> {
    let mut lines = vec![Line::plain(hud(round), Color::White), Line::default()];
    lines.extend(round.rows().iter().map(|row| Line::board(row, round.variant)));
    lines.push(Line::default());
    lines.push(Line::plain(" [arrows/wasd] move  [Esc] menu", Color::DarkGrey));
    lines
}

fn hud(round: &RoundState) -> String {
    let mut hud = format!(" {}. {}  ({})", round.level + 1, round.name, round.variant.name());
    if round.variant.has_timer() {
        hud.push_str(&format!("  time {:>3}", round.time_remaining));
    }
    if round.variant.has_enemies() {
        hud.push_str(&format!("  speed {:.1}/s", round.settings.enemy_speed));
    }
    if round.initial_targets > 0 {
        let covered = round.initial_targets - round.grid.uncovered_targets();
        hud.push_str(&format!("  targets {covered}/{}", round.initial_targets));
    }
    hud
}

fn compose_end(outcome: Outcome) -> Vec<Line> {
    let fg = if outcome.is_win() { Color::Green } else { Color::Red };
    vec![
        Line::plain(format!(" *** {} ***", outcome.message()), fg),
        Line::plain(" [Enter] menu", Color::DarkGrey),
    ]
}

/// One-line status for the most telling event of a frame.
pub fn status_for(events: &[GameEvent]) -> Option<String> {
    events.iter().rev().find_map(|e| match e {
        GameEvent::RoundStarted { level } => Some(format!("level {} started", level + 1)),
        GameEvent::BoxesPushed { count: 1 } => Some("pushed a box".into()),
        GameEvent::BoxesPushed { count } => Some(format!("pushed {count} boxes")),
        GameEvent::MoveBlocked { .. } => Some("blocked".into()),
        GameEvent::TargetsCovered => Some("all targets covered".into()),
        GameEvent::EnemiesTrapped => Some("every goose is trapped".into()),
        GameEvent::PlayerCaptured => Some("caught!".into()),
        GameEvent::TimedOut => Some("out of time".into()),
        GameEvent::Stalled => Some("round stalled: player lost".into()),
        _ => None,
    })
}
