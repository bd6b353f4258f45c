/// Level loader.
///
/// ## Sources (in list order):
///   1. Built-in embedded levels
///   2. `levels/` directory (individual `.txt` files, sorted by file name)
///
/// ## Level file format (`.txt`):
///   ```
///   # Level Name
///   @ rules=pursuit speed=2 time=60
///   #######
///   #P.B.E#
///   #######
///   ```
///   Line 1: `# Level Name` (optional; file stem is used otherwise)
///   Optional: `@ key=value ...` settings line. Keys: `rules`
///   (`classic` | `pursuit`), `speed` (enemy moves per second),
///   `time` (seconds). Missing keys fall back to config defaults.
///   Remaining non-blank lines: map rows.
///
/// ## Symbol legend:
///   '.' = Floor    '#' = Wall    'P' = Player    'B' = Box
///   'X' = Target (classic)       'T' = Target (pursuit)
///   'E' = Enemy (pursuit)        '@' = Marker (classic)
///
/// Parsing only collects rows; `LevelDef::validate` turns a definition
/// into playable `LevelData` and is where bad levels are rejected.

use std::path::Path;

use log::{debug, warn};

use crate::config::LevelDefaults;
use crate::domain::entity::{enemies_on, Enemy};
use crate::domain::grid::{Grid, Pos};
use crate::domain::tile::Cell;
use crate::domain::variant::Variant;
use crate::error::LevelError;

/// Tuning parameters supplied with each level.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelSettings {
    /// Enemy moves per second.
    pub enemy_speed: f64,
    /// Round length in seconds.
    pub time_limit: u32,
}

/// Raw level data (owned strings, loaded from file or embedded).
#[derive(Clone, Debug)]
pub struct LevelDef {
    pub name: String,
    pub variant: Variant,
    pub settings: LevelSettings,
    pub rows: Vec<String>,
}

/// A validated level, ready to start a round from.
#[derive(Clone, Debug)]
pub struct LevelData {
    pub name: String,
    pub variant: Variant,
    pub settings: LevelSettings,
    pub grid: Grid,
    pub player: Pos,
    pub enemies: Vec<Enemy>,
}

impl LevelDef {
    pub fn validate(&self) -> Result<LevelData, LevelError> {
        let s = &self.settings;
        if !(s.enemy_speed.is_finite() && s.enemy_speed > 0.0) {
            return Err(LevelError::InvalidSettings(format!(
                "enemy speed must be positive, got {}", s.enemy_speed
            )));
        }
        if s.time_limit == 0 {
            return Err(LevelError::InvalidSettings("time limit must be positive".into()));
        }

        let grid = Grid::from_rows(&self.rows, self.variant)?;

        let players = grid.positions_of(Cell::Player);
        let player = match players.as_slice() {
            [] => return Err(LevelError::NoPlayer),
            [p] => *p,
            many => return Err(LevelError::MultiplePlayers { count: many.len() }),
        };

        if self.variant.requires_targets() && grid.target_count() == 0 {
            return Err(LevelError::NoTargets);
        }

        let enemies = enemies_on(&grid);
        if self.variant.has_enemies() && enemies.is_empty() {
            return Err(LevelError::NoEnemies);
        }

        Ok(LevelData {
            name: self.name.clone(),
            variant: self.variant,
            settings: self.settings.clone(),
            grid,
            player,
            enemies,
        })
    }
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// All levels: embedded first, then any from `levels_dir`.
pub fn load_levels(defaults: &LevelDefaults, levels_dir: &Path) -> Vec<LevelDef> {
    let mut levels = embedded_levels(defaults);
    if levels_dir.is_dir() {
        let extra = load_from_directory(levels_dir, defaults);
        debug!("{} level(s) loaded from {}", extra.len(), levels_dir.display());
        levels.extend(extra);
    }
    levels
}

/// Parse a single level file. Returns `None` if it has no map rows.
pub fn parse_level_file(content: &str, fallback_name: &str, defaults: &LevelDefaults) -> Option<LevelDef> {
    let mut name = None;
    let mut variant = defaults.rules;
    let mut settings = LevelSettings {
        enemy_speed: defaults.enemy_speed,
        time_limit: defaults.time_limit,
    };
    let mut rows = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim_end();
        if trimmed.is_empty() { continue; }

        if rows.is_empty() && is_name_line(trimmed) {
            name = Some(trimmed[1..].trim().to_string());
            continue;
        }
        if rows.is_empty() && trimmed.starts_with('@') && trimmed.contains('=') {
            apply_settings(&trimmed[1..], &mut variant, &mut settings);
            continue;
        }
        rows.push(trimmed.to_string());
    }

    if rows.is_empty() {
        return None;
    }

    Some(LevelDef {
        name: name.unwrap_or_else(|| fallback_name.to_string()),
        variant,
        settings,
        rows,
    })
}

// ══════════════════════════════════════════════════════════════
// Parsing helpers
// ══════════════════════════════════════════════════════════════

/// Every symbol a map row may contain, across both rule-sets.
const MAP_SYMBOLS: &str = ".#PBXTE@";

/// `# Name` or `#Name` is a name line; a map row starting with a wall
/// (`#####`, `#P.E#`) is not. A name made only of map symbols
/// (`#BEEP`) reads as a row.
fn is_name_line(line: &str) -> bool {
    match line.strip_prefix('#') {
        Some(rest) => rest.chars().any(|c| !MAP_SYMBOLS.contains(c)),
        None => false,
    }
}

fn apply_settings(line: &str, variant: &mut Variant, settings: &mut LevelSettings) {
    for pair in line.split_whitespace() {
        let Some((key, value)) = pair.split_once('=') else {
            warn!("level settings: ignoring '{pair}'");
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "rules" => match Variant::parse(value) {
                Some(v) => *variant = v,
                None => warn!("level settings: unknown rules '{value}'"),
            },
            "speed" => match value.parse::<f64>() {
                Ok(v) => settings.enemy_speed = v,
                Err(e) => warn!("level settings: bad speed '{value}': {e}"),
            },
            "time" => match value.parse::<u32>() {
                Ok(v) => settings.time_limit = v,
                Err(e) => warn!("level settings: bad time '{value}': {e}"),
            },
            other => warn!("level settings: unknown key '{other}'"),
        }
    }
}

/// Load all `.txt` level files in a directory, sorted by file name.
fn load_from_directory(dir: &Path, defaults: &LevelDefaults) -> Vec<LevelDef> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!("could not read {}: {e}", dir.display());
            return vec![];
        }
    };

    let mut paths: Vec<_> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().map_or(false, |x| x == "txt"))
        .collect();
    paths.sort();

    let mut levels = vec![];
    for path in paths {
        let stem = path.file_stem().unwrap_or_default().to_string_lossy().to_string();
        match std::fs::read_to_string(&path) {
            Ok(content) => match parse_level_file(&content, &stem, defaults) {
                Some(def) => match def.validate() {
                    Ok(_) => levels.push(def),
                    Err(e) => warn!("skipping {}: {e}", path.display()),
                },
                None => warn!("skipping {}: no map rows", path.display()),
            },
            Err(e) => warn!("could not read {}: {e}", path.display()),
        }
    }
    levels
}

// ══════════════════════════════════════════════════════════════
// Embedded levels
// ══════════════════════════════════════════════════════════════

fn embedded_levels(defaults: &LevelDefaults) -> Vec<LevelDef> {
    vec![
        make_embedded("First Steps", Variant::Classic, defaults, 2.0, 60, &[
            "#######",
            "#.....#",
            "#.PB.X#",
            "#.....#",
            "#######",
        ]),
        make_embedded("Two Crates", Variant::Classic, defaults, 2.0, 60, &[
            "########",
            "#@....X#",
            "#..B...#",
            "#P.B..X#",
            "#......#",
            "########",
        ]),
        make_embedded("Goose Pen", Variant::Pursuit, defaults, 1.0, 60, &[
            "#########",
            "#.......#",
            "#.##.##.#",
            "#.#E..#.#",
            "#...B...#",
            "#.B...B.#",
            "#...P...#",
            "#########",
        ]),
        make_embedded("Corridors", Variant::Pursuit, defaults, 1.5, 45, &[
            "###########",
            "#E...#....#",
            "#.##.#.##.#",
            "#..B...B..#",
            "#.##.#.##.#",
            "#....#...E#",
            "#..B.P.B..#",
            "###########",
        ]),
        make_embedded("Crowded Yard", Variant::Pursuit, defaults, 2.0, 40, &[
            "###########",
            "#E.......E#",
            "#.B.B.B.B.#",
            "#.........#",
            "#.B..P..B.#",
            "#.........#",
            "#.B.B.B.B.#",
            "#E.......E#",
            "###########",
        ]),
    ]
}

/// Embedded levels carry their own tuning; `speed_scale` from the
/// config multiplies the enemy speed.
fn make_embedded(
    name: &str,
    variant: Variant,
    defaults: &LevelDefaults,
    enemy_speed: f64,
    time_limit: u32,
    map: &[&str],
) -> LevelDef {
    LevelDef {
        name: name.to_string(),
        variant,
        settings: LevelSettings {
            enemy_speed: enemy_speed * defaults.speed_scale,
            time_limit,
        },
        rows: map.iter().map(|r| r.to_string()).collect(),
    }
}
