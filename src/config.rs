/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use log::{debug, warn};
use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::variant::Variant;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub defaults: LevelDefaults,
    pub keys: KeyConfig,
    pub levels_dir: PathBuf,
    pub frame_ms: u64,
}

/// Settings applied to level files that leave them out.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelDefaults {
    pub rules: Variant,
    pub enemy_speed: f64,
    pub time_limit: u32,
    pub speed_scale: f64, // multiplies embedded levels' enemy speed
}

impl Default for LevelDefaults {
    fn default() -> Self {
        LevelDefaults {
            rules: Variant::default(),
            enemy_speed: default_enemy_speed(),
            time_limit: default_time_limit(),
            speed_scale: default_speed_scale(),
        }
    }
}

/// Key names per action. Single characters match that key; named keys
/// are `Up`, `Down`, `Left`, `Right`, `Enter`, `Esc`, `Space`, `Backspace`.
#[derive(Clone, Debug)]
pub struct KeyConfig {
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub confirm: Vec<String>,
    pub exit: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    defaults: TomlDefaults,
    #[serde(default)]
    keys: TomlKeys,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlDefaults {
    #[serde(default)]
    rules: Variant,
    #[serde(default = "default_enemy_speed")]
    enemy_speed: f64,
    #[serde(default = "default_time_limit")]
    time_limit: u32,
    #[serde(default = "default_speed_scale")]
    speed_scale: f64,
}

#[derive(Deserialize, Debug)]
struct TomlKeys {
    #[serde(default = "default_up")]
    up: Vec<String>,
    #[serde(default = "default_down")]
    down: Vec<String>,
    #[serde(default = "default_left")]
    left: Vec<String>,
    #[serde(default = "default_right")]
    right: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_exit")]
    exit: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

// ── Defaults ──

fn default_levels_dir() -> String { "levels".into() }
fn default_frame_ms() -> u64 { 5 }
fn default_enemy_speed() -> f64 { 2.0 }  // moves per second
fn default_time_limit() -> u32 { 60 }
fn default_speed_scale() -> f64 { 1.0 }

fn default_up() -> Vec<String> { vec!["Up".into(), "w".into()] }
fn default_down() -> Vec<String> { vec!["Down".into(), "s".into()] }
fn default_left() -> Vec<String> { vec!["Left".into(), "a".into()] }
fn default_right() -> Vec<String> { vec!["Right".into(), "d".into()] }
fn default_confirm() -> Vec<String> { vec!["Enter".into(), "Space".into()] }
fn default_exit() -> Vec<String> { vec!["Esc".into()] }
fn default_quit() -> Vec<String> { vec!["q".into()] }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
            frame_ms: default_frame_ms(),
        }
    }
}

impl Default for TomlDefaults {
    fn default() -> Self {
        TomlDefaults {
            rules: Variant::default(),
            enemy_speed: default_enemy_speed(),
            time_limit: default_time_limit(),
            speed_scale: default_speed_scale(),
        }
    }
}

impl Default for TomlKeys {
    fn default() -> Self {
        TomlKeys {
            up: default_up(),
            down: default_down(),
            left: default_left(),
            right: default_right(),
            confirm: default_confirm(),
            exit: default_exit(),
            quit: default_quit(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::from_toml(toml_cfg, &search_dirs)
    }

    /// Parse config text directly (no file search).
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::from_toml(toml_cfg, &[]))
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        // Resolve levels directory
        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if PathBuf::from(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        let mut defaults = LevelDefaults {
            rules: toml_cfg.defaults.rules,
            enemy_speed: toml_cfg.defaults.enemy_speed,
            time_limit: toml_cfg.defaults.time_limit,
            speed_scale: toml_cfg.defaults.speed_scale,
        };
        if !(defaults.speed_scale.is_finite() && defaults.speed_scale > 0.0) {
            warn!("config: speed_scale {} ignored", defaults.speed_scale);
            defaults.speed_scale = default_speed_scale();
        }

        GameConfig {
            defaults,
            keys: KeyConfig {
                up: toml_cfg.keys.up,
                down: toml_cfg.keys.down,
                left: toml_cfg.keys.left,
                right: toml_cfg.keys.right,
                confirm: toml_cfg.keys.confirm,
                exit: toml_cfg.keys.exit,
                quit: toml_cfg.keys.quit,
            },
            levels_dir,
            frame_ms: toml_cfg.general.frame_ms.max(1),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), &[])
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => {
                        debug!("config loaded from {}", path.display());
                        return cfg;
                    }
                    Err(e) => {
                        warn!("config.toml parse error: {e}; using default settings");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
