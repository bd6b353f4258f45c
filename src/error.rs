/// Error kinds shared by the engine and the level loader.
///
/// None of these cross a tick boundary: moves and ticks report failure
/// through their result structs. Errors only surface from construction
/// paths (`Grid::from_rows`, `Game::select_level`) and from the
/// bounds-checked grid accessors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("position ({row}, {col}) is outside the grid")]
    OutOfBounds { row: usize, col: usize },

    #[error("no player on the grid")]
    PlayerNotFound,

    #[error("invalid level data: {0}")]
    InvalidLevel(#[from] LevelError),
}

/// Reasons a level is rejected before a round starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelError {
    #[error("level has no rows")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged { row: usize, expected: usize, found: usize },

    #[error("unknown symbol '{symbol}' at ({row}, {col})")]
    UnknownSymbol { row: usize, col: usize, symbol: char },

    #[error("level has no player marker")]
    NoPlayer,

    #[error("level has {count} player markers")]
    MultiplePlayers { count: usize },

    #[error("classic level has no targets")]
    NoTargets,

    #[error("pursuit level has no enemies")]
    NoEnemies,

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("no level at index {index} ({count} available)")]
    IndexOutOfRange { index: usize, count: usize },
}
