//! Game configuration and construction-time errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical row layout: 19 tiles in rows of 3, 4, 5, 4, 3.
pub const STANDARD_LAYOUT: [u8; 5] = [3, 4, 5, 4, 3];

/// Default tile radius used for coordinate spacing
pub const DEFAULT_TILE_SIZE: f64 = 70.0;

/// Errors raised while building a game. These are fatal: a game is never
/// constructed from an inconsistent configuration.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ConfigError {
    #[error("Player count must be between 2 and 4, got {0}")]
    PlayerCount(u8),

    #[error("Invalid row layout: {0}")]
    InvalidLayout(String),

    #[error("Tile size must be a positive finite number, got {0}")]
    InvalidTileSize(f64),

    #[error("Layout has {tiles} tiles but the terrain pool holds {pool}")]
    PoolMismatch { tiles: usize, pool: usize },

    #[error("Invalid tile assignment: {0}")]
    InvalidTiles(String),
}

/// Settings for a new game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of seats (2-4)
    pub players: u8,
    /// RNG seed; a fixed seed replays the whole game
    pub seed: Option<u64>,
    /// Tiles per row, top to bottom
    pub layout: Vec<u8>,
    /// Tile radius, only relevant to coordinate spacing
    pub tile_size: f64,
    /// Whether to place harbors on the coast
    pub harbors: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            players: 4,
            seed: None,
            layout: STANDARD_LAYOUT.to_vec(),
            tile_size: DEFAULT_TILE_SIZE,
            harbors: true,
        }
    }
}

impl GameConfig {
    /// Standard configuration with a fixed seed
    pub fn seeded(players: u8, seed: u64) -> Self {
        Self {
            players,
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Check everything that can be checked without building the board
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=4).contains(&self.players) {
            return Err(ConfigError::PlayerCount(self.players));
        }
        if !self.tile_size.is_finite() || self.tile_size <= 0.0 {
            return Err(ConfigError::InvalidTileSize(self.tile_size));
        }
        validate_layout(&self.layout)
    }
}

/// A layout is valid when it is non-empty, has no empty row, and every pair of
/// consecutive rows differs by exactly one tile.
pub fn validate_layout(rows: &[u8]) -> Result<(), ConfigError> {
    if rows.is_empty() {
        return Err(ConfigError::InvalidLayout("no rows".into()));
    }
    if let Some(row) = rows.iter().position(|&count| count == 0) {
        return Err(ConfigError::InvalidLayout(format!("row {row} is empty")));
    }
    for (row, pair) in rows.windows(2).enumerate() {
        if pair[0].abs_diff(pair[1]) != 1 {
            return Err(ConfigError::InvalidLayout(format!(
                "rows {} and {} hold {} and {} tiles",
                row,
                row + 1,
                pair[0],
                pair[1]
            )));
        }
    }
    Ok(())
}
