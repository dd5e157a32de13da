use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};
use thiserror::Error;

/// Reasons a [`GameConfig`] cannot describe a playable board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board width and height must be positive (got {width}x{height})")]
    EmptyBoard { width: u32, height: u32 },
    #[error("board {width}x{height} is too large")]
    BoardTooLarge { width: u32, height: u32 },
    #[error("grid size must be positive")]
    ZeroGridSize,
    #[error("grid size {grid_size} does not evenly divide {axis} {length}")]
    MisalignedGrid {
        axis: &'static str,
        length: u32,
        grid_size: u32,
    },
    #[error("board of {cells} cell(s) is too small to play on")]
    TooFewCells { cells: u64 },
    #[error("board of {columns}x{rows} cells exceeds {max} cells per side")]
    TooManyCells { columns: u32, rows: u32, max: u32 },
    #[error("tick rate must be at least one tick per second")]
    ZeroTickRate,
    #[error("{what} at ({x}, {y}) is off the board")]
    OffBoard { what: &'static str, x: i32, y: i32 },
    #[error("{what} at ({x}, {y}) is not on a grid line")]
    OffGrid { what: &'static str, x: i32, y: i32 },
    #[error("snake has two segments at ({x}, {y})")]
    DuplicateSegment { x: i32, y: i32 },
    #[error("food at ({x}, {y}) is on the snake")]
    FoodOnSnake { x: i32, y: i32 },
}

/// Largest board side, in cells, the terminal renderer accepts
pub const MAX_CELLS_PER_SIDE: u32 = 256;

/// Configuration for the game
///
/// Dimensions are in board units; every position on the board is a multiple
/// of `grid_size`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the board
    pub width: u32,
    /// Height of the board
    pub height: u32,
    /// Side length of one grid cell
    pub grid_size: u32,
    /// Simulation ticks per second
    pub tick_rate: u32,
    /// How long the game-over screen stays up before exiting
    pub game_over_delay_ms: u64,
    /// Fixed seed for food placement
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            grid_size: 25,
            tick_rate: 10,
            game_over_delay_ms: 2000,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom board geometry
    pub fn new(width: u32, height: u32, grid_size: u32) -> Self {
        Self {
            width,
            height,
            grid_size,
            ..Default::default()
        }
    }

    /// Create a small board for testing
    pub fn small() -> Self {
        Self::new(100, 100, 10)
    }

    /// Load a configuration from a JSON file; missing fields take their
    /// defaults. The result is not validated.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Use a fixed seed for food placement
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of grid columns
    pub fn columns(&self) -> u32 {
        self.width / self.grid_size.max(1)
    }

    /// Number of grid rows
    pub fn rows(&self) -> u32 {
        self.height / self.grid_size.max(1)
    }

    /// Number of grid cells on the board
    pub fn cell_count(&self) -> u64 {
        u64::from(self.columns()) * u64::from(self.rows())
    }

    /// Time between two simulation ticks
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.tick_rate.max(1)))
    }

    pub fn game_over_delay(&self) -> Duration {
        Duration::from_millis(self.game_over_delay_ms)
    }

    /// Check that the board is non-empty, grid-aligned, not too large to
    /// draw and ticks at a positive rate
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyBoard {
                width: self.width,
                height: self.height,
            });
        }
        if self.grid_size == 0 {
            return Err(ConfigError::ZeroGridSize);
        }
        for (axis, length) in [("width", self.width), ("height", self.height)] {
            if length % self.grid_size != 0 {
                return Err(ConfigError::MisalignedGrid {
                    axis,
                    length,
                    grid_size: self.grid_size,
                });
            }
        }
        // Positions are i32 on the board; keep room for one step past the edge.
        if self.width > i32::MAX as u32 / 2 || self.height > i32::MAX as u32 / 2 {
            return Err(ConfigError::BoardTooLarge {
                width: self.width,
                height: self.height,
            });
        }
        if self.columns() > MAX_CELLS_PER_SIDE || self.rows() > MAX_CELLS_PER_SIDE {
            return Err(ConfigError::TooManyCells {
                columns: self.columns(),
                rows: self.rows(),
                max: MAX_CELLS_PER_SIDE,
            });
        }
        let cells = self.cell_count();
        if cells < 2 {
            return Err(ConfigError::TooFewCells { cells });
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        Ok(())
    }
}
