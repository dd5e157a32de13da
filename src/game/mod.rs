//! Core game logic module for Snake
//!
//! Pure simulation state with no I/O, terminal or timing dependencies. The
//! driver in [`crate::modes`] owns those and feeds this module one tick at a
//! time.

pub mod config;
pub mod direction;
pub mod engine;
pub mod state;

// Re-export commonly used types
pub use config::{ConfigError, GameConfig, MAX_CELLS_PER_SIDE};
pub use direction::Direction;
pub use engine::{GameOverReason, TickOutcome};
pub use state::{GameState, Position, Snake};
