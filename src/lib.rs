//! Grid Snake - the classic Snake arcade game in the terminal
//!
//! This library provides:
//! - Core game logic with no I/O (game module)
//! - Keyboard input mapping (input module)
//! - TUI rendering (render module)
//! - The interactive driver that ties them to a terminal (modes module)

pub mod game;
pub mod input;
pub mod modes;
pub mod render;
