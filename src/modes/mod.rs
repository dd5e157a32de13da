pub mod human;
mod terminal;

pub use human::{HumanMode, SessionSummary};
pub use terminal::TerminalSession;
