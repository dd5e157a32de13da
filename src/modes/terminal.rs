use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, Write, stderr};

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

/// Raw-mode alternate screen, restored when dropped
pub struct TerminalSession<W: Write = Stderr> {
    pub terminal: Terminal<CrosstermBackend<W>>,
}

impl TerminalSession {
    /// Take over stderr: raw mode, alternate screen, hidden cursor
    pub fn enter() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut out = stderr();
        if let Err(err) = execute!(out, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err).context("Failed to enter alternate screen");
        }

        let terminal = match Terminal::new(CrosstermBackend::new(stderr())) {
            Ok(terminal) => terminal,
            Err(err) => {
                let _ = execute!(out, LeaveAlternateScreen);
                let _ = disable_raw_mode();
                return Err(err).context("Failed to create terminal");
            }
        };

        // From here on Drop undoes the setup
        let mut session = Self { terminal };
        session
            .terminal
            .hide_cursor()
            .context("Failed to hide cursor")?;
        session.terminal.clear().context("Failed to clear terminal")?;
        Ok(session)
    }
}

impl<W: Write> Drop for TerminalSession<W> {
    fn drop(&mut self) {
        if let Err(err) = disable_raw_mode() {
            tracing::error!(?err, "failed to disable raw mode");
        }
        if let Err(err) = execute!(self.terminal.backend_mut(), LeaveAlternateScreen) {
            tracing::error!(?err, "failed to leave alternate screen");
        }
        if let Err(err) = self.terminal.show_cursor() {
            tracing::error!(?err, "failed to show cursor");
        }
    }
}
