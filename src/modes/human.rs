use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::{Stream, StreamExt};
use std::io;
use tokio::time::{MissedTickBehavior, interval, sleep};
use tracing::{debug, info};

use super::terminal::{TerminalSession, Tui};
use crate::game::{Direction, GameConfig, GameOverReason, GameState, TickOutcome};
use crate::input::{InputHandler, KeyAction};
use crate::render::Renderer;

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub score: u32,
    pub ticks: u32,
    pub length: usize,
    /// `None` if the player quit before losing
    pub reason: Option<GameOverReason>,
}

/// Keyboard-driven play in the terminal
pub struct HumanMode {
    config: GameConfig,
    state: GameState,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    pending_direction: Option<Direction>,
}

impl HumanMode {
    /// Validate the configuration and set up a fresh session
    pub fn new(config: GameConfig) -> Result<Self> {
        let state = GameState::new(&config).context("Invalid game configuration")?;

        Ok(Self {
            config,
            state,
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
            pending_direction: None,
        })
    }

    /// Play until the game ends or the player quits. The terminal is restored
    /// before this returns, on success and on error alike.
    pub async fn run(&mut self) -> Result<SessionSummary> {
        info!(
            width = self.config.width,
            height = self.config.height,
            grid_size = self.config.grid_size,
            tick_rate = self.config.tick_rate,
            seed = ?self.config.seed,
            "session started"
        );

        let mut session = TerminalSession::enter()?;
        self.run_game_loop(&mut session.terminal).await?;
        drop(session);

        Ok(self.summary())
    }

    /// Score and outcome of the session so far
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            score: self.state.score(),
            ticks: self.state.ticks(),
            length: self.state.snake().len(),
            reason: self.state.game_over_reason(),
        }
    }

    async fn run_game_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut tick_timer = interval(self.config.tick_interval());
        tick_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.draw(terminal)?;

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(Event::Resize(..))) => self.draw(terminal)?,
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(err)) => return Err(err).context("Failed to read terminal event"),
                        None => self.should_quit = true,
                    }
                }

                _ = tick_timer.tick() => {
                    self.update_game();
                    self.draw(terminal)?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                info!(score = self.state.score(), "quit requested");
                return Ok(());
            }

            if !self.state.is_alive() {
                return self
                    .hold_game_over(&mut event_stream, |mode| mode.draw(terminal))
                    .await;
            }
        }
    }

    /// Keep the game-over screen up for the configured delay; a quit key cuts
    /// it short.
    async fn hold_game_over<S>(
        &mut self,
        events: &mut S,
        mut redraw: impl FnMut(&Self) -> Result<()>,
    ) -> Result<()>
    where
        S: Stream<Item = io::Result<Event>> + Unpin,
    {
        let hold = sleep(self.config.game_over_delay());
        tokio::pin!(hold);

        loop {
            tokio::select! {
                _ = &mut hold => return Ok(()),

                maybe_event = events.next() => {
                    match maybe_event {
                        Some(Ok(Event::Resize(..))) => redraw(self)?,
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(err)) => return Err(err).context("Failed to read terminal event"),
                        None => return Ok(()),
                    }
                    if self.should_quit {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn handle_event(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        // Only process key press events, not release
        if key.kind != KeyEventKind::Press {
            return;
        }

        match self.input_handler.handle_key_event(key) {
            KeyAction::Turn(direction) => {
                // Applied on the next tick; the last request wins
                self.pending_direction = Some(direction);
            }
            KeyAction::Quit => {
                self.should_quit = true;
            }
            KeyAction::None => {}
        }
    }

    fn update_game(&mut self) -> TickOutcome {
        if let Some(direction) = self.pending_direction.take() {
            self.state.set_direction(direction);
        }

        let outcome = self.state.advance();
        if outcome == TickOutcome::Grew {
            debug!(
                score = self.state.score(),
                food = ?self.state.food(),
                "snake grew"
            );
        }
        outcome
    }

    fn draw(&self, terminal: &mut Tui) -> Result<()> {
        terminal
            .draw(|frame| self.renderer.render(frame, &self.state))
            .context("Failed to draw frame")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Position;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventState, KeyModifiers};
    use std::time::{Duration, Instant};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn mode() -> HumanMode {
        HumanMode::new(GameConfig::small().with_seed(11)).unwrap()
    }

    #[test]
    fn test_game_initialization() {
        let mode = mode();
        assert!(mode.state.is_alive());
        assert_eq!(mode.state.score(), 0);
        assert_eq!(mode.state.snake().head(), Position::new(50, 50));
        assert!(mode.pending_direction.is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = HumanMode::new(GameConfig::new(100, 100, 0)).err().unwrap();
        assert!(format!("{err:#}").contains("grid size must be positive"));
    }

    #[test]
    fn test_direction_applied_on_tick() {
        let mut mode = mode();
        mode.handle_event(key(KeyCode::Down));
        assert_eq!(mode.state.direction(), Direction::Right);

        mode.update_game();
        assert_eq!(mode.state.direction(), Direction::Down);
        assert_eq!(mode.state.snake().head(), Position::new(50, 60));
        assert!(mode.pending_direction.is_none());
    }

    #[test]
    fn test_last_direction_between_ticks_wins() {
        let mut mode = mode();
        mode.handle_event(key(KeyCode::Up));
        mode.handle_event(key(KeyCode::Char('s')));
        assert_eq!(mode.pending_direction, Some(Direction::Down));
    }

    #[test]
    fn test_reversal_ignored_on_tick() {
        let mut mode = mode();
        mode.handle_event(key(KeyCode::Left));
        mode.update_game();
        assert_eq!(mode.state.direction(), Direction::Right);
        assert_eq!(mode.state.snake().head(), Position::new(60, 50));
    }

    #[test]
    fn test_key_release_ignored() {
        let mut mode = mode();
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        mode.handle_event(Event::Key(release));
        assert!(!mode.should_quit);
    }

    #[test]
    fn test_quit_key() {
        let mut mode = mode();
        mode.handle_event(key(KeyCode::Esc));
        assert!(mode.should_quit);
    }

    #[test]
    fn test_summary_after_wall() {
        let mut mode = mode();
        let mut outcome = TickOutcome::Moved;
        for _ in 0..10 {
            outcome = mode.update_game();
            if outcome != TickOutcome::Moved && outcome != TickOutcome::Grew {
                break;
            }
        }

        assert_eq!(outcome, TickOutcome::GameOver(GameOverReason::Wall));
        let summary = mode.summary();
        assert_eq!(summary.reason, Some(GameOverReason::Wall));
        assert_eq!(summary.score, mode.state.score());
        assert_eq!(summary.length, 1 + summary.score as usize);
    }

    fn finished_mode(game_over_delay_ms: u64) -> HumanMode {
        let mut config = GameConfig::small().with_seed(11);
        config.game_over_delay_ms = game_over_delay_ms;
        let mut mode = HumanMode::new(config).unwrap();
        while mode.state.is_alive() {
            mode.update_game();
        }
        mode
    }

    fn keys_then_silence(
        events: Vec<Event>,
    ) -> impl Stream<Item = io::Result<Event>> + Unpin {
        futures::stream::iter(events.into_iter().map(Ok)).chain(futures::stream::pending())
    }

    #[tokio::test]
    async fn test_quit_key_ends_hold_early() {
        let mut mode = finished_mode(60_000);
        let mut events = keys_then_silence(vec![key(KeyCode::Down), key(KeyCode::Char('q'))]);

        let held = tokio::time::timeout(
            Duration::from_secs(5),
            mode.hold_game_over(&mut events, |_| Ok(())),
        )
        .await;

        assert!(matches!(held, Ok(Ok(()))));
        assert!(mode.should_quit);
    }

    #[tokio::test]
    async fn test_hold_lasts_configured_delay() {
        let mut mode = finished_mode(50);
        let mut events = keys_then_silence(vec![key(KeyCode::Up), key(KeyCode::Char('x'))]);
        let start = Instant::now();

        mode.hold_game_over(&mut events, |_| Ok(())).await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(50));
        assert!(!mode.should_quit);
        assert!(!mode.state.is_alive());
    }

    #[tokio::test]
    async fn test_resize_redraws_during_hold() {
        let mut mode = finished_mode(20);
        let mut events = keys_then_silence(vec![Event::Resize(80, 24), Event::Resize(100, 30)]);
        let mut redraws = 0;

        mode.hold_game_over(&mut events, |_| {
            redraws += 1;
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(redraws, 2);
    }

    #[tokio::test]
    async fn test_hold_ends_when_input_closes() {
        let mut mode = finished_mode(60_000);
        let mut events = futures::stream::empty::<io::Result<Event>>();

        let held = tokio::time::timeout(
            Duration::from_secs(5),
            mode.hold_game_over(&mut events, |_| Ok(())),
        )
        .await;

        assert!(matches!(held, Ok(Ok(()))));
    }
}
