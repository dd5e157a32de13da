use rand::Rng;
use tracing::{debug, info};

use super::{
    direction::Direction,
    state::{GameState, Position},
};

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    /// Head left the board
    Wall,
    /// Head ran into a body segment
    SelfCollision,
    /// The snake covers every cell, so no food can be placed
    BoardFull,
}

impl GameOverReason {
    /// Short phrase completing "The snake ..."
    pub fn describe(self) -> &'static str {
        match self {
            GameOverReason::Wall => "hit the wall",
            GameOverReason::SelfCollision => "ran into itself",
            GameOverReason::BoardFull => "filled the board",
        }
    }
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Head advanced, tail followed
    Moved,
    /// Head landed on food; the snake is one segment longer
    Grew,
    /// The session is over
    GameOver(GameOverReason),
}

impl GameState {
    /// Steer the snake. Reversing onto itself and steering a finished game
    /// are ignored.
    pub fn set_direction(&mut self, requested: Direction) {
        if !self.is_alive() || self.direction.is_opposite(requested) {
            return;
        }
        self.direction = requested;
    }

    /// Execute one tick
    ///
    /// The new head is checked against every current segment, tail included,
    /// before the tail is dropped: stepping into the cell the tail is about to
    /// leave still ends the game.
    pub fn advance(&mut self) -> TickOutcome {
        if let Some(reason) = self.game_over {
            return TickOutcome::GameOver(reason);
        }

        // Calculate new head position
        let new_head = self.snake.head().stepped(self.direction, self.grid_size);

        if let Some(reason) = self.check_collision(new_head) {
            self.game_over = Some(reason);
            info!(
                ?reason,
                score = self.score,
                ticks = self.ticks,
                "game over"
            );
            return TickOutcome::GameOver(reason);
        }

        self.snake.push_head(new_head);
        self.ticks += 1;

        if new_head != self.food {
            self.snake.pop_tail();
            return TickOutcome::Moved;
        }

        self.score += 1;
        debug!(score = self.score, length = self.snake.len(), "food eaten");

        match self.generate_food() {
            Some(food) => {
                self.food = food;
                TickOutcome::Grew
            }
            None => {
                let reason = GameOverReason::BoardFull;
                self.game_over = Some(reason);
                info!(?reason, score = self.score, ticks = self.ticks, "game over");
                TickOutcome::GameOver(reason)
            }
        }
    }

    /// Pick a random free cell by rejection sampling
    ///
    /// Returns `None` only when the snake covers the whole board.
    pub fn generate_food(&mut self) -> Option<Position> {
        let columns = self.columns();
        let rows = self.rows();
        let cells = i64::from(columns) * i64::from(rows);
        if self.snake.len() as i64 >= cells {
            return None;
        }

        loop {
            let x = self.rng.gen_range(0..columns) * self.grid_size;
            let y = self.rng.gen_range(0..rows) * self.grid_size;
            let pos = Position::new(x, y);

            if !self.snake.occupies(pos) {
                return Some(pos);
            }
        }
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, pos: Position) -> Option<GameOverReason> {
        // Check wall collision
        if !self.is_in_bounds(pos) {
            return Some(GameOverReason::Wall);
        }

        // Check self-collision, tail included
        if self.snake.occupies(pos) {
            return Some(GameOverReason::SelfCollision);
        }
        None
    }
}
