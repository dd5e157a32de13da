use rand::{SeedableRng, rngs::StdRng};
use std::collections::HashSet;

use super::{
    config::{ConfigError, GameConfig},
    direction::Direction,
    engine::GameOverReason,
};

/// A grid-aligned position on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Create a position from board coordinates
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move one grid step in a direction
    pub fn stepped(&self, direction: Direction, grid_size: i32) -> Self {
        let (dx, dy) = direction.delta(grid_size);
        self.moved_by(dx, dy)
    }
}

/// The snake's segments, head first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    body: Vec<Position>,
}

impl Snake {
    /// A one-segment snake
    pub fn new(head: Position) -> Self {
        Self { body: vec![head] }
    }

    /// Build a snake from explicit segments, head first. Returns `None` for an
    /// empty list.
    pub fn from_segments(body: Vec<Position>) -> Option<Self> {
        if body.is_empty() {
            None
        } else {
            Some(Self { body })
        }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    /// All segments, head first
    pub fn segments(&self) -> &[Position] {
        &self.body
    }

    /// True if any segment, head and tail included, sits on `pos`
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Always false; a snake keeps at least its head
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Grow a new head in front of the current one
    pub(crate) fn push_head(&mut self, pos: Position) {
        self.body.insert(0, pos);
    }

    /// Drop the last segment, never the head
    pub(crate) fn pop_tail(&mut self) {
        if self.body.len() > 1 {
            self.body.pop();
        }
    }
}

/// Complete simulation state of one session
#[derive(Debug, Clone)]
pub struct GameState {
    pub(crate) snake: Snake,
    pub(crate) direction: Direction,
    pub(crate) food: Position,
    pub(crate) score: u32,
    pub(crate) ticks: u32,
    pub(crate) game_over: Option<GameOverReason>,
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) grid_size: i32,
    pub(crate) rng: StdRng,
}

impl GameState {
    /// Start a session: one segment at the board centre heading right, with
    /// food already placed.
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = config.grid_size;
        let center = Position::new(
            (config.width / 2 / grid * grid) as i32,
            (config.height / 2 / grid * grid) as i32,
        );

        let mut state = Self::bare(config, Snake::new(center), Direction::Right, center);
        state.food = state.generate_food().ok_or(ConfigError::TooFewCells {
            cells: config.cell_count(),
        })?;
        Ok(state)
    }

    /// Assemble a state from explicit parts, e.g. to resume or stage a
    /// position
    ///
    /// Every segment and the food must be on the board and on a grid line,
    /// segments must be distinct and the food must not sit on the snake.
    pub fn from_parts(
        config: &GameConfig,
        snake: Snake,
        direction: Direction,
        food: Position,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = Self::bare(config, snake, direction, food);

        let mut seen = HashSet::with_capacity(state.snake.len());
        for &segment in state.snake.segments() {
            state.check_placement("snake segment", segment)?;
            if !seen.insert(segment) {
                return Err(ConfigError::DuplicateSegment {
                    x: segment.x,
                    y: segment.y,
                });
            }
        }

        state.check_placement("food", food)?;
        if seen.contains(&food) {
            return Err(ConfigError::FoodOnSnake {
                x: food.x,
                y: food.y,
            });
        }

        Ok(state)
    }

    fn check_placement(&self, what: &'static str, pos: Position) -> Result<(), ConfigError> {
        let (x, y) = (pos.x, pos.y);
        if !self.is_in_bounds(pos) {
            return Err(ConfigError::OffBoard { what, x, y });
        }
        if x % self.grid_size != 0 || y % self.grid_size != 0 {
            return Err(ConfigError::OffGrid { what, x, y });
        }
        Ok(())
    }

    fn bare(config: &GameConfig, snake: Snake, direction: Direction, food: Position) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            snake,
            direction,
            food,
            score: 0,
            ticks: 0,
            game_over: None,
            width: config.width as i32,
            height: config.height as i32,
            grid_size: config.grid_size as i32,
            rng,
        }
    }

    /// The snake, head first
    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    /// Direction the next tick moves in
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Current food position
    pub fn food(&self) -> Position {
        self.food
    }

    /// Food eaten so far
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Ticks that moved or grew the snake; the tick that ends the game is
    /// not counted
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// False once the game is over
    pub fn is_alive(&self) -> bool {
        self.game_over.is_none()
    }

    /// Why the game ended, if it has
    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        self.game_over
    }

    /// Number of grid columns
    pub fn columns(&self) -> i32 {
        self.width / self.grid_size
    }

    /// Number of grid rows
    pub fn rows(&self) -> i32 {
        self.height / self.grid_size
    }

    /// Check if a position is within `[0, width) x [0, height)`
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Grid cell (column, row) containing `pos`
    pub fn cell_of(&self, pos: Position) -> (i32, i32) {
        (pos.x / self.grid_size, pos.y / self.grid_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_movement() {
        let pos = Position::new(50, 50);
        assert_eq!(pos.moved_by(10, 0), Position::new(60, 50));
        assert_eq!(pos.stepped(Direction::Up, 10), Position::new(50, 40));
        assert_eq!(pos.stepped(Direction::Left, 25), Position::new(25, 50));
    }

    #[test]
    fn test_snake_from_segments() {
        assert!(Snake::from_segments(Vec::new()).is_none());

        let snake =
            Snake::from_segments(vec![Position::new(50, 50), Position::new(40, 50)]).unwrap();
        assert_eq!(snake.len(), 2);
        assert_eq!(snake.head(), Position::new(50, 50));
        assert_eq!(snake.tail(), Position::new(40, 50));
        assert!(snake.occupies(Position::new(40, 50)));
        assert!(!snake.occupies(Position::new(30, 50)));
    }

    #[test]
    fn test_pop_tail_keeps_head() {
        let mut snake = Snake::new(Position::new(0, 0));
        snake.pop_tail();
        assert_eq!(snake.len(), 1);

        snake.push_head(Position::new(10, 0));
        snake.pop_tail();
        assert_eq!(snake.segments(), &[Position::new(10, 0)]);
    }

    #[test]
    fn test_new_session() {
        let state = GameState::new(&GameConfig::small().with_seed(1)).unwrap();
        assert!(state.is_alive());
        assert_eq!(state.score(), 0);
        assert_eq!(state.ticks(), 0);
        assert_eq!(state.snake().segments(), &[Position::new(50, 50)]);
        assert_eq!(state.direction(), Direction::Right);
        assert!(!state.snake().occupies(state.food()));
        assert!(state.is_in_bounds(state.food()));
        assert_eq!(state.food().x % 10, 0);
        assert_eq!(state.food().y % 10, 0);
    }

    #[test]
    fn test_center_rounds_down_to_grid() {
        let state = GameState::new(&GameConfig::new(800, 600, 25)).unwrap();
        assert_eq!(state.snake().head(), Position::new(400, 300));

        let state = GameState::new(&GameConfig::new(60, 60, 20)).unwrap();
        assert_eq!(state.snake().head(), Position::new(20, 20));
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let err = GameState::new(&GameConfig::new(100, 100, 30)).unwrap_err();
        assert!(matches!(err, ConfigError::MisalignedGrid { .. }));
    }

    #[test]
    fn test_bounds_checking() {
        let state = GameState::new(&GameConfig::small()).unwrap();

        assert!(state.is_in_bounds(Position::new(0, 0)));
        assert!(state.is_in_bounds(Position::new(90, 90)));
        assert!(!state.is_in_bounds(Position::new(-10, 0)));
        assert!(!state.is_in_bounds(Position::new(100, 0)));
        assert!(!state.is_in_bounds(Position::new(0, 100)));
    }

    #[test]
    fn test_cell_of() {
        let state = GameState::new(&GameConfig::small()).unwrap();
        assert_eq!(state.columns(), 10);
        assert_eq!(state.rows(), 10);
        assert_eq!(state.cell_of(Position::new(90, 30)), (9, 3));
    }

    fn staged(segments: &[(i32, i32)], food: (i32, i32)) -> Result<GameState, ConfigError> {
        let snake = Snake::from_segments(
            segments
                .iter()
                .map(|&(x, y)| Position::new(x, y))
                .collect(),
        )
        .unwrap();
        GameState::from_parts(
            &GameConfig::small(),
            snake,
            Direction::Right,
            Position::new(food.0, food.1),
        )
    }

    #[test]
    fn test_from_parts_accepts_valid_layout() {
        let state = staged(&[(50, 50), (40, 50)], (0, 0)).unwrap();
        assert_eq!(state.snake().len(), 2);
        assert_eq!(state.food(), Position::new(0, 0));
    }

    #[test]
    fn test_from_parts_rejects_segment_off_board() {
        assert_eq!(
            staged(&[(i32::MAX, 5)], (0, 0)).unwrap_err(),
            ConfigError::OffBoard {
                what: "snake segment",
                x: i32::MAX,
                y: 5
            }
        );
        assert!(matches!(
            staged(&[(50, 50), (50, -10)], (0, 0)),
            Err(ConfigError::OffBoard { .. })
        ));
    }

    #[test]
    fn test_from_parts_rejects_segment_off_grid() {
        assert_eq!(
            staged(&[(55, 50)], (0, 0)).unwrap_err(),
            ConfigError::OffGrid {
                what: "snake segment",
                x: 55,
                y: 50
            }
        );
    }

    #[test]
    fn test_from_parts_rejects_duplicate_segment() {
        assert_eq!(
            staged(&[(50, 50), (40, 50), (50, 50)], (0, 0)).unwrap_err(),
            ConfigError::DuplicateSegment { x: 50, y: 50 }
        );
    }

    #[test]
    fn test_from_parts_rejects_bad_food() {
        assert_eq!(
            staged(&[(50, 50)], (100, 0)).unwrap_err(),
            ConfigError::OffBoard {
                what: "food",
                x: 100,
                y: 0
            }
        );
        assert_eq!(
            staged(&[(50, 50)], (0, 3)).unwrap_err(),
            ConfigError::OffGrid {
                what: "food",
                x: 0,
                y: 3
            }
        );
        assert_eq!(
            staged(&[(50, 50), (40, 50)], (40, 50)).unwrap_err(),
            ConfigError::FoodOnSnake { x: 40, y: 50 }
        );
    }
}
