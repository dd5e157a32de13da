use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{GameState, Position};

/// What occupies one board cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Empty,
    Food,
    Body,
    Head,
}

impl Cell {
    fn span(self) -> Span<'static> {
        match self {
            Cell::Head => Span::styled(
                "■ ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Cell::Body => Span::styled("□ ", Style::default().fg(Color::Green)),
            Cell::Food => Span::styled(
                "● ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Cell::Empty => Span::styled("· ", Style::default().fg(Color::DarkGray)),
        }
    }
}

/// Draws a [`GameState`] into a terminal frame
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    /// Draw the score line, the board (or the game-over panel) and the
    /// controls footer
    pub fn render(&self, frame: &mut Frame, state: &GameState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Score
                Constraint::Min(0),    // Board
                Constraint::Length(1), // Controls
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(state), chunks[0]);

        // Two terminal columns per grid cell, plus the border
        let board_width = u16::try_from(state.columns() * 2 + 2).unwrap_or(u16::MAX);
        let board_height = u16::try_from(state.rows() + 2).unwrap_or(u16::MAX);

        if state.is_alive() {
            let area = centered(chunks[1], board_width, board_height);
            frame.render_widget(self.render_grid(state), area);
        } else {
            let area = centered(chunks[1], board_width.max(36), board_height.max(6));
            frame.render_widget(self.render_game_over(state), area);
        }

        frame.render_widget(self.render_controls(), chunks[2]);
    }

    fn render_grid(&self, state: &GameState) -> Paragraph<'static> {
        let columns = state.columns() as usize;
        let mut cells = vec![Cell::Empty; columns * state.rows() as usize];

        // Later marks win: the head covers the body, the body covers food
        let mut mark = |pos: Position, cell: Cell| {
            if state.is_in_bounds(pos) {
                let (col, row) = state.cell_of(pos);
                cells[row as usize * columns + col as usize] = cell;
            }
        };
        mark(state.food(), Cell::Food);
        for &segment in state.snake().segments() {
            mark(segment, Cell::Body);
        }
        mark(state.snake().head(), Cell::Head);

        let lines: Vec<Line> = cells
            .chunks(columns)
            .map(|row| Line::from(row.iter().map(|cell| cell.span()).collect::<Vec<_>>()))
            .collect();

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(Color::White))
                .title(" Snake "),
        )
    }

    fn render_stats(&self, state: &GameState) -> Paragraph<'static> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        Paragraph::new(Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(
                state.score().to_string(),
                value.add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Length: ", label),
            Span::styled(state.snake().len().to_string(), value),
            Span::raw("    "),
            Span::styled("Ticks: ", label),
            Span::styled(state.ticks().to_string(), value),
        ]))
        .alignment(Alignment::Center)
    }

    fn render_game_over(&self, state: &GameState) -> Paragraph<'static> {
        let reason = state
            .game_over_reason()
            .map(|reason| reason.describe())
            .unwrap_or_default();

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("Game Over! Score: {}", state.score()),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!("The snake {reason}."),
                Style::default().fg(Color::Gray),
            )),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self) -> Paragraph<'static> {
        Paragraph::new(Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ]))
        .alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// A `width` x `height` rectangle centred in `area`, clipped to it
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
