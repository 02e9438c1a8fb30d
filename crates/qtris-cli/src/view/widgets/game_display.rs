use qtris_engine::{GameState, GameView, PieceKind};
use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    style::{Color, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};

use crate::view::{
    Palette,
    widgets::{AgentSummary, BoardDisplay, NextDisplay, StatsDisplay, color, style},
};

/// Board, statistics and next pieces of one game, with a popup when it is not running.
#[derive(Debug)]
pub struct GameDisplay<'a> {
    view: GameView<'a>,
    palette: &'a Palette,
    next_pieces: Vec<PieceKind>,
    agent: Option<AgentSummary>,
    show_ghost: bool,
    paused: bool,
    turbo: bool,
}

impl<'a> GameDisplay<'a> {
    pub const NEXT_PIECES: usize = 5;

    pub fn new<I>(view: GameView<'a>, next_pieces: I, palette: &'a Palette) -> Self
    where
        I: IntoIterator<Item = PieceKind>,
    {
        Self {
            view,
            palette,
            next_pieces: next_pieces.into_iter().take(Self::NEXT_PIECES).collect(),
            agent: None,
            show_ghost: true,
            paused: false,
            turbo: false,
        }
    }

    pub fn agent(self, agent: AgentSummary) -> Self {
        Self {
            agent: Some(agent),
            ..self
        }
    }

    pub fn show_ghost(self, show_ghost: bool) -> Self {
        Self { show_ghost, ..self }
    }

    pub fn paused(self, paused: bool) -> Self {
        Self { paused, ..self }
    }

    pub fn turbo(self, turbo: bool) -> Self {
        Self { turbo, ..self }
    }

    /// Height of the tallest panel.
    pub fn height(&self) -> u16 {
        let border = color::WHITE;
        [
            self.board_display(border).height(),
            self.next_display(border).height(),
            self.stats_display(border).height(),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    fn border_color(&self) -> Color {
        match self.view.state {
            GameState::GameOver => color::RED,
            GameState::Running if self.paused => color::YELLOW,
            GameState::Running if self.turbo => color::MAGENTA,
            GameState::Running => color::WHITE,
        }
    }

    fn board_display(&self, border: Color) -> BoardDisplay<'a> {
        let ghost = if self.show_ghost { self.view.ghost } else { None };
        BoardDisplay::new(self.view.board, self.palette)
            .ghost(ghost)
            .falling_piece(self.view.current)
            .block(
                Block::bordered()
                    .border_style(border)
                    .style(style::DEFAULT),
            )
    }

    fn next_display(&self, border: Color) -> NextDisplay<'a> {
        NextDisplay::new(self.next_pieces.iter().copied(), self.palette)
            .block(panel_block("NEXT", border))
    }

    fn stats_display(&self, border: Color) -> StatsDisplay<'a> {
        StatsDisplay::new(self.view.stats)
            .agent(self.agent)
            .block(panel_block("STATS", border))
    }
}

fn panel_block(title: &'static str, border: Color) -> Block<'static> {
    Block::bordered()
        .title(Line::from(title).centered())
        .padding(Padding::symmetric(1, 0))
        .border_style(border)
        .style(style::DEFAULT)
}

impl Widget for GameDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &GameDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = self.border_color();
        let game_board = self.board_display(border);
        let next = self.next_display(border);
        let stats = self.stats_display(border);

        let [left_column, center_column, right_column] = Layout::horizontal([
            Constraint::Length(stats.width()),
            Constraint::Length(game_board.width()),
            Constraint::Length(next.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);

        let [stats_area] = Layout::vertical([Constraint::Length(stats.height())]).areas(left_column);
        let [board_area] =
            Layout::vertical([Constraint::Length(game_board.height())]).areas(center_column);
        let [next_area] = Layout::vertical([Constraint::Length(next.height())]).areas(right_column);

        let game_board_width = game_board.width();
        stats.render(stats_area, buf);
        game_board.render(board_area, buf);
        next.render(next_area, buf);

        let popup = match self.view.state {
            GameState::GameOver => Some((
                "GAME OVER!!",
                Style::new().fg(color::WHITE).bg(color::RED),
            )),
            GameState::Running if self.paused => Some((
                "PAUSED",
                Style::new().fg(color::BLACK).bg(color::YELLOW),
            )),
            GameState::Running => None,
        };

        if let Some((text, style)) = popup {
            let block = Block::new().style(style);
            let text = Text::styled(text, style).centered();
            let area =
                board_area.centered(Constraint::Length(game_board_width), Constraint::Length(3));
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(1)), buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use qtris_engine::{GameConfig, GameController, PieceSeed};

    use super::*;

    fn render(display: &GameDisplay<'_>) -> Buffer {
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        display.render(area, &mut buf);
        buf
    }

    fn contains(buf: &Buffer, needle: &str) -> bool {
        let area = buf.area;
        (area.top()..area.bottom()).any(|y| {
            (area.left()..area.right())
                .map(|x| buf[(x, y)].symbol())
                .collect::<String>()
                .contains(needle)
        })
    }

    #[test]
    fn test_popup_follows_state() {
        let seed: PieceSeed = "00000000000000000000000000000001".parse().unwrap();
        let game = GameController::with_seed(GameConfig::default(), seed);
        let palette = Palette::default();

        let running = GameDisplay::new(game.view(), game.next_pieces(), &palette);
        assert_eq!(running.height(), 22);
        let buf = render(&running);
        assert!(contains(&buf, "NEXT"));
        assert!(contains(&buf, "SCORE:"));
        assert!(!contains(&buf, "PAUSED"));

        let paused = GameDisplay::new(game.view(), game.next_pieces(), &palette).paused(true);
        assert!(contains(&render(&paused), "PAUSED"));
    }

    #[test]
    fn test_agent_panel() {
        let game = GameController::new(GameConfig::default());
        let palette = Palette::default();
        let display = GameDisplay::new(game.view(), game.next_pieces(), &palette)
            .agent(AgentSummary::default());
        assert_eq!(display.height(), 22);
        assert!(contains(&render(&display), "GAMES:"));
    }
}
