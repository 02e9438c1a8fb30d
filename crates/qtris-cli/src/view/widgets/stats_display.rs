use std::iter;

use qtris_engine::GameStats;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::view::widgets::style;

/// Learning progress shown next to the board in auto-play mode.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AgentSummary {
    pub games_played: usize,
    pub average_score: f64,
    pub best_score: usize,
    pub epsilon: f32,
    pub states: usize,
}

pub struct StatsDisplay<'a> {
    stats: &'a GameStats,
    agent: Option<AgentSummary>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> StatsDisplay<'a> {
    pub fn new(stats: &'a GameStats) -> Self {
        Self {
            stats,
            agent: None,
            block: None,
        }
    }

    pub fn agent(self, agent: Option<AgentSummary>) -> Self {
        Self { agent, ..self }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        20 + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        super::cells_to_u16(self.row_count()) + super::block_vertical_margin(self.block.as_ref())
    }

    fn row_count(&self) -> usize {
        GAME_ROWS.len() + self.agent.map_or(0, |_| AGENT_ROWS.len())
    }
}

enum Row<T: 'static> {
    Empty,
    FullLabel(&'static str),
    FullValue(&'static dyn Fn(&T) -> String),
    LabelValue(&'static str, &'static dyn Fn(&T) -> String),
}

const GAME_ROWS: &[Row<GameStats>] = &[
    Row::FullLabel("SCORE:"),
    Row::FullValue(&|stats| stats.score().to_string()),
    Row::Empty,
    Row::LabelValue("LINES:", &|stats| stats.total_cleared_lines().to_string()),
    Row::LabelValue("PIECES:", &|stats| stats.completed_pieces().to_string()),
    Row::Empty,
    Row::LabelValue("SINGLES:", &|stats| stats.line_cleared_counter()[1].to_string()),
    Row::LabelValue("DOUBLES:", &|stats| stats.line_cleared_counter()[2].to_string()),
    Row::LabelValue("TRIPLES:", &|stats| stats.line_cleared_counter()[3].to_string()),
    Row::LabelValue("QUADS:", &|stats| stats.line_cleared_counter()[4].to_string()),
];

const AGENT_ROWS: &[Row<AgentSummary>] = &[
    Row::Empty,
    Row::LabelValue("GAMES:", &|agent| agent.games_played.to_string()),
    Row::FullLabel("AVG SCORE:"),
    Row::FullValue(&|agent| format!("{:.1}", agent.average_score)),
    Row::LabelValue("BEST:", &|agent| agent.best_score.to_string()),
    Row::LabelValue("EPSILON:", &|agent| format!("{:.3}", agent.epsilon)),
    Row::LabelValue("STATES:", &|agent| agent.states.to_string()),
];

impl Widget for StatsDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let rows_areas =
            Layout::vertical((0..self.row_count()).map(|_| Constraint::Length(1))).split(area);
        let (game_areas, agent_areas) = rows_areas.split_at(GAME_ROWS.len().min(rows_areas.len()));

        render_rows(GAME_ROWS, self.stats, game_areas, buf);
        if let Some(agent) = &self.agent {
            render_rows(AGENT_ROWS, agent, agent_areas, buf);
        }
    }
}

fn render_rows<T>(rows: &[Row<T>], value: &T, areas: &[Rect], buf: &mut Buffer) {
    let style = style::DEFAULT;
    for (row, area) in iter::zip(rows, areas.iter().copied()) {
        match row {
            Row::Empty => {}
            Row::FullLabel(label) => {
                Line::styled(*label, style).left_aligned().render(area, buf);
            }
            Row::FullValue(format) => {
                Line::styled(format(value), style)
                    .right_aligned()
                    .render(area, buf);
            }
            Row::LabelValue(label, format) => {
                let [label_area, value_area] = area.layout(&Layout::horizontal([
                    Constraint::Fill(1),
                    Constraint::Fill(1),
                ]));
                Line::styled(*label, style)
                    .left_aligned()
                    .render(label_area, buf);
                Line::styled(format(value), style)
                    .right_aligned()
                    .render(value_area, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        (area.top()..area.bottom())
            .map(|y| {
                (area.left()..area.right())
                    .map(|x| buf[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_game_rows() {
        let mut stats = GameStats::new();
        stats.record_lock(2, 100);
        let display = StatsDisplay::new(&stats);
        assert_eq!(display.height(), 10);

        let area = Rect::new(0, 0, display.width(), display.height());
        let mut buf = Buffer::empty(area);
        display.render(area, &mut buf);

        let text = buffer_text(&buf);
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines[0].trim_end(), "SCORE:");
        assert_eq!(lines[1].trim_start(), "200");
        assert!(lines[3].starts_with("LINES:") && lines[3].ends_with('2'));
        assert!(lines[7].ends_with('1'), "{:?}", lines[7]);
    }

    #[test]
    fn test_agent_rows() {
        let stats = GameStats::new();
        let agent = AgentSummary {
            games_played: 12,
            average_score: 250.0,
            best_score: 900,
            epsilon: 0.5,
            states: 40,
        };
        let display = StatsDisplay::new(&stats).agent(Some(agent));
        assert_eq!(display.height(), 17);

        let area = Rect::new(0, 0, display.width(), display.height());
        let mut buf = Buffer::empty(area);
        display.render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("GAMES:"));
        assert!(text.contains("250.0"));
        assert!(text.contains("0.500"));
    }
}
