use std::iter;

use qtris_engine::PieceKind;
use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::view::{
    Palette,
    widgets::{BlockDisplay, Tile},
};

/// Upcoming piece kinds, top to bottom in spawn order.
#[derive(Debug)]
pub struct NextDisplay<'a> {
    pieces: Vec<PieceKind>,
    palette: &'a Palette,
    block: Option<BlockWidget<'a>>,
}

impl<'a> NextDisplay<'a> {
    pub fn new<I>(pieces: I, palette: &'a Palette) -> Self
    where
        I: IntoIterator<Item = PieceKind>,
    {
        Self {
            pieces: pieces.into_iter().collect(),
            palette,
            block: None,
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        4 * BlockDisplay::width() + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        let num_pieces = super::cells_to_u16(self.pieces.len());
        let padding = num_pieces.saturating_sub(1);
        2 * BlockDisplay::height() * num_pieces
            + padding
            + super::block_vertical_margin(self.block.as_ref())
    }
}

impl Widget for NextDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &NextDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);
        let layout = Layout::vertical(
            self.pieces
                .iter()
                .map(|_| Constraint::Length(2 * BlockDisplay::height())),
        )
        .flex(Flex::SpaceBetween);

        for (slot, kind) in iter::zip(area.layout_vec(&layout), &self.pieces) {
            render_shape(*kind, self.palette, slot, buf);
        }
    }
}

fn render_shape(kind: PieceKind, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let shape = kind.spawn_shape();
    let (width, height) = (
        super::cells_to_u16(shape.width()),
        super::cells_to_u16(shape.height()),
    );
    let shape_area = area.centered(
        Constraint::Length(width * BlockDisplay::width()),
        Constraint::Length(height * BlockDisplay::height()),
    );
    let horizontal =
        Layout::horizontal((0..width).map(|_| Constraint::Length(BlockDisplay::width())));
    let vertical = Layout::vertical((0..height).map(|_| Constraint::Length(BlockDisplay::height())));

    let occupied = BlockDisplay::from_tile(Tile::Piece(kind), palette, false);
    let empty = BlockDisplay::from_tile(Tile::Empty, palette, false);
    for (y, row) in shape_area.layout_vec(&vertical).into_iter().enumerate() {
        for (x, cell) in row.layout_vec(&horizontal).into_iter().enumerate() {
            let display = if shape.is_occupied(x, y) {
                &occupied
            } else {
                &empty
            };
            display.render(cell, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use ratatui::style::Color;

    use super::*;

    #[test]
    fn test_size() {
        let palette = Palette::default();
        let display = NextDisplay::new([PieceKind::I, PieceKind::O, PieceKind::T], &palette);
        assert_eq!(display.width(), 8);
        assert_eq!(display.height(), 2 * 3 + 2);
    }

    #[test]
    fn test_render_o_piece() {
        let palette = Palette::default();
        let display = NextDisplay::new([PieceKind::O], &palette);
        let area = Rect::new(0, 0, display.width(), display.height());
        let mut buf = Buffer::empty(area);
        display.render(area, &mut buf);

        let yellow = Color::Rgb(255, 255, 0);
        for (x, y) in [(2, 0), (5, 0), (2, 1), (5, 1)] {
            assert_eq!(buf[(x, y)].bg, yellow, "({x}, {y})");
        }
        assert_ne!(buf[(0, 0)].bg, yellow);
    }
}
