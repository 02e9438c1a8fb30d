use qtris_engine::{Cell, PieceKind};
use ratatui::{
    prelude::{Buffer, Rect},
    style::Style,
    widgets::{Paragraph, Widget},
};

use crate::view::{Palette, widgets::style};

/// What occupies one grid position on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Empty,
    /// Landing preview of the falling piece.
    Ghost,
    Piece(PieceKind),
}

impl From<Cell> for Tile {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Empty => Tile::Empty,
            Cell::Occupied(kind) => Tile::Piece(kind),
        }
    }
}

#[derive(Debug)]
pub struct BlockDisplay {
    style: Style,
    symbol: &'static str,
}

impl BlockDisplay {
    pub const fn new(style: Style, symbol: &'static str) -> Self {
        Self { style, symbol }
    }

    pub fn width() -> u16 {
        2
    }

    pub fn height() -> u16 {
        1
    }

    pub fn from_tile(tile: Tile, palette: &Palette, show_dots: bool) -> Self {
        match tile {
            Tile::Empty => {
                if show_dots {
                    Self::new(style::EMPTY_DOT, ".")
                } else {
                    Self::new(style::EMPTY, "")
                }
            }
            Tile::Ghost => Self::new(style::GHOST, "[]"),
            Tile::Piece(kind) => Self::new(style::bg_only(palette.color(kind)), ""),
        }
    }
}

impl Widget for BlockDisplay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BlockDisplay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Paragraph fills the whole area, not just the cells under the symbol
        Paragraph::new(self.symbol)
            .style(self.style)
            .centered()
            .render(area, buf);
    }
}
