use std::iter;

use qtris_engine::{Board, Piece};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::view::{
    Palette,
    widgets::{BlockDisplay, Tile},
};

#[derive(Debug)]
pub struct BoardDisplay<'a> {
    board: &'a Board,
    palette: &'a Palette,
    ghost: Option<Piece>,
    falling_piece: Option<Piece>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(board: &'a Board, palette: &'a Palette) -> Self {
        Self {
            board,
            palette,
            ghost: None,
            falling_piece: None,
            block: None,
        }
    }

    pub fn ghost(self, piece: Option<Piece>) -> Self {
        Self {
            ghost: piece,
            ..self
        }
    }

    pub fn falling_piece(self, piece: Option<Piece>) -> Self {
        Self {
            falling_piece: piece,
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        super::cells_to_u16(self.board.width()) * BlockDisplay::width()
            + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        super::cells_to_u16(self.board.height()) * BlockDisplay::height()
            + super::block_vertical_margin(self.block.as_ref())
    }

    /// Board cells with the ghost and then the falling piece drawn over them, row-major.
    fn tiles(&self) -> Vec<Tile> {
        let width = self.board.width();
        let mut tiles = self
            .board
            .rows()
            .flatten()
            .copied()
            .map(Tile::from)
            .collect::<Vec<_>>();
        let overlays = [
            self.ghost.map(|piece| (piece, Tile::Ghost)),
            self.falling_piece
                .map(|piece| (piece, Tile::Piece(piece.kind()))),
        ];
        for (piece, tile) in overlays.into_iter().flatten() {
            for (x, y) in piece.occupied_cells() {
                let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
                    continue;
                };
                if x < width && y < self.board.height() {
                    tiles[y * width + x] = tile;
                }
            }
        }
        tiles
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let col_constraints =
            (0..self.board.width()).map(|_| Constraint::Length(BlockDisplay::width()));
        let row_constraints =
            (0..self.board.height()).map(|_| Constraint::Length(BlockDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let grid_cells = area
            .layout_vec(&vertical)
            .into_iter()
            .map(|row| row.layout_vec(&horizontal));

        let tiles = self.tiles();
        for (grid_row, row) in iter::zip(grid_cells, tiles.chunks_exact(self.board.width())) {
            for (grid_cell, tile) in iter::zip(grid_row, row) {
                BlockDisplay::from_tile(*tile, self.palette, true).render(grid_cell, buf);
            }
        }
    }
}
