use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::{config::GameConfig, core::piece::Piece};

use super::piece::PieceKind;

/// A single cell of the board.
///
/// The color identity of an occupied cell is the kind of the piece that was locked there.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(PieceKind),
}

impl Cell {
    #[must_use]
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    #[must_use]
    pub fn kind(self) -> Option<PieceKind> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(kind) => Some(kind),
        }
    }
}

/// The fixed-size cell grid.
///
/// Row-major, row 0 at the top. The grid is mutated only by [`Board::lock`] and
/// [`Board::clear_lines`]; its dimensions never change after construction.
///
/// # Example
///
/// ```
/// use qtris_engine::{Board, Cell, PieceKind};
///
/// let mut board = Board::from_ascii(
///     4,
///     4,
///     r"
///     ..T.
///     IIII
///     ",
/// );
/// assert_eq!(board.cell(2, 2), Some(Cell::Occupied(PieceKind::T)));
/// assert_eq!(board.cell(4, 0), None);
///
/// assert_eq!(board.clear_lines(), 1);
/// assert_eq!(board.cell(2, 3), Some(Cell::Occupied(PieceKind::T)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Board {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        }
    }

    #[must_use]
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.width, config.height)
    }

    /// Builds a board from ASCII art, aligned to the bottom of the grid.
    ///
    /// Each non-blank line is one row. `.` is an empty cell, a piece letter (`I`, `O`, `T`,
    /// `L`, `J`, `Z`, `S`) is a cell of that kind and any other character is a cell of kind
    /// `I`. Leading and trailing whitespace on each line is ignored.
    ///
    /// # Panics
    ///
    /// Panics if a row is not exactly `width` cells long or there are more rows than
    /// `height`.
    #[must_use]
    pub fn from_ascii(width: usize, height: usize, art: &str) -> Self {
        let lines = art
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();
        assert!(lines.len() <= height, "too many rows in board art");

        let mut board = Self::new(width, height);
        let top = height - lines.len();
        for (i, line) in lines.into_iter().enumerate() {
            let row: Vec<Cell> = line
                .chars()
                .map(|c| match c {
                    '.' => Cell::Empty,
                    c => Cell::Occupied(PieceKind::from_char(c).unwrap_or(PieceKind::I)),
                })
                .collect();
            assert_eq!(row.len(), width, "row {i} has the wrong width");
            board.row_mut(top + i).copy_from_slice(&row);
        }
        board
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the cell at `(x, y)`, or `None` outside the grid.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        if x < self.width && y < self.height {
            Some(self.cells[y * self.width + x])
        } else {
            None
        }
    }

    /// Checks whether `(x, y)` is inside the grid and occupied.
    #[must_use]
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        self.cell(x, y).is_some_and(|cell| !cell.is_empty())
    }

    #[must_use]
    pub fn row(&self, y: usize) -> &[Cell] {
        &self.cells[y * self.width..][..self.width]
    }

    fn row_mut(&mut self, y: usize) -> &mut [Cell] {
        &mut self.cells[y * self.width..][..self.width]
    }

    /// Returns the rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks_exact(self.width)
    }

    /// Writes the piece's kind into every cell it covers.
    ///
    /// The caller is responsible for the piece being collision-free. Cells above the
    /// grid are skipped.
    pub fn lock(&mut self, piece: &Piece) {
        for (x, y) in piece.occupied_cells() {
            let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
                continue;
            };
            if x < self.width && y < self.height {
                self.cells[y * self.width + x] = Cell::Occupied(piece.kind());
            }
        }
    }

    /// Removes every full row in one bottom-to-top pass and returns how many were removed.
    ///
    /// Remaining rows keep their order and move down; the freed rows at the top are empty.
    pub fn clear_lines(&mut self) -> usize {
        let width = self.width;
        let mut count = 0;
        for y in (0..self.height).rev() {
            if self.row(y).iter().all(|cell| !cell.is_empty()) {
                count += 1;
                continue;
            }
            if count > 0 {
                let src = y * width;
                self.cells.copy_within(src..src + width, src + count * width);
            }
        }
        self.cells[..count * width].fill(Cell::Empty);
        count
    }

    /// Checks whether `piece` could be placed with its anchor at `(x, y)`.
    #[must_use]
    pub fn is_valid_move(&self, piece: &Piece, x: i32, y: i32) -> bool {
        !piece.check_collision(self, x - piece.x(), y - piece.y(), None)
    }

    /// Height of the highest occupied cell in each column, 0 for an empty column.
    #[must_use]
    pub fn column_heights(&self) -> Vec<usize> {
        (0..self.width)
            .map(|x| {
                (0..self.height)
                    .find(|&y| self.is_occupied(x, y))
                    .map_or(0, |y| self.height - y)
            })
            .collect()
    }

    /// Number of empty cells with at least one occupied cell above them in the same column.
    #[must_use]
    pub fn holes(&self) -> usize {
        (0..self.width)
            .map(|x| {
                (0..self.height)
                    .skip_while(|&y| !self.is_occupied(x, y))
                    .filter(|&y| !self.is_occupied(x, y))
                    .count()
            })
            .sum()
    }

    /// Returns an immutable occupancy snapshot, suitable as a hash key.
    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        let rows = self
            .rows()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|(_, cell)| !cell.is_empty())
                    .fold(0_u32, |bits, (x, _)| bits | (1 << x))
            })
            .collect();
        BoardSnapshot {
            width: self.width,
            rows,
        }
    }

    /// Renders the board as ASCII art, one line per row.
    #[must_use]
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in self.rows() {
            for cell in row {
                out.push(cell.kind().map_or('.', PieceKind::as_char));
            }
            out.push('\n');
        }
        out
    }
}

/// Immutable per-row occupancy bitmask of a [`Board`].
///
/// Bit `x` of `rows[y]` is set when cell `(x, y)` is occupied. Two snapshots are equal
/// exactly when the occupied cells are the same, regardless of piece kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct BoardSnapshot {
    width: usize,
    rows: Box<[u32]>,
}

impl BoardSnapshot {
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn rows(&self) -> &[u32] {
        &self.rows
    }

    #[must_use]
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        x < self.width && self.rows.get(y).is_some_and(|row| row & (1 << x) != 0)
    }
}

impl std::fmt::Display for BoardSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for y in 0..self.rows.len() {
            for x in 0..self.width {
                f.write_char(if self.is_occupied(x, y) { '#' } else { '.' })?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}
