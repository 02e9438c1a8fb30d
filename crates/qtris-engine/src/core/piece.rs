use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use crate::{
    config::{GameConfig, KickTable},
    core::board::Board,
};

/// Enum representing the type of piece.
///
/// The discriminant doubles as the index into a 7-entry color palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// T-piece.
    T = 2,
    /// L-piece.
    L = 3,
    /// J-piece.
    J = 4,
    /// Z-piece.
    Z = 5,
    /// S-piece.
    S = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// All kinds in palette order.
    pub const ALL: [PieceKind; PieceKind::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::L,
        PieceKind::J,
        PieceKind::Z,
        PieceKind::S,
    ];

    /// Palette index of this kind.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Shape of a freshly spawned piece of this kind.
    #[must_use]
    pub const fn spawn_shape(self) -> Shape {
        SPAWN_SHAPES[self as usize]
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use qtris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::L => 'L',
            PieceKind::J => 'J',
            PieceKind::Z => 'Z',
            PieceKind::S => 'S',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use qtris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('S'), Some(PieceKind::S));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'T' => Some(PieceKind::T),
            'L' => Some(PieceKind::L),
            'J' => Some(PieceKind::J),
            'Z' => Some(PieceKind::Z),
            'S' => Some(PieceKind::S),
            _ => None,
        }
    }
}

/// Occupancy matrix of a piece, at most 4×4 cells.
///
/// Row `y` is stored as a bitmask in `rows[y]`; bit `x` is set when column `x` of that
/// row is occupied. Shapes are tight: no empty leading or trailing rows or columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    width: u8,
    height: u8,
    rows: [u8; 4],
}

impl Shape {
    pub const MAX_SIZE: usize = 4;

    /// Parses a shape from rows separated by `/`, `#` marking an occupied cell.
    ///
    /// ```
    /// use qtris_engine::Shape;
    ///
    /// let t = Shape::parse("###/.#.");
    /// assert_eq!((t.width(), t.height()), (3, 2));
    /// assert!(t.is_occupied(1, 1));
    /// assert!(!t.is_occupied(0, 1));
    /// ```
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub const fn parse(pattern: &str) -> Self {
        let bytes = pattern.as_bytes();
        let mut rows = [0; 4];
        let mut width = 0;
        let mut height = 0;
        let mut x = 0;
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'/' => {
                    assert!(x > 0, "empty shape row");
                    assert!(width == 0 || width == x, "ragged shape rows");
                    width = x;
                    height += 1;
                    x = 0;
                }
                b'#' => {
                    assert!(x < Self::MAX_SIZE && height < Self::MAX_SIZE);
                    rows[height] |= 1 << x;
                    x += 1;
                }
                b'.' => {
                    assert!(x < Self::MAX_SIZE && height < Self::MAX_SIZE);
                    x += 1;
                }
                _ => panic!("unexpected character in shape pattern"),
            }
            i += 1;
        }
        assert!(x > 0, "empty shape row");
        assert!(width == 0 || width == x, "ragged shape rows");
        Self {
            width: x as u8,
            height: (height + 1) as u8,
            rows,
        }
    }

    #[must_use]
    pub const fn width(self) -> usize {
        self.width as usize
    }

    #[must_use]
    pub const fn height(self) -> usize {
        self.height as usize
    }

    /// Checks whether the cell at `(x, y)` of the bounding box is occupied.
    ///
    /// Coordinates outside the bounding box are never occupied.
    #[must_use]
    pub const fn is_occupied(self, x: usize, y: usize) -> bool {
        x < self.width() && y < self.height() && (self.rows[y] & (1 << x)) != 0
    }

    /// Returns the occupied cells as `(x, y)` offsets from the top-left corner.
    pub fn cells(self) -> impl Iterator<Item = (i32, i32)> {
        (0..self.height).flat_map(move |y| {
            (0..self.width)
                .filter(move |&x| self.is_occupied(usize::from(x), usize::from(y)))
                .map(move |x| (i32::from(x), i32::from(y)))
        })
    }

    /// Returns the shape rotated 90° clockwise.
    ///
    /// The result is the transpose of the shape with its row order reversed: the new
    /// cell `(x, y)` is the old cell `(y, height - 1 - x)`.
    #[must_use]
    pub const fn rotated_cw(self) -> Self {
        let mut rows = [0; 4];
        let old_height = self.height();
        let mut y = 0;
        while y < self.width() {
            let mut x = 0;
            while x < old_height {
                if self.is_occupied(y, old_height - 1 - x) {
                    rows[y] |= 1 << x;
                }
                x += 1;
            }
            y += 1;
        }
        Self {
            width: self.height,
            height: self.width,
            rows,
        }
    }
}

const SPAWN_SHAPES: [Shape; PieceKind::LEN] = [
    Shape::parse("####"),
    Shape::parse("##/##"),
    Shape::parse("###/.#."),
    Shape::parse("###/#.."),
    Shape::parse("###/..#"),
    Shape::parse("##./.##"),
    Shape::parse(".##/##."),
];

/// A falling piece: shape, kind and the board position of its top-left anchor.
///
/// The anchor is signed so that collision queries can describe positions left of the
/// wall or above the visible grid without wrapping.
///
/// # Example
///
/// ```
/// use qtris_engine::{Board, KickTable, Piece, PieceKind};
///
/// let board = Board::new(10, 20);
/// let mut piece = Piece::new(PieceKind::I, 4, 0);
///
/// assert!(piece.rotate(&board, KickTable::Extended));
/// assert_eq!((piece.shape().width(), piece.shape().height()), (1, 4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    shape: Shape,
    x: i32,
    y: i32,
}

impl Piece {
    #[must_use]
    pub const fn new(kind: PieceKind, x: i32, y: i32) -> Self {
        Self {
            kind,
            shape: kind.spawn_shape(),
            x,
            y,
        }
    }

    /// Creates a piece at the spawn position defined by `config`.
    #[must_use]
    pub fn spawn(kind: PieceKind, config: &GameConfig) -> Self {
        Self::new(kind, config.spawn_x(), config.spawn_y())
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn shape(&self) -> Shape {
        self.shape
    }

    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the board coordinates covered by this piece.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (i32, i32)> + use<> {
        let (x0, y0) = (self.x, self.y);
        self.shape.cells().map(move |(dx, dy)| (x0 + dx, y0 + dy))
    }

    /// Moves the anchor by `(dx, dy)` without any collision check.
    pub fn shift(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }

    /// Moves the anchor to `(x, y)` without any collision check.
    pub fn move_to(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    /// Checks whether `shape` (the current shape when `None`) collides when the anchor is
    /// offset by `(dx, dy)`.
    ///
    /// A cell collides when its column is outside `0..width`, its row is at or below the
    /// floor, or it overlaps an occupied board cell. Rows above the board (`y < 0`) never
    /// collide, so pieces may hang partially above the visible grid.
    #[must_use]
    pub fn check_collision(&self, board: &Board, dx: i32, dy: i32, shape: Option<&Shape>) -> bool {
        let shape = shape.copied().unwrap_or(self.shape);
        for (cx, cy) in shape.cells() {
            let Ok(col) = usize::try_from(self.x + dx + cx) else {
                return true;
            };
            if col >= board.width() {
                return true;
            }
            let Ok(row) = usize::try_from(self.y + dy + cy) else {
                continue;
            };
            if row >= board.height() || board.is_occupied(col, row) {
                return true;
            }
        }
        false
    }

    /// Rotates the piece 90° clockwise, trying each kick offset of `kicks` in order.
    ///
    /// The first column offset at which the rotated shape does not collide is committed.
    /// Returns `false` and leaves the piece untouched when every offset collides.
    pub fn rotate(&mut self, board: &Board, kicks: KickTable) -> bool {
        let rotated = self.shape.rotated_cw();
        let Some(offset) = kicks
            .offsets()
            .iter()
            .copied()
            .find(|&dx| !self.check_collision(board, dx, 0, Some(&rotated)))
        else {
            return false;
        };
        self.shape = rotated;
        self.x += offset;
        true
    }

    /// Returns the piece moved straight down as far as it can go.
    #[must_use]
    pub fn drop_position(&self, board: &Board) -> Self {
        let mut dropped = *self;
        while !dropped.check_collision(board, 0, 1, None) {
            dropped.y += 1;
        }
        dropped
    }
}
