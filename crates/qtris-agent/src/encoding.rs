//! Reduction of a game to a hashable state key.

use std::{fmt, str::FromStr};

use qtris_engine::{Board, GameController};
use serde::{Deserialize, Serialize};

/// How a game is turned into a [`StateKey`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StateEncoding {
    /// The occupancy bitmask of every row.
    ///
    /// Exact, but the state space is so large that few states are ever revisited.
    FullGrid,
    /// Height differences between neighbouring columns, the hole count and the kind of
    /// the falling piece.
    ///
    /// Differences are clamped to `±MAX_STEP` and holes to `MAX_HOLES`.
    #[default]
    Contour,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("unknown state encoding {input:?}, expected `full-grid` or `contour`")]
pub struct ParseStateEncodingError {
    input: String,
}

impl fmt::Display for StateEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StateEncoding::FullGrid => "full-grid",
            StateEncoding::Contour => "contour",
        })
    }
}

impl FromStr for StateEncoding {
    type Err = ParseStateEncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full-grid" | "grid" => Ok(StateEncoding::FullGrid),
            "contour" => Ok(StateEncoding::Contour),
            _ => Err(ParseStateEncodingError {
                input: s.to_owned(),
            }),
        }
    }
}

impl StateEncoding {
    pub const MAX_STEP: usize = 3;
    pub const MAX_HOLES: usize = 8;

    /// Encodes the locked cells (and, for `Contour`, the falling piece) of `game`.
    #[must_use]
    pub fn encode(self, game: &GameController) -> StateKey {
        match self {
            StateEncoding::FullGrid => StateKey(game.snapshot().rows().into()),
            StateEncoding::Contour => {
                let mut key = contour(game.board());
                key.push(u32::try_from(game.current_piece().kind().index()).unwrap_or(u32::MAX));
                StateKey(key.into_boxed_slice())
            }
        }
    }
}

fn contour(board: &Board) -> Vec<u32> {
    let max = StateEncoding::MAX_STEP;
    let mut key = board
        .column_heights()
        .windows(2)
        .map(|pair| {
            let (from, to) = (pair[0], pair[1]);
            let step = if to >= from {
                max + (to - from).min(max)
            } else {
                max - (from - to).min(max)
            };
            u32::try_from(step).unwrap_or(0)
        })
        .collect::<Vec<_>>();
    let holes = board.holes().min(StateEncoding::MAX_HOLES);
    key.push(u32::try_from(holes).unwrap_or(u32::MAX));
    key
}

/// Hashable state identifier used as the outer key of a [`QTable`](crate::QTable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct StateKey(Box<[u32]>);

impl StateKey {
    #[must_use]
    pub fn new(values: impl Into<Box<[u32]>>) -> Self {
        Self(values.into())
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use qtris_engine::{GameConfig, PieceKind, PieceSeed};

    use super::*;

    fn game_on(art: &str) -> GameController {
        let board = Board::from_ascii(6, 8, art);
        let seed: PieceSeed = "00000000000000000000000000000001".parse().unwrap();
        GameController::with_board(GameConfig::default(), board, seed).unwrap()
    }

    #[test]
    fn test_parse_encoding() {
        assert_eq!("contour".parse::<StateEncoding>().unwrap(), StateEncoding::Contour);
        assert_eq!("full-grid".parse::<StateEncoding>().unwrap(), StateEncoding::FullGrid);
        assert_eq!("grid".parse::<StateEncoding>().unwrap(), StateEncoding::FullGrid);
        assert!("pixels".parse::<StateEncoding>().is_err());
        assert_eq!(StateEncoding::FullGrid.to_string(), "full-grid");
        assert_eq!(
            serde_json::to_string(&StateEncoding::FullGrid).unwrap(),
            "\"full-grid\""
        );
    }

    #[test]
    fn test_full_grid_is_the_snapshot() {
        let game = game_on("#.....\n##...#");
        let key = StateEncoding::FullGrid.encode(&game);
        assert_eq!(key.as_slice(), game.snapshot().rows());
    }

    #[test]
    fn test_contour_steps_holes_and_piece() {
        // heights: 5 0 1 1 2 0, two holes under column 0
        let game = game_on(
            r"
            #.....
            #.....
            #.....
            ....#.
            ..###.
            ",
        );
        let key = StateEncoding::Contour.encode(&game);
        let kind = PieceKind::ALL
            .iter()
            .position(|&kind| kind == game.current_piece().kind())
            .map(|index| u32::try_from(index).unwrap())
            .unwrap();
        // steps -5 (clamped to -3), +1, 0, +1, -2, shifted by 3
        assert_eq!(key.as_slice(), &[0, 4, 3, 4, 1, 2, kind]);
    }

    #[test]
    fn test_contour_ignores_absolute_height() {
        let low = game_on("#.#...");
        let high = game_on("#.#...\n######\n######");
        // same seed, same falling piece
        assert_eq!(low.current_piece().kind(), high.current_piece().kind());
        assert_eq!(
            StateEncoding::Contour.encode(&low),
            StateEncoding::Contour.encode(&high)
        );
        assert_ne!(
            StateEncoding::FullGrid.encode(&low),
            StateEncoding::FullGrid.encode(&high)
        );
    }
}
