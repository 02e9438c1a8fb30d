//! Whole-piece placement surface for autonomous agents.
//!
//! An agent sees the board through [`GameController::snapshot`], picks one of
//! [`GameController::legal_actions`] and commits it with [`GameController::place`].
//! Enumeration always works on copies of the falling piece.

use serde::{Deserialize, Serialize};

use crate::core::{board::BoardSnapshot, piece::Piece};

use super::controller::{GameController, LockReport};

/// Where to put the falling piece: how many clockwise rotations, then which column
/// for the piece's anchor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize, derive_more::Display,
)]
#[display("r{rotation}@{column}")]
pub struct Action {
    pub rotation: u8,
    pub column: i32,
}

impl Action {
    /// Number of distinct rotation counts.
    pub const ROTATIONS: u8 = 4;

    #[must_use]
    pub const fn new(rotation: u8, column: i32) -> Self {
        Self { rotation, column }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PlacementError {
    #[display("game is over")]
    GameOver,
    #[display("illegal action {action}")]
    IllegalAction { action: Action },
}

impl GameController {
    /// Returns the occupancy of the locked cells.
    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        self.board.snapshot()
    }

    /// Lists every action whose rotated and translated piece is collision-free at the
    /// falling piece's current row.
    ///
    /// Rotations go through the kick search, so a rotation count is only listed once the
    /// previous rotations all succeeded. Empty once the game is over.
    #[must_use]
    pub fn legal_actions(&self) -> Vec<Action> {
        if self.state().is_game_over() {
            return vec![];
        }
        let mut actions = vec![];
        let mut rotated = self.current;
        for rotation in 0..Action::ROTATIONS {
            if rotation > 0 && !rotated.rotate(&self.board, self.config.kick_table) {
                break;
            }
            actions.extend(
                (0_i32..)
                    .take(self.board.width())
                    .filter(|&column| self.board.is_valid_move(&rotated, column, rotated.y()))
                    .map(|column| Action::new(rotation, column)),
            );
        }
        actions
    }

    /// Returns the piece `action` would hard-drop, or `None` if the action is illegal.
    fn resolve(&self, action: Action) -> Option<Piece> {
        if action.rotation >= Action::ROTATIONS {
            return None;
        }
        let mut piece = self.current;
        for _ in 0..action.rotation {
            if !piece.rotate(&self.board, self.config.kick_table) {
                return None;
            }
        }
        if !self.board.is_valid_move(&piece, action.column, piece.y()) {
            return None;
        }
        piece.move_to(action.column, piece.y());
        Some(piece.drop_position(&self.board))
    }

    /// Rotates, translates and hard-drops the falling piece, then locks it.
    ///
    /// The report's `lines_cleared` is the reward signal. Illegal actions and calls after
    /// game over are rejected without touching the game.
    ///
    /// # Example
    ///
    /// ```
    /// use qtris_engine::{GameConfig, GameController};
    ///
    /// let mut game = GameController::new(GameConfig::default());
    /// let action = game.legal_actions()[0];
    /// let report = game.place(action).unwrap();
    ///
    /// assert_eq!(report.lines_cleared, 0);
    /// assert_eq!(game.stats().completed_pieces(), 1);
    /// ```
    pub fn place(&mut self, action: Action) -> Result<LockReport, PlacementError> {
        if self.state().is_game_over() {
            return Err(PlacementError::GameOver);
        }
        let piece = self
            .resolve(action)
            .ok_or(PlacementError::IllegalAction { action })?;
        self.current = piece;
        Ok(self.lock_current())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::{Board, Cell, GameConfig, PieceKind, PieceSeed};

    use super::*;

    fn seed() -> PieceSeed {
        "fedcba98765432100123456789abcdef".parse().unwrap()
    }

    fn occupied(board: &Board) -> usize {
        board.rows().flatten().filter(|cell| !cell.is_empty()).count()
    }

    #[test]
    fn test_legal_actions_are_collision_free() {
        let mut game = GameController::with_seed(GameConfig::default(), seed());
        for _ in 0..10 {
            let actions = game.legal_actions();
            assert!(!actions.is_empty());
            for &action in &actions {
                let piece = game.resolve(action).unwrap();
                assert!(!piece.check_collision(game.board(), 0, 0, None), "{action}");
            }
            if game.place(actions[actions.len() / 2]).unwrap().topped_out {
                break;
            }
        }
    }

    #[test]
    fn test_legal_actions_cover_every_column_on_empty_board() {
        let game = GameController::with_seed(GameConfig::default(), seed());
        let actions = game.legal_actions();
        let width = game.current_piece().shape().width();
        let expected = i32::try_from(10 - width + 1).unwrap();
        let unrotated = actions.iter().filter(|a| a.rotation == 0).count();
        assert_eq!(i32::try_from(unrotated).unwrap(), expected);
        assert!(actions.iter().all(|a| a.rotation < Action::ROTATIONS));
    }

    #[test]
    fn test_enumeration_does_not_mutate_game() {
        let game = GameController::with_seed(GameConfig::default(), seed());
        let before = game.current_piece();
        let _ = game.legal_actions();
        assert_eq!(game.current_piece(), before);
        assert_eq!(occupied(game.board()), 0);
    }

    #[test]
    fn test_place_locks_four_cells() {
        let mut game = GameController::with_seed(GameConfig::default(), seed());
        let kind = game.current_piece().kind();
        let action = game.legal_actions()[0];
        let report = game.place(action).unwrap();
        assert_eq!(report.lines_cleared, 0);
        assert_eq!(report.score_gained, 0);
        assert_eq!(occupied(game.board()), 4);
        assert!(game.board().row(19).contains(&Cell::Occupied(kind)));
    }

    #[test]
    fn test_place_clears_line_and_scores() {
        // Bottom row missing its four rightmost cells; a horizontal I fills them.
        let board = Board::from_ascii(10, 20, "######....");
        let config = GameConfig::default();
        let mut game = GameController::with_board(config, board, seed()).unwrap();
        game.set_current_piece(Piece::new(PieceKind::I, 0, 0)).unwrap();

        let report = game.place(Action::new(0, 6)).unwrap();
        assert_eq!(report.lines_cleared, 1);
        assert_eq!(report.score_gained, 100);
        assert_eq!(game.stats().score(), 100);
        assert_eq!(occupied(game.board()), 0);
    }

    #[test]
    fn test_illegal_action_leaves_state_untouched() {
        let mut game = GameController::with_seed(GameConfig::default(), seed());
        let piece = game.current_piece();
        let snapshot = game.snapshot();

        for action in [Action::new(0, -1), Action::new(0, 10), Action::new(4, 0)] {
            assert!(matches!(
                game.place(action),
                Err(PlacementError::IllegalAction { .. })
            ));
        }
        assert_eq!(game.current_piece(), piece);
        assert_eq!(game.snapshot(), snapshot);
        assert_eq!(game.stats().completed_pieces(), 0);
    }

    #[test]
    fn test_place_after_game_over_is_rejected() {
        let board = Board::from_ascii(4, 4, "####\n####\n####\n####");
        let mut game = GameController::with_board(GameConfig::default(), board, seed()).unwrap();
        assert!(game.legal_actions().is_empty());
        assert!(matches!(
            game.place(Action::new(0, 0)),
            Err(PlacementError::GameOver)
        ));
    }

    #[test]
    fn test_place_command_through_tick() {
        let mut game = GameController::with_seed(GameConfig::default(), seed());
        let action = game.legal_actions()[0];
        let report = game.tick(Duration::ZERO, Some(action.into()));
        assert!(report.command_applied);
        assert_eq!(report.locks.len(), 1);
        assert_eq!(game.stats().completed_pieces(), 1);
    }
}
