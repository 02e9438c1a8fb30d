use std::time::Duration;

use qtris_engine::{
    Action, Board, Cell, GameConfig, GameController, Intent, KickTable, Piece, PieceKind,
    PieceSeed,
};

fn seed() -> PieceSeed {
    "0f1e2d3c4b5a69788796a5b4c3d2e1f0".parse().unwrap()
}

fn vertical_i(board: &Board, x: i32) -> Piece {
    let mut piece = Piece::new(PieceKind::I, 0, 0);
    assert!(piece.rotate(board, KickTable::Basic));
    piece.move_to(x, 0);
    piece
}

fn occupied(board: &Board) -> usize {
    board.rows().flatten().filter(|cell| !cell.is_empty()).count()
}

#[test]
fn vertical_i_clears_three_bottom_rows() {
    let board = Board::from_ascii(
        10,
        20,
        r"
        #########.
        #########.
        #########.
        ",
    );
    let mut game = GameController::with_board(GameConfig::default(), board, seed()).unwrap();
    let piece = vertical_i(game.board(), 9);
    game.set_current_piece(piece.drop_position(game.board()))
        .unwrap();

    let report = game.tick(game.config().fall_interval(), None);
    assert_eq!(report.lines_cleared(), 3);
    assert_eq!(game.stats().score(), 300);
    // The top cell of the I is all that is left, now resting on the floor.
    assert_eq!(occupied(game.board()), 1);
    assert_eq!(game.board().cell(9, 19), Some(Cell::Occupied(PieceKind::I)));
}

#[test]
fn bottom_row_filled_by_two_locks_clears_once() {
    let config = GameConfig {
        width: 8,
        ..GameConfig::default()
    };
    let mut game = GameController::with_seed(config, seed());

    game.set_current_piece(Piece::new(PieceKind::I, 0, 0)).unwrap();
    let first = game.place(Action::new(0, 0)).unwrap();
    assert_eq!(first.lines_cleared, 0);
    assert_eq!(game.stats().score(), 0);

    game.set_current_piece(Piece::new(PieceKind::I, 0, 0)).unwrap();
    let second = game.place(Action::new(0, 4)).unwrap();
    assert_eq!(second.lines_cleared, 1);
    assert_eq!(second.score_gained, 100);
    assert_eq!(game.stats().score(), 100);
    assert!(game.board().row(19).iter().all(|cell| cell.is_empty()));
    assert_eq!(occupied(game.board()), 0);
}

#[test]
fn rotation_at_right_wall_uses_kick_table() {
    let board = Board::new(10, 20);
    let piece = vertical_i(&board, 8);

    let mut extended =
        GameController::with_board(GameConfig::default(), board.clone(), seed()).unwrap();
    extended.set_current_piece(piece).unwrap();
    let report = extended.tick(Duration::ZERO, Some(Intent::Rotate.into()));
    assert!(report.command_applied);
    assert_eq!(extended.current_piece().x(), 6);
    assert_eq!(extended.current_piece().shape().height(), 1);

    let config = GameConfig {
        kick_table: KickTable::Basic,
        ..GameConfig::default()
    };
    let mut basic = GameController::with_board(config, board, seed()).unwrap();
    basic.set_current_piece(piece).unwrap();
    let report = basic.tick(Duration::ZERO, Some(Intent::Rotate.into()));
    assert!(!report.command_applied);
    assert_eq!(basic.current_piece(), piece);
}

#[test]
fn four_rotations_restore_falling_piece() {
    let mut game = GameController::with_seed(GameConfig::default(), seed());
    game.tick(Duration::ZERO, Some(Intent::SoftDrop.into()));
    let before = game.current_piece();
    for _ in 0..4 {
        let report = game.tick(Duration::ZERO, Some(Intent::Rotate.into()));
        assert!(report.command_applied);
    }
    assert_eq!(game.current_piece(), before);
}

#[test]
fn lock_into_spawn_cells_ends_game() {
    // Two columns under the spawn point, leaving room for an O on top.
    let art = "....##....\n".repeat(18);
    let board = Board::from_ascii(10, 20, &art);
    let mut game = GameController::with_board(GameConfig::default(), board, seed()).unwrap();
    assert!(game.state().is_running());

    game.set_current_piece(Piece::new(PieceKind::O, 4, 0)).unwrap();
    let report = game.tick(game.config().fall_interval(), None);
    assert_eq!(report.locks.len(), 1);
    assert!(report.locks[0].topped_out);
    assert!(game.state().is_game_over());

    // Nothing leaves the game-over state.
    let report = game.tick(Duration::from_secs(10), Some(Intent::MoveLeft.into()));
    assert!(!report.command_applied);
    assert!(report.locks.is_empty());
    assert!(game.state().is_game_over());
}

#[test]
fn stack_outside_spawn_columns_does_not_end_game() {
    let art = "##........\n".repeat(19);
    let board = Board::from_ascii(10, 20, &art);
    let mut game = GameController::with_board(GameConfig::default(), board, seed()).unwrap();

    // An O locked in the top-left corner fills row 0 outside the spawn columns.
    game.set_current_piece(Piece::new(PieceKind::O, 0, -1)).unwrap();
    let report = game.tick(game.config().fall_interval(), None);
    assert_eq!(report.locks.len(), 1);
    assert!(!report.locks[0].topped_out);
    assert!(game.state().is_running());
    assert!(game.board().is_occupied(0, 0));
}

#[test]
fn score_never_decreases_until_top_out() {
    let mut game = GameController::with_seed(GameConfig::default(), seed());
    let mut last_score = 0;
    for _ in 0..1000 {
        let actions = game.legal_actions();
        let Some(&action) = actions.first() else {
            break;
        };
        let report = game.place(action).unwrap();
        assert_eq!(
            game.stats().score(),
            last_score + 100 * report.lines_cleared
        );
        last_score = game.stats().score();
        if report.topped_out {
            break;
        }
    }
    // Always stacking in the leftmost column tops out quickly.
    assert!(game.state().is_game_over());
    assert!(game.legal_actions().is_empty());
}

#[test]
fn same_seed_same_game() {
    let mut a = GameController::with_seed(GameConfig::default(), seed());
    let mut b = GameController::with_seed(GameConfig::default(), seed());
    for _ in 0..20 {
        assert_eq!(a.current_piece(), b.current_piece());
        let actions = a.legal_actions();
        assert_eq!(actions, b.legal_actions());
        let Some(&action) = actions.last() else {
            break;
        };
        a.place(action).unwrap();
        b.place(action).unwrap();
        assert_eq!(a.snapshot(), b.snapshot());
    }
}
