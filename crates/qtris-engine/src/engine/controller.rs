use std::time::Duration;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::{
    PieceCollisionError,
    config::{ConfigError, GameConfig},
    core::{board::Board, piece::Piece},
};

use super::{
    game_stats::GameStats,
    piece_generator::{PieceGenerator, PieceSeed},
    placement::Action,
};

/// Lifecycle of a game. `GameOver` is terminal.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum GameState {
    #[default]
    Running,
    GameOver,
}

/// A single player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Intent {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
}

/// The command applied at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::From)]
pub enum Command {
    /// Move or rotate the falling piece by one step.
    Move(Intent),
    /// Rotate, translate and hard-drop the falling piece in one go.
    Place(Action),
}

/// Outcome of locking a piece into the board.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LockReport {
    /// Number of full rows removed by the lock.
    pub lines_cleared: usize,
    /// Points added to the score.
    pub score_gained: usize,
    /// The next piece collided at spawn and the game is over.
    pub topped_out: bool,
}

/// What happened during one [`GameController::tick`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// The command was valid and changed the falling piece.
    pub command_applied: bool,
    /// Locks in the order they happened: at most one from a placement command and one
    /// from gravity.
    pub locks: ArrayVec<LockReport, 2>,
}

impl TickReport {
    #[must_use]
    pub fn lines_cleared(&self) -> usize {
        self.locks.iter().map(|lock| lock.lines_cleared).sum()
    }
}

/// Read-only view of a game handed to renderers.
#[derive(Debug, Clone, Copy)]
pub struct GameView<'a> {
    pub board: &'a Board,
    /// Falling piece, absent once the game is over.
    pub current: Option<Piece>,
    /// Landing position of the falling piece.
    pub ghost: Option<Piece>,
    pub stats: &'a GameStats,
    pub state: GameState,
}

/// Owner of the game state, advanced one tick at a time.
///
/// Each tick applies at most one [`Command`], then advances gravity by the elapsed time.
/// When the falling piece cannot move down it is locked, full rows are cleared, the score
/// is updated and the next piece spawns. If that piece already collides, the game is over
/// and every further tick is a no-op.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use qtris_engine::{Board, GameConfig, GameController, PieceSeed};
///
/// let config = GameConfig::default();
/// let seed: PieceSeed = "0123456789abcdeffedcba9876543210".parse().unwrap();
/// let mut game = GameController::with_seed(config.clone(), seed);
///
/// // Let gravity run until the first piece locks.
/// while game.stats().completed_pieces() == 0 {
///     game.tick(config.fall_interval(), None);
/// }
/// assert_eq!(game.board().rows().flatten().filter(|c| !c.is_empty()).count(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct GameController {
    pub(super) config: GameConfig,
    pub(super) board: Board,
    pub(super) current: Piece,
    generator: PieceGenerator,
    stats: GameStats,
    state: GameState,
    fall_elapsed: Duration,
}

impl GameController {
    /// Starts a new game with a random piece sequence.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let generator = PieceGenerator::new(config.randomizer);
        let board = Board::from_config(&config);
        Self::start(config, board, generator)
    }

    /// Starts a new game whose piece sequence is determined by `seed`.
    #[must_use]
    pub fn with_seed(config: GameConfig, seed: PieceSeed) -> Self {
        let generator = PieceGenerator::with_seed(config.randomizer, seed);
        let board = Board::from_config(&config);
        Self::start(config, board, generator)
    }

    /// Starts a game on a preset board.
    ///
    /// The board's dimensions replace those of `config`. The game is over immediately if
    /// the first piece collides with the preset cells.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the board's dimensions are outside the range
    /// [`GameConfig::validate`] accepts.
    pub fn with_board(
        mut config: GameConfig,
        board: Board,
        seed: PieceSeed,
    ) -> Result<Self, ConfigError> {
        config.width = board.width();
        config.height = board.height();
        let config = config.validate()?;
        let generator = PieceGenerator::with_seed(config.randomizer, seed);
        Ok(Self::start(config, board, generator))
    }

    fn start(config: GameConfig, board: Board, mut generator: PieceGenerator) -> Self {
        let current = Piece::spawn(generator.pop_next(), &config);
        let mut this = Self {
            config,
            board,
            current,
            generator,
            stats: GameStats::new(),
            state: GameState::Running,
            fall_elapsed: Duration::ZERO,
        };
        this.check_top_out();
        this
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn current_piece(&self) -> Piece {
        self.current
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Time accumulated toward the next gravity step.
    #[must_use]
    pub fn fall_elapsed(&self) -> Duration {
        self.fall_elapsed
    }

    pub fn next_pieces(&self) -> impl Iterator<Item = crate::PieceKind> + '_ {
        self.generator.next_pieces()
    }

    /// Returns where the falling piece would land if dropped straight down.
    #[must_use]
    pub fn ghost_piece(&self) -> Piece {
        self.current.drop_position(&self.board)
    }

    /// Replaces the falling piece, rejecting a piece that collides.
    pub fn set_current_piece(&mut self, piece: Piece) -> Result<(), PieceCollisionError> {
        if piece.check_collision(&self.board, 0, 0, None) {
            return Err(PieceCollisionError);
        }
        self.current = piece;
        Ok(())
    }

    #[must_use]
    pub fn view(&self) -> GameView<'_> {
        let running = self.state.is_running();
        GameView {
            board: &self.board,
            current: running.then_some(self.current),
            ghost: running.then(|| self.ghost_piece()),
            stats: &self.stats,
            state: self.state,
        }
    }

    /// Advances the game by one tick.
    ///
    /// `elapsed` is the wall time since the previous tick. The command, if any, is applied
    /// first; then the gravity accumulator advances and, once it reaches the fall
    /// interval, is reset to zero while the piece moves down one row or locks.
    pub fn tick(&mut self, elapsed: Duration, command: Option<Command>) -> TickReport {
        let mut report = TickReport::default();
        if self.state.is_game_over() {
            return report;
        }

        match command {
            Some(Command::Move(intent)) => report.command_applied = self.apply_intent(intent),
            Some(Command::Place(action)) => match self.place(action) {
                Ok(lock) => {
                    report.command_applied = true;
                    report.locks.push(lock);
                }
                Err(error) => tracing::debug!(%error, "placement rejected"),
            },
            None => {}
        }

        if self.state.is_running() {
            self.fall_elapsed += elapsed;
            if self.fall_elapsed >= self.config.fall_interval() {
                self.fall_elapsed = Duration::ZERO;
                if let Some(lock) = self.step_gravity() {
                    report.locks.push(lock);
                }
            }
        }

        report
    }

    /// Applies one input to the falling piece and reports whether it moved.
    fn apply_intent(&mut self, intent: Intent) -> bool {
        let (x, y) = (self.current.x(), self.current.y());
        let target = match intent {
            Intent::MoveLeft => (x - 1, y),
            Intent::MoveRight => (x + 1, y),
            Intent::SoftDrop => (x, y + 1),
            Intent::Rotate => return self.current.rotate(&self.board, self.config.kick_table),
        };
        if !self.board.is_valid_move(&self.current, target.0, target.1) {
            return false;
        }
        self.current.move_to(target.0, target.1);
        true
    }

    fn step_gravity(&mut self) -> Option<LockReport> {
        if self
            .board
            .is_valid_move(&self.current, self.current.x(), self.current.y() + 1)
        {
            self.current.shift(0, 1);
            return None;
        }
        Some(self.lock_current())
    }

    /// Locks the falling piece where it is, clears lines and spawns the next piece.
    pub(super) fn lock_current(&mut self) -> LockReport {
        self.board.lock(&self.current);
        let lines_cleared = self.board.clear_lines();
        let score_gained = self
            .stats
            .record_lock(lines_cleared, self.config.score_per_line);
        if lines_cleared > 0 {
            tracing::debug!(lines_cleared, score = self.stats.score(), "lines cleared");
        }

        self.current = Piece::spawn(self.generator.pop_next(), &self.config);
        let topped_out = self.check_top_out();
        LockReport {
            lines_cleared,
            score_gained,
            topped_out,
        }
    }

    fn check_top_out(&mut self) -> bool {
        if !self.current.check_collision(&self.board, 0, 0, None) {
            return false;
        }
        self.state = GameState::GameOver;
        tracing::debug!(
            score = self.stats.score(),
            pieces = self.stats.completed_pieces(),
            "top out"
        );
        true
    }
}
