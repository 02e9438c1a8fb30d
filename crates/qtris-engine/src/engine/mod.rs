//! Game loop and agent-facing surface.
//!
//! - [`GameController`] - owner of the board and falling piece, advanced by [`GameController::tick`]
//! - [`GameStats`] - score, locked pieces and line-clear histogram
//! - [`PieceGenerator`] - seeded uniform or 7-bag piece selection
//! - [`Action`] - whole-piece placements used by [`GameController::place`]
//!
//! # Game Flow
//!
//! 1. Create a [`GameController`] from a [`GameConfig`](crate::GameConfig)
//! 2. Each frame, call [`GameController::tick`] with the elapsed time and at most one command
//! 3. Render from [`GameController::view`]
//! 4. Stop (or start a new controller) once [`GameController::state`] is game over

pub use self::{controller::*, game_stats::*, piece_generator::*, placement::*};

mod controller;
mod game_stats;
mod piece_generator;
mod placement;
