//! Falling-block puzzle engine.
//!
//! The crate is split in two layers:
//!
//! - [`core`] - the data structures: [`Piece`], [`Shape`], [`Board`] and the collision model
//! - [`engine`] - the game loop: [`GameController`] with its tick protocol, statistics,
//!   piece generation and the placement surface used by learning agents
//!
//! Everything is sized by an immutable [`GameConfig`] handed to the controller at
//! construction time.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use qtris_engine::{Command, GameConfig, GameController, Intent};
//!
//! let config = GameConfig::default();
//! let mut game = GameController::new(config.clone());
//!
//! // A player presses "left", then the gravity timer elapses.
//! game.tick(Duration::ZERO, Some(Command::Move(Intent::MoveLeft)));
//! game.tick(config.fall_interval(), None);
//!
//! assert!(game.state().is_running());
//! ```

pub use self::{config::*, core::*, engine::*};

pub mod config;
pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("piece colliding when setting current piece")]
pub struct PieceCollisionError;
