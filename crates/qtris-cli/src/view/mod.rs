//! Rendering of [`GameView`](qtris_engine::GameView)s. Nothing here mutates the game.

pub use self::palette::*;

mod palette;
pub mod widgets;
