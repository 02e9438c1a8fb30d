//! Tabular Q-learning agent for `qtris-engine`.
//!
//! The agent plays whole placements through the engine's placement surface: for every
//! spawned piece it encodes the board into a [`StateKey`], picks one of the legal
//! [`Action`](qtris_engine::Action)s epsilon-greedily from its [`QTable`] and learns from
//! the number of cleared lines.
//!
//! - [`encoding`] - how a game is reduced to a hashable state key
//! - [`table`] - the action-value table
//! - [`agent`] - action selection, the update rule and [`LearningParams`]
//! - [`training`] - headless episodes with progress tracking
//! - [`evaluate`] - parallel greedy evaluation
//! - [`model`] - the serialized form of a trained agent
//!
//! # Example
//!
//! ```
//! use qtris_agent::{LearningParams, QAgent, StateEncoding, Trainer};
//! use qtris_engine::GameConfig;
//!
//! let agent = QAgent::with_seed(StateEncoding::Contour, LearningParams::default(), 7);
//! let mut trainer = Trainer::new(agent, GameConfig::default()).with_seed(7);
//! trainer.train(3);
//!
//! assert_eq!(trainer.stats().games_played(), 3);
//! assert!(trainer.agent().epsilon() < 1.0);
//! ```

pub use self::{agent::*, encoding::*, evaluate::*, model::*, table::*, training::*};

pub mod agent;
pub mod encoding;
pub mod evaluate;
pub mod model;
pub mod table;
pub mod training;
