use qtris_engine::{Action, GameController, LockReport, PlacementError};
use rand::{Rng as _, SeedableRng as _, seq::IndexedRandom as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    encoding::{StateEncoding, StateKey},
    table::QTable,
};

/// Hyperparameters of the Q-learning update and the exploration schedule.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LearningParams {
    /// Learning rate α.
    pub alpha: f32,
    /// Discount factor γ.
    pub gamma: f32,
    /// Initial exploration rate ε.
    pub epsilon: f32,
    /// Factor applied to ε after every episode.
    pub epsilon_decay: f32,
    /// Lower bound for ε.
    pub epsilon_min: f32,
    /// Subtracted from the reward of the placement that ends the game.
    pub game_over_penalty: f32,
}

impl Default for LearningParams {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.9,
            epsilon: 1.0,
            epsilon_decay: 0.995,
            epsilon_min: 0.01,
            game_over_penalty: 1.0,
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("{name} must be in {range}, got {value}")]
pub struct ParamError {
    name: &'static str,
    range: &'static str,
    value: f32,
}

impl LearningParams {
    pub fn validate(self) -> Result<Self, ParamError> {
        let unit = |name, value: f32, lower_open: bool| {
            let ok = if lower_open {
                value > 0.0 && value <= 1.0
            } else {
                (0.0..=1.0).contains(&value)
            };
            if ok {
                Ok(())
            } else {
                Err(ParamError {
                    name,
                    range: if lower_open { "(0, 1]" } else { "[0, 1]" },
                    value,
                })
            }
        };
        unit("alpha", self.alpha, true)?;
        unit("gamma", self.gamma, false)?;
        unit("epsilon", self.epsilon, false)?;
        unit("epsilon_decay", self.epsilon_decay, true)?;
        unit("epsilon_min", self.epsilon_min, false)?;
        if !self.game_over_penalty.is_finite() || self.game_over_penalty < 0.0 {
            return Err(ParamError {
                name: "game_over_penalty",
                range: "[0, inf)",
                value: self.game_over_penalty,
            });
        }
        Ok(self)
    }
}

/// Epsilon-greedy tabular Q-learning agent.
///
/// One decision is one placement: the agent encodes the game, chooses an [`Action`]
/// among the legal ones, places it and updates
/// `Q(s, a) += α (r + γ max Q(s', ·) - Q(s, a))`, with target `r` when the placement
/// ended the game. The reward `r` is the number of cleared lines, minus
/// [`LearningParams::game_over_penalty`] on top-out.
#[derive(Debug, Clone)]
pub struct QAgent {
    encoding: StateEncoding,
    params: LearningParams,
    epsilon: f32,
    table: QTable,
    rng: Pcg32,
}

/// Outcome of one [`QAgent::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub action: Action,
    pub reward: f32,
    pub lock: LockReport,
}

impl QAgent {
    #[must_use]
    pub fn new(encoding: StateEncoding, params: LearningParams) -> Self {
        Self::from_parts(encoding, params, QTable::new(), Pcg32::from_rng(&mut rand::rng()))
    }

    /// Like [`Self::new`], with a fixed seed for exploration.
    #[must_use]
    pub fn with_seed(encoding: StateEncoding, params: LearningParams, seed: u64) -> Self {
        Self::from_parts(encoding, params, QTable::new(), Pcg32::seed_from_u64(seed))
    }

    /// Wraps an existing table. Exploration restarts from `params.epsilon`.
    #[must_use]
    pub fn with_table(encoding: StateEncoding, params: LearningParams, table: QTable) -> Self {
        Self::from_parts(encoding, params, table, Pcg32::from_rng(&mut rand::rng()))
    }

    fn from_parts(
        encoding: StateEncoding,
        params: LearningParams,
        table: QTable,
        rng: Pcg32,
    ) -> Self {
        Self {
            encoding,
            params,
            epsilon: params.epsilon,
            table,
            rng,
        }
    }

    #[must_use]
    pub fn encoding(&self) -> StateEncoding {
        self.encoding
    }

    #[must_use]
    pub fn params(&self) -> &LearningParams {
        &self.params
    }

    /// Current exploration rate.
    #[must_use]
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn set_epsilon(&mut self, epsilon: f32) {
        self.epsilon = epsilon;
    }

    #[must_use]
    pub fn table(&self) -> &QTable {
        &self.table
    }

    #[must_use]
    pub fn into_table(self) -> QTable {
        self.table
    }

    /// Picks a uniformly random action with probability ε, the best known one otherwise.
    pub fn select_action(&mut self, state: &StateKey, actions: &[Action]) -> Option<Action> {
        if self.rng.random::<f32>() < self.epsilon {
            return actions.choose(&mut self.rng).copied();
        }
        self.table.best_action(state, actions)
    }

    /// Best known action, without exploration.
    #[must_use]
    pub fn greedy_action(&self, state: &StateKey, actions: &[Action]) -> Option<Action> {
        self.table.best_action(state, actions)
    }

    /// Applies the Q-learning update for one transition.
    ///
    /// `next` is the following state and its legal actions, or `None` when the episode
    /// ended.
    pub fn update(
        &mut self,
        state: &StateKey,
        action: Action,
        reward: f32,
        next: Option<(&StateKey, &[Action])>,
    ) {
        let target = match next {
            Some((next_state, next_actions)) => {
                reward + self.params.gamma * self.table.max_value(next_state, next_actions)
            }
            None => reward,
        };
        self.table.update(state, action, target, self.params.alpha);
    }

    /// Decays ε at the end of an episode, never below the floor.
    pub fn end_episode(&mut self) {
        self.epsilon = (self.epsilon * self.params.epsilon_decay).max(self.params.epsilon_min);
    }

    /// Places one piece in `game` and learns from the result.
    ///
    /// Returns `Ok(None)` when there is nothing to place.
    pub fn step(&mut self, game: &mut GameController) -> Result<Option<Step>, PlacementError> {
        let state = self.encoding.encode(game);
        let actions = game.legal_actions();
        let Some(action) = self.select_action(&state, &actions) else {
            return Ok(None);
        };

        let lock = game.place(action)?;
        #[expect(clippy::cast_precision_loss)]
        let mut reward = lock.lines_cleared as f32;
        if lock.topped_out {
            reward -= self.params.game_over_penalty;
            self.update(&state, action, reward, None);
        } else {
            let next_state = self.encoding.encode(game);
            let next_actions = game.legal_actions();
            self.update(&state, action, reward, Some((&next_state, &next_actions)));
        }
        Ok(Some(Step {
            action,
            reward,
            lock,
        }))
    }

    /// Places one piece using the best known action, without learning.
    pub fn play_greedy(
        &self,
        game: &mut GameController,
    ) -> Result<Option<LockReport>, PlacementError> {
        let state = self.encoding.encode(game);
        let actions = game.legal_actions();
        let Some(action) = self.greedy_action(&state, &actions) else {
            return Ok(None);
        };
        game.place(action).map(Some)
    }
}
