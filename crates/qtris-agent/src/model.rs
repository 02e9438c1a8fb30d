//! Serialized form of a trained agent.

use chrono::{DateTime, Utc};
use qtris_engine::{Action, GameConfig};
use serde::{Deserialize, Serialize};

use crate::{
    agent::{LearningParams, ParamError, QAgent},
    encoding::{StateEncoding, StateKey},
    table::QTable,
};

/// A trained Q-table together with what is needed to use it again.
///
/// # Example
///
/// ```
/// use qtris_agent::{LearningParams, QAgent, QModel, StateEncoding};
/// use qtris_engine::GameConfig;
///
/// let config = GameConfig::default();
/// let agent = QAgent::new(StateEncoding::Contour, LearningParams::default());
/// let model = QModel::from_agent("demo", &agent, &config, 0);
///
/// let json = serde_json::to_string(&model).unwrap();
/// let loaded: QModel = serde_json::from_str(&json).unwrap();
/// assert_eq!(loaded.name, "demo");
/// loaded.check_config(&config).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub encoding: StateEncoding,
    pub params: LearningParams,
    /// Number of training episodes behind the table.
    pub episodes: usize,
    pub board_width: usize,
    pub board_height: usize,
    pub entries: Vec<QEntry>,
}

/// One stored action value.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QEntry {
    pub state: StateKey,
    pub action: Action,
    pub value: f32,
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ModelError {
    #[display(
        "model was trained on a {model_width}x{model_height} board, \
         but the game is {game_width}x{game_height}"
    )]
    #[from(ignore)]
    BoardSize {
        model_width: usize,
        model_height: usize,
        game_width: usize,
        game_height: usize,
    },
    #[display("invalid learning parameters: {_0}")]
    Params(ParamError),
}

impl QModel {
    /// Captures the agent's table. Entries are sorted so that the file is stable.
    #[must_use]
    pub fn from_agent(
        name: impl Into<String>,
        agent: &QAgent,
        config: &GameConfig,
        episodes: usize,
    ) -> Self {
        let mut entries = agent
            .table()
            .iter()
            .map(|(state, action, value)| QEntry {
                state: state.clone(),
                action,
                value,
            })
            .collect::<Vec<_>>();
        entries.sort_by(|a, b| {
            a.state
                .as_slice()
                .cmp(b.state.as_slice())
                .then(a.action.cmp(&b.action))
        });
        Self {
            name: name.into(),
            trained_at: Utc::now(),
            encoding: agent.encoding(),
            params: *agent.params(),
            episodes,
            board_width: config.width,
            board_height: config.height,
            entries,
        }
    }

    /// Checks that the model can drive a game with `config`.
    pub fn check_config(&self, config: &GameConfig) -> Result<(), ModelError> {
        if (self.board_width, self.board_height) != (config.width, config.height) {
            return Err(ModelError::BoardSize {
                model_width: self.board_width,
                model_height: self.board_height,
                game_width: config.width,
                game_height: config.height,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn table(&self) -> QTable {
        self.entries
            .iter()
            .map(|entry| (entry.state.clone(), entry.action, entry.value))
            .collect()
    }

    /// Rebuilds an agent from the model, validating its parameters.
    ///
    /// Exploration starts at `epsilon_min`, so a loaded model plays mostly greedily
    /// when training continues.
    pub fn into_agent(self) -> Result<QAgent, ModelError> {
        let params = self.params.validate()?;
        let table = self.table();
        let mut agent = QAgent::with_table(self.encoding, params, table);
        agent.set_epsilon(params.epsilon_min);
        Ok(agent)
    }
}

#[cfg(test)]
mod tests {
    use crate::Trainer;

    use super::*;

    fn trained_model() -> (QModel, QAgent) {
        let agent = QAgent::with_seed(StateEncoding::Contour, LearningParams::default(), 8);
        let mut trainer = Trainer::new(agent, GameConfig::default()).with_seed(8);
        trainer.train(2);
        let agent = trainer.into_agent();
        (
            QModel::from_agent("test", &agent, &GameConfig::default(), 2),
            agent,
        )
    }

    #[test]
    fn test_model_preserves_table() {
        let (model, agent) = trained_model();
        assert_eq!(model.entries.len(), agent.table().entry_count());
        assert_eq!(model.episodes, 2);
        assert_eq!(&model.table(), agent.table());

        let json = serde_json::to_string(&model).unwrap();
        let loaded: QModel = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, model);

        let restored = loaded.into_agent().unwrap();
        assert_eq!(restored.table(), agent.table());
        assert!((restored.epsilon() - 0.01).abs() < f32::EPSILON);
    }

    #[test]
    fn test_entries_are_sorted() {
        let (model, _) = trained_model();
        assert!(model.entries.is_sorted_by(|a, b| {
            (a.state.as_slice(), a.action) <= (b.state.as_slice(), b.action)
        }));
    }

    #[test]
    fn test_board_size_mismatch() {
        let (model, _) = trained_model();
        let narrow = GameConfig {
            width: 8,
            ..GameConfig::default()
        };
        let err = model.check_config(&narrow).unwrap_err();
        assert!(matches!(err, ModelError::BoardSize { game_width: 8, .. }));
        assert!(err.to_string().contains("10x20"));
    }

    #[test]
    fn test_invalid_params_rejected_on_load() {
        let (mut model, _) = trained_model();
        model.params.alpha = 2.0;
        assert!(matches!(model.into_agent(), Err(ModelError::Params(_))));
    }
}
