//! Application configuration: a JSON file with `game`, `learning` and `palette`
//! sections, then command-line overrides.

use std::path::PathBuf;

use anyhow::Context as _;
use qtris_agent::LearningParams;
use qtris_engine::{GameConfig, KickTable, Randomizer};
use serde::{Deserialize, Serialize};

use crate::{util, view::Palette};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub game: GameConfig,
    pub learning: LearningParams,
    pub palette: Palette,
}

/// Options shared by every mode.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ConfigArg {
    /// Configuration file (JSON)
    #[clap(long, global = true)]
    config: Option<PathBuf>,
    /// Board width in columns
    #[clap(long, global = true)]
    width: Option<usize>,
    /// Board height in rows
    #[clap(long, global = true)]
    height: Option<usize>,
    /// Gravity period in milliseconds
    #[clap(long, global = true)]
    fall_interval_ms: Option<u64>,
    /// Rotation kick search order (basic, extended)
    #[clap(long, global = true)]
    kick_table: Option<KickTable>,
    /// Piece kind selection (uniform, bag)
    #[clap(long, global = true)]
    randomizer: Option<Randomizer>,
}

impl ConfigArg {
    /// Loads the configuration file if any, applies the overrides and validates the result.
    pub(crate) fn load(&self) -> anyhow::Result<AppConfig> {
        let config = match &self.config {
            Some(path) => util::read_json_file("config", path)?,
            None => AppConfig::default(),
        };
        self.apply(config)
    }

    fn apply(&self, mut config: AppConfig) -> anyhow::Result<AppConfig> {
        let game = &mut config.game;
        if let Some(width) = self.width {
            game.width = width;
        }
        if let Some(height) = self.height {
            game.height = height;
        }
        if let Some(fall_interval_ms) = self.fall_interval_ms {
            game.fall_interval_ms = fall_interval_ms;
        }
        if let Some(kick_table) = self.kick_table {
            game.kick_table = kick_table;
        }
        if let Some(randomizer) = self.randomizer {
            game.randomizer = randomizer;
        }

        config.game = config
            .game
            .validate()
            .context("Invalid game configuration")?;
        config.learning = config
            .learning
            .validate()
            .context("Invalid learning parameters")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_take_precedence() {
        let file: AppConfig =
            serde_json::from_str(r#"{ "game": { "width": 12, "height": 22 } }"#).unwrap();
        let arg = ConfigArg {
            width: Some(8),
            kick_table: Some(KickTable::Basic),
            ..ConfigArg::default()
        };
        let config = arg.apply(file).unwrap();
        assert_eq!(config.game.width, 8);
        assert_eq!(config.game.height, 22);
        assert_eq!(config.game.kick_table, KickTable::Basic);
        assert_eq!(config.palette, Palette::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let arg = ConfigArg {
            fall_interval_ms: Some(0),
            ..ConfigArg::default()
        };
        let err = arg.apply(AppConfig::default()).unwrap_err();
        assert!(err.to_string().contains("game configuration"));

        let file: AppConfig = serde_json::from_str(r#"{ "learning": { "gamma": 2.0 } }"#).unwrap();
        let err = ConfigArg::default().apply(file).unwrap_err();
        assert!(err.to_string().contains("learning parameters"));
    }

    #[test]
    fn test_unknown_sections_are_rejected() {
        assert!(serde_json::from_str::<AppConfig>(r#"{ "sound": true }"#).is_err());
    }
}
