//! Immutable game configuration.
//!
//! A [`GameConfig`] is built once (defaults, a JSON file, command-line overrides) and
//! then passed by value into [`GameController`](crate::GameController). Nothing in the
//! engine reads process-wide constants for dimensions or timing.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Column offsets tried, in order, when a rotation collides.
///
/// This is a simplified wall-kick search, not the standard Super Rotation System:
/// only horizontal shifts are tried, the same table is used for every piece and
/// every rotation state.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "lowercase")]
pub enum KickTable {
    /// `0, +1, -1`
    #[display("basic")]
    Basic,
    /// `0, +1, -1, +2, -2`
    #[default]
    #[display("extended")]
    Extended,
}

impl KickTable {
    /// Returns the column offsets in the order they are tried.
    #[must_use]
    pub const fn offsets(self) -> &'static [i32] {
        match self {
            KickTable::Basic => &[0, 1, -1],
            KickTable::Extended => &[0, 1, -1, 2, -2],
        }
    }
}

/// How the next piece kind is chosen.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "lowercase")]
pub enum Randomizer {
    /// Every kind is drawn independently with equal probability.
    #[default]
    #[display("uniform")]
    Uniform,
    /// 7-bag: each run of seven pieces contains every kind exactly once.
    #[display("bag")]
    Bag,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("board width must be in {min}..={max}, got {value}")]
    Width { min: usize, max: usize, value: usize },
    #[display("board height must be in {min}..={max}, got {value}")]
    Height { min: usize, max: usize, value: usize },
    #[display("fall interval must be positive")]
    FallInterval,
}

/// Game rules and dimensions.
///
/// # Example
///
/// ```
/// use qtris_engine::{GameConfig, KickTable};
///
/// let config: GameConfig = serde_json::from_str(r#"{ "width": 12, "kick_table": "basic" }"#)
///     .unwrap();
/// let config = config.validate().unwrap();
///
/// assert_eq!(config.width, 12);
/// assert_eq!(config.height, 20);
/// assert_eq!(config.kick_table, KickTable::Basic);
/// assert_eq!(config.spawn_x(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
    /// Gravity period in milliseconds.
    pub fall_interval_ms: u64,
    /// Rotation kick search order.
    pub kick_table: KickTable,
    /// Points awarded per cleared line.
    pub score_per_line: usize,
    /// Piece kind selection.
    pub randomizer: Randomizer,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 20,
            fall_interval_ms: 500,
            kick_table: KickTable::default(),
            score_per_line: 100,
            randomizer: Randomizer::default(),
        }
    }
}

impl GameConfig {
    /// Narrowest board that still fits every piece in every orientation.
    pub const MIN_WIDTH: usize = 4;
    /// Widest board; a row must fit in a 32-bit occupancy mask.
    pub const MAX_WIDTH: usize = 32;
    pub const MIN_HEIGHT: usize = 4;
    pub const MAX_HEIGHT: usize = 64;

    /// Checks the ranges the engine relies on and returns the configuration unchanged.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if !(Self::MIN_WIDTH..=Self::MAX_WIDTH).contains(&self.width) {
            return Err(ConfigError::Width {
                min: Self::MIN_WIDTH,
                max: Self::MAX_WIDTH,
                value: self.width,
            });
        }
        if !(Self::MIN_HEIGHT..=Self::MAX_HEIGHT).contains(&self.height) {
            return Err(ConfigError::Height {
                min: Self::MIN_HEIGHT,
                max: Self::MAX_HEIGHT,
                value: self.height,
            });
        }
        if self.fall_interval_ms == 0 {
            return Err(ConfigError::FallInterval);
        }
        Ok(self)
    }

    #[must_use]
    pub fn fall_interval(&self) -> Duration {
        Duration::from_millis(self.fall_interval_ms)
    }

    /// Spawn column of a new piece's anchor: `width / 2 - 1`.
    #[must_use]
    pub fn spawn_x(&self) -> i32 {
        let x = (self.width / 2).saturating_sub(1);
        i32::try_from(x).unwrap_or(i32::MAX)
    }

    /// Spawn row of a new piece's anchor.
    #[must_use]
    pub const fn spawn_y(&self) -> i32 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default().validate().unwrap();
        assert_eq!(config.width, 10);
        assert_eq!(config.height, 20);
        assert_eq!(config.spawn_x(), 4);
        assert_eq!(config.spawn_y(), 0);
        assert_eq!(config.fall_interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_validate_rejects_out_of_range_dimensions() {
        let narrow = GameConfig {
            width: 3,
            ..GameConfig::default()
        };
        assert!(matches!(
            narrow.validate(),
            Err(ConfigError::Width { value: 3, .. })
        ));

        let wide = GameConfig {
            width: 33,
            ..GameConfig::default()
        };
        assert!(wide.validate().is_err());

        let tall = GameConfig {
            height: 65,
            ..GameConfig::default()
        };
        assert!(matches!(
            tall.validate(),
            Err(ConfigError::Height { value: 65, .. })
        ));

        let frozen = GameConfig {
            fall_interval_ms: 0,
            ..GameConfig::default()
        };
        assert!(matches!(frozen.validate(), Err(ConfigError::FallInterval)));
    }

    #[test]
    fn test_kick_table_offsets_order() {
        assert_eq!(KickTable::Basic.offsets(), &[0, 1, -1]);
        assert_eq!(KickTable::Extended.offsets(), &[0, 1, -1, 2, -2]);
    }

    #[test]
    fn test_config_deserialization() {
        let config: GameConfig = serde_json::from_str(
            r#"{ "height": 24, "fall_interval_ms": 250, "randomizer": "bag" }"#,
        )
        .unwrap();
        assert_eq!(config.width, 10);
        assert_eq!(config.height, 24);
        assert_eq!(config.fall_interval(), Duration::from_millis(250));
        assert_eq!(config.randomizer, Randomizer::Bag);

        assert!(serde_json::from_str::<GameConfig>(r#"{ "depth": 3 }"#).is_err());
    }

    #[test]
    fn test_parse_from_str() {
        assert_eq!("basic".parse::<KickTable>().unwrap(), KickTable::Basic);
        assert_eq!("extended".parse::<KickTable>().unwrap(), KickTable::Extended);
        assert_eq!("bag".parse::<Randomizer>().unwrap(), Randomizer::Bag);
        assert!("srs".parse::<KickTable>().is_err());
    }
}
