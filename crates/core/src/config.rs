//! Game configuration
//!
//! A typed configuration with named fields and defaults, filled in by an
//! explicit key/value parser. Unknown keys are rejected instead of being
//! silently attached.

use crate::error::ConfigError;
use crate::types::{DEFAULT_GRID_SIZE, DEFAULT_SEED, LEADERBOARD_KEY, MAX_GRID_SIZE, MIN_GRID_SIZE};

/// Environment variable prefix for [`GameConfig::from_env`]
pub const ENV_PREFIX: &str = "TUI_2048_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Edge length of the grid
    pub grid_size: usize,
    /// PRNG seed text
    pub seed: String,
    /// Key of the persisted best score
    pub leaderboard_key: String,
    /// Whether render adapters should animate turns
    pub animate: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            seed: DEFAULT_SEED.to_string(),
            leaderboard_key: LEADERBOARD_KEY.to_string(),
            animate: true,
        }
    }
}

impl GameConfig {
    /// Defaults with a specific grid size and seed
    pub fn new(grid_size: usize, seed: impl Into<String>) -> Self {
        Self {
            grid_size,
            seed: seed.into(),
            ..Self::default()
        }
    }

    /// Build a configuration from `(key, value)` pairs on top of the defaults.
    ///
    /// Keys: `grid_size`, `seed`, `leaderboard_key`, `animate`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_2048_core::GameConfig;
    ///
    /// let config = GameConfig::from_pairs([("grid_size", "5"), ("seed", "abc")]).unwrap();
    /// assert_eq!(config.grid_size, 5);
    /// assert_eq!(config.seed, "abc");
    /// assert!(GameConfig::from_pairs([("colour", "red")]).is_err());
    /// ```
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in pairs {
            config.apply(key.as_ref(), value.as_ref())?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Read overrides from `TUI_2048_*` environment variables.
    ///
    /// Unset variables keep their defaults; set but invalid values are errors.
    pub fn from_env() -> Result<Self, ConfigError> {
        let pairs = ["grid_size", "seed", "leaderboard_key", "animate"]
            .into_iter()
            .filter_map(|key| {
                let var = format!("{}{}", ENV_PREFIX, key.to_ascii_uppercase());
                std::env::var(var).ok().map(|v| (key, v))
            });
        Self::from_pairs(pairs)
    }

    /// Set one field from its textual form
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key {
            "grid_size" => {
                self.grid_size = value
                    .parse()
                    .map_err(|_| ConfigError::UnparsableGridSize(value.to_string()))?;
            }
            "seed" => self.seed = value.to_string(),
            "leaderboard_key" => {
                if value.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    });
                }
                self.leaderboard_key = value.to_string();
            }
            "animate" => {
                self.animate = parse_bool(value).ok_or_else(|| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                })?;
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&self.grid_size) {
            return Err(ConfigError::InvalidGridSize(self.grid_size));
        }
        if self.seed.is_empty() {
            return Err(ConfigError::EmptySeed);
        }
        Ok(())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.grid_size, 4);
        assert_eq!(config.seed, "0");
        assert_eq!(config.leaderboard_key, "game.leaderscore");
        assert!(config.animate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_pairs_overrides() {
        let config = GameConfig::from_pairs([
            ("grid_size", " 6 "),
            ("leaderboard_key", "best"),
            ("animate", "off"),
        ])
        .unwrap();
        assert_eq!(config.grid_size, 6);
        assert_eq!(config.leaderboard_key, "best");
        assert!(!config.animate);
    }

    #[test]
    fn test_invalid_grid_sizes() {
        assert_eq!(
            GameConfig::from_pairs([("grid_size", "1")]),
            Err(ConfigError::InvalidGridSize(1))
        );
        assert_eq!(
            GameConfig::from_pairs([("grid_size", "four")]),
            Err(ConfigError::UnparsableGridSize("four".to_string()))
        );
        assert_eq!(
            GameConfig::from_pairs([("grid_size", "")]),
            Err(ConfigError::UnparsableGridSize(String::new()))
        );
    }

    #[test]
    fn test_unknown_key_and_bad_values() {
        assert_eq!(
            GameConfig::from_pairs([("speed", "9")]),
            Err(ConfigError::UnknownKey("speed".to_string()))
        );
        assert!(matches!(
            GameConfig::from_pairs([("animate", "maybe")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(
            GameConfig::from_pairs([("seed", "")]),
            Err(ConfigError::EmptySeed)
        );
    }
}
