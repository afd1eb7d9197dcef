//! Runtime configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use crate::core::constants::{
    DEFAULT_DATA_DIR, DEFAULT_START_WORLD, QTE_TIMEOUT_MS, TURN_TIME_LIMIT_MS,
};
use crate::core::error::{GameError, GameResult};

/// Timing knobs handed to every combat when it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatSettings {
    /// Milliseconds the player has to answer each question.
    pub turn_time_limit_ms: u64,
    /// Milliseconds before an unresolved QTE counts as a failure. `None` waits forever.
    pub qte_timeout_ms: Option<u64>,
}

impl Default for CombatSettings {
    fn default() -> Self {
        Self {
            turn_time_limit_ms: TURN_TIME_LIMIT_MS,
            qte_timeout_ms: Some(QTE_TIMEOUT_MS),
        }
    }
}

/// Game configuration
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Directory holding maps.json, questions.json and lessons.json
    pub data_dir: PathBuf,
    /// Overrides the platform save directory
    pub save_dir: Option<PathBuf>,
    /// World loaded for a fresh run
    pub start_world: String,
    pub combat: CombatSettings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            save_dir: None,
            start_world: DEFAULT_START_WORLD.to_string(),
            combat: CombatSettings::default(),
        }
    }
}

impl GameConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> GameResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from any key lookup, falling back to defaults for absent keys.
    pub fn from_lookup<F>(lookup: F) -> GameResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let turn_time_limit_ms = match lookup("KNIGHT_TURN_TIME_MS") {
            Some(raw) => parse_millis("KNIGHT_TURN_TIME_MS", &raw)?,
            None => defaults.combat.turn_time_limit_ms,
        };
        if turn_time_limit_ms == 0 {
            return Err(GameError::Config {
                key: "KNIGHT_TURN_TIME_MS",
                value: "0".to_string(),
            });
        }

        // 0 disables the timeout
        let qte_timeout_ms = match lookup("KNIGHT_QTE_TIMEOUT_MS") {
            Some(raw) => match parse_millis("KNIGHT_QTE_TIMEOUT_MS", &raw)? {
                0 => None,
                ms => Some(ms),
            },
            None => defaults.combat.qte_timeout_ms,
        };

        Ok(Self {
            data_dir: lookup("KNIGHT_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            save_dir: lookup("KNIGHT_SAVE_DIR").map(PathBuf::from),
            start_world: lookup("KNIGHT_START_WORLD").unwrap_or(defaults.start_world),
            combat: CombatSettings {
                turn_time_limit_ms,
                qte_timeout_ms,
            },
        })
    }
}

fn parse_millis(key: &'static str, raw: &str) -> GameResult<u64> {
    raw.trim().parse().map_err(|_| GameError::Config {
        key,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = GameConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.save_dir, None);
        assert_eq!(config.start_world, "world_1");
        assert_eq!(config.combat.turn_time_limit_ms, 15_000);
        assert_eq!(config.combat.qte_timeout_ms, Some(5_000));
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = GameConfig::from_lookup(lookup_from(&[
            ("KNIGHT_DATA_DIR", "/tmp/worlds"),
            ("KNIGHT_SAVE_DIR", "/tmp/saves"),
            ("KNIGHT_START_WORLD", "world_2"),
            ("KNIGHT_TURN_TIME_MS", " 10000 "),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/worlds"));
        assert_eq!(config.save_dir, Some(PathBuf::from("/tmp/saves")));
        assert_eq!(config.start_world, "world_2");
        assert_eq!(config.combat.turn_time_limit_ms, 10_000);
    }

    #[test]
    fn test_zero_qte_timeout_disables_it() {
        let config =
            GameConfig::from_lookup(lookup_from(&[("KNIGHT_QTE_TIMEOUT_MS", "0")])).unwrap();
        assert_eq!(config.combat.qte_timeout_ms, None);
    }

    #[test]
    fn test_bad_number_is_config_error() {
        let result = GameConfig::from_lookup(lookup_from(&[("KNIGHT_TURN_TIME_MS", "soon")]));
        assert!(matches!(
            result,
            Err(GameError::Config {
                key: "KNIGHT_TURN_TIME_MS",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_turn_limit_rejected() {
        let result = GameConfig::from_lookup(lookup_from(&[("KNIGHT_TURN_TIME_MS", "0")]));
        assert!(result.is_err());
    }
}
