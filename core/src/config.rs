//! Tunable game parameters.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Ruleset;

/// Parameters shared by the world, the engine and adapters.
///
/// Every field has a default, so configuration files only need to list the
/// values they change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Columns of the default grid.
    pub grid_width: u32,
    /// Rows of the default grid.
    pub grid_height: u32,
    /// Money available when the game starts.
    pub starting_money: u32,
    /// Lives available when the game starts.
    pub starting_lives: u32,
    /// Fixed simulation steps per second.
    pub tick_rate: u32,
    /// Upper bound on the frame delta fed to the fixed-step clock, in seconds.
    pub max_frame_seconds: f32,
    /// Seconds between the end of a wave and the automatic start of the next.
    pub wave_countdown_seconds: f32,
    /// Flat bonus paid when a wave is started before its countdown expires.
    pub early_start_bonus_base: u32,
    /// Additional bonus per remaining countdown second.
    pub early_start_bonus_per_second: f32,
    /// Seed of the route selection random source.
    pub route_seed: u64,
    /// Plays the stress tables: rapid-fire towers against dense waves.
    pub stress_test: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 15,
            starting_money: 100,
            starting_lives: 20,
            tick_rate: 30,
            max_frame_seconds: 0.25,
            wave_countdown_seconds: 10.0,
            early_start_bonus_base: 10,
            early_start_bonus_per_second: 2.0,
            route_seed: 0x5eed_7d0c,
            stress_test: false,
        }
    }
}

/// Problems detected in a [`GameConfig`].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The tick rate must be positive.
    #[error("tick_rate must be greater than zero")]
    ZeroTickRate,
    /// The default grid needs at least one tile.
    #[error("grid dimensions must be positive, got {width}x{height}")]
    EmptyGrid {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },
    /// A duration field was negative or not finite.
    #[error("`{field}` must be a finite non-negative number of seconds, got {value}")]
    InvalidSeconds {
        /// Name of the offending field.
        field: &'static str,
        /// Value found.
        value: f32,
    },
}

impl GameConfig {
    /// Checks the configuration for values the simulation cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        let seconds = [
            ("max_frame_seconds", self.max_frame_seconds),
            ("wave_countdown_seconds", self.wave_countdown_seconds),
            (
                "early_start_bonus_per_second",
                self.early_start_bonus_per_second,
            ),
        ];
        for (field, value) in seconds {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidSeconds { field, value });
            }
        }
        if self.max_frame_seconds == 0.0 {
            return Err(ConfigError::InvalidSeconds {
                field: "max_frame_seconds",
                value: self.max_frame_seconds,
            });
        }
        Ok(())
    }

    /// Tables the game draws mobs, towers and waves from.
    #[must_use]
    pub const fn ruleset(&self) -> Ruleset {
        if self.stress_test {
            Ruleset::Stress
        } else {
            Ruleset::Standard
        }
    }

    /// Length of one fixed simulation step.
    #[must_use]
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate.max(1)
    }

    /// Largest frame delta accepted by the fixed-step clock.
    #[must_use]
    pub fn max_frame_delta(&self) -> Duration {
        seconds(self.max_frame_seconds)
    }

    /// Countdown between waves.
    #[must_use]
    pub fn wave_countdown(&self) -> Duration {
        seconds(self.wave_countdown_seconds)
    }

    /// Bonus paid for starting a wave with `remaining` countdown left.
    #[must_use]
    pub fn early_start_bonus(&self, remaining: Duration) -> u32 {
        let per_second = remaining.as_secs_f32() * self.early_start_bonus_per_second;
        self.early_start_bonus_base
            .saturating_add(per_second.floor() as u32)
    }
}

fn seconds(value: f32) -> Duration {
    Duration::try_from_secs_f32(value).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{ConfigError, GameConfig};
    use crate::Ruleset;

    #[test]
    fn defaults_are_valid() {
        let config = GameConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.starting_money, 100);
        assert_eq!(config.starting_lives, 20);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: GameConfig =
            toml::from_str("starting_money = 250\ntick_rate = 60").expect("parse config");
        assert_eq!(config.starting_money, 250);
        assert_eq!(config.tick_rate, 60);
        assert_eq!(config.starting_lives, 20);
    }

    #[test]
    fn stress_flag_selects_the_stress_ruleset() {
        assert_eq!(GameConfig::default().ruleset(), Ruleset::Standard);
        let config: GameConfig = toml::from_str("stress_test = true").expect("parse config");
        assert_eq!(config.ruleset(), Ruleset::Stress);
    }

    #[test]
    fn zero_tick_rate_is_rejected() {
        let config = GameConfig {
            tick_rate: 0,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTickRate));
    }

    #[test]
    fn negative_countdown_is_rejected() {
        let config = GameConfig {
            wave_countdown_seconds: -1.0,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSeconds {
                field: "wave_countdown_seconds",
                ..
            })
        ));
    }

    #[test]
    fn early_start_bonus_floors_remaining_seconds() {
        let config = GameConfig::default();
        assert_eq!(config.early_start_bonus(Duration::from_millis(7_600)), 10 + 15);
        assert_eq!(config.early_start_bonus(Duration::ZERO), 10);
    }

    #[test]
    fn tick_duration_follows_rate() {
        let config = GameConfig {
            tick_rate: 50,
            ..GameConfig::default()
        };
        assert_eq!(config.tick_duration(), Duration::from_millis(20));
    }
}
