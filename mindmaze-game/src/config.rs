//! Tunable game configuration with serde defaults and validation.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::level::GrowthPolicy;

/// Top-level configuration for generation, scoring, sizing and fog of war.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MazeConfig {
    #[serde(default = "MazeConfig::default_locked_fraction")]
    pub locked_fraction: f64,
    #[serde(default = "MazeConfig::default_max_placement_attempts_per_cell")]
    pub max_placement_attempts_per_cell: usize,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub sizing: GrowthPolicy,
    #[serde(default)]
    pub visibility: VisibilityConfig,
}

impl MazeConfig {
    #[must_use]
    pub const fn default_locked_fraction() -> f64 {
        0.15
    }

    #[must_use]
    pub const fn default_max_placement_attempts_per_cell() -> usize {
        64
    }

    /// Parse a configuration from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON and any validation error otherwise.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=0.5).contains(&self.locked_fraction) {
            return Err(ConfigError::RangeViolation {
                field: "locked_fraction",
                min: 0.0,
                max: 0.5,
                value: self.locked_fraction,
            });
        }
        if self.max_placement_attempts_per_cell == 0 {
            return Err(ConfigError::MinViolation {
                field: "max_placement_attempts_per_cell",
                min: 1.0,
                value: 0.0,
            });
        }
        self.sizing.validate()?;
        self.visibility.validate()?;
        Ok(())
    }
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            locked_fraction: Self::default_locked_fraction(),
            max_placement_attempts_per_cell: Self::default_max_placement_attempts_per_cell(),
            scoring: ScoringConfig::default(),
            sizing: GrowthPolicy::default(),
            visibility: VisibilityConfig::default(),
        }
    }
}

/// Score deltas applied when challenges resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "ScoringConfig::default_unlock_reward")]
    pub unlock_reward: u32,
    #[serde(default = "ScoringConfig::default_finish_bonus")]
    pub finish_bonus: u32,
    #[serde(default = "ScoringConfig::default_wrong_answer_penalty")]
    pub wrong_answer_penalty: u32,
}

impl ScoringConfig {
    const fn default_unlock_reward() -> u32 {
        20
    }

    const fn default_finish_bonus() -> u32 {
        50
    }

    const fn default_wrong_answer_penalty() -> u32 {
        10
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            unlock_reward: Self::default_unlock_reward(),
            finish_bonus: Self::default_finish_bonus(),
            wrong_answer_penalty: Self::default_wrong_answer_penalty(),
        }
    }
}

/// Fog-of-war radii, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibilityConfig {
    #[serde(default = "VisibilityConfig::default_near_radius")]
    pub near_radius: f64,
    #[serde(default = "VisibilityConfig::default_sight_radius")]
    pub sight_radius: f64,
}

impl VisibilityConfig {
    const fn default_near_radius() -> f64 {
        1.5
    }

    const fn default_sight_radius() -> f64 {
        5.0
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.near_radius <= 0.0 || self.near_radius.is_nan() {
            return Err(ConfigError::MinViolation {
                field: "visibility.near_radius",
                min: 0.0,
                value: self.near_radius,
            });
        }
        if self.sight_radius < self.near_radius {
            return Err(ConfigError::RadiusOrder {
                near: self.near_radius,
                sight: self.sight_radius,
            });
        }
        Ok(())
    }
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            near_radius: Self::default_near_radius(),
            sight_radius: Self::default_sight_radius(),
        }
    }
}

/// Errors raised when configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(String),
    #[error("{field} must be at least {min:.2} (got {value:.2})")]
    MinViolation {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("grid size window invalid (min {min} > max {max})")]
    SizeWindow { min: usize, max: usize },
    #[error("sight radius {sight:.2} is smaller than near radius {near:.2}")]
    RadiusOrder { near: f64, sight: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = MazeConfig::default();
        assert!(cfg.validate().is_ok());
        assert!((cfg.locked_fraction - 0.15).abs() < f64::EPSILON);
        assert_eq!(cfg.scoring.unlock_reward, 20);
        assert_eq!(cfg.scoring.finish_bonus, 50);
        assert_eq!(cfg.scoring.wrong_answer_penalty, 10);
    }

    #[test]
    fn empty_json_takes_defaults() {
        let cfg = MazeConfig::from_json("{}").unwrap();
        assert_eq!(cfg, MazeConfig::default());
    }

    #[test]
    fn partial_json_overrides_fields() {
        let cfg = MazeConfig::from_json(
            r#"{ "locked_fraction": 0.25, "scoring": { "unlock_reward": 30 } }"#,
        )
        .unwrap();
        assert!((cfg.locked_fraction - 0.25).abs() < f64::EPSILON);
        assert_eq!(cfg.scoring.unlock_reward, 30);
        assert_eq!(cfg.scoring.finish_bonus, 50);
    }

    #[test]
    fn rejects_out_of_range_fraction() {
        let err = MazeConfig::from_json(r#"{ "locked_fraction": 0.9 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::RangeViolation {
                field: "locked_fraction",
                ..
            }
        ));
    }

    #[test]
    fn rejects_inverted_radii_and_bad_json() {
        let err = MazeConfig::from_json(
            r#"{ "visibility": { "near_radius": 3.0, "sight_radius": 2.0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::RadiusOrder { .. }));
        assert!(matches!(
            MazeConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
