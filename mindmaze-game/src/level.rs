//! Level-size policy: maps a level number to grid dimensions.
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::numbers::{floor_f64_to_usize, usize_to_f64};

/// Grid dimensions for one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub cols: usize,
    pub rows: usize,
}

impl Dimensions {
    #[must_use]
    pub const fn new(cols: usize, rows: usize) -> Self {
        Self { cols, rows }
    }

    #[must_use]
    pub const fn cells(self) -> usize {
        self.cols * self.rows
    }
}

/// Decides how big the maze is for a given level.
pub trait SizePolicy {
    fn dimensions(&self, level: u32) -> Dimensions;
}

impl<F> SizePolicy for F
where
    F: Fn(u32) -> Dimensions,
{
    fn dimensions(&self, level: u32) -> Dimensions {
        self(level)
    }
}

/// Default policy: the maze grows by one row every `levels_per_step` levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthPolicy {
    #[serde(default = "GrowthPolicy::default_initial_size")]
    pub initial_size: usize,
    #[serde(default = "GrowthPolicy::default_max_size")]
    pub max_size: usize,
    #[serde(default = "GrowthPolicy::default_min_size")]
    pub min_size: usize,
    #[serde(default = "GrowthPolicy::default_levels_per_step")]
    pub levels_per_step: u32,
    /// Columns per row; values above 1.0 give landscape mazes.
    #[serde(default = "GrowthPolicy::default_column_ratio")]
    pub column_ratio: f64,
}

impl GrowthPolicy {
    const fn default_initial_size() -> usize {
        8
    }

    const fn default_max_size() -> usize {
        18
    }

    const fn default_min_size() -> usize {
        6
    }

    const fn default_levels_per_step() -> u32 {
        2
    }

    const fn default_column_ratio() -> f64 {
        1.0
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.min_size == 0 {
            return Err(ConfigError::MinViolation {
                field: "sizing.min_size",
                min: 1.0,
                value: 0.0,
            });
        }
        if self.min_size > self.max_size {
            return Err(ConfigError::SizeWindow {
                min: self.min_size,
                max: self.max_size,
            });
        }
        if self.levels_per_step == 0 {
            return Err(ConfigError::MinViolation {
                field: "sizing.levels_per_step",
                min: 1.0,
                value: 0.0,
            });
        }
        if !(0.5..=3.0).contains(&self.column_ratio) {
            return Err(ConfigError::RangeViolation {
                field: "sizing.column_ratio",
                min: 0.5,
                max: 3.0,
                value: self.column_ratio,
            });
        }
        Ok(())
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self {
            initial_size: Self::default_initial_size(),
            max_size: Self::default_max_size(),
            min_size: Self::default_min_size(),
            levels_per_step: Self::default_levels_per_step(),
            column_ratio: Self::default_column_ratio(),
        }
    }
}

impl SizePolicy for GrowthPolicy {
    fn dimensions(&self, level: u32) -> Dimensions {
        let steps = level.saturating_sub(1) / self.levels_per_step.max(1);
        let base = self
            .initial_size
            .saturating_add(usize::try_from(steps).unwrap_or(usize::MAX))
            .min(self.max_size);
        let cols = floor_f64_to_usize(usize_to_f64(base) * self.column_ratio);
        Dimensions {
            cols: cols.max(self.min_size),
            rows: base.max(self.min_size),
        }
    }
}
