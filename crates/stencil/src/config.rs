//! Configuration types for design compression.
//!
//! This module provides configuration structures that control how component
//! groups are templated, when compression is worth it, and how grid layouts
//! are recognized. All types implement [`serde::Deserialize`] with every field
//! defaulted, so a partial TOML or JSON document is enough.
//!
//! # Overview
//!
//! - [`CompressionConfig`] - Top-level configuration for a compress call.
//! - [`GridConfig`] - Controls the grid pattern detector.
//! - [`OverridePolicy`] - Which slot values an instance record carries.
//!
//! # Example
//!
//! ```
//! # use stencil::config::CompressionConfig;
//! let config = CompressionConfig::default();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.min_group_size(), 2);
//! ```

use serde::Deserialize;

use crate::error::StencilError;

/// Which slot values are written into an instance's override map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverridePolicy {
    /// Only values that differ from the slot default.
    #[default]
    Changed,
    /// Every slot of the component, including values equal to the default.
    All,
}

/// Top-level configuration for compressing a design.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Smallest group of instances that is worth templating.
    min_group_size: usize,

    /// Required relative saving of a group's compact encoding over its
    /// literal encoding, in `[0, 1)`.
    min_benefit_ratio: f64,

    override_policy: OverridePolicy,

    /// Recognize `I<instance>;<node>` child ids instead of slotting them.
    scoped_ids: bool,

    /// Collect instances nested inside plain containers, not just top-level ones.
    nested_instances: bool,

    grid: GridConfig,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            min_group_size: 2,
            min_benefit_ratio: 0.1,
            override_policy: OverridePolicy::default(),
            scoped_ids: true,
            nested_instances: true,
            grid: GridConfig::default(),
        }
    }
}

impl CompressionConfig {
    /// Returns the smallest group size that is templated; never below 2.
    pub fn min_group_size(&self) -> usize {
        self.min_group_size.max(2)
    }

    pub fn min_benefit_ratio(&self) -> f64 {
        self.min_benefit_ratio
    }

    pub fn override_policy(&self) -> OverridePolicy {
        self.override_policy
    }

    pub fn scoped_ids(&self) -> bool {
        self.scoped_ids
    }

    pub fn nested_instances(&self) -> bool {
        self.nested_instances
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    pub fn with_min_group_size(mut self, size: usize) -> Self {
        self.min_group_size = size;
        self
    }

    pub fn with_min_benefit_ratio(mut self, ratio: f64) -> Self {
        self.min_benefit_ratio = ratio;
        self
    }

    pub fn with_override_policy(mut self, policy: OverridePolicy) -> Self {
        self.override_policy = policy;
        self
    }

    pub fn with_scoped_ids(mut self, enabled: bool) -> Self {
        self.scoped_ids = enabled;
        self
    }

    pub fn with_nested_instances(mut self, enabled: bool) -> Self {
        self.nested_instances = enabled;
        self
    }

    pub fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    /// Checks that every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`StencilError::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<(), StencilError> {
        if !(0.0..1.0).contains(&self.min_benefit_ratio) {
            return Err(StencilError::Config(format!(
                "min_benefit_ratio must be in [0, 1), got {}",
                self.min_benefit_ratio
            )));
        }
        self.grid.validate()
    }
}

/// Configuration of the grid pattern detector.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    enabled: bool,

    /// Distance under which two coordinates count as the same position.
    tolerance: f64,

    /// Fewest instances a grid is detected for.
    min_instances: usize,

    /// Lowest confidence, in `[0, 1]`, at which a grid is accepted.
    min_confidence: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tolerance: 1.0,
            min_instances: 3,
            min_confidence: 0.8,
        }
    }
}

impl GridConfig {
    /// Creates a grid configuration with the given detection thresholds.
    ///
    /// # Arguments
    ///
    /// * `tolerance` - Coordinate distance treated as equal.
    /// * `min_instances` - Fewest instances a grid is detected for.
    /// * `min_confidence` - Lowest accepted confidence.
    pub fn new(tolerance: f64, min_instances: usize, min_confidence: f64) -> Self {
        Self {
            enabled: true,
            tolerance,
            min_instances,
            min_confidence,
        }
    }

    /// Returns a configuration with detection switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn min_instances(&self) -> usize {
        self.min_instances
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    fn validate(&self) -> Result<(), StencilError> {
        if !(self.tolerance >= 0.0 && self.tolerance.is_finite()) {
            return Err(StencilError::Config(format!(
                "grid.tolerance must be a finite non-negative number, got {}",
                self.tolerance
            )));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(StencilError::Config(format!(
                "grid.min_confidence must be in [0, 1], got {}",
                self.min_confidence
            )));
        }
        Ok(())
    }
}
