//! Planner configuration with documented defaults
//!
//! One `PlannerConfig` is passed by value into each planning request. There is
//! no global config: two planning calls with different settings can run side
//! by side.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{PlannerError, Result};
use crate::core::types::BoundingBox;
use crate::planner::constants::DEFAULT_BEAM_WIDTH;
use crate::planner::weights::{PlannerWeights, StrategyProfile};
use crate::terrain::constants::{BOARD_HEIGHT, BOARD_WIDTH, DEFAULT_NAV_CLEARANCE};

/// Configuration for one movement planning request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Named weight profile steering candidate selection
    pub strategy: StrategyProfile,

    /// Explicit weights replacing the strategy's table
    ///
    /// When set, `strategy` is only used for logging.
    pub weights: Option<PlannerWeights>,

    /// Allow units to add the expected advance roll to their move
    ///
    /// Moves that use the extra distance are reported as advances.
    pub allow_advance: bool,

    /// Jointly optimise assignments with beam search instead of greedy picks
    pub use_beam_search: bool,

    /// Number of partial assignments kept per beam step
    ///
    /// Work grows as units × beam_width × candidates, so this is the knob
    /// that bounds planning time for large forces.
    pub beam_width: usize,

    /// Battlefield extent in inches
    pub battlefield: BoundingBox,

    /// Clearance margin used when building navigation meshes
    ///
    /// Should be at least the base radius of a typical infantry model so
    /// routed paths keep bases off obstacle edges.
    pub nav_clearance: f32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyProfile::Greedy,
            weights: None,
            allow_advance: false,
            use_beam_search: false,
            beam_width: DEFAULT_BEAM_WIDTH,
            battlefield: BoundingBox::from_size(BOARD_WIDTH, BOARD_HEIGHT),
            nav_clearance: DEFAULT_NAV_CLEARANCE,
        }
    }
}

impl PlannerConfig {
    /// Weights actually used for scoring (override first, then the profile)
    pub fn effective_weights(&self) -> PlannerWeights {
        self.weights
            .clone()
            .unwrap_or_else(|| self.strategy.weights())
    }

    /// Reject settings the planner cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.use_beam_search && self.beam_width == 0 {
            return Err(PlannerError::InvalidConfig(
                "beam_width must be at least 1 when beam search is enabled".into(),
            ));
        }
        if self.battlefield.width() <= 0.0 || self.battlefield.height() <= 0.0 {
            return Err(PlannerError::InvalidConfig(format!(
                "battlefield must have positive extent, got {}x{}",
                self.battlefield.width(),
                self.battlefield.height()
            )));
        }
        if !self.nav_clearance.is_finite() || self.nav_clearance < 0.0 {
            return Err(PlannerError::InvalidConfig(format!(
                "nav_clearance must be a non-negative number, got {}",
                self.nav_clearance
            )));
        }
        Ok(())
    }

    /// Parse a config from TOML text; missing fields take their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: PlannerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }
}

/// Load a planner config from a TOML file
pub fn load_planner_config(path: impl AsRef<Path>) -> Result<PlannerConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    PlannerConfig::from_toml_str(&contents)
}
