//! Strategy weight tables
//!
//! A strategy is a named set of six scoring weights. Custom tables can be
//! loaded from TOML; any weight left out keeps its greedy default.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::{PlannerError, Result};

/// Scalar weights applied to each scoring term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerWeights {
    /// Pull toward objectives
    pub objective_value: f32,
    /// Aversion to threatened positions
    pub threat_penalty: f32,
    /// Pull toward each role's preferred engagement distance
    pub damage_bias: f32,
    /// Cost per inch travelled
    pub distance_penalty: f32,
    /// Value of ending in cover
    pub cover_bonus: f32,
    /// Value of seeing nearby enemies
    pub los_bonus: f32,
}

impl Default for PlannerWeights {
    fn default() -> Self {
        StrategyProfile::Greedy.weights()
    }
}

impl PlannerWeights {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

/// Load a weight table from a TOML file
pub fn load_strategy_weights(path: impl AsRef<Path>) -> Result<PlannerWeights> {
    let contents = fs::read_to_string(path.as_ref())?;
    PlannerWeights::from_toml_str(&contents)
}

/// Named weight profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyProfile {
    #[default]
    Greedy,
    Aggressive,
    Defensive,
    ObjectiveFocused,
}

impl StrategyProfile {
    pub const ALL: [StrategyProfile; 4] = [
        StrategyProfile::Greedy,
        StrategyProfile::Aggressive,
        StrategyProfile::Defensive,
        StrategyProfile::ObjectiveFocused,
    ];

    pub fn weights(&self) -> PlannerWeights {
        let (objective_value, threat_penalty, damage_bias, distance_penalty, cover_bonus, los_bonus) =
            match self {
                StrategyProfile::Greedy => (1.0, 1.0, 1.0, 0.1, 0.5, 0.5),
                StrategyProfile::Aggressive => (0.8, 0.5, 1.5, 0.05, 0.3, 0.8),
                StrategyProfile::Defensive => (0.8, 1.6, 0.6, 0.15, 1.0, 0.4),
                StrategyProfile::ObjectiveFocused => (1.8, 0.8, 0.6, 0.1, 0.5, 0.3),
            };
        PlannerWeights {
            objective_value,
            threat_penalty,
            damage_bias,
            distance_penalty,
            cover_bonus,
            los_bonus,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StrategyProfile::Greedy => "greedy",
            StrategyProfile::Aggressive => "aggressive",
            StrategyProfile::Defensive => "defensive",
            StrategyProfile::ObjectiveFocused => "objective-focused",
        }
    }
}

impl fmt::Display for StrategyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyProfile {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        StrategyProfile::ALL
            .into_iter()
            .find(|profile| profile.name() == key)
            .ok_or_else(|| PlannerError::UnknownStrategy(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_are_greedy() {
        assert_eq!(PlannerWeights::default(), StrategyProfile::Greedy.weights());
    }

    #[test]
    fn test_profiles_lean_the_right_way() {
        let greedy = StrategyProfile::Greedy.weights();
        assert!(StrategyProfile::Aggressive.weights().damage_bias > greedy.damage_bias);
        assert!(StrategyProfile::Defensive.weights().threat_penalty > greedy.threat_penalty);
        assert!(StrategyProfile::Defensive.weights().cover_bonus > greedy.cover_bonus);
        assert!(StrategyProfile::ObjectiveFocused.weights().objective_value > greedy.objective_value);
    }

    #[test]
    fn test_profile_parsing() {
        for profile in StrategyProfile::ALL {
            assert_eq!(profile.name().parse::<StrategyProfile>().unwrap(), profile);
        }
        assert_eq!(
            "OBJECTIVE_FOCUSED".parse::<StrategyProfile>().unwrap(),
            StrategyProfile::ObjectiveFocused
        );
        assert!(matches!(
            "cowardly".parse::<StrategyProfile>(),
            Err(PlannerError::UnknownStrategy(_))
        ));
    }

    #[test]
    fn test_partial_weight_table() {
        let weights = PlannerWeights::from_toml_str("threat_penalty = 3.0\n").unwrap();
        assert_eq!(weights.threat_penalty, 3.0);
        assert_eq!(weights.objective_value, 1.0);
    }

    #[test]
    fn test_missing_weight_file() {
        let err = load_strategy_weights("does/not/exist.toml").unwrap_err();
        assert!(matches!(err, PlannerError::IoError(_)));
    }
}
