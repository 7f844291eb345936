//! Named terrain layouts for a 60" x 44" board
//!
//! Presets are fixed catalogs of features, mirrored through the board centre
//! so neither deployment side is favoured.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::{PlannerError, Result};
use crate::core::types::{IdGenerator, Point};
use crate::terrain::constants::{BOARD_HEIGHT, BOARD_WIDTH};
use crate::terrain::feature::TerrainFeature;

/// Preset layout names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerrainPreset {
    GtStandard,
    CityFight,
    OpenField,
    None,
}

impl TerrainPreset {
    pub const ALL: [TerrainPreset; 4] = [
        TerrainPreset::GtStandard,
        TerrainPreset::CityFight,
        TerrainPreset::OpenField,
        TerrainPreset::None,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TerrainPreset::GtStandard => "gt-standard",
            TerrainPreset::CityFight => "city-fight",
            TerrainPreset::OpenField => "open-field",
            TerrainPreset::None => "none",
        }
    }
}

impl fmt::Display for TerrainPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TerrainPreset {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "gt-standard" | "gt" => Ok(TerrainPreset::GtStandard),
            "city-fight" | "city" => Ok(TerrainPreset::CityFight),
            "open-field" | "open" => Ok(TerrainPreset::OpenField),
            "none" | "empty" => Ok(TerrainPreset::None),
            _ => Err(PlannerError::UnknownTerrainPreset(s.to_string())),
        }
    }
}

/// A named, ordered set of features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainLayout {
    pub name: String,
    pub features: Vec<TerrainFeature>,
}

impl TerrainLayout {
    pub fn new(name: impl Into<String>, features: Vec<TerrainFeature>) -> Self {
        Self {
            name: name.into(),
            features,
        }
    }

    /// Build a preset, minting ids from `ids`
    pub fn preset(preset: TerrainPreset, ids: &mut IdGenerator) -> Self {
        let features = match preset {
            TerrainPreset::GtStandard => gt_standard(ids),
            TerrainPreset::CityFight => city_fight(ids),
            TerrainPreset::OpenField => open_field(ids),
            TerrainPreset::None => Vec::new(),
        };
        Self::new(preset.name(), features)
    }

    pub fn features(&self) -> &[TerrainFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn p(x: f32, y: f32) -> Point {
    Point::new(x, y)
}

/// Reflect a point through the board centre
fn mirror(point: Point) -> Point {
    p(BOARD_WIDTH - point.x, BOARD_HEIGHT - point.y)
}

fn gt_standard(ids: &mut IdGenerator) -> Vec<TerrainFeature> {
    let mut features = vec![TerrainFeature::ruins(ids, p(30.0, 22.0), 10.0, 6.0).named("Central Ruins")];
    for (i, pos) in [p(14.0, 12.0), p(14.0, 32.0)].into_iter().enumerate() {
        features.push(TerrainFeature::ruins(ids, pos, 8.0, 5.0).named(format!("Flank Ruins {}", i * 2 + 1)));
        features.push(
            TerrainFeature::ruins(ids, mirror(pos), 8.0, 5.0).named(format!("Flank Ruins {}", i * 2 + 2)),
        );
    }
    let container = p(30.0, 9.0);
    features.push(TerrainFeature::container(ids, container, 6.0, 3.0).named("Container A"));
    features.push(TerrainFeature::container(ids, mirror(container), 6.0, 3.0).named("Container B"));
    let woods = p(6.0, 22.0);
    features.push(TerrainFeature::woods(ids, woods, 3.0).named("West Woods"));
    features.push(TerrainFeature::woods(ids, mirror(woods), 3.0).named("East Woods"));
    let crater = p(22.0, 17.0);
    features.push(TerrainFeature::crater(ids, crater, 2.0));
    features.push(TerrainFeature::crater(ids, mirror(crater), 2.0));
    let hill = p(22.0, 28.0);
    features.push(TerrainFeature::hills(ids, hill, 7.0, 5.0));
    features.push(TerrainFeature::hills(ids, mirror(hill), 7.0, 5.0));
    features
}

fn city_fight(ids: &mut IdGenerator) -> Vec<TerrainFeature> {
    let mut features = vec![TerrainFeature::building(ids, p(30.0, 22.0), 6.0, 6.0).named("Hab Block")];
    let building = p(12.0, 11.0);
    features.push(TerrainFeature::building(ids, building, 8.0, 8.0));
    features.push(TerrainFeature::building(ids, mirror(building), 8.0, 8.0));
    for pos in [p(24.0, 10.0), p(12.0, 33.0)] {
        features.push(TerrainFeature::ruins(ids, pos, 8.0, 5.0));
        features.push(TerrainFeature::ruins(ids, mirror(pos), 8.0, 5.0));
    }
    let barricade = p(30.0, 15.0);
    features.push(TerrainFeature::barricade(ids, barricade, 6.0, 0.5));
    features.push(TerrainFeature::barricade(ids, mirror(barricade), 6.0, 0.5));
    let debris = p(20.0, 22.0);
    features.push(TerrainFeature::debris(ids, debris, 2.5));
    features.push(TerrainFeature::debris(ids, mirror(debris), 2.5));
    let container = p(6.0, 22.0);
    features.push(TerrainFeature::container(ids, container, 3.0, 6.0));
    features.push(TerrainFeature::container(ids, mirror(container), 3.0, 6.0));
    features
}

fn open_field(ids: &mut IdGenerator) -> Vec<TerrainFeature> {
    let mut features = vec![TerrainFeature::crater(ids, p(30.0, 22.0), 3.0).named("Impact Crater")];
    let hill = p(18.0, 14.0);
    features.push(TerrainFeature::hills(ids, hill, 10.0, 8.0));
    features.push(TerrainFeature::hills(ids, mirror(hill), 10.0, 8.0));
    let woods = p(10.0, 34.0);
    features.push(TerrainFeature::woods(ids, woods, 4.0));
    features.push(TerrainFeature::woods(ids, mirror(woods), 4.0));
    let debris = p(30.0, 8.0);
    features.push(TerrainFeature::debris(ids, debris, 2.0));
    features.push(TerrainFeature::debris(ids, mirror(debris), 2.0));
    features
}
