//! Cover granted by terrain to a target being shot at

use serde::{Deserialize, Serialize};

use crate::core::types::Point;
use crate::terrain::feature::TerrainFeature;
use crate::terrain::geometry::{line_intersects_terrain, point_in_terrain};

/// Cover strength, ordered so that `max` picks the better cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum CoverLevel {
    #[default]
    None,
    Light,
    Heavy,
}

impl CoverLevel {
    fn of(feature: &TerrainFeature) -> Self {
        let traits = feature.traits();
        if traits.heavy_cover {
            CoverLevel::Heavy
        } else if traits.light_cover {
            CoverLevel::Light
        } else {
            CoverLevel::None
        }
    }
}

/// Result of a cover query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TerrainCover {
    pub level: CoverLevel,
    /// Target stands inside cover-granting terrain
    pub in_terrain: bool,
    /// Target is behind cover-granting terrain the shot passes through
    pub behind_terrain: bool,
    /// Shot passes through dense cover (separate hit penalty)
    pub fired_through_dense: bool,
}

impl TerrainCover {
    pub fn has_cover(&self) -> bool {
        self.level != CoverLevel::None
    }
}

/// Cover for a target at `position` shot from `shooter`
///
/// Standing inside cover-granting terrain always counts, heavy beating light.
/// Terrain between shooter and target counts too, unless the shooter is
/// standing in it. Exposed terrain never grants cover. Dense cover on the
/// line of fire is flagged whether or not cover was granted.
pub fn get_terrain_cover(position: Point, shooter: Point, terrain: &[TerrainFeature]) -> TerrainCover {
    let mut cover = TerrainCover::default();

    for feature in terrain {
        let traits = feature.traits();
        let inside = point_in_terrain(position, feature);
        let crossed = !inside && line_intersects_terrain(shooter, position, feature);

        if crossed && traits.dense_cover && !point_in_terrain(shooter, feature) {
            cover.fired_through_dense = true;
        }

        if !traits.grants_cover() {
            continue;
        }

        if inside {
            cover.in_terrain = true;
            cover.level = cover.level.max(CoverLevel::of(feature));
        } else if crossed && !point_in_terrain(shooter, feature) {
            cover.behind_terrain = true;
            cover.level = cover.level.max(CoverLevel::of(feature));
        }
    }

    cover
}

/// Cover a position has from terrain it stands in, regardless of shooter
pub fn cover_at_position(position: Point, terrain: &[TerrainFeature]) -> CoverLevel {
    terrain
        .iter()
        .filter(|f| f.traits().grants_cover() && point_in_terrain(position, f))
        .map(CoverLevel::of)
        .max()
        .unwrap_or_default()
}
