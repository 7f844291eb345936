//! Movement blocking and difficult ground
//!
//! `is_terrain_blocking_for_unit` is the only place blocking policy lives;
//! every higher-level check below routes through it and only adds geometry.

use serde::{Deserialize, Serialize};

use crate::core::types::{Point, TerrainId};
use crate::terrain::constants::DIFFICULT_GROUND_PENALTY;
use crate::terrain::feature::TerrainFeature;
use crate::terrain::geometry::{distance_to_terrain, line_intersects_terrain, segment_distance_to_terrain};

/// The parts of a unit that matter to terrain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementProfile {
    pub is_infantry: bool,
    pub is_large_model: bool,
    /// Base radius in inches, never negative
    pub base_radius: f32,
}

impl MovementProfile {
    pub fn new(is_infantry: bool, is_large_model: bool, base_radius: f32) -> Self {
        Self {
            is_infantry,
            is_large_model,
            base_radius: base_radius.max(0.0),
        }
    }

    pub fn infantry(base_radius: f32) -> Self {
        Self::new(true, false, base_radius)
    }

    pub fn vehicle(base_radius: f32) -> Self {
        Self::new(false, true, base_radius)
    }
}

/// Does this feature stop a unit of the given type from moving through it?
pub fn is_terrain_blocking_for_unit(
    feature: &TerrainFeature,
    is_infantry: bool,
    is_large_model: bool,
) -> bool {
    // Infantry climb through walls and ruins
    if feature.traits().breachable && is_infantry {
        return false;
    }
    if feature.is_impassable() || feature.traits().obscuring {
        return true;
    }
    if feature.is_infantry_only() && !is_infantry {
        return true;
    }
    if feature.blocks_large_models() && is_large_model {
        return true;
    }
    false
}

/// First feature that blocks a base of `profile` sweeping along `from → to`
pub fn first_blocking_feature<'a>(
    from: Point,
    to: Point,
    profile: &MovementProfile,
    terrain: &'a [TerrainFeature],
) -> Option<&'a TerrainFeature> {
    terrain.iter().find(|feature| {
        is_terrain_blocking_for_unit(feature, profile.is_infantry, profile.is_large_model)
            && capsule_hits(from, to, profile.base_radius, feature)
    })
}

/// Swept-capsule movement test
pub fn is_movement_blocked(
    from: Point,
    to: Point,
    profile: &MovementProfile,
    terrain: &[TerrainFeature],
) -> bool {
    first_blocking_feature(from, to, profile, terrain).is_some()
}

/// Would a base of `profile` standing at `position` overlap blocking terrain?
pub fn is_position_blocked_by_terrain(
    position: Point,
    profile: &MovementProfile,
    terrain: &[TerrainFeature],
) -> bool {
    terrain.iter().any(|feature| {
        if !is_terrain_blocking_for_unit(feature, profile.is_infantry, profile.is_large_model) {
            return false;
        }
        let d = distance_to_terrain(position, feature);
        d == 0.0 || d < profile.base_radius
    })
}

fn capsule_hits(from: Point, to: Point, radius: f32, feature: &TerrainFeature) -> bool {
    if radius <= 0.0 {
        return line_intersects_terrain(from, to, feature);
    }
    segment_distance_to_terrain(from, to, feature) < radius
}

/// Additive penalty for every difficult-ground feature the segment crosses
pub fn get_movement_penalty(from: Point, to: Point, terrain: &[TerrainFeature]) -> f32 {
    terrain
        .iter()
        .filter(|f| f.traits().difficult_ground && line_intersects_terrain(from, to, f))
        .count() as f32
        * DIFFICULT_GROUND_PENALTY
}

/// Ids of every feature the segment touches, in terrain-list order
pub fn terrain_crossed(from: Point, to: Point, terrain: &[TerrainFeature]) -> Vec<TerrainId> {
    terrain
        .iter()
        .filter(|f| line_intersects_terrain(from, to, f))
        .map(|f| f.id())
        .collect()
}
