//! Line of sight across terrain

use serde::{Deserialize, Serialize};

use crate::core::types::{Point, TerrainId};
use crate::terrain::feature::TerrainFeature;
use crate::terrain::geometry::{point_in_terrain, segment_entry_fraction};

/// Outcome of a line of sight check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineOfSight {
    pub visible: bool,
    /// Obscuring feature nearest `from` that stopped the check
    pub blocked_by: Option<TerrainId>,
    /// Sight passes through dense cover (accuracy penalty, never blocks)
    pub through_dense_cover: bool,
}

impl LineOfSight {
    fn clear() -> Self {
        Self {
            visible: true,
            blocked_by: None,
            through_dense_cover: false,
        }
    }
}

/// Can `from` see `to`?
///
/// Obscuring terrain blocks unless either end stands inside that feature or
/// either party ignores obscuring (towering or flying units). Features are
/// scanned in the order the sight line enters them, stopping at the first
/// that blocks.
pub fn check_line_of_sight(
    from: Point,
    to: Point,
    terrain: &[TerrainFeature],
    shooter_ignores_obscuring: bool,
    target_ignores_obscuring: bool,
) -> LineOfSight {
    let mut los = LineOfSight::clear();
    let ignores = shooter_ignores_obscuring || target_ignores_obscuring;

    let mut crossed: Vec<(f32, &TerrainFeature)> = terrain
        .iter()
        .filter(|feature| {
            let traits = feature.traits();
            traits.obscuring || traits.dense_cover
        })
        .filter_map(|feature| segment_entry_fraction(from, to, feature).map(|t| (t, feature)))
        .collect();
    crossed.sort_by(|a, b| a.0.total_cmp(&b.0));

    for (_, feature) in crossed {
        let traits = feature.traits();
        if traits.obscuring && !ignores {
            let endpoint_inside = point_in_terrain(from, feature) || point_in_terrain(to, feature);
            if !endpoint_inside {
                los.visible = false;
                los.blocked_by = Some(feature.id());
                return los;
            }
        }

        if traits.dense_cover {
            los.through_dense_cover = true;
        }
    }

    los
}

/// Shorthand when only visibility matters
pub fn has_line_of_sight(from: Point, to: Point, terrain: &[TerrainFeature]) -> bool {
    check_line_of_sight(from, to, terrain, false, false).visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::IdGenerator;
    use crate::terrain::feature::TerrainTraits;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    fn ruins_at_origin() -> Vec<TerrainFeature> {
        vec![TerrainFeature::ruins(&mut IdGenerator::new(), Point::ZERO, 10.0, 6.0)]
    }

    #[test]
    fn test_obscuring_blocks_sight() {
        let terrain = ruins_at_origin();
        let los = check_line_of_sight(p(-20.0, 0.0), p(20.0, 0.0), &terrain, false, false);
        assert!(!los.visible);
        assert_eq!(los.blocked_by, Some(terrain[0].id()));
    }

    #[test]
    fn test_both_inside_same_feature_can_see() {
        let terrain = ruins_at_origin();
        assert!(has_line_of_sight(p(-4.5, -2.5), p(4.5, 2.5), &terrain));
    }

    #[test]
    fn test_one_end_inside_can_see_out() {
        let terrain = ruins_at_origin();
        assert!(has_line_of_sight(p(0.0, 0.0), p(20.0, 0.0), &terrain));
        assert!(has_line_of_sight(p(20.0, 0.0), p(0.0, 0.0), &terrain));
    }

    #[test]
    fn test_towering_units_ignore_obscuring() {
        let terrain = ruins_at_origin();
        assert!(check_line_of_sight(p(-20.0, 0.0), p(20.0, 0.0), &terrain, true, false).visible);
        assert!(check_line_of_sight(p(-20.0, 0.0), p(20.0, 0.0), &terrain, false, true).visible);
    }

    #[test]
    fn test_dense_cover_flags_but_never_blocks() {
        let woods = TerrainFeature::woods(&mut IdGenerator::new(), Point::ZERO, 3.0);
        let los = check_line_of_sight(p(-20.0, 0.0), p(20.0, 0.0), &[woods], false, false);
        assert!(los.visible);
        assert!(los.through_dense_cover);
    }

    #[test]
    fn test_first_blocker_short_circuits() {
        let mut ids = IdGenerator::new();
        let near = TerrainFeature::ruins(&mut ids, p(-10.0, 0.0), 4.0, 4.0);
        let dense = TerrainFeature::woods(&mut ids, p(10.0, 0.0), 3.0);
        let los = check_line_of_sight(p(-20.0, 0.0), p(20.0, 0.0), &[near.clone(), dense], false, false);
        assert!(!los.visible);
        assert_eq!(los.blocked_by, Some(near.id()));
        // Scan stopped before reaching the woods
        assert!(!los.through_dense_cover);
    }

    #[test]
    fn test_blocker_is_nearest_along_the_line() {
        let mut ids = IdGenerator::new();
        let far = TerrainFeature::ruins(&mut ids, p(12.0, 0.0), 4.0, 4.0);
        let near = TerrainFeature::ruins(&mut ids, p(-8.0, 0.0), 4.0, 4.0);
        let terrain = [far.clone(), near.clone()];

        let los = check_line_of_sight(p(-20.0, 0.0), p(20.0, 0.0), &terrain, false, false);
        assert_eq!(los.blocked_by, Some(near.id()));
        let los = check_line_of_sight(p(20.0, 0.0), p(-20.0, 0.0), &terrain, false, false);
        assert_eq!(los.blocked_by, Some(far.id()));
    }

    #[test]
    fn test_dense_cover_before_blocker_is_flagged() {
        let mut ids = IdGenerator::new();
        let ruins = TerrainFeature::ruins(&mut ids, p(10.0, 0.0), 4.0, 4.0);
        let woods = TerrainFeature::woods(&mut ids, p(-10.0, 0.0), 3.0);
        let los = check_line_of_sight(p(-20.0, 0.0), p(20.0, 0.0), &[ruins.clone(), woods], false, false);
        assert_eq!(los.blocked_by, Some(ruins.id()));
        assert!(los.through_dense_cover);
    }

    #[test]
    fn test_non_obscuring_terrain_ignored() {
        let crater = TerrainFeature::crater(&mut IdGenerator::new(), Point::ZERO, 3.0)
            .with_traits(TerrainTraits {
                light_cover: true,
                ..Default::default()
            });
        assert!(has_line_of_sight(p(-20.0, 0.0), p(20.0, 0.0), &[crater]));
    }
}
