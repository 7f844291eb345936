//! Property tests for terrain geometry and routing

use proptest::prelude::*;

use tactical_planner::core::{BoundingBox, IdGenerator, Point};
use tactical_planner::navigation::{find_path, walk_path, NavMesh};
use tactical_planner::terrain::geometry::distance_to_terrain;
use tactical_planner::terrain::{is_movement_blocked, point_in_terrain, MovementProfile, TerrainFeature};

fn board() -> BoundingBox {
    BoundingBox::new(-30.0, -22.0, 30.0, 22.0)
}

fn point_on_board() -> impl Strategy<Value = Point> {
    (-29.0f32..29.0, -21.0f32..21.0).prop_map(|(x, y)| Point::new(x, y))
}

proptest! {
    #[test]
    fn prop_inside_rectangle_iff_zero_distance(
        cx in -10.0f32..10.0,
        cy in -10.0f32..10.0,
        w in 0.5f32..12.0,
        h in 0.5f32..12.0,
        point in point_on_board(),
    ) {
        let feature = TerrainFeature::container(&mut IdGenerator::new(), Point::new(cx, cy), w, h);
        prop_assert_eq!(point_in_terrain(point, &feature), distance_to_terrain(point, &feature) == 0.0);
    }

    #[test]
    fn prop_capsule_blocking_grows_with_radius(
        from in point_on_board(),
        to in point_on_board(),
        radius in 0.1f32..3.0,
        extra in 0.0f32..3.0,
    ) {
        let terrain = vec![TerrainFeature::container(&mut IdGenerator::new(), Point::ZERO, 6.0, 4.0)];
        let narrow = MovementProfile::infantry(radius);
        let wide = MovementProfile::infantry(radius + extra);
        if is_movement_blocked(from, to, &narrow, &terrain) {
            prop_assert!(is_movement_blocked(from, to, &wide, &terrain));
        }
    }

    #[test]
    fn prop_walk_never_exceeds_budget(
        points in proptest::collection::vec(point_on_board(), 1..6),
        budget in 0.0f32..40.0,
    ) {
        let terrain = vec![TerrainFeature::crater(&mut IdGenerator::new(), Point::ZERO, 4.0)];
        let walked = walk_path(&points, budget, &terrain);
        prop_assert!(walked.distance <= budget + 1e-3);
        prop_assert_eq!(walked.points.first(), points.first());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_routes_keep_their_endpoints(from in point_on_board(), to in point_on_board()) {
        let mut ids = IdGenerator::new();
        let terrain = vec![
            TerrainFeature::container(&mut ids, Point::new(-8.0, 0.0), 4.0, 10.0),
            TerrainFeature::building(&mut ids, Point::new(8.0, 4.0), 6.0, 6.0),
            TerrainFeature::debris(&mut ids, Point::new(0.0, -10.0), 3.0),
        ];
        let mesh = NavMesh::build(&terrain, board(), 1.0, &[]);
        let profile = MovementProfile::infantry(0.5);

        let path = find_path(from, to, &mesh, &terrain, &profile);
        prop_assert_eq!(path.points.first(), Some(&from));
        prop_assert_eq!(path.points.last(), Some(&to));
        if path.found {
            prop_assert!(path.distance + 1e-3 >= from.distance(to));
        } else {
            prop_assert_eq!(path.points.len(), 2);
        }
    }
}
