use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tactical_planner::army::{ArmyState, ObjectiveMarker, RoleProfile, UnitRole, UnitState};
use tactical_planner::core::{ArmyId, IdGenerator, PlannerConfig, Point};
use tactical_planner::navigation::{find_path, NavMesh, NavMeshSet};
use tactical_planner::planner::{plan_movements, PlanningInput};
use tactical_planner::terrain::{MovementProfile, TerrainLayout, TerrainPreset};

fn army(id: ArmyId, x: f32, ids: &mut IdGenerator) -> ArmyState {
    let roles = [
        UnitRole::Anvil,
        UnitRole::Gunline,
        UnitRole::MeleeMissile,
        UnitRole::Skirmisher,
        UnitRole::Artillery,
        UnitRole::Utility,
    ];
    roles.into_iter().enumerate().fold(ArmyState::new(id, "Bench"), |army, (i, role)| {
        let position = Point::new(x, 7.0 + i as f32 * 6.0);
        army.with_unit(UnitState::new(ids.next_unit_id(), "Squad", position).with_role(RoleProfile::new(role)))
    })
}

fn bench_navigation(c: &mut Criterion) {
    let config = PlannerConfig::default();
    let layout = TerrainLayout::preset(TerrainPreset::GtStandard, &mut IdGenerator::new());

    c.bench_function("navmesh_build_gt_standard", |b| {
        b.iter(|| NavMesh::build(black_box(layout.features()), config.battlefield, config.nav_clearance, &[]))
    });

    let mesh = NavMesh::build(layout.features(), config.battlefield, config.nav_clearance, &[]);
    let profile = MovementProfile::vehicle(2.0);
    c.bench_function("find_path_across_board", |b| {
        b.iter(|| {
            find_path(
                black_box(Point::new(4.0, 6.0)),
                black_box(Point::new(56.0, 38.0)),
                &mesh,
                layout.features(),
                &profile,
            )
        })
    });
}

fn bench_planning(c: &mut Criterion) {
    let mut ids = IdGenerator::new();
    let layout = TerrainLayout::preset(TerrainPreset::GtStandard, &mut ids);
    let base = PlannerConfig::default();
    let meshes = NavMeshSet::build(layout.features(), base.battlefield, base.nav_clearance);
    let objectives = vec![
        ObjectiveMarker::primary(&mut ids, Point::new(30.0, 22.0)),
        ObjectiveMarker::secondary(&mut ids, Point::new(15.0, 11.0)),
        ObjectiveMarker::secondary(&mut ids, Point::new(45.0, 33.0)),
    ];
    let red = army(ArmyId(1), 6.0, &mut ids);
    let blue = army(ArmyId(2), 54.0, &mut ids);
    let input = PlanningInput {
        army: &red,
        opponent: &blue,
        objectives: &objectives,
        terrain: layout.features(),
        meshes: &meshes,
    };

    let mut group = c.benchmark_group("plan_movements");
    group.bench_function("greedy", |b| b.iter(|| plan_movements(black_box(&input), &base)));
    for width in [2usize, 8, 16] {
        let config = PlannerConfig {
            use_beam_search: true,
            beam_width: width,
            ..base.clone()
        };
        group.bench_with_input(BenchmarkId::new("beam", width), &config, |b, config| {
            b.iter(|| plan_movements(black_box(&input), config))
        });
    }
    group.finish();
}

criterion_group!(planner_benches, bench_navigation, bench_planning);
criterion_main!(planner_benches);
