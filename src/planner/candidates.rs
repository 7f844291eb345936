//! Candidate destinations for a unit this turn
//!
//! Every candidate is routed for the unit's own base. Destinations the unit
//! cannot reach in one move are cut back to the farthest point it can.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::army::objectives::ObjectiveMarker;
use crate::army::units::UnitState;
use crate::core::types::{BoundingBox, Point, TerrainId};
use crate::navigation::navmesh::NavMeshSet;
use crate::navigation::pathfinding::{back_off_until_clear, find_path, walk_path, PathPrefix};
use crate::planner::constants::{
    ADVANCE_EXPECTED_ROLL, MAX_WAYPOINT_CANDIDATES, MIN_MOVE_DISTANCE, SEEK_COVER_RANGE_FACTOR,
    WAYPOINT_DEDUP_DISTANCE,
};
use crate::terrain::blocking::{is_movement_blocked, is_position_blocked_by_terrain, MovementProfile};
use crate::terrain::feature::TerrainFeature;

/// Why a destination was proposed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateKind {
    Hold,
    AdvanceObjective,
    Retreat,
    FlankLeft,
    FlankRight,
    SeekCover,
    Waypoint,
}

impl CandidateKind {
    pub fn name(&self) -> &'static str {
        match self {
            CandidateKind::Hold => "hold",
            CandidateKind::AdvanceObjective => "advance-objective",
            CandidateKind::Retreat => "retreat",
            CandidateKind::FlankLeft => "flank-left",
            CandidateKind::FlankRight => "flank-right",
            CandidateKind::SeekCover => "seek-cover",
            CandidateKind::Waypoint => "waypoint",
        }
    }
}

/// A reachable destination with the route to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementCandidate {
    pub kind: CandidateKind,
    /// Cut short of the intended target
    pub partial: bool,
    pub destination: Point,
    pub path: Vec<Point>,
    /// Distance travelled, difficult-ground penalty included
    pub distance: f32,
    /// Cover feature targeted by `SeekCover`
    pub target_terrain: Option<TerrainId>,
}

impl MovementCandidate {
    pub fn hold(position: Point) -> Self {
        Self {
            kind: CandidateKind::Hold,
            partial: false,
            destination: position,
            path: vec![position],
            distance: 0.0,
            target_terrain: None,
        }
    }

    /// Kind name, suffixed with `-partial` for cut-short moves
    pub fn label(&self) -> String {
        if self.partial {
            format!("{}-partial", self.kind.name())
        } else {
            self.kind.name().to_string()
        }
    }

    pub fn is_hold(&self) -> bool {
        self.kind == CandidateKind::Hold
    }
}

/// Shared inputs for candidate generation
#[derive(Debug, Clone, Copy)]
pub struct CandidateContext<'a> {
    pub terrain: &'a [TerrainFeature],
    pub meshes: &'a NavMeshSet,
    pub objectives: &'a [ObjectiveMarker],
    pub battlefield: BoundingBox,
    pub allow_advance: bool,
}

/// How far a unit may go this turn
pub fn movement_allowance(unit: &UnitState, allow_advance: bool) -> f32 {
    if allow_advance {
        unit.movement + ADVANCE_EXPECTED_ROLL
    } else {
        unit.movement
    }
}

/// All candidate moves for `unit`, hold first
pub fn generate_candidates(unit: &UnitState, ctx: &CandidateContext<'_>) -> Vec<MovementCandidate> {
    let allowance = movement_allowance(unit, ctx.allow_advance);
    let router = Router::new(unit, ctx, allowance);
    let mut candidates = vec![MovementCandidate::hold(unit.position)];

    if allowance <= MIN_MOVE_DISTANCE {
        return candidates;
    }

    let nearest_objective = ctx
        .objectives
        .iter()
        .min_by(|a, b| {
            a.position
                .distance_squared(unit.position)
                .total_cmp(&b.position.distance_squared(unit.position))
        });
    if let Some(objective) = nearest_objective {
        candidates.extend(router.route(CandidateKind::AdvanceObjective, objective.position, None));
    }

    let away = (unit.position - ctx.battlefield.center()).normalize_or_zero();
    if away != Point::ZERO {
        candidates.extend(router.route(CandidateKind::Retreat, unit.position + away * allowance, None));
    }

    candidates.extend(router.route(
        CandidateKind::FlankLeft,
        unit.position - Point::new(allowance, 0.0),
        None,
    ));
    candidates.extend(router.route(
        CandidateKind::FlankRight,
        unit.position + Point::new(allowance, 0.0),
        None,
    ));

    let cover_range = allowance * SEEK_COVER_RANGE_FACTOR;
    for feature in ctx.terrain {
        if !feature.traits().grants_cover() || feature.traits().exposed {
            continue;
        }
        if feature.position().distance(unit.position) > cover_range {
            continue;
        }
        candidates.extend(router.route(CandidateKind::SeekCover, feature.position(), Some(feature.id())));
    }

    let mesh = ctx.meshes.for_profile(&router.profile);
    let mut added = 0;
    for index in mesh.waypoints_by_distance(unit.position) {
        if added == MAX_WAYPOINT_CANDIDATES {
            break;
        }
        let position = mesh.waypoints()[index].position;
        if position.distance(unit.position) > allowance {
            break;
        }
        let crowded = candidates
            .iter()
            .any(|c| c.destination.distance(position) < WAYPOINT_DEDUP_DISTANCE);
        if crowded {
            continue;
        }
        if let Some(candidate) = router.route(CandidateKind::Waypoint, position, None) {
            candidates.push(candidate);
            added += 1;
        }
    }

    trace!(unit = unit.id.0, count = candidates.len(), allowance, "candidates generated");
    candidates
}

/// Routes targets for one unit and trims them to its allowance
struct Router<'a> {
    unit: &'a UnitState,
    ctx: &'a CandidateContext<'a>,
    profile: MovementProfile,
    allowance: f32,
}

impl<'a> Router<'a> {
    fn new(unit: &'a UnitState, ctx: &'a CandidateContext<'a>, allowance: f32) -> Self {
        Self {
            unit,
            ctx,
            profile: unit.movement_profile(),
            allowance,
        }
    }

    fn clamp(&self, point: Point) -> Point {
        self.ctx.battlefield.clamp_point(point, self.profile.base_radius)
    }

    fn route(&self, kind: CandidateKind, target: Point, target_terrain: Option<TerrainId>) -> Option<MovementCandidate> {
        let start = self.unit.position;
        let target = self.clamp(target);
        if target.distance(start) <= MIN_MOVE_DISTANCE {
            return None;
        }

        let mesh = self.ctx.meshes.for_profile(&self.profile);
        let path = find_path(start, target, mesh, self.ctx.terrain, &self.profile);

        let (prefix, partial) = if path.found && path.distance <= self.allowance {
            let prefix = PathPrefix {
                end: target,
                points: path.points,
                distance: path.distance,
            };
            (prefix, false)
        } else {
            let walked = walk_path(&path.points, self.allowance, self.ctx.terrain);
            (back_off_until_clear(walked, &self.profile, self.ctx.terrain), true)
        };

        self.finish(kind, prefix, partial, target_terrain)
    }

    /// Clamp the prefix end onto the table and build the candidate
    fn finish(
        &self,
        kind: CandidateKind,
        prefix: PathPrefix,
        partial: bool,
        target_terrain: Option<TerrainId>,
    ) -> Option<MovementCandidate> {
        let start = self.unit.position;
        let destination = self.clamp(prefix.end);
        if destination.distance(start) <= MIN_MOVE_DISTANCE {
            return None;
        }
        if is_position_blocked_by_terrain(destination, &self.profile, self.ctx.terrain) {
            return None;
        }

        let mut points = prefix.points;
        let mut distance = prefix.distance;
        if destination != prefix.end {
            // The clamp moved the end, so the last leg is a new segment
            let anchor = match points.len() {
                0 | 1 => start,
                n => points[n - 2],
            };
            if is_movement_blocked(anchor, destination, &self.profile, self.ctx.terrain) {
                trace!(unit = self.unit.id.0, kind = kind.name(), "clamped leg blocked");
                return None;
            }
            distance += anchor.distance(destination) - anchor.distance(prefix.end);
            if distance > self.allowance {
                return None;
            }
        }

        if let Some(last) = points.last_mut() {
            *last = destination;
        }
        Some(MovementCandidate {
            kind,
            partial,
            destination,
            path: points,
            distance: distance.max(0.0),
            target_terrain,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{IdGenerator, UnitId};

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    fn board() -> BoundingBox {
        BoundingBox::new(-30.0, -22.0, 30.0, 22.0)
    }

    fn squad_at(x: f32, y: f32) -> UnitState {
        UnitState::new(UnitId(1), "Squad", p(x, y))
    }

    fn scene(terrain: &[TerrainFeature]) -> NavMeshSet {
        NavMeshSet::build(terrain, board(), 1.0)
    }

    fn candidates_for(unit: &UnitState, terrain: &[TerrainFeature], objectives: &[ObjectiveMarker]) -> Vec<MovementCandidate> {
        let meshes = scene(terrain);
        let ctx = CandidateContext {
            terrain,
            meshes: &meshes,
            objectives,
            battlefield: board(),
            allow_advance: false,
        };
        generate_candidates(unit, &ctx)
    }

    #[test]
    fn test_hold_always_first() {
        let unit = squad_at(0.0, 0.0);
        let candidates = candidates_for(&unit, &[], &[]);
        assert!(candidates[0].is_hold());
        assert_eq!(candidates[0].destination, unit.position);
        assert_eq!(candidates[0].label(), "hold");
    }

    #[test]
    fn test_far_objective_gives_partial_advance() {
        let objective = ObjectiveMarker::primary(&mut IdGenerator::new(), p(20.0, 0.0));
        let candidates = candidates_for(&squad_at(0.0, 5.0), &[], &[objective]);
        let advance = candidates
            .iter()
            .find(|c| c.kind == CandidateKind::AdvanceObjective)
            .unwrap();
        assert!(advance.partial);
        assert_eq!(advance.label(), "advance-objective-partial");
        assert!((advance.distance - 6.0).abs() < 1e-3);
    }

    #[test]
    fn test_near_objective_reached_in_full() {
        let objective = ObjectiveMarker::primary(&mut IdGenerator::new(), p(4.0, 0.0));
        let candidates = candidates_for(&squad_at(0.0, 0.0), &[], &[objective]);
        let advance = candidates
            .iter()
            .find(|c| c.kind == CandidateKind::AdvanceObjective)
            .unwrap();
        assert!(!advance.partial);
        assert_eq!(advance.destination, p(4.0, 0.0));
    }

    #[test]
    fn test_flanks_and_retreat() {
        let candidates = candidates_for(&squad_at(10.0, 5.0), &[], &[]);
        let left = candidates.iter().find(|c| c.kind == CandidateKind::FlankLeft).unwrap();
        let right = candidates.iter().find(|c| c.kind == CandidateKind::FlankRight).unwrap();
        assert!(left.destination.distance(p(4.0, 5.0)) < 1e-4);
        assert!(right.destination.distance(p(16.0, 5.0)) < 1e-4);
        let retreat = candidates.iter().find(|c| c.kind == CandidateKind::Retreat).unwrap();
        assert!(retreat.destination.length() > p(10.0, 5.0).length());
    }

    #[test]
    fn test_destinations_stay_on_board() {
        let unit = squad_at(28.0, 20.0);
        for candidate in candidates_for(&unit, &[], &[]) {
            assert!(board().expanded(-unit.base_radius() + 1e-4).contains(candidate.destination));
        }
    }

    #[test]
    fn test_advance_stops_short_of_blocking_terrain() {
        let mut ids = IdGenerator::new();
        let terrain = vec![TerrainFeature::container(&mut ids, p(5.0, 0.0), 2.0, 40.0)];
        let objective = ObjectiveMarker::primary(&mut ids, p(10.0, 0.0));
        let unit = squad_at(0.0, 0.0);
        for candidate in candidates_for(&unit, &terrain, &[objective]) {
            assert!(!is_position_blocked_by_terrain(candidate.destination, &unit.movement_profile(), &terrain));
        }
    }

    #[test]
    fn test_seek_cover_targets_cover_terrain() {
        let mut ids = IdGenerator::new();
        let terrain = vec![
            TerrainFeature::crater(&mut ids, p(5.0, 0.0), 2.0),
            TerrainFeature::hills(&mut ids, p(-5.0, 0.0), 4.0, 4.0),
        ];
        let candidates = candidates_for(&squad_at(0.0, 0.0), &terrain, &[]);
        let cover: Vec<_> = candidates.iter().filter(|c| c.kind == CandidateKind::SeekCover).collect();
        assert_eq!(cover.len(), 1);
        assert_eq!(cover[0].target_terrain, Some(terrain[0].id()));
    }

    #[test]
    fn test_advance_roll_extends_allowance() {
        let unit = squad_at(0.0, 0.0);
        assert_eq!(movement_allowance(&unit, false), 6.0);
        assert_eq!(movement_allowance(&unit, true), 9.5);
    }

    #[test]
    fn test_waypoints_capped_and_spaced() {
        let mut ids = IdGenerator::new();
        let terrain = vec![
            TerrainFeature::container(&mut ids, p(3.0, 3.0), 1.0, 1.0),
            TerrainFeature::container(&mut ids, p(-3.0, -3.0), 1.0, 1.0),
        ];
        let candidates = candidates_for(&squad_at(0.0, 0.0), &terrain, &[]);
        let waypoints: Vec<_> = candidates.iter().filter(|c| c.kind == CandidateKind::Waypoint).collect();
        assert!(waypoints.len() <= MAX_WAYPOINT_CANDIDATES);
        for w in &waypoints {
            assert!(w.distance <= 6.0 + 1e-4);
        }
    }

    #[test]
    fn test_clamped_leg_rechecked_against_terrain() {
        let unit = squad_at(20.0, 14.0);
        let anchor = p(20.0, 10.0);
        let off_table = p(40.0, -10.0);
        let prefix = || PathPrefix {
            end: off_table,
            points: vec![unit.position, anchor, off_table],
            distance: 4.0 + anchor.distance(off_table),
        };
        let meshes = scene(&[]);
        let open = CandidateContext {
            terrain: &[],
            meshes: &meshes,
            objectives: &[],
            battlefield: board(),
            allow_advance: false,
        };
        let router = Router::new(&unit, &open, 40.0);
        let clamped = router.clamp(off_table);
        let candidate = router.finish(CandidateKind::Waypoint, prefix(), true, None).unwrap();
        assert_eq!(candidate.destination, clamped);
        assert_eq!(candidate.path.last(), Some(&clamped));
        assert!((candidate.distance - (4.0 + anchor.distance(clamped))).abs() < 1e-4);

        // Clear of the original leg, squarely on the clamped one
        let terrain = vec![TerrainFeature::container(&mut IdGenerator::new(), p(25.0, 0.0), 2.0, 2.0)];
        let walled = CandidateContext {
            terrain: &terrain,
            ..open
        };
        let router = Router::new(&unit, &walled, 40.0);
        assert!(router.finish(CandidateKind::Waypoint, prefix(), true, None).is_none());
    }
}
