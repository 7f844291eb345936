//! Enemy threat estimate
//!
//! A cheap reach-based heuristic: each enemy projects a linear falloff out to
//! its weapon range plus movement. It is not a damage prediction.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::army::units::ArmyState;
use crate::core::types::{Point, UnitId};
use crate::planner::constants::{CLOSE_RANGE, CLOSE_RANGE_THREAT_MULTIPLIER};

/// Threat at one point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ThreatLevel {
    pub threat: f32,
    /// Some enemy is within close range
    pub close_range: bool,
    /// Some enemy could charge this point next turn
    pub charge_exposed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ThreatSource {
    position: Point,
    charge_reach: f32,
    reach: f32,
}

/// Threat from one army against another
#[derive(Debug, Clone, Default)]
pub struct ThreatMap {
    sources: Vec<ThreatSource>,
    per_unit: AHashMap<UnitId, ThreatLevel>,
}

impl ThreatMap {
    /// Threat a unit standing at `point` would face
    pub fn threat_at(&self, point: Point) -> ThreatLevel {
        let mut level = ThreatLevel::default();
        for source in &self.sources {
            let d = source.position.distance(point);
            let mut term = (source.reach - d).max(0.0) / source.reach;
            if d <= CLOSE_RANGE {
                term *= CLOSE_RANGE_THREAT_MULTIPLIER;
                level.close_range = true;
            }
            if d <= source.charge_reach {
                level.charge_exposed = true;
            }
            level.threat += term;
        }
        level
    }

    /// Threat against an allied unit at its current position
    pub fn for_unit(&self, id: UnitId) -> ThreatLevel {
        self.per_unit.get(&id).copied().unwrap_or_default()
    }

    /// Cached threat for `id`, or the live value at `position` for units the
    /// map was not built against
    pub fn for_unit_or_at(&self, id: UnitId, position: Point) -> ThreatLevel {
        match self.per_unit.get(&id) {
            Some(level) => *level,
            None => self.threat_at(position),
        }
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Threat the `opponent` projects onto `active`
///
/// Dead and reserve enemies project nothing. Enemies with no reach at all
/// are skipped.
pub fn build_threat_map(active: &ArmyState, opponent: &ArmyState) -> ThreatMap {
    let sources = opponent
        .active_units()
        .filter_map(|enemy| {
            let reach = enemy.weapon_range + enemy.movement;
            (reach > 0.0).then_some(ThreatSource {
                position: enemy.position,
                charge_reach: enemy.charge_threat_distance(),
                reach,
            })
        })
        .collect();

    let mut map = ThreatMap {
        sources,
        per_unit: AHashMap::new(),
    };
    let per_unit = active
        .active_units()
        .map(|ally| (ally.id, map.threat_at(ally.position)))
        .collect();
    map.per_unit = per_unit;
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::army::units::{RoleProfile, UnitRole, UnitState};
    use crate::core::types::ArmyId;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    fn enemy_at(x: f32) -> ArmyState {
        ArmyState::new(ArmyId(2), "Blue").with_unit(
            UnitState::new(UnitId(10), "Gunners", p(x, 0.0))
                .with_movement(6.0)
                .with_weapon_range(24.0),
        )
    }

    fn ally_at(x: f32) -> ArmyState {
        ArmyState::new(ArmyId(1), "Red").with_unit(UnitState::new(UnitId(1), "Squad", p(x, 0.0)))
    }

    #[test]
    fn test_linear_falloff() {
        let map = build_threat_map(&ally_at(0.0), &enemy_at(15.0));
        let level = map.for_unit(UnitId(1));
        assert!((level.threat - 0.5).abs() < 1e-6);
        assert!(!level.close_range);
        assert!(!level.charge_exposed);
    }

    #[test]
    fn test_outside_reach_is_safe() {
        let map = build_threat_map(&ally_at(0.0), &enemy_at(40.0));
        assert_eq!(map.threat_at(Point::ZERO).threat, 0.0);
    }

    #[test]
    fn test_close_range_boost() {
        let map = build_threat_map(&ally_at(0.0), &enemy_at(3.0));
        let level = map.threat_at(Point::ZERO);
        assert!((level.threat - (27.0 / 30.0) * 1.2).abs() < 1e-5);
        assert!(level.close_range);
        assert!(level.charge_exposed);
    }

    #[test]
    fn test_charge_exposure_boundary() {
        let map = build_threat_map(&ally_at(0.0), &enemy_at(13.0));
        assert!(map.threat_at(Point::ZERO).charge_exposed);
        assert!(!map.threat_at(p(-0.5, 0.0)).charge_exposed);
    }

    #[test]
    fn test_charge_threat_distance_sets_exposure() {
        let ally = ally_at(0.0);
        assert!(!build_threat_map(&ally, &enemy_at(18.0)).for_unit(UnitId(1)).charge_exposed);

        let mut jump_troops = enemy_at(18.0);
        jump_troops.units[0].role = RoleProfile::new(UnitRole::MeleeMissile).with_charge_threat(20.0);
        assert!(build_threat_map(&ally, &jump_troops).for_unit(UnitId(1)).charge_exposed);

        let mut slow = enemy_at(10.0);
        slow.units[0].role = RoleProfile::new(UnitRole::MeleeMissile).with_charge_threat(8.0);
        assert!(!build_threat_map(&ally, &slow).for_unit(UnitId(1)).charge_exposed);
    }

    #[test]
    fn test_threat_sums_over_enemies() {
        let opponent = enemy_at(15.0).with_unit(
            UnitState::new(UnitId(11), "More Gunners", p(-15.0, 0.0))
                .with_movement(6.0)
                .with_weapon_range(24.0),
        );
        assert!((build_threat_map(&ally_at(0.0), &opponent).threat_at(Point::ZERO).threat - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_reserves_project_nothing() {
        let mut opponent = enemy_at(3.0);
        opponent.units[0].in_reserve = true;
        let map = build_threat_map(&ally_at(0.0), &opponent);
        assert!(map.is_empty());
        assert_eq!(map.for_unit(UnitId(1)), ThreatLevel::default());
    }

    #[test]
    fn test_uncached_unit_falls_back_to_live_threat() {
        let map = build_threat_map(&ally_at(0.0), &enemy_at(15.0));
        assert_eq!(map.for_unit_or_at(UnitId(1), p(-20.0, 0.0)), map.for_unit(UnitId(1)));
        assert_eq!(map.for_unit_or_at(UnitId(42), p(5.0, 0.0)), map.threat_at(p(5.0, 0.0)));
    }

    #[test]
    fn test_unknown_unit_has_no_threat() {
        let map = build_threat_map(&ally_at(0.0), &enemy_at(3.0));
        assert_eq!(map.for_unit(UnitId(99)), ThreatLevel::default());
        assert_eq!(map.source_count(), 1);
    }
}
