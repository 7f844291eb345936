//! Objective markers and who holds them

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::army::units::ArmyState;
use crate::core::types::{ArmyId, IdGenerator, ObjectiveId, Point};

/// Control range around a marker, measured from the edge of a unit's base
pub const OBJECTIVE_CONTROL_RANGE: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectivePriority {
    Primary,
    #[default]
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveControl {
    #[default]
    Uncontrolled,
    Contested,
    Controlled(ArmyId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveMarker {
    pub id: ObjectiveId,
    pub position: Point,
    pub priority: ObjectivePriority,
    pub control: ObjectiveControl,
}

impl ObjectiveMarker {
    pub fn new(id: ObjectiveId, position: Point, priority: ObjectivePriority) -> Self {
        Self {
            id,
            position,
            priority,
            control: ObjectiveControl::Uncontrolled,
        }
    }

    pub fn primary(ids: &mut IdGenerator, position: Point) -> Self {
        Self::new(ids.next_objective_id(), position, ObjectivePriority::Primary)
    }

    pub fn secondary(ids: &mut IdGenerator, position: Point) -> Self {
        Self::new(ids.next_objective_id(), position, ObjectivePriority::Secondary)
    }

    pub fn with_control(mut self, control: ObjectiveControl) -> Self {
        self.control = control;
        self
    }

    pub fn is_controlled_by(&self, army: ArmyId) -> bool {
        self.control == ObjectiveControl::Controlled(army)
    }

    /// Held by anyone other than `army`
    pub fn is_held_against(&self, army: ArmyId) -> bool {
        matches!(self.control, ObjectiveControl::Controlled(owner) if owner != army)
    }
}

/// Total objective control each army has on the marker
fn control_totals(objective: &ObjectiveMarker, armies: &[&ArmyState]) -> Vec<(ArmyId, u32)> {
    armies
        .iter()
        .map(|army| {
            let total = army
                .active_units()
                .filter(|u| u.edge_distance_to(objective.position) <= OBJECTIVE_CONTROL_RANGE)
                .map(|u| u.objective_control)
                .sum();
            (army.id, total)
        })
        .collect()
}

/// Work out who holds `objective` now
///
/// The army with the highest objective-control total in range takes it; a tie
/// at the top is contested. With nobody in range the marker keeps whatever
/// state it had.
pub fn resolve_objective_control(objective: &ObjectiveMarker, armies: &[&ArmyState]) -> ObjectiveControl {
    let totals = control_totals(objective, armies);
    let best = totals.iter().map(|(_, total)| *total).max().unwrap_or(0);
    if best == 0 {
        return objective.control;
    }

    let mut leaders = totals.iter().filter(|(_, total)| *total == best);
    let control = match (leaders.next(), leaders.next()) {
        (Some((army, _)), None) => ObjectiveControl::Controlled(*army),
        _ => ObjectiveControl::Contested,
    };
    trace!(objective = objective.id.0, ?control, best, "objective resolved");
    control
}

/// Resolve every marker in place
pub fn update_objective_control(objectives: &mut [ObjectiveMarker], armies: &[&ArmyState]) {
    for objective in objectives.iter_mut() {
        objective.control = resolve_objective_control(objective, armies);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::army::units::UnitState;
    use crate::core::types::UnitId;

    fn army(id: u32, units: Vec<UnitState>) -> ArmyState {
        units
            .into_iter()
            .fold(ArmyState::new(ArmyId(id), format!("Army {id}")), |a, u| a.with_unit(u))
    }

    fn squad(id: u32, x: f32, oc: u32) -> UnitState {
        UnitState::new(UnitId(id), "Squad", Point::new(x, 0.0)).with_objective_control(oc)
    }

    fn marker() -> ObjectiveMarker {
        ObjectiveMarker::primary(&mut IdGenerator::new(), Point::ZERO)
    }

    #[test]
    fn test_single_army_takes_control() {
        let red = army(1, vec![squad(1, 2.0, 2)]);
        let blue = army(2, vec![squad(2, 20.0, 5)]);
        assert_eq!(
            resolve_objective_control(&marker(), &[&red, &blue]),
            ObjectiveControl::Controlled(ArmyId(1))
        );
    }

    #[test]
    fn test_range_measured_from_base_edge() {
        // Centre is 3.4" away but the base edge is inside 3"
        let red = army(1, vec![squad(1, 3.4, 1)]);
        assert_eq!(
            resolve_objective_control(&marker(), &[&red]),
            ObjectiveControl::Controlled(ArmyId(1))
        );
        let far = army(1, vec![squad(1, 3.6, 1)]);
        assert_eq!(resolve_objective_control(&marker(), &[&far]), ObjectiveControl::Uncontrolled);
    }

    #[test]
    fn test_higher_total_wins() {
        let red = army(1, vec![squad(1, 1.0, 2), squad(2, -1.0, 2)]);
        let blue = army(2, vec![squad(3, 2.0, 3)]);
        assert_eq!(
            resolve_objective_control(&marker(), &[&red, &blue]),
            ObjectiveControl::Controlled(ArmyId(1))
        );
    }

    #[test]
    fn test_equal_totals_contested() {
        let red = army(1, vec![squad(1, 2.0, 2)]);
        let blue = army(2, vec![squad(2, -2.0, 2)]);
        assert_eq!(
            resolve_objective_control(&marker(), &[&red, &blue]),
            ObjectiveControl::Contested
        );
    }

    #[test]
    fn test_control_is_sticky_when_empty() {
        let held = marker().with_control(ObjectiveControl::Controlled(ArmyId(2)));
        let red = army(1, vec![squad(1, 20.0, 2)]);
        assert_eq!(
            resolve_objective_control(&held, &[&red]),
            ObjectiveControl::Controlled(ArmyId(2))
        );
    }

    #[test]
    fn test_reserves_and_dead_units_ignored() {
        let red = army(
            1,
            vec![squad(1, 1.0, 4).in_reserve(true), squad(2, 1.0, 4).with_models(0, 5)],
        );
        let blue = army(2, vec![squad(3, -1.0, 1)]);
        assert_eq!(
            resolve_objective_control(&marker(), &[&red, &blue]),
            ObjectiveControl::Controlled(ArmyId(2))
        );
    }

    #[test]
    fn test_update_all_markers() {
        let mut ids = IdGenerator::new();
        let mut objectives = vec![
            ObjectiveMarker::primary(&mut ids, Point::ZERO),
            ObjectiveMarker::secondary(&mut ids, Point::new(30.0, 0.0)),
        ];
        let red = army(1, vec![squad(1, 1.0, 1)]);
        update_objective_control(&mut objectives, &[&red]);
        assert!(objectives[0].is_controlled_by(ArmyId(1)));
        assert_eq!(objectives[1].control, ObjectiveControl::Uncontrolled);
        assert!(objectives[0].is_held_against(ArmyId(2)));
        assert!(!objectives[0].is_held_against(ArmyId(1)));
    }
}
