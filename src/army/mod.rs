//! Armies, units and objectives as seen by the planner

pub mod objectives;
pub mod units;

pub use objectives::{
    resolve_objective_control, update_objective_control, ObjectiveControl, ObjectiveMarker,
    ObjectivePriority, OBJECTIVE_CONTROL_RANGE,
};
pub use units::{
    apply_planned_movements, ArmyState, Engagement, RoleProfile, RoleTraits, UnitRole, UnitState,
};
