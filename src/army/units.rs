//! Unit and army snapshots consumed by the planner
//!
//! The planner never mutates these. Applying a plan produces a new snapshot.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::{PlannerError, Result};
use crate::core::types::{ArmyId, Point, UnitId};
use crate::planner::constants::CHARGE_REACH;
use crate::planner::PlannedMovement;
use crate::terrain::blocking::MovementProfile;

/// Battlefield role of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitRole {
    Gunline,
    Skirmisher,
    MeleeMissile,
    Artillery,
    Anvil,
    MobileFirepower,
    Utility,
}

/// How a role wants to fight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Engagement {
    /// Wants to be in combat range
    Close,
    /// Wants to sit at an optimal firing distance
    Standoff,
    Neutral,
}

/// Per-role scoring knobs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoleTraits {
    pub engagement: Engagement,
    pub objective_multiplier: f32,
    pub threat_multiplier: f32,
    /// Lower moves first
    pub order_priority: u8,
}

impl UnitRole {
    pub const ALL: [UnitRole; 7] = [
        UnitRole::Gunline,
        UnitRole::Skirmisher,
        UnitRole::MeleeMissile,
        UnitRole::Artillery,
        UnitRole::Anvil,
        UnitRole::MobileFirepower,
        UnitRole::Utility,
    ];

    pub fn traits(&self) -> RoleTraits {
        let (engagement, objective_multiplier, threat_multiplier, order_priority) = match self {
            UnitRole::Gunline => (Engagement::Standoff, 0.9, 1.0, 2),
            UnitRole::Skirmisher => (Engagement::Standoff, 1.1, 0.9, 1),
            UnitRole::MeleeMissile => (Engagement::Close, 1.0, 0.6, 0),
            UnitRole::Artillery => (Engagement::Standoff, 0.6, 1.3, 2),
            UnitRole::Anvil => (Engagement::Neutral, 1.4, 0.7, 2),
            UnitRole::MobileFirepower => (Engagement::Standoff, 1.0, 0.9, 1),
            UnitRole::Utility => (Engagement::Neutral, 1.2, 1.0, 2),
        };
        RoleTraits {
            engagement,
            objective_multiplier,
            threat_multiplier,
            order_priority,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            UnitRole::Gunline => "gunline",
            UnitRole::Skirmisher => "skirmisher",
            UnitRole::MeleeMissile => "melee_missile",
            UnitRole::Artillery => "artillery",
            UnitRole::Anvil => "anvil",
            UnitRole::MobileFirepower => "mobile_firepower",
            UnitRole::Utility => "utility",
        }
    }
}

impl fmt::Display for UnitRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UnitRole {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        UnitRole::ALL
            .into_iter()
            .find(|role| role.name() == key)
            .ok_or_else(|| PlannerError::UnknownRole(s.to_string()))
    }
}

/// Precomputed role assignment for a unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoleProfile {
    pub primary: UnitRole,
    pub secondary: Option<UnitRole>,
    /// Preferred distance to the nearest enemy for standoff roles
    pub optimal_range: Option<f32>,
    /// Distance in inches the unit can charge to next turn
    ///
    /// `None` uses movement plus the average charge roll.
    pub charge_threat: Option<f32>,
}

impl RoleProfile {
    pub fn new(primary: UnitRole) -> Self {
        Self {
            primary,
            secondary: None,
            optimal_range: None,
            charge_threat: None,
        }
    }

    pub fn with_secondary(mut self, secondary: UnitRole) -> Self {
        self.secondary = Some(secondary);
        self
    }

    pub fn with_optimal_range(mut self, range: f32) -> Self {
        self.optimal_range = Some(range.max(0.0));
        self
    }

    pub fn with_charge_threat(mut self, distance: f32) -> Self {
        self.charge_threat = Some(distance.max(0.0));
        self
    }

    pub fn traits(&self) -> RoleTraits {
        self.primary.traits()
    }

    /// Objective weighting, a quarter of it taken from the secondary role
    pub fn objective_multiplier(&self) -> f32 {
        let primary = self.primary.traits().objective_multiplier;
        match self.secondary {
            Some(secondary) => primary * 0.75 + secondary.traits().objective_multiplier * 0.25,
            None => primary,
        }
    }
}

impl Default for RoleProfile {
    fn default() -> Self {
        Self::new(UnitRole::Utility)
    }
}

/// Snapshot of one unit on the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitState {
    pub id: UnitId,
    pub name: String,
    pub position: Point,
    base_radius: f32,
    /// Movement characteristic in inches
    pub movement: f32,
    /// Longest weapon range in inches
    pub weapon_range: f32,
    pub objective_control: u32,
    pub models_remaining: u32,
    pub starting_models: u32,
    /// Wounds left on the current model
    pub wounds: u32,
    pub in_reserve: bool,
    pub is_infantry: bool,
    pub is_large_model: bool,
    /// Towering or flying, sees over obscuring terrain
    pub ignores_obscuring: bool,
    pub role: RoleProfile,
}

impl UnitState {
    /// Five-model infantry squad with common line-troop stats
    pub fn new(id: UnitId, name: impl Into<String>, position: Point) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            base_radius: 0.5,
            movement: 6.0,
            weapon_range: 24.0,
            objective_control: 2,
            models_remaining: 5,
            starting_models: 5,
            wounds: 1,
            in_reserve: false,
            is_infantry: true,
            is_large_model: false,
            ignores_obscuring: false,
            role: RoleProfile::default(),
        }
    }

    /// Single large model, not infantry
    pub fn vehicle(id: UnitId, name: impl Into<String>, position: Point) -> Self {
        Self {
            base_radius: 2.0,
            movement: 10.0,
            objective_control: 3,
            models_remaining: 1,
            starting_models: 1,
            wounds: 10,
            is_infantry: false,
            is_large_model: true,
            ..Self::new(id, name, position)
        }
    }

    pub fn with_role(mut self, role: RoleProfile) -> Self {
        self.role = role;
        self
    }

    pub fn with_movement(mut self, movement: f32) -> Self {
        self.movement = movement.max(0.0);
        self
    }

    pub fn with_weapon_range(mut self, range: f32) -> Self {
        self.weapon_range = range.max(0.0);
        self
    }

    pub fn with_base_radius(mut self, radius: f32) -> Self {
        self.base_radius = radius.max(0.0);
        self
    }

    pub fn with_objective_control(mut self, oc: u32) -> Self {
        self.objective_control = oc;
        self
    }

    pub fn with_models(mut self, remaining: u32, starting: u32) -> Self {
        self.models_remaining = remaining;
        self.starting_models = starting.max(remaining);
        self
    }

    pub fn in_reserve(mut self, in_reserve: bool) -> Self {
        self.in_reserve = in_reserve;
        self
    }

    pub fn ignoring_obscuring(mut self, ignores: bool) -> Self {
        self.ignores_obscuring = ignores;
        self
    }

    /// Base radius in inches, never negative
    pub fn base_radius(&self) -> f32 {
        self.base_radius.max(0.0)
    }

    pub fn is_alive(&self) -> bool {
        self.models_remaining > 0 && self.wounds > 0
    }

    /// Alive and on the table
    pub fn is_active(&self) -> bool {
        self.is_alive() && !self.in_reserve
    }

    pub fn strength_ratio(&self) -> f32 {
        if self.starting_models == 0 {
            0.0
        } else {
            self.models_remaining as f32 / self.starting_models as f32
        }
    }

    pub fn movement_profile(&self) -> MovementProfile {
        MovementProfile::new(self.is_infantry, self.is_large_model, self.base_radius())
    }

    /// How far this unit threatens on the charge
    pub fn charge_threat_distance(&self) -> f32 {
        self.role
            .charge_threat
            .unwrap_or(self.movement + CHARGE_REACH)
    }

    /// Distance from the edge of this unit's base to `point`
    pub fn edge_distance_to(&self, point: Point) -> f32 {
        (self.position.distance(point) - self.base_radius()).max(0.0)
    }
}

/// Snapshot of one side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmyState {
    pub id: ArmyId,
    pub name: String,
    pub units: Vec<UnitState>,
}

impl ArmyState {
    pub fn new(id: ArmyId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            units: Vec::new(),
        }
    }

    pub fn with_unit(mut self, unit: UnitState) -> Self {
        self.units.push(unit);
        self
    }

    pub fn unit(&self, id: UnitId) -> Option<&UnitState> {
        self.units.iter().find(|u| u.id == id)
    }

    /// Living units that are on the table
    pub fn active_units(&self) -> impl Iterator<Item = &UnitState> {
        self.units.iter().filter(|u| u.is_active())
    }

    pub fn is_destroyed(&self) -> bool {
        !self.units.iter().any(|u| u.is_alive())
    }
}

/// Copy of `army` with every planned destination written in
///
/// Units without a planned move keep their position.
pub fn apply_planned_movements(army: &ArmyState, moves: &[PlannedMovement]) -> ArmyState {
    let mut next = army.clone();
    for planned in moves {
        if let Some(unit) = next.units.iter_mut().find(|u| u.id == planned.unit_id) {
            unit.position = planned.destination;
        }
    }
    next
}
