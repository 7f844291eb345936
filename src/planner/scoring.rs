//! Tactical score for a candidate move
//!
//! The score is a weighted sum of independent terms. Each term is reported in
//! a `ScoreBreakdown` so planner decisions can be explained in logs and the
//! runner output.

use serde::{Deserialize, Serialize};

use crate::army::objectives::{ObjectiveMarker, ObjectivePriority, OBJECTIVE_CONTROL_RANGE};
use crate::army::units::{ArmyState, Engagement, UnitState};
use crate::core::types::Point;
use crate::planner::candidates::MovementCandidate;
use crate::planner::constants::{
    CHARGE_EXPOSED_PENALTY_MULTIPLIER, CLOSE_RANGE_PENALTY_MULTIPLIER, CLOSE_ROLE_SCALE,
    CLOSING_BONUS_RATE, COVER_SCALE, DEFAULT_OPTIMAL_RANGE, ENEMY_HELD_MULTIPLIER,
    HEAVY_COVER_MULTIPLIER, LOS_SAMPLE_ENEMIES, LOS_SCALE, MIN_MOVE_DISTANCE, MOVE_BONUS,
    OBJECTIVE_HOLD_BONUS, OBJECTIVE_SCORE_SCALE, OWN_HELD_MULTIPLIER, PRIMARY_OBJECTIVE_MULTIPLIER,
    SECONDARY_OBJECTIVE_MULTIPLIER, STANDOFF_ROLE_SCALE, THREAT_SCALE,
};
use crate::planner::threat::ThreatMap;
use crate::planner::weights::PlannerWeights;
use crate::terrain::cover::{cover_at_position, CoverLevel};
use crate::terrain::feature::TerrainFeature;
use crate::terrain::visibility::check_line_of_sight;

/// Everything a score depends on besides the unit and the candidate
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub army: &'a ArmyState,
    pub opponent: &'a ArmyState,
    pub objectives: &'a [ObjectiveMarker],
    pub terrain: &'a [TerrainFeature],
    pub threat_map: &'a ThreatMap,
    pub weights: &'a PlannerWeights,
}

/// Per-term contributions; `total` is their sum
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub objective: f32,
    pub closing: f32,
    pub role_bias: f32,
    /// Subtracted from the total
    pub threat: f32,
    /// Subtracted from the total
    pub movement_cost: f32,
    pub move_bonus: f32,
    pub cover: f32,
    pub line_of_sight: f32,
    pub total: f32,
}

fn priority_multiplier(priority: ObjectivePriority) -> f32 {
    match priority {
        ObjectivePriority::Primary => PRIMARY_OBJECTIVE_MULTIPLIER,
        ObjectivePriority::Secondary => SECONDARY_OBJECTIVE_MULTIPLIER,
    }
}

/// Objective pull toward the marker nearest `destination`
fn objective_term(ctx: &ScoringContext<'_>, unit: &UnitState, destination: Point) -> f32 {
    let nearest = ctx.objectives.iter().min_by(|a, b| {
        a.position
            .distance_squared(destination)
            .total_cmp(&b.position.distance_squared(destination))
    });
    let Some(objective) = nearest else {
        return 0.0;
    };

    let weight = ctx.weights.objective_value;
    let d = destination.distance(objective.position);
    let control = if objective.is_held_against(ctx.army.id) {
        ENEMY_HELD_MULTIPLIER
    } else if objective.is_controlled_by(ctx.army.id) {
        OWN_HELD_MULTIPLIER
    } else {
        1.0
    };
    let priority = priority_multiplier(objective.priority);
    let mut value =
        weight * OBJECTIVE_SCORE_SCALE / (1.0 + d) * priority * control * unit.role.objective_multiplier();
    if d - unit.base_radius() <= OBJECTIVE_CONTROL_RANGE {
        value += weight * OBJECTIVE_HOLD_BONUS * priority;
    }
    value
}

/// Reward for closing on the objective nearest the unit's current position
fn closing_term(ctx: &ScoringContext<'_>, unit: &UnitState, destination: Point) -> f32 {
    let nearest = ctx.objectives.iter().min_by(|a, b| {
        a.position
            .distance_squared(unit.position)
            .total_cmp(&b.position.distance_squared(unit.position))
    });
    let Some(objective) = nearest else {
        return 0.0;
    };
    let before = unit.position.distance(objective.position);
    let after = destination.distance(objective.position);
    (before - after).max(0.0) * CLOSING_BONUS_RATE * ctx.weights.objective_value
}

fn nearest_enemy_distance(ctx: &ScoringContext<'_>, point: Point) -> Option<f32> {
    ctx.opponent
        .active_units()
        .map(|enemy| enemy.position.distance(point))
        .min_by(|a, b| a.total_cmp(b))
}

/// Pull toward the distance the unit's role wants to fight at
fn role_term(ctx: &ScoringContext<'_>, unit: &UnitState, destination: Point) -> f32 {
    let Some(d) = nearest_enemy_distance(ctx, destination) else {
        return 0.0;
    };
    let bias = ctx.weights.damage_bias;
    match unit.role.traits().engagement {
        Engagement::Close => bias * CLOSE_ROLE_SCALE / (1.0 + d),
        Engagement::Standoff => {
            let optimal = unit
                .role
                .optimal_range
                .filter(|r| *r > 0.0)
                .unwrap_or(DEFAULT_OPTIMAL_RANGE);
            bias * STANDOFF_ROLE_SCALE * (1.0 - (d - optimal).abs() / optimal).max(0.0)
        }
        Engagement::Neutral => 0.0,
    }
}

fn threat_term(ctx: &ScoringContext<'_>, unit: &UnitState, destination: Point) -> f32 {
    // Holding units face the threat cached for their current position
    let level = if destination == unit.position {
        ctx.threat_map.for_unit_or_at(unit.id, destination)
    } else {
        ctx.threat_map.threat_at(destination)
    };
    let mut penalty = level.threat
        * THREAT_SCALE
        * ctx.weights.threat_penalty
        * unit.role.traits().threat_multiplier;
    if level.close_range {
        penalty *= CLOSE_RANGE_PENALTY_MULTIPLIER;
    }
    if level.charge_exposed {
        penalty *= CHARGE_EXPOSED_PENALTY_MULTIPLIER;
    }
    penalty
}

fn cover_term(ctx: &ScoringContext<'_>, destination: Point) -> f32 {
    let base = ctx.weights.cover_bonus * COVER_SCALE;
    match cover_at_position(destination, ctx.terrain) {
        CoverLevel::None => 0.0,
        CoverLevel::Light => base,
        CoverLevel::Heavy => base * HEAVY_COVER_MULTIPLIER,
    }
}

/// Share of the nearest few enemies visible from `destination`
fn los_term(ctx: &ScoringContext<'_>, unit: &UnitState, destination: Point) -> f32 {
    let mut enemies: Vec<(f32, &UnitState)> = ctx
        .opponent
        .active_units()
        .map(|enemy| (enemy.position.distance(destination), enemy))
        .collect();
    if enemies.is_empty() {
        return 0.0;
    }
    enemies.sort_by(|a, b| a.0.total_cmp(&b.0));
    let visible = enemies
        .iter()
        .take(LOS_SAMPLE_ENEMIES)
        .filter(|(_, enemy)| {
            check_line_of_sight(
                destination,
                enemy.position,
                ctx.terrain,
                unit.ignores_obscuring,
                enemy.ignores_obscuring,
            )
            .visible
        })
        .count();
    ctx.weights.los_bonus * LOS_SCALE * visible as f32 / LOS_SAMPLE_ENEMIES as f32
}

/// Score one candidate with every term broken out
pub fn score_breakdown(
    ctx: &ScoringContext<'_>,
    unit: &UnitState,
    candidate: &MovementCandidate,
) -> ScoreBreakdown {
    let destination = candidate.destination;
    let mut breakdown = ScoreBreakdown {
        objective: objective_term(ctx, unit, destination),
        closing: closing_term(ctx, unit, destination),
        role_bias: role_term(ctx, unit, destination),
        threat: threat_term(ctx, unit, destination),
        movement_cost: candidate.distance * ctx.weights.distance_penalty,
        move_bonus: if candidate.distance > MIN_MOVE_DISTANCE {
            MOVE_BONUS
        } else {
            0.0
        },
        ..Default::default()
    };

    if !ctx.terrain.is_empty() {
        breakdown.cover = cover_term(ctx, destination);
        breakdown.line_of_sight = los_term(ctx, unit, destination);
    }

    breakdown.total = breakdown.objective + breakdown.closing + breakdown.role_bias
        - breakdown.threat
        - breakdown.movement_cost
        + breakdown.move_bonus
        + breakdown.cover
        + breakdown.line_of_sight;
    breakdown
}

pub fn score_candidate(ctx: &ScoringContext<'_>, unit: &UnitState, candidate: &MovementCandidate) -> f32 {
    score_breakdown(ctx, unit, candidate).total
}
