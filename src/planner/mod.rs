//! Movement planning for one side of the table
//!
//! Planning runs in four steps:
//! 1. Build the threat map of the opponent once
//! 2. Generate routed candidates for every active unit
//! 3. Score each candidate with the strategy's weights
//! 4. Pick one candidate per unit, greedily or with beam search
//!
//! Planning never fails. A unit with nothing better to do holds.

pub mod candidates;
pub mod constants;
pub mod scoring;
pub mod selection;
pub mod threat;
pub mod weights;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::army::objectives::ObjectiveMarker;
use crate::army::units::{ArmyState, UnitState};
use crate::core::config::PlannerConfig;
use crate::core::types::{Point, UnitId};
use crate::navigation::navmesh::NavMeshSet;
use crate::terrain::feature::TerrainFeature;

pub use candidates::{generate_candidates, CandidateContext, CandidateKind, MovementCandidate};
pub use scoring::{score_breakdown, score_candidate, ScoreBreakdown, ScoringContext};
pub use selection::{order_units, select_beam, select_greedy, BeamState, UnitOptions};
pub use threat::{build_threat_map, ThreatLevel, ThreatMap};
pub use weights::{load_strategy_weights, PlannerWeights, StrategyProfile};

/// The move chosen for one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedMovement {
    pub unit_id: UnitId,
    pub kind: CandidateKind,
    pub label: String,
    pub destination: Point,
    pub path: Vec<Point>,
    /// Distance travelled, difficult-ground penalty included
    pub distance: f32,
    /// Uses more than the unit's plain movement
    pub is_advance: bool,
    pub score: f32,
}

impl PlannedMovement {
    fn from_candidate(unit: &UnitState, candidate: &MovementCandidate, score: f32) -> Self {
        Self {
            unit_id: unit.id,
            kind: candidate.kind,
            label: candidate.label(),
            destination: candidate.destination,
            path: candidate.path.clone(),
            distance: candidate.distance,
            is_advance: candidate.distance > unit.movement + constants::MIN_MOVE_DISTANCE,
            score,
        }
    }

    /// Stay put; used when a unit has no candidates at all
    fn stay(unit: &UnitState) -> Self {
        Self::from_candidate(unit, &MovementCandidate::hold(unit.position), 0.0)
    }
}

/// Everything one planning call reads
#[derive(Debug, Clone, Copy)]
pub struct PlanningInput<'a> {
    pub army: &'a ArmyState,
    pub opponent: &'a ArmyState,
    pub objectives: &'a [ObjectiveMarker],
    pub terrain: &'a [TerrainFeature],
    pub meshes: &'a NavMeshSet,
}

/// Plan this turn's moves for `input.army`
///
/// Moves come back in planning order: close-combat roles first.
pub fn plan_movements(input: &PlanningInput<'_>, config: &PlannerConfig) -> Vec<PlannedMovement> {
    if !input.meshes.is_built_from(input.terrain) {
        warn!(features = input.terrain.len(), "navigation meshes were built for a different terrain layout");
    }
    let weights = config.effective_weights();
    let threat_map = build_threat_map(input.army, input.opponent);
    let scoring = ScoringContext {
        army: input.army,
        opponent: input.opponent,
        objectives: input.objectives,
        terrain: input.terrain,
        threat_map: &threat_map,
        weights: &weights,
    };
    let candidate_ctx = CandidateContext {
        terrain: input.terrain,
        meshes: input.meshes,
        objectives: input.objectives,
        battlefield: config.battlefield,
        allow_advance: config.allow_advance,
    };

    let units = order_units(input.army.active_units());
    let options: Vec<UnitOptions> = units
        .iter()
        .map(|unit| {
            let candidates = generate_candidates(unit, &candidate_ctx);
            let scores = candidates
                .iter()
                .map(|c| score_candidate(&scoring, unit, c))
                .collect();
            UnitOptions {
                unit_id: unit.id,
                base_radius: unit.base_radius(),
                candidates,
                scores,
            }
        })
        .collect();

    let choice = if config.use_beam_search {
        select_beam(&options, config.beam_width)
    } else {
        select_greedy(&options)
    };

    let moves: Vec<PlannedMovement> = units
        .iter()
        .zip(&options)
        .zip(choice)
        .map(|((unit, opts), pick)| match pick {
            Some(index) => PlannedMovement::from_candidate(unit, &opts.candidates[index], opts.scores[index]),
            None => PlannedMovement::stay(unit),
        })
        .collect();

    for planned in &moves {
        debug!(
            unit = planned.unit_id.0,
            label = %planned.label,
            score = planned.score,
            distance = planned.distance,
            "move planned"
        );
    }
    info!(
        army = %input.army.name,
        strategy = %config.strategy,
        beam = config.use_beam_search,
        units = moves.len(),
        "movement plan ready"
    );
    moves
}

/// Plan both sides against the same snapshot, in parallel
///
/// Neither plan sees the other's moves.
pub fn plan_simultaneous(
    first: &PlanningInput<'_>,
    second: &PlanningInput<'_>,
    config: &PlannerConfig,
) -> (Vec<PlannedMovement>, Vec<PlannedMovement>) {
    rayon::join(|| plan_movements(first, config), || plan_movements(second, config))
}
