//! Choosing one candidate per unit
//!
//! Greedy selection takes each unit's best candidate on its own. Beam search
//! also charges for units ending on top of each other, keeping the best
//! `beam_width` partial assignments after each unit.

use ahash::AHashMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::army::units::UnitState;
use crate::core::types::{Point, UnitId};
use crate::planner::candidates::MovementCandidate;
use crate::planner::constants::{OVERLAP_MARGIN, OVERLAP_PENALTY};

/// Candidates for one unit with their individual scores
#[derive(Debug, Clone)]
pub struct UnitOptions {
    pub unit_id: UnitId,
    pub base_radius: f32,
    pub candidates: Vec<MovementCandidate>,
    pub scores: Vec<f32>,
}

impl UnitOptions {
    /// Index of the highest score, earliest on ties
    pub fn best_index(&self) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, &score) in self.scores.iter().enumerate() {
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((i, score));
            }
        }
        best.map(|(i, _)| i)
    }

    fn destination(&self, index: usize) -> Point {
        self.candidates[index].destination
    }
}

/// One unit's pick inside a beam state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub candidate_index: usize,
    pub destination: Point,
    pub base_radius: f32,
}

/// Partial joint assignment
#[derive(Debug, Clone, Default)]
pub struct BeamState {
    pub assignments: AHashMap<UnitId, Assignment>,
    pub score: f32,
}

impl BeamState {
    /// Overlap penalty for adding `candidate` against what is already placed
    fn overlap_penalty(&self, candidate: &Assignment) -> f32 {
        self.assignments
            .values()
            .filter(|placed| overlaps(placed, candidate))
            .count() as f32
            * OVERLAP_PENALTY
    }
}

fn overlaps(a: &Assignment, b: &Assignment) -> bool {
    a.destination.distance(b.destination) < a.base_radius + b.base_radius + OVERLAP_MARGIN
}

/// Order units so close-combat roles move first, then fast movers
///
/// Stable, so equal priorities keep their army order.
pub fn order_units<'a>(units: impl IntoIterator<Item = &'a UnitState>) -> Vec<&'a UnitState> {
    let mut ordered: Vec<&UnitState> = units.into_iter().collect();
    ordered.sort_by_key(|u| u.role.traits().order_priority);
    ordered
}

/// Best individual candidate per unit
pub fn select_greedy(options: &[UnitOptions]) -> Vec<Option<usize>> {
    options.iter().map(UnitOptions::best_index).collect()
}

/// Joint score of a full assignment: individual scores less overlap penalties
pub fn joint_score(options: &[UnitOptions], choice: &[Option<usize>]) -> f32 {
    let mut state = BeamState::default();
    for (unit, pick) in options.iter().zip(choice) {
        let Some(index) = *pick else {
            continue;
        };
        let assignment = Assignment {
            candidate_index: index,
            destination: unit.destination(index),
            base_radius: unit.base_radius,
        };
        state.score += unit.scores[index] - state.overlap_penalty(&assignment);
        state.assignments.insert(unit.unit_id, assignment);
    }
    state.score
}

/// Beam search over joint assignments
///
/// Never returns something the joint scorer rates below the greedy pick.
pub fn select_beam(options: &[UnitOptions], beam_width: usize) -> Vec<Option<usize>> {
    let width = beam_width.max(1);
    let mut beam = vec![BeamState::default()];

    for unit in options {
        if unit.candidates.is_empty() {
            continue;
        }
        let mut expanded = Vec::with_capacity(beam.len() * unit.candidates.len());
        for state in &beam {
            for (index, score) in unit.scores.iter().enumerate() {
                let assignment = Assignment {
                    candidate_index: index,
                    destination: unit.destination(index),
                    base_radius: unit.base_radius,
                };
                let mut next = state.clone();
                next.score += score - state.overlap_penalty(&assignment);
                next.assignments.insert(unit.unit_id, assignment);
                expanded.push(next);
            }
        }
        expanded.sort_by_key(|s| std::cmp::Reverse(OrderedFloat(s.score)));
        expanded.truncate(width);
        beam = expanded;
    }

    let beam_choice: Vec<Option<usize>> = match beam.first() {
        Some(best) => options
            .iter()
            .map(|u| best.assignments.get(&u.unit_id).map(|a| a.candidate_index))
            .collect(),
        None => vec![None; options.len()],
    };

    let greedy_choice = select_greedy(options);
    let beam_score = joint_score(options, &beam_choice);
    let greedy_score = joint_score(options, &greedy_choice);
    debug!(beam_score, greedy_score, width, "beam search finished");
    if greedy_score > beam_score {
        greedy_choice
    } else {
        beam_choice
    }
}
