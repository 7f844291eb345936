//! A* route search over the navigation mesh
//!
//! Routes are validated against the moving unit's base, not just the mesh
//! clearance, so a returned path is walkable for the unit that asked for it.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::types::{Point, TerrainId};
use crate::navigation::navmesh::NavMesh;
use crate::terrain::blocking::{
    get_movement_penalty, is_movement_blocked, is_position_blocked_by_terrain, terrain_crossed,
    MovementProfile,
};
use crate::terrain::constants::{GEOMETRY_EPSILON, PATH_ENDPOINT_WAYPOINTS};
use crate::terrain::feature::TerrainFeature;
use crate::terrain::geometry::lerp_point;

/// Step used when backing a truncated move off blocking terrain
pub const BACKOFF_STEP: f32 = 0.5;

/// Route between two points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    pub found: bool,
    /// Polyline from start to goal, endpoints always included
    pub points: Vec<Point>,
    /// Geometric length plus difficult-ground penalty
    pub distance: f32,
    pub terrain_crossed: Vec<TerrainId>,
    pub movement_penalty: f32,
}

impl PathResult {
    fn unreachable(from: Point, to: Point) -> Self {
        Self {
            found: false,
            points: vec![from, to],
            distance: from.distance(to),
            terrain_crossed: Vec::new(),
            movement_penalty: 0.0,
        }
    }

    fn from_points(points: Vec<Point>, terrain: &[TerrainFeature]) -> Self {
        let mut crossed = Vec::new();
        let mut seen = AHashSet::new();
        let mut penalty = 0.0;
        for leg in points.windows(2) {
            penalty += get_movement_penalty(leg[0], leg[1], terrain);
            for id in terrain_crossed(leg[0], leg[1], terrain) {
                if seen.insert(id) {
                    crossed.push(id);
                }
            }
        }
        Self {
            found: true,
            distance: polyline_length(&points) + penalty,
            points,
            terrain_crossed: crossed,
            movement_penalty: penalty,
        }
    }

    /// Length of the polyline without terrain penalties
    pub fn geometric_length(&self) -> f32 {
        polyline_length(&self.points)
    }
}

pub fn polyline_length(points: &[Point]) -> f32 {
    points.windows(2).map(|leg| leg[0].distance(leg[1])).sum()
}

/// Node in the A* open set
#[derive(Debug, Clone, Copy)]
struct PathNode {
    index: usize,
    f_cost: f32, // g_cost + heuristic
    seq: u64,
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PathNode {}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap, earlier pushes win ties
        other
            .f_cost
            .total_cmp(&self.f_cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Per-query search state shared by every start/end pair
struct RouteSearch<'a> {
    mesh: &'a NavMesh,
    terrain: &'a [TerrainFeature],
    profile: &'a MovementProfile,
    /// Edge costs re-validated for this unit; `None` when the base does not fit
    edge_costs: AHashMap<(usize, usize), Option<f32>>,
}

impl<'a> RouteSearch<'a> {
    fn new(mesh: &'a NavMesh, terrain: &'a [TerrainFeature], profile: &'a MovementProfile) -> Self {
        Self {
            mesh,
            terrain,
            profile,
            edge_costs: AHashMap::new(),
        }
    }

    fn position(&self, index: usize) -> Point {
        self.mesh.waypoints()[index].position
    }

    /// Length plus penalty, or `None` if the unit cannot walk the leg
    fn leg_cost(&self, from: Point, to: Point) -> Option<f32> {
        if is_movement_blocked(from, to, self.profile, self.terrain) {
            return None;
        }
        Some(from.distance(to) + get_movement_penalty(from, to, self.terrain))
    }

    fn edge_cost(&mut self, a: usize, b: usize) -> Option<f32> {
        let key = (a.min(b), a.max(b));
        if let Some(cost) = self.edge_costs.get(&key) {
            return *cost;
        }
        let cost = self.leg_cost(self.position(a), self.position(b));
        self.edge_costs.insert(key, cost);
        cost
    }

    /// Nearest waypoints the unit can stand on and reach straight from `point`
    fn endpoint_waypoints(&self, point: Point) -> Vec<(usize, f32)> {
        let mut found = Vec::new();
        for index in self.mesh.waypoints_by_distance(point) {
            if found.len() == PATH_ENDPOINT_WAYPOINTS {
                break;
            }
            let position = self.position(index);
            if is_position_blocked_by_terrain(position, self.profile, self.terrain) {
                continue;
            }
            if let Some(cost) = self.leg_cost(point, position) {
                found.push((index, cost));
            }
        }
        found
    }

    /// A* from `start` to `goal`, returning (cost, waypoint indices)
    fn search(&mut self, start: usize, goal: usize) -> Option<(f32, Vec<usize>)> {
        if start == goal {
            return Some((0.0, vec![start]));
        }

        let n = self.mesh.len();
        let goal_pos = self.position(goal);
        let mut open_set = BinaryHeap::new();
        let mut came_from: Vec<Option<usize>> = vec![None; n];
        let mut g_scores = vec![f32::INFINITY; n];
        let mut closed = vec![false; n];
        let mut seq = 0u64;

        g_scores[start] = 0.0;
        open_set.push(PathNode {
            index: start,
            f_cost: self.position(start).distance(goal_pos),
            seq,
        });

        while let Some(current) = open_set.pop() {
            if current.index == goal {
                return Some((g_scores[goal], reconstruct_path(&came_from, goal)));
            }
            if closed[current.index] {
                continue;
            }
            closed[current.index] = true;

            let current_g = g_scores[current.index];
            let neighbors: Vec<usize> = self.mesh.waypoints()[current.index]
                .edges
                .iter()
                .map(|e| e.to)
                .collect();

            for neighbor in neighbors {
                if closed[neighbor] {
                    continue;
                }
                let Some(cost) = self.edge_cost(current.index, neighbor) else {
                    continue;
                };
                let tentative_g = current_g + cost;
                if tentative_g < g_scores[neighbor] {
                    came_from[neighbor] = Some(current.index);
                    g_scores[neighbor] = tentative_g;
                    seq += 1;
                    open_set.push(PathNode {
                        index: neighbor,
                        f_cost: tentative_g + self.position(neighbor).distance(goal_pos),
                        seq,
                    });
                }
            }
        }

        None
    }
}

fn reconstruct_path(came_from: &[Option<usize>], mut current: usize) -> Vec<usize> {
    let mut path = vec![current];
    while let Some(prev) = came_from[current] {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Find a route for a unit with `profile` from `from` to `to`
///
/// Takes the straight line when the base fits. Otherwise tries every pairing
/// of the nearest usable waypoints at each end and keeps the cheapest route.
/// When nothing connects the result is not `found` and holds the straight
/// line with its plain Euclidean length.
pub fn find_path(
    from: Point,
    to: Point,
    mesh: &NavMesh,
    terrain: &[TerrainFeature],
    profile: &MovementProfile,
) -> PathResult {
    if !is_movement_blocked(from, to, profile, terrain) {
        return PathResult::from_points(vec![from, to], terrain);
    }

    let mut search = RouteSearch::new(mesh, terrain, profile);
    let starts = search.endpoint_waypoints(from);
    let ends = search.endpoint_waypoints(to);

    let mut best: Option<(f32, Vec<usize>)> = None;
    for &(start, start_cost) in &starts {
        for &(end, end_cost) in &ends {
            let Some((graph_cost, route)) = search.search(start, end) else {
                continue;
            };
            let total = start_cost + graph_cost + end_cost;
            if best.as_ref().map_or(true, |(b, _)| total < *b) {
                best = Some((total, route));
            }
        }
    }

    match best {
        Some((total, route)) => {
            let mut points = Vec::with_capacity(route.len() + 2);
            points.push(from);
            points.extend(route.iter().map(|&i| mesh.waypoints()[i].position));
            points.push(to);
            trace!(waypoints = route.len(), total, "route found");
            PathResult::from_points(points, terrain)
        }
        None => {
            debug!(
                from = ?from,
                to = ?to,
                starts = starts.len(),
                ends = ends.len(),
                "no route, falling back to straight line"
            );
            PathResult::unreachable(from, to)
        }
    }
}

/// Prefix of a route that fits within a movement budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPrefix {
    pub end: Point,
    pub points: Vec<Point>,
    /// Budget used, difficult-ground penalty included
    pub distance: f32,
}

/// Walk `points` until `budget` runs out
///
/// Each leg costs its length plus the difficult-ground penalty of that leg;
/// the penalty is paid up front when a leg is entered.
pub fn walk_path(points: &[Point], budget: f32, terrain: &[TerrainFeature]) -> PathPrefix {
    let Some(&first) = points.first() else {
        return PathPrefix {
            end: Point::ZERO,
            points: Vec::new(),
            distance: 0.0,
        };
    };

    let mut remaining = budget.max(0.0);
    let mut walked = vec![first];
    let mut used = 0.0;

    for leg in points.windows(2) {
        let (a, b) = (leg[0], leg[1]);
        let length = a.distance(b);
        let penalty = get_movement_penalty(a, b, terrain);
        if length + penalty <= remaining {
            remaining -= length + penalty;
            used += length + penalty;
            walked.push(b);
            continue;
        }
        let reach = remaining - penalty;
        if reach > GEOMETRY_EPSILON && length > GEOMETRY_EPSILON {
            walked.push(lerp_point(a, b, reach / length));
            used += remaining;
        }
        break;
    }

    PathPrefix {
        end: *walked.last().unwrap_or(&first),
        points: walked,
        distance: used,
    }
}

/// Pull the end of a walked prefix back until the unit's base fits
///
/// Steps back along the last leg; if the whole leg is unusable the leg is
/// dropped and the previous vertex becomes the end.
pub fn back_off_until_clear(
    mut prefix: PathPrefix,
    profile: &MovementProfile,
    terrain: &[TerrainFeature],
) -> PathPrefix {
    while prefix.points.len() >= 2 {
        let last = prefix.points.len() - 1;
        let anchor = prefix.points[last - 1];
        let mut end = prefix.points[last];
        let mut length = anchor.distance(end);

        loop {
            let blocked = is_movement_blocked(anchor, end, profile, terrain)
                || is_position_blocked_by_terrain(end, profile, terrain);
            if !blocked {
                prefix.points[last] = end;
                prefix.end = end;
                prefix.distance = polyline_length(&prefix.points)
                    + prefix
                        .points
                        .windows(2)
                        .map(|leg| get_movement_penalty(leg[0], leg[1], terrain))
                        .sum::<f32>();
                return prefix;
            }
            if length <= BACKOFF_STEP {
                break;
            }
            let next = length - BACKOFF_STEP;
            end = lerp_point(anchor, end, next / length);
            length = next;
        }

        prefix.points.pop();
    }

    if let Some(&start) = prefix.points.first() {
        prefix.end = start;
    }
    prefix.distance = 0.0;
    prefix
}
