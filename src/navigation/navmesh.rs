//! Waypoint graph routed around blocking terrain
//!
//! Waypoints sit just outside the corners of every mesh-blocking feature and
//! along the long table edges. Two waypoints are linked when the straight
//! line between them stays clear of every blocking feature grown by the
//! clearance margin.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::{BoundingBox, Point};
use crate::terrain::constants::{NAV_CORNER_MARGIN, NAV_EDGE_INSET, NAV_EDGE_SPACING, NAV_MAX_EDGE_LENGTH};
use crate::terrain::blocking::MovementProfile;
use crate::terrain::feature::TerrainFeature;
use crate::terrain::geometry::{line_intersects_terrain, point_in_terrain};

/// Terrain traits a mesh can be told to route straight through
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavTrait {
    Breachable,
    Scalable,
}

impl NavTrait {
    fn present_on(&self, feature: &TerrainFeature) -> bool {
        match self {
            NavTrait::Breachable => feature.traits().breachable,
            NavTrait::Scalable => feature.traits().scalable,
        }
    }
}

/// Link to another waypoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavEdge {
    /// Index of the neighbouring waypoint
    pub to: usize,
    pub distance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavWaypoint {
    /// Index into the owning mesh
    pub id: usize,
    pub position: Point,
    pub edges: Vec<NavEdge>,
    /// Corner of a terrain feature (false for table-edge waypoints)
    pub from_terrain: bool,
}

/// Immutable waypoint graph for one terrain snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavMesh {
    waypoints: Vec<NavWaypoint>,
    bounds: BoundingBox,
    clearance: f32,
    ignored: Vec<NavTrait>,
    /// Mesh-blocking features grown by the clearance
    obstacles: Vec<TerrainFeature>,
    /// Layout the mesh was built from
    terrain: Vec<TerrainFeature>,
}

impl NavMesh {
    /// Build the mesh for `terrain` within `bounds`
    ///
    /// Features carrying any trait in `ignored` never block the mesh.
    pub fn build(
        terrain: &[TerrainFeature],
        bounds: BoundingBox,
        clearance: f32,
        ignored: &[NavTrait],
    ) -> Self {
        let clearance = clearance.max(0.0);
        let mut ignored = ignored.to_vec();
        ignored.sort();
        ignored.dedup();

        let blocking: Vec<&TerrainFeature> = terrain
            .iter()
            .filter(|f| is_mesh_blocking(f, &ignored))
            .collect();

        let mut mesh = Self {
            waypoints: Vec::new(),
            bounds,
            clearance,
            ignored,
            obstacles: blocking.iter().map(|f| f.inflated(clearance)).collect(),
            terrain: terrain.to_vec(),
        };

        let offset = clearance + NAV_CORNER_MARGIN;
        for (i, feature) in blocking.iter().enumerate() {
            for corner in feature.bounding_box().expanded(offset).corners() {
                let inside_other = blocking
                    .iter()
                    .enumerate()
                    .any(|(j, other)| j != i && point_in_terrain(corner, other));
                if bounds.contains(corner) && !inside_other {
                    mesh.push_waypoint(corner, true);
                }
            }
        }

        for position in edge_positions(&bounds) {
            if !blocking.iter().any(|f| point_in_terrain(position, f)) {
                mesh.push_waypoint(position, false);
            }
        }

        mesh.link_waypoints();

        debug!(
            waypoints = mesh.waypoints.len(),
            edges = mesh.edge_count(),
            obstacles = mesh.obstacles.len(),
            clearance,
            "navmesh built"
        );
        mesh
    }

    fn push_waypoint(&mut self, position: Point, from_terrain: bool) {
        let id = self.waypoints.len();
        self.waypoints.push(NavWaypoint {
            id,
            position,
            edges: Vec::new(),
            from_terrain,
        });
    }

    fn link_waypoints(&mut self) {
        let n = self.waypoints.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let a = self.waypoints[i].position;
                let b = self.waypoints[j].position;
                let distance = a.distance(b);
                if distance > NAV_MAX_EDGE_LENGTH || !self.is_segment_clear(a, b) {
                    continue;
                }
                self.waypoints[i].edges.push(NavEdge { to: j, distance });
                self.waypoints[j].edges.push(NavEdge { to: i, distance });
            }
        }
    }

    /// Does the segment stay clear of every clearance-grown obstacle?
    pub fn is_segment_clear(&self, from: Point, to: Point) -> bool {
        !self
            .obstacles
            .iter()
            .any(|obstacle| line_intersects_terrain(from, to, obstacle))
    }

    pub fn waypoints(&self) -> &[NavWaypoint] {
        &self.waypoints
    }

    pub fn waypoint(&self, id: usize) -> Option<&NavWaypoint> {
        self.waypoints.get(id)
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Undirected edge count
    pub fn edge_count(&self) -> usize {
        self.waypoints.iter().map(|wp| wp.edges.len()).sum::<usize>() / 2
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn clearance(&self) -> f32 {
        self.clearance
    }

    pub fn ignored_traits(&self) -> &[NavTrait] {
        &self.ignored
    }

    pub fn source_terrain(&self) -> &[TerrainFeature] {
        &self.terrain
    }

    /// False once the layout has changed since the mesh was built
    pub fn is_built_from(&self, terrain: &[TerrainFeature]) -> bool {
        self.terrain.as_slice() == terrain
    }

    /// Waypoint indices ordered by distance from `point`, ties by index
    pub fn waypoints_by_distance(&self, point: Point) -> Vec<usize> {
        let mut order: Vec<(usize, f32)> = self
            .waypoints
            .iter()
            .map(|wp| (wp.id, wp.position.distance_squared(point)))
            .collect();
        order.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        order.into_iter().map(|(id, _)| id).collect()
    }
}

/// Impassable or obscuring, unless exempted by an ignored trait
pub fn is_mesh_blocking(feature: &TerrainFeature, ignored: &[NavTrait]) -> bool {
    let blocks = feature.is_impassable() || feature.traits().obscuring;
    blocks && !ignored.iter().any(|t| t.present_on(feature))
}

fn edge_positions(bounds: &BoundingBox) -> Vec<Point> {
    let mut positions = Vec::new();
    let top = bounds.max_y - NAV_EDGE_INSET;
    let bottom = bounds.min_y + NAV_EDGE_INSET;
    if top < bottom {
        return positions;
    }
    let mut x = bounds.min_x + NAV_EDGE_SPACING / 2.0;
    while x < bounds.max_x {
        positions.push(Point::new(x, bottom));
        if top > bottom {
            positions.push(Point::new(x, top));
        }
        x += NAV_EDGE_SPACING;
    }
    positions
}

/// Meshes for the two movement classes, built once per terrain layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavMeshSet {
    /// Routes through breachable terrain
    pub infantry: NavMesh,
    pub default: NavMesh,
}

impl NavMeshSet {
    pub fn build(terrain: &[TerrainFeature], bounds: BoundingBox, clearance: f32) -> Self {
        Self {
            infantry: NavMesh::build(terrain, bounds, clearance, &[NavTrait::Breachable]),
            default: NavMesh::build(terrain, bounds, clearance, &[]),
        }
    }

    pub fn is_built_from(&self, terrain: &[TerrainFeature]) -> bool {
        self.infantry.is_built_from(terrain) && self.default.is_built_from(terrain)
    }

    pub fn for_profile(&self, profile: &MovementProfile) -> &NavMesh {
        if profile.is_infantry {
            &self.infantry
        } else {
            &self.default
        }
    }
}
