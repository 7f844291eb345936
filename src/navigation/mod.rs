//! Navigation mesh and route search

pub mod navmesh;
pub mod pathfinding;

pub use navmesh::{is_mesh_blocking, NavEdge, NavMesh, NavMeshSet, NavTrait, NavWaypoint};
pub use pathfinding::{back_off_until_clear, find_path, walk_path, PathPrefix, PathResult};
