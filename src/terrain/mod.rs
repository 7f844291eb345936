//! Battlefield terrain
//!
//! Terrain features, the geometry queries over them, and the policy that
//! decides what blocks movement, grants cover and blocks sight.

pub mod blocking;
pub mod constants;
pub mod cover;
pub mod feature;
pub mod geometry;
pub mod layouts;
pub mod visibility;

pub use blocking::{
    get_movement_penalty, is_movement_blocked, is_position_blocked_by_terrain,
    is_terrain_blocking_for_unit, terrain_crossed, MovementProfile,
};
pub use cover::{cover_at_position, get_terrain_cover, CoverLevel, TerrainCover};
pub use feature::{TerrainFeature, TerrainKind, TerrainShape, TerrainTraits};
pub use geometry::{line_intersects_terrain, point_in_terrain};
pub use layouts::{TerrainLayout, TerrainPreset};
pub use visibility::{check_line_of_sight, has_line_of_sight, LineOfSight};
