//! Terrain and navigation constants - all tunable values in one place
//!
//! Distances are in inches. Penalties are ADDITIVE, never multiplicative.

// Board scale (standard strike-force table)
pub const BOARD_WIDTH: f32 = 60.0;
pub const BOARD_HEIGHT: f32 = 44.0;

// Movement
pub const DIFFICULT_GROUND_PENALTY: f32 = 2.0; // Per crossed piece, stacks

// Navigation mesh
pub const DEFAULT_NAV_CLEARANCE: f32 = 1.0; // Roughly a 50mm base radius
pub const NAV_CORNER_MARGIN: f32 = 0.5; // Extra offset past clearance for corner waypoints
pub const NAV_EDGE_SPACING: f32 = 12.0; // Gap between map-edge waypoints
pub const NAV_EDGE_INSET: f32 = 1.0; // Distance of edge waypoints from the table edge
pub const NAV_MAX_EDGE_LENGTH: f32 = 30.0; // Caps graph density, not a rules limit

// Path search
pub const PATH_ENDPOINT_WAYPOINTS: usize = 3; // Nearest waypoints tried per endpoint

// Geometry tolerance
pub const GEOMETRY_EPSILON: f32 = 1e-6;
pub const SEGMENT_ENTRY_STEPS: u32 = 24; // Bisection steps when locating a segment's entry point

// Elevation granted by hills and other raised terrain
pub const HILL_ELEVATION: f32 = 2.0;
