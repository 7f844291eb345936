//! Planner constants - all scoring and search tunables in one place
//!
//! Distances are in inches. Scores are unitless; only their relative size
//! matters.

// Search
pub const DEFAULT_BEAM_WIDTH: usize = 8;
pub const ADVANCE_EXPECTED_ROLL: f32 = 3.5; // Average of a D6 advance

// Threat estimate
pub const CLOSE_RANGE: f32 = 6.0;
pub const CLOSE_RANGE_THREAT_MULTIPLIER: f32 = 1.2;
pub const CHARGE_REACH: f32 = 7.0; // Added to enemy movement

// Objective scoring
pub const OBJECTIVE_SCORE_SCALE: f32 = 10.0;
pub const PRIMARY_OBJECTIVE_MULTIPLIER: f32 = 1.5;
pub const SECONDARY_OBJECTIVE_MULTIPLIER: f32 = 1.0;
pub const ENEMY_HELD_MULTIPLIER: f32 = 1.3;
pub const OWN_HELD_MULTIPLIER: f32 = 0.6;
pub const OBJECTIVE_HOLD_BONUS: f32 = 4.0;
pub const CLOSING_BONUS_RATE: f32 = 0.5;

// Role distance bias
pub const CLOSE_ROLE_SCALE: f32 = 8.0;
pub const STANDOFF_ROLE_SCALE: f32 = 5.0;
pub const DEFAULT_OPTIMAL_RANGE: f32 = 18.0;

// Threat penalty
pub const THREAT_SCALE: f32 = 4.0;
pub const CLOSE_RANGE_PENALTY_MULTIPLIER: f32 = 1.5;
pub const CHARGE_EXPOSED_PENALTY_MULTIPLIER: f32 = 1.25;

// Movement
pub const MOVE_BONUS: f32 = 0.25;
pub const MIN_MOVE_DISTANCE: f32 = 0.01; // Below this a move counts as holding

// Terrain scoring
pub const COVER_SCALE: f32 = 2.0;
pub const HEAVY_COVER_MULTIPLIER: f32 = 1.5;
pub const LOS_SCALE: f32 = 2.0;
pub const LOS_SAMPLE_ENEMIES: usize = 3;

// Candidate generation
pub const SEEK_COVER_RANGE_FACTOR: f32 = 2.5; // Times the move allowance
pub const MAX_WAYPOINT_CANDIDATES: usize = 4;
pub const WAYPOINT_DEDUP_DISTANCE: f32 = 2.0;

// Joint assignment
pub const OVERLAP_PENALTY: f32 = 5.0;
pub const OVERLAP_MARGIN: f32 = 1.0; // Added to the sum of base radii

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objective_priority_ordering() {
        assert!(PRIMARY_OBJECTIVE_MULTIPLIER > SECONDARY_OBJECTIVE_MULTIPLIER);
        assert!(ENEMY_HELD_MULTIPLIER > 1.0);
        assert!(OWN_HELD_MULTIPLIER < 1.0);
    }

    #[test]
    fn test_threat_multipliers_escalate() {
        assert!(CLOSE_RANGE_PENALTY_MULTIPLIER > CHARGE_EXPOSED_PENALTY_MULTIPLIER);
        assert!(CHARGE_EXPOSED_PENALTY_MULTIPLIER > 1.0);
    }

    #[test]
    fn test_beam_width_nonzero() {
        assert!(DEFAULT_BEAM_WIDTH > 0);
    }
}
