//! Tactical Planner - movement planning for turn-based tabletop battles
//!
//! Terrain geometry, a waypoint navigation mesh with A* routing, threat
//! estimation and a greedy or beam-search planner that picks one move per
//! unit each turn.

pub mod army;
pub mod core;
pub mod navigation;
pub mod planner;
pub mod terrain;
