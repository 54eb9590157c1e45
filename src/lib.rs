//! Arena Tactics - combat AI for arena shooters
//!
//! Occupancy grid and A* planning, per-archetype agent tactics, and a
//! squad coordinator for alerts, threat and formations.

pub mod core;
pub mod navigation;
pub mod simulation;
pub mod spatial;
pub mod squad;
pub mod tactics;
