//! Fairway - turn-based target-approach game on polygonal courses
//!
//! Players take stochastic shots toward a target from inside a simple
//! polygon; a shot that rolls out of the course leaves the ball where it
//! was. Agents choose shots, the engine resolves them with a single
//! seeded generator so every game can be replayed.

pub mod agent;
pub mod core;
pub mod course;
pub mod engine;
pub mod geometry;
pub mod shot;
