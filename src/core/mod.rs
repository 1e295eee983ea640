pub mod config;
pub mod error;
pub mod types;

pub use config::{GameConfig, PlannerConfig, VoidPolicy};
pub use error::{FairwayError, Result};
pub use types::{PlayerId, PlayerState, Position, Segment};
