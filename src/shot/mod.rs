//! Shot model: requests, outcomes and the stochastic simulator

mod simulator;

pub use simulator::{simulate, ShotRules};

use serde::{Deserialize, Serialize};

use crate::core::types::{Position, Segment};

/// What an agent asks for: a carry distance and a heading in radians
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotRequest {
    pub distance: f64,
    pub angle: f64,
}

impl ShotRequest {
    pub fn new(distance: f64, angle: f64) -> Self {
        Self { distance, angle }
    }

    /// Request aimed from `from` straight at `to`
    pub fn toward(from: Position, to: Position) -> Self {
        Self {
            distance: from.distance(&to),
            angle: from.angle_to(&to),
        }
    }

    /// Both values are real numbers and the distance is not negative
    pub fn is_valid(&self) -> bool {
        self.distance.is_finite() && self.angle.is_finite() && self.distance >= 0.0
    }
}

/// How a request was interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotKind {
    /// Carry then extra roll along the same heading
    Full,
    /// Rolls from the current location, no air phase
    Putt,
    /// Outside the legal distance range; the ball does not move
    Void,
}

/// A resolved shot, as appended to a player's history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shot {
    pub requested: ShotRequest,
    pub actual_distance: f64,
    pub actual_angle: f64,
    pub kind: ShotKind,
    /// Current location to landing point
    pub air: Segment,
    /// Landing point to final point
    pub roll: Segment,
    pub final_point: Position,
    /// The roll segment stays inside the course
    pub admissible: bool,
    /// The roll passed within the target radius and the shot is admissible
    pub reached_target: bool,
}
