//! Shot-selection agents
//!
//! The engine only ever talks to an agent through [`Agent::decide`]. Each
//! agent owns its private state (caches, forked generator) and is moved
//! onto a worker thread for the duration of a timed decision, hence the
//! `Send` bound.

pub mod direct;
pub mod planner;

pub use direct::{DirectAgent, DirectFactory};
pub use planner::{PlannerAgent, PlannerFactory};

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::core::config::GameConfig;
use crate::core::error::FairwayError;
use crate::core::types::Position;
use crate::course::Course;
use crate::shot::ShotRequest;

/// Shared flag raised by the engine when a decision overruns its budget
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Everything an agent may look at when choosing its next shot
#[derive(Debug, Clone)]
pub struct DecisionRequest {
    pub course: Arc<Course>,
    pub current: Position,
    /// 1-based attempt number of the shot being decided
    pub attempt: u32,
    /// Long computations should poll this and bail out with `Cancelled`
    pub cancel: CancelToken,
}

impl DecisionRequest {
    pub fn target(&self) -> Position {
        self.course.target()
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    #[error("agent produced no action")]
    NoAction,

    #[error("no safe path found down to confidence {floor:.2}")]
    PlanningExhausted { floor: f64 },

    #[error("decision cancelled")]
    Cancelled,

    #[error("agent fault: {0}")]
    Fault(String),
}

/// A player strategy
pub trait Agent: Send {
    /// Choose the next shot from `request.current`
    fn decide(&mut self, request: &DecisionRequest) -> Result<ShotRequest, AgentError>;
}

/// Builds one agent per registered player
pub trait AgentFactory: Send + Sync {
    /// Base name players of this kind are registered under
    fn name(&self) -> &str;

    /// `rng` is forked from the game generator at registration
    fn create(&self, skill: u32, rng: ChaCha8Rng) -> Box<dyn Agent>;
}

/// The built-in agents, as named on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Direct,
    Planner,
}

impl AgentKind {
    pub fn factory(&self, config: &GameConfig) -> Arc<dyn AgentFactory> {
        match self {
            AgentKind::Direct => Arc::new(DirectFactory::new(config)),
            AgentKind::Planner => Arc::new(PlannerFactory::new(config)),
        }
    }

    /// Parse a roster such as `["d", "g2", "d"]`
    pub fn parse_roster<S: AsRef<str>>(entries: &[S]) -> Result<Vec<AgentKind>, FairwayError> {
        entries.iter().map(|e| e.as_ref().parse()).collect()
    }
}

impl FromStr for AgentKind {
    type Err = FairwayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "d" | "direct" => Ok(AgentKind::Direct),
            "2" | "g2" | "planner" => Ok(AgentKind::Planner),
            other => Err(FairwayError::UnknownPlayer(other.to_string())),
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentKind::Direct => write!(f, "direct"),
            AgentKind::Planner => write!(f, "planner"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roster() {
        let kinds = AgentKind::parse_roster(&["d", "G2", "planner", "direct"]).unwrap();
        assert_eq!(
            kinds,
            vec![AgentKind::Direct, AgentKind::Planner, AgentKind::Planner, AgentKind::Direct]
        );
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result = AgentKind::parse_roster(&["d", "x9"]);
        assert!(matches!(result, Err(FairwayError::UnknownPlayer(name)) if name == "x9"));
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_factory_names() {
        let config = GameConfig::default();
        assert_eq!(AgentKind::Direct.factory(&config).name(), "direct");
        assert_eq!(AgentKind::Planner.factory(&config).name(), "planner");
    }
}
