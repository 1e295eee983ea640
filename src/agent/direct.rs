//! Baseline agent: always aims straight at the target

use rand_chacha::ChaCha8Rng;

use super::{Agent, AgentError, AgentFactory, DecisionRequest};
use crate::core::config::GameConfig;
use crate::shot::{ShotRequest, ShotRules};

/// Putts when close, otherwise carries so that carry plus roll lands on
/// the target, never longer than the legal full-shot range
#[derive(Debug, Clone)]
pub struct DirectAgent {
    skill: u32,
    rules: ShotRules,
}

impl DirectAgent {
    pub fn new(skill: u32, rules: ShotRules) -> Self {
        Self { skill, rules }
    }
}

impl Agent for DirectAgent {
    fn decide(&mut self, request: &DecisionRequest) -> Result<ShotRequest, AgentError> {
        let aim = ShotRequest::toward(request.current, request.target());
        if aim.distance < self.rules.min_putter_distance {
            return Ok(aim);
        }

        let carry = (aim.distance / (1.0 + self.rules.extra_roll / 2.0))
            .max(self.rules.min_putter_distance)
            .min(self.rules.max_full_shot(self.skill));
        Ok(ShotRequest::new(carry, aim.angle))
    }
}

#[derive(Debug, Clone)]
pub struct DirectFactory {
    rules: ShotRules,
}

impl DirectFactory {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            rules: ShotRules::from(config),
        }
    }
}

impl AgentFactory for DirectFactory {
    fn name(&self) -> &str {
        "direct"
    }

    fn create(&self, skill: u32, _rng: ChaCha8Rng) -> Box<dyn Agent> {
        Box::new(DirectAgent::new(skill, self.rules))
    }
}
