//! Confidence-bounded planning agent
//!
//! Each decision runs an A* search over a grid laid on the course
//! interior. A first round only accepts hops whose plausible outcomes
//! stay on the course at high confidence; every failed round lowers the
//! confidence and searches again, until a path is found or the schedule
//! runs out.

mod normal;
mod reach;
mod search;

pub use normal::standard_normal_ppf;
pub use reach::ReachModel;

use std::sync::Arc;

use rand_chacha::ChaCha8Rng;

use super::{Agent, AgentError, AgentFactory, DecisionRequest};
use crate::core::config::{GameConfig, PlannerConfig};
use crate::core::types::Position;
use crate::course::Course;
use crate::geometry::rasterize_interior;
use crate::shot::ShotRequest;
use search::SearchSpace;

/// Grid for one course, built on first use
#[derive(Debug)]
struct CourseGrid {
    course: Arc<Course>,
    points: Vec<Position>,
}

pub struct PlannerAgent {
    config: PlannerConfig,
    reach: ReachModel,
    grid: Option<CourseGrid>,
    /// Origin and request of the previous decision
    last: Option<(Position, ShotRequest)>,
}

impl PlannerAgent {
    pub fn new(skill: u32, max_distance: f64, config: PlannerConfig) -> Self {
        Self {
            reach: ReachModel::new(skill, max_distance, &config),
            config,
            grid: None,
            last: None,
        }
    }

    /// Number of cached grid points, zero before the first decision
    pub fn grid_len(&self) -> usize {
        self.grid.as_ref().map_or(0, |g| g.points.len())
    }

    fn ensure_grid(&mut self, course: &Arc<Course>) {
        let stale = self
            .grid
            .as_ref()
            .map_or(true, |g| !Arc::ptr_eq(&g.course, course));
        if stale {
            let points = rasterize_interior(course.polygon(), self.config.grid_step);
            tracing::debug!("Planner grid built: {} points", points.len());
            self.grid = Some(CourseGrid {
                course: Arc::clone(course),
                points,
            });
        }
    }

    /// Next point to aim at, lowering confidence round by round
    fn plan(&mut self, request: &DecisionRequest) -> Result<Position, AgentError> {
        self.ensure_grid(&request.course);
        let Some(grid) = self.grid.as_ref() else {
            return Err(AgentError::NoAction);
        };

        let mut floor = self.config.start_confidence;
        for confidence in self.config.confidence_schedule() {
            if request.cancel.is_cancelled() {
                return Err(AgentError::Cancelled);
            }
            floor = confidence;

            let mut space = SearchSpace {
                grid: &grid.points,
                goal: request.target(),
                course: grid.course.polygon(),
                reach: &mut self.reach,
                goal_tolerance: self.config.goal_tolerance,
            };
            if let Some(point) = space.next_target(request.current, confidence, &request.cancel)? {
                tracing::debug!(
                    "Path found at confidence {:.2}, next point ({:.2}, {:.2})",
                    confidence,
                    point.x,
                    point.y
                );
                return Ok(point);
            }
            tracing::debug!("No safe path at confidence {:.2}", confidence);
        }

        Err(AgentError::PlanningExhausted { floor })
    }
}

impl Agent for PlannerAgent {
    fn decide(&mut self, request: &DecisionRequest) -> Result<ShotRequest, AgentError> {
        // The previous shot left the ball where it was: try it again
        if let Some((origin, shot)) = self.last {
            if origin == request.current {
                return Ok(shot);
            }
        }

        let point = self.plan(request)?;
        let mut shot = ShotRequest::toward(request.current, point);
        if point == request.target()
            && shot.distance > 0.0
            && shot.distance * self.config.overshoot_factor <= self.config.overshoot_cap
        {
            shot.distance *= self.config.overshoot_factor;
        }

        self.last = Some((request.current, shot));
        Ok(shot)
    }
}

#[derive(Debug, Clone)]
pub struct PlannerFactory {
    max_distance: f64,
    config: PlannerConfig,
}

impl PlannerFactory {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            max_distance: config.max_distance,
            config: config.planner.clone(),
        }
    }
}

impl AgentFactory for PlannerFactory {
    fn name(&self) -> &str {
        "planner"
    }

    fn create(&self, skill: u32, _rng: ChaCha8Rng) -> Box<dyn Agent> {
        Box::new(PlannerAgent::new(skill, self.max_distance, self.config.clone()))
    }
}
