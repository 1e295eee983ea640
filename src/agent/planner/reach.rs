//! Skill-aware reachability and splash-zone predicates
//!
//! Both predicates are evaluated many thousands of times per search, at
//! a handful of distinct confidence levels, so the quantiles they need
//! are memoised per confidence for the lifetime of the agent.

use ahash::AHashMap;
use geo::Polygon;

use super::normal::standard_normal_ppf;
use crate::core::config::PlannerConfig;
use crate::core::types::{Position, Segment};
use crate::geometry::segment_in_polygon;

/// Per-agent model of how far and how straight its shots go
#[derive(Debug, Clone)]
pub struct ReachModel {
    skill: f64,
    /// Mean of the longest-shot distance distribution
    max_mean: f64,
    /// Spread of the longest-shot distance distribution
    max_std: f64,
    samples: usize,
    short_shot: f64,
    outer_scale: f64,
    /// confidence bits -> guaranteed reach
    limits: AHashMap<u64, f64>,
    /// confidence bits -> z-scores spanning [1 - c, c]
    spans: AHashMap<u64, Vec<f64>>,
}

impl ReachModel {
    pub fn new(skill: u32, max_distance: f64, config: &PlannerConfig) -> Self {
        let skill = skill.max(1) as f64;
        let max_mean = max_distance + skill;
        Self {
            skill,
            max_mean,
            max_std: max_mean / skill,
            samples: config.splash_samples.max(2),
            short_shot: config.splash_short_shot,
            outer_scale: config.splash_scale,
            limits: AHashMap::new(),
            spans: AHashMap::new(),
        }
    }

    /// Distance the agent's longest shot covers with probability `confidence`
    pub fn reach_limit(&mut self, confidence: f64) -> f64 {
        let (mean, std) = (self.max_mean, self.max_std);
        *self
            .limits
            .entry(confidence.to_bits())
            .or_insert_with(|| mean + std * standard_normal_ppf(1.0 - confidence))
    }

    /// True iff `to` is within guaranteed reach of `from`
    pub fn reachable(&mut self, from: Position, to: Position, confidence: f64) -> bool {
        within_reach(from, to, self.reach_limit(confidence))
    }

    /// Closed outline of the outcomes plausible at `confidence` for a
    /// shot aimed from `from` straight at `to`
    ///
    /// Outer arc first, then the inner arc walked back; the ring is
    /// implicitly closed.
    pub fn splash_zone(&mut self, from: Position, to: Position, confidence: f64) -> Vec<Position> {
        let distance = from.distance(&to);
        let angle = from.angle_to(&to);
        let skill = self.skill;
        let scale = if distance <= self.short_shot { 1.0 } else { self.outer_scale };
        let zs = self.span(confidence);

        let (Some(&z_first), Some(&z_last)) = (zs.first(), zs.last()) else {
            return vec![from];
        };
        let outer = (z_last * (distance / skill) + distance) * scale;
        let inner = z_first * (distance / skill) + distance;
        let angles = zs.iter().map(|z| z / (2.0 * skill) + angle);

        let mut ring: Vec<Position> = angles.clone().map(|a| from.travel(outer, a)).collect();
        ring.extend(angles.rev().map(|a| from.travel(inner, a)));
        ring
    }

    /// True iff the whole splash zone of the shot lies inside the course
    pub fn splash_zone_contained(
        &mut self,
        from: Position,
        to: Position,
        confidence: f64,
        course: &Polygon<f64>,
    ) -> bool {
        let ring = self.splash_zone(from, to, confidence);
        let n = ring.len();
        (0..n).all(|i| segment_in_polygon(&Segment::new(ring[i], ring[(i + 1) % n]), course))
    }

    /// z-scores at `samples` evenly spaced probabilities from 1 - c to c
    fn span(&mut self, confidence: f64) -> &[f64] {
        let samples = self.samples;
        self.spans.entry(confidence.to_bits()).or_insert_with(|| {
            let lo = 1.0 - confidence;
            let step = (confidence - lo) / (samples - 1) as f64;
            (0..samples)
                .map(|i| standard_normal_ppf(lo + step * i as f64))
                .collect()
        })
    }
}

/// Zero distance is always within reach, whatever the limit
pub(crate) fn within_reach(from: Position, to: Position, limit: f64) -> bool {
    from == to || from.distance(&to) <= limit
}
