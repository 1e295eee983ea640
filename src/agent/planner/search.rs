//! A* search over the course grid for the next aim point
//!
//! Every edge costs one shot and the heuristic is the straight-line
//! distance to the goal. Edges are validated lazily: a node's splash
//! zone is only built when the node is popped, so edges that are never
//! expanded never pay for envelope geometry.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::{AHashMap, AHashSet};
use geo::Polygon;
use ordered_float::OrderedFloat;

use super::reach::{within_reach, ReachModel};
use crate::agent::{AgentError, CancelToken};
use crate::core::types::Position;

/// Node in the search arena; `parent` indexes an earlier node
#[derive(Debug, Clone, Copy)]
struct SearchNode {
    point: Position,
    cost: f64,
    parent: Option<usize>,
}

/// Entry in the A* open set
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f_cost: OrderedFloat<f64>, // g_cost + heuristic
    seq: u64,
    node: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; earlier insertion wins ties
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

type PointKey = (u64, u64);

fn key(p: Position) -> PointKey {
    (p.x.to_bits(), p.y.to_bits())
}

/// Everything one search needs, borrowed from the owning agent
pub(crate) struct SearchSpace<'a> {
    pub grid: &'a [Position],
    pub goal: Position,
    pub course: &'a Polygon<f64>,
    pub reach: &'a mut ReachModel,
    pub goal_tolerance: f64,
}

impl<'a> SearchSpace<'a> {
    /// The goal, if reachable, then every reachable grid point
    ///
    /// Lazy and single-pass; bounded by the grid size.
    pub fn adjacent(&mut self, point: Position, confidence: f64) -> impl Iterator<Item = Position> + 'a {
        let limit = self.reach.reach_limit(confidence);
        let grid = self.grid;
        std::iter::once(self.goal)
            .chain(grid.iter().copied())
            .filter(move |candidate| within_reach(point, *candidate, limit))
    }

    /// First step of a confidence-bounded path from `start` to the goal
    ///
    /// Returns `Ok(None)` when the open set runs dry, and
    /// `Err(Cancelled)` as soon as `cancel` is raised.
    pub fn next_target(
        &mut self,
        start: Position,
        confidence: f64,
        cancel: &CancelToken,
    ) -> Result<Option<Position>, AgentError> {
        let goal = self.goal;
        let mut nodes = vec![SearchNode {
            point: start,
            cost: 0.0,
            parent: None,
        }];
        let mut open_set = BinaryHeap::new();
        let mut best_f: AHashMap<PointKey, f64> = AHashMap::new();
        let mut closed: AHashSet<PointKey> = AHashSet::new();
        let mut seq = 0u64;

        let start_f = start.distance(&goal);
        best_f.insert(key(start), start_f);
        open_set.push(OpenEntry {
            f_cost: OrderedFloat(start_f),
            seq,
            node: 0,
        });

        while let Some(entry) = open_set.pop() {
            if cancel.is_cancelled() {
                return Err(AgentError::Cancelled);
            }

            let current = nodes[entry.node];
            let current_key = key(current.point);
            // A later, cheaper route to this point may be queued again
            best_f.remove(&current_key);

            if closed.contains(&current_key) {
                continue;
            }
            if let Some(parent) = current.parent {
                let from = nodes[parent].point;
                if !self.reach.splash_zone_contained(from, current.point, confidence, self.course) {
                    continue;
                }
            }
            closed.insert(current_key);

            if current.point.distance(&goal) <= self.goal_tolerance {
                if entry.node == 0 {
                    return Ok(Some(goal));
                }
                return Ok(Some(first_step(&nodes, entry.node)));
            }

            let cost = current.cost + 1.0;
            for candidate in self.adjacent(current.point, confidence) {
                let candidate_key = key(candidate);
                if closed.contains(&candidate_key) {
                    continue;
                }
                let f_cost = cost + candidate.distance(&goal);
                if best_f.get(&candidate_key).map_or(true, |best| f_cost < *best) {
                    best_f.insert(candidate_key, f_cost);
                    nodes.push(SearchNode {
                        point: candidate,
                        cost,
                        parent: Some(entry.node),
                    });
                    seq += 1;
                    open_set.push(OpenEntry {
                        f_cost: OrderedFloat(f_cost),
                        seq,
                        node: nodes.len() - 1,
                    });
                }
            }
        }

        Ok(None) // No path found
    }
}

/// Walk back to the node whose parent is the search origin
fn first_step(nodes: &[SearchNode], mut idx: usize) -> Position {
    while let Some(parent) = nodes[idx].parent {
        if parent == 0 {
            break;
        }
        idx = parent;
    }
    nodes[idx].point
}
