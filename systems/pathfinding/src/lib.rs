#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Goal-rooted routing over a road network whose weights change every tick.
//!
//! Effective weights are derived from the static layout, active road blocks
//! and nearby towers. Shortest paths are then computed from the goal over the
//! reversed edges, so a single relaxation run yields the next hop toward the
//! goal for every node at once.

use detour_defence_core::{CongestionRules, NodeId, StageLayout};
use glam::Vec2;
use thiserror::Error;

mod bellman_ford;
mod weights;

pub use bellman_ford::{ShortestPaths, WeightedEdge};
pub use weights::effective_weights;

/// Failures raised when a graph references nodes it does not contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PathError {
    /// The search origin is outside the node set.
    #[error("source node {} is outside the graph", .node.get())]
    UnknownSource {
        /// Offending node.
        node: NodeId,
    },
    /// An edge endpoint is outside the node set.
    #[error("edge {} -> {} references an unknown node", .from.get(), .to.get())]
    UnknownEndpoint {
        /// Tail of the offending edge.
        from: NodeId,
        /// Head of the offending edge.
        to: NodeId,
    },
}

/// Next-hop table toward a single goal node.
#[derive(Clone, Debug, PartialEq)]
pub struct Routes {
    paths: ShortestPaths,
}

impl Routes {
    /// Computes routes toward `goal` for every node of the graph.
    pub fn toward(
        node_count: usize,
        edges: &[WeightedEdge],
        goal: NodeId,
    ) -> Result<Self, PathError> {
        let reversed: Vec<WeightedEdge> = edges.iter().map(|edge| edge.reversed()).collect();
        Self::from_reversed(node_count, &reversed, goal)
    }

    fn from_reversed(
        node_count: usize,
        reversed: &[WeightedEdge],
        goal: NodeId,
    ) -> Result<Self, PathError> {
        Ok(Self {
            paths: ShortestPaths::compute(node_count, reversed, goal)?,
        })
    }

    /// Goal every route leads to.
    #[must_use]
    pub const fn goal(&self) -> NodeId {
        self.paths.source()
    }

    /// Neighbour to step onto from `node`; `None` at the goal or when the goal
    /// is unreachable.
    #[must_use]
    pub fn next_hop(&self, node: NodeId) -> Option<NodeId> {
        self.paths.predecessor(node)
    }

    /// Remaining cost from `node` to the goal.
    #[must_use]
    pub fn distance_to_goal(&self, node: NodeId) -> f64 {
        self.paths.distance(node)
    }

    /// Reports whether a negative cycle could reach the goal.
    #[must_use]
    pub const fn has_negative_cycle(&self) -> bool {
        self.paths.has_negative_cycle()
    }
}

/// Routing system that reuses its edge buffers between ticks.
#[derive(Debug, Default)]
pub struct Pathfinding {
    weighted: Vec<WeightedEdge>,
    reversed: Vec<WeightedEdge>,
}

impl Pathfinding {
    /// Creates a routing system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes routes toward the layout's goal under current congestion.
    ///
    /// `towers` holds the world positions of every placed tower.
    pub fn handle<F>(
        &mut self,
        layout: &StageLayout,
        rules: &CongestionRules,
        towers: &[Vec2],
        is_blocked: F,
    ) -> Result<Routes, PathError>
    where
        F: Fn(NodeId) -> bool,
    {
        effective_weights(layout, rules, towers, is_blocked, &mut self.weighted);

        self.reversed.clear();
        self.reversed
            .extend(self.weighted.iter().map(|edge| edge.reversed()));

        Routes::from_reversed(layout.nodes().len(), &self.reversed, layout.goal())
    }
}
