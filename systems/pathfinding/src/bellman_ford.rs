//! Single-source shortest paths tolerant of negative edge weights.

use detour_defence_core::NodeId;

use crate::PathError;

/// Directed edge carrying the weight used for one relaxation run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightedEdge {
    /// Tail of the edge.
    pub from: NodeId,
    /// Head of the edge.
    pub to: NodeId,
    /// Effective traversal cost; may be negative.
    pub weight: f64,
}

impl WeightedEdge {
    /// Same edge travelled in the opposite direction at the same cost.
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self {
            from: self.to,
            to: self.from,
            weight: self.weight,
        }
    }
}

/// Distances and predecessors produced by edge relaxation from one source.
///
/// Unreached nodes report [`f64::INFINITY`] and no predecessor. When
/// [`ShortestPaths::has_negative_cycle`] is set the maps are still returned
/// but may be inaccurate for nodes touched by the cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct ShortestPaths {
    source: NodeId,
    distances: Vec<f64>,
    predecessors: Vec<Option<NodeId>>,
    negative_cycle: bool,
}

impl ShortestPaths {
    /// Relaxes every edge up to `node_count - 1` times, stopping early once a
    /// pass changes nothing, then runs one extra pass to detect negative
    /// cycles reachable from `source`.
    pub fn compute(
        node_count: usize,
        edges: &[WeightedEdge],
        source: NodeId,
    ) -> Result<Self, PathError> {
        if source.index() >= node_count {
            return Err(PathError::UnknownSource { node: source });
        }
        if let Some(edge) = edges
            .iter()
            .find(|edge| edge.from.index() >= node_count || edge.to.index() >= node_count)
        {
            return Err(PathError::UnknownEndpoint {
                from: edge.from,
                to: edge.to,
            });
        }

        let mut distances = vec![f64::INFINITY; node_count];
        let mut predecessors = vec![None; node_count];
        distances[source.index()] = 0.0;

        for _ in 1..node_count {
            let mut improved = false;
            for edge in edges {
                let Some(candidate) = relaxed(&distances, edge) else {
                    continue;
                };
                distances[edge.to.index()] = candidate;
                predecessors[edge.to.index()] = Some(edge.from);
                improved = true;
            }
            if !improved {
                break;
            }
        }

        let negative_cycle = edges.iter().any(|edge| relaxed(&distances, edge).is_some());

        Ok(Self {
            source,
            distances,
            predecessors,
            negative_cycle,
        })
    }

    /// Node the search started from.
    #[must_use]
    pub const fn source(&self) -> NodeId {
        self.source
    }

    /// Shortest known distance from the source, infinite when unreached.
    #[must_use]
    pub fn distance(&self, node: NodeId) -> f64 {
        self.distances
            .get(node.index())
            .copied()
            .unwrap_or(f64::INFINITY)
    }

    /// Node preceding `node` on its shortest path from the source.
    #[must_use]
    pub fn predecessor(&self, node: NodeId) -> Option<NodeId> {
        self.predecessors.get(node.index()).copied().flatten()
    }

    /// Reports whether the extra pass could still shorten a distance.
    #[must_use]
    pub const fn has_negative_cycle(&self) -> bool {
        self.negative_cycle
    }
}

/// Returns the improved distance for the edge's head, if relaxing helps.
fn relaxed(distances: &[f64], edge: &WeightedEdge) -> Option<f64> {
    let from = distances[edge.from.index()];
    if from.is_infinite() {
        return None;
    }
    let candidate = from + edge.weight;
    (candidate < distances[edge.to.index()]).then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: u32, to: u32, weight: f64) -> WeightedEdge {
        WeightedEdge {
            from: NodeId::new(from),
            to: NodeId::new(to),
            weight,
        }
    }

    #[test]
    fn unreached_nodes_stay_infinite() {
        let paths =
            ShortestPaths::compute(3, &[edge(0, 1, 2.0)], NodeId::new(0)).expect("valid graph");
        assert_eq!(paths.distance(NodeId::new(1)), 2.0);
        assert!(paths.distance(NodeId::new(2)).is_infinite());
        assert_eq!(paths.predecessor(NodeId::new(2)), None);
        assert_eq!(paths.predecessor(NodeId::new(0)), None);
    }

    #[test]
    fn out_of_range_endpoints_are_rejected() {
        assert_eq!(
            ShortestPaths::compute(2, &[edge(0, 5, 1.0)], NodeId::new(0)),
            Err(PathError::UnknownEndpoint {
                from: NodeId::new(0),
                to: NodeId::new(5)
            })
        );
        assert_eq!(
            ShortestPaths::compute(0, &[], NodeId::new(0)),
            Err(PathError::UnknownSource {
                node: NodeId::new(0)
            })
        );
    }

    #[test]
    fn reversal_swaps_endpoints() {
        let reversed = edge(1, 2, -3.0).reversed();
        assert_eq!(reversed, edge(2, 1, -3.0));
    }
}
