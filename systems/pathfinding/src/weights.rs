//! Per-tick effective edge weights.

use detour_defence_core::{CongestionRules, NodeId, StageLayout};
use glam::Vec2;

use crate::WeightedEdge;

/// Rewrites `out` with the effective weight of every layout edge.
///
/// Edges touching a road block take the finite blocked weight. Every other
/// edge pays one penalty per tower standing strictly closer than the
/// congestion radius to its destination node.
pub fn effective_weights<F>(
    layout: &StageLayout,
    rules: &CongestionRules,
    towers: &[Vec2],
    is_blocked: F,
    out: &mut Vec<WeightedEdge>,
) where
    F: Fn(NodeId) -> bool,
{
    out.clear();
    out.reserve(layout.edges().len());

    let radius_sq = rules.tower_radius * rules.tower_radius;
    for edge in layout.edges() {
        let weight = if is_blocked(edge.from) || is_blocked(edge.to) {
            f64::from(rules.blocked_weight)
        } else {
            let nearby = layout.node(edge.to).map_or(0, |destination| {
                towers
                    .iter()
                    .filter(|tower| tower.distance_squared(destination.position) < radius_sq)
                    .count()
            });
            f64::from(edge.weight) + f64::from(rules.tower_penalty) * nearby as f64
        };

        out.push(WeightedEdge {
            from: edge.from,
            to: edge.to,
            weight,
        });
    }
}
