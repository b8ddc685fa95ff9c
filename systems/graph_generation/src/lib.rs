#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural stage generation.
//!
//! A stage is a square grid of nodes. Walkable road is carved by monotone
//! random walks from the start corner to the goal corner, so the goal is
//! always reachable over non-negative edges. From the warp stage onward a
//! single negative-weight tunnel may shortcut part of the route.

use detour_defence_core::{Edge, GridCoord, GridRules, Node, NodeId, StageLayout};
use glam::Vec2;
use rand::Rng;

/// Pure system that turns a stage number into a [`StageLayout`].
#[derive(Clone, Debug)]
pub struct GraphGeneration {
    rules: GridRules,
}

impl GraphGeneration {
    /// Creates a generator driven by the provided grid rules.
    #[must_use]
    pub fn new(rules: GridRules) -> Self {
        debug_assert!(
            rules.warp_weight > -(rules.warp_min_skip as f32 * rules.base_weight),
            "warp weight would allow negative cycles"
        );
        Self { rules }
    }

    /// Generates the layout for `stage` (values below one are treated as one).
    pub fn generate<R>(&self, stage: u32, rng: &mut R) -> StageLayout
    where
        R: Rng + ?Sized,
    {
        let stage = stage.max(1);
        let side = self.rules.side.max(2);
        let mut walkable = vec![false; cell_count(side)];

        let corridors = stage.min(self.rules.max_corridors.max(1));
        for _ in 0..corridors {
            carve_corridor(side, &mut walkable, rng);
        }

        let extra_cells = stage.saturating_mul(self.rules.extra_cells_per_stage);
        for _ in 0..extra_cells {
            let index = rng.gen_range(0..walkable.len());
            walkable[index] = true;
        }

        let nodes = self.build_nodes(side, &walkable);
        let mut edges = self.adjacency_edges(side, &walkable);
        if let Some(warp) = self.pick_warp(stage, side, &walkable, rng) {
            edges.push(warp);
        }

        StageLayout::new(
            stage,
            side,
            nodes,
            edges,
            node_id(side, GridCoord::new(0, 0)),
            node_id(side, GridCoord::new(side - 1, side - 1)),
        )
    }

    fn build_nodes(&self, side: u32, walkable: &[bool]) -> Vec<Node> {
        let mut nodes = Vec::with_capacity(walkable.len());
        for row in 0..side {
            for column in 0..side {
                let cell = GridCoord::new(column, row);
                let id = node_id(side, cell);
                nodes.push(Node {
                    id,
                    cell,
                    position: Vec2::new(column as f32, row as f32) * self.rules.node_spacing,
                    is_path: walkable[id.index()],
                });
            }
        }
        nodes
    }

    fn adjacency_edges(&self, side: u32, walkable: &[bool]) -> Vec<Edge> {
        let weight = self.rules.base_weight;
        let mut edges = Vec::new();
        for row in 0..side {
            for column in 0..side {
                let here = node_id(side, GridCoord::new(column, row));
                if !walkable[here.index()] {
                    continue;
                }

                let mut neighbours = [None; 2];
                if column + 1 < side {
                    neighbours[0] = Some(node_id(side, GridCoord::new(column + 1, row)));
                }
                if row + 1 < side {
                    neighbours[1] = Some(node_id(side, GridCoord::new(column, row + 1)));
                }

                for there in neighbours.into_iter().flatten() {
                    if walkable[there.index()] {
                        edges.push(Edge::adjacency(here, there, weight));
                        edges.push(Edge::adjacency(there, here, weight));
                    }
                }
            }
        }
        edges
    }

    fn pick_warp<R>(&self, stage: u32, side: u32, walkable: &[bool], rng: &mut R) -> Option<Edge>
    where
        R: Rng + ?Sized,
    {
        if stage < self.rules.warp_min_stage || side < self.rules.warp_min_side {
            return None;
        }

        let span = 2 * (side - 1);
        let source_limit = (self.rules.warp_source_span * span as f32).floor() as u32;
        let max_skip = span / 2;

        let road: Vec<GridCoord> = (0..side)
            .flat_map(|row| (0..side).map(move |column| GridCoord::new(column, row)))
            .filter(|cell| walkable[node_id(side, *cell).index()])
            .collect();

        let mut candidates = Vec::new();
        for &source in &road {
            let source_progress = progress(source);
            if source_progress > source_limit {
                continue;
            }
            for &destination in &road {
                let destination_progress = progress(destination);
                if span - destination_progress < self.rules.warp_min_remaining {
                    continue;
                }
                let Some(skip) = destination_progress.checked_sub(source_progress) else {
                    continue;
                };
                if skip < self.rules.warp_min_skip.max(1) || skip > max_skip {
                    continue;
                }
                candidates.push((source, destination));
            }
        }

        if candidates.is_empty() {
            return None;
        }
        let (source, destination) = candidates[rng.gen_range(0..candidates.len())];
        Some(Edge::warp(
            node_id(side, source),
            node_id(side, destination),
            self.rules.warp_weight,
        ))
    }
}

impl Default for GraphGeneration {
    fn default() -> Self {
        Self::new(GridRules::default())
    }
}

/// Marks a monotone walk from the top-left to the bottom-right corner.
fn carve_corridor<R>(side: u32, walkable: &mut [bool], rng: &mut R)
where
    R: Rng + ?Sized,
{
    let goal = GridCoord::new(side - 1, side - 1);
    let mut cell = GridCoord::new(0, 0);
    walkable[node_id(side, cell).index()] = true;

    while cell != goal {
        let can_move_right = cell.column() < goal.column();
        let can_move_down = cell.row() < goal.row();
        let move_right = match (can_move_right, can_move_down) {
            (true, true) => rng.gen_bool(0.5),
            (right, _) => right,
        };
        cell = if move_right {
            GridCoord::new(cell.column() + 1, cell.row())
        } else {
            GridCoord::new(cell.column(), cell.row() + 1)
        };
        walkable[node_id(side, cell).index()] = true;
    }
}

/// Distance already travelled from the start corner.
fn progress(cell: GridCoord) -> u32 {
    cell.column() + cell.row()
}

fn node_id(side: u32, cell: GridCoord) -> NodeId {
    NodeId::new(cell.row() * side + cell.column())
}

fn cell_count(side: u32) -> usize {
    side as usize * side as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_counts_steps_from_start() {
        assert_eq!(progress(GridCoord::new(0, 0)), 0);
        assert_eq!(progress(GridCoord::new(3, 4)), 7);
    }

    #[test]
    fn node_ids_are_row_major() {
        assert_eq!(node_id(5, GridCoord::new(0, 0)), NodeId::new(0));
        assert_eq!(node_id(5, GridCoord::new(4, 0)), NodeId::new(4));
        assert_eq!(node_id(5, GridCoord::new(0, 1)), NodeId::new(5));
        assert_eq!(node_id(5, GridCoord::new(4, 4)), NodeId::new(24));
    }
}
