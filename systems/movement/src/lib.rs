#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement system that walks enemies edge by edge toward the goal.
//!
//! Enemies standing on a node pick the routed next hop. Once they leave a
//! node they stay committed to that edge until they snap onto its far end, so
//! a reroute never teleports an enemy sideways mid-edge.

use std::time::Duration;

use detour_defence_core::{Command, Enemy, Event, NodeId, Phase, StageLayout};
use glam::Vec2;

/// Pure system that reacts to elapsed time and emits movement commands.
#[derive(Debug, Default)]
pub struct Movement {
    ordered: Vec<usize>,
}

impl Movement {
    /// Creates a movement system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::MoveEnemy` and `Command::EscapeEnemy` for the tick.
    ///
    /// `next_hop` maps a node to its neighbour toward the goal and
    /// `is_blocked` reports active road blocks.
    #[allow(clippy::too_many_arguments)]
    pub fn handle<N, B>(
        &mut self,
        events: &[Event],
        phase: Phase,
        enemies: &[Enemy],
        layout: &StageLayout,
        next_hop: N,
        is_blocked: B,
        out: &mut Vec<Command>,
    ) where
        N: Fn(NodeId) -> Option<NodeId>,
        B: Fn(NodeId) -> bool,
    {
        if phase != Phase::Playing || enemies.is_empty() {
            return;
        }

        let elapsed = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add);
        if elapsed.is_zero() {
            return;
        }
        let seconds = elapsed.as_secs_f32();

        self.ordered.clear();
        self.ordered.extend(0..enemies.len());
        self.ordered.sort_by_key(|&index| enemies[index].id);

        for &index in &self.ordered {
            let enemy = &enemies[index];
            if !enemy.is_alive() {
                continue;
            }
            if let Some(command) = step(enemy, layout, seconds, &next_hop, &is_blocked) {
                out.push(command);
            }
        }
    }
}

fn step<N, B>(
    enemy: &Enemy,
    layout: &StageLayout,
    seconds: f32,
    next_hop: &N,
    is_blocked: &B,
) -> Option<Command>
where
    N: Fn(NodeId) -> Option<NodeId>,
    B: Fn(NodeId) -> bool,
{
    let at_node = enemy.progress <= 0.0;
    let heading = if at_node {
        next_hop(enemy.current)
    } else {
        enemy.next.or_else(|| next_hop(enemy.current))
    };

    let Some(next) = heading else {
        if enemy.current == layout.goal() {
            return Some(Command::EscapeEnemy { enemy: enemy.id });
        }
        // No route; wait on the node.
        return enemy.next.map(|_| Command::MoveEnemy {
            enemy: enemy.id,
            current: enemy.current,
            next: None,
            progress: enemy.progress,
            position: enemy.position,
        });
    };

    if is_blocked(next) {
        if enemy.next == Some(next) {
            return None;
        }
        return Some(Command::MoveEnemy {
            enemy: enemy.id,
            current: enemy.current,
            next: Some(next),
            progress: enemy.progress,
            position: enemy.position,
        });
    }

    let from = node_position(layout, enemy.current, enemy.position);
    let to = node_position(layout, next, from);
    let progress = enemy.progress + enemy.speed * seconds;

    if progress >= 1.0 {
        return Some(Command::MoveEnemy {
            enemy: enemy.id,
            current: next,
            next: next_hop(next),
            progress: 0.0,
            position: to,
        });
    }

    Some(Command::MoveEnemy {
        enemy: enemy.id,
        current: enemy.current,
        next: Some(next),
        progress,
        position: from.lerp(to, progress),
    })
}

fn node_position(layout: &StageLayout, node: NodeId, fallback: Vec2) -> Vec2 {
    layout.node(node).map_or(fallback, |node| node.position)
}
