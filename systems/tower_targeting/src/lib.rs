#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use std::time::Duration;

use detour_defence_core::{Enemy, EnemyId, Phase, Tower, TowerId, TowerTarget};
use glam::Vec2;

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    tower_workspace: Vec<TowerWorkspace>,
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns the nearest enemy in range to every tower ready at `now`.
    ///
    /// The output buffer is cleared before populating it with the latest
    /// assignments, which come out in tower identifier order.
    pub fn handle<'a, I>(
        &mut self,
        phase: Phase,
        now: Duration,
        towers: I,
        enemies: &[Enemy],
        out: &mut Vec<TowerTarget>,
    ) where
        I: IntoIterator<Item = &'a Tower>,
    {
        out.clear();

        if phase != Phase::Playing || enemies.is_empty() {
            return;
        }

        self.prepare_tower_workspace(now, towers);
        if self.tower_workspace.is_empty() {
            return;
        }

        self.prepare_enemy_workspace(enemies);
        if self.enemy_workspace.is_empty() {
            return;
        }

        for tower in &self.tower_workspace {
            let max_distance = tower.range * tower.range;
            let mut best: Option<BestCandidate> = None;

            for candidate in &self.enemy_workspace {
                let distance_sq = tower.position.distance_squared(candidate.position);
                if distance_sq > max_distance {
                    continue;
                }

                let current = BestCandidate {
                    distance_sq,
                    enemy: candidate.id,
                    position: candidate.position,
                };

                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing) {
                            *existing = current;
                        }
                    }
                    None => best = Some(current),
                }
            }

            if let Some(best_candidate) = best {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy: best_candidate.enemy,
                    tower_position: tower.position,
                    enemy_position: best_candidate.position,
                });
            }
        }
    }

    fn prepare_tower_workspace<'a, I>(&mut self, now: Duration, towers: I)
    where
        I: IntoIterator<Item = &'a Tower>,
    {
        self.tower_workspace.clear();
        for tower in towers {
            if !tower.is_ready(now) || tower.range <= 0.0 {
                continue;
            }
            self.tower_workspace.push(TowerWorkspace {
                id: tower.id,
                position: tower.position,
                range: tower.range,
            });
        }
        self.tower_workspace.sort_by_key(|tower| tower.id);
    }

    fn prepare_enemy_workspace(&mut self, enemies: &[Enemy]) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());
        self.enemy_workspace.extend(
            enemies
                .iter()
                .filter(|enemy| enemy.is_alive())
                .map(|enemy| EnemyCandidate {
                    id: enemy.id,
                    position: enemy.position,
                }),
        );
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerWorkspace {
    id: TowerId,
    position: Vec2,
    range: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance_sq: f32,
    enemy: EnemyId,
    position: Vec2,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }

        self.enemy < other.enemy
    }
}
