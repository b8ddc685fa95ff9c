#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that fires projectiles and resolves their flight.

use std::time::Duration;

use detour_defence_core::{
    CombatRules, Command, Enemy, EnemyId, Event, Phase, Projectile, TowerTarget,
};
use glam::Vec2;

/// Tower combat system that queues firing and projectile commands.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireProjectile` for every assignment and advances
    /// projectiles already in flight.
    ///
    /// A projectile whose target vanished is discarded. One that closes to
    /// within the impact radius resolves against its target, or against every
    /// enemy inside its area radius when it carries one.
    #[allow(clippy::too_many_arguments)]
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: Phase,
        rules: &CombatRules,
        tower_targets: &[TowerTarget],
        projectiles: &[Projectile],
        enemies: &[Enemy],
        out: &mut Vec<Command>,
    ) {
        if phase != Phase::Playing {
            return;
        }

        self.scratch.clear();

        for target in tower_targets {
            self.scratch.push(Command::FireProjectile {
                tower: target.tower,
                target: target.enemy,
            });
        }

        let elapsed = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add);

        if !elapsed.is_zero() {
            let seconds = elapsed.as_secs_f32();
            for projectile in projectiles {
                self.scratch.push(advance(projectile, enemies, rules, seconds));
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn advance(
    projectile: &Projectile,
    enemies: &[Enemy],
    rules: &CombatRules,
    seconds: f32,
) -> Command {
    let Some(target) = find_enemy(enemies, projectile.target) else {
        return Command::DiscardProjectile {
            projectile: projectile.id,
        };
    };

    let reach = projectile.speed * seconds;
    let position = step_toward(projectile.position, target.position, reach);
    if position.distance(target.position) > rules.impact_radius {
        return Command::MoveProjectile {
            projectile: projectile.id,
            position,
        };
    }

    let victims = match projectile.area_radius {
        Some(radius) => {
            let radius_sq = radius * radius;
            let mut caught: Vec<EnemyId> = enemies
                .iter()
                .filter(|enemy| enemy.is_alive())
                .filter(|enemy| enemy.position.distance_squared(position) <= radius_sq)
                .map(|enemy| enemy.id)
                .collect();
            if !caught.contains(&target.id) {
                caught.push(target.id);
            }
            caught.sort_unstable();
            caught
        }
        None => vec![target.id],
    };

    Command::ResolveImpact {
        projectile: projectile.id,
        victims,
    }
}

fn find_enemy(enemies: &[Enemy], enemy: EnemyId) -> Option<&Enemy> {
    enemies
        .iter()
        .find(|candidate| candidate.id == enemy && candidate.is_alive())
}

/// Moves `from` toward `to` by at most `distance`, landing exactly on `to`
/// when close enough.
fn step_toward(from: Vec2, to: Vec2, distance: f32) -> Vec2 {
    let offset = to - from;
    let remaining = offset.length();
    if remaining <= distance || remaining <= f32::EPSILON {
        return to;
    }
    from + offset / remaining * distance
}
