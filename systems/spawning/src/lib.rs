#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawning system responsible for releasing a wave's enemies one at a time.

use std::time::Duration;

use detour_defence_core::{
    Command, EnemyArchetype, EnemyBlueprint, Event, Phase, SpawnLedger, SpawnRules,
};
use rand::Rng;

/// Pure system that paces spawns and rolls enemy archetypes.
#[derive(Clone, Debug)]
pub struct Spawning {
    rules: SpawnRules,
}

impl Spawning {
    /// Creates a spawning system driven by the provided rules.
    #[must_use]
    pub fn new(rules: SpawnRules) -> Self {
        Self { rules }
    }

    /// Consumes the tick's events and the spawn ledger to emit at most one
    /// `Command::RecordSpawns`.
    ///
    /// The accumulator must strictly exceed the spawn interval; it then
    /// resets to zero, so a single tick never spawns more than one enemy.
    #[allow(clippy::too_many_arguments)]
    pub fn handle<R>(
        &self,
        events: &[Event],
        phase: Phase,
        ledger: SpawnLedger,
        stage: u32,
        wave: u32,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: Rng + ?Sized,
    {
        if phase != Phase::Playing || ledger.remaining == 0 {
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

        let accumulated = ledger.accumulated.saturating_add(elapsed);
        if accumulated <= self.rules.interval() {
            out.push(Command::RecordSpawns {
                accumulated,
                spawned: None,
            });
            return;
        }

        out.push(Command::RecordSpawns {
            accumulated: Duration::ZERO,
            spawned: Some(self.blueprint(stage, wave, rng)),
        });
    }

    /// Rolls an archetype and scales its hit points for the stage and wave.
    pub fn blueprint<R>(&self, stage: u32, wave: u32, rng: &mut R) -> EnemyBlueprint
    where
        R: Rng + ?Sized,
    {
        let archetype = self.roll_archetype(stage, wave, rng);
        let stats = archetype.stats();
        EnemyBlueprint {
            archetype,
            hit_points: scaled_hit_points(&self.rules, stats.hit_points, stage, wave),
            speed: stats.speed,
            reward: stats.reward,
        }
    }

    fn roll_archetype<R>(&self, stage: u32, wave: u32, rng: &mut R) -> EnemyArchetype
    where
        R: Rng + ?Sized,
    {
        let rules = &self.rules;
        if stage >= rules.stealth_min_stage && chance(rng, rules.stealth_chance) {
            return EnemyArchetype::Stealth;
        }
        let heavy_wave = rules.heavy_wave_period != 0 && wave % rules.heavy_wave_period == 0;
        if heavy_wave && chance(rng, rules.heavy_chance) {
            return EnemyArchetype::Heavy;
        }
        if chance(rng, rules.light_chance) {
            return EnemyArchetype::Light;
        }
        EnemyArchetype::Standard
    }
}

impl Default for Spawning {
    fn default() -> Self {
        Self::new(SpawnRules::default())
    }
}

/// Draws a uniform sample and compares it with `probability`.
fn chance<R>(rng: &mut R, probability: f64) -> bool
where
    R: Rng + ?Sized,
{
    rng.gen::<f64>() < probability
}

fn scaled_hit_points(rules: &SpawnRules, base: u32, stage: u32, wave: u32) -> u32 {
    let stage_factor = 1.0 + rules.stage_growth * stage.saturating_sub(1) as f32;
    let wave_factor = 1.0 + rules.wave_growth * wave.saturating_sub(1) as f32;
    let scaled = (base as f32 * stage_factor * wave_factor).round();
    if scaled.is_nan() || scaled < 1.0 {
        1
    } else if scaled >= u32::MAX as f32 {
        u32::MAX
    } else {
        scaled as u32
    }
}
