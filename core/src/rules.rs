//! Tunable match parameters.
//!
//! Every struct derives serde with `#[serde(default)]` so adapters can load a
//! partial TOML document and only override the values it names.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Aggregated tuning knobs for a match.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Shape of the generated grid.
    pub grid: GridRules,
    /// Starting balances and placement prices.
    pub economy: EconomyRules,
    /// Countdown lengths and wave count.
    pub clock: ClockRules,
    /// Spawn cadence, wave sizing and archetype odds.
    pub spawning: SpawnRules,
    /// Dynamic edge weighting around towers and road blocks.
    pub congestion: CongestionRules,
    /// Projectile flight parameters.
    pub combat: CombatRules,
}

/// Grid generation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridRules {
    /// Nodes along each side of the square grid.
    pub side: u32,
    /// Distance in world units between adjacent nodes.
    pub node_spacing: f32,
    /// Weight of an ordinary adjacency edge.
    pub base_weight: f32,
    /// Upper bound on guaranteed start-to-goal corridors.
    pub max_corridors: u32,
    /// Random walkable cells added per stage number.
    pub extra_cells_per_stage: u32,
    /// First stage that may receive a warp edge.
    pub warp_min_stage: u32,
    /// Smallest grid side that may receive a warp edge.
    pub warp_min_side: u32,
    /// Weight of the warp edge; must stay above `-warp_min_skip * base_weight`.
    pub warp_weight: f32,
    /// Share of the start-to-goal span a warp source may sit within.
    pub warp_source_span: f32,
    /// Minimum remaining distance to the goal from a warp destination.
    pub warp_min_remaining: u32,
    /// Minimum progress a warp edge must skip.
    pub warp_min_skip: u32,
}

impl Default for GridRules {
    fn default() -> Self {
        Self {
            side: 12,
            node_spacing: 1.0,
            base_weight: 1.0,
            max_corridors: 3,
            extra_cells_per_stage: 4,
            warp_min_stage: 2,
            warp_min_side: 6,
            warp_weight: -3.0,
            warp_source_span: 0.4,
            warp_min_remaining: 2,
            warp_min_skip: 4,
        }
    }
}

/// Economy parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyRules {
    /// Money at match start and after each stage transition.
    pub starting_money: u32,
    /// Lives at match start and after each stage transition.
    pub starting_lives: u32,
    /// Price of a road block.
    pub road_block_cost: u32,
    /// Lifetime of a road block in milliseconds.
    pub road_block_lifetime_ms: u64,
}

impl EconomyRules {
    /// Lifetime of a road block.
    #[must_use]
    pub const fn road_block_lifetime(&self) -> Duration {
        Duration::from_millis(self.road_block_lifetime_ms)
    }
}

impl Default for EconomyRules {
    fn default() -> Self {
        Self {
            starting_money: 800,
            starting_lives: 20,
            road_block_cost: 50,
            road_block_lifetime_ms: 5_000,
        }
    }
}

/// Simulation clock parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockRules {
    /// Countdown before the first wave and between stages, in milliseconds.
    pub build_countdown_ms: u64,
    /// Countdown between waves of the same stage, in milliseconds.
    pub wave_countdown_ms: u64,
    /// Waves that must be cleared to finish a stage.
    pub waves_per_stage: u32,
}

impl ClockRules {
    /// Countdown before the first wave and between stages.
    #[must_use]
    pub const fn build_countdown(&self) -> Duration {
        Duration::from_millis(self.build_countdown_ms)
    }

    /// Countdown between waves of the same stage.
    #[must_use]
    pub const fn wave_countdown(&self) -> Duration {
        Duration::from_millis(self.wave_countdown_ms)
    }
}

impl Default for ClockRules {
    fn default() -> Self {
        Self {
            build_countdown_ms: 10_000,
            wave_countdown_ms: 5_000,
            waves_per_stage: 5,
        }
    }
}

/// Spawner parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnRules {
    /// Time the accumulator must exceed between spawns, in milliseconds.
    pub interval_ms: u64,
    /// Enemies in every wave before the per-wave increase.
    pub base_enemies: u32,
    /// Additional enemies per wave number.
    pub enemies_per_wave: u32,
    /// First stage stealth enemies may appear on.
    pub stealth_min_stage: u32,
    /// Probability of a stealth enemy once unlocked.
    pub stealth_chance: f64,
    /// Heavy enemies appear on waves divisible by this period.
    pub heavy_wave_period: u32,
    /// Probability of a heavy enemy on eligible waves.
    pub heavy_chance: f64,
    /// Probability of a light enemy.
    pub light_chance: f64,
    /// Hit point growth per stage beyond the first.
    pub stage_growth: f32,
    /// Hit point growth per wave beyond the first.
    pub wave_growth: f32,
}

impl SpawnRules {
    /// Time the accumulator must exceed between spawns.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Number of enemies the provided wave spawns.
    #[must_use]
    pub fn enemies_for_wave(&self, wave: u32) -> u32 {
        self.base_enemies
            .saturating_add(wave.saturating_mul(self.enemies_per_wave))
    }
}

impl Default for SpawnRules {
    fn default() -> Self {
        Self {
            interval_ms: 800,
            base_enemies: 10,
            enemies_per_wave: 2,
            stealth_min_stage: 3,
            stealth_chance: 0.1,
            heavy_wave_period: 3,
            heavy_chance: 0.3,
            light_chance: 0.2,
            stage_growth: 0.15,
            wave_growth: 0.1,
        }
    }
}

/// Dynamic weighting parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CongestionRules {
    /// Towers closer than this to an edge's destination penalise the edge.
    pub tower_radius: f32,
    /// Penalty added per nearby tower.
    pub tower_penalty: f32,
    /// Finite weight assigned to edges touching a road block.
    pub blocked_weight: f32,
}

impl Default for CongestionRules {
    fn default() -> Self {
        Self {
            tower_radius: 2.0,
            tower_penalty: 4.0,
            blocked_weight: 1.0e6,
        }
    }
}

/// Projectile parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatRules {
    /// Projectile travel speed in world units per second.
    pub projectile_speed: f32,
    /// Distance at which a projectile counts as having hit.
    pub impact_radius: f32,
}

impl Default for CombatRules {
    fn default() -> Self {
        Self {
            projectile_speed: 10.0,
            impact_radius: 0.25,
        }
    }
}
