#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Detour Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then reports [`Event`] values describing what
//! happened. Systems read immutable views of the world and respond
//! exclusively with new command batches.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod entities;
mod graph;
mod rules;

pub use entities::{
    ArchetypeStats, Enemy, EnemyArchetype, EnemyBlueprint, EnemyId, Projectile, ProjectileId,
    RoadBlock, Specialization, Tower, TowerId, TowerProfile, TowerTier,
};
pub use graph::{Edge, GridCoord, Node, NodeId, StageLayout};
pub use rules::{
    ClockRules, CombatRules, CongestionRules, EconomyRules, GridRules, Rules, SpawnRules,
};

/// Phases of the simulation clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Countdown before the first wave of a match.
    Build,
    /// Countdown between two waves of the same stage.
    WaveCountdown,
    /// Enemies spawn, move and fight.
    Playing,
    /// Countdown before the next stage is generated.
    StageTransition,
    /// Terminal phase entered when lives run out.
    GameOver,
    /// Frozen by an external command.
    Paused,
}

impl Phase {
    /// Reports whether the phase runs a countdown toward the next wave.
    #[must_use]
    pub const fn is_countdown(self) -> bool {
        matches!(self, Self::Build | Self::WaveCountdown | Self::StageTransition)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests construction of a tier-1 tower.
    PlaceTower {
        /// Buildable node that should host the tower.
        node: NodeId,
    },
    /// Requests a temporary obstacle on the road.
    PlaceRoadBlock {
        /// Walkable node that should host the block.
        node: NodeId,
    },
    /// Requests the next tier for an existing tower.
    UpgradeTower {
        /// Tower to upgrade.
        tower: TowerId,
        /// Branch to take; must match the locked branch beyond tier 2.
        specialization: Specialization,
    },
    /// Skips the remainder of the current countdown.
    AdvanceWave,
    /// Freezes or resumes the simulation.
    SetPaused {
        /// `true` to pause, `false` to resume.
        paused: bool,
    },
    /// Replaces the road network with a freshly generated stage.
    InstallStage {
        /// Layout produced by the graph generator.
        layout: StageLayout,
    },
    /// Records the spawner's bookkeeping for the tick.
    RecordSpawns {
        /// Spawn accumulator value after this tick.
        accumulated: Duration,
        /// Enemy created this tick, if the interval elapsed.
        spawned: Option<EnemyBlueprint>,
    },
    /// Updates an enemy's position along its current edge.
    MoveEnemy {
        /// Enemy being moved.
        enemy: EnemyId,
        /// Node the enemy stands on or last left.
        current: NodeId,
        /// Node the enemy is heading for.
        next: Option<NodeId>,
        /// Fraction of the edge covered.
        progress: f32,
        /// Interpolated position in world units.
        position: Vec2,
    },
    /// Removes an enemy that reached the goal and charges a life.
    EscapeEnemy {
        /// Enemy standing on the goal node.
        enemy: EnemyId,
    },
    /// Launches a projectile from a ready tower.
    FireProjectile {
        /// Tower firing the shot.
        tower: TowerId,
        /// Enemy the projectile homes in on.
        target: EnemyId,
    },
    /// Moves a projectile along its flight path.
    MoveProjectile {
        /// Projectile being moved.
        projectile: ProjectileId,
        /// New position in world units.
        position: Vec2,
    },
    /// Drops a projectile whose target disappeared.
    DiscardProjectile {
        /// Projectile being removed.
        projectile: ProjectileId,
    },
    /// Applies a projectile's damage and removes it.
    ResolveImpact {
        /// Projectile that reached its target.
        projectile: ProjectileId,
        /// Enemies caught by the impact.
        victims: Vec<EnemyId>,
    },
    /// Runs the end-of-tick wave completion check.
    ConcludeTick,
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the simulation clock entered a new phase.
    PhaseChanged {
        /// Phase that became active.
        phase: Phase,
    },
    /// Announces the start of a wave.
    WaveStarted {
        /// Stage the wave belongs to.
        stage: u32,
        /// Wave number within the stage.
        wave: u32,
        /// Enemies the wave will spawn.
        enemies: u32,
    },
    /// Announces that a wave was spawned and fought to exhaustion.
    WaveCleared {
        /// Stage the wave belongs to.
        stage: u32,
        /// Wave number within the stage.
        wave: u32,
    },
    /// Requests a freshly generated layout for the provided stage.
    StageLayoutRequired {
        /// Stage that needs a layout.
        stage: u32,
    },
    /// Confirms that a new stage layout was installed.
    StageStarted {
        /// Stage that became active.
        stage: u32,
    },
    /// Confirms that a tower was placed.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Node hosting the tower.
        node: NodeId,
    },
    /// Reports that a tower placement was rejected.
    TowerPlacementRejected {
        /// Node named in the request.
        node: NodeId,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a road block was placed.
    RoadBlockPlaced {
        /// Node hosting the block.
        node: NodeId,
        /// Simulation time after which the block disappears.
        expires_at: Duration,
    },
    /// Reports that a road block placement was rejected.
    RoadBlockRejected {
        /// Node named in the request.
        node: NodeId,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Reports that a road block lapsed.
    RoadBlockExpired {
        /// Node the block occupied.
        node: NodeId,
    },
    /// Confirms that a tower reached a new tier.
    TowerUpgraded {
        /// Upgraded tower.
        tower: TowerId,
        /// Branch the tower follows.
        specialization: Specialization,
        /// Tier reached.
        tier: TowerTier,
    },
    /// Reports that an upgrade was rejected.
    TowerUpgradeRejected {
        /// Tower named in the request.
        tower: TowerId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Reports that a clock command was rejected.
    PhaseCommandRejected {
        /// Specific reason the command failed.
        reason: PhaseError,
    },
    /// Confirms that an enemy entered the road network.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Archetype of the enemy.
        archetype: EnemyArchetype,
    },
    /// Reports that an enemy reached the goal.
    EnemyEscaped {
        /// Enemy that escaped.
        enemy: EnemyId,
        /// Lives left after the escape.
        lives_remaining: u32,
    },
    /// Reports that an enemy was destroyed.
    EnemyKilled {
        /// Enemy that was destroyed.
        enemy: EnemyId,
        /// Money credited for the kill.
        reward: u32,
    },
    /// Confirms that a tower fired.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
        /// Enemy the projectile homes in on.
        target: EnemyId,
    },
    /// Announces that the match ended.
    GameOver {
        /// Stage reached.
        stage: u32,
        /// Wave reached.
        wave: u32,
    },
}

/// Reasons a tower or road block placement may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The node does not exist in the current stage.
    #[error("node does not exist")]
    UnknownNode,
    /// Towers cannot stand on the road.
    #[error("towers cannot be built on the road")]
    OnRoad,
    /// Road blocks need a walkable node.
    #[error("road blocks require a walkable node")]
    OffRoad,
    /// The node already hosts a tower or a road block.
    #[error("node is already occupied")]
    Occupied,
    /// The purchase would overdraw the balance.
    #[error("insufficient funds")]
    InsufficientFunds,
    /// The match has ended.
    #[error("the match is over")]
    MatchOver,
}

/// Reasons a tower upgrade may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum UpgradeError {
    /// No tower with the provided identifier exists.
    #[error("tower does not exist")]
    MissingTower,
    /// The tower already reached tier 3.
    #[error("tower is fully upgraded")]
    MaxTier,
    /// Tier 3 must follow the branch chosen at tier 2.
    #[error("tower is locked into another specialization")]
    SpecializationLocked,
    /// The purchase would overdraw the balance.
    #[error("insufficient funds")]
    InsufficientFunds,
    /// The match has ended.
    #[error("the match is over")]
    MatchOver,
}

/// Reasons a clock command may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PhaseError {
    /// Waves can only be advanced during a countdown.
    #[error("no countdown is running")]
    NotCountingDown,
    /// The simulation is already paused.
    #[error("already paused")]
    AlreadyPaused,
    /// The simulation is not paused.
    #[error("not paused")]
    NotPaused,
    /// The match has ended.
    #[error("the match is over")]
    MatchOver,
}

/// Spawner bookkeeping exposed to the spawning system.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnLedger {
    /// Enemies still to be spawned in the current wave.
    pub remaining: u32,
    /// Time accumulated toward the next spawn.
    pub accumulated: Duration,
}

/// Target assignment produced by tower targeting for a ready tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that should fire.
    pub tower: TowerId,
    /// Enemy selected as the target.
    pub enemy: EnemyId,
    /// Tower position in world units.
    pub tower_position: Vec2,
    /// Enemy position in world units at selection time.
    pub enemy_position: Vec2,
}
