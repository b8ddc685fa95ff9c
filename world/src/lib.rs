#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative match state for Detour Defence.
//!
//! [`GameState`] is the single unit of mutation. Every change flows through
//! [`apply`], which validates the command, mutates the state and reports what
//! happened as [`Event`] values. Rejected commands leave the state untouched.

use std::time::Duration;

use detour_defence_core::{
    Command, Enemy, EnemyBlueprint, EnemyId, Event, NodeId, Phase, PhaseError, PlacementError,
    Projectile, ProjectileId, RoadBlock, Rules, SpawnLedger, Specialization, StageLayout,
    TowerId, TowerProfile, TowerTier, UpgradeError,
};
use glam::Vec2;
use tracing::{debug, info};

mod clock;
mod economy;
mod road_blocks;
mod towers;

use clock::SimulationClock;
use economy::Wallet;
use road_blocks::RoadBlockRegistry;
use towers::TowerRegistry;

/// Represents the authoritative state of a single match.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    rules: Rules,
    layout: StageLayout,
    clock: SimulationClock,
    wallet: Wallet,
    stage: u32,
    wave: u32,
    spawn: SpawnLedger,
    enemies: Vec<Enemy>,
    towers: TowerRegistry,
    projectiles: Vec<Projectile>,
    road_blocks: RoadBlockRegistry,
    sim_time: Duration,
    next_enemy_id: u32,
    next_projectile_id: u32,
}

impl GameState {
    /// Creates a match in the build phase on the provided layout.
    #[must_use]
    pub fn new(rules: Rules, layout: StageLayout) -> Self {
        Self {
            clock: SimulationClock::new(rules.clock.build_countdown()),
            wallet: Wallet::new(&rules.economy),
            stage: layout.stage(),
            wave: 0,
            spawn: SpawnLedger::default(),
            enemies: Vec::new(),
            towers: TowerRegistry::new(),
            projectiles: Vec::new(),
            road_blocks: RoadBlockRegistry::default(),
            sim_time: Duration::ZERO,
            next_enemy_id: 0,
            next_projectile_id: 0,
            layout,
            rules,
        }
    }

    fn node_position(&self, node: NodeId) -> Option<Vec2> {
        self.layout.node(node).map(|node| node.position)
    }

    fn enemy_mut(&mut self, enemy: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|candidate| candidate.id == enemy)
    }

    fn projectile_index(&self, projectile: ProjectileId) -> Option<usize> {
        self.projectiles
            .iter()
            .position(|candidate| candidate.id == projectile)
    }

    fn set_phase_countdown(&mut self, phase: Phase, out_events: &mut Vec<Event>) {
        let countdown = match phase {
            Phase::WaveCountdown => self.rules.clock.wave_countdown(),
            _ => self.rules.clock.build_countdown(),
        };
        self.clock.start_countdown(phase, countdown);
        out_events.push(Event::PhaseChanged { phase });
    }

    fn start_wave(&mut self, wave: u32, out_events: &mut Vec<Event>) {
        self.wave = wave;
        let enemies = self.rules.spawning.enemies_for_wave(wave);
        self.spawn = SpawnLedger {
            remaining: enemies,
            accumulated: Duration::ZERO,
        };
        self.clock.start_playing();
        info!(stage = self.stage, wave, enemies, "wave started");
        out_events.push(Event::WaveStarted {
            stage: self.stage,
            wave,
            enemies,
        });
        out_events.push(Event::PhaseChanged {
            phase: Phase::Playing,
        });
    }

    fn countdown_expired(&mut self, out_events: &mut Vec<Event>) {
        match self.clock.phase() {
            Phase::Build | Phase::WaveCountdown => {
                let wave = self.wave.saturating_add(1);
                self.start_wave(wave, out_events);
            }
            Phase::StageTransition => out_events.push(Event::StageLayoutRequired {
                stage: self.stage.saturating_add(1),
            }),
            _ => {}
        }
    }

    fn install_stage(&mut self, layout: StageLayout, out_events: &mut Vec<Event>) {
        if self.clock.phase() != Phase::StageTransition || !self.clock.countdown().is_zero() {
            debug!(stage = layout.stage(), "stage layout arrived outside a transition");
            return;
        }

        self.stage = layout.stage();
        self.layout = layout;
        self.wallet = Wallet::new(&self.rules.economy);
        self.enemies.clear();
        self.projectiles.clear();
        self.towers.clear();
        self.road_blocks.clear();
        info!(stage = self.stage, "stage started");
        out_events.push(Event::StageStarted { stage: self.stage });
        self.start_wave(1, out_events);
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let phase = self.clock.phase();
        if matches!(phase, Phase::Paused | Phase::GameOver) {
            return;
        }

        self.sim_time = self.sim_time.saturating_add(dt);
        for node in self.road_blocks.expire(self.sim_time) {
            out_events.push(Event::RoadBlockExpired { node });
        }

        if phase == Phase::Playing {
            out_events.push(Event::TimeAdvanced { dt });
        } else if self.clock.count_down(dt) {
            self.countdown_expired(out_events);
        }
    }

    fn place_tower(&mut self, node: NodeId) -> Result<TowerId, PlacementError> {
        if self.clock.phase() == Phase::GameOver {
            return Err(PlacementError::MatchOver);
        }
        let target = self.layout.node(node).ok_or(PlacementError::UnknownNode)?;
        if target.is_path {
            return Err(PlacementError::OnRoad);
        }
        if self.towers.at(node).is_some() {
            return Err(PlacementError::Occupied);
        }
        let cost = TowerProfile::basic().cost;
        if !self.wallet.can_afford(cost) {
            return Err(PlacementError::InsufficientFunds);
        }

        let position = target.position;
        let _ = self.wallet.spend(cost);
        Ok(self.towers.build(node, position))
    }

    fn place_road_block(&mut self, node: NodeId) -> Result<RoadBlock, PlacementError> {
        if self.clock.phase() == Phase::GameOver {
            return Err(PlacementError::MatchOver);
        }
        let target = self.layout.node(node).ok_or(PlacementError::UnknownNode)?;
        if !target.is_path {
            return Err(PlacementError::OffRoad);
        }
        if self.road_blocks.contains(node) {
            return Err(PlacementError::Occupied);
        }
        if !self.wallet.spend(self.rules.economy.road_block_cost) {
            return Err(PlacementError::InsufficientFunds);
        }

        let block = RoadBlock {
            node,
            expires_at: self
                .sim_time
                .saturating_add(self.rules.economy.road_block_lifetime()),
        };
        self.road_blocks.insert(block);
        Ok(block)
    }

    fn upgrade_tower(
        &mut self,
        tower: TowerId,
        specialization: Specialization,
    ) -> Result<TowerTier, UpgradeError> {
        if self.clock.phase() == Phase::GameOver {
            return Err(UpgradeError::MatchOver);
        }
        self.towers.upgrade(tower, specialization, &mut self.wallet)
    }

    fn advance_wave(&mut self, out_events: &mut Vec<Event>) -> Result<(), PhaseError> {
        self.clock.expire()?;
        self.countdown_expired(out_events);
        Ok(())
    }

    fn set_paused(&mut self, paused: bool, out_events: &mut Vec<Event>) -> Result<(), PhaseError> {
        let phase = if paused {
            self.clock.pause()?;
            Phase::Paused
        } else {
            self.clock.resume()?
        };
        out_events.push(Event::PhaseChanged { phase });
        Ok(())
    }

    fn record_spawns(
        &mut self,
        accumulated: Duration,
        spawned: Option<EnemyBlueprint>,
        out_events: &mut Vec<Event>,
    ) {
        if self.clock.phase() != Phase::Playing {
            return;
        }
        self.spawn.accumulated = accumulated;

        let Some(blueprint) = spawned else {
            return;
        };
        if self.spawn.remaining == 0 {
            return;
        }
        let start = self.layout.start();
        let Some(position) = self.node_position(start) else {
            return;
        };

        self.spawn.remaining -= 1;
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.saturating_add(1);
        self.enemies.push(Enemy {
            id,
            archetype: blueprint.archetype,
            hit_points: blueprint.hit_points,
            max_hit_points: blueprint.hit_points,
            speed: blueprint.speed,
            current: start,
            next: None,
            progress: 0.0,
            position,
            reward: blueprint.reward,
        });
        debug!(enemy = id.get(), archetype = ?blueprint.archetype, "enemy spawned");
        out_events.push(Event::EnemySpawned {
            enemy: id,
            archetype: blueprint.archetype,
        });
    }

    fn escape_enemy(&mut self, enemy: EnemyId, out_events: &mut Vec<Event>) {
        let Some(index) = self.enemies.iter().position(|candidate| candidate.id == enemy) else {
            return;
        };
        let _ = self.enemies.remove(index);
        let exhausted = self.wallet.lose_life();
        out_events.push(Event::EnemyEscaped {
            enemy,
            lives_remaining: self.wallet.lives(),
        });

        if exhausted {
            self.clock.finish();
            info!(stage = self.stage, wave = self.wave, "game over");
            out_events.push(Event::PhaseChanged {
                phase: Phase::GameOver,
            });
            out_events.push(Event::GameOver {
                stage: self.stage,
                wave: self.wave,
            });
        }
    }

    fn fire_projectile(&mut self, tower: TowerId, target: EnemyId, out_events: &mut Vec<Event>) {
        if !self.enemies.iter().any(|enemy| enemy.id == target) {
            return;
        }
        let now = self.sim_time;
        let speed = self.rules.combat.projectile_speed;
        let Some(entry) = self.towers.get_mut(tower) else {
            return;
        };
        if !entry.is_ready(now) {
            return;
        }
        entry.last_fired = Some(now);

        let id = ProjectileId::new(self.next_projectile_id);
        self.next_projectile_id = self.next_projectile_id.saturating_add(1);
        self.projectiles.push(Projectile {
            id,
            tower,
            position: entry.position,
            target,
            speed,
            damage: entry.damage,
            area_radius: entry.area_radius,
        });
        out_events.push(Event::ProjectileFired {
            projectile: id,
            tower,
            target,
        });
    }

    fn resolve_impact(
        &mut self,
        projectile: ProjectileId,
        victims: &[EnemyId],
        out_events: &mut Vec<Event>,
    ) {
        let Some(index) = self.projectile_index(projectile) else {
            return;
        };
        let spent = self.projectiles.remove(index);
        let target_alive = self
            .enemies
            .iter()
            .any(|enemy| enemy.id == spent.target && enemy.is_alive());
        if !target_alive {
            return;
        }
        let damage = spent.damage;

        let mut bounty = 0u32;
        for &victim in victims {
            let Some(enemy) = self.enemy_mut(victim) else {
                continue;
            };
            if !enemy.is_alive() {
                continue;
            }
            enemy.hit_points = enemy.hit_points.saturating_sub(damage);
            if !enemy.is_alive() {
                let reward = enemy.reward;
                bounty = bounty.saturating_add(reward);
                out_events.push(Event::EnemyKilled {
                    enemy: victim,
                    reward,
                });
            }
        }

        self.wallet.credit(bounty);
        self.enemies.retain(Enemy::is_alive);
    }

    fn conclude_tick(&mut self, out_events: &mut Vec<Event>) {
        if self.clock.phase() != Phase::Playing {
            return;
        }
        if self.spawn.remaining > 0 || !self.enemies.is_empty() {
            return;
        }

        self.projectiles.clear();
        info!(stage = self.stage, wave = self.wave, "wave cleared");
        out_events.push(Event::WaveCleared {
            stage: self.stage,
            wave: self.wave,
        });
        if self.wave >= self.rules.clock.waves_per_stage {
            self.set_phase_countdown(Phase::StageTransition, out_events);
        } else {
            self.set_phase_countdown(Phase::WaveCountdown, out_events);
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands whose preconditions fail leave `state` unchanged and report a
/// rejection event where the command comes from an external caller.
pub fn apply(state: &mut GameState, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => state.tick(dt, out_events),
        Command::PlaceTower { node } => match state.place_tower(node) {
            Ok(tower) => out_events.push(Event::TowerPlaced { tower, node }),
            Err(reason) => {
                debug!(node = node.get(), %reason, "tower placement rejected");
                out_events.push(Event::TowerPlacementRejected { node, reason });
            }
        },
        Command::PlaceRoadBlock { node } => match state.place_road_block(node) {
            Ok(block) => out_events.push(Event::RoadBlockPlaced {
                node,
                expires_at: block.expires_at,
            }),
            Err(reason) => {
                debug!(node = node.get(), %reason, "road block rejected");
                out_events.push(Event::RoadBlockRejected { node, reason });
            }
        },
        Command::UpgradeTower {
            tower,
            specialization,
        } => match state.upgrade_tower(tower, specialization) {
            Ok(tier) => out_events.push(Event::TowerUpgraded {
                tower,
                specialization,
                tier,
            }),
            Err(reason) => {
                debug!(tower = tower.get(), %reason, "tower upgrade rejected");
                out_events.push(Event::TowerUpgradeRejected { tower, reason });
            }
        },
        Command::AdvanceWave => {
            if let Err(reason) = state.advance_wave(out_events) {
                debug!(%reason, "wave advance rejected");
                out_events.push(Event::PhaseCommandRejected { reason });
            }
        }
        Command::SetPaused { paused } => {
            if let Err(reason) = state.set_paused(paused, out_events) {
                debug!(paused, %reason, "pause toggle rejected");
                out_events.push(Event::PhaseCommandRejected { reason });
            }
        }
        Command::InstallStage { layout } => state.install_stage(layout, out_events),
        Command::RecordSpawns {
            accumulated,
            spawned,
        } => state.record_spawns(accumulated, spawned, out_events),
        Command::MoveEnemy {
            enemy,
            current,
            next,
            progress,
            position,
        } => {
            if state.clock.phase() != Phase::Playing {
                return;
            }
            if let Some(entry) = state.enemy_mut(enemy) {
                entry.current = current;
                entry.next = next;
                entry.progress = progress;
                entry.position = position;
            }
        }
        Command::EscapeEnemy { enemy } => {
            if state.clock.phase() == Phase::Playing {
                state.escape_enemy(enemy, out_events);
            }
        }
        Command::FireProjectile { tower, target } => {
            if state.clock.phase() == Phase::Playing {
                state.fire_projectile(tower, target, out_events);
            }
        }
        Command::MoveProjectile {
            projectile,
            position,
        } => {
            if let Some(index) = state.projectile_index(projectile) {
                state.projectiles[index].position = position;
            }
        }
        Command::DiscardProjectile { projectile } => {
            if let Some(index) = state.projectile_index(projectile) {
                let _ = state.projectiles.remove(index);
            }
        }
        Command::ResolveImpact {
            projectile,
            victims,
        } => {
            if state.clock.phase() == Phase::Playing {
                state.resolve_impact(projectile, &victims, out_events);
            }
        }
        Command::ConcludeTick => state.conclude_tick(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::GameState;
    use detour_defence_core::{
        Enemy, EnemyId, NodeId, Phase, Projectile, RoadBlock, Rules, SpawnLedger, StageLayout,
        Tower, TowerId,
    };

    /// Tuning the match was created with.
    #[must_use]
    pub fn rules(state: &GameState) -> &Rules {
        &state.rules
    }

    /// Road network of the current stage.
    #[must_use]
    pub fn layout(state: &GameState) -> &StageLayout {
        &state.layout
    }

    /// Active phase of the simulation clock.
    #[must_use]
    pub fn phase(state: &GameState) -> Phase {
        state.clock.phase()
    }

    /// Countdown remaining before the next wave; zero outside countdowns.
    #[must_use]
    pub fn countdown(state: &GameState) -> Duration {
        state.clock.countdown()
    }

    /// Monotonic simulation time.
    #[must_use]
    pub fn sim_time(state: &GameState) -> Duration {
        state.sim_time
    }

    /// Current balance.
    #[must_use]
    pub fn money(state: &GameState) -> u32 {
        state.wallet.money()
    }

    /// Lives remaining.
    #[must_use]
    pub fn lives(state: &GameState) -> u32 {
        state.wallet.lives()
    }

    /// Current stage number.
    #[must_use]
    pub fn stage(state: &GameState) -> u32 {
        state.stage
    }

    /// Current wave number within the stage; zero before the first wave.
    #[must_use]
    pub fn wave(state: &GameState) -> u32 {
        state.wave
    }

    /// Spawner bookkeeping for the current wave.
    #[must_use]
    pub fn spawn_ledger(state: &GameState) -> SpawnLedger {
        state.spawn
    }

    /// Live enemies in spawn order.
    #[must_use]
    pub fn enemies(state: &GameState) -> &[Enemy] {
        &state.enemies
    }

    /// Looks up a live enemy.
    #[must_use]
    pub fn enemy(state: &GameState, enemy: EnemyId) -> Option<&Enemy> {
        state.enemies.iter().find(|candidate| candidate.id == enemy)
    }

    /// Towers in identifier order.
    pub fn towers(state: &GameState) -> impl Iterator<Item = &Tower> {
        state.towers.iter()
    }

    /// Number of placed towers.
    #[must_use]
    pub fn tower_count(state: &GameState) -> usize {
        state.towers.len()
    }

    /// Looks up a tower.
    #[must_use]
    pub fn tower(state: &GameState, tower: TowerId) -> Option<&Tower> {
        state.towers.get(tower)
    }

    /// Tower standing on the provided node, if any.
    #[must_use]
    pub fn tower_at(state: &GameState, node: NodeId) -> Option<TowerId> {
        state.towers.at(node)
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectiles(state: &GameState) -> &[Projectile] {
        &state.projectiles
    }

    /// Active road blocks in node order.
    pub fn road_blocks(state: &GameState) -> impl Iterator<Item = &RoadBlock> {
        state.road_blocks.iter()
    }

    /// Reports whether a road block occupies the node.
    #[must_use]
    pub fn is_blocked(state: &GameState, node: NodeId) -> bool {
        state.road_blocks.contains(node)
    }
}
