#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame-driven orchestration of the Detour Defence simulation.
//!
//! [`Engine`] owns the seeded random stream and every system's scratch
//! buffers. Each entry point takes a [`GameState`] by value, feeds it through
//! `world::apply` and the systems in a fixed order, and hands the next state
//! back. Rejected commands return the state unchanged; the rejection is only
//! visible through [`Engine::events`].

use std::time::Duration;

use detour_defence_core::{Command, Event, NodeId, Specialization, TowerId, TowerTarget};
use detour_defence_system_graph_generation::GraphGeneration;
use detour_defence_system_movement::Movement;
use detour_defence_system_pathfinding::Pathfinding;
use detour_defence_system_spawning::Spawning;
use detour_defence_system_tower_combat::TowerCombat;
use detour_defence_system_tower_targeting::TowerTargeting;
use detour_defence_world::{self as world, query, GameState};
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, error, info, warn};

mod config;

pub use config::Config;

/// Runs matches deterministically for a given [`Config`].
#[derive(Debug)]
pub struct Engine {
    config: Config,
    rng: ChaCha8Rng,
    generation: GraphGeneration,
    pathfinding: Pathfinding,
    spawning: Spawning,
    movement: Movement,
    targeting: TowerTargeting,
    combat: TowerCombat,
    tower_positions: Vec<Vec2>,
    targets: Vec<TowerTarget>,
    commands: Vec<Command>,
    tick_events: Vec<Event>,
    events: Vec<Event>,
}

impl Engine {
    /// Creates an engine whose systems follow `config.rules`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            generation: GraphGeneration::new(config.rules.grid.clone()),
            pathfinding: Pathfinding::new(),
            spawning: Spawning::new(config.rules.spawning.clone()),
            movement: Movement::new(),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            tower_positions: Vec::new(),
            targets: Vec::new(),
            commands: Vec::new(),
            tick_events: Vec::new(),
            events: Vec::new(),
            config,
        }
    }

    /// Configuration the engine was created with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Events reported by the most recent call.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Reseeds the random stream and produces a fresh match on a stage 1
    /// layout, waiting in the build phase.
    pub fn init_match(&mut self) -> GameState {
        self.events.clear();
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let layout = self.generation.generate(1, &mut self.rng);
        info!(
            seed = self.config.seed,
            warp = layout.warp().is_some(),
            "match initialised"
        );
        GameState::new(self.config.rules.clone(), layout)
    }

    /// Advances the simulation by `dt`.
    ///
    /// Countdown phases only move the clock. While enemies are in play the
    /// systems run in order: spawning, routing, movement, targeting and
    /// combat, then the wave completion check.
    pub fn tick(&mut self, mut state: GameState, dt: Duration) -> GameState {
        self.events.clear();
        self.tick_events.clear();
        world::apply(&mut state, Command::Tick { dt }, &mut self.tick_events);
        self.events.extend(self.tick_events.iter().cloned());

        let advanced = self
            .tick_events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }));
        if advanced {
            self.run_systems(&mut state);
        }

        self.install_requested_stage(&mut state);
        state
    }

    /// Builds a tier-1 tower on a buildable node.
    pub fn place_tower(&mut self, state: GameState, node: NodeId) -> GameState {
        self.submit(state, Command::PlaceTower { node })
    }

    /// Drops a temporary road block on a walkable node.
    pub fn place_road_block(&mut self, state: GameState, node: NodeId) -> GameState {
        self.submit(state, Command::PlaceRoadBlock { node })
    }

    /// Upgrades a tower one tier along `specialization`.
    pub fn upgrade_tower(
        &mut self,
        state: GameState,
        tower: TowerId,
        specialization: Specialization,
    ) -> GameState {
        self.submit(
            state,
            Command::UpgradeTower {
                tower,
                specialization,
            },
        )
    }

    /// Skips the running countdown.
    pub fn advance_wave(&mut self, state: GameState) -> GameState {
        self.submit(state, Command::AdvanceWave)
    }

    /// Freezes or resumes the simulation.
    pub fn set_paused(&mut self, state: GameState, paused: bool) -> GameState {
        self.submit(state, Command::SetPaused { paused })
    }

    fn submit(&mut self, mut state: GameState, command: Command) -> GameState {
        self.events.clear();
        world::apply(&mut state, command, &mut self.events);
        self.install_requested_stage(&mut state);
        state
    }

    fn run_systems(&mut self, state: &mut GameState) {
        self.spawning.handle(
            &self.tick_events,
            query::phase(state),
            query::spawn_ledger(state),
            query::stage(state),
            query::wave(state),
            &mut self.rng,
            &mut self.commands,
        );
        self.flush(state);

        self.tower_positions.clear();
        self.tower_positions
            .extend(query::towers(state).map(|tower| tower.position));
        let routes = self.pathfinding.handle(
            query::layout(state),
            &query::rules(state).congestion,
            &self.tower_positions,
            |node| query::is_blocked(state, node),
        );
        match routes {
            Ok(routes) => {
                if routes.has_negative_cycle() {
                    warn!(
                        stage = query::stage(state),
                        "negative cycle reaches the goal; routing with relaxed predecessors"
                    );
                }
                self.movement.handle(
                    &self.tick_events,
                    query::phase(state),
                    query::enemies(state),
                    query::layout(state),
                    |node| routes.next_hop(node),
                    |node| query::is_blocked(state, node),
                    &mut self.commands,
                );
                self.flush(state);
            }
            Err(err) => error!(error = %err, "routing failed; enemies hold position"),
        }

        self.targeting.handle(
            query::phase(state),
            query::sim_time(state),
            query::towers(state),
            query::enemies(state),
            &mut self.targets,
        );
        self.combat.handle(
            &self.tick_events,
            query::phase(state),
            &query::rules(state).combat,
            &self.targets,
            query::projectiles(state),
            query::enemies(state),
            &mut self.commands,
        );
        self.flush(state);

        world::apply(state, Command::ConcludeTick, &mut self.events);
    }

    fn flush(&mut self, state: &mut GameState) {
        for command in self.commands.drain(..) {
            world::apply(state, command, &mut self.events);
        }
    }

    fn install_requested_stage(&mut self, state: &mut GameState) {
        let requested = self.events.iter().find_map(|event| match event {
            Event::StageLayoutRequired { stage } => Some(*stage),
            _ => None,
        });
        let Some(stage) = requested else {
            return;
        };

        let layout = self.generation.generate(stage, &mut self.rng);
        debug!(stage, warp = layout.warp().is_some(), "stage layout generated");
        world::apply(state, Command::InstallStage { layout }, &mut self.events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use detour_defence_core::Phase;

    #[test]
    fn init_match_is_reproducible() {
        let mut engine = Engine::new(Config::default());
        let first = engine.init_match();
        let _ = engine.tick(first.clone(), Duration::from_secs(1));
        let second = engine.init_match();
        assert_eq!(first, second);
        assert_eq!(query::phase(&second), Phase::Build);
        assert_eq!(query::stage(&second), 1);
    }

    #[test]
    fn countdown_ticks_skip_the_systems() {
        let mut engine = Engine::new(Config::default());
        let state = engine.init_match();
        let state = engine.tick(state, Duration::from_millis(500));
        assert!(engine.events().is_empty());
        assert_eq!(query::countdown(&state), Duration::from_millis(9_500));
        assert!(query::enemies(&state).is_empty());
    }
}
