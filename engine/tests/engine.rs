use std::time::Duration;

use detour_defence_core::{
    Event, NodeId, Phase, PhaseError, PlacementError, Rules, Specialization, TowerId,
};
use detour_defence_engine::{Config, Engine};
use detour_defence_world::{query, GameState};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const FRAME: Duration = Duration::from_millis(100);

fn first_land(state: &GameState) -> NodeId {
    query::layout(state)
        .nodes()
        .iter()
        .find(|node| !node.is_path)
        .map(|node| node.id)
        .expect("layout has buildable land")
}

fn first_road(state: &GameState) -> NodeId {
    let layout = query::layout(state);
    layout
        .nodes()
        .iter()
        .find(|node| node.is_path && node.id != layout.start() && node.id != layout.goal())
        .map(|node| node.id)
        .expect("layout has road")
}

fn quick_rules() -> Rules {
    let mut rules = Rules::default();
    rules.clock.waves_per_stage = 1;
    rules.economy.starting_lives = 1_000;
    rules.spawning.base_enemies = 1;
    rules.spawning.enemies_per_wave = 0;
    rules
}

#[test]
fn build_countdown_hands_over_to_the_first_wave() {
    let mut engine = Engine::new(Config::with_seed(7));
    let mut state = engine.init_match();
    assert_eq!(query::phase(&state), Phase::Build);
    assert_eq!(query::wave(&state), 0);

    for _ in 0..99 {
        state = engine.tick(state, FRAME);
    }
    assert_eq!(query::phase(&state), Phase::Build);

    state = engine.tick(state, FRAME);
    assert_eq!(query::phase(&state), Phase::Playing);
    assert_eq!(query::wave(&state), 1);
    assert_eq!(query::spawn_ledger(&state).remaining, 12);

    let mut spawned = 0;
    for _ in 0..120 {
        state = engine.tick(state, FRAME);
        spawned += engine
            .events()
            .iter()
            .filter(|event| matches!(event, Event::EnemySpawned { .. }))
            .count();
    }
    assert_eq!(spawned, 12);
    assert_eq!(query::spawn_ledger(&state).remaining, 0);
}

#[test]
fn tower_placement_charges_once() {
    let mut engine = Engine::new(Config::with_seed(3));
    let state = engine.init_match();
    let land = first_land(&state);

    let state = engine.place_tower(state, land);
    assert_eq!(query::money(&state), 700);
    assert_eq!(query::tower_count(&state), 1);

    let before = state.clone();
    let state = engine.place_tower(state, land);
    assert_eq!(state, before);
    assert_eq!(
        engine.events(),
        &[Event::TowerPlacementRejected {
            node: land,
            reason: PlacementError::Occupied,
        }]
    );

    let road = first_road(&state);
    let before = state.clone();
    let state = engine.place_tower(state, road);
    assert_eq!(state, before);
}

#[test]
fn road_blocks_lapse_after_their_lifetime() {
    let mut engine = Engine::new(Config::with_seed(11));
    let state = engine.init_match();
    let road = first_road(&state);

    let state = engine.place_road_block(state, road);
    assert_eq!(query::money(&state), 750);
    assert!(query::is_blocked(&state, road));

    let state = engine.tick(state, Duration::from_millis(4_999));
    assert!(query::is_blocked(&state, road));

    let state = engine.tick(state, Duration::from_millis(2));
    assert!(!query::is_blocked(&state, road));
    assert!(engine
        .events()
        .contains(&Event::RoadBlockExpired { node: road }));
}

#[test]
fn upgrades_follow_the_chosen_branch() {
    let mut engine = Engine::new(Config::with_seed(5));
    let state = engine.init_match();
    let land = first_land(&state);
    let state = engine.place_tower(state, land);
    let tower = query::tower_at(&state, land).expect("tower placed");

    let state = engine.upgrade_tower(state, tower, Specialization::Sniper);
    assert_eq!(query::money(&state), 500);
    let state = engine.upgrade_tower(state, tower, Specialization::Rapid);
    assert_eq!(query::money(&state), 500);
    let state = engine.upgrade_tower(state, tower, Specialization::Sniper);
    assert_eq!(query::money(&state), 100);

    let upgraded = query::tower(&state, tower).expect("tower exists");
    assert_eq!(upgraded.tier.get(), 3);
    assert_eq!(upgraded.damage, 90);

    let before = state.clone();
    let state = engine.upgrade_tower(state, tower, Specialization::Sniper);
    assert_eq!(state, before);
}

#[test]
fn cleared_stage_moves_to_a_fresh_layout() {
    let mut engine = Engine::new(Config {
        seed: 21,
        rules: quick_rules(),
    });
    let state = engine.init_match();
    let land = first_land(&state);
    let state = engine.place_tower(state, land);
    let mut state = engine.advance_wave(state);
    assert_eq!(query::phase(&state), Phase::Playing);

    let mut transitions = 0;
    for _ in 0..2_000 {
        state = engine.tick(state, FRAME);
        if query::phase(&state) == Phase::StageTransition {
            transitions += 1;
            break;
        }
    }
    assert_eq!(transitions, 1, "stage never finished");
    assert_eq!(query::stage(&state), 1);

    let mut stage_started = false;
    for _ in 0..100 {
        state = engine.tick(state, FRAME);
        if engine
            .events()
            .contains(&Event::StageStarted { stage: 2 })
        {
            stage_started = true;
            break;
        }
    }
    assert!(stage_started);
    assert_eq!(query::stage(&state), 2);
    assert_eq!(query::layout(&state).stage(), 2);
    assert_eq!(query::wave(&state), 1);
    assert_eq!(query::phase(&state), Phase::Playing);
    assert_eq!(query::money(&state), 800);
    assert_eq!(query::tower_count(&state), 0);
}

#[test]
fn full_stage_of_waves_resets_the_board() {
    let mut rules = Rules::default();
    rules.spawning.base_enemies = 1;
    rules.spawning.enemies_per_wave = 0;
    assert_eq!(rules.clock.waves_per_stage, 5);
    let mut engine = Engine::new(Config { seed: 13, rules });
    let state = engine.init_match();
    let land = first_land(&state);
    let state = engine.place_tower(state, land);
    assert_eq!(query::tower_count(&state), 1);
    let mut state = engine.advance_wave(state);

    let mut cleared = Vec::new();
    for _ in 0..10_000 {
        state = engine.tick(state, FRAME);
        for event in engine.events() {
            if let Event::WaveCleared { wave, .. } = event {
                cleared.push(*wave);
            }
        }
        match query::phase(&state) {
            Phase::StageTransition => break,
            Phase::WaveCountdown => assert!(query::wave(&state) < 5),
            _ => {}
        }
    }
    assert_eq!(query::phase(&state), Phase::StageTransition);
    assert_eq!(cleared, vec![1, 2, 3, 4, 5]);
    assert_eq!(query::stage(&state), 1);
    assert_eq!(query::wave(&state), 5);
    assert_eq!(query::tower_count(&state), 1);

    // Spend most of the build countdown so the block outlives the stage.
    for _ in 0..60 {
        state = engine.tick(state, FRAME);
    }
    assert_eq!(query::phase(&state), Phase::StageTransition);
    let road = first_road(&state);
    let mut state = engine.place_road_block(state, road);
    assert!(query::is_blocked(&state, road));
    assert!(query::money(&state) < 800);

    let mut stage_started = false;
    for _ in 0..100 {
        state = engine.tick(state, FRAME);
        if engine
            .events()
            .contains(&Event::StageStarted { stage: 2 })
        {
            stage_started = true;
            break;
        }
    }
    assert!(stage_started);
    assert!(!engine
        .events()
        .iter()
        .any(|event| matches!(event, Event::RoadBlockExpired { .. })));
    assert_eq!(query::stage(&state), 2);
    assert_eq!(query::wave(&state), 1);
    assert_eq!(query::phase(&state), Phase::Playing);
    assert_eq!(query::tower_count(&state), 0);
    assert!(query::enemies(&state).is_empty());
    assert!(query::projectiles(&state).is_empty());
    assert_eq!(query::road_blocks(&state).count(), 0);
    assert_eq!(query::money(&state), 800);
    assert_eq!(query::lives(&state), 20);
}

#[test]
fn advancing_a_transition_installs_the_next_stage_at_once() {
    let mut engine = Engine::new(Config {
        seed: 4,
        rules: quick_rules(),
    });
    let state = engine.init_match();
    let mut state = engine.advance_wave(state);
    for _ in 0..2_000 {
        state = engine.tick(state, FRAME);
        if query::phase(&state) == Phase::StageTransition {
            break;
        }
    }
    assert_eq!(query::phase(&state), Phase::StageTransition);

    let state = engine.advance_wave(state);
    assert_eq!(query::stage(&state), 2);
    assert_eq!(query::phase(&state), Phase::Playing);
    assert!(engine
        .events()
        .contains(&Event::StageLayoutRequired { stage: 2 }));
}

#[test]
fn last_life_ends_the_match() {
    let mut rules = Rules::default();
    rules.economy.starting_lives = 1;
    let mut engine = Engine::new(Config { seed: 9, rules });
    let state = engine.init_match();
    let mut state = engine.advance_wave(state);

    let mut game_over = false;
    for _ in 0..1_000 {
        state = engine.tick(state, FRAME);
        if engine
            .events()
            .iter()
            .any(|event| matches!(event, Event::GameOver { .. }))
        {
            game_over = true;
            break;
        }
    }
    assert!(game_over);
    assert_eq!(query::phase(&state), Phase::GameOver);
    assert_eq!(query::lives(&state), 0);

    let frozen = state.clone();
    let state = engine.tick(state, FRAME);
    assert_eq!(state, frozen);
    let land = first_land(&state);
    let state = engine.place_tower(state, land);
    assert_eq!(state, frozen);
    let state = engine.set_paused(state, true);
    assert_eq!(state, frozen);
    assert_eq!(
        engine.events(),
        &[Event::PhaseCommandRejected {
            reason: PhaseError::MatchOver,
        }]
    );
}

#[test]
fn pause_freezes_the_whole_simulation() {
    let mut engine = Engine::new(Config::with_seed(2));
    let state = engine.init_match();
    let mut state = engine.advance_wave(state);
    for _ in 0..30 {
        state = engine.tick(state, FRAME);
    }

    let state = engine.set_paused(state, true);
    assert_eq!(query::phase(&state), Phase::Paused);
    let frozen = state.clone();
    let mut state = state;
    for _ in 0..20 {
        state = engine.tick(state, FRAME);
    }
    assert_eq!(state, frozen);

    let state = engine.set_paused(state, false);
    assert_eq!(query::phase(&state), Phase::Playing);
    let resumed = engine.tick(state, FRAME);
    assert!(query::sim_time(&resumed) > query::sim_time(&frozen));
}

fn scripted_run(seed: u64) -> (GameState, Vec<Event>) {
    let mut engine = Engine::new(Config::with_seed(seed));
    let mut state = engine.init_match();
    let layout = query::layout(&state);
    let start = layout.node(layout.start()).expect("start node").position;
    let mut land: Vec<_> = layout.nodes().iter().filter(|node| !node.is_path).collect();
    land.sort_by(|a, b| {
        a.position
            .distance_squared(start)
            .total_cmp(&b.position.distance_squared(start))
            .then(a.id.cmp(&b.id))
    });
    let land: Vec<NodeId> = land.iter().take(3).map(|node| node.id).collect();
    for node in land {
        state = engine.place_tower(state, node);
    }
    state = engine.advance_wave(state);

    let mut log = Vec::new();
    for _ in 0..600 {
        state = engine.tick(state, FRAME);
        log.extend(engine.events().iter().cloned());
    }
    (state, log)
}

#[test]
fn identical_seeds_replay_identically() {
    let (first_state, first_log) = scripted_run(42);
    let (second_state, second_log) = scripted_run(42);
    assert_eq!(first_state, second_state);
    assert_eq!(first_log, second_log);
    assert!(first_log
        .iter()
        .any(|event| matches!(event, Event::ProjectileFired { .. })));

    let (other_state, _) = scripted_run(43);
    assert_ne!(query::layout(&first_state), query::layout(&other_state));
}

#[test]
fn random_command_streams_keep_the_state_consistent() {
    for seed in 0..8u64 {
        let mut script = ChaCha8Rng::seed_from_u64(seed);
        let mut engine = Engine::new(Config::with_seed(seed));
        let mut state = engine.init_match();
        let starting_lives = query::lives(&state);

        for _ in 0..400 {
            let node_count = query::layout(&state).nodes().len() as u32;
            let before = state.clone();
            state = match script.gen_range(0..10) {
                0 => engine.place_tower(state, NodeId::new(script.gen_range(0..node_count + 2))),
                1 => {
                    engine.place_road_block(state, NodeId::new(script.gen_range(0..node_count)))
                }
                2 => {
                    let specialization = match script.gen_range(0..3) {
                        0 => Specialization::Rapid,
                        1 => Specialization::Sniper,
                        _ => Specialization::Splash,
                    };
                    engine.upgrade_tower(state, TowerId::new(script.gen_range(0..6)), specialization)
                }
                3 => engine.advance_wave(state),
                4 => engine.set_paused(state, script.gen_bool(0.5)),
                _ => engine.tick(state, Duration::from_millis(script.gen_range(0..300))),
            };

            let rejected = engine.events().iter().any(|event| {
                matches!(
                    event,
                    Event::TowerPlacementRejected { .. }
                        | Event::RoadBlockRejected { .. }
                        | Event::TowerUpgradeRejected { .. }
                        | Event::PhaseCommandRejected { .. }
                )
            });
            if rejected {
                assert_eq!(state, before);
            }

            assert!(query::lives(&state) <= starting_lives);
            assert!(query::sim_time(&state) >= query::sim_time(&before));
            let layout = query::layout(&state);
            for enemy in query::enemies(&state) {
                assert!(enemy.is_alive());
                assert!(enemy.progress >= 0.0 && enemy.progress < 1.0);
                assert!(layout.is_walkable(enemy.current));
            }
            for tower in query::towers(&state) {
                assert!(!layout.is_walkable(tower.node));
            }
        }
    }
}
