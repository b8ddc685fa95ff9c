use std::time::Duration;

use detour_defence_core::{Command, EnemyArchetype, Event, Phase, Rules, SpawnLedger};
use detour_defence_system_graph_generation::GraphGeneration;
use detour_defence_system_spawning::Spawning;
use detour_defence_world::{self as world, query, GameState};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn playing_match(seed: u64) -> (GameState, ChaCha8Rng) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let layout = GraphGeneration::default().generate(1, &mut rng);
    let mut state = GameState::new(Rules::default(), layout);
    let mut events = Vec::new();
    world::apply(&mut state, Command::AdvanceWave, &mut events);
    assert_eq!(query::phase(&state), Phase::Playing);
    (state, rng)
}

/// Advances the match by one tick and runs the spawner; returns spawns.
fn step(state: &mut GameState, spawning: &Spawning, rng: &mut ChaCha8Rng, dt_ms: u64) -> usize {
    let mut events = Vec::new();
    world::apply(
        state,
        Command::Tick {
            dt: Duration::from_millis(dt_ms),
        },
        &mut events,
    );

    let mut commands = Vec::new();
    spawning.handle(
        &events,
        query::phase(state),
        query::spawn_ledger(state),
        query::stage(state),
        query::wave(state),
        rng,
        &mut commands,
    );

    events.clear();
    for command in commands {
        world::apply(state, command, &mut events);
    }
    events
        .iter()
        .filter(|event| matches!(event, Event::EnemySpawned { .. }))
        .count()
}

#[test]
fn spawns_once_the_interval_is_exceeded() {
    let (mut state, mut rng) = playing_match(3);
    let spawning = Spawning::default();

    let mut spawn_ticks = Vec::new();
    for tick in 1..=27 {
        if step(&mut state, &spawning, &mut rng, 100) > 0 {
            spawn_ticks.push(tick);
        }
    }

    assert_eq!(spawn_ticks, vec![9, 18, 27]);
    assert_eq!(query::enemies(&state).len(), 3);
    assert_eq!(query::spawn_ledger(&state).remaining, 9);
    let start = query::layout(&state).start();
    assert!(query::enemies(&state)
        .iter()
        .all(|enemy| enemy.current == start && enemy.hit_points == enemy.max_hit_points));
}

#[test]
fn reaching_the_interval_exactly_is_not_enough() {
    let (mut state, mut rng) = playing_match(4);
    let spawning = Spawning::default();

    assert_eq!(step(&mut state, &spawning, &mut rng, 800), 0);
    assert_eq!(
        query::spawn_ledger(&state).accumulated,
        Duration::from_millis(800)
    );
    assert_eq!(step(&mut state, &spawning, &mut rng, 1), 1);
    assert_eq!(query::spawn_ledger(&state).accumulated, Duration::ZERO);
}

#[test]
fn long_frames_release_a_single_enemy() {
    let (mut state, mut rng) = playing_match(5);
    let spawning = Spawning::default();

    assert_eq!(step(&mut state, &spawning, &mut rng, 10_000), 1);
    assert_eq!(query::spawn_ledger(&state).remaining, 11);
}

#[test]
fn exhausted_wave_stops_spawning() {
    let (mut state, mut rng) = playing_match(6);
    let spawning = Spawning::default();

    let mut spawned = 0;
    for _ in 0..40 {
        spawned += step(&mut state, &spawning, &mut rng, 1_000);
    }
    assert_eq!(spawned, 12);
    assert_eq!(query::spawn_ledger(&state).remaining, 0);
}

#[test]
fn silent_outside_playing_phase() {
    let spawning = Spawning::default();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let ledger = SpawnLedger {
        remaining: 5,
        accumulated: Duration::from_millis(799),
    };
    let events = [Event::TimeAdvanced {
        dt: Duration::from_millis(500),
    }];

    let mut commands = Vec::new();
    for phase in [
        Phase::Build,
        Phase::WaveCountdown,
        Phase::StageTransition,
        Phase::Paused,
        Phase::GameOver,
    ] {
        spawning.handle(&events, phase, ledger, 1, 1, &mut rng, &mut commands);
    }
    spawning.handle(&[], Phase::Playing, ledger, 1, 1, &mut rng, &mut commands);
    assert!(commands.is_empty());
}

fn archetype_counts(stage: u32, wave: u32) -> [usize; 4] {
    let spawning = Spawning::default();
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
    let mut counts = [0usize; 4];
    for _ in 0..2_000 {
        let slot = match spawning.blueprint(stage, wave, &mut rng).archetype {
            EnemyArchetype::Light => 0,
            EnemyArchetype::Standard => 1,
            EnemyArchetype::Heavy => 2,
            EnemyArchetype::Stealth => 3,
        };
        counts[slot] += 1;
    }
    counts
}

#[test]
fn early_waves_only_roll_light_and_standard() {
    let [light, standard, heavy, stealth] = archetype_counts(1, 1);
    assert_eq!(heavy, 0);
    assert_eq!(stealth, 0);
    assert!(light > 250 && light < 550, "light share {light}");
    assert!(standard > light);
}

#[test]
fn heavy_enemies_join_periodic_waves() {
    let [_, _, heavy, stealth] = archetype_counts(2, 3);
    assert_eq!(stealth, 0);
    assert!(heavy > 450 && heavy < 750, "heavy share {heavy}");
    let [_, _, heavy, _] = archetype_counts(2, 4);
    assert_eq!(heavy, 0);
}

#[test]
fn stealth_enemies_unlock_on_later_stages() {
    let [_, _, _, stealth] = archetype_counts(3, 1);
    assert!(stealth > 100 && stealth < 300, "stealth share {stealth}");
}

#[test]
fn blueprints_scale_hit_points_but_not_speed_or_reward() {
    let spawning = Spawning::default();
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    for _ in 0..200 {
        let blueprint = spawning.blueprint(4, 5, &mut rng);
        let stats = blueprint.archetype.stats();
        assert!(blueprint.hit_points > stats.hit_points);
        assert_eq!(blueprint.speed, stats.speed);
        assert_eq!(blueprint.reward, stats.reward);
    }
}

#[test]
fn same_seed_replays_identically() {
    let run = |seed| {
        let (mut state, mut rng) = playing_match(seed);
        let spawning = Spawning::default();
        for _ in 0..40 {
            let _ = step(&mut state, &spawning, &mut rng, 250);
        }
        query::enemies(&state)
            .iter()
            .map(|enemy| (enemy.id, enemy.archetype, enemy.hit_points))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(77), run(77));
}
