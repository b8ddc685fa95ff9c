use std::fmt;

use detour_defence_core::{Event, Phase};
use detour_defence_world::{query, GameState};
use serde::Serialize;

/// Running counts gathered from engine events.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    kills: u32,
    escapes: u32,
    waves_cleared: u32,
}

impl Tally {
    pub(crate) fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemyKilled { .. } => self.kills += 1,
                Event::EnemyEscaped { .. } => self.escapes += 1,
                Event::WaveCleared { .. } => self.waves_cleared += 1,
                _ => {}
            }
        }
    }
}

/// End-of-run report.
#[derive(Debug, Serialize)]
pub(crate) struct Summary {
    seed: u64,
    phase: Phase,
    stage: u32,
    wave: u32,
    money: u32,
    lives: u32,
    kills: u32,
    escapes: u32,
    waves_cleared: u32,
    towers: usize,
    sim_time_ms: u128,
}

impl Summary {
    pub(crate) fn new(seed: u64, state: &GameState, tally: &Tally) -> Self {
        Self {
            seed,
            phase: query::phase(state),
            stage: query::stage(state),
            wave: query::wave(state),
            money: query::money(state),
            lives: query::lives(state),
            kills: tally.kills,
            escapes: tally.escapes,
            waves_cleared: tally.waves_cleared,
            towers: query::tower_count(state),
            sim_time_ms: query::sim_time(state).as_millis(),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "seed {} after {} ms ({:?})", self.seed, self.sim_time_ms, self.phase)?;
        writeln!(f, "stage {} wave {}", self.stage, self.wave)?;
        writeln!(f, "money {} lives {}", self.money, self.lives)?;
        writeln!(
            f,
            "kills {} escapes {} waves cleared {}",
            self.kills, self.escapes, self.waves_cleared
        )?;
        write!(f, "towers {}", self.towers)
    }
}
