//! Scripted player used by `--auto-build`.
//!
//! During build and wave countdowns it fills the land cells that border the
//! most road, then spends the remainder on upgrades. It only issues engine
//! commands and learns the outcome from the reported events.

use detour_defence_core::{
    Event, GridCoord, NodeId, Phase, Specialization, StageLayout, TowerId, TowerTier,
};
use detour_defence_engine::Engine;
use detour_defence_world::{query, GameState};

const TOWER_CAP: usize = 6;
const BRANCHES: [Specialization; 3] = [
    Specialization::Rapid,
    Specialization::Sniper,
    Specialization::Splash,
];

#[derive(Debug, Default)]
pub(crate) struct AutoBuilder {
    stage: Option<u32>,
    candidates: Vec<NodeId>,
}

impl AutoBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Spends money on towers and upgrades while a countdown is running.
    pub(crate) fn act(&mut self, engine: &mut Engine, mut state: GameState) -> GameState {
        if !matches!(query::phase(&state), Phase::Build | Phase::WaveCountdown) {
            return state;
        }

        let stage = query::stage(&state);
        if self.stage != Some(stage) {
            self.candidates = rank_sites(query::layout(&state));
            self.stage = Some(stage);
        }

        while query::tower_count(&state) < TOWER_CAP {
            let Some(node) = self
                .candidates
                .iter()
                .copied()
                .find(|&node| query::tower_at(&state, node).is_none())
            else {
                break;
            };
            state = engine.place_tower(state, node);
            if !reported(engine, |event| matches!(event, Event::TowerPlaced { .. })) {
                return state;
            }
        }

        let mut pending: Vec<(TowerId, TowerTier, Specialization)> = query::towers(&state)
            .filter(|tower| tower.tier < TowerTier::MAX)
            .map(|tower| {
                let branch = tower
                    .specialization
                    .unwrap_or(BRANCHES[tower.id.get() as usize % BRANCHES.len()]);
                (tower.id, tower.tier, branch)
            })
            .collect();
        pending.sort_by_key(|&(id, tier, _)| (tier, id));

        for (tower, _, branch) in pending {
            state = engine.upgrade_tower(state, tower, branch);
            if !reported(engine, |event| matches!(event, Event::TowerUpgraded { .. })) {
                break;
            }
        }
        state
    }
}

fn reported(engine: &Engine, predicate: impl Fn(&Event) -> bool) -> bool {
    engine.events().iter().any(predicate)
}

/// Land nodes bordering at least one road cell, most road first.
fn rank_sites(layout: &StageLayout) -> Vec<NodeId> {
    let mut scored: Vec<(usize, NodeId)> = layout
        .nodes()
        .iter()
        .filter(|node| !node.is_path)
        .map(|node| (road_neighbours(layout, node.cell), node.id))
        .filter(|&(score, _)| score > 0)
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    scored.into_iter().map(|(_, node)| node).collect()
}

fn road_neighbours(layout: &StageLayout, cell: GridCoord) -> usize {
    let mut count = 0;
    for dy in -1i64..=1 {
        for dx in -1i64..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let column = i64::from(cell.column()) + dx;
            let row = i64::from(cell.row()) + dy;
            let (Ok(column), Ok(row)) = (u32::try_from(column), u32::try_from(row)) else {
                continue;
            };
            if layout
                .node_at(GridCoord::new(column, row))
                .is_some_and(|node| node.is_path)
            {
                count += 1;
            }
        }
    }
    count
}
