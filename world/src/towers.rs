//! Authoritative tower state and tier progression.

use std::collections::BTreeMap;

use detour_defence_core::{
    NodeId, Specialization, Tower, TowerId, TowerProfile, TowerTier, UpgradeError,
};
use glam::Vec2;

use crate::economy::Wallet;

/// Registry that stores towers and manages identifier allocation.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, Tower>,
    by_node: BTreeMap<NodeId, TowerId>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            by_node: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    pub(crate) fn get(&self, tower: TowerId) -> Option<&Tower> {
        self.entries.get(&tower)
    }

    pub(crate) fn get_mut(&mut self, tower: TowerId) -> Option<&mut Tower> {
        self.entries.get_mut(&tower)
    }

    pub(crate) fn at(&self, node: NodeId) -> Option<TowerId> {
        self.by_node.get(&node).copied()
    }

    /// Towers in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Tower> {
        self.entries.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Builds a tier-1 tower; the caller has already validated the node.
    pub(crate) fn build(&mut self, node: NodeId, position: Vec2) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(id, Tower::basic(id, node, position));
        let _ = self.by_node.insert(node, id);
        id
    }

    /// Advances a tower one tier along `specialization`, paying from `wallet`.
    ///
    /// Nothing changes when the upgrade is refused.
    pub(crate) fn upgrade(
        &mut self,
        tower: TowerId,
        specialization: Specialization,
        wallet: &mut Wallet,
    ) -> Result<TowerTier, UpgradeError> {
        let entry = self
            .entries
            .get_mut(&tower)
            .ok_or(UpgradeError::MissingTower)?;
        let tier = entry.tier.next().ok_or(UpgradeError::MaxTier)?;
        if entry
            .specialization
            .is_some_and(|locked| locked != specialization)
        {
            return Err(UpgradeError::SpecializationLocked);
        }
        let profile =
            TowerProfile::specialized(specialization, tier).ok_or(UpgradeError::MaxTier)?;
        if !wallet.spend(profile.cost) {
            return Err(UpgradeError::InsufficientFunds);
        }

        entry.tier = tier;
        entry.specialization = Some(specialization);
        entry.apply_profile(&profile);
        Ok(tier)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.by_node.clear();
    }
}
