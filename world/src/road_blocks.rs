//! Time-limited obstacles placed on the road.

use std::{collections::BTreeMap, time::Duration};

use detour_defence_core::{NodeId, RoadBlock};

/// Registry holding at most one road block per node.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct RoadBlockRegistry {
    entries: BTreeMap<NodeId, RoadBlock>,
}

impl RoadBlockRegistry {
    pub(crate) fn contains(&self, node: NodeId) -> bool {
        self.entries.contains_key(&node)
    }

    pub(crate) fn insert(&mut self, block: RoadBlock) {
        let _ = self.entries.insert(block.node, block);
    }

    /// Removes every block whose deadline has passed, returning their nodes.
    pub(crate) fn expire(&mut self, now: Duration) -> Vec<NodeId> {
        let expired: Vec<NodeId> = self
            .entries
            .values()
            .filter(|block| block.is_expired(now))
            .map(|block| block.node)
            .collect();
        for node in &expired {
            let _ = self.entries.remove(node);
        }
        expired
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &RoadBlock> {
        self.entries.values()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
