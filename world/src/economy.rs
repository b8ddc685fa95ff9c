//! Money and lives bookkeeping.

use detour_defence_core::EconomyRules;

/// Player balances. Purchases that would overdraw are refused, never clamped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Wallet {
    money: u32,
    lives: u32,
}

impl Wallet {
    pub(crate) fn new(rules: &EconomyRules) -> Self {
        Self {
            money: rules.starting_money,
            lives: rules.starting_lives,
        }
    }

    pub(crate) fn money(&self) -> u32 {
        self.money
    }

    pub(crate) fn lives(&self) -> u32 {
        self.lives
    }

    pub(crate) fn can_afford(&self, cost: u32) -> bool {
        self.money >= cost
    }

    /// Deducts `cost`, returning `false` without side effects when unaffordable.
    pub(crate) fn spend(&mut self, cost: u32) -> bool {
        match self.money.checked_sub(cost) {
            Some(remaining) => {
                self.money = remaining;
                true
            }
            None => false,
        }
    }

    pub(crate) fn credit(&mut self, amount: u32) {
        self.money = self.money.saturating_add(amount);
    }

    /// Charges one life and reports whether none remain.
    pub(crate) fn lose_life(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        self.lives == 0
    }
}
