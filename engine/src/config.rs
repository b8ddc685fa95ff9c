use detour_defence_core::Rules;

/// Everything needed to reproduce a match.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Config {
    /// Seed for stage generation and spawn rolls.
    pub seed: u64,
    /// Tuning shared by the world and every system.
    pub rules: Rules,
}

impl Config {
    /// Default rules with the provided seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            rules: Rules::default(),
        }
    }
}
