use std::collections::{BTreeMap, BTreeSet};

use crate::chains::Chain;

/// GG20 rounds hosted on Arbitrum.
pub const GG20_ARBITRUM_ROUNDS: &[u64] = &[23, 24, 25, 26, 27, 28, 29, 31];
/// GG20 rounds hosted on Optimism.
pub const GG20_OPTIMISM_ROUNDS: &[u64] = &[9];

/// Destination chain id -> round ids that count towards the program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundEligibilityTable {
    rounds: BTreeMap<u64, BTreeSet<u64>>,
}

impl RoundEligibilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gg20() -> Self {
        Self::new()
            .with_rounds(Chain::Arbitrum.id(), GG20_ARBITRUM_ROUNDS.iter().copied())
            .with_rounds(Chain::Optimism.id(), GG20_OPTIMISM_ROUNDS.iter().copied())
    }

    pub fn with_rounds(mut self, chain_id: u64, rounds: impl IntoIterator<Item = u64>) -> Self {
        self.rounds.entry(chain_id).or_default().extend(rounds);
        self
    }

    pub fn is_eligible(&self, destination_chain_id: u64, round_id: u64) -> bool {
        self.rounds
            .get(&destination_chain_id)
            .is_some_and(|rounds| rounds.contains(&round_id))
    }

    pub fn chains(&self) -> impl Iterator<Item = u64> + '_ {
        self.rounds.keys().copied()
    }
}
