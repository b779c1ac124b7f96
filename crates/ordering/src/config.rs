//! Ordering service configuration.

use conclave_types::Round;
use serde::{Deserialize, Serialize};

/// Configuration for the ordering service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderingConfig {
    /// Maximum number of transactions drained into one emitted proposal.
    /// Whatever is left in the round's queue beyond this is discarded.
    pub transaction_limit: usize,

    /// Proposal cache capacity. Once more proposals than this have been
    /// emitted, the eldest are evicted in emission order.
    pub number_of_proposals: usize,

    /// The round the service starts packing from.
    pub initial_round: Round,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            transaction_limit: 100,
            number_of_proposals: 16,
            initial_round: Round::first(1),
        }
    }
}

impl OrderingConfig {
    /// Set the per-proposal transaction limit.
    pub fn with_transaction_limit(mut self, limit: usize) -> Self {
        self.transaction_limit = limit;
        self
    }

    /// Set the proposal cache capacity.
    pub fn with_number_of_proposals(mut self, count: usize) -> Self {
        self.number_of_proposals = count;
        self
    }

    /// Set the starting round.
    pub fn with_initial_round(mut self, round: Round) -> Self {
        self.initial_round = round;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_pattern() {
        let config = OrderingConfig::default()
            .with_transaction_limit(5)
            .with_number_of_proposals(2)
            .with_initial_round(Round::first(3));

        assert_eq!(config.transaction_limit, 5);
        assert_eq!(config.number_of_proposals, 2);
        assert_eq!(config.initial_round, Round::new(3, 1));
    }
}
