//! Events, votes and outcomes flowing through the pipeline.

use conclave_types::{Proposal, Round};
use std::sync::Arc;

/// Input events driving the round state machine.
///
/// Exactly one of these is produced per agreement attempt by whatever
/// observes the block store: a block landed, or the round came up empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEvent {
    /// A block was committed at the given height. The next round targets
    /// the following height, first attempt.
    Block { height: u64 },

    /// The previous round produced no block; retry at the same height with
    /// the next reject index.
    Empty,
}

/// A peer's local candidate for a round.
///
/// An absent proposal means "I observed no proposal for this round" and is
/// a legitimate vote, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub round: Round,
    pub proposal: Option<Arc<Proposal>>,
}

/// Agreement result for one round, lifted back to proposal level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The cluster agreed on a candidate. The proposal is absent when the
    /// agreed candidate was the empty one.
    Commit {
        proposal: Option<Arc<Proposal>>,
        round: Round,
    },

    /// No agreement was reached for the round.
    Reject { round: Round },
}

impl Outcome {
    pub fn round(&self) -> Round {
        match self {
            Outcome::Commit { round, .. } | Outcome::Reject { round } => *round,
        }
    }
}
