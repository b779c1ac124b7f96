//! Round identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reject index of the first round after a committed block.
pub const FIRST_REJECT_ROUND: u64 = 1;

/// One attempt to commit a proposal.
///
/// A round is a block height plus a reject index within that height. Heights
/// only move forward; the reject index counts agreement attempts at the same
/// height. Ordering is lexicographic, so `(h, r) < (h, r + 1) < (h + 1, 1)`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Round {
    /// Block height this round targets.
    pub height: u64,
    /// Attempt number within the height, starting at [`FIRST_REJECT_ROUND`].
    pub reject: u64,
}

impl Round {
    pub const fn new(height: u64, reject: u64) -> Self {
        Self { height, reject }
    }

    /// The first round of a freshly committed height.
    pub const fn first(height: u64) -> Self {
        Self::new(height, FIRST_REJECT_ROUND)
    }

    /// The round attempted when this one fails to produce a block.
    pub const fn next_reject(self) -> Self {
        Self::new(self.height, self.reject + 1)
    }

    /// Whether this is the first attempt at its height.
    pub const fn is_first(self) -> bool {
        self.reject == FIRST_REJECT_ROUND
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.height, self.reject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_lexicographic() {
        assert!(Round::new(2, 5) < Round::new(3, 1));
        assert!(Round::new(3, 1) < Round::new(3, 2));
        assert_eq!(Round::new(3, 1), Round::first(3));
    }

    #[test]
    fn test_next_reject_keeps_height() {
        let round = Round::first(7).next_reject();
        assert_eq!(round, Round::new(7, 2));
        assert!(!round.is_first());
    }
}
