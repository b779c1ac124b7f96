//! Peer slots for the ordering fan-out.

use conclave_types::Peer;
use serde::{Deserialize, Serialize};

/// The logical peer slots the connection manager keeps sessions for.
///
/// Proposals are solicited from the issuer only. Batches go to the three
/// consumer slots simultaneously, addressed to the three rounds that might
/// plausibly be built next; the local peer cannot know which one will.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeerSlot {
    /// The peer proposals are requested from for the current round.
    Issuer,
    /// Consumer for a later reject round at the current height.
    CurrentRoundRejectConsumer,
    /// Consumer for the reject round at the next height.
    NextRoundRejectConsumer,
    /// Consumer for the commit round two heights ahead.
    NextRoundCommitConsumer,
}

impl PeerSlot {
    pub const ALL: [PeerSlot; 4] = [
        PeerSlot::Issuer,
        PeerSlot::CurrentRoundRejectConsumer,
        PeerSlot::NextRoundRejectConsumer,
        PeerSlot::NextRoundCommitConsumer,
    ];
}

/// The peers currently filling the four slots.
///
/// A single peer may fill several slots; the slots are logical, not
/// physical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerSet {
    pub issuer: Peer,
    pub current_round_reject_consumer: Peer,
    pub next_round_reject_consumer: Peer,
    pub next_round_commit_consumer: Peer,
}

impl PeerSet {
    pub fn get(&self, slot: PeerSlot) -> &Peer {
        match slot {
            PeerSlot::Issuer => &self.issuer,
            PeerSlot::CurrentRoundRejectConsumer => &self.current_round_reject_consumer,
            PeerSlot::NextRoundRejectConsumer => &self.next_round_reject_consumer,
            PeerSlot::NextRoundCommitConsumer => &self.next_round_commit_consumer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_types::test_utils::test_peer;

    #[test]
    fn test_slot_lookup() {
        let peers = PeerSet {
            issuer: test_peer(1),
            current_round_reject_consumer: test_peer(2),
            next_round_reject_consumer: test_peer(3),
            next_round_commit_consumer: test_peer(4),
        };

        assert_eq!(peers.get(PeerSlot::Issuer).id, test_peer(1).id);
        assert_eq!(
            peers.get(PeerSlot::NextRoundCommitConsumer).id,
            test_peer(4).id
        );
        assert_eq!(PeerSlot::ALL.len(), 4);
    }
}
