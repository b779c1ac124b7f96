//! Types shared with the hash-agreement layer.
//!
//! The agreement primitive knows nothing about proposals: it orders opaque
//! fingerprints among a cluster of peers and reports commit or reject. The
//! types here are its vocabulary.

use conclave_types::{Peer, PeerId};

/// Opaque fingerprint the agreement layer votes on.
///
/// Encodes a round plus an optional proposal content hash; the codec in the
/// gate crate owns the encoding. Two votes agree exactly when both parts
/// are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AgreementHash {
    /// Decimal `"<height> <reject>"` rendering of the round.
    pub round_part: String,
    /// Hex content hash of the proposal; empty when the vote carried none.
    pub proposal_part: String,
}

/// A single peer's vote as observed by the agreement layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgreementVote {
    pub hash: AgreementHash,
    pub voter: PeerId,
}

/// Raw agreement outcome, before being lifted back to proposal level.
///
/// All votes inside one outcome carry the same hash; readers take the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgreementOutcome {
    Commit { votes: Vec<AgreementVote> },
    Reject { votes: Vec<AgreementVote> },
}

impl AgreementOutcome {
    pub fn votes(&self) -> &[AgreementVote] {
        match self {
            AgreementOutcome::Commit { votes } | AgreementOutcome::Reject { votes } => votes,
        }
    }
}

/// The ordered set of peers that participate in agreement for one
/// fingerprint. Non-empty by construction; the first peer leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterOrder {
    peers: Vec<Peer>,
}

impl ClusterOrder {
    /// Returns `None` for an empty peer list.
    pub fn new(peers: Vec<Peer>) -> Option<Self> {
        if peers.is_empty() {
            return None;
        }
        Some(Self { peers })
    }

    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    pub fn leader(&self) -> &Peer {
        &self.peers[0]
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Always false; the constructor rejects empty orders.
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_types::test_utils::test_peer;

    #[test]
    fn test_cluster_order_rejects_empty() {
        assert!(ClusterOrder::new(vec![]).is_none());
    }

    #[test]
    fn test_cluster_order_leader_is_first() {
        let order = ClusterOrder::new(vec![test_peer(1), test_peer(2)]).unwrap();
        assert_eq!(order.leader().id, test_peer(1).id);
        assert_eq!(order.len(), 2);
    }
}
