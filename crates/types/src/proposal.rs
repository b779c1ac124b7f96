//! Proposals.

use crate::{Hash, Round, Transaction};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An ordered sequence of transactions proposed for inclusion at a round.
///
/// Proposals are immutable once emitted and content-addressed: the hash is
/// deterministic over the transaction sequence, so two peers that pack the
/// same transactions in the same order produce the same fingerprint.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "ProposalWire", into = "ProposalWire")]
pub struct Proposal {
    round: Round,
    created_at_ms: u64,
    transactions: Vec<Arc<Transaction>>,
    hash: Hash,
}

impl Proposal {
    pub fn new(round: Round, created_at_ms: u64, transactions: Vec<Arc<Transaction>>) -> Self {
        let hash = content_hash(&transactions);
        Self {
            round,
            created_at_ms,
            transactions,
            hash,
        }
    }

    pub fn round(&self) -> Round {
        self.round
    }

    /// Creation timestamp, milliseconds since the Unix epoch.
    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }

    pub fn transactions(&self) -> &[Arc<Transaction>] {
        &self.transactions
    }

    /// Content hash over the transaction sequence.
    pub fn hash(&self) -> Hash {
        self.hash
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

impl PartialEq for Proposal {
    fn eq(&self, other: &Self) -> bool {
        self.round == other.round && self.hash == other.hash
    }
}

impl Eq for Proposal {}

impl std::fmt::Debug for Proposal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Proposal")
            .field("round", &self.round)
            .field("hash", &self.hash)
            .field("transactions", &self.transactions.len())
            .finish()
    }
}

fn content_hash(transactions: &[Arc<Transaction>]) -> Hash {
    let mut data = Vec::with_capacity(transactions.len() * 32);
    for tx in transactions {
        data.extend_from_slice(tx.hash().as_bytes());
    }
    Hash::from_bytes(&data)
}

/// Wire shape; the content hash is recomputed on decode.
#[derive(Serialize, Deserialize)]
struct ProposalWire {
    round: Round,
    created_at_ms: u64,
    transactions: Vec<Transaction>,
}

impl From<ProposalWire> for Proposal {
    fn from(wire: ProposalWire) -> Self {
        Proposal::new(
            wire.round,
            wire.created_at_ms,
            wire.transactions.into_iter().map(Arc::new).collect(),
        )
    }
}

impl From<Proposal> for ProposalWire {
    fn from(proposal: Proposal) -> Self {
        ProposalWire {
            round: proposal.round,
            created_at_ms: proposal.created_at_ms,
            transactions: proposal
                .transactions
                .iter()
                .map(|tx| Transaction::clone(tx))
                .collect(),
        }
    }
}
