//! Foundational types for the conclave ordering pipeline.
//!
//! This crate provides the value types shared by every other member:
//!
//! - **Primitives**: [`Hash`], content addressing for transactions and proposals
//! - **Identifiers**: [`Round`], [`PeerId`]
//! - **Ordering types**: [`Transaction`], [`TransactionBatch`], [`Proposal`]
//!
//! # Design Philosophy
//!
//! This crate is self-contained with minimal dependencies. It does not depend
//! on any other workspace crate, making it the foundation layer. Values are
//! immutable once constructed; anything content-addressed computes its hash
//! at construction and never again.

mod hash;
mod peer;
mod proposal;
mod round;
mod transaction;

pub use hash::{Hash, HexError};
pub use peer::{Peer, PeerId};
pub use proposal::Proposal;
pub use round::{Round, FIRST_REJECT_ROUND};
pub use transaction::{BatchError, Transaction, TransactionBatch};

/// Test utilities.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils {
    use super::*;
    use std::sync::Arc;

    /// Create a deterministic test transaction from a seed byte.
    pub fn test_transaction(seed: u8) -> Arc<Transaction> {
        Arc::new(Transaction::new(vec![seed; 8]))
    }

    /// Create a test peer from a seed byte.
    pub fn test_peer(seed: u8) -> Peer {
        Peer::new(PeerId(seed as u64), format!("127.0.0.1:{}", 10_000 + seed as u16))
    }

    /// Create a test proposal holding one transaction per seed.
    pub fn test_proposal(round: Round, seeds: &[u8]) -> Arc<Proposal> {
        let transactions = seeds.iter().map(|&s| test_transaction(s)).collect();
        Arc::new(Proposal::new(round, 1_000, transactions))
    }
}
