//! Transactions and transaction batches.

use crate::Hash;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// An opaque, content-addressed transaction.
///
/// The ordering layer never inspects the payload; validation and execution
/// happen elsewhere. Identity is the SHA-256 hash of the payload, computed
/// once at construction.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "Vec<u8>", into = "Vec<u8>")]
pub struct Transaction {
    payload: Vec<u8>,
    hash: Hash,
}

impl Transaction {
    pub fn new(payload: Vec<u8>) -> Self {
        let hash = Hash::from_bytes(&payload);
        Self { payload, hash }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn hash(&self) -> Hash {
        self.hash
    }
}

impl From<Vec<u8>> for Transaction {
    fn from(payload: Vec<u8>) -> Self {
        Self::new(payload)
    }
}

impl From<Transaction> for Vec<u8> {
    fn from(tx: Transaction) -> Self {
        tx.payload
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Transaction {}

impl std::hash::Hash for Transaction {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("hash", &self.hash)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

/// Error constructing a [`TransactionBatch`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("batch must contain at least one transaction")]
    Empty,
}

/// A non-empty ordered sequence of transactions sharing a batch identifier.
///
/// Either all of a batch's transactions appear in a proposal or none do.
/// The identifier is derived from the member hashes, so equal member
/// sequences produce equal batches. A singleton batch is the common case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionBatch {
    id: Hash,
    transactions: Vec<Arc<Transaction>>,
}

impl TransactionBatch {
    /// Build a batch from its members. Fails on an empty member list.
    pub fn new(transactions: Vec<Arc<Transaction>>) -> Result<Self, BatchError> {
        if transactions.is_empty() {
            return Err(BatchError::Empty);
        }
        let id = batch_id(&transactions);
        Ok(Self { id, transactions })
    }

    /// Wrap a single loose transaction.
    pub fn singleton(transaction: Arc<Transaction>) -> Self {
        let id = batch_id(std::slice::from_ref(&transaction));
        Self {
            id,
            transactions: vec![transaction],
        }
    }

    pub fn id(&self) -> Hash {
        self.id
    }

    pub fn transactions(&self) -> &[Arc<Transaction>] {
        &self.transactions
    }

    pub fn into_transactions(self) -> Vec<Arc<Transaction>> {
        self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Always false; batches are non-empty by construction.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

fn batch_id(transactions: &[Arc<Transaction>]) -> Hash {
    let mut data = Vec::with_capacity(transactions.len() * 32);
    for tx in transactions {
        data.extend_from_slice(tx.hash().as_bytes());
    }
    Hash::from_bytes(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_is_by_hash() {
        let a = Transaction::new(vec![1, 2, 3]);
        let b = Transaction::new(vec![1, 2, 3]);
        let c = Transaction::new(vec![4, 5, 6]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        assert_eq!(TransactionBatch::new(vec![]), Err(BatchError::Empty));
    }

    #[test]
    fn test_singleton_batch() {
        let tx = Arc::new(Transaction::new(vec![7; 4]));
        let batch = TransactionBatch::singleton(Arc::clone(&tx));
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.transactions()[0].hash(), tx.hash());
    }

    #[test]
    fn test_batch_id_tracks_members() {
        let tx1 = Arc::new(Transaction::new(vec![1]));
        let tx2 = Arc::new(Transaction::new(vec![2]));
        let a = TransactionBatch::new(vec![Arc::clone(&tx1), Arc::clone(&tx2)]).unwrap();
        let b = TransactionBatch::new(vec![tx1, tx2]).unwrap();
        assert_eq!(a.id(), b.id());
    }
}
