//! Collaborator interfaces injected into the pipeline.
//!
//! Everything the core does not implement itself enters through one of
//! these traits, so test doubles can stand in for the transport, the
//! agreement primitive and the factories.

use crate::{AgreementHash, AgreementOutcome, ClusterOrder, Notifier};
use conclave_types::{Peer, Proposal, Round, Transaction, TransactionBatch};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Transport-level notifications an ordering service accepts.
///
/// Implemented by the service itself (local delivery), by per-peer transport
/// sessions, and by the connection manager (which fans the calls out). All
/// operations are infallible at this level: transactions for rounds the
/// receiver does not accept are dropped silently, and an absent proposal
/// covers both "never emitted" and network timeout.
pub trait OrderingTransport: Send + Sync {
    /// Enqueue a collection of transactions targeted at a future round.
    fn on_transactions(&self, round: Round, transactions: Vec<Arc<Transaction>>);

    /// The proposal emitted for `round`, if any. May block on network I/O.
    fn on_request_proposal(&self, round: Round) -> Option<Arc<Proposal>>;
}

impl<T: OrderingTransport + ?Sized> OrderingTransport for Arc<T> {
    fn on_transactions(&self, round: Round, transactions: Vec<Arc<Transaction>>) {
        (**self).on_transactions(round, transactions)
    }

    fn on_request_proposal(&self, round: Round) -> Option<Arc<Proposal>> {
        (**self).on_request_proposal(round)
    }
}

/// Full contract of a local ordering service: transport ingress plus the
/// round-resolution signal from the gate.
pub trait OrderingService: OrderingTransport {
    /// Round `round` has been resolved (committed or rejected); pack the
    /// successor rounds and evict stale proposals.
    fn on_collaboration_outcome(&self, round: Round);
}

/// Opens transport sessions to ordering peers.
pub trait SessionFactory: Send + Sync {
    fn create(&self, peer: &Peer) -> Box<dyn OrderingTransport>;
}

impl<T: SessionFactory + ?Sized> SessionFactory for Arc<T> {
    fn create(&self, peer: &Peer) -> Box<dyn OrderingTransport> {
        (**self).create(peer)
    }
}

/// Produces the cluster order for a fingerprint.
///
/// `None` means agreement cannot proceed for this hash and the vote must
/// not be submitted.
pub trait PeerOrderer: Send + Sync {
    fn get_ordering(&self, hash: &AgreementHash) -> Option<ClusterOrder>;
}

/// Hash-level agreement primitive.
///
/// Votes go in; commit/reject outcomes come back on the outcome stream.
/// Implementations must not deliver an outcome synchronously from inside
/// [`vote`](HashGate::vote); the caller may hold locks across the call.
pub trait HashGate: Send + Sync {
    fn vote(&self, hash: AgreementHash, order: ClusterOrder);

    fn outcomes(&self) -> &Notifier<AgreementOutcome>;
}

/// Builds proposals for rounds closed by the ordering service.
pub trait ProposalFactory: Send + Sync {
    fn make_proposal(&self, round: Round, transactions: Vec<Arc<Transaction>>) -> Proposal;
}

/// Proposal factory stamping wall-clock creation times.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProposalFactory;

impl ProposalFactory for SystemProposalFactory {
    fn make_proposal(&self, round: Round, transactions: Vec<Arc<Transaction>>) -> Proposal {
        let created_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Proposal::new(round, created_at_ms, transactions)
    }
}

/// Wraps loose transactions into batches for propagation.
pub trait BatchFactory: Send + Sync {
    fn wrap(&self, transaction: Arc<Transaction>) -> TransactionBatch;
}

/// The common case: one transaction, one batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingletonBatchFactory;

impl BatchFactory for SingletonBatchFactory {
    fn wrap(&self, transaction: Arc<Transaction>) -> TransactionBatch {
        TransactionBatch::singleton(transaction)
    }
}
