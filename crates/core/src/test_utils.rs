//! Recording and scripted doubles for the injected collaborators.

use crate::{
    AgreementHash, AgreementOutcome, ClusterOrder, HashGate, Notifier, OrderingService,
    OrderingTransport, PeerOrderer, ProposalFactory, SessionFactory,
};
use conclave_types::test_utils::test_peer;
use conclave_types::{Peer, PeerId, Proposal, Round, Transaction};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// A transport that records every call and answers proposal requests from
/// a staged map.
#[derive(Default)]
pub struct RecordingTransport {
    transactions: Mutex<Vec<(Round, Vec<Arc<Transaction>>)>>,
    proposal_requests: Mutex<Vec<Round>>,
    staged: Mutex<HashMap<Round, Arc<Proposal>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `on_request_proposal` answer with `proposal` for its round.
    pub fn stage_proposal(&self, proposal: Arc<Proposal>) {
        self.staged.lock().insert(proposal.round(), proposal);
    }

    /// Every `(round, transactions)` pair received so far.
    pub fn sent_transactions(&self) -> Vec<(Round, Vec<Arc<Transaction>>)> {
        self.transactions.lock().clone()
    }

    /// Every round a proposal was requested for, in call order.
    pub fn requested_rounds(&self) -> Vec<Round> {
        self.proposal_requests.lock().clone()
    }
}

impl OrderingTransport for RecordingTransport {
    fn on_transactions(&self, round: Round, transactions: Vec<Arc<Transaction>>) {
        self.transactions.lock().push((round, transactions));
    }

    fn on_request_proposal(&self, round: Round) -> Option<Arc<Proposal>> {
        self.proposal_requests.lock().push(round);
        self.staged.lock().get(&round).cloned()
    }
}

/// A session factory handing out [`RecordingTransport`] sessions and keeping
/// handles to every session it ever created, so tests can inspect both the
/// live and the replaced generations.
#[derive(Default)]
pub struct RecordingSessionFactory {
    sessions: Mutex<Vec<(Peer, Arc<RecordingTransport>)>>,
}

impl RecordingSessionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// All sessions ever created, in creation order.
    pub fn sessions(&self) -> Vec<(Peer, Arc<RecordingTransport>)> {
        self.sessions.lock().clone()
    }

    /// The most recently created session for `peer`, if any.
    pub fn session_for(&self, peer: PeerId) -> Option<Arc<RecordingTransport>> {
        self.sessions
            .lock()
            .iter()
            .rev()
            .find(|(p, _)| p.id == peer)
            .map(|(_, session)| Arc::clone(session))
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }
}

impl SessionFactory for RecordingSessionFactory {
    fn create(&self, peer: &Peer) -> Box<dyn OrderingTransport> {
        let session = Arc::new(RecordingTransport::new());
        self.sessions
            .lock()
            .push((peer.clone(), Arc::clone(&session)));
        Box::new(session)
    }
}

/// A hash gate that records votes and emits outcomes only when the test
/// says so, never synchronously from inside `vote`.
#[derive(Default)]
pub struct ScriptedHashGate {
    votes: Mutex<Vec<(AgreementHash, ClusterOrder)>>,
    outcomes: Notifier<AgreementOutcome>,
}

impl ScriptedHashGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an outcome to every subscriber, as the agreement layer would.
    pub fn emit(&self, outcome: AgreementOutcome) {
        self.outcomes.notify(&outcome);
    }

    pub fn votes(&self) -> Vec<(AgreementHash, ClusterOrder)> {
        self.votes.lock().clone()
    }

    pub fn last_vote(&self) -> Option<(AgreementHash, ClusterOrder)> {
        self.votes.lock().last().cloned()
    }
}

impl HashGate for ScriptedHashGate {
    fn vote(&self, hash: AgreementHash, order: ClusterOrder) {
        self.votes.lock().push((hash, order));
    }

    fn outcomes(&self) -> &Notifier<AgreementOutcome> {
        &self.outcomes
    }
}

/// A peer orderer that always answers with the same order, or always
/// refuses.
pub struct StaticPeerOrderer {
    order: Option<ClusterOrder>,
}

impl StaticPeerOrderer {
    pub fn with_order(order: ClusterOrder) -> Self {
        Self { order: Some(order) }
    }

    pub fn refusing() -> Self {
        Self { order: None }
    }
}

impl PeerOrderer for StaticPeerOrderer {
    fn get_ordering(&self, _hash: &AgreementHash) -> Option<ClusterOrder> {
        self.order.clone()
    }
}

/// Proposal factory with a fixed creation timestamp, for deterministic
/// fingerprints in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedProposalFactory {
    pub created_at_ms: u64,
}

impl Default for FixedProposalFactory {
    fn default() -> Self {
        Self { created_at_ms: 1_000 }
    }
}

impl ProposalFactory for FixedProposalFactory {
    fn make_proposal(&self, round: Round, transactions: Vec<Arc<Transaction>>) -> Proposal {
        Proposal::new(round, self.created_at_ms, transactions)
    }
}

/// An ordering service double recording the rounds it was told about while
/// behaving like a [`RecordingTransport`] for ingress.
#[derive(Default)]
pub struct RecordingOrderingService {
    transport: RecordingTransport,
    resolved_rounds: Mutex<Vec<Round>>,
}

impl RecordingOrderingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transport(&self) -> &RecordingTransport {
        &self.transport
    }

    /// Rounds passed to `on_collaboration_outcome`, in call order.
    pub fn resolved_rounds(&self) -> Vec<Round> {
        self.resolved_rounds.lock().clone()
    }
}

impl OrderingTransport for RecordingOrderingService {
    fn on_transactions(&self, round: Round, transactions: Vec<Arc<Transaction>>) {
        self.transport.on_transactions(round, transactions)
    }

    fn on_request_proposal(&self, round: Round) -> Option<Arc<Proposal>> {
        self.transport.on_request_proposal(round)
    }
}

impl OrderingService for RecordingOrderingService {
    fn on_collaboration_outcome(&self, round: Round) {
        self.resolved_rounds.lock().push(round);
    }
}

/// A four-peer cluster order for tests.
pub fn test_cluster_order() -> ClusterOrder {
    let peers = (1..=4).map(test_peer).collect();
    ClusterOrder::new(peers).expect("non-empty peer list")
}
