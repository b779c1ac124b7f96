//! On-demand proposal emission.

use crate::OrderingConfig;
use conclave_core::{OrderingService, OrderingTransport, ProposalFactory};
use conclave_types::{Hash, Proposal, Round, Transaction};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, instrument, trace};

/// The ordering service.
///
/// Accumulates transactions per future round and emits a proposal for a
/// round the moment it is closed. Only rounds present in the accepting map
/// take transactions; everything else is dropped silently, since the sender
/// re-propagates towards later rounds on its own.
///
/// One reader/writer lock guards all three structures. Resolving a round
/// takes the writer lock; ingress and proposal requests take the reader
/// lock, with a per-round mutex making concurrent enqueues safe.
pub struct InMemoryOrderingService {
    transaction_limit: usize,
    number_of_proposals: usize,
    proposal_factory: Arc<dyn ProposalFactory>,
    inner: RwLock<ServiceState>,
}

#[derive(Default)]
struct ServiceState {
    /// Rounds currently accepting transactions, each with its own ingress
    /// queue in arrival order.
    accepting: HashMap<Round, Mutex<VecDeque<Arc<Transaction>>>>,

    /// Recently emitted proposals.
    proposals: HashMap<Round, Arc<Proposal>>,

    /// Emission order of `proposals`, eldest first. Drives eviction.
    round_queue: VecDeque<Round>,
}

impl InMemoryOrderingService {
    /// Build the service and pack its initial round, so the forward
    /// accepting queues exist before the first ingress call.
    pub fn new(config: &OrderingConfig, proposal_factory: Arc<dyn ProposalFactory>) -> Self {
        let service = Self {
            transaction_limit: config.transaction_limit,
            number_of_proposals: config.number_of_proposals,
            proposal_factory,
            inner: RwLock::new(ServiceState::default()),
        };
        service.on_collaboration_outcome(config.initial_round);
        service
    }

    /// Whether `round` currently accepts transactions.
    pub fn accepts(&self, round: Round) -> bool {
        self.inner.read().accepting.contains_key(&round)
    }

    /// Number of proposals currently cached.
    pub fn cached_proposals(&self) -> usize {
        self.inner.read().proposals.len()
    }

    fn pack_next_proposals(&self, state: &mut ServiceState, round: Round) {
        self.close_round(state, round.next_reject());

        if round.is_first() {
            // A block landed: the next height's first attempt is also due,
            // and the accepting window shifts to the three plausible next
            // rounds.
            self.close_round(state, Round::first(round.height + 1));

            state.accepting.clear();
            for next in [
                Round::new(round.height, round.reject + 2),
                Round::new(round.height + 1, round.reject + 1),
                Round::new(round.height + 2, round.reject),
            ] {
                state.accepting.insert(next, Mutex::new(VecDeque::new()));
            }
        } else {
            // A reject round resolved: one further reject at this height
            // becomes plausible.
            state
                .accepting
                .insert(Round::new(round.height, round.reject + 2), Mutex::new(VecDeque::new()));
        }
    }

    /// Stop accepting for `round` and, if it gathered anything, emit its
    /// proposal.
    fn close_round(&self, state: &mut ServiceState, round: Round) {
        let Some(queue) = state.accepting.remove(&round) else {
            return;
        };
        let mut queue = queue.into_inner();
        if queue.is_empty() {
            return;
        }

        let proposal = self.emit_proposal(round, &mut queue);
        state.proposals.insert(round, Arc::new(proposal));
        state.round_queue.push_back(round);
    }

    fn emit_proposal(&self, round: Round, queue: &mut VecDeque<Arc<Transaction>>) -> Proposal {
        let mut collected: Vec<Arc<Transaction>> = Vec::new();
        let mut seen: HashSet<Hash> = HashSet::new();

        while collected.len() < self.transaction_limit {
            let Some(tx) = queue.pop_front() else { break };
            if seen.insert(tx.hash()) {
                collected.push(tx);
            }
        }
        if !queue.is_empty() {
            debug!(round = %round, dropped = queue.len(), "discarding transactions beyond the proposal limit");
        }

        info!(round = %round, transactions = collected.len(), "emitting proposal");
        self.proposal_factory.make_proposal(round, collected)
    }

    fn evict(&self, state: &mut ServiceState) {
        // One resolution can close two rounds, so loop rather than removing
        // a single entry.
        while state.round_queue.len() > self.number_of_proposals {
            if let Some(round) = state.round_queue.pop_front() {
                state.proposals.remove(&round);
                debug!(round = %round, "evicted proposal");
            }
        }
    }
}

impl OrderingService for InMemoryOrderingService {
    #[instrument(skip(self), fields(round = %round))]
    fn on_collaboration_outcome(&self, round: Round) {
        let mut state = self.inner.write();
        self.pack_next_proposals(&mut state, round);
        self.evict(&mut state);
    }
}

impl OrderingTransport for InMemoryOrderingService {
    fn on_transactions(&self, round: Round, transactions: Vec<Arc<Transaction>>) {
        let state = self.inner.read();
        match state.accepting.get(&round) {
            Some(queue) => {
                let count = transactions.len();
                queue.lock().extend(transactions);
                trace!(round = %round, count, "transactions enqueued");
            }
            None => {
                debug!(round = %round, count = transactions.len(), "dropping transactions for unaccepted round");
            }
        }
    }

    fn on_request_proposal(&self, round: Round) -> Option<Arc<Proposal>> {
        self.inner.read().proposals.get(&round).cloned()
    }
}
