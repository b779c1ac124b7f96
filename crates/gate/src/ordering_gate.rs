//! Round state machine bridging block events to proposal votes.

use crate::{GateError, ProposalGate};
use conclave_core::{
    BatchFactory, Notifier, Outcome, OrderingService, OrderingTransport, RoundEvent, Vote,
};
use conclave_types::{Proposal, Round, Transaction, TransactionBatch};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The ordering gate.
///
/// Tracks the current round, advances it on block and empty events, and for
/// every advance runs the vote sequence: notify the local ordering service,
/// request the round's proposal from the issuer, and submit the vote to the
/// proposal gate. Committed proposals are published on the
/// [`on_proposal`](OrderingGate::on_proposal) stream; rejects and empty
/// commits push the gate into the next reject round.
///
/// The writer lock over the current round is held across the whole vote
/// sequence, so an event arriving mid-vote cannot advance the round under
/// it. Batch propagation only snapshots the round under the reader lock.
pub struct OrderingGate {
    ordering_service: Arc<dyn OrderingService>,
    network: Arc<dyn OrderingTransport>,
    proposal_gate: Arc<ProposalGate>,
    batch_factory: Arc<dyn BatchFactory>,
    current_round: RwLock<Round>,
    proposals: Notifier<Arc<Proposal>>,
}

impl OrderingGate {
    /// Wire the gate between its collaborators.
    ///
    /// Subscribes to `events` for round advancement and to the proposal
    /// gate's outcomes; both callbacks hold only a weak handle, so dropping
    /// the returned `Arc` detaches the gate.
    pub fn new(
        ordering_service: Arc<dyn OrderingService>,
        network: Arc<dyn OrderingTransport>,
        proposal_gate: Arc<ProposalGate>,
        batch_factory: Arc<dyn BatchFactory>,
        events: &Notifier<RoundEvent>,
        initial_round: Round,
    ) -> Arc<Self> {
        let gate = Arc::new(Self {
            ordering_service,
            network,
            proposal_gate,
            batch_factory,
            current_round: RwLock::new(initial_round),
            proposals: Notifier::new(),
        });

        let weak = Arc::downgrade(&gate);
        events.subscribe(move |event: &RoundEvent| {
            if let Some(gate) = weak.upgrade() {
                gate.on_round_event(*event);
            }
        });

        let weak = Arc::downgrade(&gate);
        gate.proposal_gate
            .outcomes()
            .subscribe(move |outcome: &Result<Outcome, GateError>| {
                if let Some(gate) = weak.upgrade() {
                    gate.on_outcome(outcome);
                }
            });

        gate
    }

    /// Advance the round for a block or empty event, then vote.
    pub fn on_round_event(&self, event: RoundEvent) {
        let mut round = self.current_round.write();
        *round = match event {
            RoundEvent::Block { height } => Round::first(height),
            RoundEvent::Empty => round.next_reject(),
        };
        debug!(round = %*round, ?event, "round advanced");
        self.vote(*round);
    }

    /// Fan a batch out towards the consumers for the plausible next rounds.
    pub fn propagate_batch(&self, batch: &TransactionBatch) {
        let round = *self.current_round.read();
        self.network
            .on_transactions(round, batch.transactions().to_vec());
    }

    /// Wrap a loose transaction into a batch and propagate it.
    pub fn propagate_transaction(&self, transaction: Arc<Transaction>) {
        let batch = self.batch_factory.wrap(transaction);
        self.propagate_batch(&batch);
    }

    /// Committed proposals, in commit order, for the downstream pipeline.
    pub fn on_proposal(&self) -> &Notifier<Arc<Proposal>> {
        &self.proposals
    }

    /// Snapshot of the round currently being voted on.
    pub fn current_round(&self) -> Round {
        *self.current_round.read()
    }

    fn on_outcome(&self, outcome: &Result<Outcome, GateError>) {
        match outcome {
            Ok(Outcome::Commit {
                proposal: Some(proposal),
                round,
            }) => {
                info!(round = %round, proposal = %proposal.hash(), "proposal committed");
                self.proposals.notify(proposal);
            }
            Ok(Outcome::Commit {
                proposal: None,
                round,
            })
            | Ok(Outcome::Reject { round }) => {
                // Nothing to hand downstream; move on to the next attempt
                // at this height.
                let mut current = self.current_round.write();
                *current = round.next_reject();
                debug!(round = %*current, "retrying after unproductive round");
                self.vote(*current);
            }
            Err(error) => {
                warn!(%error, "dropping agreement outcome");
            }
        }
    }

    /// The vote sequence for `round`. Callers hold the writer lock.
    fn vote(&self, round: Round) {
        self.ordering_service.on_collaboration_outcome(round);
        let proposal = self.network.on_request_proposal(round);
        let vote = Vote { round, proposal };
        if let Err(error) = self.proposal_gate.vote(vote) {
            warn!(round = %round, %error, "vote not submitted; waiting for the next event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_core::test_utils::{
        test_cluster_order, RecordingOrderingService, RecordingTransport, ScriptedHashGate,
        StaticPeerOrderer,
    };
    use conclave_core::{AgreementOutcome, AgreementVote, HashGate, SingletonBatchFactory};
    use conclave_types::test_utils::{test_proposal, test_transaction};
    use conclave_types::PeerId;
    use parking_lot::Mutex;

    struct Fixture {
        ordering_service: Arc<RecordingOrderingService>,
        network: Arc<RecordingTransport>,
        hash_gate: Arc<ScriptedHashGate>,
        events: Arc<Notifier<RoundEvent>>,
        gate: Arc<OrderingGate>,
        committed: Arc<Mutex<Vec<Arc<Proposal>>>>,
    }

    fn fixture(initial_round: Round) -> Fixture {
        let ordering_service = Arc::new(RecordingOrderingService::new());
        let network = Arc::new(RecordingTransport::new());
        let hash_gate = Arc::new(ScriptedHashGate::new());
        let hash_gate_dyn: Arc<dyn HashGate> = Arc::clone(&hash_gate) as Arc<dyn HashGate>;
        let proposal_gate = Arc::new(ProposalGate::new(
            hash_gate_dyn,
            Arc::new(StaticPeerOrderer::with_order(test_cluster_order())),
        ));
        let events = Arc::new(Notifier::new());

        let gate = OrderingGate::new(
            Arc::clone(&ordering_service) as Arc<dyn OrderingService>,
            Arc::clone(&network) as Arc<dyn OrderingTransport>,
            proposal_gate,
            Arc::new(SingletonBatchFactory),
            &events,
            initial_round,
        );

        let committed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&committed);
        gate.on_proposal()
            .subscribe(move |proposal: &Arc<Proposal>| sink.lock().push(Arc::clone(proposal)));

        Fixture {
            ordering_service,
            network,
            hash_gate,
            events,
            gate,
            committed,
        }
    }

    fn commit_of_last_vote(hash_gate: &ScriptedHashGate) -> AgreementOutcome {
        let (hash, _) = hash_gate.last_vote().expect("a vote was cast");
        AgreementOutcome::Commit {
            votes: vec![AgreementVote {
                hash,
                voter: PeerId(1),
            }],
        }
    }

    #[test]
    fn test_block_event_starts_a_fresh_round() {
        let f = fixture(Round::first(2));

        f.events.notify(&RoundEvent::Block { height: 3 });

        assert_eq!(f.gate.current_round(), Round::first(3));
        assert_eq!(f.ordering_service.resolved_rounds(), vec![Round::first(3)]);
        assert_eq!(f.network.requested_rounds(), vec![Round::first(3)]);
        let (hash, _) = f.hash_gate.last_vote().expect("vote cast");
        assert_eq!(hash.round_part, "3 1");
        assert!(hash.proposal_part.is_empty());
    }

    #[test]
    fn test_empty_event_bumps_the_reject_index() {
        let f = fixture(Round::first(2));

        f.events.notify(&RoundEvent::Empty);

        assert_eq!(f.gate.current_round(), Round::new(2, 2));
        assert_eq!(
            f.ordering_service.resolved_rounds(),
            vec![Round::new(2, 2)]
        );
    }

    #[test]
    fn test_vote_carries_the_issuer_proposal() {
        let f = fixture(Round::first(2));
        let proposal = test_proposal(Round::first(3), &[1, 2]);
        f.network.stage_proposal(Arc::clone(&proposal));

        f.events.notify(&RoundEvent::Block { height: 3 });

        let (hash, _) = f.hash_gate.last_vote().expect("vote cast");
        assert_eq!(hash.proposal_part, proposal.hash().to_hex());
    }

    #[test]
    fn test_commit_publishes_downstream_and_holds_the_round() {
        let f = fixture(Round::first(2));
        let proposal = test_proposal(Round::first(3), &[1]);
        f.network.stage_proposal(Arc::clone(&proposal));
        f.events.notify(&RoundEvent::Block { height: 3 });

        f.hash_gate.emit(commit_of_last_vote(&f.hash_gate));

        assert_eq!(*f.committed.lock(), vec![proposal]);
        assert_eq!(f.gate.current_round(), Round::first(3));
        // No re-vote happened.
        assert_eq!(f.hash_gate.votes().len(), 1);
    }

    #[test]
    fn test_empty_commit_retries_the_next_reject_round() {
        let f = fixture(Round::first(2));
        f.events.notify(&RoundEvent::Empty);
        assert_eq!(f.gate.current_round(), Round::new(2, 2));

        f.hash_gate.emit(commit_of_last_vote(&f.hash_gate));

        assert!(f.committed.lock().is_empty());
        assert_eq!(f.gate.current_round(), Round::new(2, 3));
        // The retry voted again, for the advanced round.
        let votes = f.hash_gate.votes();
        assert_eq!(votes.len(), 2);
        assert_eq!(votes[1].0.round_part, "2 3");
    }

    #[test]
    fn test_reject_retries_the_next_reject_round() {
        let f = fixture(Round::first(2));
        f.events.notify(&RoundEvent::Empty);
        let (hash, _) = f.hash_gate.last_vote().expect("vote cast");

        f.hash_gate.emit(AgreementOutcome::Reject {
            votes: vec![AgreementVote {
                hash,
                voter: PeerId(1),
            }],
        });

        assert!(f.committed.lock().is_empty());
        assert_eq!(f.gate.current_round(), Round::new(2, 3));
        assert_eq!(
            f.ordering_service.resolved_rounds(),
            vec![Round::new(2, 2), Round::new(2, 3)]
        );
    }

    #[test]
    fn test_errored_outcome_is_dropped() {
        let f = fixture(Round::first(2));
        f.events.notify(&RoundEvent::Empty);

        // A commit for somebody else's fingerprint.
        let foreign = crate::fingerprint::make_hash(&Vote {
            round: Round::new(2, 2),
            proposal: Some(test_proposal(Round::new(2, 2), &[9])),
        });
        f.hash_gate.emit(AgreementOutcome::Commit {
            votes: vec![AgreementVote {
                hash: foreign,
                voter: PeerId(1),
            }],
        });

        assert!(f.committed.lock().is_empty());
        // The round is left for the next event to move.
        assert_eq!(f.gate.current_round(), Round::new(2, 2));
        assert_eq!(f.hash_gate.votes().len(), 1);
    }

    #[test]
    fn test_propagate_batch_snapshots_the_current_round() {
        let f = fixture(Round::new(5, 3));
        let batch =
            TransactionBatch::new(vec![test_transaction(1), test_transaction(2)]).unwrap();

        f.gate.propagate_batch(&batch);

        let sent = f.network.sent_transactions();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, Round::new(5, 3));
        assert_eq!(sent[0].1.len(), 2);
    }

    #[test]
    fn test_propagate_transaction_wraps_a_singleton() {
        let f = fixture(Round::first(2));
        let tx = test_transaction(7);

        f.gate.propagate_transaction(Arc::clone(&tx));

        let sent = f.network.sent_transactions();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, vec![tx]);
    }

    #[test]
    fn test_refused_vote_still_advances_the_round() {
        let ordering_service = Arc::new(RecordingOrderingService::new());
        let network = Arc::new(RecordingTransport::new());
        let hash_gate = Arc::new(ScriptedHashGate::new());
        let hash_gate_dyn: Arc<dyn HashGate> = Arc::clone(&hash_gate) as Arc<dyn HashGate>;
        let proposal_gate = Arc::new(ProposalGate::new(
            hash_gate_dyn,
            Arc::new(StaticPeerOrderer::refusing()),
        ));
        let events: Notifier<RoundEvent> = Notifier::new();

        let gate = OrderingGate::new(
            Arc::clone(&ordering_service) as Arc<dyn OrderingService>,
            Arc::clone(&network) as Arc<dyn OrderingTransport>,
            proposal_gate,
            Arc::new(SingletonBatchFactory),
            &events,
            Round::first(2),
        );

        events.notify(&RoundEvent::Empty);

        // The vote failed, but the round moved and the service was told.
        assert_eq!(gate.current_round(), Round::new(2, 2));
        assert_eq!(ordering_service.resolved_rounds(), vec![Round::new(2, 2)]);
        assert!(hash_gate.votes().is_empty());
    }
}
