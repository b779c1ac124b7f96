//! Proposal-level adapter over the hash-agreement primitive.

use crate::fingerprint;
use crate::GateError;
use conclave_core::{
    AgreementHash, AgreementOutcome, HashGate, Notifier, Outcome, PeerOrderer, Vote,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

/// The vote currently awaiting an agreement outcome.
struct LastVote {
    hash: AgreementHash,
    vote: Vote,
}

/// Projects proposal votes onto fingerprint-level agreement and lifts raw
/// outcomes back to proposal outcomes.
///
/// At most one vote is pending at a time; submitting another before the
/// outcome arrives overwrites the first, which assumes a single calling
/// gate. The pending slot is cleared on every outcome, successful or not.
pub struct ProposalGate {
    orderer: Arc<dyn PeerOrderer>,
    hash_gate: Arc<dyn HashGate>,
    last_vote: Arc<Mutex<Option<LastVote>>>,
    outcomes: Arc<Notifier<Result<Outcome, GateError>>>,
}

impl ProposalGate {
    /// Wire the gate onto an agreement primitive. The outcome transform
    /// runs on the hash gate's notification thread.
    pub fn new(hash_gate: Arc<dyn HashGate>, orderer: Arc<dyn PeerOrderer>) -> Self {
        let last_vote: Arc<Mutex<Option<LastVote>>> = Arc::new(Mutex::new(None));
        let outcomes = Arc::new(Notifier::new());

        {
            let last_vote = Arc::clone(&last_vote);
            let downstream = Arc::clone(&outcomes);
            hash_gate.outcomes().subscribe(move |raw: &AgreementOutcome| {
                let result = {
                    let mut slot = last_vote.lock();
                    let result = lift_outcome(slot.as_ref(), raw);
                    *slot = None;
                    result
                };
                if let Err(error) = &result {
                    warn!(%error, "agreement outcome could not be lifted");
                }
                downstream.notify(&result);
            });
        }

        Self {
            orderer,
            hash_gate,
            last_vote,
            outcomes,
        }
    }

    /// Submit the local candidate for a round.
    ///
    /// Fails without submitting anything when the orderer cannot produce a
    /// cluster order for the fingerprint.
    pub fn vote(&self, vote: Vote) -> Result<(), GateError> {
        let hash = fingerprint::make_hash(&vote);
        info!(
            round = %vote.round,
            fingerprint = %hash.proposal_part,
            "voting for proposal"
        );

        let Some(order) = self.orderer.get_ordering(&hash) else {
            return Err(GateError::OrdererRefused { round: vote.round });
        };

        let mut slot = self.last_vote.lock();
        *slot = Some(LastVote {
            hash: hash.clone(),
            vote,
        });
        self.hash_gate.vote(hash, order);
        Ok(())
    }

    /// Per-round outcomes lifted from the agreement layer.
    pub fn outcomes(&self) -> &Notifier<Result<Outcome, GateError>> {
        &self.outcomes
    }
}

fn lift_outcome(
    last: Option<&LastVote>,
    raw: &AgreementOutcome,
) -> Result<Outcome, GateError> {
    let hash = &raw
        .votes()
        .first()
        .ok_or(GateError::EmptyOutcome)?
        .hash;
    let info = fingerprint::make_proposal_info(hash)?;

    match raw {
        AgreementOutcome::Commit { .. } => match last {
            Some(last) if last.hash == *hash => Ok(Outcome::Commit {
                proposal: last.vote.proposal.clone(),
                round: info.round,
            }),
            _ => Err(GateError::ForeignCommit {
                round: info.round,
                fingerprint: info.fingerprint,
            }),
        },
        AgreementOutcome::Reject { .. } => Ok(Outcome::Reject { round: info.round }),
    }
}
