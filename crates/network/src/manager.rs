//! Session fan-out to ordering peers.

use crate::{PeerSet, PeerSlot};
use conclave_core::{Notifier, OrderingTransport, SessionFactory};
use conclave_types::{Proposal, Round, Transaction, FIRST_REJECT_ROUND};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

/// Routes ordering traffic to the right peers.
///
/// One transport session per [`PeerSlot`] is held open in a four-slot table.
/// When the peer set changes, all four sessions are rebuilt atomically under
/// the writer lock; RPCs in flight complete against the pre-update sessions
/// under the reader lock. Each session handles its own transport failures.
pub struct ConnectionManager {
    factory: Box<dyn SessionFactory>,
    connections: RwLock<Connections>,
}

/// The live session table, indexed by slot.
struct Connections {
    sessions: [Box<dyn OrderingTransport>; 4],
}

impl Connections {
    fn open(factory: &dyn SessionFactory, peers: &PeerSet) -> Self {
        Self {
            sessions: PeerSlot::ALL.map(|slot| factory.create(peers.get(slot))),
        }
    }

    fn get(&self, slot: PeerSlot) -> &dyn OrderingTransport {
        &*self.sessions[slot as usize]
    }
}

impl ConnectionManager {
    /// Open one session per slot immediately and rebuild all four on every
    /// peer-set update.
    pub fn new(
        factory: Box<dyn SessionFactory>,
        initial_peers: &PeerSet,
        peer_updates: &Notifier<PeerSet>,
    ) -> Arc<Self> {
        let connections = Connections::open(factory.as_ref(), initial_peers);
        let manager = Arc::new(Self {
            factory,
            connections: RwLock::new(connections),
        });

        let weak = Arc::downgrade(&manager);
        peer_updates.subscribe(move |peers| {
            if let Some(manager) = weak.upgrade() {
                manager.rebuild(peers);
            }
        });

        manager
    }

    fn rebuild(&self, peers: &PeerSet) {
        info!(issuer = %peers.issuer.id, "rebuilding ordering sessions");
        let mut connections = self.connections.write();
        *connections = Connections::open(self.factory.as_ref(), peers);
    }
}

impl OrderingTransport for ConnectionManager {
    /// Fan a batch published at `round` out to the three consumer slots,
    /// each addressed to the future round that peer might build. The issuer
    /// slot never receives transactions.
    fn on_transactions(&self, round: Round, transactions: Vec<Arc<Transaction>>) {
        debug!(round = %round, count = transactions.len(), "publishing transactions");
        let connections = self.connections.read();

        connections.get(PeerSlot::CurrentRoundRejectConsumer).on_transactions(
            Round::new(round.height, round.reject + 2),
            transactions.clone(),
        );
        connections.get(PeerSlot::NextRoundRejectConsumer).on_transactions(
            Round::new(round.height + 1, FIRST_REJECT_ROUND + 1),
            transactions.clone(),
        );
        connections
            .get(PeerSlot::NextRoundCommitConsumer)
            .on_transactions(Round::first(round.height + 2), transactions);
    }

    fn on_request_proposal(&self, round: Round) -> Option<Arc<Proposal>> {
        self.connections
            .read()
            .get(PeerSlot::Issuer)
            .on_request_proposal(round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_core::test_utils::{RecordingSessionFactory, RecordingTransport};
    use conclave_types::test_utils::{test_peer, test_proposal, test_transaction};
    use conclave_types::PeerId;

    fn peer_set(base: u8) -> PeerSet {
        PeerSet {
            issuer: test_peer(base),
            current_round_reject_consumer: test_peer(base + 1),
            next_round_reject_consumer: test_peer(base + 2),
            next_round_commit_consumer: test_peer(base + 3),
        }
    }

    fn build() -> (
        Arc<RecordingSessionFactory>,
        Arc<Notifier<PeerSet>>,
        Arc<ConnectionManager>,
    ) {
        let factory = Arc::new(RecordingSessionFactory::new());
        let updates = Arc::new(Notifier::new());
        let manager =
            ConnectionManager::new(Box::new(Arc::clone(&factory)), &peer_set(1), &updates);
        (factory, updates, manager)
    }

    fn session(factory: &RecordingSessionFactory, seed: u8) -> Arc<RecordingTransport> {
        factory
            .session_for(PeerId(seed as u64))
            .expect("session exists")
    }

    #[test]
    fn test_opens_four_sessions_immediately() {
        let (factory, _updates, _manager) = build();
        assert_eq!(factory.session_count(), 4);
    }

    /// A batch published at `(5, 3)` reaches the consumers addressed to
    /// `(5, 5)`, `(6, 2)` and `(7, 1)`; the issuer receives nothing.
    #[test]
    fn test_fan_out_round_targets() {
        let (factory, _updates, manager) = build();
        let txs = vec![test_transaction(1), test_transaction(2)];

        manager.on_transactions(Round::new(5, 3), txs.clone());

        let sent = |seed: u8| session(&factory, seed).sent_transactions();
        assert_eq!(sent(2), vec![(Round::new(5, 5), txs.clone())]);
        assert_eq!(sent(3), vec![(Round::new(6, 2), txs.clone())]);
        assert_eq!(sent(4), vec![(Round::new(7, 1), txs)]);
        assert!(sent(1).is_empty());
    }

    #[test]
    fn test_proposal_request_goes_to_issuer() {
        let (factory, _updates, manager) = build();
        let round = Round::first(3);
        let proposal = test_proposal(round, &[1, 2]);
        session(&factory, 1).stage_proposal(Arc::clone(&proposal));

        let result = manager.on_request_proposal(round);

        assert_eq!(result, Some(proposal));
        assert_eq!(session(&factory, 1).requested_rounds(), vec![round]);
        assert!(session(&factory, 2).requested_rounds().is_empty());
    }

    #[test]
    fn test_missing_proposal_is_forwarded_as_none() {
        let (_factory, _updates, manager) = build();
        assert_eq!(manager.on_request_proposal(Round::first(9)), None);
    }

    /// A peer-set update rebuilds exactly four sessions, and no session
    /// from the old set is used afterwards.
    #[test]
    fn test_peer_update_rebuilds_all_sessions() {
        let (factory, updates, manager) = build();

        updates.notify(&peer_set(11));
        assert_eq!(factory.session_count(), 8);

        manager.on_transactions(Round::new(2, 1), vec![test_transaction(9)]);

        for seed in 1..=4 {
            assert!(session(&factory, seed).sent_transactions().is_empty());
        }
        assert_eq!(session(&factory, 12).sent_transactions().len(), 1);
        assert_eq!(session(&factory, 13).sent_transactions().len(), 1);
        assert_eq!(session(&factory, 14).sent_transactions().len(), 1);
    }

    #[test]
    fn test_update_after_drop_is_ignored() {
        let (factory, updates, manager) = build();
        drop(manager);

        updates.notify(&peer_set(21));

        assert_eq!(factory.session_count(), 4);
    }
}
