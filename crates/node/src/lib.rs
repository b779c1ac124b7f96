//! Assembles the ordering pipeline from its components.
//!
//! A node runs one [`OrderingPipeline`]: the local ordering service, the
//! connection manager fanning traffic out to the peer slots, and the two
//! gates bridging block-commit events to hash-level agreement. Transport
//! sessions, the agreement primitive, the peer orderer and the factories
//! are injected; the pipeline decides nothing about them.
//!
//! ```text
//! transactions ─▶ propagate ─▶ connection manager ─▶ remote services
//! block events ─▶ ordering gate ─▶ proposal gate ─▶ hash agreement
//!                      ▲                                  │
//!                      └───────────── outcomes ◀──────────┘
//!                      │
//!                      ▼
//!              on_proposal() ─▶ downstream pipeline
//! ```

use conclave_core::{
    BatchFactory, HashGate, Notifier, OrderingService, OrderingTransport, PeerOrderer,
    ProposalFactory, RoundEvent, SessionFactory,
};
use conclave_gate::{OrderingGate, ProposalGate};
use conclave_network::{ConnectionManager, PeerSet};
use conclave_ordering::InMemoryOrderingService;
use conclave_types::{Proposal, Round, Transaction, TransactionBatch};
use std::sync::Arc;
use tracing::info;

pub use conclave_ordering::OrderingConfig;

/// The assembled on-demand ordering pipeline of one peer.
pub struct OrderingPipeline {
    round_events: Arc<Notifier<RoundEvent>>,
    ordering_service: Arc<InMemoryOrderingService>,
    connection_manager: Arc<ConnectionManager>,
    ordering_gate: Arc<OrderingGate>,
}

impl OrderingPipeline {
    /// Build and wire all components. The pipeline starts at
    /// `config.initial_round` with the forward accepting queues already
    /// packed.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: &OrderingConfig,
        session_factory: Box<dyn SessionFactory>,
        initial_peers: &PeerSet,
        peer_updates: &Notifier<PeerSet>,
        orderer: Arc<dyn PeerOrderer>,
        hash_gate: Arc<dyn HashGate>,
        proposal_factory: Arc<dyn ProposalFactory>,
        batch_factory: Arc<dyn BatchFactory>,
    ) -> Self {
        let ordering_service = Arc::new(InMemoryOrderingService::new(config, proposal_factory));
        let connection_manager =
            ConnectionManager::new(session_factory, initial_peers, peer_updates);
        let proposal_gate = Arc::new(ProposalGate::new(hash_gate, orderer));

        let round_events = Arc::new(Notifier::new());
        let ordering_gate = OrderingGate::new(
            Arc::clone(&ordering_service) as Arc<dyn OrderingService>,
            Arc::clone(&connection_manager) as Arc<dyn OrderingTransport>,
            proposal_gate,
            batch_factory,
            &round_events,
            config.initial_round,
        );

        info!(round = %config.initial_round, "ordering pipeline assembled");
        Self {
            round_events,
            ordering_service,
            connection_manager,
            ordering_gate,
        }
    }

    /// A block was committed at `height`; start the round `(height, 1)`.
    pub fn on_block_committed(&self, height: u64) {
        self.round_events.notify(&RoundEvent::Block { height });
    }

    /// The previous round produced no block; bump the reject index.
    pub fn on_empty_round(&self) {
        self.round_events.notify(&RoundEvent::Empty);
    }

    /// Fan a batch out to the consumer peers.
    pub fn propagate_batch(&self, batch: &TransactionBatch) {
        self.ordering_gate.propagate_batch(batch);
    }

    /// Wrap a loose transaction into a batch and fan it out.
    pub fn propagate_transaction(&self, transaction: Arc<Transaction>) {
        self.ordering_gate.propagate_transaction(transaction);
    }

    /// Committed proposals ready for the downstream pipeline.
    pub fn on_proposal(&self) -> &Notifier<Arc<Proposal>> {
        self.ordering_gate.on_proposal()
    }

    /// The round currently being voted on.
    pub fn current_round(&self) -> Round {
        self.ordering_gate.current_round()
    }

    /// The local ordering service, for wiring the inbound transport server
    /// that remote peers reach.
    pub fn ordering_service(&self) -> &Arc<InMemoryOrderingService> {
        &self.ordering_service
    }

    /// The connection manager, should callers need to issue transport calls
    /// directly.
    pub fn connection_manager(&self) -> &Arc<ConnectionManager> {
        &self.connection_manager
    }
}
