//! Events, streams and collaborator interfaces for the ordering pipeline.
//!
//! This crate defines how the pipeline's components talk to each other and
//! to the outside world:
//!
//! - [`RoundEvent`], [`Vote`], [`Outcome`]: the values flowing between the
//!   ordering gate and the proposal gate
//! - [`AgreementHash`], [`AgreementOutcome`], [`ClusterOrder`]: the
//!   vocabulary of the hash-agreement layer
//! - [`Notifier`]: the push-based stream primitive connecting producers to
//!   consumers
//! - Collaborator traits ([`OrderingTransport`], [`HashGate`],
//!   [`PeerOrderer`], …) so the transport, the agreement primitive and the
//!   factories can be injected
//!
//! # Architecture
//!
//! The pipeline is synchronous: threads deliver events into components,
//! components guard their state with reader/writer locks, and streams invoke
//! consumer callbacks on the producer's thread. There is no runtime and no
//! task spawning in this layer.

mod agreement;
mod event;
mod stream;
mod traits;

pub use agreement::{AgreementHash, AgreementOutcome, AgreementVote, ClusterOrder};
pub use event::{Outcome, RoundEvent, Vote};
pub use stream::Notifier;
pub use traits::{
    BatchFactory, HashGate, OrderingService, OrderingTransport, PeerOrderer, ProposalFactory,
    SessionFactory, SingletonBatchFactory, SystemProposalFactory,
};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
