//! Round state machine and proposal-level agreement adapter.
//!
//! Two components live here, either side of the vote:
//!
//! - [`OrderingGate`]: advances the current round on block and empty events,
//!   pulls the round's proposal from the issuer peer, and votes.
//! - [`ProposalGate`]: turns that vote into an opaque fingerprint for the
//!   hash-agreement primitive and lifts raw commit/reject outcomes back to
//!   proposal outcomes.
//!
//! The [`fingerprint`] module owns the lossless encoding between votes and
//! agreement hashes.
//!
//! # One round, end to end
//!
//! ```text
//! RoundEvent ─▶ OrderingGate ─▶ ordering service (pack)
//!                     │        ─▶ issuer (request proposal)
//!                     ▼
//!               ProposalGate ─▶ hash gate (vote on fingerprint)
//!                     ▲                     │
//!                     └──── raw outcome ◀───┘
//!                     │
//!        Commit(proposal) ─▶ downstream    Reject / empty ─▶ next round
//! ```

pub mod fingerprint;

mod error;
mod ordering_gate;
mod proposal_gate;

pub use error::{CodecError, GateError};
pub use fingerprint::ProposalInfo;
pub use ordering_gate::OrderingGate;
pub use proposal_gate::ProposalGate;
