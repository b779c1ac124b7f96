//! Gate error types.

use conclave_types::{Hash, HexError, Round};
use thiserror::Error;

/// Failure decoding an agreement hash back into a round and fingerprint.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// The round part is not two decimal integers.
    #[error("agreement hash carries a malformed round part: {0:?}")]
    MalformedRound(String),

    /// The proposal part is neither empty nor valid hex.
    #[error("agreement hash carries a malformed fingerprint")]
    MalformedFingerprint(#[from] HexError),
}

/// Errors surfaced by the proposal gate.
///
/// None of these unwind the pipeline: a failed vote leaves the round to be
/// retried on the next event, and an errored outcome is logged and dropped
/// by the ordering gate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GateError {
    /// The peer orderer produced no cluster order for the vote's
    /// fingerprint. The vote was not submitted.
    #[error("peer orderer produced no cluster order for round {round}")]
    OrdererRefused { round: Round },

    /// Agreement committed a fingerprint this peer never voted for.
    /// Fetching the proposal from the peer that holds it is not implemented;
    /// the round and fingerprint are surfaced so a future fetch layer can
    /// take over.
    #[error("committed proposal for round {round} is not held locally")]
    ForeignCommit {
        round: Round,
        fingerprint: Option<Hash>,
    },

    /// An outcome arrived carrying no votes at all.
    #[error("agreement outcome carried no votes")]
    EmptyOutcome,

    /// An outcome carried an agreement hash the codec cannot decode.
    #[error(transparent)]
    Codec(#[from] CodecError),
}
