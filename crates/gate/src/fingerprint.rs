//! Round and fingerprint codec for the agreement layer.
//!
//! The agreement primitive orders opaque hashes. This module encodes a vote
//! (a round plus an optional proposal content hash) into that opaque form,
//! and decodes committed hashes back. The encoding is lossless for
//! well-formed inputs: the round renders as decimal `"<height> <reject>"`,
//! the fingerprint as hex, with the empty string marking an empty vote.

use crate::CodecError;
use conclave_core::{AgreementHash, Vote};
use conclave_types::{Hash, Round};

/// Data recovered from an agreement hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalInfo {
    pub round: Round,
    /// Content hash of the agreed proposal; `None` for the empty candidate.
    pub fingerprint: Option<Hash>,
}

/// Encode a vote into the hash the agreement layer votes on.
pub fn make_hash(vote: &Vote) -> AgreementHash {
    AgreementHash {
        round_part: format!("{} {}", vote.round.height, vote.round.reject),
        proposal_part: vote
            .proposal
            .as_ref()
            .map(|proposal| proposal.hash().to_hex())
            .unwrap_or_default(),
    }
}

/// Decode an agreement hash back into its round and optional fingerprint.
pub fn make_proposal_info(hash: &AgreementHash) -> Result<ProposalInfo, CodecError> {
    let round = parse_round(&hash.round_part)?;
    let fingerprint = if hash.proposal_part.is_empty() {
        None
    } else {
        Some(Hash::from_hex(&hash.proposal_part)?)
    };
    Ok(ProposalInfo { round, fingerprint })
}

fn parse_round(part: &str) -> Result<Round, CodecError> {
    let malformed = || CodecError::MalformedRound(part.to_owned());

    let mut tokens = part.split_whitespace();
    let height = tokens
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(malformed)?;
    let reject = tokens
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(malformed)?;
    if tokens.next().is_some() {
        return Err(malformed());
    }
    Ok(Round::new(height, reject))
}
