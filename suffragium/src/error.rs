use crate::*;

use thiserror::Error;

/// Error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("suffragium: signature error: {0}")]
    SignatureError(#[from] ed25519_dalek::SignatureError),

    #[error("suffragium: mismatched public keys")]
    MismatchedPublicKeys,

    #[error("suffragium: invalid hexidecimal")]
    BadHex,

    #[error("suffragium: wrong length, expected {expected} bytes, found {found}")]
    BadLen { expected: usize, found: usize },

    #[error("suffragium: CBOR error: {0}")]
    CBOR(#[from] serde_cbor::Error),

    #[error("suffragium: JSON error deserializing transaction: {0}")]
    JSONDeserialization(#[from] serde_json::Error),

    #[error("suffragium: error deserializing transaction: unknown format")]
    DeserializationUnknownFormat,

    #[error("suffragium: invalid configuration: {0}")]
    InvalidConfig(#[from] ValidationError),
}

/// Transaction Validation errors
///
/// Every rejection leaves ledger state untouched.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("suffragium validation: public values do not match the configured domain or email key")]
    InvalidPublicValues,

    #[error("suffragium validation: identity proof rejected by the verification engine")]
    InvalidProof,

    #[error("suffragium validation: public values do not attest eligibility")]
    NotEligible,

    #[error("suffragium validation: voter has already cast a ballot in this vote")]
    AlreadyVoted,

    #[error("suffragium validation: end block {end_block} is not after current height {height}")]
    InvalidEndMarker { end_block: u64, height: u64 },

    #[error("suffragium validation: vote {0} does not exist")]
    VoteNotFound(VoteId),

    #[error("suffragium validation: vote {0} is closed to new ballots")]
    VoteEnded(VoteId),

    #[error("suffragium validation: vote {0} has not ended")]
    VoteNotEnded(VoteId),

    #[error("suffragium validation: reveal already requested for vote {0}")]
    AlreadyRequested(VoteId),

    #[error("suffragium validation: result of vote {0} is not revealed yet")]
    NotYetRevealed(VoteId),

    #[error("suffragium validation: decryption callback is not from the oracle or carries an unknown token")]
    UnauthorizedCallback,

    #[error("suffragium validation: decryption callback must carry exactly one boolean")]
    InvalidCallbackPayload,

    #[error("suffragium validation: caller is not the owner")]
    NotOwner,

    #[error("suffragium validation: quorum {0} exceeds 100%")]
    InvalidQuorum(u64),

    #[error("suffragium validation: ballot rejected: {0}")]
    InvalidBallot(RuntimeError),

    #[error("suffragium validation: ciphertext runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("suffragium validation: signature error: {0}")]
    SignatureError(#[from] ed25519_dalek::SignatureError),

    #[error("suffragium validation: unable to encode transaction: {0}")]
    Encoding(#[from] serde_cbor::Error),
}
