//! Error kinds for the Solidus core (spec §7).
//!
//! Every variant is distinct and never conflated: callers match on kind to
//! decide policy. `LedgerConflict` is the only variant a [`crate::bank`]
//! handler retries locally; everything else is fatal for the in-flight
//! transaction and drives the handler back to `Idle`.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SolidusError {
    /// A plaintext fell outside `[-B, B]` (or `[0, B]` for a range proof).
    #[error("plaintext out of range")]
    OutOfRange,

    /// A Sigma proof failed to re-derive its Fiat-Shamir challenge.
    #[error("proof failed verification")]
    InvalidProof,

    /// A request's signature did not verify under the declared account key.
    #[error("signature failed verification")]
    InvalidSignature,

    /// A request's nonce was not strictly greater than the last seen nonce
    /// for its source account.
    #[error("nonce was already seen or is not strictly increasing")]
    ReplayedNonce,

    /// The PVORM stash would exceed its fixed capacity `sigma`.
    #[error("PVORM stash overflow")]
    StashOverflow,

    /// `casAppend` lost the compare-and-append race; the caller should retry.
    #[error("ledger compare-and-append conflict, retry")]
    LedgerConflict,

    /// A wire value failed to parse.
    #[error("malformed on-wire encoding: {0}")]
    MalformedEncoding(String),
}

pub type Result<T> = std::result::Result<T, SolidusError>;
