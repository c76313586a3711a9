//! `TransactionRequest` (spec §3): a user's signed authorization to move a
//! confidential value from one account to another, across two banks.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::curve::Point;
use crate::elgamal::Ciphertext;
use crate::error::{Result, SolidusError};
use crate::signing::{self, Signable, Signature, TranscriptBuilder};

/// Everything a sender signs to authorize a transfer. `dest_account_ciphertext`
/// and `value_ciphertext` are both already ciphertexts at request time — the
/// former under the destination bank's key (so only that bank ever learns
/// the receiving account), the latter under the source bank's key (so the
/// sending bank can range-check it before building a [`super::TransactionHeader`]).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    #[serde(with = "crate::crypto_serde::point")]
    pub source_account_pubkey: Point,
    #[serde(with = "crate::crypto_serde::point")]
    pub source_bank_pubkey: Point,
    #[serde(with = "crate::crypto_serde::point")]
    pub dest_bank_pubkey: Point,
    pub dest_account_ciphertext: Ciphertext,
    pub value_ciphertext: Ciphertext,
    /// Strictly-increasing per-source-account anti-replay counter (spec §9
    /// Open Question: tightened to strictly increasing, persisted — see
    /// [`crate::bank::nonce`]).
    pub nonce: u64,
    pub signature: Signature,
}

impl TransactionRequest {
    /// Builds and signs a request under `source_account_sk`, which must
    /// correspond to `source_account_pubkey`.
    #[allow(clippy::too_many_arguments)]
    pub fn sign(
        source_account_sk: crate::curve::Scalar,
        source_account_pubkey: Point,
        source_bank_pubkey: Point,
        dest_bank_pubkey: Point,
        dest_account_ciphertext: Ciphertext,
        value_ciphertext: Ciphertext,
        nonce: u64,
        rng: &mut impl RngCore,
    ) -> Self {
        let unsigned = UnsignedRequest {
            source_account_pubkey,
            source_bank_pubkey,
            dest_bank_pubkey,
            dest_account_ciphertext,
            value_ciphertext,
            nonce,
        };
        let message = unsigned.to_signing_bytes();
        let signature = signing::sign(source_account_sk, &message, rng);
        Self {
            source_account_pubkey,
            source_bank_pubkey,
            dest_bank_pubkey,
            dest_account_ciphertext,
            value_ciphertext,
            nonce,
            signature,
        }
    }

    /// Verifies the signature against the request's own declared
    /// `source_account_pubkey`. Does not check nonce freshness — that is a
    /// bank-state concern (spec §5's anti-replay, see [`crate::bank::nonce`]).
    pub fn verify_signature(&self) -> Result<()> {
        let unsigned = UnsignedRequest {
            source_account_pubkey: self.source_account_pubkey,
            source_bank_pubkey: self.source_bank_pubkey,
            dest_bank_pubkey: self.dest_bank_pubkey,
            dest_account_ciphertext: self.dest_account_ciphertext,
            value_ciphertext: self.value_ciphertext,
            nonce: self.nonce,
        };
        let message = unsigned.to_signing_bytes();
        if signing::verify(self.source_account_pubkey, &message, &self.signature) {
            Ok(())
        } else {
            Err(SolidusError::InvalidSignature)
        }
    }
}

/// The fields a request signs over, split out so `sign`/`verify_signature`
/// share one transcript definition instead of duplicating field order.
struct UnsignedRequest {
    source_account_pubkey: Point,
    source_bank_pubkey: Point,
    dest_bank_pubkey: Point,
    dest_account_ciphertext: Ciphertext,
    value_ciphertext: Ciphertext,
    nonce: u64,
}

impl Signable for UnsignedRequest {
    fn domain_kind(&self) -> &'static str {
        "solidus/transaction_request_v1"
    }

    fn write_transcript(&self, builder: &mut TranscriptBuilder) {
        builder.append_point(&self.source_account_pubkey);
        builder.append_point(&self.source_bank_pubkey);
        builder.append_point(&self.dest_bank_pubkey);
        self.dest_account_ciphertext.write_transcript(builder);
        self.value_ciphertext.write_transcript(builder);
        builder.append_u64(self.nonce);
    }
}

/// Signable over the same fields as [`UnsignedRequest`] (the signature
/// itself is never folded into a transcript). Used to derive a
/// transaction's id, `H(TransactionRequest)` (spec §6), from an
/// already-signed, on-ledger request.
impl Signable for TransactionRequest {
    fn domain_kind(&self) -> &'static str {
        "solidus/transaction_request_v1"
    }

    fn write_transcript(&self, builder: &mut TranscriptBuilder) {
        builder.append_point(&self.source_account_pubkey);
        builder.append_point(&self.source_bank_pubkey);
        builder.append_point(&self.dest_bank_pubkey);
        self.dest_account_ciphertext.write_transcript(builder);
        self.value_ciphertext.write_transcript(builder);
        builder.append_u64(self.nonce);
    }
}
