//! `TransactionHeader` (spec §4.4): the sending bank's public introduction
//! of a transaction — the request plus everything needed to convince any
//! observer the transferred value is in range and the two banks'
//! ciphertexts agree on it, without revealing the value itself.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::curve::{Point, Scalar};
use crate::elgamal::{encrypt_value, reencrypt, Ciphertext};
use crate::error::Result;
use crate::proofs::{MaxwellRangeProof, PlaintextEqDisKeyProof, PlaintextEqProof};
use crate::signing::Signable;

use super::request::TransactionRequest;

const PROOF_CTX_RANGE: &str = "solidus/transaction/range_v1";
const PROOF_CTX_RERANDOMIZE: &str = "solidus/transaction/rerandomize_v1";
const PROOF_CTX_CROSS_KEY: &str = "solidus/transaction/cross_key_v1";

/// A `TransactionRequest` plus the three Generalized Schnorr proofs spec
/// §4.4 requires: that the original value is in range, that the
/// rerandomized-under-sender-key value is the same plaintext as the
/// original, and that the receiver's value (encrypted under the dest bank's
/// key) is that same plaintext again.
#[derive(Clone, Serialize, Deserialize)]
pub struct TransactionHeader {
    pub request: TransactionRequest,
    pub range_proof: MaxwellRangeProof,
    pub sender_rerandomized_value: Ciphertext,
    pub receiver_value: Ciphertext,
    pub rerandomize_proof: PlaintextEqProof,
    pub cross_key_proof: PlaintextEqDisKeyProof,
}

impl TransactionHeader {
    /// Builds a header from an already-signed `request`, given the
    /// plaintext `value` and the randomizer used for
    /// `request.value_ciphertext` (both known to the sending bank, which
    /// either chose them itself or decrypted the request value ciphertext
    /// under its own key).
    ///
    /// Returns the header alongside `receiver_value`'s randomizer `r_recv`.
    /// That randomizer is never published (only `receiver_value` itself is,
    /// inside the header) and is not derivable by the destination bank from
    /// the ciphertext alone; the sending bank must relay it out-of-band so
    /// the receiver can track cumulative randomness for its own PVORM
    /// bookkeeping (spec §1 scopes bank-to-bank networking as an external
    /// collaborator — this is the one piece of data that channel carries).
    pub fn build(
        request: TransactionRequest,
        value: i64,
        value_randomness: Scalar,
        max_value: i64,
        rng: &mut impl RngCore,
    ) -> Result<(Self, Scalar)> {
        let source_bank_pk = request.source_bank_pubkey;
        let dest_bank_pk = request.dest_bank_pubkey;

        let range_proof = MaxwellRangeProof::prove(
            PROOF_CTX_RANGE,
            source_bank_pk,
            request.value_ciphertext,
            max_value,
            value,
            value_randomness,
            rng,
        )?;

        let (sender_rerandomized_value, r_prime) =
            reencrypt(source_bank_pk, request.value_ciphertext, rng);
        let rerandomize_proof = PlaintextEqProof::prove(
            PROOF_CTX_RERANDOMIZE,
            source_bank_pk,
            request.value_ciphertext,
            sender_rerandomized_value,
            r_prime,
            rng,
        );

        let total_sender_randomness = value_randomness + r_prime;
        let value_scalar = signed_scalar(value);
        let (receiver_value, r_recv) = encrypt_value(dest_bank_pk, value_scalar, rng);
        let cross_key_proof = PlaintextEqDisKeyProof::prove(
            PROOF_CTX_CROSS_KEY,
            source_bank_pk,
            dest_bank_pk,
            sender_rerandomized_value,
            receiver_value,
            value_scalar,
            total_sender_randomness,
            r_recv,
            rng,
        );

        let header = Self {
            request,
            range_proof,
            sender_rerandomized_value,
            receiver_value,
            rerandomize_proof,
            cross_key_proof,
        };
        Ok((header, r_recv))
    }

    /// `verifyProofs` (spec §4.4): the request's signature, then all three
    /// proofs. Any ledger observer runs this before accepting the first half
    /// of a transaction.
    pub fn verify_proofs(&self, max_value: i64) -> Result<()> {
        self.request.verify_signature()?;

        let source_bank_pk = self.request.source_bank_pubkey;
        let dest_bank_pk = self.request.dest_bank_pubkey;

        if !self.range_proof.verify(
            PROOF_CTX_RANGE,
            source_bank_pk,
            self.request.value_ciphertext,
            max_value,
        ) {
            return Err(crate::error::SolidusError::InvalidProof);
        }
        if !self.rerandomize_proof.verify(
            PROOF_CTX_RERANDOMIZE,
            source_bank_pk,
            self.request.value_ciphertext,
            self.sender_rerandomized_value,
        ) {
            return Err(crate::error::SolidusError::InvalidProof);
        }
        if !self.cross_key_proof.verify(
            PROOF_CTX_CROSS_KEY,
            source_bank_pk,
            dest_bank_pk,
            self.sender_rerandomized_value,
            self.receiver_value,
        ) {
            return Err(crate::error::SolidusError::InvalidProof);
        }
        Ok(())
    }
}

fn signed_scalar(v: i64) -> Scalar {
    if v < 0 {
        -Scalar::from(v.unsigned_abs())
    } else {
        Scalar::from(v as u64)
    }
}
