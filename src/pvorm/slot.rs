//! `PVORMSlot`: a `(keyCiphertext, balanceCiphertext)` pair, both ElGamal
//! ciphertexts under the owning bank's key (spec §3).

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::curve::{Point, Scalar};
use crate::elgamal::{encrypt_point, encrypt_value, reencrypt, Ciphertext};
use crate::pvorm::account_id::identity_placeholder;
use crate::signing::{Signable, TranscriptBuilder};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PvormSlot {
    pub key_ct: Ciphertext,
    pub bal_ct: Ciphertext,
}

impl Signable for PvormSlot {
    fn domain_kind(&self) -> &'static str {
        "pvorm/slot_v1"
    }

    fn write_transcript(&self, builder: &mut TranscriptBuilder) {
        self.key_ct.write_transcript(builder);
        self.bal_ct.write_transcript(builder);
    }
}

impl PvormSlot {
    /// Builds a fresh encryption of the identity placeholder with balance 0
    /// — indistinguishable from a live slot to anyone lacking the bank key.
    pub fn identity(bank_pk: Point, rng: &mut impl RngCore) -> Self {
        let (key_ct, _) = encrypt_point(bank_pk, identity_placeholder(), rng);
        let (bal_ct, _) = encrypt_value(bank_pk, Scalar::from(0u64), rng);
        PvormSlot { key_ct, bal_ct }
    }

    /// Re-randomizes both ciphertexts, preserving plaintexts.
    pub fn reencrypted(&self, bank_pk: Point, rng: &mut impl RngCore) -> (Self, Scalar, Scalar) {
        let (key_ct, r_key) = reencrypt(bank_pk, self.key_ct, rng);
        let (bal_ct, r_bal) = reencrypt(bank_pk, self.bal_ct, rng);
        (PvormSlot { key_ct, bal_ct }, r_key, r_bal)
    }
}
