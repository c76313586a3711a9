//! L1 — additive ElGamal over the fixed curve (spec §4.1).
//!
//! Ciphertexts are pairs `(c1, c2) = (rG, rY + mG)` under public key
//! `Y = xG`. Addition is componentwise; re-encryption adds a fresh
//! `Enc_Y(0; r')`. Balances live in a bounded window `[-B, B]` recovered via
//! [`dlog_table`].

pub mod dlog_table;

use std::sync::Arc;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::curve::{generator, random_scalar, Point, Scalar};
use crate::error::{Result, SolidusError};
use crate::signing::{Signable, TranscriptBuilder};
use dlog_table::DlogTable;

/// Crypto parameters shared by every component in one Solidus deployment.
/// Constructed once and handed down immutably (spec §9): never process-wide
/// mutable state.
#[derive(Clone)]
pub struct EncryptionParams {
    /// `B`: the signed balance window `[-B, B]`.
    pub max_discrete_log: i64,
    /// Baby-step table gap: trade table size for lookup cost.
    pub table_gap: u32,
    /// Canonicalize point encodings before every hash/comparison, so two
    /// peers always derive identical transcript bytes.
    pub normalize_points: bool,
    /// Multiply a ciphertext by a fresh scalar before the table lookup, to
    /// randomize memory access order during decryption.
    pub blind_decryption: bool,
    table: Arc<DlogTable>,
}

impl EncryptionParams {
    pub fn new(max_discrete_log: i64, table_gap: u32) -> Self {
        Self {
            max_discrete_log,
            table_gap,
            normalize_points: true,
            blind_decryption: false,
            table: Arc::new(DlogTable::build(max_discrete_log, table_gap)),
        }
    }

    pub fn with_blind_decryption(mut self, enabled: bool) -> Self {
        self.blind_decryption = enabled;
        self
    }
}

/// An additively-homomorphic ElGamal ciphertext `(c1, c2) = (rG, rY + mG)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext {
    #[serde(with = "crate::crypto_serde::point")]
    pub c1: Point,
    #[serde(with = "crate::crypto_serde::point")]
    pub c2: Point,
}

impl Ciphertext {
    pub fn identity() -> Self {
        use ark_std::Zero;
        Ciphertext {
            c1: Point::zero(),
            c2: Point::zero(),
        }
    }
}

impl Signable for Ciphertext {
    fn domain_kind(&self) -> &'static str {
        "elgamal/ciphertext_v1"
    }

    fn write_transcript(&self, builder: &mut TranscriptBuilder) {
        builder.append_point(&self.c1);
        builder.append_point(&self.c2);
    }
}

impl std::ops::Add for Ciphertext {
    type Output = Ciphertext;
    fn add(self, rhs: Ciphertext) -> Ciphertext {
        Ciphertext {
            c1: self.c1 + rhs.c1,
            c2: self.c2 + rhs.c2,
        }
    }
}

impl std::ops::Sub for Ciphertext {
    type Output = Ciphertext;
    fn sub(self, rhs: Ciphertext) -> Ciphertext {
        Ciphertext {
            c1: self.c1 - rhs.c1,
            c2: self.c2 - rhs.c2,
        }
    }
}

impl std::ops::Mul<Scalar> for Ciphertext {
    type Output = Ciphertext;
    fn mul(self, rhs: Scalar) -> Ciphertext {
        Ciphertext {
            c1: self.c1 * rhs,
            c2: self.c2 * rhs,
        }
    }
}

/// Encrypts a bounded balance `m in [-B, B]` under `pk`, with fresh
/// randomness `r` drawn from the caller's RNG. Fails `OutOfRange` if `m`
/// falls outside the configured window.
pub fn encrypt_balance(
    params: &EncryptionParams,
    pk: Point,
    m: i64,
    rng: &mut impl RngCore,
) -> Result<(Ciphertext, Scalar)> {
    if m.unsigned_abs() as i64 > params.max_discrete_log {
        return Err(SolidusError::OutOfRange);
    }
    let r = random_scalar(rng);
    let m_scalar = if m < 0 {
        -Scalar::from(m.unsigned_abs())
    } else {
        Scalar::from(m as u64)
    };
    let ct = Ciphertext {
        c1: generator() * r,
        c2: pk * r + generator() * m_scalar,
    };
    Ok((ct, r))
}

/// Encrypts an arbitrary scalar (not bounded to the balance window) under
/// `pk`. Used where the "plaintext" is a point exponent appearing only
/// inside a proof transcript, never decrypted through the table.
pub fn encrypt_value(
    pk: Point,
    n: Scalar,
    rng: &mut impl RngCore,
) -> (Ciphertext, Scalar) {
    let r = random_scalar(rng);
    let ct = Ciphertext {
        c1: generator() * r,
        c2: pk * r + generator() * n,
    };
    (ct, r)
}

/// Encrypts a point `P` directly (plaintext is `P`, not `mG` for a small
/// `m`). Used for PVORM key ciphertexts, whose plaintext is an account's
/// ORAM identifier (a hash of its public key into `G`), not a small integer.
pub fn encrypt_point(
    pk: Point,
    p: Point,
    rng: &mut impl RngCore,
) -> (Ciphertext, Scalar) {
    let r = random_scalar(rng);
    let ct = Ciphertext {
        c1: generator() * r,
        c2: pk * r + p,
    };
    (ct, r)
}

/// Re-encrypts `c` under `pk` with fresh randomness `r'`, preserving the
/// plaintext: `decrypt(reencrypt(c)) == decrypt(c)`.
pub fn reencrypt(pk: Point, c: Ciphertext, rng: &mut impl RngCore) -> (Ciphertext, Scalar) {
    let r_prime = random_scalar(rng);
    let blinding = Ciphertext {
        c1: generator() * r_prime,
        c2: pk * r_prime,
    };
    (c + blinding, r_prime)
}

/// Decrypts to the underlying point `mG` (or `P` for a point-plaintext
/// ciphertext), without attempting a table lookup.
pub fn decrypt_point(sk: Scalar, c: Ciphertext) -> Point {
    c.c2 - c.c1 * sk
}

/// Decrypts a bounded-balance ciphertext to its signed integer plaintext.
/// Fails `OutOfRange` if the recovered point is not in the table (e.g. it
/// does not actually encrypt a value in `[-B, B]`).
pub fn decrypt_balance(
    params: &EncryptionParams,
    sk: Scalar,
    c: Ciphertext,
    rng: &mut impl RngCore,
) -> Result<i64> {
    let point = if params.blind_decryption {
        let k = random_scalar(rng);
        let blinded = decrypt_point(sk, c * k);
        let k_inv = k.inverse_or_zero();
        blinded * k_inv
    } else {
        decrypt_point(sk, c)
    };
    params
        .table
        .lookup(&point)
        .ok_or(SolidusError::OutOfRange)
}

use ark_ff::Field;
trait InverseOrZero {
    fn inverse_or_zero(&self) -> Scalar;
}
impl InverseOrZero for Scalar {
    fn inverse_or_zero(&self) -> Scalar {
        self.inverse().unwrap_or(Scalar::from(0u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::generator;

    fn params() -> EncryptionParams {
        EncryptionParams::new(1024, 1)
    }

    fn keypair(rng: &mut impl RngCore) -> (Scalar, Point) {
        let sk = random_scalar(rng);
        (sk, generator() * sk)
    }

    #[test]
    fn roundtrip_encrypt_decrypt() {
        let mut rng = rand::thread_rng();
        let params = params();
        let (sk, pk) = keypair(&mut rng);
        for m in [-1024i64, -30, 0, 1, 30, 1024] {
            let (ct, _) = encrypt_balance(&params, pk, m, &mut rng).unwrap();
            let got = decrypt_balance(&params, sk, ct, &mut rng).unwrap();
            assert_eq!(got, m);
        }
    }

    #[test]
    fn roundtrip_through_reencrypt() {
        let mut rng = rand::thread_rng();
        let params = params();
        let (sk, pk) = keypair(&mut rng);
        let (ct, _) = encrypt_balance(&params, pk, 42, &mut rng).unwrap();
        let (ct2, _) = reencrypt(pk, ct, &mut rng);
        assert_ne!(ct.c1, ct2.c1);
        let got = decrypt_balance(&params, sk, ct2, &mut rng).unwrap();
        assert_eq!(got, 42);
    }

    #[test]
    fn out_of_range_rejected_on_encrypt() {
        let mut rng = rand::thread_rng();
        let params = params();
        let (_, pk) = keypair(&mut rng);
        assert_eq!(
            encrypt_balance(&params, pk, 2000, &mut rng).unwrap_err(),
            SolidusError::OutOfRange
        );
    }

    #[test]
    fn out_of_range_rejected_on_decrypt() {
        let mut rng = rand::thread_rng();
        let params = params();
        let (sk, pk) = keypair(&mut rng);
        let (ct, _) = encrypt_value(pk, Scalar::from(5000u64), &mut rng);
        assert_eq!(
            decrypt_balance(&params, sk, ct, &mut rng).unwrap_err(),
            SolidusError::OutOfRange
        );
    }

    #[test]
    fn homomorphic_addition() {
        let mut rng = rand::thread_rng();
        let params = params();
        let (sk, pk) = keypair(&mut rng);
        let (a, _) = encrypt_balance(&params, pk, 10, &mut rng).unwrap();
        let (b, _) = encrypt_balance(&params, pk, 20, &mut rng).unwrap();
        let sum = a + b;
        let got = decrypt_balance(&params, sk, sum, &mut rng).unwrap();
        assert_eq!(got, 30);
    }

    #[test]
    fn blind_decryption_agrees_with_plain() {
        let mut rng = rand::thread_rng();
        let params = params().with_blind_decryption(true);
        let (sk, pk) = keypair(&mut rng);
        let (ct, _) = encrypt_balance(&params, pk, -17, &mut rng).unwrap();
        let got = decrypt_balance(&params, sk, ct, &mut rng).unwrap();
        assert_eq!(got, -17);
    }
}
