//! `PlaintextEqDisKeyProof(c, c', Y, Y')`: proves `c` (under `Y`) and `c'`
//! (under `Y'`) encrypt the same plaintext under two different keys.
//!
//! The witness is the plaintext-as-scalar `m` plus the two ciphertexts'
//! randomizers `(r, r')`:
//! `c = (rG, rY + mG)`, `c' = (r'G, r'Y' + mG)`.
//! This is a four-equation generalized Schnorr proof over three witnesses,
//! the disjoint-key analogue of [`crate::proofs::PlaintextEqProof`].

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::curve::{generator, random_scalar, Point, Scalar};
use crate::elgamal::Ciphertext;
use crate::signing::{Signable, TranscriptBuilder};

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PlaintextEqDisKeyProof {
    #[serde(with = "crate::crypto_serde::point")]
    a1: Point,
    #[serde(with = "crate::crypto_serde::point")]
    a2: Point,
    #[serde(with = "crate::crypto_serde::point")]
    a3: Point,
    #[serde(with = "crate::crypto_serde::point")]
    a4: Point,
    #[serde(with = "crate::crypto_serde::scalar")]
    z_r: Scalar,
    #[serde(with = "crate::crypto_serde::scalar")]
    z_r_prime: Scalar,
    #[serde(with = "crate::crypto_serde::scalar")]
    z_m: Scalar,
}

impl PlaintextEqDisKeyProof {
    #[allow(clippy::too_many_arguments)]
    pub fn prove(
        context: &'static str,
        y: Point,
        y_prime: Point,
        c: Ciphertext,
        c_prime: Ciphertext,
        m: Scalar,
        r: Scalar,
        r_prime: Scalar,
        rng: &mut impl RngCore,
    ) -> Self {
        let k_r = random_scalar(rng);
        let k_r_prime = random_scalar(rng);
        let k_m = random_scalar(rng);

        let a1 = generator() * k_r;
        let a2 = y * k_r + generator() * k_m;
        let a3 = generator() * k_r_prime;
        let a4 = y_prime * k_r_prime + generator() * k_m;

        let e = challenge(context, y, y_prime, c, c_prime, a1, a2, a3, a4);

        PlaintextEqDisKeyProof {
            a1,
            a2,
            a3,
            a4,
            z_r: k_r + e * r,
            z_r_prime: k_r_prime + e * r_prime,
            z_m: k_m + e * m,
        }
    }

    pub fn verify(
        &self,
        context: &'static str,
        y: Point,
        y_prime: Point,
        c: Ciphertext,
        c_prime: Ciphertext,
    ) -> bool {
        let e = challenge(context, y, y_prime, c, c_prime, self.a1, self.a2, self.a3, self.a4);
        let check1 = generator() * self.z_r == self.a1 + c.c1 * e;
        let check2 = y * self.z_r + generator() * self.z_m == self.a2 + c.c2 * e;
        let check3 = generator() * self.z_r_prime == self.a3 + c_prime.c1 * e;
        let check4 = y_prime * self.z_r_prime + generator() * self.z_m == self.a4 + c_prime.c2 * e;
        check1 && check2 && check3 && check4
    }
}

#[allow(clippy::too_many_arguments)]
fn challenge(
    context: &'static str,
    y: Point,
    y_prime: Point,
    c: Ciphertext,
    c_prime: Ciphertext,
    a1: Point,
    a2: Point,
    a3: Point,
    a4: Point,
) -> Scalar {
    let mut builder = TranscriptBuilder::new(context);
    builder.append_point(&y);
    builder.append_point(&y_prime);
    c.write_transcript(&mut builder);
    c_prime.write_transcript(&mut builder);
    builder.append_point(&a1);
    builder.append_point(&a2);
    builder.append_point(&a3);
    builder.append_point(&a4);
    crate::curve::hash_to_scalar(&builder.finish())
}
