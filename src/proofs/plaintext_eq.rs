//! `PlaintextEqProof(c, c', Y)`: proves `c` and `c'` encrypt the same
//! plaintext under the same key `Y`, i.e. `∃ r. c' = c + Enc_Y(0; r)`.
//!
//! Structurally this is a Chaum-Pedersen equal-discrete-log proof over the
//! bases `(G, Y)` and the points `(c1'-c1, c2'-c2)`, directly grounded on
//! the teacher's `ChaumPedersenProof`: `g = G`, `h = Y`,
//! `alpha = c1' - c1`, `beta = c2' - c2`, secret `= r`.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::curve::{generator, random_scalar, Point, Scalar};
use crate::elgamal::Ciphertext;
use crate::signing::{Signable, TranscriptBuilder};

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PlaintextEqProof {
    #[serde(with = "crate::crypto_serde::point")]
    pub t1: Point,
    #[serde(with = "crate::crypto_serde::point")]
    pub t2: Point,
    #[serde(with = "crate::crypto_serde::scalar")]
    pub z: Scalar,
}

impl PlaintextEqProof {
    /// Proves `c' = c + Enc_Y(0; r)` given the randomizer `r` used to form
    /// `c'` from `c`.
    pub fn prove(
        context: &'static str,
        y: Point,
        c: Ciphertext,
        c_prime: Ciphertext,
        r: Scalar,
        rng: &mut impl RngCore,
    ) -> Self {
        let k = random_scalar(rng);
        let t1 = generator() * k;
        let t2 = y * k;
        let e = challenge(context, y, c, c_prime, t1, t2);
        let z = k + e * r;
        PlaintextEqProof { t1, t2, z }
    }

    pub fn verify(&self, context: &'static str, y: Point, c: Ciphertext, c_prime: Ciphertext) -> bool {
        let e = challenge(context, y, c, c_prime, self.t1, self.t2);
        let z: Scalar = self.z;
        let alpha = c_prime.c1 - c.c1;
        let beta = c_prime.c2 - c.c2;
        let lhs1 = generator() * z;
        let rhs1 = self.t1 + alpha * e;
        let lhs2 = y * z;
        let rhs2 = self.t2 + beta * e;
        lhs1 == rhs1 && lhs2 == rhs2
    }
}

fn challenge(
    context: &'static str,
    y: Point,
    c: Ciphertext,
    c_prime: Ciphertext,
    t1: Point,
    t2: Point,
) -> Scalar {
    let mut builder = TranscriptBuilder::new(context);
    builder.append_point(&y);
    c.write_transcript(&mut builder);
    c_prime.write_transcript(&mut builder);
    builder.append_point(&t1);
    builder.append_point(&t2);
    crate::curve::hash_to_scalar(&builder.finish())
}
