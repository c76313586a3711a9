//! `OrProof`: a 2-branch disjunction of discrete-log-equality statements,
//! built via the standard Fiat-Shamir challenge-splitting technique
//! (Cramer-Damgard-Schoenmakers). One branch's transcript is produced
//! honestly; the other is simulated from a randomly chosen sub-challenge,
//! and the two sub-challenges are constrained to sum to the real
//! Fiat-Shamir challenge.
//!
//! Every use of `OrProof` in this crate disjoins two
//! [`DleqStatement`]s sharing the same base pair `(G, Y)`: "I know `r`
//! such that `a = rG, b = rY`" for one of two `(a, b)` pairs. This covers
//! both required uses: [`crate::proofs::MaxwellRangeProof`]'s per-bit
//! "this ciphertext encrypts 0 or `2^i`" proof, and the PVORM's per-slot
//! "this slot is a re-encryption of its prior self, or of the slot that
//! moved in from its eviction neighbor" proof.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::curve::{random_scalar, Point, Scalar};
use crate::signing::TranscriptBuilder;

/// `∃ r. a = rG, b = rY` for fixed bases `(G, Y)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DleqStatement {
    pub a: Point,
    pub b: Point,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct Branch {
    #[serde(with = "crate::crypto_serde::point")]
    t1: Point,
    #[serde(with = "crate::crypto_serde::point")]
    t2: Point,
    #[serde(with = "crate::crypto_serde::scalar")]
    e: Scalar,
    #[serde(with = "crate::crypto_serde::scalar")]
    z: Scalar,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct OrProof {
    branch0: Branch,
    branch1: Branch,
}

impl OrProof {
    /// Proves `stmt0 OR stmt1`, given the witness `r` for whichever branch
    /// is `real_branch` (0 or 1) under bases `(G, y)`.
    #[allow(clippy::too_many_arguments)]
    pub fn prove(
        context: &'static str,
        y: Point,
        stmt0: DleqStatement,
        stmt1: DleqStatement,
        real_branch: usize,
        witness_r: Scalar,
        rng: &mut impl RngCore,
    ) -> Self {
        let g = crate::curve::generator();
        let (real, sim, real_stmt, sim_stmt) = if real_branch == 0 {
            (0, 1, stmt0, stmt1)
        } else {
            (1, 0, stmt1, stmt0)
        };

        // Simulate the other branch: pick (e_sim, z_sim) freely, derive the
        // commitment that makes verification pass.
        let e_sim = random_scalar(rng);
        let z_sim = random_scalar(rng);
        let t1_sim = g * z_sim - sim_stmt.a * e_sim;
        let t2_sim = y * z_sim - sim_stmt.b * e_sim;

        // Honest commitment for the real branch.
        let k = random_scalar(rng);
        let t1_real = g * k;
        let t2_real = y * k;

        let (t1_0, t2_0, t1_1, t2_1) = if real == 0 {
            (t1_real, t2_real, t1_sim, t2_sim)
        } else {
            (t1_sim, t2_sim, t1_real, t2_real)
        };

        let e = challenge(context, y, stmt0, stmt1, t1_0, t2_0, t1_1, t2_1);
        let e_real = e - e_sim;
        let z_real = k + e_real * witness_r;

        let (branch0, branch1) = if real == 0 {
            (
                Branch {
                    t1: t1_0,
                    t2: t2_0,
                    e: e_real,
                    z: z_real,
                },
                Branch {
                    t1: t1_1,
                    t2: t2_1,
                    e: e_sim,
                    z: z_sim,
                },
            )
        } else {
            (
                Branch {
                    t1: t1_0,
                    t2: t2_0,
                    e: e_sim,
                    z: z_sim,
                },
                Branch {
                    t1: t1_1,
                    t2: t2_1,
                    e: e_real,
                    z: z_real,
                },
            )
        };

        let _ = real_stmt; // statement itself is public input, not re-derived
        OrProof { branch0, branch1 }
    }

    pub fn verify(&self, context: &'static str, y: Point, stmt0: DleqStatement, stmt1: DleqStatement) -> bool {
        let g = crate::curve::generator();
        let e = challenge(
            context,
            y,
            stmt0,
            stmt1,
            self.branch0.t1,
            self.branch0.t2,
            self.branch1.t1,
            self.branch1.t2,
        );
        if self.branch0.e + self.branch1.e != e {
            return false;
        }
        let check0 = g * self.branch0.z == self.branch0.t1 + stmt0.a * self.branch0.e
            && y * self.branch0.z == self.branch0.t2 + stmt0.b * self.branch0.e;
        let check1 = g * self.branch1.z == self.branch1.t1 + stmt1.a * self.branch1.e
            && y * self.branch1.z == self.branch1.t2 + stmt1.b * self.branch1.e;
        check0 && check1
    }
}

#[allow(clippy::too_many_arguments)]
fn challenge(
    context: &'static str,
    y: Point,
    stmt0: DleqStatement,
    stmt1: DleqStatement,
    t1_0: Point,
    t2_0: Point,
    t1_1: Point,
    t2_1: Point,
) -> Scalar {
    let mut builder = TranscriptBuilder::new(context);
    builder.append_point(&y);
    builder.append_point(&stmt0.a);
    builder.append_point(&stmt0.b);
    builder.append_point(&stmt1.a);
    builder.append_point(&stmt1.b);
    builder.append_point(&t1_0);
    builder.append_point(&t2_0);
    builder.append_point(&t1_1);
    builder.append_point(&t2_1);
    crate::curve::hash_to_scalar(&builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::generator;

    #[test]
    fn proves_real_branch_zero() {
        let mut rng = rand::thread_rng();
        let sk = random_scalar(&mut rng);
        let y = generator() * sk;
        let r = random_scalar(&mut rng);
        let stmt0 = DleqStatement {
            a: generator() * r,
            b: y * r,
        };
        let stmt1 = DleqStatement {
            a: generator() * random_scalar(&mut rng),
            b: y * random_scalar(&mut rng),
        };
        let proof = OrProof::prove("test/or", y, stmt0, stmt1, 0, r, &mut rng);
        assert!(proof.verify("test/or", y, stmt0, stmt1));
    }

    #[test]
    fn proves_real_branch_one() {
        let mut rng = rand::thread_rng();
        let sk = random_scalar(&mut rng);
        let y = generator() * sk;
        let r = random_scalar(&mut rng);
        let stmt1 = DleqStatement {
            a: generator() * r,
            b: y * r,
        };
        let stmt0 = DleqStatement {
            a: generator() * random_scalar(&mut rng),
            b: y * random_scalar(&mut rng),
        };
        let proof = OrProof::prove("test/or", y, stmt0, stmt1, 1, r, &mut rng);
        assert!(proof.verify("test/or", y, stmt0, stmt1));
    }

    #[test]
    fn rejects_when_neither_branch_holds() {
        let mut rng = rand::thread_rng();
        let sk = random_scalar(&mut rng);
        let y = generator() * sk;
        let stmt0 = DleqStatement {
            a: generator() * random_scalar(&mut rng),
            b: y * random_scalar(&mut rng),
        };
        let stmt1 = DleqStatement {
            a: generator() * random_scalar(&mut rng),
            b: y * random_scalar(&mut rng),
        };
        // Forge a proof claiming branch 0 with an unrelated witness.
        let forged_r = random_scalar(&mut rng);
        let proof = OrProof::prove("test/or", y, stmt0, stmt1, 0, forged_r, &mut rng);
        assert!(!proof.verify("test/or", y, stmt0, stmt1));
    }

    #[test]
    fn real_branch_choice_is_not_distinguishable_by_serialized_form() {
        // Property 5 (spec §8, distributional ZK): proofs of the same
        // statement pair, independently randomized, must have identical
        // serialized length no matter which branch is real — every field
        // (two commitment points, a challenge and a response scalar, per
        // branch) is fixed-width, so the real-branch choice cannot leak
        // through length across many trials.
        let mut rng = rand::thread_rng();
        let sk = random_scalar(&mut rng);
        let y = generator() * sk;
        let r0 = random_scalar(&mut rng);
        let r1 = random_scalar(&mut rng);
        let stmt0 = DleqStatement {
            a: generator() * r0,
            b: y * r0,
        };
        let stmt1 = DleqStatement {
            a: generator() * r1,
            b: y * r1,
        };

        let mut lengths = std::collections::HashSet::new();
        for trial in 0..50 {
            let real_branch = trial % 2;
            let witness = if real_branch == 0 { r0 } else { r1 };
            let proof = OrProof::prove("test/or", y, stmt0, stmt1, real_branch, witness, &mut rng);
            assert!(proof.verify("test/or", y, stmt0, stmt1));
            lengths.insert(serde_json::to_vec(&proof).unwrap().len());
        }
        assert_eq!(lengths.len(), 1, "serialized proof length must not depend on which branch was real");
    }

    #[test]
    fn mutated_proof_byte_fails() {
        let mut rng = rand::thread_rng();
        let sk = random_scalar(&mut rng);
        let y = generator() * sk;
        let r = random_scalar(&mut rng);
        let stmt0 = DleqStatement {
            a: generator() * r,
            b: y * r,
        };
        let stmt1 = DleqStatement {
            a: generator() * random_scalar(&mut rng),
            b: y * random_scalar(&mut rng),
        };
        let mut proof = OrProof::prove("test/or", y, stmt0, stmt1, 0, r, &mut rng);
        proof.branch0.z += Scalar::from(1u64);
        assert!(!proof.verify("test/or", y, stmt0, stmt1));
    }
}
