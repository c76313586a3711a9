//! L2 — Generalized Schnorr proofs (spec §4.2).
//!
//! All proofs are Fiat-Shamir-transformed Sigma protocols: a vector of
//! commitments `A`, a challenge `e = H(context || A || statement)`, and
//! responses `z = k + e*w`. Grounded on the teacher's
//! `chaum_pedersen::native::ChaumPedersenProof` (the same equal-exponent
//! structure as [`plaintext_eq::PlaintextEqProof`]) and its
//! Fiat-Shamir-via-sponge pattern, here driven by
//! [`crate::signing::TranscriptBuilder`] instead of a Poseidon sponge.
//!
//! Per the redesign note in spec §9, proof kinds are plain structs rather
//! than a class hierarchy — there is no shared base trait beyond each
//! proof's own `verify`, which erases the need for virtual dispatch.

pub mod or_proof;
pub mod plaintext_eq;
pub mod plaintext_eq_dis_key;
pub mod range_proof;

pub use or_proof::{DleqStatement, OrProof};
pub use plaintext_eq::PlaintextEqProof;
pub use plaintext_eq_dis_key::PlaintextEqDisKeyProof;
pub use range_proof::MaxwellRangeProof;
