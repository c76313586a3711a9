//! Fixed elliptic curve group, scalar/point aliases, and canonical encoding.
//!
//! Solidus runs entirely over one curve group. Concretely we use bn254's G1
//! group: additive ElGamal needs only a prime-order group with a fixed
//! generator, not a pairing, so the rest of the bn254 curve machinery goes
//! unused.

use ark_bn254::{Fr, G1Affine, G1Projective};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{BigInteger, PrimeField, UniformRand};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::rand::Rng;
use sha3::{Digest, Keccak256};

/// The fixed curve group `G`.
pub type Point = G1Projective;
/// The scalar field of `G`, i.e. elements of `[0, q)`.
pub type Scalar = Fr;

/// Canonical byte encoding of a point, used as a hash map key and as the
/// transcript/wire representation. Two points that are equal as group
/// elements always produce the same bytes here.
pub type PointBytes = Vec<u8>;

/// Returns the fixed generator `g` of `G`.
pub fn generator() -> Point {
    Point::generator()
}

/// Canonicalizes a point to its unique affine encoding and serializes it
/// compressed. This is the `normalizePoints` behavior from
/// [`crate::elgamal::EncryptionParams`]: every peer must derive identical
/// bytes for the same group element, or Fiat-Shamir transcripts diverge.
pub fn encode_point(p: &Point) -> PointBytes {
    let affine = p.into_affine();
    let mut buf = Vec::with_capacity(32);
    affine
        .serialize_compressed(&mut buf)
        .expect("point serialization cannot fail");
    buf
}

/// Decodes a canonical point encoding produced by [`encode_point`].
pub fn decode_point(bytes: &[u8]) -> Option<Point> {
    let affine = G1Affine::deserialize_compressed(bytes).ok()?;
    Some(affine.into())
}

/// Rejection-samples a nonzero scalar uniformly from `[1, q)`.
pub fn random_scalar<R: Rng + ?Sized>(rng: &mut R) -> Scalar {
    loop {
        let s = Scalar::rand(rng);
        if !s.is_zero() {
            return s;
        }
    }
}

trait IsZero {
    fn is_zero(&self) -> bool;
}
impl IsZero for Scalar {
    fn is_zero(&self) -> bool {
        *self == Scalar::from(0u64)
    }
}

/// The protocol digest `H: bytes -> [0, q)`.
///
/// Used both for Fiat-Shamir challenges (applied to a canonicalized
/// transcript) and for deriving an account's ORAM identifier from its
/// public key.
pub fn hash_to_scalar(bytes: &[u8]) -> Scalar {
    let mut hasher = Keccak256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    Scalar::from_le_bytes_mod_order(&digest)
}

/// Hashes arbitrary bytes into a group element by hashing to a scalar and
/// multiplying the generator. Used to derive an account's ORAM identifier
/// (a point in `G`) deterministically from its public key, and to derive
/// the identity-slot placeholder key.
pub fn hash_to_point(bytes: &[u8]) -> Point {
    generator() * hash_to_scalar(bytes)
}

/// Encodes a scalar as big-endian bytes, matching the wire format of
/// `spec.md` §6 ("Scalar: big-endian 32 bytes ... unsigned").
pub fn encode_scalar(s: &Scalar) -> Vec<u8> {
    s.into_bigint().to_bytes_be()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_point_roundtrip() {
        let p = generator() * Scalar::from(7u64);
        let bytes = encode_point(&p);
        let decoded = decode_point(&bytes).unwrap();
        assert_eq!(p, decoded);
    }

    #[test]
    fn hash_to_scalar_is_deterministic() {
        let a = hash_to_scalar(b"solidus/test");
        let b = hash_to_scalar(b"solidus/test");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_inputs_hash_to_distinct_points() {
        let a = hash_to_point(b"account-1");
        let b = hash_to_point(b"account-2");
        assert_ne!(a, b);
    }
}
