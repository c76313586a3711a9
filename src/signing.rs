//! Canonical transcripts: the byte encoding shared by Fiat-Shamir challenges,
//! request/header signatures, and on-wire serialization.
//!
//! Grounded on the teacher's `signing::TranscriptBuilder`/`Signable` pair: a
//! domain-tagged, length-prefixed byte builder that every signable or
//! provable value feeds through `write_transcript`. Keeping one
//! canonicalization path for both proof challenges and signatures is what
//! lets two independent observers agree bit-for-bit (spec §9).

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::curve::{encode_point, encode_scalar, generator, hash_to_scalar, random_scalar, Point, Scalar};

const DOMAIN_TAG: &[u8] = b"solidus/transcript/v1";

/// Builder for canonical, domain-separated transcripts.
pub struct TranscriptBuilder {
    buffer: Vec<u8>,
}

impl TranscriptBuilder {
    pub fn new(kind: &'static str) -> Self {
        let mut buffer = Vec::with_capacity(256);
        buffer.extend_from_slice(DOMAIN_TAG);
        buffer.extend_from_slice(&(kind.len() as u16).to_be_bytes());
        buffer.extend_from_slice(kind.as_bytes());
        Self { buffer }
    }

    pub fn append_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn append_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn append_u64(&mut self, value: u64) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn append_i64(&mut self, value: i64) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn append_bytes(&mut self, bytes: &[u8]) {
        self.buffer
            .extend_from_slice(&(bytes.len() as u32).to_be_bytes());
        self.buffer.extend_from_slice(bytes);
    }

    /// Appends a point using the canonicalized (`normalizePoints`) encoding.
    pub fn append_point(&mut self, point: &Point) {
        self.append_bytes(&encode_point(point));
    }

    pub fn append_scalar(&mut self, scalar: &Scalar) {
        self.append_bytes(&encode_scalar(scalar));
    }

    pub fn finish(self) -> Vec<u8> {
        self.buffer
    }
}

/// Values that can be folded into a canonical transcript: proof statements,
/// ciphertexts, and the transaction objects that get signed.
pub trait Signable {
    /// Logical kind string, used for domain separation between transcripts
    /// that would otherwise collide byte-for-byte.
    fn domain_kind(&self) -> &'static str;

    fn write_transcript(&self, builder: &mut TranscriptBuilder);

    fn to_signing_bytes(&self) -> Vec<u8> {
        let mut builder = TranscriptBuilder::new(self.domain_kind());
        self.write_transcript(&mut builder);
        builder.finish()
    }
}

impl Signable for u64 {
    fn domain_kind(&self) -> &'static str {
        "primitive/u64_v1"
    }

    fn write_transcript(&self, builder: &mut TranscriptBuilder) {
        builder.append_u64(*self);
    }
}

impl Signable for Point {
    fn domain_kind(&self) -> &'static str {
        "primitive/point_v1"
    }

    fn write_transcript(&self, builder: &mut TranscriptBuilder) {
        builder.append_point(self);
    }
}

/// A Schnorr signature over the same curve group every other proof in this
/// crate runs on — the natural choice given an account's key is already a
/// curve point (spec §3's `Account.pubkey`), rather than pulling in a
/// separate signature scheme and keypair type just for requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(with = "crate::crypto_serde::point")]
    pub r: Point,
    #[serde(with = "crate::crypto_serde::scalar")]
    pub s: Scalar,
}

/// Signs `message` (typically a [`Signable::to_signing_bytes`] output) under
/// `sk`.
pub fn sign(sk: Scalar, message: &[u8], rng: &mut impl RngCore) -> Signature {
    let k = random_scalar(rng);
    let r = generator() * k;
    let e = schnorr_challenge(r, message);
    let s = k + e * sk;
    Signature { r, s }
}

/// Verifies a [`Signature`] produced by [`sign`] under `pk`.
pub fn verify(pk: Point, message: &[u8], sig: &Signature) -> bool {
    let e = schnorr_challenge(sig.r, message);
    generator() * sig.s == sig.r + pk * e
}

fn schnorr_challenge(r: Point, message: &[u8]) -> Scalar {
    let mut bytes = b"solidus/signature/schnorr_v1".to_vec();
    bytes.extend_from_slice(&encode_point(&r));
    bytes.extend_from_slice(message);
    hash_to_scalar(&bytes)
}
