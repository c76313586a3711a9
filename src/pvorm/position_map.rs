//! Leaf assignment.
//!
//! Two distinct notions of "position" are at play (spec §4.3):
//!
//! - the **eviction target** for a given update, a leaf chosen by hashing
//!   the ledger sequence number so every observer derives the same value
//!   without needing any private state;
//! - each account's **current leaf**, a bank-private mapping the owning
//!   bank uses to find its own slot quickly. This mapping is never
//!   revealed; the public ciphertext diff it produces is all an observer
//!   ever sees.

use std::collections::HashMap;

use crate::curve::{encode_point, hash_to_scalar, Point, PointBytes};

/// Hash-chains the ledger sequence number into a leaf index in
/// `[0, 2^height)`, so every observer agrees on this round's eviction
/// target without any private coordination.
pub fn eviction_leaf(ledger_seq: u64, height: u32) -> u64 {
    let mut bytes = b"solidus/pvorm/eviction_leaf/v1".to_vec();
    bytes.extend_from_slice(&ledger_seq.to_be_bytes());
    let scalar = hash_to_scalar(&bytes);
    let leaf_count = 1u64 << height;
    scalar_mod_u64(scalar, leaf_count)
}

fn scalar_mod_u64(scalar: crate::curve::Scalar, modulus: u64) -> u64 {
    use ark_ff::{BigInteger, PrimeField};
    let bytes = scalar.into_bigint().to_bytes_be();
    let mut acc: u128 = 0;
    for b in bytes {
        acc = (acc * 256 + b as u128) % modulus as u128;
    }
    acc as u64
}

/// A bank-private map from an account's ORAM identifier to the leaf its
/// PVORM slot is currently assigned to.
#[derive(Clone, Debug, Default)]
pub struct PositionMap {
    assigned: HashMap<PointBytes, u64>,
}

impl PositionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, account_id: Point) -> Option<u64> {
        self.assigned.get(&encode_point(&account_id)).copied()
    }

    pub fn assign(&mut self, account_id: Point, leaf: u64) {
        self.assigned.insert(encode_point(&account_id), leaf);
    }

    pub fn remove(&mut self, account_id: Point) {
        self.assigned.remove(&encode_point(&account_id));
    }
}
