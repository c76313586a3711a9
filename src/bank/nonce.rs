//! Persisted per-account nonce table (spec §5 anti-replay, §9 Open
//! Question).
//!
//! The prototype's own handling of same-account timestamps was not
//! strictly monotonic across restarts; this spec tightens it to strictly
//! increasing and requires the last-seen nonce to be persisted rather than
//! rebuilt from in-memory state alone. `NonceTable` is that persisted
//! table's in-process view — a real deployment backs it with durable
//! storage (out of scope here; see spec §1's external collaborators).

use std::collections::HashMap;

use crate::curve::{encode_point, Point, PointBytes};
use crate::error::{Result, SolidusError};

/// Last-seen nonce per source account.
#[derive(Clone, Debug, Default)]
pub struct NonceTable {
    last_seen: HashMap<PointBytes, u64>,
}

impl NonceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_seen(&self, account_pubkey: Point) -> Option<u64> {
        self.last_seen.get(&encode_point(&account_pubkey)).copied()
    }

    /// Accepts `nonce` iff it is strictly greater than the last seen nonce
    /// for `account_pubkey`, and records it. Fails `ReplayedNonce` otherwise
    /// (spec §8 property 8) without mutating the table.
    pub fn check_and_record(&mut self, account_pubkey: Point, nonce: u64) -> Result<()> {
        let key = encode_point(&account_pubkey);
        if let Some(&last) = self.last_seen.get(&key) {
            if nonce <= last {
                return Err(SolidusError::ReplayedNonce);
            }
        }
        self.last_seen.insert(key, nonce);
        Ok(())
    }
}
