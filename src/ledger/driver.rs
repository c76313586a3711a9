//! L6 — the abstract ledger interface (spec §4.6): a total-order,
//! linearizable append-only log. The core never assumes Byzantine-resilient
//! consensus; a ZooKeeper-style CP store is sufficient and expected.

use std::pin::Pin;

use async_trait::async_trait;
use tokio_stream::Stream;

use crate::error::Result;
use crate::ledger::entry::LedgerEntry;

/// A stream of `(seqNo, entry)` pairs, monotone and at-least-once —
/// duplicates must be idempotent at the application layer (spec §4.6).
pub type LedgerStream = Pin<Box<dyn Stream<Item = (u64, LedgerEntry)> + Send>>;

#[async_trait]
pub trait Ledger: Send + Sync {
    /// Total-order, linearizable append. Returns the assigned sequence
    /// number.
    async fn append(&self, entry: LedgerEntry) -> Result<u64>;

    /// Appends `entry` iff the ledger's current length equals
    /// `expected_prev_seq`; otherwise fails `LedgerConflict` for the caller
    /// to retry (spec §4.6, "claiming the next transaction slot").
    async fn cas_append(&self, expected_prev_seq: u64, entry: LedgerEntry) -> Result<u64>;

    /// The sequence number the next `append`/`cas_append` would be assigned.
    /// Callers use this to derive a PVORM update's eviction leaf before the
    /// entry carrying it is actually appended (spec §4.3, §4.6).
    fn current_len(&self) -> u64;

    /// A stream of every entry from `from_seq` onward, including ones
    /// appended after the call.
    fn subscribe(&self, from_seq: u64) -> LedgerStream;
}
