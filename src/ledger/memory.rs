//! An in-memory, single-process `Ledger` (spec §4.6): linearizable via a
//! plain mutex-guarded log, sufficient to drive end-to-end test scenarios
//! without a real consensus backend.

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::warn;

use crate::error::{Result, SolidusError};
use crate::ledger::driver::{Ledger, LedgerStream};
use crate::ledger::entry::LedgerEntry;

const LOG_TARGET: &str = "solidus::ledger::memory";
const BROADCAST_CAPACITY: usize = 1024;

pub struct MemoryLedger {
    log: Mutex<Vec<LedgerEntry>>,
    sender: broadcast::Sender<(u64, LedgerEntry)>,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedger {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            log: Mutex::new(Vec::new()),
            sender,
        }
    }

    pub fn len(&self) -> u64 {
        self.log.lock().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn append(&self, entry: LedgerEntry) -> Result<u64> {
        let seq = {
            let mut log = self.log.lock();
            log.push(entry.clone());
            (log.len() - 1) as u64
        };
        // No subscriber is a normal, not an error, state.
        let _ = self.sender.send((seq, entry));
        Ok(seq)
    }

    async fn cas_append(&self, expected_prev_seq: u64, entry: LedgerEntry) -> Result<u64> {
        let seq = {
            let mut log = self.log.lock();
            if log.len() as u64 != expected_prev_seq {
                return Err(SolidusError::LedgerConflict);
            }
            log.push(entry.clone());
            (log.len() - 1) as u64
        };
        let _ = self.sender.send((seq, entry));
        Ok(seq)
    }

    fn current_len(&self) -> u64 {
        self.len()
    }

    fn subscribe(&self, from_seq: u64) -> LedgerStream {
        // Snapshot and subscribe under the same lock so no entry appended
        // concurrently is either missed or double-delivered.
        let (backlog, receiver) = {
            let log = self.log.lock();
            let backlog: Vec<(u64, LedgerEntry)> = log
                .iter()
                .enumerate()
                .skip(from_seq as usize)
                .map(|(seq, entry)| (seq as u64, entry.clone()))
                .collect();
            (backlog, self.sender.subscribe())
        };
        let live = BroadcastStream::new(receiver).filter_map(move |item| match item {
            Ok((seq, entry)) if seq >= backlog_len_hint(from_seq, &backlog) => Some((seq, entry)),
            Ok(_) => None,
            Err(err) => {
                warn!(target: LOG_TARGET, %err, "subscriber lagged, dropping skipped entries");
                None
            }
        });
        Box::pin(tokio_stream::iter(backlog).chain(live))
    }
}

/// The backlog already covers `[from_seq, from_seq + backlog.len())`; the
/// live broadcast must only resume after that range to avoid redelivering
/// an entry that both the snapshot and the broadcast captured.
fn backlog_len_hint(from_seq: u64, backlog: &[(u64, LedgerEntry)]) -> u64 {
    from_seq + backlog.len() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::events::TxId;
    use crate::config::PvormParams;
    use crate::curve::{generator, random_scalar};
    use crate::elgamal::EncryptionParams;
    use crate::pvorm::Pvorm;
    use tokio_stream::StreamExt as _;

    /// A real, independently-verifiable `PvormUpdate` for exercising
    /// append/subscribe ordering — these tests care about sequencing, not
    /// about the update's own semantics (covered in `crate::pvorm`).
    fn sample_update() -> crate::pvorm::PvormUpdate {
        let mut rng = rand::thread_rng();
        let bank_sk = random_scalar(&mut rng);
        let bank_pk = generator() * bank_sk;
        let enc_params = EncryptionParams::new(1_000_000, 64);
        let shape = PvormParams::new(2, 2, 2);
        let mut pvorm = Pvorm::new(enc_params.clone(), shape, bank_pk, &mut rng);
        let account_pk = generator() * random_scalar(&mut rng);
        pvorm.provision_account(account_pk, 10, &mut rng).unwrap();
        let (delta, r_delta) = crate::elgamal::encrypt_balance(&enc_params, bank_pk, 1, &mut rng).unwrap();
        pvorm
            .lookup_and_update(bank_sk, account_pk, delta, r_delta, 1_000_000, 1, &mut rng)
            .unwrap()
    }

    fn dummy_entry(tx_id: TxId) -> LedgerEntry {
        LedgerEntry::SenderUpdate {
            tx_id,
            update: sample_update(),
        }
    }

    #[tokio::test]
    async fn append_assigns_increasing_seq_numbers() {
        let ledger = MemoryLedger::new();
        let seq0 = ledger.append(dummy_entry([0u8; 32])).await.unwrap();
        let seq1 = ledger.append(dummy_entry([1u8; 32])).await.unwrap();
        assert_eq!(seq0, 0);
        assert_eq!(seq1, 1);
    }

    #[tokio::test]
    async fn cas_append_rejects_stale_expected_seq() {
        let ledger = MemoryLedger::new();
        ledger.append(dummy_entry([0u8; 32])).await.unwrap();
        let err = ledger
            .cas_append(0, dummy_entry([1u8; 32]))
            .await
            .unwrap_err();
        assert_eq!(err, SolidusError::LedgerConflict);
        assert!(ledger.cas_append(1, dummy_entry([1u8; 32])).await.is_ok());
    }

    #[tokio::test]
    async fn subscribe_replays_backlog_then_live_entries() {
        let ledger = MemoryLedger::new();
        ledger.append(dummy_entry([0u8; 32])).await.unwrap();
        let mut stream = ledger.subscribe(0);
        ledger.append(dummy_entry([1u8; 32])).await.unwrap();

        let (seq0, entry0) = stream.next().await.unwrap();
        assert_eq!(seq0, 0);
        assert_eq!(entry0.tx_id(), [0u8; 32]);
        let (seq1, entry1) = stream.next().await.unwrap();
        assert_eq!(seq1, 1);
        assert_eq!(entry1.tx_id(), [1u8; 32]);
    }
}
