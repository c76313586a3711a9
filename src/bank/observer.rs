//! `BankObserver` (spec §2, §5): a read-only replica of one bank's public
//! PVORM state, driven exclusively by replaying the shared ledger. Holds no
//! secret key and never learns which account any given update touched —
//! only which of the two banks named in a transaction's header the update
//! belongs to, decided from the `Header` entry that always precedes it
//! (spec §6's entry ordering).
//!
//! Needs a baseline snapshot of the target bank's state to start from
//! (`Bank::state_snapshot`) since account provisioning is local setup, not
//! a ledger entry (spec §3 Non-goals) — an observer starting from an empty
//! stash could never recover a provisioned account's slot from the ledger
//! alone.

use std::collections::HashMap;

use tokio_stream::StreamExt;
use tracing::{instrument, warn};

use crate::curve::Point;
use crate::error::Result;
use crate::ledger::{Ledger, LedgerEntry, LedgerStream, TxId};
use crate::pvorm::{Pvorm, PvormPublicState, PvormUpdate};
use crate::transaction::TransactionHeader;

const LOG_TARGET: &str = "solidus::bank::observer";

/// Drives a replica of `bank_pk`'s public PVORM state forward, one ledger
/// entry at a time.
pub struct BankObserver {
    bank_pk: Point,
    max_balance: i64,
    pvorm: Pvorm,
    pending_headers: HashMap<TxId, TransactionHeader>,
    stream: LedgerStream,
}

impl BankObserver {
    /// Subscribes to `ledger` from `baseline_seq` onward and replays into
    /// `baseline` (a snapshot taken at that same sequence number).
    pub fn new(
        bank_pk: Point,
        max_balance: i64,
        baseline: Pvorm,
        ledger: &dyn Ledger,
        baseline_seq: u64,
    ) -> Self {
        Self {
            bank_pk,
            max_balance,
            pvorm: baseline,
            pending_headers: HashMap::new(),
            stream: ledger.subscribe(baseline_seq),
        }
    }

    pub fn public_state(&self) -> &PvormPublicState {
        self.pvorm.public_state()
    }

    /// Consumes and applies exactly one ledger entry, blocking until one is
    /// available. A live ledger's stream never ends, so this only returns
    /// once something has actually been processed.
    #[instrument(skip(self), target = LOG_TARGET)]
    pub async fn step(&mut self) -> Result<()> {
        match self.stream.next().await {
            Some((seq, entry)) => self.apply_entry(seq, entry),
            None => Ok(()),
        }
    }

    /// Drives this replica forever, consuming entries as they arrive.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            self.step().await?;
        }
    }

    fn apply_entry(&mut self, seq: u64, entry: LedgerEntry) -> Result<()> {
        match entry {
            LedgerEntry::Header { tx_id, header } => {
                self.pending_headers.insert(tx_id, header);
                Ok(())
            }
            LedgerEntry::SenderUpdate { tx_id, update } => {
                self.apply_if_mine(tx_id, &update, seq, false, |h| h.request.source_bank_pubkey)
            }
            LedgerEntry::ReceiverUpdate { tx_id, update } => {
                self.apply_if_mine(tx_id, &update, seq, true, |h| h.request.dest_bank_pubkey)
            }
        }
    }

    /// Applies `update` iff `owning_bank(header)` names this observer's
    /// bank, where `header` is the one previously recorded for `tx_id`. A
    /// `ReceiverUpdate` is always the last entry for a transaction (spec
    /// §6), so its header is forgotten afterward regardless of ownership.
    fn apply_if_mine(
        &mut self,
        tx_id: TxId,
        update: &PvormUpdate,
        seq: u64,
        is_final: bool,
        owning_bank: impl Fn(&TransactionHeader) -> Point,
    ) -> Result<()> {
        let Some(header) = self.pending_headers.get(&tx_id) else {
            warn!(target: LOG_TARGET, "update for a transaction with no recorded header, skipping");
            return Ok(());
        };
        if owning_bank(header) == self.bank_pk {
            self.pvorm.apply_verified(update, seq, self.max_balance)?;
        }
        if is_final {
            self.pending_headers.remove(&tx_id);
        }
        Ok(())
    }
}
