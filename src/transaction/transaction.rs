//! `Transaction` and `SettledTransaction` (spec §3, §4.4): a header paired
//! with both banks' PVORM update proofs, and the ledger position at which
//! the pair becomes visible to everyone.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pvorm::{PvormPublicState, PvormUpdate};

use super::header::TransactionHeader;

/// A header plus both halves of its settlement. Completing a `Transaction`
/// is atomic from an observer's point of view: both updates must verify for
/// either to be accepted (spec §4.4).
#[derive(Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub header: TransactionHeader,
    pub sender_update: PvormUpdate,
    pub receiver_update: PvormUpdate,
}

impl Transaction {
    pub fn new(header: TransactionHeader, sender_update: PvormUpdate, receiver_update: PvormUpdate) -> Self {
        Self {
            header,
            sender_update,
            receiver_update,
        }
    }

    /// Verifies the header's own proofs, then both PVORM updates against the
    /// two banks' prior replicated states. Neither update's verification
    /// needs to know which account it touched (see `crate::pvorm::update`'s
    /// module doc) — only that the named bank's stash moved by exactly the
    /// header's claimed value.
    pub fn verify(
        &self,
        max_value: i64,
        sender_prior: &PvormPublicState,
        receiver_prior: &PvormPublicState,
        sender_ledger_seq: u64,
        receiver_ledger_seq: u64,
    ) -> Result<(PvormPublicState, PvormPublicState)> {
        self.header.verify_proofs(max_value)?;

        let source_bank_pk = self.header.request.source_bank_pubkey;
        let dest_bank_pk = self.header.request.dest_bank_pubkey;

        let sender_posterior = crate::pvorm::update::verify(
            sender_prior,
            &self.sender_update,
            source_bank_pk,
            sender_ledger_seq,
            max_value,
        )?;
        let receiver_posterior = crate::pvorm::update::verify(
            receiver_prior,
            &self.receiver_update,
            dest_bank_pk,
            receiver_ledger_seq,
            max_value,
        )?;

        Ok((sender_posterior, receiver_posterior))
    }
}

/// A [`Transaction`] plus the ledger sequence number at which it became
/// visible to every bank (spec §3) — the seq of the `ReceiverUpdate` entry
/// that completes settlement.
#[derive(Clone, Serialize, Deserialize)]
pub struct SettledTransaction {
    pub transaction: Transaction,
    pub ledger_seq: u64,
}

impl SettledTransaction {
    pub fn new(transaction: Transaction, ledger_seq: u64) -> Self {
        Self {
            transaction,
            ledger_seq,
        }
    }
}
