//! Per-bank, per-transaction-slot state machine (spec §4.5, §5).
//!
//! A bank accepts at most one in-flight transaction at a time — it holds
//! its PVORM for the duration, and the prototype's contract is a single
//! slot, not a pool. The two roles share the `Crediting -> Posting ->
//! Settled` tail but differ in how they enter it: the sender posts its own
//! header (`Proposing`), the receiver observes one posted by its peer
//! (`HeaderObserved`).

use super::events::TxId;
use crate::error::{Result, SolidusError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Sender,
    Receiver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Proposing,
    HeaderObserved,
    Crediting,
    Posting,
    Settled,
}

/// The single in-flight transaction slot a bank owns.
#[derive(Clone, Copy, Debug)]
pub struct TxSlot {
    phase: Phase,
    role: Option<Role>,
    tx_id: Option<TxId>,
}

impl Default for TxSlot {
    fn default() -> Self {
        Self::idle()
    }
}

impl TxSlot {
    pub fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            role: None,
            tx_id: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn tx_id(&self) -> Option<TxId> {
        self.tx_id
    }

    /// Sender role: `Idle -> Proposing`. The bank has posted its
    /// `TransactionHeader` and is waiting for the peer's half.
    pub fn propose(&mut self, tx_id: TxId) -> Result<()> {
        self.enter_from(&[Phase::Idle], Phase::Proposing, Role::Sender, tx_id)
    }

    /// Receiver role: `Idle -> HeaderObserved`. The bank has verified a
    /// peer's header and is about to apply its own credit.
    pub fn observe_header(&mut self, tx_id: TxId) -> Result<()> {
        self.enter_from(&[Phase::Idle], Phase::HeaderObserved, Role::Receiver, tx_id)
    }

    /// `Proposing | HeaderObserved -> Crediting`: the bank is applying its
    /// own PVORM update for `tx_id`.
    pub fn begin_crediting(&mut self, tx_id: TxId) -> Result<()> {
        self.advance(&[Phase::Proposing, Phase::HeaderObserved], Phase::Crediting, tx_id)
    }

    /// `Crediting -> Posting`: the update proof is built and about to be
    /// appended to the ledger.
    pub fn begin_posting(&mut self, tx_id: TxId) -> Result<()> {
        self.advance(&[Phase::Crediting], Phase::Posting, tx_id)
    }

    /// `Posting -> Settled`: the update has been durably appended.
    pub fn settle(&mut self, tx_id: TxId) -> Result<()> {
        self.advance(&[Phase::Posting], Phase::Settled, tx_id)
    }

    /// Any phase other than `Idle` -> `Idle`: spec §7's detect-and-halt
    /// policy for anything but `LedgerConflict` — drop the in-flight
    /// record and free the slot.
    pub fn reset(&mut self) {
        *self = Self::idle();
    }

    fn enter_from(&mut self, allowed: &[Phase], next: Phase, role: Role, tx_id: TxId) -> Result<()> {
        if !allowed.contains(&self.phase) {
            return Err(SolidusError::MalformedEncoding(format!(
                "tx slot not idle: in {:?}",
                self.phase
            )));
        }
        self.phase = next;
        self.role = Some(role);
        self.tx_id = Some(tx_id);
        Ok(())
    }

    fn advance(&mut self, allowed: &[Phase], next: Phase, tx_id: TxId) -> Result<()> {
        if !allowed.contains(&self.phase) {
            return Err(SolidusError::MalformedEncoding(format!(
                "illegal transition from {:?} to {:?}",
                self.phase, next
            )));
        }
        if self.tx_id != Some(tx_id) {
            return Err(SolidusError::MalformedEncoding(
                "transaction id mismatch for in-flight slot".into(),
            ));
        }
        self.phase = next;
        Ok(())
    }
}
