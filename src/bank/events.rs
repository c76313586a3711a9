//! Typed event stream a bank's handler emits for its driver to fan out
//! (spec §9's "Callbacks" design note): `TransactionSettled`/`TransactionFailed`,
//! in place of the out-of-scope callback mechanism.

use crate::error::SolidusError;
pub use crate::ledger::entry::TxId;

#[derive(Clone, Debug)]
pub enum BankEvent {
    TransactionSettled { tx_id: TxId },
    TransactionFailed { tx_id: TxId, error: SolidusError },
}
