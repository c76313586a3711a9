//! L6 — the Solidus ledger driver (spec §4.6): see [`driver::Ledger`],
//! [`entry::LedgerEntry`], and the in-memory test implementation
//! [`memory::MemoryLedger`].

pub mod driver;
pub mod entry;
pub mod memory;

pub use driver::{Ledger, LedgerStream};
pub use entry::{transaction_id, LedgerEntry, TxId};
pub use memory::MemoryLedger;
